//! Evaluation scopes.
//!
//! A [`Scope`] binds a sealed namespace, an ordered chain of assignment
//! tables (most authoritative first) and one set of condition values. It
//! answers "what is the value of setting X for this build context".
//!
//! Precedence for a setting:
//! 1. layer order (an earlier table always wins over a later one);
//! 2. within a table, more specific condition sets win;
//! 3. among equally specific assignments, the later one wins.
//!
//! `$(inherited)` in the winning assignment continues with the next
//! candidate in that order, and finally with the declared default.
//!
//! Scopes cache resolved values and are not `Sync`; create one per thread.

mod engine;
mod result;

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use crate::condition::{Bindings, ConditionParameter};
use crate::declaration::{AsDeclaration, Declaration, Macro, MacroType, Resolved};
use crate::diagnostics::Diagnostic;
use crate::expression::Expression;
use crate::namespace::Namespace;
use crate::table::AssignmentTable;

use engine::{Candidate, Evaluated, Evaluator, Form};

pub struct Scope {
    namespace: Arc<Namespace>,
    layers: Arc<[Arc<AssignmentTable>]>,
    bindings: Bindings,
    candidates: RefCell<HashMap<Arc<str>, Arc<[Candidate]>>>,
    values: RefCell<HashMap<(Declaration, Form), Arc<Evaluated>>>,
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Scope {
    /// Create a scope. Seals `namespace`.
    pub fn new(
        namespace: Arc<Namespace>,
        layers: Vec<Arc<AssignmentTable>>,
        bindings: Bindings,
    ) -> Self {
        namespace.seal();
        Self::with_layers(namespace, layers.into(), bindings)
    }

    fn with_layers(
        namespace: Arc<Namespace>,
        layers: Arc<[Arc<AssignmentTable>]>,
        bindings: Bindings,
    ) -> Self {
        Scope {
            namespace,
            layers,
            bindings,
            candidates: RefCell::new(HashMap::new()),
            values: RefCell::new(HashMap::new()),
            diagnostics: RefCell::new(Vec::new()),
        }
    }

    pub fn namespace(&self) -> &Arc<Namespace> {
        &self.namespace
    }

    pub fn layers(&self) -> &[Arc<AssignmentTable>] {
        &self.layers
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// A scope over the same namespace and layers with one binding
    /// replaced. Caches and diagnostics are not shared.
    pub fn subscope(&self, parameter: &ConditionParameter, value: impl Into<String>) -> Scope {
        let mut bindings = self.bindings.clone();
        bindings.set(parameter, vec![value.into()]);
        self.with_bindings(bindings)
    }

    /// A scope over the same namespace and layers with new bindings.
    pub fn with_bindings(&self, bindings: Bindings) -> Scope {
        Self::with_layers(self.namespace.clone(), self.layers.clone(), bindings)
    }

    /// Evaluate a setting to its typed value. Never fails; problems are
    /// recorded in [`diagnostics`](Self::diagnostics).
    pub fn evaluate<K: MacroType>(&self, setting: &Macro<K>) -> K::Value {
        let decl = setting.declaration();
        let form = Form::for_declaration(decl, false);
        let evaluated = Evaluator::new(self).resolve(decl, form);
        let resolved = match form {
            Form::String => Resolved::Text(evaluated.elements.concat()),
            Form::List => Resolved::List(evaluated.elements.clone()),
        };
        K::convert(resolved, decl, &mut |d| self.report(d))
    }

    /// Evaluate any setting as a single string. List settings keep their
    /// quoting and whitespace.
    pub fn evaluate_as_string(&self, setting: &impl AsDeclaration) -> String {
        let evaluated = Evaluator::new(self).resolve(setting.declaration(), Form::String);
        evaluated.elements.concat()
    }

    /// Evaluate any setting as a list. Scalar settings yield one element
    /// (or none when empty).
    pub fn evaluate_as_list(&self, setting: &impl AsDeclaration) -> Vec<String> {
        let decl = setting.declaration();
        let evaluated = Evaluator::new(self).resolve(decl, Form::for_declaration(decl, false));
        match evaluated.elements.as_slice() {
            [only] if only.is_empty() && !decl.kind().is_list() => Vec::new(),
            elements => elements.to_vec(),
        }
    }

    /// Evaluate ad hoc text in string mode, e.g. `"$(SRCROOT)/build"`.
    pub fn evaluate_expression(&self, source: &str) -> String {
        let expression = Expression::parse_string(source);
        Evaluator::new(self)
            .eval_expression(&expression, true)
            .into_string()
    }

    /// Evaluate ad hoc text in list mode, e.g. `"-I$(SRCROOT) $(OTHER_CFLAGS)"`.
    pub fn evaluate_list_expression(&self, source: &str) -> Vec<String> {
        let expression = Expression::parse_list(source);
        Evaluator::new(self)
            .eval_expression(&expression, false)
            .into_elements()
    }

    /// Whether any assignment for the setting matches this scope.
    pub fn is_assigned(&self, setting: &impl AsDeclaration) -> bool {
        !self.candidates(setting.declaration()).is_empty()
    }

    /// Label of the table that supplies the winning assignment, if any.
    pub fn winning_layer(&self, setting: &impl AsDeclaration) -> Option<&str> {
        let candidates = self.candidates(setting.declaration());
        let first = candidates.first()?;
        Some(self.layers[first.layer].label())
    }

    /// Snapshot of the diagnostics recorded so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    /// Drain the recorded diagnostics.
    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.borrow_mut())
    }

    pub(crate) fn report(&self, diagnostic: Diagnostic) {
        let mut sink = self.diagnostics.borrow_mut();
        if !sink.contains(&diagnostic) {
            sink.push(diagnostic);
        }
    }

    pub(crate) fn cached(&self, decl: &Declaration, form: Form) -> Option<Arc<Evaluated>> {
        self.values.borrow().get(&(decl.clone(), form)).cloned()
    }

    pub(crate) fn store(&self, decl: &Declaration, form: Form, value: Arc<Evaluated>) {
        self.values.borrow_mut().insert((decl.clone(), form), value);
    }

    /// Matching assignments for a setting, in precedence order.
    pub(crate) fn candidates(&self, decl: &Declaration) -> Arc<[Candidate]> {
        if let Some(hit) = self.candidates.borrow().get(decl.name()) {
            return hit.clone();
        }
        let mut out = Vec::new();
        for (layer, table) in self.layers.iter().enumerate() {
            let mut matched: Vec<_> = table
                .lookup(decl.name())
                .iter()
                .filter(|a| a.conditions().matches(&self.bindings))
                .collect();
            matched.sort_by(|a, b| {
                b.conditions()
                    .specificity()
                    .cmp(&a.conditions().specificity())
                    .then_with(|| b.index().cmp(&a.index()))
            });
            out.extend(matched.into_iter().map(|a| Candidate {
                layer,
                expression: a.expression().clone(),
            }));
        }
        let out: Arc<[Candidate]> = out.into();
        self.candidates
            .borrow_mut()
            .insert(decl.name_arc().clone(), out.clone());
        out
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("namespace", &self.namespace.label())
            .field(
                "layers",
                &self.layers.iter().map(|l| l.label()).collect::<Vec<_>>(),
            )
            .field("bindings", &self.bindings)
            .finish()
    }
}

#[cfg(test)]
mod tests;
