//! Assignment tables.
//!
//! A table is one layer of conditioned assignments, typically produced from
//! one source (a project file, a configuration file, command-line
//! overrides). Within a table, later assignments to the same setting win
//! over earlier ones of equal specificity.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::condition::ConditionSet;
use crate::declaration::{AsDeclaration, BooleanMacro, Declaration, EnumMacro, MacroEnum};
use crate::error::AssignmentError;
use crate::expression::Expression;
use crate::namespace::Namespace;
use crate::value::bool_spelling;

/// One conditioned assignment.
#[derive(Debug, Clone)]
pub struct Assignment {
    declaration: Declaration,
    conditions: ConditionSet,
    expression: Arc<Expression>,
    index: usize,
}

impl Assignment {
    pub fn declaration(&self) -> &Declaration {
        &self.declaration
    }

    pub fn conditions(&self) -> &ConditionSet {
        &self.conditions
    }

    pub fn expression(&self) -> &Arc<Expression> {
        &self.expression
    }

    /// Insertion position within the table.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// One layer of assignments.
#[derive(Debug, Clone, Default)]
pub struct AssignmentTable {
    label: String,
    assignments: HashMap<Arc<str>, Vec<Assignment>>,
    next_index: usize,
}

impl AssignmentTable {
    pub fn new(label: impl Into<String>) -> Self {
        AssignmentTable {
            label: label.into(),
            ..Default::default()
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Record an unconditional assignment of raw expression text.
    pub fn push(&mut self, decl: &impl AsDeclaration, raw: &str) {
        self.push_conditioned(decl, ConditionSet::new(), raw);
    }

    /// Record a conditioned assignment of raw expression text, parsed
    /// according to the setting's kind.
    pub fn push_conditioned(&mut self, decl: &impl AsDeclaration, conditions: ConditionSet, raw: &str) {
        let decl = decl.declaration();
        let expression = Expression::parse_for(decl.kind(), raw);
        self.push_expression(decl, conditions, expression);
    }

    pub fn push_expression(
        &mut self,
        decl: &impl AsDeclaration,
        conditions: ConditionSet,
        expression: Expression,
    ) {
        let decl = decl.declaration();
        let index = self.next_index;
        self.next_index += 1;
        self.assignments
            .entry(decl.name_arc().clone())
            .or_default()
            .push(Assignment {
                declaration: decl.clone(),
                conditions,
                expression: Arc::new(expression),
                index,
            });
    }

    /// Record an assignment for a setting named by text, as a parser of
    /// project files would.
    pub fn push_named(
        &mut self,
        namespace: &Namespace,
        name: &str,
        conditions: ConditionSet,
        raw: &str,
    ) -> Result<(), AssignmentError> {
        let decl = namespace
            .lookup_declaration(name)
            .ok_or_else(|| AssignmentError::UnknownSetting(name.to_string()))?;
        self.push_conditioned(&decl, conditions, raw);
        Ok(())
    }

    /// Like [`push_named`](Self::push_named), with conditions given as
    /// `(parameter, pattern)` text pairs, e.g. from `NAME[sdk=iphoneos*]`.
    pub fn push_named_with(
        &mut self,
        namespace: &Namespace,
        name: &str,
        conditions: &[(&str, &str)],
        raw: &str,
    ) -> Result<(), AssignmentError> {
        let decl = namespace
            .lookup_declaration(name)
            .ok_or_else(|| AssignmentError::UnknownSetting(name.to_string()))?;
        let mut set = ConditionSet::new();
        for (parameter, pattern) in conditions {
            let parameter = namespace.condition(parameter)?;
            set = set.with(&parameter, pattern)?;
        }
        self.push_conditioned(&decl, set, raw);
        Ok(())
    }

    pub fn push_bool(&mut self, decl: &BooleanMacro, value: bool) {
        self.push_expression(decl, ConditionSet::new(), Expression::literal(bool_spelling(value)));
    }

    pub fn push_enum<T: MacroEnum>(&mut self, decl: &EnumMacro<T>, value: T) {
        self.push_expression(decl, ConditionSet::new(), Expression::literal(value.spelling()));
    }

    /// Record text verbatim; `$` and quotes have no special meaning. For
    /// list settings the text becomes a single element.
    pub fn push_literal(&mut self, decl: &impl AsDeclaration, value: &str) {
        let expression = if decl.declaration().kind().is_list() {
            Expression::literal_list(&[value])
        } else {
            Expression::literal(value)
        };
        self.push_expression(decl, ConditionSet::new(), expression);
    }

    pub fn push_literal_list<S: AsRef<str>>(&mut self, decl: &impl AsDeclaration, values: &[S]) {
        self.push_expression(decl, ConditionSet::new(), Expression::literal_list(values));
    }

    /// Assignments for a setting, in insertion order.
    pub fn assignments(&self, decl: &impl AsDeclaration) -> &[Assignment] {
        self.lookup(decl.declaration().name())
    }

    pub(crate) fn lookup(&self, name: &str) -> &[Assignment] {
        self.assignments.get(name).map_or(&[], Vec::as_slice)
    }

    pub fn contains(&self, decl: &impl AsDeclaration) -> bool {
        self.assignments.contains_key(decl.declaration().name())
    }

    /// Drop every assignment for a setting.
    pub fn remove(&mut self, decl: &impl AsDeclaration) -> Vec<Assignment> {
        self.assignments
            .remove(decl.declaration().name())
            .unwrap_or_default()
    }

    /// Total number of assignments.
    pub fn len(&self) -> usize {
        self.assignments.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Settings with at least one assignment, sorted by name.
    pub fn settings(&self) -> Vec<Declaration> {
        let mut decls: Vec<_> = self
            .assignments
            .values()
            .filter_map(|v| v.first().map(|a| a.declaration.clone()))
            .collect();
        decls.sort_by(|a, b| a.name().cmp(b.name()));
        decls
    }

    /// Render the table as `NAME[cond=pattern] = expression` lines sorted by
    /// name, for debugging.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# {}", self.label);
        for decl in self.settings() {
            for a in self.lookup(decl.name()) {
                let _ = writeln!(
                    out,
                    "{}{} = {}",
                    decl.name(),
                    a.conditions,
                    a.expression.source()
                );
            }
        }
        out
    }
}
