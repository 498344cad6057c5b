//! Expansion engine.
//!
//! Walks parsed expressions against a [`Scope`], resolving references
//! recursively. An explicit stack of in-flight settings detects reference
//! cycles. A setting caught in a cycle evaluates to what it would produce
//! as the outermost request (the re-entrant reference expands to nothing),
//! and such results are never cached, so values do not depend on the order
//! in which settings are requested.

use std::sync::Arc;

use super::result::ResultBuilder;
use super::Scope;
use crate::declaration::{Declaration, Literal};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::expression::{Expression, Fragment, Operator, Substitution, Target};
use crate::value::join_words;

/// Whether a setting is being evaluated as one string or as a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Form {
    String,
    List,
}

impl Form {
    pub(crate) fn for_declaration(decl: &Declaration, as_string: bool) -> Form {
        if as_string || !decl.kind().is_list() {
            Form::String
        } else {
            Form::List
        }
    }
}

/// One matching assignment, in precedence order.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub(crate) layer: usize,
    pub(crate) expression: Arc<Expression>,
}

/// A resolved setting.
#[derive(Debug, Clone, Default)]
pub(crate) struct Evaluated {
    pub(crate) elements: Vec<String>,
    /// No assignment matched; `elements` is the declared default.
    pub(crate) unset: bool,
}

struct Frame {
    name: Arc<str>,
    /// Saw a cycle through this frame; the result must not be cached.
    tainted: bool,
}

enum Context<'c> {
    /// An ad hoc expression; `$(inherited)` has nothing to continue with.
    Expression,
    /// Candidate `position` of a setting's candidate sequence.
    Setting {
        decl: &'c Declaration,
        candidates: &'c [Candidate],
        position: usize,
    },
}

pub(crate) struct Evaluator<'s> {
    scope: &'s Scope,
    stack: Vec<Frame>,
}

/// The value a setting takes when no assignment matches.
pub(crate) fn default_elements(decl: &Declaration, form: Form) -> Vec<String> {
    match (decl.default(), form) {
        (Some(Literal::Scalar(text)), _) => vec![text.clone()],
        (Some(Literal::List(items)), Form::List) => items.clone(),
        (Some(Literal::List(items)), Form::String) if items.is_empty() => Vec::new(),
        (Some(Literal::List(items)), Form::String) => vec![join_words(items)],
        (None, _) if decl.kind().is_list() => Vec::new(),
        (None, _) => vec![String::new()],
    }
}

impl<'s> Evaluator<'s> {
    pub(crate) fn new(scope: &'s Scope) -> Self {
        Evaluator {
            scope,
            stack: Vec::new(),
        }
    }

    /// Resolve a setting, consulting and filling the scope's cache.
    pub(crate) fn resolve(&mut self, decl: &Declaration, form: Form) -> Arc<Evaluated> {
        if let Some(hit) = self.scope.cached(decl, form) {
            return hit;
        }

        if let Some(at) = self.stack.iter().position(|f| f.name == *decl.name_arc()) {
            self.cycle(decl, at);
            return Arc::new(Evaluated::default());
        }

        tracing::trace!(setting = decl.name(), ?form, "resolving setting");
        self.stack.push(Frame {
            name: decl.name_arc().clone(),
            tainted: false,
        });

        let candidates = self.scope.candidates(decl);
        let evaluated = if candidates.is_empty() {
            Evaluated {
                elements: default_elements(decl, form),
                unset: true,
            }
        } else {
            let mut out = ResultBuilder::new();
            self.eval_candidate(decl, &candidates, 0, form == Form::String, &mut out);
            Evaluated {
                elements: out.into_elements(),
                unset: false,
            }
        };

        let evaluated = Arc::new(evaluated);
        let tainted = self.stack.pop().map_or(false, |f| f.tainted);
        if !tainted {
            self.scope.store(decl, form, evaluated.clone());
        }
        evaluated
    }

    fn cycle(&mut self, decl: &Declaration, at: usize) {
        let mut chain: Vec<String> = self.stack[at..].iter().map(|f| f.name.to_string()).collect();
        chain.push(decl.name().to_string());
        for frame in &mut self.stack[at..] {
            frame.tainted = true;
        }
        tracing::warn!(
            setting = decl.name(),
            chain = %chain.join(" -> "),
            "reference cycle; substituting empty value"
        );
        self.scope.report(Diagnostic::error(
            Some(decl.name()),
            DiagnosticKind::ReferenceCycle { chain },
        ));
    }

    pub(crate) fn report_syntax(&self, setting: Option<&str>, expression: &Expression) {
        for problem in expression.syntax_diagnostics() {
            self.scope
                .report(Diagnostic::syntax(setting, expression.source(), *problem));
        }
    }

    fn eval_candidate(
        &mut self,
        decl: &Declaration,
        candidates: &[Candidate],
        position: usize,
        as_string: bool,
        out: &mut ResultBuilder,
    ) {
        let expression = &candidates[position].expression;
        self.report_syntax(Some(decl.name()), expression);
        let context = Context::Setting {
            decl,
            candidates,
            position,
        };
        self.eval_fragments(expression.fragments(), &context, as_string, out);
    }

    /// Evaluate an ad hoc expression.
    pub(crate) fn eval_expression(&mut self, expression: &Expression, as_string: bool) -> ResultBuilder {
        self.report_syntax(None, expression);
        let mut out = ResultBuilder::new();
        self.eval_fragments(expression.fragments(), &Context::Expression, as_string, &mut out);
        out
    }

    fn eval_fragments(
        &mut self,
        fragments: &[Fragment],
        context: &Context<'_>,
        as_string: bool,
        out: &mut ResultBuilder,
    ) {
        for fragment in fragments {
            match fragment {
                Fragment::Literal(text) => out.append(text),
                Fragment::StringFormOnly(text) => {
                    if as_string {
                        out.append(text);
                    }
                }
                Fragment::Separator(text) => {
                    if as_string {
                        out.append(text);
                    } else {
                        out.set_needs_separator();
                    }
                }
                Fragment::Substitution(sub) => {
                    let value = self.eval_substitution(sub, context, as_string);
                    out.append_result(value);
                }
            }
        }
    }

    fn eval_substitution(
        &mut self,
        sub: &Substitution,
        context: &Context<'_>,
        as_string: bool,
    ) -> ResultBuilder {
        let as_string = as_string || sub.as_string;
        let mut value = ResultBuilder::new();
        match &sub.target {
            Target::Inherited => self.eval_inherited(context, as_string, &mut value),
            Target::Named(name) => self.eval_named(name, as_string, sub.bracketed, &mut value),
            Target::Dynamic(parts) => {
                let mut name = ResultBuilder::new();
                self.eval_fragments(parts, context, true, &mut name);
                let name = name.into_string();
                if name == "inherited" {
                    self.eval_inherited(context, as_string, &mut value);
                } else {
                    self.eval_named(&name, as_string, true, &mut value);
                }
            }
        }
        for op in &sub.operators {
            value = self.apply_operator(op, value, context);
        }
        value
    }

    fn eval_named(&mut self, name: &str, as_string: bool, bracketed: bool, out: &mut ResultBuilder) {
        let Some(decl) = self.scope.namespace().lookup_declaration(name) else {
            if !bracketed {
                out.append(&format!("${}", name));
            }
            return;
        };
        let evaluated = self.resolve(&decl, Form::for_declaration(&decl, as_string));
        if evaluated.unset && decl.default().is_none() && !bracketed {
            out.append(&format!("${}", name));
            return;
        }
        out.append_result(ResultBuilder::from_elements(evaluated.elements.clone()));
    }

    fn eval_inherited(&mut self, context: &Context<'_>, as_string: bool, out: &mut ResultBuilder) {
        let Context::Setting {
            decl,
            candidates,
            position,
        } = *context
        else {
            return;
        };
        if position + 1 < candidates.len() {
            self.eval_candidate(decl, candidates, position + 1, as_string, out);
        } else {
            let form = Form::for_declaration(decl, as_string);
            out.append_result(ResultBuilder::from_elements(default_elements(decl, form)));
        }
    }

    fn apply_operator(
        &mut self,
        op: &Operator,
        value: ResultBuilder,
        context: &Context<'_>,
    ) -> ResultBuilder {
        let mut out = ResultBuilder::new();
        match op {
            Operator::Retrieve(op) => {
                for element in value.elements() {
                    out.append(&op.apply(element));
                    out.set_needs_separator();
                }
            }
            Operator::Replace(op, operand) => {
                let mut replacement = ResultBuilder::new();
                self.eval_fragments(operand, context, true, &mut replacement);
                let replacement = replacement.into_string();
                if value.has_text() {
                    for element in value.elements() {
                        out.append(&op.apply(element, &replacement));
                        out.set_needs_separator();
                    }
                } else if op.applies_to_empty() {
                    out.append(&op.apply("", &replacement));
                }
            }
        }
        out
    }
}
