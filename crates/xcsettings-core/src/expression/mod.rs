//! Parsed macro expressions.
//!
//! Raw assignment text is parsed once into a list of fragments:
//! - literal text;
//! - string-form-only literals (quotes, escapes and whitespace that only
//!   survive when the expression is evaluated as a single string);
//! - list separators;
//! - substitutions (`$(NAME)`, `$(inherited)`, `$(NAME:op)`, ...).
//!
//! Expressions for string-kind settings are parsed in string mode, where all
//! text is literal apart from substitutions. List-kind settings are parsed
//! in list mode, which additionally understands whitespace separators,
//! quoting and backslash escapes.

mod operators;
mod parser;

pub use operators::{ReplacementOperator, RetrievalOperator};

use std::sync::Arc;

use crate::declaration::MacroKind;
use crate::diagnostics::SyntaxDiagnostic;
use crate::value::join_words;

/// How an expression was parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionKind {
    String,
    List,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Fragment {
    Literal(String),
    StringFormOnly(String),
    Separator(String),
    Substitution(Substitution),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Substitution {
    pub(crate) target: Target,
    pub(crate) operators: Vec<Operator>,
    /// `$(X)` rather than `$X`.
    pub(crate) bracketed: bool,
    /// Evaluate the referenced value as a single string.
    pub(crate) as_string: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Target {
    Inherited,
    Named(Arc<str>),
    /// A name that is itself built from substitutions.
    Dynamic(Vec<Fragment>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Operator {
    Retrieve(RetrievalOperator),
    Replace(ReplacementOperator, Vec<Fragment>),
}

/// A parsed expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    source: String,
    kind: ExpressionKind,
    fragments: Vec<Fragment>,
    problems: Vec<SyntaxDiagnostic>,
}

impl Expression {
    /// Parse text in string mode.
    pub fn parse_string(source: &str) -> Self {
        let (fragments, problems) = parser::parse(source, ExpressionKind::String);
        Expression {
            source: source.to_string(),
            kind: ExpressionKind::String,
            fragments,
            problems,
        }
    }

    /// Parse text in list mode.
    pub fn parse_list(source: &str) -> Self {
        let (fragments, problems) = parser::parse(source, ExpressionKind::List);
        Expression {
            source: source.to_string(),
            kind: ExpressionKind::List,
            fragments,
            problems,
        }
    }

    /// Parse in the mode matching a declaration's value kind.
    pub fn parse_for(kind: MacroKind, source: &str) -> Self {
        if kind.is_list() {
            Self::parse_list(source)
        } else {
            Self::parse_string(source)
        }
    }

    /// A string expression that evaluates to `text` verbatim.
    pub fn literal(text: &str) -> Self {
        Expression {
            source: text.to_string(),
            kind: ExpressionKind::String,
            fragments: vec![Fragment::Literal(text.to_string())],
            problems: Vec::new(),
        }
    }

    /// A list expression that evaluates to `items` verbatim.
    pub fn literal_list<S: AsRef<str>>(items: &[S]) -> Self {
        let mut fragments = Vec::with_capacity(items.len() * 2);
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                fragments.push(Fragment::Separator(" ".to_string()));
            }
            fragments.push(Fragment::Literal(item.as_ref().to_string()));
        }
        Expression {
            source: join_words(items),
            kind: ExpressionKind::List,
            fragments,
            problems: Vec::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn kind(&self) -> ExpressionKind {
        self.kind
    }

    /// Problems found while parsing. The expression is still usable.
    pub fn syntax_diagnostics(&self) -> &[SyntaxDiagnostic] {
        &self.problems
    }

    /// Whether the expression contains no substitutions.
    pub fn is_literal(&self) -> bool {
        !self
            .fragments
            .iter()
            .any(|f| matches!(f, Fragment::Substitution(_)))
    }

    /// Names referenced by this expression in source order, including names
    /// nested inside dynamic names and replacement operands. A dynamic name
    /// itself is not listed, only the names it is built from.
    pub fn references(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_references(&self.fragments, &mut out);
        out
    }

    pub(crate) fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }
}

fn collect_references(fragments: &[Fragment], out: &mut Vec<String>) {
    for fragment in fragments {
        let Fragment::Substitution(sub) = fragment else {
            continue;
        };
        match &sub.target {
            Target::Inherited => {}
            Target::Named(name) => out.push(name.to_string()),
            Target::Dynamic(parts) => collect_references(parts, out),
        }
        for op in &sub.operators {
            if let Operator::Replace(_, operand) = op {
                collect_references(operand, out);
            }
        }
    }
}
