//! Diagnostics recorded during evaluation.
//!
//! Evaluation is total: instead of failing, the engine substitutes a safe
//! value and records a [`Diagnostic`] in the scope's sink.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// Problems found while parsing an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyntaxErrorKind {
    /// `$` at the very end of the expression.
    TrailingDollarSign,
    /// `$(` without the matching close.
    UnterminatedSubstitution,
    /// `$()` or `$(:op)`.
    MissingMacroName,
    /// `$(X:)` or `$(X:=v)`.
    MissingOperatorName,
    /// An operator name followed by something other than `:`, `=` or the close.
    InvalidOperatorCharacter,
    UnknownRetrievalOperator,
    UnknownReplacementOperator,
    UnterminatedQuotation,
    TrailingEscapeCharacter,
    /// `${X}` or `$[X]`.
    DeprecatedReferenceSyntax,
}

impl SyntaxErrorKind {
    pub fn severity(self) -> Severity {
        match self {
            SyntaxErrorKind::DeprecatedReferenceSyntax => Severity::Warning,
            _ => Severity::Error,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SyntaxErrorKind::TrailingDollarSign => "trailing '$'",
            SyntaxErrorKind::UnterminatedSubstitution => "unterminated macro subexpression",
            SyntaxErrorKind::MissingMacroName => "missing macro name",
            SyntaxErrorKind::MissingOperatorName => "missing operator name",
            SyntaxErrorKind::InvalidOperatorCharacter => "invalid character in operator name",
            SyntaxErrorKind::UnknownRetrievalOperator => "unknown retrieval operator",
            SyntaxErrorKind::UnknownReplacementOperator => "unknown replacement operator",
            SyntaxErrorKind::UnterminatedQuotation => "unterminated quotation",
            SyntaxErrorKind::TrailingEscapeCharacter => "trailing escape character",
            SyntaxErrorKind::DeprecatedReferenceSyntax => {
                "'${...}' and '$[...]' are deprecated; use '$(...)'"
            }
        }
    }
}

/// A syntax problem at a byte offset of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SyntaxDiagnostic {
    pub kind: SyntaxErrorKind,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "detail")]
pub enum DiagnosticKind {
    /// A reference chain that leads back to a setting being evaluated. The
    /// chain starts and ends with the same name.
    #[serde(rename = "REFERENCE_CYCLE")]
    ReferenceCycle { chain: Vec<String> },

    #[serde(rename = "INVALID_ENUMERATION_VALUE")]
    InvalidEnumerationValue { value: String, fallback: String },

    #[serde(rename = "SYNTAX")]
    Syntax {
        error: SyntaxErrorKind,
        expression: String,
        offset: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// The setting whose evaluation produced this diagnostic, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setting: Option<String>,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn warning(setting: Option<&str>, kind: DiagnosticKind) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            setting: setting.map(str::to_string),
            kind,
        }
    }

    pub fn error(setting: Option<&str>, kind: DiagnosticKind) -> Self {
        Diagnostic {
            severity: Severity::Error,
            setting: setting.map(str::to_string),
            kind,
        }
    }

    pub fn syntax(setting: Option<&str>, expression: &str, problem: SyntaxDiagnostic) -> Self {
        Diagnostic {
            severity: problem.kind.severity(),
            setting: setting.map(str::to_string),
            kind: DiagnosticKind::Syntax {
                error: problem.kind,
                expression: expression.to_string(),
                offset: problem.offset,
            },
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}: ", severity)?;
        if let Some(setting) = &self.setting {
            write!(f, "{}: ", setting)?;
        }
        match &self.kind {
            DiagnosticKind::ReferenceCycle { chain } => {
                write!(f, "reference cycle: {}", chain.join(" -> "))
            }
            DiagnosticKind::InvalidEnumerationValue { value, fallback } => {
                write!(f, "unrecognized value '{}', using '{}'", value, fallback)
            }
            DiagnosticKind::Syntax {
                error,
                expression,
                offset,
            } => write!(
                f,
                "{} at offset {} in '{}'",
                error.description(),
                offset,
                expression
            ),
        }
    }
}
