//! Error types for registration, lookup and assignment.
//!
//! Evaluation never fails; anomalies found while resolving values are
//! reported as [`Diagnostic`](crate::Diagnostic)s instead.

use std::fmt;

use crate::declaration::MacroKind;

/// What a name is already bound to in a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A macro declaration of the given kind.
    Macro(MacroKind),
    /// A condition parameter.
    ConditionParameter,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Macro(kind) => write!(f, "{} macro", kind),
            EntityKind::ConditionParameter => write!(f, "condition parameter"),
        }
    }
}

/// Errors raised while registering declarations or condition parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeclarationError {
    #[error("Cannot declare '{name}': namespace '{namespace}' is sealed")]
    Sealed { name: String, namespace: String },

    #[error("Cannot declare '{name}': already declared as a {existing}")]
    Duplicate { name: String, existing: EntityKind },

    #[error("Declaration names must not be empty")]
    EmptyName,
}

/// Errors raised by typed lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("Unknown setting: {0}")]
    Unknown(String),

    #[error("Setting '{name}' is a {found} setting, expected {expected}")]
    KindMismatch {
        name: String,
        expected: MacroKind,
        found: MacroKind,
    },

    #[error("Unknown condition parameter: {0}")]
    UnknownCondition(String),

    #[error(
        "Setting '{name}' accepts [{}], expected [{}]",
        .found.join(", "),
        .expected.join(", ")
    )]
    SpellingMismatch {
        name: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// Errors raised while building condition sets.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConditionError {
    #[error("Invalid pattern '{pattern}' for condition '{parameter}': {source}")]
    InvalidPattern {
        parameter: String,
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

/// Errors raised while recording assignments by name.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AssignmentError {
    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    #[error(transparent)]
    Condition(#[from] ConditionError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DeclarationError::Duplicate {
            name: "ARCHS".to_string(),
            existing: EntityKind::Macro(MacroKind::StringList),
        };
        assert_eq!(
            err.to_string(),
            "Cannot declare 'ARCHS': already declared as a string-list macro"
        );

        let err = LookupError::KindMismatch {
            name: "SDKROOT".to_string(),
            expected: MacroKind::Boolean,
            found: MacroKind::String,
        };
        assert!(err.to_string().contains("expected boolean"));

        let err = LookupError::SpellingMismatch {
            name: "STRIP_STYLE".to_string(),
            expected: vec!["all".into(), "debugging".into()],
            found: vec!["x".into(), "y".into()],
        };
        assert_eq!(
            err.to_string(),
            "Setting 'STRIP_STYLE' accepts [x, y], expected [all, debugging]"
        );
    }
}
