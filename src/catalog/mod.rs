//! Setting catalogs
//!
//! A catalog is pure data: the condition parameters and settings a
//! namespace should declare. It can come from the builtin table or from a
//! TOML file:
//!
//! ```toml
//! conditions = ["arch", "sdk"]
//!
//! [[setting]]
//! name = "OTHER_CFLAGS"
//! kind = "string_list"
//!
//! [[setting]]
//! name = "STRIP_STYLE"
//! kind = "enumeration"
//! values = ["all", "non-global", "debugging"]
//! default = "all"
//! ```

mod builtin;
pub mod enums;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use xcsettings_core::value::{bool_spelling, parse_bool, split_words};
use xcsettings_core::{DeclarationError, Literal, MacroKind, Namespace};

/// One setting row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Setting name, e.g. `OTHER_CFLAGS`.
    pub name: String,

    /// Value kind.
    pub kind: MacroKind,

    /// Declared default as text. List defaults are split into words.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Recognized spellings (enumerations only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

impl CatalogEntry {
    pub fn new(name: &str, kind: MacroKind) -> Self {
        CatalogEntry {
            name: name.to_string(),
            kind,
            default: None,
            values: Vec::new(),
        }
    }

    pub fn with_default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }

    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    /// The declared default as a literal, checked against the kind.
    fn default_literal(&self) -> Result<Option<Literal>, CatalogError> {
        let Some(text) = &self.default else {
            return Ok(None);
        };
        let literal = match self.kind {
            MacroKind::Boolean => {
                let value = parse_bool(text).ok_or_else(|| {
                    CatalogError::ValidationError(format!(
                        "{}: invalid boolean default '{}'",
                        self.name, text
                    ))
                })?;
                Literal::Scalar(bool_spelling(value).to_string())
            }
            MacroKind::Enumeration => {
                if !self.values.iter().any(|v| v == text) {
                    return Err(CatalogError::ValidationError(format!(
                        "{}: default '{}' is not one of [{}]",
                        self.name,
                        text,
                        self.values.join(", ")
                    )));
                }
                Literal::Scalar(text.clone())
            }
            MacroKind::String | MacroKind::Path => Literal::Scalar(text.clone()),
            MacroKind::StringList | MacroKind::PathList => Literal::List(split_words(text)),
        };
        Ok(Some(literal))
    }
}

/// Condition parameters and settings for one namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Condition parameter names.
    #[serde(default)]
    pub conditions: Vec<String>,

    /// Setting rows, declared in order.
    #[serde(default, rename = "setting")]
    pub settings: Vec<CatalogEntry>,
}

impl Catalog {
    /// The builtin catalog of common Xcode build settings.
    pub fn builtin() -> Self {
        builtin::catalog()
    }

    /// Load a catalog from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| CatalogError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// Parse a catalog from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = toml::from_str(contents)
            .map_err(|e| CatalogError::ParseError(format!("TOML parse error: {}", e)))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String, CatalogError> {
        toml::to_string(self).map_err(|e| CatalogError::ParseError(e.to_string()))
    }

    /// Check names, kinds and defaults without touching a namespace.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        let names = self
            .conditions
            .iter()
            .chain(self.settings.iter().map(|s| &s.name));
        for name in names {
            if name.is_empty() {
                return Err(CatalogError::ValidationError(
                    "names must not be empty".to_string(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(CatalogError::ValidationError(format!(
                    "duplicate name '{}'",
                    name
                )));
            }
        }

        for entry in &self.settings {
            match entry.kind {
                MacroKind::Enumeration if entry.values.is_empty() => {
                    return Err(CatalogError::ValidationError(format!(
                        "{}: enumeration needs at least one value",
                        entry.name
                    )));
                }
                MacroKind::Enumeration => {}
                _ if !entry.values.is_empty() => {
                    return Err(CatalogError::ValidationError(format!(
                        "{}: only enumerations take values",
                        entry.name
                    )));
                }
                _ => {}
            }
            entry.default_literal()?;
        }
        Ok(())
    }

    /// Append another catalog's rows.
    pub fn extend(&mut self, other: Catalog) {
        self.conditions.extend(other.conditions);
        self.settings.extend(other.settings);
    }

    pub fn len(&self) -> usize {
        self.conditions.len() + self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.settings.is_empty()
    }

    /// Declare every row in `namespace`.
    pub fn declare_into(&self, namespace: &Namespace) -> Result<(), CatalogError> {
        self.validate()?;
        for name in &self.conditions {
            namespace.declare_condition_parameter(name)?;
        }
        for entry in &self.settings {
            namespace.declare_macro(
                &entry.name,
                entry.kind,
                entry.default_literal()?,
                entry.values.clone(),
            )?;
        }
        tracing::debug!(
            namespace = namespace.label(),
            conditions = self.conditions.len(),
            settings = self.settings.len(),
            "catalog declared"
        );
        Ok(())
    }

    /// Build a sealed namespace holding this catalog.
    pub fn build(&self, label: &str) -> Result<Namespace, CatalogError> {
        let namespace = Namespace::new(label);
        self.declare_into(&namespace)?;
        namespace.seal();
        Ok(namespace)
    }
}

/// Catalog loading errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Declaration error: {0}")]
    Declaration(#[from] DeclarationError),
}
