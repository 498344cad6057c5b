//! Macro declarations and typed handles.
//!
//! A [`Declaration`] is the untyped, immutable identity of a setting: its
//! name, value kind, optional declared default and, for enumerations, the
//! recognized spellings. A [`Macro<K>`] wraps a declaration with a kind
//! marker so that [`Scope::evaluate`](crate::Scope::evaluate) returns the
//! right Rust type:
//!
//! | marker            | value              |
//! |-------------------|--------------------|
//! | [`BooleanKind`]   | `bool`             |
//! | [`StringKind`]    | `String`           |
//! | [`StringListKind`]| `Vec<String>`      |
//! | [`PathKind`]      | `PathBuf`          |
//! | [`PathListKind`]  | `Vec<PathBuf>`     |
//! | [`EnumKind<T>`]   | `T`                |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::value::{normalize_path, parse_bool};

/// The value kind of a declaration, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroKind {
    Boolean,
    String,
    StringList,
    Path,
    PathList,
    Enumeration,
}

impl MacroKind {
    /// Whether values of this kind are evaluated in list form.
    pub fn is_list(self) -> bool {
        matches!(self, MacroKind::StringList | MacroKind::PathList)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MacroKind::Boolean => "boolean",
            MacroKind::String => "string",
            MacroKind::StringList => "string-list",
            MacroKind::Path => "path",
            MacroKind::PathList => "path-list",
            MacroKind::Enumeration => "enumeration",
        }
    }
}

impl fmt::Display for MacroKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A literal declared default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Scalar(String),
    List(Vec<String>),
}

struct DeclarationInner {
    name: Arc<str>,
    kind: MacroKind,
    default: Option<Literal>,
    spellings: Vec<String>,
}

/// The untyped identity of a build setting.
///
/// Cheap to clone; equality and hashing use the name only.
#[derive(Clone)]
pub struct Declaration(Arc<DeclarationInner>);

impl Declaration {
    pub(crate) fn new(
        name: Arc<str>,
        kind: MacroKind,
        default: Option<Literal>,
        spellings: Vec<String>,
    ) -> Self {
        Declaration(Arc::new(DeclarationInner {
            name,
            kind,
            default,
            spellings,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub(crate) fn name_arc(&self) -> &Arc<str> {
        &self.0.name
    }

    pub fn kind(&self) -> MacroKind {
        self.0.kind
    }

    pub fn default(&self) -> Option<&Literal> {
        self.0.default.as_ref()
    }

    /// Recognized spellings (enumerations only; empty otherwise).
    pub fn spellings(&self) -> &[String] {
        &self.0.spellings
    }
}

impl PartialEq for Declaration {
    fn eq(&self, other: &Self) -> bool {
        self.0.name == other.0.name
    }
}

impl Eq for Declaration {}

impl Hash for Declaration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state);
    }
}

impl fmt::Debug for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Declaration")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .field("default", &self.default())
            .finish()
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Anything that names a declaration: the untyped [`Declaration`] or a typed
/// [`Macro`].
pub trait AsDeclaration {
    fn declaration(&self) -> &Declaration;
}

impl AsDeclaration for Declaration {
    fn declaration(&self) -> &Declaration {
        self
    }
}

impl<K: MacroType> AsDeclaration for Macro<K> {
    fn declaration(&self) -> &Declaration {
        &self.decl
    }
}

/// The raw result of resolving a declaration, before typed conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// String form (scalar kinds).
    Text(String),
    /// List form (list kinds).
    List(Vec<String>),
}

impl Resolved {
    fn into_text(self) -> String {
        match self {
            Resolved::Text(text) => text,
            Resolved::List(items) => items.join(" "),
        }
    }

    fn into_list(self) -> Vec<String> {
        match self {
            Resolved::Text(text) if text.is_empty() => Vec::new(),
            Resolved::Text(text) => vec![text],
            Resolved::List(items) => items,
        }
    }
}

/// A value kind marker.
///
/// Implementations map resolved text onto a Rust type. Conversion is total:
/// unusable text falls back to a default and may report a diagnostic.
pub trait MacroType: 'static {
    const KIND: MacroKind;

    type Value: Clone + fmt::Debug;

    /// Recognized spellings recorded on the declaration.
    fn spellings() -> Vec<String> {
        Vec::new()
    }

    fn convert(
        resolved: Resolved,
        decl: &Declaration,
        report: &mut dyn FnMut(Diagnostic),
    ) -> Self::Value;
}

pub struct BooleanKind;
pub struct StringKind;
pub struct StringListKind;
pub struct PathKind;
pub struct PathListKind;
pub struct EnumKind<T>(PhantomData<fn() -> T>);

fn default_text(decl: &Declaration) -> Option<&str> {
    match decl.default() {
        Some(Literal::Scalar(text)) => Some(text),
        _ => None,
    }
}

impl MacroType for BooleanKind {
    const KIND: MacroKind = MacroKind::Boolean;
    type Value = bool;

    fn convert(resolved: Resolved, decl: &Declaration, _: &mut dyn FnMut(Diagnostic)) -> bool {
        let text = resolved.into_text();
        parse_bool(&text)
            .or_else(|| default_text(decl).and_then(parse_bool))
            .unwrap_or(false)
    }
}

impl MacroType for StringKind {
    const KIND: MacroKind = MacroKind::String;
    type Value = String;

    fn convert(resolved: Resolved, _: &Declaration, _: &mut dyn FnMut(Diagnostic)) -> String {
        resolved.into_text()
    }
}

impl MacroType for StringListKind {
    const KIND: MacroKind = MacroKind::StringList;
    type Value = Vec<String>;

    fn convert(resolved: Resolved, _: &Declaration, _: &mut dyn FnMut(Diagnostic)) -> Vec<String> {
        resolved.into_list()
    }
}

impl MacroType for PathKind {
    const KIND: MacroKind = MacroKind::Path;
    type Value = PathBuf;

    fn convert(resolved: Resolved, _: &Declaration, _: &mut dyn FnMut(Diagnostic)) -> PathBuf {
        PathBuf::from(normalize_path(&resolved.into_text()))
    }
}

impl MacroType for PathListKind {
    const KIND: MacroKind = MacroKind::PathList;
    type Value = Vec<PathBuf>;

    fn convert(resolved: Resolved, _: &Declaration, _: &mut dyn FnMut(Diagnostic)) -> Vec<PathBuf> {
        resolved
            .into_list()
            .iter()
            .map(|item| PathBuf::from(normalize_path(item)))
            .collect()
    }
}

/// An enumeration usable as a setting value.
///
/// Spellings are matched case-sensitively, the way they appear in project
/// files (`YES_ERROR`, `non-global`, ...).
pub trait MacroEnum: Sized + Clone + fmt::Debug + Send + Sync + 'static {
    /// Every variant, in declaration order.
    const VARIANTS: &'static [Self];

    fn spelling(&self) -> &'static str;

    /// The value used when a setting is unset or unrecognized.
    fn default_value() -> Self;

    fn from_spelling(raw: &str) -> Option<Self> {
        Self::VARIANTS
            .iter()
            .find(|variant| variant.spelling() == raw)
            .cloned()
    }
}

impl<T: MacroEnum> MacroType for EnumKind<T> {
    const KIND: MacroKind = MacroKind::Enumeration;
    type Value = T;

    fn spellings() -> Vec<String> {
        T::VARIANTS.iter().map(|v| v.spelling().to_string()).collect()
    }

    fn convert(resolved: Resolved, decl: &Declaration, report: &mut dyn FnMut(Diagnostic)) -> T {
        let fallback = default_text(decl)
            .and_then(T::from_spelling)
            .unwrap_or_else(T::default_value);
        let text = resolved.into_text();
        let raw = text.trim();
        if raw.is_empty() {
            return fallback;
        }
        match T::from_spelling(raw) {
            Some(value) => value,
            None => {
                tracing::warn!(
                    setting = decl.name(),
                    value = raw,
                    fallback = fallback.spelling(),
                    "unrecognized enumeration value; using default"
                );
                report(Diagnostic::warning(
                    Some(decl.name()),
                    DiagnosticKind::InvalidEnumerationValue {
                        value: raw.to_string(),
                        fallback: fallback.spelling().to_string(),
                    },
                ));
                fallback
            }
        }
    }
}

/// A typed handle to a declaration.
pub struct Macro<K: MacroType> {
    decl: Declaration,
    _kind: PhantomData<fn() -> K>,
}

pub type BooleanMacro = Macro<BooleanKind>;
pub type StringMacro = Macro<StringKind>;
pub type StringListMacro = Macro<StringListKind>;
pub type PathMacro = Macro<PathKind>;
pub type PathListMacro = Macro<PathListKind>;
pub type EnumMacro<T> = Macro<EnumKind<T>>;

impl<K: MacroType> Macro<K> {
    pub(crate) fn new(decl: Declaration) -> Self {
        debug_assert_eq!(decl.kind(), K::KIND);
        Macro {
            decl,
            _kind: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        self.decl.name()
    }

    pub fn declaration(&self) -> &Declaration {
        &self.decl
    }
}

impl<K: MacroType> Clone for Macro<K> {
    fn clone(&self) -> Self {
        Macro::new(self.decl.clone())
    }
}

impl<K: MacroType> PartialEq for Macro<K> {
    fn eq(&self, other: &Self) -> bool {
        self.decl == other.decl
    }
}

impl<K: MacroType> Eq for Macro<K> {}

impl<K: MacroType> fmt::Debug for Macro<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Macro<{}>({})", K::KIND, self.name())
    }
}
