//! xcsettings - typed Xcode-style build settings
//!
//! This crate puts a builtin catalog of common build settings on top of the
//! `xcsettings-core` resolver: a lazily initialized, sealed namespace,
//! typed handles for the builtin settings, TOML catalog loading and helpers
//! that turn settings into command-line arguments.

pub mod args;
pub mod builtins;
pub mod catalog;
pub mod context;

pub use xcsettings_core::{
    AssignmentError, AssignmentTable, Bindings, BooleanMacro, ConditionError, ConditionParameter,
    ConditionSet, DeclarationError, Diagnostic, DiagnosticKind, EntityKind, EnumMacro,
    Expression, LookupError, Macro, MacroEnum, MacroKind, Namespace, PathListMacro, PathMacro,
    Scope, Severity, StringListMacro, StringMacro,
};

pub use builtins::{BuiltinConditions, BuiltinSettings};
pub use catalog::enums::{
    BooleanWarningLevel, DebugInformationFormat, LinkTimeOptimization, StripStyle,
};
pub use catalog::{Catalog, CatalogEntry, CatalogError};
pub use context::{global, LazyNamespace, SettingsContext};
