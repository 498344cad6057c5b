//! Typed build-setting namespace and conditional macro resolver.
//!
//! The pieces, leaves first:
//! - [`Namespace`]: declares typed settings ([`Macro<K>`]) and condition
//!   parameters; sealed once evaluation starts.
//! - [`AssignmentTable`]: one layer of conditioned raw assignments such as
//!   `OTHER_CFLAGS[sdk=iphone*] = $(inherited) -DIOS`.
//! - [`Scope`]: a namespace, a chain of layers and concrete condition
//!   [`Bindings`]; evaluates settings to typed values.
//!
//! ```
//! use std::sync::Arc;
//! use xcsettings_core::{AssignmentTable, Bindings, ConditionSet, Namespace, Scope};
//!
//! let ns = Arc::new(Namespace::new("example"));
//! let sdk = ns.declare_condition_parameter("sdk").unwrap();
//! let flags = ns.declare_string_list_macro("OTHER_CFLAGS").unwrap();
//!
//! let mut project = AssignmentTable::new("project");
//! project.push(&flags, "-Wall");
//! let mut target = AssignmentTable::new("target");
//! target.push_conditioned(
//!     &flags,
//!     ConditionSet::new().with(&sdk, "iphone*").unwrap(),
//!     "$(inherited) -DIOS",
//! );
//!
//! let scope = Scope::new(
//!     ns.clone(),
//!     vec![Arc::new(target), Arc::new(project)],
//!     Bindings::new().bind(&sdk, "iphoneos17.0"),
//! );
//! assert_eq!(scope.evaluate(&flags), vec!["-Wall", "-DIOS"]);
//! ```

pub mod condition;
pub mod declaration;
pub mod diagnostics;
pub mod error;
pub mod expression;
pub mod namespace;
pub mod scope;
pub mod table;
pub mod value;

pub use condition::{Bindings, Condition, ConditionParameter, ConditionSet};
pub use declaration::{
    AsDeclaration, BooleanKind, BooleanMacro, Declaration, EnumKind, EnumMacro, Literal, Macro,
    MacroEnum, MacroKind, MacroType, PathKind, PathListKind, PathListMacro, PathMacro, Resolved,
    StringKind, StringListKind, StringListMacro, StringMacro,
};
pub use diagnostics::{Diagnostic, DiagnosticKind, Severity, SyntaxDiagnostic, SyntaxErrorKind};
pub use error::{AssignmentError, ConditionError, DeclarationError, EntityKind, LookupError};
pub use expression::{Expression, ExpressionKind};
pub use namespace::Namespace;
pub use scope::Scope;
pub use table::{Assignment, AssignmentTable};
