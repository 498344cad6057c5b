//! Declaration namespace.
//!
//! A namespace owns the macro declarations and condition parameters of one
//! configuration domain. Names are unique across both kinds of entity (and
//! across a parent namespace, if any).
//!
//! Lifecycle:
//! - **open**: declarations are registered under a mutex;
//! - **sealed**: the registry is moved into a one-shot cell and all lookups
//!   are lock-free. Constructing a [`Scope`](crate::Scope) seals the
//!   namespace; nothing can be declared afterwards.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use crate::condition::ConditionParameter;
use crate::declaration::{
    BooleanKind, BooleanMacro, Declaration, EnumKind, EnumMacro, Literal, Macro, MacroEnum,
    MacroKind, MacroType, PathKind, PathListKind, PathListMacro, PathMacro, StringKind,
    StringListKind, StringListMacro, StringMacro,
};
use crate::error::{DeclarationError, EntityKind, LookupError};
use crate::value::bool_spelling;

#[derive(Debug, Clone)]
enum Entity {
    Macro(Declaration),
    Condition(ConditionParameter),
}

impl Entity {
    fn kind(&self) -> EntityKind {
        match self {
            Entity::Macro(decl) => EntityKind::Macro(decl.kind()),
            Entity::Condition(_) => EntityKind::ConditionParameter,
        }
    }
}

#[derive(Debug, Default)]
struct Registry {
    entries: HashMap<Arc<str>, Entity>,
    order: Vec<Arc<str>>,
}

/// Registry of declarations and condition parameters.
pub struct Namespace {
    label: String,
    parent: Option<Arc<Namespace>>,
    open: Mutex<Registry>,
    sealed: OnceLock<Registry>,
}

impl Namespace {
    /// Create an empty, open namespace.
    pub fn new(label: impl Into<String>) -> Self {
        Namespace {
            label: label.into(),
            parent: None,
            open: Mutex::new(Registry::default()),
            sealed: OnceLock::new(),
        }
    }

    /// Create an open namespace layered over `parent`.
    ///
    /// The parent is sealed first. Lookups fall through to it, and names
    /// declared here must not collide with the parent's.
    pub fn child(parent: Arc<Namespace>, label: impl Into<String>) -> Self {
        parent.seal();
        Namespace {
            parent: Some(parent),
            ..Namespace::new(label)
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parent(&self) -> Option<&Arc<Namespace>> {
        self.parent.as_ref()
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.get().is_some()
    }

    /// Freeze the namespace. Idempotent.
    pub fn seal(&self) {
        if self.is_sealed() {
            return;
        }
        let mut open = self.lock();
        if self.is_sealed() {
            return;
        }
        let registry = std::mem::take(&mut *open);
        let count = registry.order.len();
        // Only reachable with the mutex held, so the cell is still empty.
        let _ = self.sealed.set(registry);
        tracing::debug!(namespace = %self.label, entries = count, "namespace sealed");
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_registry<R>(&self, f: impl FnOnce(&Registry) -> R) -> R {
        if let Some(registry) = self.sealed.get() {
            return f(registry);
        }
        let open = self.lock();
        // Sealing happens under the mutex; re-check now that we hold it.
        match self.sealed.get() {
            Some(registry) => f(registry),
            None => f(&open),
        }
    }

    fn find(&self, name: &str) -> Option<Entity> {
        self.with_registry(|r| r.entries.get(name).cloned())
            .or_else(|| self.parent.as_ref().and_then(|p| p.find(name)))
    }

    fn declare<T: Clone>(
        &self,
        name: &str,
        make: impl FnOnce(Arc<str>) -> T,
        wrap: impl FnOnce(T) -> Entity,
    ) -> Result<T, DeclarationError> {
        if name.is_empty() {
            return Err(DeclarationError::EmptyName);
        }
        let sealed = || DeclarationError::Sealed {
            name: name.to_string(),
            namespace: self.label.clone(),
        };
        if self.is_sealed() {
            return Err(sealed());
        }
        let mut open = self.lock();
        if self.is_sealed() {
            return Err(sealed());
        }
        let existing = open
            .entries
            .get(name)
            .cloned()
            .or_else(|| self.parent.as_ref().and_then(|p| p.find(name)));
        if let Some(existing) = existing {
            return Err(DeclarationError::Duplicate {
                name: name.to_string(),
                existing: existing.kind(),
            });
        }
        let key: Arc<str> = Arc::from(name);
        let declared = make(key.clone());
        open.entries.insert(key.clone(), wrap(declared.clone()));
        open.order.push(key);
        Ok(declared)
    }

    /// Declare a macro of any kind. Typed callers use the `declare_*_macro`
    /// methods instead.
    pub fn declare_macro(
        &self,
        name: &str,
        kind: MacroKind,
        default: Option<Literal>,
        spellings: Vec<String>,
    ) -> Result<Declaration, DeclarationError> {
        self.declare(
            name,
            |key| Declaration::new(key, kind, default, spellings),
            Entity::Macro,
        )
    }

    fn declare_typed<K: MacroType>(
        &self,
        name: &str,
        default: Option<Literal>,
    ) -> Result<Macro<K>, DeclarationError> {
        let decl = self.declare_macro(name, K::KIND, default, K::spellings())?;
        Ok(Macro::new(decl))
    }

    pub fn declare_boolean_macro(&self, name: &str) -> Result<BooleanMacro, DeclarationError> {
        self.declare_typed::<BooleanKind>(name, None)
    }

    pub fn declare_boolean_macro_with_default(
        &self,
        name: &str,
        default: bool,
    ) -> Result<BooleanMacro, DeclarationError> {
        let default = Literal::Scalar(bool_spelling(default).to_string());
        self.declare_typed::<BooleanKind>(name, Some(default))
    }

    pub fn declare_string_macro(&self, name: &str) -> Result<StringMacro, DeclarationError> {
        self.declare_typed::<StringKind>(name, None)
    }

    pub fn declare_string_macro_with_default(
        &self,
        name: &str,
        default: impl Into<String>,
    ) -> Result<StringMacro, DeclarationError> {
        self.declare_typed::<StringKind>(name, Some(Literal::Scalar(default.into())))
    }

    pub fn declare_string_list_macro(
        &self,
        name: &str,
    ) -> Result<StringListMacro, DeclarationError> {
        self.declare_typed::<StringListKind>(name, None)
    }

    pub fn declare_string_list_macro_with_default<I, S>(
        &self,
        name: &str,
        default: I,
    ) -> Result<StringListMacro, DeclarationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let default = Literal::List(default.into_iter().map(Into::into).collect());
        self.declare_typed::<StringListKind>(name, Some(default))
    }

    pub fn declare_path_macro(&self, name: &str) -> Result<PathMacro, DeclarationError> {
        self.declare_typed::<PathKind>(name, None)
    }

    pub fn declare_path_macro_with_default(
        &self,
        name: &str,
        default: impl Into<String>,
    ) -> Result<PathMacro, DeclarationError> {
        self.declare_typed::<PathKind>(name, Some(Literal::Scalar(default.into())))
    }

    pub fn declare_path_list_macro(&self, name: &str) -> Result<PathListMacro, DeclarationError> {
        self.declare_typed::<PathListKind>(name, None)
    }

    pub fn declare_path_list_macro_with_default<I, S>(
        &self,
        name: &str,
        default: I,
    ) -> Result<PathListMacro, DeclarationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let default = Literal::List(default.into_iter().map(Into::into).collect());
        self.declare_typed::<PathListKind>(name, Some(default))
    }

    pub fn declare_enum_macro<T: MacroEnum>(
        &self,
        name: &str,
    ) -> Result<EnumMacro<T>, DeclarationError> {
        self.declare_typed::<EnumKind<T>>(name, None)
    }

    pub fn declare_enum_macro_with_default<T: MacroEnum>(
        &self,
        name: &str,
        default: T,
    ) -> Result<EnumMacro<T>, DeclarationError> {
        let default = Literal::Scalar(default.spelling().to_string());
        self.declare_typed::<EnumKind<T>>(name, Some(default))
    }

    pub fn declare_condition_parameter(
        &self,
        name: &str,
    ) -> Result<ConditionParameter, DeclarationError> {
        self.declare(name, ConditionParameter::new, Entity::Condition)
    }

    pub fn lookup_declaration(&self, name: &str) -> Option<Declaration> {
        match self.find(name)? {
            Entity::Macro(decl) => Some(decl),
            Entity::Condition(_) => None,
        }
    }

    pub fn lookup_condition_parameter(&self, name: &str) -> Option<ConditionParameter> {
        match self.find(name)? {
            Entity::Condition(param) => Some(param),
            Entity::Macro(_) => None,
        }
    }

    /// Typed lookup; fails if the name is unknown or has a different kind.
    /// Enumerations must also declare exactly the spellings of `K`.
    pub fn lookup<K: MacroType>(&self, name: &str) -> Result<Macro<K>, LookupError> {
        let decl = self
            .lookup_declaration(name)
            .ok_or_else(|| LookupError::Unknown(name.to_string()))?;
        if decl.kind() != K::KIND {
            return Err(LookupError::KindMismatch {
                name: name.to_string(),
                expected: K::KIND,
                found: decl.kind(),
            });
        }
        let mut expected = K::spellings();
        let mut found = decl.spellings().to_vec();
        expected.sort();
        found.sort();
        if expected != found {
            return Err(LookupError::SpellingMismatch {
                name: name.to_string(),
                expected,
                found,
            });
        }
        Ok(Macro::new(decl))
    }

    /// Like [`lookup_condition_parameter`](Self::lookup_condition_parameter),
    /// as a `Result`.
    pub fn condition(&self, name: &str) -> Result<ConditionParameter, LookupError> {
        self.lookup_condition_parameter(name)
            .ok_or_else(|| LookupError::UnknownCondition(name.to_string()))
    }

    /// All macro declarations, parent first, each in declaration order.
    pub fn declarations(&self) -> Vec<Declaration> {
        let mut out = self
            .parent
            .as_ref()
            .map(|p| p.declarations())
            .unwrap_or_default();
        self.with_registry(|r| {
            out.extend(r.order.iter().filter_map(|name| match r.entries.get(name) {
                Some(Entity::Macro(decl)) => Some(decl.clone()),
                _ => None,
            }))
        });
        out
    }

    /// All condition parameters, parent first, each in declaration order.
    pub fn condition_parameters(&self) -> Vec<ConditionParameter> {
        let mut out = self
            .parent
            .as_ref()
            .map(|p| p.condition_parameters())
            .unwrap_or_default();
        self.with_registry(|r| {
            out.extend(r.order.iter().filter_map(|name| match r.entries.get(name) {
                Some(Entity::Condition(param)) => Some(param.clone()),
                _ => None,
            }))
        });
        out
    }

    /// Number of entities declared directly in this namespace.
    pub fn len(&self) -> usize {
        self.with_registry(|r| r.order.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Namespace")
            .field("label", &self.label)
            .field("sealed", &self.is_sealed())
            .field("entries", &self.len())
            .field("parent", &self.parent.as_ref().map(|p| p.label()))
            .finish()
    }
}
