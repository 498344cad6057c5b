//! Lazily initialized settings registries.
//!
//! A [`LazyNamespace`] performs all declarations on first touch and seals
//! the result. Concurrent first callers block until that single pass is
//! done; later calls are a lock-free read of the cell.
//!
//! [`SettingsContext`] owns the builtin namespace and the typed handles
//! resolved from it. Create one per process (or per test) and pass it
//! around; [`global`] wraps one in a `static` for callers that want it.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use xcsettings_core::{AssignmentTable, Bindings, LookupError, Namespace, Scope};

use crate::builtins::BuiltinSettings;
use crate::catalog::Catalog;

type Initializer = Box<dyn Fn(&Namespace) + Send + Sync>;

/// A namespace populated exactly once, on first use.
pub struct LazyNamespace {
    label: String,
    cell: OnceLock<Arc<Namespace>>,
    init: Initializer,
    passes: AtomicUsize,
}

impl LazyNamespace {
    /// `init` receives the open namespace and declares into it. The
    /// namespace is sealed afterwards.
    pub fn new(label: impl Into<String>, init: impl Fn(&Namespace) + Send + Sync + 'static) -> Self {
        LazyNamespace {
            label: label.into(),
            cell: OnceLock::new(),
            init: Box::new(init),
            passes: AtomicUsize::new(0),
        }
    }

    /// A namespace declaring every row of `catalog`.
    ///
    /// # Panics
    ///
    /// On first use, if the catalog does not declare cleanly. A shipped
    /// catalog that collides with itself is a bug, not a runtime condition.
    pub fn from_catalog(label: impl Into<String>, catalog: Catalog) -> Self {
        Self::new(label, move |ns| {
            if let Err(err) = catalog.declare_into(ns) {
                panic!("invalid settings catalog for '{}': {}", ns.label(), err);
            }
        })
    }

    /// The sealed namespace, initializing it if needed.
    pub fn get(&self) -> &Arc<Namespace> {
        if let Some(ns) = self.cell.get() {
            return ns;
        }
        self.cell.get_or_init(|| {
            let pass = self.passes.fetch_add(1, Ordering::SeqCst) + 1;
            let ns = Namespace::new(self.label.clone());
            (self.init)(&ns);
            ns.seal();
            tracing::debug!(
                namespace = %self.label,
                entries = ns.len(),
                pass,
                "namespace initialized"
            );
            Arc::new(ns)
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    /// How many times the initializer has started. At most one pass
    /// completes; a pass that panics leaves the cell empty and the next
    /// [`get`](Self::get) runs the initializer again.
    pub fn initialization_passes(&self) -> usize {
        self.passes.load(Ordering::SeqCst)
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for LazyNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyNamespace")
            .field("label", &self.label)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

/// The builtin registry plus typed handles into it.
#[derive(Debug)]
pub struct SettingsContext {
    namespace: LazyNamespace,
    builtins: OnceLock<Result<BuiltinSettings, LookupError>>,
}

impl SettingsContext {
    /// A context over the builtin catalog.
    pub fn new() -> Self {
        Self::with_catalog(Catalog::builtin())
    }

    /// A context over a custom catalog, e.g. one loaded with
    /// [`Catalog::from_file`].
    pub fn with_catalog(catalog: Catalog) -> Self {
        SettingsContext {
            namespace: LazyNamespace::from_catalog("builtin", catalog),
            builtins: OnceLock::new(),
        }
    }

    /// The sealed builtin namespace.
    pub fn namespace(&self) -> &Arc<Namespace> {
        self.namespace.get()
    }

    pub fn lazy_namespace(&self) -> &LazyNamespace {
        &self.namespace
    }

    /// Typed handles for the builtin settings. Fails when the catalog lacks
    /// one of them or declares it with another kind.
    pub fn builtins(&self) -> Result<&BuiltinSettings, LookupError> {
        self.builtins
            .get_or_init(|| BuiltinSettings::resolve(self.namespace()))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// An open namespace for project-defined settings, layered over the
    /// builtin one.
    pub fn project_namespace(&self, label: impl Into<String>) -> Namespace {
        Namespace::child(self.namespace().clone(), label)
    }

    /// A scope over the builtin namespace.
    pub fn scope(&self, layers: Vec<Arc<AssignmentTable>>, bindings: Bindings) -> Scope {
        Scope::new(self.namespace().clone(), layers, bindings)
    }
}

impl Default for SettingsContext {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: OnceLock<SettingsContext> = OnceLock::new();

/// Process-wide builtin context.
pub fn global() -> &'static SettingsContext {
    GLOBAL.get_or_init(SettingsContext::new)
}
