//! Command-line argument helpers.
//!
//! Tool specs build argument vectors from settings, emitting arguments
//! only for settings that are set:
//!
//! ```
//! use std::sync::Arc;
//! use xcsettings::args::{each_if_set, flag_if, if_set};
//! use xcsettings::{AssignmentTable, Bindings, SettingsContext};
//!
//! let context = SettingsContext::new();
//! let builtins = context.builtins().unwrap();
//!
//! let mut target = AssignmentTable::new("target");
//! target.push(&builtins.header_search_paths, "/usr/include/a ./b");
//! target.push(&builtins.enable_testability, "YES");
//! let scope = context.scope(vec![Arc::new(target)], Bindings::new());
//!
//! let mut args = Vec::new();
//! args.extend(each_if_set(&scope, &builtins.header_search_paths, |p| {
//!     [format!("-I{}", p.display())]
//! }));
//! args.extend(if_set(&scope, &builtins.product_name, |name| ["-o".to_string(), name]));
//! args.extend(flag_if(&scope, &builtins.enable_testability, "-enable-testing"));
//! assert_eq!(args, vec!["-I/usr/include/a", "-Ib", "-enable-testing"]);
//! ```

use std::path::PathBuf;

use xcsettings_core::{BooleanMacro, Macro, MacroType, Scope};

/// Whether an evaluated value counts as set.
pub trait IsSet {
    fn is_set(&self) -> bool;
}

impl IsSet for bool {
    fn is_set(&self) -> bool {
        *self
    }
}

impl IsSet for String {
    fn is_set(&self) -> bool {
        !self.is_empty()
    }
}

impl IsSet for PathBuf {
    fn is_set(&self) -> bool {
        !self.as_os_str().is_empty()
    }
}

impl<T> IsSet for Vec<T> {
    fn is_set(&self) -> bool {
        !self.is_empty()
    }
}

/// Arguments produced by `f` from the setting's value, or none when the
/// value is not set.
pub fn if_set<K, F, I>(scope: &Scope, setting: &Macro<K>, f: F) -> Vec<String>
where
    K: MacroType,
    K::Value: IsSet,
    F: FnOnce(K::Value) -> I,
    I: IntoIterator<Item = String>,
{
    let value = scope.evaluate(setting);
    if !value.is_set() {
        return Vec::new();
    }
    f(value).into_iter().collect()
}

/// Arguments produced by `f` for each element of a list setting, in order.
pub fn each_if_set<K, T, F, I>(scope: &Scope, setting: &Macro<K>, f: F) -> Vec<String>
where
    K: MacroType<Value = Vec<T>>,
    F: FnMut(T) -> I,
    I: IntoIterator<Item = String>,
{
    scope.evaluate(setting).into_iter().flat_map(f).collect()
}

/// `[flag]` when the boolean setting is true.
pub fn flag_if(scope: &Scope, setting: &BooleanMacro, flag: &str) -> Vec<String> {
    if scope.evaluate(setting) {
        vec![flag.to_string()]
    } else {
        Vec::new()
    }
}
