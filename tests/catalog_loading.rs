//! Catalog loading tests.
//!
//! Catalogs loaded from TOML files, merged with the builtin catalog and
//! used to build namespaces.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;
use xcsettings::{
    AssignmentTable, Bindings, Catalog, CatalogError, ConditionSet, MacroKind, Namespace,
    PathMacro, Scope, SettingsContext, StringListMacro,
};

fn write_catalog(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write catalog");
    file
}

// === File Loading Tests ===

#[test]
fn test_load_catalog_from_file() {
    let file = write_catalog(
        r#"
conditions = ["destination"]

[[setting]]
name = "TEST_HOST"
kind = "path"

[[setting]]
name = "TEST_TARGET_FLAGS"
kind = "string_list"
default = "-enable-testing"

[[setting]]
name = "TEST_LOG_LEVEL"
kind = "enumeration"
values = ["quiet", "normal", "verbose"]
default = "normal"
"#,
    );

    let catalog = Catalog::from_file(file.path()).unwrap();
    assert_eq!(catalog.conditions, vec!["destination"]);
    assert_eq!(catalog.settings.len(), 3);
    assert_eq!(catalog.settings[0].kind, MacroKind::Path);
}

#[test]
fn test_missing_file_is_io_error() {
    let err = Catalog::from_file(Path::new("/nonexistent/catalog.toml")).unwrap_err();
    assert!(matches!(err, CatalogError::IoError(_)));
    assert!(err.to_string().contains("/nonexistent/catalog.toml"));
}

#[test]
fn test_malformed_file_is_parse_error() {
    let file = write_catalog("[[setting]\nname = ");
    assert!(matches!(
        Catalog::from_file(file.path()),
        Err(CatalogError::ParseError(_))
    ));
}

#[test]
fn test_invalid_default_is_validation_error() {
    let file = write_catalog(
        r#"
[[setting]]
name = "TEST_LOG_LEVEL"
kind = "enumeration"
values = ["quiet", "normal"]
default = "loud"
"#,
    );
    let err = Catalog::from_file(file.path()).unwrap_err();
    assert!(matches!(err, CatalogError::ValidationError(_)));
    assert!(err.to_string().contains("loud"));
}

// === Merge Tests ===

#[test]
fn test_extend_builtin_catalog() {
    let file = write_catalog(
        r#"
[[setting]]
name = "TEST_TARGET_FLAGS"
kind = "string_list"
default = "-enable-testing"
"#,
    );

    let mut catalog = Catalog::builtin();
    let before = catalog.len();
    catalog.extend(Catalog::from_file(file.path()).unwrap());
    assert_eq!(catalog.len(), before + 1);

    let context = SettingsContext::with_catalog(catalog);
    let b = context.builtins().unwrap();
    let flags: StringListMacro = context.namespace().lookup("TEST_TARGET_FLAGS").unwrap();

    let mut table = AssignmentTable::new("target");
    table.push(&flags, "$(inherited) $(OTHER_SWIFT_FLAGS)");
    table.push(&b.other_swift_flags, "-DTESTING");
    let scope = context.scope(vec![Arc::new(table)], Bindings::new());
    assert_eq!(
        scope.evaluate(&flags),
        vec!["-enable-testing", "-DTESTING"]
    );
}

#[test]
fn test_extend_with_duplicate_is_rejected() {
    let mut catalog = Catalog::builtin();
    catalog.extend(
        Catalog::from_toml_str(
            r#"
[[setting]]
name = "ARCHS"
kind = "string_list"
"#,
        )
        .unwrap(),
    );
    assert!(matches!(
        catalog.build("merged"),
        Err(CatalogError::ValidationError(_))
    ));
}

// === Project Namespace Tests ===

#[test]
fn test_project_settings_over_loaded_catalog() {
    let file = write_catalog(
        r#"
conditions = ["destination"]

[[setting]]
name = "TEST_HOST"
kind = "path"
"#,
    );
    let ns = Arc::new(Catalog::from_file(file.path()).unwrap().build("tools").unwrap());
    let destination = ns.condition("destination").unwrap();

    let project = Arc::new(Namespace::child(ns.clone(), "project"));
    let app = project.declare_string_macro("APP_NAME").unwrap();
    let host: PathMacro = project.lookup("TEST_HOST").unwrap();

    let mut table = AssignmentTable::new("project");
    table.push(&app, "Demo");
    table.push_conditioned(
        &host,
        ConditionSet::new().with(&destination, "device").unwrap(),
        "/Applications/$(APP_NAME).app/$(APP_NAME)",
    );

    let device = Scope::new(
        project.clone(),
        vec![Arc::new(table)],
        Bindings::new().bind(&destination, "device"),
    );
    assert_eq!(
        device.evaluate(&host),
        PathBuf::from("/Applications/Demo.app/Demo")
    );
    let simulator = device.subscope(&destination, "simulator");
    assert_eq!(simulator.evaluate(&host), PathBuf::new());
}
