use super::*;
use crate::condition::ConditionSet;
use crate::declaration::{MacroEnum, MacroKind};
use crate::diagnostics::{DiagnosticKind, SyntaxErrorKind};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Warning {
    YesError,
    Yes,
    No,
}

impl MacroEnum for Warning {
    const VARIANTS: &'static [Self] = &[Warning::YesError, Warning::Yes, Warning::No];

    fn spelling(&self) -> &'static str {
        match self {
            Warning::YesError => "YES_ERROR",
            Warning::Yes => "YES",
            Warning::No => "NO",
        }
    }

    fn default_value() -> Self {
        Warning::No
    }
}

fn scope(ns: &Arc<Namespace>, layers: Vec<AssignmentTable>, bindings: Bindings) -> Scope {
    Scope::new(
        ns.clone(),
        layers.into_iter().map(Arc::new).collect(),
        bindings,
    )
}

// ============================================================================
// Precedence
// ============================================================================

#[test]
fn test_unassigned_uses_declared_default() {
    let ns = Arc::new(Namespace::new("test"));
    let product = ns.declare_string_macro_with_default("PRODUCT_NAME", "App").unwrap();
    let other = ns.declare_string_macro("OTHER").unwrap();
    let flag = ns.declare_boolean_macro("FLAG").unwrap();
    let list = ns.declare_string_list_macro("LIST").unwrap();
    let s = scope(&ns, vec![], Bindings::new());
    assert_eq!(s.evaluate(&product), "App");
    assert_eq!(s.evaluate(&other), "");
    assert!(!s.evaluate(&flag));
    assert!(s.evaluate(&list).is_empty());
    assert!(!s.is_assigned(&product));
}

#[test]
fn test_more_specific_condition_wins_within_layer() {
    let ns = Arc::new(Namespace::new("test"));
    let arch = ns.declare_condition_parameter("arch").unwrap();
    let x = ns.declare_string_macro("X").unwrap();

    let mut table = AssignmentTable::new("project");
    table.push_conditioned(&x, ConditionSet::new().with(&arch, "arm64").unwrap(), "b");
    table.push(&x, "a");

    let arm = scope(&ns, vec![table.clone()], Bindings::new().bind(&arch, "arm64"));
    assert_eq!(arm.evaluate(&x), "b");
    let intel = scope(&ns, vec![table.clone()], Bindings::new().bind(&arch, "x86_64"));
    assert_eq!(intel.evaluate(&x), "a");
    let unbound = scope(&ns, vec![table], Bindings::new());
    assert_eq!(unbound.evaluate(&x), "a");
}

#[test]
fn test_later_assignment_wins_at_equal_specificity() {
    let ns = Arc::new(Namespace::new("test"));
    let x = ns.declare_string_macro("X").unwrap();
    let mut table = AssignmentTable::new("t");
    table.push(&x, "first");
    table.push(&x, "second");
    let s = scope(&ns, vec![table], Bindings::new());
    assert_eq!(s.evaluate(&x), "second");
}

#[test]
fn test_layer_order_beats_specificity() {
    let ns = Arc::new(Namespace::new("test"));
    let sdk = ns.declare_condition_parameter("sdk").unwrap();
    let x = ns.declare_string_macro("X").unwrap();

    let mut overrides = AssignmentTable::new("overrides");
    overrides.push(&x, "override");
    let mut project = AssignmentTable::new("project");
    project.push_conditioned(&x, ConditionSet::new().with(&sdk, "iphone*").unwrap(), "sdk");

    let s = scope(
        &ns,
        vec![overrides, project],
        Bindings::new().bind(&sdk, "iphoneos17.0"),
    );
    assert_eq!(s.evaluate(&x), "override");
    assert_eq!(s.winning_layer(&x), Some("overrides"));
}

#[test]
fn test_glob_condition() {
    let ns = Arc::new(Namespace::new("test"));
    let sdk = ns.declare_condition_parameter("sdk").unwrap();
    let x = ns.declare_string_macro("X").unwrap();
    let mut table = AssignmentTable::new("t");
    table.push_conditioned(&x, ConditionSet::new().with(&sdk, "iphone*").unwrap(), "ios");

    let s = scope(&ns, vec![table.clone()], Bindings::new().bind(&sdk, "iphoneos17.0"));
    assert_eq!(s.evaluate(&x), "ios");
    let s = scope(&ns, vec![table], Bindings::new().bind(&sdk, "macosx14.0"));
    assert_eq!(s.evaluate(&x), "");
}

// ============================================================================
// Expansion
// ============================================================================

#[test]
fn test_references_expand_recursively() {
    let ns = Arc::new(Namespace::new("test"));
    let root = ns.declare_path_macro("SRCROOT").unwrap();
    let build = ns.declare_path_macro("BUILD_DIR").unwrap();
    let products = ns.declare_path_macro("PRODUCTS_DIR").unwrap();

    let mut table = AssignmentTable::new("t");
    table.push(&root, "/src/app");
    table.push(&build, "$(SRCROOT)/build");
    table.push(&products, "${BUILD_DIR}//Debug/");

    let s = scope(&ns, vec![table], Bindings::new());
    assert_eq!(s.evaluate(&products), PathBuf::from("/src/app/build/Debug"));
    let diags = s.take_diagnostics();
    assert_eq!(diags.len(), 1);
    assert!(matches!(
        diags[0].kind,
        DiagnosticKind::Syntax {
            error: SyntaxErrorKind::DeprecatedReferenceSyntax,
            ..
        }
    ));
    assert!(s.diagnostics().is_empty());
}

#[test]
fn test_list_references_splice_elements() {
    let ns = Arc::new(Namespace::new("test"));
    let defs = ns.declare_string_list_macro("DEFS").unwrap();
    let flags = ns.declare_string_list_macro("FLAGS").unwrap();
    let mut table = AssignmentTable::new("t");
    table.push(&defs, "-DA=1 \"-DB=two words\"");
    table.push(&flags, "-O2 $(DEFS) -g");
    let s = scope(&ns, vec![table], Bindings::new());
    assert_eq!(
        s.evaluate(&flags),
        vec!["-O2", "-DA=1", "-DB=two words", "-g"]
    );
    assert_eq!(s.evaluate_as_string(&flags), "-O2 -DA=1 \"-DB=two words\" -g");
}

#[test]
fn test_quoted_reference_is_one_element() {
    let ns = Arc::new(Namespace::new("test"));
    let name = ns.declare_string_macro("NAME").unwrap();
    let list = ns.declare_string_list_macro("LIST").unwrap();
    let args = ns.declare_string_list_macro("ARGS").unwrap();
    let mut table = AssignmentTable::new("t");
    table.push(&name, "My App");
    table.push(&list, "a b");
    table.push(&args, "-name \"$(NAME)\" \"$(LIST)\" $(LIST)");
    let s = scope(&ns, vec![table], Bindings::new());
    assert_eq!(s.evaluate(&args), vec!["-name", "My App", "a b", "a", "b"]);
}

#[test]
fn test_prefix_joins_first_list_element() {
    let ns = Arc::new(Namespace::new("test"));
    let list = ns.declare_string_list_macro("LIST").unwrap();
    let mut table = AssignmentTable::new("t");
    table.push(&list, "a b");
    let s = scope(&ns, vec![table], Bindings::new());
    assert_eq!(s.evaluate_list_expression("-I$(LIST)"), vec!["-Ia", "b"]);
}

#[test]
fn test_unresolved_references() {
    let ns = Arc::new(Namespace::new("test"));
    let known = ns.declare_string_macro("KNOWN").unwrap();
    let s = scope(&ns, vec![], Bindings::new());
    assert_eq!(s.evaluate_expression("[$(UNKNOWN)]"), "[]");
    assert_eq!(s.evaluate_expression("[$UNKNOWN]"), "[$UNKNOWN]");
    assert_eq!(s.evaluate_expression("[$(KNOWN)]"), "[]");
    assert_eq!(s.evaluate_expression("[$KNOWN]"), "[$KNOWN]");
    assert_eq!(known.name(), "KNOWN");
}

#[test]
fn test_dynamic_reference_names() {
    let ns = Arc::new(Namespace::new("test"));
    let config = ns.declare_string_macro("CONFIGURATION").unwrap();
    let debug = ns.declare_string_list_macro("FLAGS_Debug").unwrap();
    let flags = ns.declare_string_list_macro("FLAGS").unwrap();
    let mut table = AssignmentTable::new("t");
    table.push(&config, "Debug");
    table.push(&debug, "-O0 -g");
    table.push(&flags, "$(FLAGS_$(CONFIGURATION))");
    let s = scope(&ns, vec![table], Bindings::new());
    assert_eq!(s.evaluate(&flags), vec!["-O0", "-g"]);
}

#[test]
fn test_operators_in_expressions() {
    let ns = Arc::new(Namespace::new("test"));
    let file = ns.declare_path_macro("INFOPLIST_FILE").unwrap();
    let srcs = ns.declare_string_list_macro("SOURCES").unwrap();
    let empty = ns.declare_string_macro("EMPTY").unwrap();
    let mut table = AssignmentTable::new("t");
    table.push(&file, "/src/App/Info.plist");
    table.push(&srcs, "a.c b.c");
    let s = scope(&ns, vec![table], Bindings::new());

    assert_eq!(s.evaluate_expression("$(INFOPLIST_FILE:dir)"), "/src/App/");
    assert_eq!(s.evaluate_expression("$(INFOPLIST_FILE:file:upper)"), "INFO.PLIST");
    assert_eq!(s.evaluate_expression("$(INFOPLIST_FILE:base=Other)"), "/src/App/Other.plist");
    assert_eq!(s.evaluate_list_expression("$(SOURCES:suffix=o)"), vec!["a.o", "b.o"]);
    assert_eq!(s.evaluate_expression("$(EMPTY:default=fallback)"), "fallback");
    assert_eq!(s.evaluate_expression("$(UNKNOWN:default=$(INFOPLIST_FILE:suffix))"), ".plist");
    assert_eq!(empty.name(), "EMPTY");
}

// ============================================================================
// Inheritance
// ============================================================================

#[test]
fn test_inherited_splices_lower_layer() {
    let ns = Arc::new(Namespace::new("test"));
    let x = ns.declare_string_macro("X").unwrap();
    let mut target = AssignmentTable::new("target");
    target.push(&x, "$(inherited) extra");
    let mut project = AssignmentTable::new("project");
    project.push(&x, "base");
    let s = scope(&ns, vec![target, project], Bindings::new());
    assert_eq!(s.evaluate(&x), "base extra");
}

#[test]
fn test_inherited_walks_conditions_then_default() {
    let ns = Arc::new(Namespace::new("test"));
    let arch = ns.declare_condition_parameter("arch").unwrap();
    let flags = ns
        .declare_string_list_macro_with_default("FLAGS", ["-default"])
        .unwrap();

    let mut table = AssignmentTable::new("t");
    table.push(&flags, "$(inherited) -all");
    table.push_conditioned(
        &flags,
        ConditionSet::new().with(&arch, "arm64").unwrap(),
        "$(inherited) -arm",
    );

    let s = scope(&ns, vec![table], Bindings::new().bind(&arch, "arm64"));
    assert_eq!(s.evaluate(&flags), vec!["-default", "-all", "-arm"]);
}

#[test]
fn test_inherited_without_lower_value_is_empty() {
    let ns = Arc::new(Namespace::new("test"));
    let flags = ns.declare_string_list_macro("FLAGS").unwrap();
    let mut table = AssignmentTable::new("t");
    table.push(&flags, "$(inherited) -x");
    let s = scope(&ns, vec![table], Bindings::new());
    assert_eq!(s.evaluate(&flags), vec!["-x"]);
    assert_eq!(s.evaluate_expression("<$(inherited)>"), "<>");
}

#[test]
fn test_lists_are_not_deduplicated() {
    let ns = Arc::new(Namespace::new("test"));
    let flags = ns.declare_string_list_macro("FLAGS").unwrap();
    let mut upper = AssignmentTable::new("upper");
    upper.push(&flags, "$(inherited) -g");
    let mut lower = AssignmentTable::new("lower");
    lower.push(&flags, "-g");
    let s = scope(&ns, vec![upper, lower], Bindings::new());
    assert_eq!(s.evaluate(&flags), vec!["-g", "-g"]);
}

// ============================================================================
// Cycles
// ============================================================================

#[test]
fn test_mutual_reference_cycle_terminates() {
    let ns = Arc::new(Namespace::new("test"));
    let a = ns.declare_string_macro("A").unwrap();
    let b = ns.declare_string_macro("B").unwrap();
    let mut table = AssignmentTable::new("t");
    table.push(&a, "$(B)");
    table.push(&b, "$(A)");
    let s = scope(&ns, vec![table], Bindings::new());

    assert_eq!(s.evaluate(&a), "");
    let diags = s.diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(
        diags[0].kind,
        DiagnosticKind::ReferenceCycle {
            chain: vec!["A".into(), "B".into(), "A".into()]
        }
    );
}

#[test]
fn test_self_reference_cycle() {
    let ns = Arc::new(Namespace::new("test"));
    let a = ns.declare_string_macro("A").unwrap();
    let mut table = AssignmentTable::new("t");
    table.push(&a, "x$(A)y");
    let s = scope(&ns, vec![table], Bindings::new());
    assert_eq!(s.evaluate(&a), "xy");
    assert_eq!(s.diagnostics().len(), 1);
}

#[test]
fn test_cycle_results_do_not_depend_on_order() {
    let ns = Arc::new(Namespace::new("test"));
    let a = ns.declare_string_macro("A").unwrap();
    let b = ns.declare_string_macro("B").unwrap();
    let mut table = AssignmentTable::new("t");
    table.push(&a, "x$(B)");
    table.push(&b, "y$(A)");
    let table = Arc::new(table);

    let first = Scope::new(ns.clone(), vec![table.clone()], Bindings::new());
    let a1 = first.evaluate(&a);
    let b1 = first.evaluate(&b);

    let second = Scope::new(ns.clone(), vec![table], Bindings::new());
    let b2 = second.evaluate(&b);
    let a2 = second.evaluate(&a);

    assert_eq!((a1.as_str(), b1.as_str()), ("xy", "yx"));
    assert_eq!((a1, b1), (a2, b2));
}

#[test]
fn test_cycle_does_not_poison_unrelated_settings() {
    let ns = Arc::new(Namespace::new("test"));
    let a = ns.declare_string_macro("A").unwrap();
    let b = ns.declare_string_macro("B").unwrap();
    let c = ns.declare_string_macro("C").unwrap();
    let mut table = AssignmentTable::new("t");
    table.push(&a, "$(B)");
    table.push(&b, "$(A)");
    table.push(&c, "ok:$(A)");
    let s = scope(&ns, vec![table], Bindings::new());
    assert_eq!(s.evaluate(&c), "ok:");
    assert_eq!(s.evaluate(&c), "ok:");
    assert_eq!(s.diagnostics().len(), 1);
}

// ============================================================================
// Typed values
// ============================================================================

#[test]
fn test_boolean_values() {
    let ns = Arc::new(Namespace::new("test"));
    let on = ns.declare_boolean_macro_with_default("ON_BY_DEFAULT", true).unwrap();
    let flag = ns.declare_boolean_macro("FLAG").unwrap();
    let not = ns.declare_boolean_macro("NOT_FLAG").unwrap();
    let mut table = AssignmentTable::new("t");
    table.push_bool(&flag, true);
    table.push(&not, "$(FLAG:not)");
    let s = scope(&ns, vec![table], Bindings::new());
    assert!(s.evaluate(&on));
    assert!(s.evaluate(&flag));
    assert!(!s.evaluate(&not));
}

#[test]
fn test_enum_values() {
    let ns = Arc::new(Namespace::new("test"));
    let warn = ns.declare_enum_macro::<Warning>("CLANG_WARN_X").unwrap();
    let other = ns
        .declare_enum_macro_with_default("CLANG_WARN_Y", Warning::Yes)
        .unwrap();
    let mut table = AssignmentTable::new("t");
    table.push(&warn, "MAYBE");
    let s = scope(&ns, vec![table], Bindings::new());

    assert_eq!(s.evaluate(&warn), Warning::No);
    assert_eq!(s.evaluate(&other), Warning::Yes);
    let diags = s.diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].setting.as_deref(), Some("CLANG_WARN_X"));
    assert_eq!(warn.declaration().kind(), MacroKind::Enumeration);
    assert_eq!(warn.declaration().spellings().len(), 3);
}

#[test]
fn test_push_enum_and_literal_list() {
    let ns = Arc::new(Namespace::new("test"));
    let warn = ns.declare_enum_macro::<Warning>("W").unwrap();
    let paths = ns.declare_path_list_macro("PATHS").unwrap();
    let mut table = AssignmentTable::new("t");
    table.push_enum(&warn, Warning::YesError);
    table.push_literal_list(&paths, &["/a//b/", "$(NOT_EXPANDED)"]);
    let s = scope(&ns, vec![table], Bindings::new());
    assert_eq!(s.evaluate(&warn), Warning::YesError);
    assert_eq!(
        s.evaluate(&paths),
        vec![PathBuf::from("/a/b"), PathBuf::from("$(NOT_EXPANDED)")]
    );
}

#[test]
fn test_evaluate_as_list_of_scalar() {
    let ns = Arc::new(Namespace::new("test"));
    let name = ns.declare_string_macro("NAME").unwrap();
    let unset = ns.declare_string_macro("UNSET").unwrap();
    let mut table = AssignmentTable::new("t");
    table.push(&name, "a b");
    let s = scope(&ns, vec![table], Bindings::new());
    assert_eq!(s.evaluate_as_list(&name), vec!["a b"]);
    assert!(s.evaluate_as_list(&unset).is_empty());
}

// ============================================================================
// Scopes
// ============================================================================

#[test]
fn test_scope_construction_seals_namespace() {
    let ns = Arc::new(Namespace::new("test"));
    ns.declare_string_macro("A").unwrap();
    let _scope = scope(&ns, vec![], Bindings::new());
    assert!(ns.is_sealed());
    assert!(ns.declare_string_macro("B").is_err());
}

#[test]
fn test_subscope_replaces_binding() {
    let ns = Arc::new(Namespace::new("test"));
    let arch = ns.declare_condition_parameter("arch").unwrap();
    let x = ns.declare_string_macro("X").unwrap();
    let mut table = AssignmentTable::new("t");
    table.push(&x, "generic");
    table.push_conditioned(&x, ConditionSet::new().with(&arch, "arm64").unwrap(), "arm");
    let s = scope(&ns, vec![table], Bindings::new().bind(&arch, "x86_64"));
    assert_eq!(s.evaluate(&x), "generic");
    let arm = s.subscope(&arch, "arm64");
    assert_eq!(arm.evaluate(&x), "arm");
    assert_eq!(s.evaluate(&x), "generic");
}

#[test]
fn test_repeated_evaluation_is_idempotent() {
    let ns = Arc::new(Namespace::new("test"));
    let root = ns.declare_string_macro("ROOT").unwrap();
    let flags = ns.declare_string_list_macro("FLAGS").unwrap();
    let mut table = AssignmentTable::new("t");
    table.push(&root, "/r");
    table.push(&flags, "-I$(ROOT)/include $(inherited)");
    let s = scope(&ns, vec![table], Bindings::new());
    let first = s.evaluate(&flags);
    for _ in 0..3 {
        assert_eq!(s.evaluate(&flags), first);
    }
    assert_eq!(first, vec!["-I/r/include"]);
}

#[test]
fn test_syntax_problems_are_reported_once() {
    let ns = Arc::new(Namespace::new("test"));
    let x = ns.declare_string_macro("X").unwrap();
    let y = ns.declare_string_macro("Y").unwrap();
    let mut table = AssignmentTable::new("t");
    table.push(&x, "$(Y");
    table.push(&y, "value");
    let s = scope(&ns, vec![table], Bindings::new());
    assert_eq!(s.evaluate(&x), "value");
    assert_eq!(s.evaluate_as_string(&x), "value");
    let diags = s.diagnostics();
    assert_eq!(diags.len(), 1);
    assert!(diags[0].is_error());
    assert_eq!(y.name(), "Y");
}

#[test]
fn test_scope_is_send() {
    fn assert_send<T: Send>() {}
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send::<Scope>();
    assert_send_sync::<Namespace>();
    assert_send_sync::<AssignmentTable>();
}
