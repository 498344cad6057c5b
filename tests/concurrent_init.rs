//! Concurrent first-use tests for lazily initialized namespaces.
//!
//! Many threads touch a `LazyNamespace` at once; exactly one of them runs
//! the initializer and every thread sees the same sealed namespace.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use xcsettings::{AssignmentTable, Bindings, LazyNamespace, Scope, SettingsContext};

const THREADS: usize = 16;

// === LazyNamespace Tests ===

#[test]
fn test_single_initialization_pass() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let lazy = Arc::new(LazyNamespace::new("concurrent", move |ns| {
        counter.fetch_add(1, Ordering::SeqCst);
        // Widen the window for racing threads.
        thread::sleep(Duration::from_millis(20));
        for i in 0..50 {
            ns.declare_string_macro(&format!("SETTING_{}", i)).unwrap();
        }
    }));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let lazy = lazy.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                let ns = lazy.get().clone();
                assert!(ns.is_sealed());
                assert_eq!(ns.len(), 50);
                ns
            })
        })
        .collect();

    let namespaces: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("Thread panicked"))
        .collect();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(lazy.initialization_passes(), 1);
    for ns in &namespaces {
        assert!(Arc::ptr_eq(ns, &namespaces[0]));
    }
}

#[test]
fn test_builtin_context_concurrent_first_use() {
    let context = Arc::new(SettingsContext::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let context = context.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                let b = context.builtins().expect("builtin handles");
                // Each thread evaluates in its own scope.
                let mut table = AssignmentTable::new("target");
                table.push(&b.product_name, &format!("App{}", i));
                let scope = context.scope(vec![Arc::new(table)], Bindings::new());
                scope.evaluate(&b.product_name)
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().expect("Thread panicked"), format!("App{}", i));
    }
    assert_eq!(context.lazy_namespace().initialization_passes(), 1);
}

// === Sharing Tests ===

#[test]
fn test_layers_shared_across_threads() {
    let context = Arc::new(SettingsContext::new());
    let b = context.builtins().unwrap().clone();

    let mut project = AssignmentTable::new("project");
    project.push(&b.other_cflags, "-Wall $(ARCH_FLAGS_$(CURRENT_ARCH))");
    let project = Arc::new(project);

    let handles: Vec<_> = ["arm64", "x86_64"]
        .into_iter()
        .map(|arch| {
            let context = context.clone();
            let project = project.clone();
            let b = b.clone();
            thread::spawn(move || {
                let mut target = AssignmentTable::new("target");
                target.push(&b.current_arch, arch);
                let scope = Scope::new(
                    context.namespace().clone(),
                    vec![Arc::new(target), project],
                    Bindings::new().bind(&b.conditions.arch, arch),
                );
                scope.evaluate(&b.other_cflags)
            })
        })
        .collect();

    for handle in handles {
        // ARCH_FLAGS_* is not declared, so the bracketed reference is empty.
        assert_eq!(handle.join().expect("Thread panicked"), vec!["-Wall"]);
    }
}
