// Common test utilities for integration tests
//
// Every test binary shares one in-process runtime. Class names are made
// unique with a counter so tests can run in parallel.

#![allow(dead_code)]

use objenc::encoding::{EncodedString, TypeDesc, method_signature};
use objenc::runtime::{Class, LocalRuntime, Runtime};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicUsize, Ordering};

static RUNTIME: OnceLock<Runtime<LocalRuntime>> = OnceLock::new();
static CLASS_ID: AtomicUsize = AtomicUsize::new(0);

/// Number of times `counting_imp` has run
pub static IMP_CALL_COUNT: AtomicUsize = AtomicUsize::new(0);

/// The shared runtime
pub fn runtime() -> &'static Runtime<LocalRuntime> {
    RUNTIME.get_or_init(Runtime::local)
}

/// A class name no other test uses
pub fn unique_name(prefix: &str) -> String {
    let id = CLASS_ID.fetch_add(1, Ordering::SeqCst);
    format!("{prefix}_{id}")
}

/// Allocates and registers a root class with a unique name
pub fn create_root_class(prefix: &str) -> Class {
    let runtime = runtime();
    let cls = runtime
        .allocate_class_pair(Class::NIL, &unique_name(prefix), 0)
        .expect("Failed to allocate test class");
    runtime
        .register_class_pair(cls)
        .expect("Failed to register test class");
    cls
}

/// `v@:`
pub fn void_signature() -> EncodedString {
    method_signature(&TypeDesc::Void, &[]).expect("Failed to build signature")
}

pub unsafe extern "C" fn noop_imp() {}

pub unsafe extern "C" fn counting_imp() {
    IMP_CALL_COUNT.fetch_add(1, Ordering::SeqCst);
}

/// An `Example { obj: object, s: c string, n: i32 }` description
pub fn example_struct() -> TypeDesc {
    TypeDesc::structure(
        "Example",
        [
            ("obj", TypeDesc::object_handle()),
            ("s", TypeDesc::c_string()),
            ("n", TypeDesc::signed(32)),
        ],
    )
}
