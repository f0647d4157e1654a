//! Integration tests for startup registration of interface lists.

mod common;

use common::{IMP_CALL_COUNT, counting_imp, noop_imp, unique_name, void_signature};
use objenc::Error;
use objenc::encoding::{EncodedString, TypeDesc, method_signature};
use objenc::runtime::{
    Interface, InterfaceList, LocalRuntime, MethodDecl, PropertyDecl, Runtime, deinit_runtime,
    init_runtime,
};
use std::sync::atomic::Ordering;

fn shapes() -> InterfaceList {
    let mut list = InterfaceList::new();
    list.push(
        Interface::new("Shape")
            .property(PropertyDecl::of::<f64>("area").unwrap().readonly())
            .method(MethodDecl::new("draw", noop_imp, void_signature())),
    )
    .push(
        Interface::new("Circle")
            .superclass("Shape")
            .property(PropertyDecl::of::<f64>("radius").unwrap().nonatomic()),
    )
    .push(Interface::new("Disc").superclass("Circle"));
    list
}

#[test]
fn test_init_registers_in_order() {
    let runtime = Runtime::local();
    let mut list = shapes();
    init_runtime(&runtime, &mut list).unwrap();

    let shape = runtime.class_by_name("Shape").unwrap();
    let circle = runtime.class_by_name("Circle").unwrap();
    let disc = runtime.class_by_name("Disc").unwrap();

    assert_eq!(runtime.superclass(circle), shape);
    assert_eq!(runtime.superclass(disc), circle);
    assert_eq!(list.get("Disc").unwrap().class(), Some(disc));

    let area = runtime.property(disc, "area").unwrap();
    assert_eq!(runtime.property_attributes(area), "Td,R");
    let radius = runtime.property(disc, "radius").unwrap();
    assert_eq!(runtime.property_attributes(radius), "Td,N");
}

#[test]
fn test_deinit_disposes_everything() {
    let runtime = Runtime::local();
    let mut list = shapes();
    init_runtime(&runtime, &mut list).unwrap();
    assert_eq!(runtime.backend().class_pair_count(), 3);

    unsafe { deinit_runtime(&runtime, &mut list) };
    assert_eq!(runtime.backend().class_pair_count(), 0);
    assert!(list.iter().all(|i| i.class().is_none()));

    // the list can be registered again
    init_runtime(&runtime, &mut list).unwrap();
    assert_eq!(runtime.backend().class_pair_count(), 3);
    unsafe { deinit_runtime(&runtime, &mut list) };
}

#[test]
fn test_superclass_from_runtime() {
    let runtime = Runtime::local();
    let mut base: InterfaceList = [Interface::new("Existing")].into_iter().collect();
    init_runtime(&runtime, &mut base).unwrap();

    let mut list: InterfaceList = [Interface::new("Extension").superclass("Existing")]
        .into_iter()
        .collect();
    init_runtime(&runtime, &mut list).unwrap();

    let existing = runtime.class_by_name("Existing").unwrap();
    let extension = list.get("Extension").unwrap().class().unwrap();
    assert_eq!(runtime.superclass(extension), existing);
}

#[test]
fn test_failure_rolls_back() {
    let runtime = Runtime::local();
    let sig = void_signature();
    let mut list: InterfaceList = [
        Interface::new("First"),
        Interface::new("Second").superclass("First"),
        Interface::new("Broken")
            .method(MethodDecl::new("go", noop_imp, sig.clone()))
            .method(MethodDecl::new("go", noop_imp, sig)),
    ]
    .into_iter()
    .collect();

    assert_eq!(
        init_runtime(&runtime, &mut list),
        Err(Error::MethodRejected {
            selector: "go".to_string()
        })
    );
    assert_eq!(runtime.backend().class_pair_count(), 0);
    assert!(runtime.class_by_name("First").is_none());
    assert!(list.iter().all(|i| i.class().is_none()));
}

#[test]
fn test_name_clash_with_runtime() {
    let runtime = Runtime::new(LocalRuntime::new());
    let name = unique_name("Clash");
    let mut first: InterfaceList = [Interface::new(name.as_str())].into_iter().collect();
    let mut second: InterfaceList = [Interface::new(name.as_str())].into_iter().collect();

    init_runtime(&runtime, &mut first).unwrap();
    assert_eq!(
        init_runtime(&runtime, &mut second),
        Err(Error::ClassAllocationFailed { name })
    );
    unsafe { deinit_runtime(&runtime, &mut first) };
}

#[test]
fn test_declared_methods_keep_their_imp() {
    let sig: EncodedString = method_signature(&TypeDesc::signed(32), &[]).unwrap();
    let decl = MethodDecl::new("count", counting_imp, sig);
    assert_eq!(decl.signature(), "i@:");

    let before = IMP_CALL_COUNT.load(Ordering::SeqCst);
    unsafe { (decl.imp())() };
    assert_eq!(IMP_CALL_COUNT.load(Ordering::SeqCst), before + 1);
}

#[test]
fn test_declared_methods_are_found_on_subclasses() {
    let runtime = Runtime::local();
    let mut list = shapes();
    init_runtime(&runtime, &mut list).unwrap();

    let disc = runtime.class_by_name("Disc").unwrap();
    let draw = runtime.selector("draw").unwrap();
    let method = runtime.method(disc, draw).unwrap();
    assert_eq!(runtime.method_type_encoding(method), "v@:");
    assert_eq!(runtime.selector_name(runtime.method_selector(method)), "draw");
}
