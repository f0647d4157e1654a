//! Integration tests for the runtime bindings over the in-process backend.

mod common;

use common::{
    IMP_CALL_COUNT, counting_imp, create_root_class, noop_imp, runtime, unique_name, void_signature,
};
use objenc::encoding::{Encode, TypeDesc, method_signature};
use objenc::runtime::{Class, LocalRuntime, Object, PropertyDecl, Runtime};
use objenc::{Error, encode_struct};
use std::ffi::c_void;
use std::sync::atomic::Ordering;
use std::thread;

encode_struct! {
    pub struct Vec2 {
        pub x: f64,
        pub y: f64,
    }
}

// ============================================================================
// Nil handles
// ============================================================================

#[test]
fn test_nil_class_is_well_defined() {
    let runtime = runtime();
    assert_eq!(runtime.class_name(Class::NIL), "");
    assert_eq!(runtime.superclass(Class::NIL), Class::NIL);
    assert!(!runtime.is_metaclass(Class::NIL));
    assert_eq!(runtime.instance_size(Class::NIL), 0);
    assert!(runtime.properties(Class::NIL).is_empty());
    assert_eq!(runtime.class_of(Object::NIL), Class::NIL);
}

// ============================================================================
// Class pairs
// ============================================================================

#[test]
fn test_class_pair_lifecycle() {
    let runtime = runtime();
    let name = unique_name("Lifecycle");

    let cls = runtime.allocate_class_pair(Class::NIL, &name, 0).unwrap();
    assert_eq!(runtime.class_name(cls), name);
    assert!(runtime.class_by_name(&name).is_none());

    runtime.register_class_pair(cls).unwrap();
    assert_eq!(runtime.class_by_name(&name), Some(cls));

    // SAFETY: cls is not used as a class again below
    unsafe { runtime.dispose_class_pair(cls) };
    assert!(runtime.class_by_name(&name).is_none());

    // the name is free again
    let again = runtime.allocate_class_pair(Class::NIL, &name, 0).unwrap();
    unsafe { runtime.dispose_class_pair(again) };
}

#[test]
fn test_superclass_with_live_subclass_is_kept() {
    let runtime = Runtime::local();
    let base = runtime.allocate_class_pair(Class::NIL, "Base", 0).unwrap();
    let child = runtime.allocate_class_pair(base, "Child", 0).unwrap();
    runtime.register_class_pair(base).unwrap();
    runtime.register_class_pair(child).unwrap();

    unsafe { runtime.dispose_class_pair(base) };
    let other = runtime.allocate_class_pair(Class::NIL, "Other", 0).unwrap();

    assert_eq!(runtime.class_by_name("Base"), Some(base));
    assert_eq!(runtime.superclass(child), base);
    assert_ne!(runtime.superclass(child), other);
    assert_eq!(runtime.class_name(runtime.superclass(child)), "Base");
    assert_eq!(runtime.backend().class_pair_count(), 3);
}

#[test]
fn test_disposed_handle_keeps_its_identity() {
    let runtime = Runtime::local();
    let gone = runtime.allocate_class_pair(Class::NIL, "Gone", 0).unwrap();
    runtime.register_class_pair(gone).unwrap();
    unsafe { runtime.dispose_class_pair(gone) };

    let fresh = runtime.allocate_class_pair(Class::NIL, "Fresh", 0).unwrap();
    assert_ne!(fresh, gone);
    assert_eq!(runtime.class_name(gone), "Gone");
    assert_eq!(runtime.class_name(fresh), "Fresh");
    assert!(runtime.class_by_name("Gone").is_none());

    // a disposed class cannot be built on or registered again
    assert!(runtime.allocate_class_pair(gone, "Heir", 0).is_err());
    runtime.register_class_pair(gone).unwrap();
    assert!(runtime.class_by_name("Gone").is_none());
}

#[test]
fn test_foreign_class_handle_reads_as_nil() {
    let runtime = Runtime::local();
    let mut word = 0usize;
    // SAFETY: LocalRuntime checks handles before reading through them
    let forged = unsafe { Class::from_ptr((&raw mut word).cast()) };

    assert_eq!(runtime.class_name(forged), "nil");
    assert!(runtime.superclass(forged).is_nil());
    assert!(!runtime.is_metaclass(forged));
    assert_eq!(runtime.instance_size(forged), 0);
    assert!(runtime.properties(forged).is_empty());
    assert!(runtime.metaclass(forged).is_nil());
    assert!(runtime.construct_instance(forged).is_err());
    assert_eq!(word, 0);
}

#[test]
fn test_metaclass_registration_is_an_error() {
    let runtime = runtime();
    let name = unique_name("Registered");
    let cls = runtime.allocate_class_pair(Class::NIL, &name, 0).unwrap();

    assert_eq!(
        runtime.register_class_pair(runtime.metaclass(cls)),
        Err(Error::UnexpectedMetaclass { name: name.clone() })
    );
    assert!(runtime.class_by_name(&name).is_none());
}

#[test]
fn test_name_taken_is_recoverable() {
    let runtime = runtime();
    let cls = create_root_class("Taken");
    let name = runtime.class_name(cls);

    assert_eq!(
        runtime.allocate_class_pair(Class::NIL, &name, 0),
        Err(Error::ClassAllocationFailed { name: name.clone() })
    );
    assert_eq!(runtime.class_by_name(&name), Some(cls));
}

#[test]
fn test_hierarchy() {
    let runtime = runtime();
    let base = create_root_class("Base");
    let derived = runtime
        .allocate_class_pair(base, &unique_name("Derived"), 0)
        .unwrap();
    runtime.register_class_pair(derived).unwrap();

    assert_eq!(runtime.superclass(derived), base);
    assert_eq!(runtime.superclass(base), Class::NIL);
    assert_eq!(runtime.instance_size(derived), runtime.instance_size(base));

    let base_meta = runtime.metaclass(base);
    let derived_meta = runtime.metaclass(derived);
    assert!(runtime.is_metaclass(derived_meta));
    assert!(!runtime.is_metaclass(derived));
    assert_eq!(runtime.superclass(derived_meta), base_meta);
    assert_eq!(runtime.class_name(derived_meta), runtime.class_name(derived));
}

#[test]
fn test_concurrent_allocation() {
    let runtime = runtime();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            thread::spawn(move || {
                let name = unique_name("Threaded");
                let cls = runtime.allocate_class_pair(Class::NIL, &name, 0).unwrap();
                runtime.register_class_pair(cls).unwrap();
                (name, cls)
            })
        })
        .collect();

    for handle in handles {
        let (name, cls) = handle.join().unwrap();
        assert_eq!(runtime.class_by_name(&name), Some(cls));
    }
}

// ============================================================================
// Methods and selectors
// ============================================================================

#[test]
fn test_selectors_are_unique_per_name() {
    let runtime = runtime();
    let a = runtime.selector("setValue:forKey:").unwrap();
    let b = runtime.selector("setValue:forKey:").unwrap();
    assert_eq!(a, b);
    assert_eq!(runtime.selector_name(a), "setValue:forKey:");
    assert!(runtime.selector("").is_err());
}

#[test]
fn test_add_method() {
    let runtime = runtime();
    let cls = runtime
        .allocate_class_pair(Class::NIL, &unique_name("Methods"), 0)
        .unwrap();
    let sel = runtime.selector("tick").unwrap();
    let sig = method_signature(&TypeDesc::Void, &[Vec2::type_desc()]).unwrap();
    assert_eq!(sig, "v@:{Vec2=dd}");

    runtime.add_method(cls, sel, counting_imp, &sig).unwrap();
    assert_eq!(
        runtime.add_method(cls, sel, noop_imp, &void_signature()),
        Err(Error::MethodRejected {
            selector: "tick".to_string()
        })
    );
    runtime.register_class_pair(cls).unwrap();
}

#[test]
fn test_method_lookup_walks_superclasses() {
    let runtime = runtime();
    let base = create_root_class("Counter");
    let sel = runtime.selector("count").unwrap();
    let sig = void_signature();
    let child = runtime
        .allocate_class_pair(base, &unique_name("SubCounter"), 0)
        .unwrap();
    runtime.add_method(base, sel, counting_imp, &sig).unwrap();
    runtime.register_class_pair(child).unwrap();

    let method = runtime.method(child, sel).unwrap();
    assert_eq!(runtime.method(base, sel), Some(method));
    assert_eq!(runtime.method_selector(method), sel);
    assert_eq!(runtime.method_type_encoding(method), "v@:");

    let before = IMP_CALL_COUNT.load(Ordering::SeqCst);
    let imp = runtime.method_imp(method).unwrap();
    unsafe { imp() };
    assert!(IMP_CALL_COUNT.load(Ordering::SeqCst) > before);

    let missing = runtime.selector("neverAdded").unwrap();
    assert!(runtime.method(child, missing).is_none());
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_properties() {
    let runtime = runtime();
    let base = runtime
        .allocate_class_pair(Class::NIL, &unique_name("Shape"), 0)
        .unwrap();
    runtime
        .add_property(base, &PropertyDecl::of::<Vec2>("origin").unwrap())
        .unwrap();
    runtime
        .add_property(base, &PropertyDecl::of::<f64>("area").unwrap().readonly())
        .unwrap();
    runtime.register_class_pair(base).unwrap();

    let listed = runtime.properties(base);
    let names: Vec<_> = listed.iter().map(|p| runtime.property_name(*p)).collect();
    assert_eq!(names, ["origin", "area"]);

    let area = runtime.property(base, "area").unwrap();
    assert_eq!(runtime.property_attributes(area), "Td,R");
    let origin = runtime.property(base, "origin").unwrap();
    assert_eq!(runtime.property_attributes(origin), "T{Vec2=dd}");
    assert!(runtime.property(base, "missing").is_none());
}

#[test]
fn test_properties_are_inherited_but_not_listed() {
    let runtime = runtime();
    let base = runtime
        .allocate_class_pair(Class::NIL, &unique_name("Parent"), 0)
        .unwrap();
    runtime
        .add_property(base, &PropertyDecl::of::<i32>("count").unwrap().nonatomic())
        .unwrap();
    runtime.register_class_pair(base).unwrap();

    let child = runtime
        .allocate_class_pair(base, &unique_name("Child"), 0)
        .unwrap();
    runtime.register_class_pair(child).unwrap();

    let found = runtime.property(child, "count").unwrap();
    assert_eq!(runtime.property_attributes(found), "Ti,N");
    assert!(runtime.properties(child).is_empty());
}

#[test]
fn test_property_after_registration_is_rejected() {
    let runtime = runtime();
    let cls = create_root_class("Sealed");
    assert_eq!(
        runtime.add_property(cls, &PropertyDecl::of::<bool>("late").unwrap()),
        Err(Error::PropertyRejected {
            name: "late".to_string()
        })
    );
}

// ============================================================================
// Instances
// ============================================================================

#[test]
fn test_instance_lifecycle() {
    let runtime = Runtime::new(LocalRuntime::with_root_size(32));
    let cls = runtime.allocate_class_pair(Class::NIL, "Buffer", 0).unwrap();
    runtime.register_class_pair(cls).unwrap();

    let instance = runtime.construct_instance(cls).unwrap();
    assert_eq!(instance.size(), 32);
    assert_eq!(runtime.class_of(instance.object()), cls);

    // memory past the isa starts zeroed
    let words = instance.object().as_ptr().cast::<*mut c_void>();
    for i in 1..4 {
        assert!(unsafe { words.add(i).read() }.is_null());
    }

    runtime.destruct_instance(instance);
}

#[test]
fn test_instance_of_nil_class() {
    assert_eq!(
        runtime().construct_instance(Class::NIL).map(|i| i.size()),
        Err(Error::NilHandle { what: "class" })
    );
}

#[test]
fn test_objects_and_classes_encode_as_objects() {
    assert_eq!(Object::encoding().unwrap(), "@");
    assert_eq!(Class::encoding().unwrap(), "@");
}
