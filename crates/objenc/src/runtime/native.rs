//! The system Objective-C runtime.
//!
//! Only built with the `native` feature on Apple targets.

use super::backend::{Backend, PropertyAttribute};
use super::handle::{Bool, Class, Imp, Method, Object, Property, Sel};
use std::ffi::{CStr, c_char, c_uint, c_void};
use std::ptr;

#[link(name = "objc")]
unsafe extern "C" {
    fn class_getName(cls: Class) -> *const c_char;
    fn class_getSuperclass(cls: Class) -> Class;
    fn class_isMetaClass(cls: Class) -> Bool;
    fn class_getInstanceSize(cls: Class) -> usize;
    fn class_getProperty(cls: Class, name: *const c_char) -> Property;
    fn class_copyPropertyList(cls: Class, out_count: *mut c_uint) -> *mut Property;
    fn class_addMethod(cls: Class, name: Sel, imp: Imp, types: *const c_char) -> Bool;
    fn class_getInstanceMethod(cls: Class, name: Sel) -> Method;
    fn method_getName(method: Method) -> Sel;
    fn method_getImplementation(method: Method) -> Option<Imp>;
    fn method_getTypeEncoding(method: Method) -> *const c_char;
    fn class_addProperty(
        cls: Class,
        name: *const c_char,
        attributes: *const PropertyAttribute,
        attribute_count: c_uint,
    ) -> Bool;
    fn objc_allocateClassPair(superclass: Class, name: *const c_char, extra_bytes: usize) -> Class;
    fn objc_registerClassPair(cls: Class);
    fn objc_disposeClassPair(cls: Class);
    fn objc_constructInstance(cls: Class, bytes: *mut c_void) -> Object;
    fn objc_destructInstance(obj: Object) -> *mut c_void;
    fn objc_getClass(name: *const c_char) -> Class;
    fn object_getClass(obj: Object) -> Class;
    fn sel_registerName(name: *const c_char) -> Sel;
    fn sel_getName(sel: Sel) -> *const c_char;
    fn property_getName(property: Property) -> *const c_char;
    fn property_getAttributes(property: Property) -> *const c_char;
}

unsafe extern "C" {
    fn free(ptr: *mut c_void);
}

/// Forwards every entry point to `libobjc`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Native;

impl Backend for Native {
    unsafe fn class_get_name(&self, cls: Class) -> *const c_char {
        unsafe { class_getName(cls) }
    }

    unsafe fn class_get_superclass(&self, cls: Class) -> Class {
        unsafe { class_getSuperclass(cls) }
    }

    unsafe fn class_is_metaclass(&self, cls: Class) -> Bool {
        unsafe { class_isMetaClass(cls) }
    }

    unsafe fn class_get_instance_size(&self, cls: Class) -> usize {
        unsafe { class_getInstanceSize(cls) }
    }

    unsafe fn class_get_property(&self, cls: Class, name: &CStr) -> Property {
        unsafe { class_getProperty(cls, name.as_ptr()) }
    }

    unsafe fn class_copy_property_list(&self, cls: Class) -> Vec<Property> {
        let mut count: c_uint = 0;
        // SAFETY: the returned array holds `count` properties and is ours
        // to free
        unsafe {
            let list = class_copyPropertyList(cls, &raw mut count);
            if list.is_null() {
                return Vec::new();
            }
            let properties = std::slice::from_raw_parts(list, count as usize).to_vec();
            free(list.cast());
            properties
        }
    }

    unsafe fn class_add_method(&self, cls: Class, sel: Sel, imp: Imp, types: &CStr) -> Bool {
        unsafe { class_addMethod(cls, sel, imp, types.as_ptr()) }
    }

    unsafe fn class_get_instance_method(&self, cls: Class, sel: Sel) -> Method {
        unsafe { class_getInstanceMethod(cls, sel) }
    }

    unsafe fn method_get_name(&self, method: Method) -> Sel {
        unsafe { method_getName(method) }
    }

    unsafe fn method_get_implementation(&self, method: Method) -> Option<Imp> {
        unsafe { method_getImplementation(method) }
    }

    unsafe fn method_get_type_encoding(&self, method: Method) -> *const c_char {
        unsafe { method_getTypeEncoding(method) }
    }

    unsafe fn class_add_property(
        &self,
        cls: Class,
        name: &CStr,
        attributes: &[PropertyAttribute],
    ) -> Bool {
        let attrs = if attributes.is_empty() {
            ptr::null()
        } else {
            attributes.as_ptr()
        };
        #[allow(clippy::cast_possible_truncation)]
        let count = attributes.len() as c_uint;
        unsafe { class_addProperty(cls, name.as_ptr(), attrs, count) }
    }

    unsafe fn objc_allocate_class_pair(
        &self,
        superclass: Class,
        name: &CStr,
        extra_bytes: usize,
    ) -> Class {
        unsafe { objc_allocateClassPair(superclass, name.as_ptr(), extra_bytes) }
    }

    unsafe fn objc_register_class_pair(&self, cls: Class) {
        unsafe { objc_registerClassPair(cls) }
    }

    unsafe fn objc_dispose_class_pair(&self, cls: Class) {
        unsafe { objc_disposeClassPair(cls) }
    }

    unsafe fn objc_construct_instance(&self, cls: Class, bytes: *mut c_void) -> Object {
        unsafe { objc_constructInstance(cls, bytes) }
    }

    unsafe fn objc_destruct_instance(&self, obj: Object) -> *mut c_void {
        unsafe { objc_destructInstance(obj) }
    }

    fn objc_get_class(&self, name: &CStr) -> Class {
        // SAFETY: name is a valid C string; lookup has no other preconditions
        unsafe { objc_getClass(name.as_ptr()) }
    }

    unsafe fn object_get_class(&self, obj: Object) -> Class {
        unsafe { object_getClass(obj) }
    }

    fn sel_register_name(&self, name: &CStr) -> Sel {
        // SAFETY: name is a valid C string; the runtime copies it
        unsafe { sel_registerName(name.as_ptr()) }
    }

    unsafe fn sel_get_name(&self, sel: Sel) -> *const c_char {
        unsafe { sel_getName(sel) }
    }

    unsafe fn property_get_name(&self, property: Property) -> *const c_char {
        unsafe { property_getName(property) }
    }

    unsafe fn property_get_attributes(&self, property: Property) -> *const c_char {
        unsafe { property_getAttributes(property) }
    }
}
