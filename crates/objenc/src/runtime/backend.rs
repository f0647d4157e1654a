//! The runtime entry points the bindings consume.
//!
//! [`Backend`] mirrors the C API one function per entry point, with raw
//! handles in and raw handles, C strings and `BOOL`s out. It is implemented
//! by the system `libobjc` ([`Native`](super::native)) and by the in-process
//! [`LocalRuntime`](super::LocalRuntime). Nothing here interprets results;
//! that is the job of [`Runtime`](super::Runtime).

use super::handle::{Bool, Class, Imp, Method, Object, Property, Sel};
use std::ffi::{CStr, c_char, c_void};

/// One `objc_property_attribute_t`: an attribute name and its value.
///
/// Both pointers are borrowed for the duration of the call that receives
/// them.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct PropertyAttribute {
    /// Attribute name, e.g. `T`, `R`, `N`.
    pub name: *const c_char,
    /// Attribute value; empty for flags.
    pub value: *const c_char,
}

/// Runtime entry points.
///
/// # Safety
///
/// Every handle passed in must be nil or a live handle obtained from the
/// same backend. Returned C strings are owned by the runtime and stay valid
/// as long as the object they describe.
pub trait Backend {
    /// `class_getName`
    unsafe fn class_get_name(&self, cls: Class) -> *const c_char;

    /// `class_getSuperclass`
    unsafe fn class_get_superclass(&self, cls: Class) -> Class;

    /// `class_isMetaClass`
    unsafe fn class_is_metaclass(&self, cls: Class) -> Bool;

    /// `class_getInstanceSize`
    unsafe fn class_get_instance_size(&self, cls: Class) -> usize;

    /// `class_getProperty`
    unsafe fn class_get_property(&self, cls: Class, name: &CStr) -> Property;

    /// `class_copyPropertyList`, with the returned array already copied and
    /// released.
    unsafe fn class_copy_property_list(&self, cls: Class) -> Vec<Property>;

    /// `class_addMethod`
    unsafe fn class_add_method(&self, cls: Class, sel: Sel, imp: Imp, types: &CStr) -> Bool;

    /// `class_getInstanceMethod`
    unsafe fn class_get_instance_method(&self, cls: Class, sel: Sel) -> Method;

    /// `method_getName`
    unsafe fn method_get_name(&self, method: Method) -> Sel;

    /// `method_getImplementation`
    unsafe fn method_get_implementation(&self, method: Method) -> Option<Imp>;

    /// `method_getTypeEncoding`
    unsafe fn method_get_type_encoding(&self, method: Method) -> *const c_char;

    /// `class_addProperty`
    unsafe fn class_add_property(
        &self,
        cls: Class,
        name: &CStr,
        attributes: &[PropertyAttribute],
    ) -> Bool;

    /// `objc_allocateClassPair`
    unsafe fn objc_allocate_class_pair(
        &self,
        superclass: Class,
        name: &CStr,
        extra_bytes: usize,
    ) -> Class;

    /// `objc_registerClassPair`
    unsafe fn objc_register_class_pair(&self, cls: Class);

    /// `objc_disposeClassPair`
    unsafe fn objc_dispose_class_pair(&self, cls: Class);

    /// `objc_constructInstance`
    unsafe fn objc_construct_instance(&self, cls: Class, bytes: *mut c_void) -> Object;

    /// `objc_destructInstance`
    unsafe fn objc_destruct_instance(&self, obj: Object) -> *mut c_void;

    /// `objc_getClass`
    fn objc_get_class(&self, name: &CStr) -> Class;

    /// `object_getClass`
    unsafe fn object_get_class(&self, obj: Object) -> Class;

    /// `sel_registerName`
    fn sel_register_name(&self, name: &CStr) -> Sel;

    /// `sel_getName`
    unsafe fn sel_get_name(&self, sel: Sel) -> *const c_char;

    /// `property_getName`
    unsafe fn property_get_name(&self, property: Property) -> *const c_char;

    /// `property_getAttributes`
    unsafe fn property_get_attributes(&self, property: Property) -> *const c_char;
}
