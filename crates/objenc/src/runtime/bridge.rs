//! Safe wrappers over a runtime [`Backend`].
//!
//! [`Runtime`] turns raw returns into Rust values: C strings become
//! `String`s, `BOOL`s become `bool`s (a third value is fatal), and nil
//! handles become `Option`s or [`Error`]s. The nil class is always a valid
//! argument and answers with empty values.
//!
//! # Thread Safety
//!
//! Class-pair allocation, registration, disposal and method/property adds
//! are serialized behind one lock. Introspection is not.
//!
//! # Handles
//!
//! Every handle passed in either came from a runtime or from an `unsafe`
//! `from_ptr` whose caller vouched for it, so the backend calls below treat
//! non-nil handles as live. Disposal is the one way a live handle goes
//! stale, which is why [`Runtime::dispose_class_pair`] is `unsafe`.

use super::backend::{Backend, PropertyAttribute};
use super::handle::{Class, Imp, Method, Object, Property, Sel, bool_from_objc};
use super::interface::PropertyDecl;
use super::local::LocalRuntime;
use crate::encoding::EncodedString;
use crate::error::{Error, Result};
use std::alloc::{Layout, alloc_zeroed, dealloc};
use std::ffi::{CStr, CString, c_char, c_void};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// An instance whose memory belongs to the [`Runtime`] that built it.
///
/// Hand it back to [`Runtime::destruct_instance`] to release it.
#[must_use = "instances must be passed to Runtime::destruct_instance"]
#[derive(Debug)]
pub struct Instance {
    object: Object,
    layout: Layout,
}

impl Instance {
    /// The object handle.
    pub fn object(&self) -> Object {
        self.object
    }

    /// Size of the allocation in bytes.
    pub fn size(&self) -> usize {
        self.layout.size()
    }
}

/// Safe access to an Objective-C runtime.
///
/// # Example
///
/// ```
/// use objenc::encoding::method_signature;
/// use objenc::encoding::TypeDesc;
/// use objenc::runtime::{Class, Runtime};
///
/// unsafe extern "C" fn ping() {}
///
/// let runtime = Runtime::local();
/// let cls = runtime.allocate_class_pair(Class::NIL, "Pinger", 0).unwrap();
/// let sel = runtime.selector("ping").unwrap();
/// let sig = method_signature(&TypeDesc::Void, &[]).unwrap();
/// runtime.add_method(cls, sel, ping, &sig).unwrap();
/// runtime.register_class_pair(cls).unwrap();
///
/// let instance = runtime.construct_instance(cls).unwrap();
/// assert_eq!(runtime.class_of(instance.object()), cls);
/// runtime.destruct_instance(instance);
/// ```
pub struct Runtime<B: Backend> {
    backend: B,
    registration: Mutex<()>,
}

impl Runtime<LocalRuntime> {
    /// A runtime backed by a fresh [`LocalRuntime`].
    #[must_use]
    pub fn local() -> Self {
        Self::new(LocalRuntime::new())
    }
}

#[cfg(all(feature = "native", target_vendor = "apple"))]
impl Runtime<super::native::Native> {
    /// The process's `libobjc`.
    #[must_use]
    pub fn native() -> Self {
        Self::new(super::native::Native)
    }
}

impl<B: Backend> Runtime<B> {
    /// Wraps a backend.
    pub fn new(backend: B) -> Self {
        Runtime {
            backend,
            registration: Mutex::new(()),
        }
    }

    /// The wrapped backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.registration
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// The class's name; empty for nil.
    pub fn class_name(&self, cls: Class) -> String {
        if cls.is_nil() {
            return String::new();
        }
        // SAFETY: cls is a live, non-nil class; the name lives as long as it
        unsafe { owned(self.backend.class_get_name(cls)) }
    }

    /// The superclass; nil for root classes and for nil.
    pub fn superclass(&self, cls: Class) -> Class {
        if cls.is_nil() {
            return Class::NIL;
        }
        // SAFETY: cls is a live, non-nil class
        unsafe { self.backend.class_get_superclass(cls) }
    }

    /// Whether `cls` is a metaclass; false for nil.
    pub fn is_metaclass(&self, cls: Class) -> bool {
        if cls.is_nil() {
            return false;
        }
        // SAFETY: cls is a live, non-nil class
        bool_from_objc(unsafe { self.backend.class_is_metaclass(cls) })
    }

    /// Bytes in an instance of `cls`; 0 for nil.
    pub fn instance_size(&self, cls: Class) -> usize {
        if cls.is_nil() {
            return 0;
        }
        // SAFETY: cls is a live, non-nil class
        unsafe { self.backend.class_get_instance_size(cls) }
    }

    /// Looks up a property on `cls` or its superclasses.
    pub fn property(&self, cls: Class, name: &str) -> Option<Property> {
        if cls.is_nil() {
            return None;
        }
        let name = CString::new(name).ok()?;
        // SAFETY: cls is a live, non-nil class and name a valid C string
        let property = unsafe { self.backend.class_get_property(cls, &name) };
        (!property.is_nil()).then_some(property)
    }

    /// Properties declared by `cls` itself, in declaration order.
    pub fn properties(&self, cls: Class) -> Vec<Property> {
        if cls.is_nil() {
            return Vec::new();
        }
        // SAFETY: cls is a live, non-nil class; the backend owns the copy
        unsafe { self.backend.class_copy_property_list(cls) }
    }

    /// The property's name; empty for nil.
    pub fn property_name(&self, property: Property) -> String {
        if property.is_nil() {
            return String::new();
        }
        // SAFETY: property is live and non-nil; its name lives as long as it
        unsafe { owned(self.backend.property_get_name(property)) }
    }

    /// The property's attribute string, e.g. `T{Point=dd},N`; empty for nil.
    pub fn property_attributes(&self, property: Property) -> String {
        if property.is_nil() {
            return String::new();
        }
        // SAFETY: as for property_name
        unsafe { owned(self.backend.property_get_attributes(property)) }
    }

    /// Finds a registered class by name.
    pub fn class_by_name(&self, name: &str) -> Option<Class> {
        let name = CString::new(name).ok()?;
        let cls = self.backend.objc_get_class(&name);
        (!cls.is_nil()).then_some(cls)
    }

    /// The metaclass of `cls`; nil for nil.
    pub fn metaclass(&self, cls: Class) -> Class {
        self.class_of(cls.as_object())
    }

    /// The class of an object; nil for nil.
    pub fn class_of(&self, obj: Object) -> Class {
        if obj.is_nil() {
            return Class::NIL;
        }
        // SAFETY: obj is a live, non-nil object or class
        unsafe { self.backend.object_get_class(obj) }
    }

    /// Registers (or finds) the selector for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidName`] for an empty name or one containing
    /// NUL.
    pub fn selector(&self, name: &str) -> Result<Sel> {
        let c_name = c_name(name)?;
        Ok(self.backend.sel_register_name(&c_name))
    }

    /// The selector's name.
    pub fn selector_name(&self, sel: Sel) -> String {
        if sel.is_nil() {
            return String::new();
        }
        // SAFETY: sel is non-nil and selectors are never unregistered
        unsafe { owned(self.backend.sel_get_name(sel)) }
    }

    /// Looks up the instance method for `sel` on `cls` or its superclasses.
    pub fn method(&self, cls: Class, sel: Sel) -> Option<Method> {
        if cls.is_nil() || sel.is_nil() {
            return None;
        }
        // SAFETY: cls is a live, non-nil class and sel a registered selector
        let method = unsafe { self.backend.class_get_instance_method(cls, sel) };
        (!method.is_nil()).then_some(method)
    }

    /// The selector a method answers to; nil for nil.
    pub fn method_selector(&self, method: Method) -> Sel {
        if method.is_nil() {
            return Sel::NIL;
        }
        // SAFETY: method is live and non-nil
        unsafe { self.backend.method_get_name(method) }
    }

    /// The method's implementation; `None` for nil.
    pub fn method_imp(&self, method: Method) -> Option<Imp> {
        if method.is_nil() {
            return None;
        }
        // SAFETY: method is live and non-nil
        unsafe { self.backend.method_get_implementation(method) }
    }

    /// The method's type encoding, e.g. `v16@0:8`; empty for nil.
    pub fn method_type_encoding(&self, method: Method) -> String {
        if method.is_nil() {
            return String::new();
        }
        // SAFETY: method is live and non-nil; the encoding lives as long as it
        unsafe { owned(self.backend.method_get_type_encoding(method)) }
    }

    // ------------------------------------------------------------------
    // Class pairs
    // ------------------------------------------------------------------

    /// Allocates a new class and metaclass.
    ///
    /// Pass [`Class::NIL`] as `superclass` for a root class. The pair is not
    /// visible to [`class_by_name`](Self::class_by_name) until it is
    /// registered.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidName`] for an empty name or one containing NUL
    /// - [`Error::ClassAllocationFailed`] if the runtime refuses, usually
    ///   because the name is taken
    pub fn allocate_class_pair(
        &self,
        superclass: Class,
        name: &str,
        extra_bytes: usize,
    ) -> Result<Class> {
        let c_name = c_name(name)?;
        let _guard = self.lock();

        // SAFETY: superclass is nil or live, and c_name a valid C string
        let cls = unsafe {
            self.backend
                .objc_allocate_class_pair(superclass, &c_name, extra_bytes)
        };
        if cls.is_nil() {
            objenc_log::warn!("runtime refused to allocate class pair {name}");
            return Err(Error::ClassAllocationFailed {
                name: name.to_string(),
            });
        }

        objenc_log::info!("allocated class pair {name}");
        Ok(cls)
    }

    /// Makes an allocated pair visible to lookups.
    ///
    /// # Errors
    ///
    /// - [`Error::NilHandle`] for nil
    /// - [`Error::UnexpectedMetaclass`] for a metaclass; only the class of a
    ///   pair is registered
    pub fn register_class_pair(&self, cls: Class) -> Result<()> {
        if cls.is_nil() {
            return Err(Error::NilHandle { what: "class" });
        }
        if self.is_metaclass(cls) {
            let name = self.class_name(cls);
            objenc_log::warn!("refusing to register the metaclass of {name}");
            return Err(Error::UnexpectedMetaclass { name });
        }
        let _guard = self.lock();
        // SAFETY: cls is a live, non-nil class
        unsafe { self.backend.objc_register_class_pair(cls) };
        objenc_log::info!("registered class {}", self.class_name(cls));
        Ok(())
    }

    /// Destroys a class pair. Nil is ignored.
    ///
    /// [`LocalRuntime`] keeps disposed records until it is dropped and
    /// refuses to dispose a class that still has subclasses. The system
    /// runtime frees the pair immediately.
    ///
    /// # Safety
    ///
    /// After this call, neither `cls`, its metaclass, any copy of either
    /// handle, nor any instance of the class may be used again, and no
    /// subclass of `cls` may still exist.
    pub unsafe fn dispose_class_pair(&self, cls: Class) {
        if cls.is_nil() {
            return;
        }
        let name = self.class_name(cls);
        let _guard = self.lock();
        objenc_log::info!("disposing class pair {name}");
        // SAFETY: the caller guarantees cls is not used afterwards
        unsafe { self.backend.objc_dispose_class_pair(cls) };
    }

    /// Adds a method to `cls`.
    ///
    /// # Errors
    ///
    /// - [`Error::NilHandle`] for a nil class
    /// - [`Error::MethodRejected`] if the runtime refuses, for example when
    ///   the class already has the selector
    pub fn add_method(
        &self,
        cls: Class,
        sel: Sel,
        imp: Imp,
        signature: &EncodedString,
    ) -> Result<()> {
        if cls.is_nil() {
            return Err(Error::NilHandle { what: "class" });
        }
        let _guard = self.lock();
        // SAFETY: cls is a live, non-nil class; the signature is NUL-terminated
        let added = unsafe {
            self.backend
                .class_add_method(cls, sel, imp, signature.as_c_str())
        };
        if !bool_from_objc(added) {
            let selector = self.selector_name(sel);
            objenc_log::warn!("runtime refused method {selector} on {}", self.class_name(cls));
            return Err(Error::MethodRejected { selector });
        }
        Ok(())
    }

    /// Adds a declared property to `cls`.
    ///
    /// The attribute list is the type (`T`) followed by `R` for read-only
    /// and `N` for nonatomic properties.
    ///
    /// # Errors
    ///
    /// - [`Error::NilHandle`] for a nil class
    /// - [`Error::InvalidName`] for an empty name or one containing NUL
    /// - [`Error::PropertyRejected`] if the runtime refuses
    pub fn add_property(&self, cls: Class, decl: &PropertyDecl) -> Result<()> {
        if cls.is_nil() {
            return Err(Error::NilHandle { what: "class" });
        }
        let name = c_name(decl.name())?;

        let mut attributes = vec![attribute(c"T", decl.encoding().as_c_str())];
        if decl.is_readonly() {
            attributes.push(attribute(c"R", c""));
        }
        if decl.is_nonatomic() {
            attributes.push(attribute(c"N", c""));
        }

        let _guard = self.lock();
        // SAFETY: cls is live; the attribute strings outlive the call
        let added = unsafe { self.backend.class_add_property(cls, &name, &attributes) };
        if !bool_from_objc(added) {
            objenc_log::warn!(
                "runtime refused property {} on {}",
                decl.name(),
                self.class_name(cls)
            );
            return Err(Error::PropertyRejected {
                name: decl.name().to_string(),
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Instances
    // ------------------------------------------------------------------

    /// Allocates zeroed memory for an instance of `cls` and constructs it.
    ///
    /// The allocation is `instance_size(cls)` bytes, never less than one
    /// pointer, and pointer-aligned.
    ///
    /// # Errors
    ///
    /// - [`Error::NilHandle`] for a nil class
    /// - [`Error::InstanceAllocationFailed`] if memory is unavailable or the
    ///   runtime refuses to construct
    pub fn construct_instance(&self, cls: Class) -> Result<Instance> {
        if cls.is_nil() {
            return Err(Error::NilHandle { what: "class" });
        }

        let size = self.instance_size(cls).max(size_of::<*mut c_void>());
        let layout = Layout::from_size_align(size, align_of::<*mut c_void>())
            .map_err(|_| Error::InstanceAllocationFailed { size })?;

        // SAFETY: layout has a non-zero size
        let bytes = unsafe { alloc_zeroed(layout) };
        if bytes.is_null() {
            return Err(Error::InstanceAllocationFailed { size });
        }

        // SAFETY: bytes is zeroed, pointer-aligned and instance_size long
        let object = unsafe { self.backend.objc_construct_instance(cls, bytes.cast()) };
        if object.is_nil() {
            // SAFETY: allocated above with this layout
            unsafe { dealloc(bytes, layout) };
            return Err(Error::InstanceAllocationFailed { size });
        }

        Ok(Instance { object, layout })
    }

    /// Destructs an instance and frees its memory.
    pub fn destruct_instance(&self, instance: Instance) {
        // SAFETY: instances are only built by construct_instance, which
        // allocated this block with this layout; `Instance` is not `Clone`,
        // so the block is freed once
        unsafe {
            let bytes = self.backend.objc_destruct_instance(instance.object);
            dealloc(bytes.cast(), instance.layout);
        }
    }
}

/// Copies a runtime-owned C string; null reads as empty.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn owned(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    // SAFETY: non-null runtime strings are NUL-terminated
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

fn c_name(name: &str) -> Result<CString> {
    if name.is_empty() {
        return Err(Error::InvalidName {
            name: String::new(),
        });
    }
    CString::new(name).map_err(|_| Error::InvalidName {
        name: name.to_string(),
    })
}

fn attribute(name: &'static CStr, value: &CStr) -> PropertyAttribute {
    PropertyAttribute {
        name: name.as_ptr(),
        value: value.as_ptr(),
    }
}
