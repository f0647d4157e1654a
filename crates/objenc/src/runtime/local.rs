//! In-process runtime backend.
//!
//! `LocalRuntime` implements the [`Backend`] entry points in Rust for hosts
//! without a system `libobjc`. It keeps the same object model: a class
//! pair is a class plus its metaclass, every class and instance starts with
//! an isa word, and selectors are interned C strings.
//!
//! # Architecture
//!
//! - Class records are heap-allocated and addressed by raw pointer; the
//!   pointer *is* the [`Class`] handle
//! - Every record, method, property, selector and instance address handed
//!   out is remembered, and a handle is only dereferenced after it is found
//!   in the matching table. Unknown handles behave like nil
//! - Disposing a pair drops its name and moves its records to a graveyard.
//!   Records are freed only when the runtime is dropped, so a stale handle
//!   still reads the disposed class
//! - A pair with live subclasses cannot be disposed
//! - Only registered classes are visible to [`Backend::objc_get_class`]
//!
//! # Thread Safety
//!
//! The class, selector, member and instance tables are behind `RwLock`s;
//! per-class method and property tables have their own locks. No two table
//! locks are held at once.

use super::backend::{Backend, PropertyAttribute};
use super::handle::{
    Bool, Class, Imp, Method, NO, Object, Property, Sel, YES, bool_to_objc,
};
use fxhash::{FxHashMap, FxHashSet};
use std::ffi::{CStr, CString, c_char, c_void};
use std::ptr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Name reported for the nil class, matching the system runtime.
const NIL_NAME: &CStr = c"nil";

/// A class or metaclass.
///
/// `isa` must stay the first field: [`Backend::object_get_class`] reads the
/// first word of instances.
#[repr(C)]
struct ClassRecord {
    isa: *mut ClassRecord,
    superclass: *mut ClassRecord,
    name: CString,
    is_meta: bool,
    instance_size: usize,
    registered: AtomicBool,
    disposed: AtomicBool,
    /// Keyed by selector address
    methods: RwLock<FxHashMap<usize, Box<MethodRecord>>>,
    properties: RwLock<Vec<Box<PropertyRecord>>>,
}

struct MethodRecord {
    sel: Sel,
    imp: Imp,
    types: CString,
}

struct PropertyRecord {
    name: CString,
    attributes: CString,
}

impl ClassRecord {
    fn new(name: CString, superclass: *mut ClassRecord, is_meta: bool, instance_size: usize) -> Self {
        ClassRecord {
            isa: ptr::null_mut(),
            superclass,
            name,
            is_meta,
            instance_size,
            registered: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
            methods: RwLock::new(FxHashMap::default()),
            properties: RwLock::new(Vec::new()),
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// The next record up the superclass chain.
    fn parent(&self) -> Option<&ClassRecord> {
        // SAFETY: superclass links only point at records of the same
        // runtime, which outlive every borrow of the runtime
        unsafe { self.superclass.as_ref() }
    }
}

struct ClassTable {
    /// Live (not disposed) class pairs by name
    classes: FxHashMap<CString, *mut ClassRecord>,
    /// Every class and metaclass record ever allocated
    records: FxHashSet<usize>,
    /// Disposed pairs, by class record
    graveyard: Vec<*mut ClassRecord>,
}

#[derive(Default)]
struct SelectorTable {
    names: FxHashSet<Box<CStr>>,
    addresses: FxHashSet<usize>,
}

#[derive(Default)]
struct MemberTable {
    methods: FxHashSet<usize>,
    properties: FxHashSet<usize>,
}

/// An Objective-C style runtime living entirely in this process.
///
/// # Example
///
/// ```
/// use objenc::runtime::{Class, LocalRuntime, Runtime};
///
/// let runtime = Runtime::new(LocalRuntime::new());
/// let widget = runtime.allocate_class_pair(Class::NIL, "Widget", 0).unwrap();
/// runtime.register_class_pair(widget).unwrap();
///
/// assert_eq!(runtime.class_by_name("Widget"), Some(widget));
/// assert_eq!(runtime.class_name(widget), "Widget");
/// ```
pub struct LocalRuntime {
    root_size: usize,
    table: RwLock<ClassTable>,
    selectors: RwLock<SelectorTable>,
    members: RwLock<MemberTable>,
    instances: RwLock<FxHashSet<usize>>,
}

// SAFETY: LocalRuntime is Send + Sync because:
// - ClassRecord pointers are only created under the table lock and only
//   freed in Drop, which has exclusive access
// - per-record mutable state is behind RwLock or atomics
// - selector strings are boxed and never move once interned
unsafe impl Send for LocalRuntime {}
unsafe impl Sync for LocalRuntime {}

impl Default for LocalRuntime {
    fn default() -> Self {
        Self::new()
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn address<T>(value: &T) -> usize {
    ptr::from_ref(value) as usize
}

fn class_handle(record: *const ClassRecord) -> Class {
    // SAFETY: record is null or a record of this runtime, which stays
    // allocated until the runtime is dropped
    unsafe { Class::from_ptr(record.cast_mut().cast()) }
}

impl LocalRuntime {
    /// Creates an empty runtime whose root classes hold just an isa.
    #[must_use]
    pub fn new() -> Self {
        Self::with_root_size(size_of::<*mut c_void>())
    }

    /// Creates an empty runtime whose root classes have instances of
    /// `root_size` bytes.
    #[must_use]
    pub fn with_root_size(root_size: usize) -> Self {
        LocalRuntime {
            root_size,
            table: RwLock::new(ClassTable {
                classes: FxHashMap::default(),
                records: FxHashSet::default(),
                graveyard: Vec::new(),
            }),
            selectors: RwLock::new(SelectorTable::default()),
            members: RwLock::new(MemberTable::default()),
            instances: RwLock::new(FxHashSet::default()),
        }
    }

    /// Number of live (not disposed) class pairs, registered or not.
    #[must_use]
    pub fn class_pair_count(&self) -> usize {
        read(&self.table).classes.len()
    }

    /// Number of interned selectors.
    #[must_use]
    pub fn selector_count(&self) -> usize {
        read(&self.selectors).names.len()
    }

    /// The record behind `cls`, if this runtime allocated it.
    fn record(&self, cls: Class) -> Option<&ClassRecord> {
        let addr = cls.as_ptr() as usize;
        if !read(&self.table).records.contains(&addr) {
            return None;
        }
        // SAFETY: addresses in `records` stay allocated until Drop, which
        // cannot run while `self` is borrowed
        Some(unsafe { &*cls.as_ptr().cast::<ClassRecord>() })
    }

    fn method_record(&self, method: Method) -> Option<&MethodRecord> {
        let addr = method.as_ptr() as usize;
        if !read(&self.members).methods.contains(&addr) {
            return None;
        }
        // SAFETY: method records are boxed, never removed from their class,
        // and classes are freed only in Drop
        Some(unsafe { &*method.as_ptr().cast::<MethodRecord>() })
    }

    fn property_record(&self, property: Property) -> Option<&PropertyRecord> {
        let addr = property.as_ptr() as usize;
        if !read(&self.members).properties.contains(&addr) {
            return None;
        }
        // SAFETY: as for method records
        Some(unsafe { &*property.as_ptr().cast::<PropertyRecord>() })
    }

    fn property_handle(record: &PropertyRecord) -> Property {
        // SAFETY: the record is registered in the member table
        unsafe { Property::from_ptr(ptr::from_ref(record).cast_mut().cast()) }
    }

    fn method_handle(record: &MethodRecord) -> Method {
        // SAFETY: the record is registered in the member table
        unsafe { Method::from_ptr(ptr::from_ref(record).cast_mut().cast()) }
    }

    /// Metaclass at the root of `superclass`'s chain.
    fn root_metaclass(superclass: &ClassRecord) -> *mut ClassRecord {
        let mut current = superclass;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current.isa
    }

    /// Frees a class record and the metaclass it points to.
    ///
    /// # Safety
    ///
    /// `class` must come from `objc_allocate_class_pair`, not be freed yet,
    /// and not be reachable by any borrow.
    unsafe fn free_pair(class: *mut ClassRecord) {
        // SAFETY: both records were created with Box::into_raw
        unsafe {
            let meta = (*class).isa;
            drop(Box::from_raw(meta));
            drop(Box::from_raw(class));
        }
    }
}

impl Drop for LocalRuntime {
    fn drop(&mut self) {
        let table = self.table.get_mut().unwrap_or_else(PoisonError::into_inner);
        let live = table.classes.drain().map(|(_, class)| class);
        for class in live.chain(table.graveyard.drain(..)) {
            // SAFETY: every pair is either live or in the graveyard, never
            // both, and `&mut self` rules out outstanding borrows
            unsafe { Self::free_pair(class) };
        }
    }
}

impl Backend for LocalRuntime {
    unsafe fn class_get_name(&self, cls: Class) -> *const c_char {
        match self.record(cls) {
            Some(record) => record.name.as_ptr(),
            None => NIL_NAME.as_ptr(),
        }
    }

    unsafe fn class_get_superclass(&self, cls: Class) -> Class {
        self.record(cls)
            .map_or(Class::NIL, |record| class_handle(record.superclass))
    }

    unsafe fn class_is_metaclass(&self, cls: Class) -> Bool {
        bool_to_objc(self.record(cls).is_some_and(|record| record.is_meta))
    }

    unsafe fn class_get_instance_size(&self, cls: Class) -> usize {
        self.record(cls).map_or(0, |record| record.instance_size)
    }

    unsafe fn class_get_property(&self, cls: Class, name: &CStr) -> Property {
        let mut current = self.record(cls);
        while let Some(record) = current {
            let properties = read(&record.properties);
            if let Some(found) = properties.iter().find(|p| p.name.as_c_str() == name) {
                return Self::property_handle(found);
            }
            current = record.parent();
        }
        Property::NIL
    }

    unsafe fn class_copy_property_list(&self, cls: Class) -> Vec<Property> {
        self.record(cls).map_or_else(Vec::new, |record| {
            read(&record.properties)
                .iter()
                .map(|p| Self::property_handle(p))
                .collect()
        })
    }

    unsafe fn class_add_method(&self, cls: Class, sel: Sel, imp: Imp, types: &CStr) -> Bool {
        let Some(record) = self.record(cls) else {
            return NO;
        };
        let key = sel.as_ptr() as usize;
        if record.is_disposed() || !read(&self.selectors).addresses.contains(&key) {
            return NO;
        }

        let added = {
            let mut methods = write(&record.methods);
            if methods.contains_key(&key) {
                return NO;
            }
            let method = Box::new(MethodRecord {
                sel,
                imp,
                types: types.to_owned(),
            });
            let added = address(&*method);
            methods.insert(key, method);
            added
        };
        write(&self.members).methods.insert(added);
        YES
    }

    unsafe fn class_get_instance_method(&self, cls: Class, sel: Sel) -> Method {
        let key = sel.as_ptr() as usize;
        let mut current = self.record(cls);
        while let Some(record) = current {
            if let Some(found) = read(&record.methods).get(&key) {
                return Self::method_handle(found);
            }
            current = record.parent();
        }
        Method::NIL
    }

    unsafe fn method_get_name(&self, method: Method) -> Sel {
        self.method_record(method).map_or(Sel::NIL, |m| m.sel)
    }

    unsafe fn method_get_implementation(&self, method: Method) -> Option<Imp> {
        self.method_record(method).map(|m| m.imp)
    }

    unsafe fn method_get_type_encoding(&self, method: Method) -> *const c_char {
        self.method_record(method)
            .map_or(ptr::null(), |m| m.types.as_ptr())
    }

    unsafe fn class_add_property(
        &self,
        cls: Class,
        name: &CStr,
        attributes: &[PropertyAttribute],
    ) -> Bool {
        let Some(record) = self.record(cls) else {
            return NO;
        };
        if record.is_disposed() || record.registered.load(Ordering::Acquire) {
            return NO;
        }

        let mut rendered = Vec::new();
        for attribute in attributes {
            if attribute.name.is_null() {
                return NO;
            }
            if !rendered.is_empty() {
                rendered.push(b',');
            }
            // SAFETY: attribute strings are valid for the duration of the call
            unsafe {
                rendered.extend_from_slice(CStr::from_ptr(attribute.name).to_bytes());
                if !attribute.value.is_null() {
                    rendered.extend_from_slice(CStr::from_ptr(attribute.value).to_bytes());
                }
            }
        }
        let Ok(attributes) = CString::new(rendered) else {
            return NO;
        };

        let added = {
            let mut properties = write(&record.properties);
            if properties.iter().any(|p| p.name.as_c_str() == name) {
                return NO;
            }
            let property = Box::new(PropertyRecord {
                name: name.to_owned(),
                attributes,
            });
            let added = address(&*property);
            properties.push(property);
            added
        };
        write(&self.members).properties.insert(added);
        YES
    }

    unsafe fn objc_allocate_class_pair(
        &self,
        superclass: Class,
        name: &CStr,
        _extra_bytes: usize,
    ) -> Class {
        let parent = if superclass.is_nil() {
            None
        } else {
            match self.record(superclass) {
                Some(record) if !record.is_meta && !record.is_disposed() => Some(record),
                _ => return Class::NIL,
            }
        };

        let mut table = write(&self.table);
        if name.is_empty() || table.classes.contains_key(name) {
            return Class::NIL;
        }

        let instance_size = parent.map_or(self.root_size, |p| p.instance_size);
        let super_ptr = parent.map_or(ptr::null_mut(), |p| ptr::from_ref(p).cast_mut());

        let class = Box::into_raw(Box::new(ClassRecord::new(
            name.to_owned(),
            super_ptr,
            false,
            instance_size,
        )));

        // A root metaclass inherits from its own class and is its own isa;
        // any other metaclass inherits from the superclass's metaclass.
        let (meta_super, meta_isa) = match parent {
            Some(p) => (p.isa, Self::root_metaclass(p)),
            None => (class, ptr::null_mut()),
        };
        let meta = Box::into_raw(Box::new(ClassRecord::new(
            name.to_owned(),
            meta_super,
            true,
            size_of::<ClassRecord>(),
        )));

        // SAFETY: both records were just allocated and are not shared yet
        unsafe {
            (*meta).isa = if meta_isa.is_null() { meta } else { meta_isa };
            (*class).isa = meta;
        }

        table.records.insert(class as usize);
        table.records.insert(meta as usize);
        table.classes.insert(name.to_owned(), class);
        class_handle(class)
    }

    unsafe fn objc_register_class_pair(&self, cls: Class) {
        let Some(record) = self.record(cls) else {
            return;
        };
        let name = record.name.to_string_lossy();
        if record.is_meta {
            objenc_log::warn!("metaclass {name} cannot be registered");
        } else if record.is_disposed() {
            objenc_log::warn!("class {name} was disposed");
        } else if record.registered.swap(true, Ordering::AcqRel) {
            objenc_log::warn!("class {name} is already registered");
        }
    }

    unsafe fn objc_dispose_class_pair(&self, cls: Class) {
        let Some(record) = self.record(cls) else {
            return;
        };
        if record.is_meta {
            return;
        }

        let mut table = write(&self.table);
        let class_ptr = ptr::from_ref(record).cast_mut();
        if table.classes.get(record.name.as_c_str()) != Some(&class_ptr) {
            return;
        }

        let has_subclass = table.classes.values().any(|&other| {
            // SAFETY: live table entries are records of this runtime
            unsafe { (*other).superclass == class_ptr }
        });
        if has_subclass {
            objenc_log::warn!(
                "class {} still has subclasses and was not disposed",
                record.name.to_string_lossy()
            );
            return;
        }

        table.classes.remove(record.name.as_c_str());
        record.disposed.store(true, Ordering::Release);
        // SAFETY: the metaclass is a record of this runtime
        unsafe { (*record.isa).disposed.store(true, Ordering::Release) };
        table.graveyard.push(class_ptr);
    }

    unsafe fn objc_construct_instance(&self, cls: Class, bytes: *mut c_void) -> Object {
        if bytes.is_null() || !self.record(cls).is_some_and(|r| !r.is_meta) {
            return Object::NIL;
        }
        // SAFETY: the caller provides at least instance_size bytes, which is
        // never less than one pointer, aligned for a pointer
        unsafe { bytes.cast::<*mut c_void>().write(cls.as_ptr()) };
        write(&self.instances).insert(bytes as usize);
        // SAFETY: the address is now a tracked instance
        unsafe { Object::from_ptr(bytes) }
    }

    unsafe fn objc_destruct_instance(&self, obj: Object) -> *mut c_void {
        // No ivars or associated objects to tear down.
        write(&self.instances).remove(&(obj.as_ptr() as usize));
        obj.as_ptr()
    }

    fn objc_get_class(&self, name: &CStr) -> Class {
        let table = read(&self.table);
        match table.classes.get(name) {
            // SAFETY: live table entries are records of this runtime
            Some(&class) if unsafe { (*class).registered.load(Ordering::Acquire) } => {
                class_handle(class)
            }
            _ => Class::NIL,
        }
    }

    unsafe fn object_get_class(&self, obj: Object) -> Class {
        let addr = obj.as_ptr() as usize;
        if let Some(record) = self.record(class_handle(obj.as_ptr().cast_const().cast())) {
            return class_handle(record.isa);
        }
        if !read(&self.instances).contains(&addr) {
            return Class::NIL;
        }
        // SAFETY: tracked instances are live and start with their isa
        class_handle(unsafe { obj.as_ptr().cast::<*const ClassRecord>().read() })
    }

    fn sel_register_name(&self, name: &CStr) -> Sel {
        // SAFETY (all three): an interned name's address is recorded in
        // `addresses` and lives as long as the runtime
        if let Some(interned) = read(&self.selectors).names.get(name) {
            return unsafe { Sel::from_ptr(interned.as_ptr().cast_mut().cast()) };
        }

        let mut selectors = write(&self.selectors);
        // Another thread may have interned it between the two locks.
        if let Some(interned) = selectors.names.get(name) {
            return unsafe { Sel::from_ptr(interned.as_ptr().cast_mut().cast()) };
        }
        let interned: Box<CStr> = name.into();
        let sel = unsafe { Sel::from_ptr(interned.as_ptr().cast_mut().cast()) };
        selectors.addresses.insert(sel.as_ptr() as usize);
        selectors.names.insert(interned);
        sel
    }

    unsafe fn sel_get_name(&self, sel: Sel) -> *const c_char {
        if sel.is_nil() {
            return c"<null selector>".as_ptr();
        }
        if !read(&self.selectors).addresses.contains(&(sel.as_ptr() as usize)) {
            return ptr::null();
        }
        // A selector is the address of its interned name.
        sel.as_ptr().cast_const().cast()
    }

    unsafe fn property_get_name(&self, property: Property) -> *const c_char {
        self.property_record(property)
            .map_or(ptr::null(), |p| p.name.as_ptr())
    }

    unsafe fn property_get_attributes(&self, property: Property) -> *const c_char {
        self.property_record(property)
            .map_or(ptr::null(), |p| p.attributes.as_ptr())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe extern "C" fn noop() {}

    fn name_of(runtime: &LocalRuntime, cls: Class) -> String {
        unsafe { CStr::from_ptr(runtime.class_get_name(cls)) }
            .to_string_lossy()
            .into_owned()
    }

    fn allocate(runtime: &LocalRuntime, superclass: Class, name: &CStr) -> Class {
        unsafe { runtime.objc_allocate_class_pair(superclass, name, 0) }
    }

    #[test]
    fn test_allocate_creates_class_and_metaclass() {
        let runtime = LocalRuntime::new();
        let cls = allocate(&runtime, Class::NIL, c"Root");
        assert!(!cls.is_nil());

        let meta = unsafe { runtime.object_get_class(cls.as_object()) };
        assert_ne!(meta, cls);
        assert_eq!(unsafe { runtime.class_is_metaclass(meta) }, YES);
        assert_eq!(unsafe { runtime.class_is_metaclass(cls) }, NO);
        assert_eq!(name_of(&runtime, meta), "Root");
        // root metaclass is its own isa and inherits from the root class
        assert_eq!(unsafe { runtime.object_get_class(meta.as_object()) }, meta);
        assert_eq!(unsafe { runtime.class_get_superclass(meta) }, cls);
        assert_eq!(runtime.class_pair_count(), 1);
    }

    #[test]
    fn test_subclass_metaclass_chain() {
        let runtime = LocalRuntime::new();
        let root = allocate(&runtime, Class::NIL, c"Base");
        let child = allocate(&runtime, root, c"Derived");

        let root_meta = unsafe { runtime.object_get_class(root.as_object()) };
        let child_meta = unsafe { runtime.object_get_class(child.as_object()) };
        assert_eq!(unsafe { runtime.class_get_superclass(child) }, root);
        assert_eq!(unsafe { runtime.class_get_superclass(child_meta) }, root_meta);
        assert_eq!(unsafe { runtime.object_get_class(child_meta.as_object()) }, root_meta);

        // a metaclass is not a valid superclass
        assert!(allocate(&runtime, root_meta, c"FromMeta").is_nil());
    }

    #[test]
    fn test_duplicate_names_are_refused() {
        let runtime = LocalRuntime::new();
        assert!(!allocate(&runtime, Class::NIL, c"Dup").is_nil());
        assert!(allocate(&runtime, Class::NIL, c"Dup").is_nil());
        assert!(allocate(&runtime, Class::NIL, c"").is_nil());
    }

    #[test]
    fn test_lookup_requires_registration() {
        let runtime = LocalRuntime::new();
        let cls = allocate(&runtime, Class::NIL, c"Pending");
        assert!(runtime.objc_get_class(c"Pending").is_nil());
        unsafe { runtime.objc_register_class_pair(cls) };
        assert_eq!(runtime.objc_get_class(c"Pending"), cls);
    }

    #[test]
    fn test_registering_a_metaclass_does_nothing() {
        let runtime = LocalRuntime::new();
        let cls = allocate(&runtime, Class::NIL, c"Quiet");
        let meta = unsafe { runtime.object_get_class(cls.as_object()) };
        unsafe { runtime.objc_register_class_pair(meta) };
        assert!(runtime.objc_get_class(c"Quiet").is_nil());
    }

    #[test]
    fn test_dispose_frees_name_but_keeps_record() {
        let runtime = LocalRuntime::new();
        let gone = allocate(&runtime, Class::NIL, c"Gone");
        unsafe { runtime.objc_dispose_class_pair(gone) };
        assert_eq!(runtime.class_pair_count(), 0);

        let fresh = allocate(&runtime, Class::NIL, c"Fresh");
        assert_ne!(fresh, gone);
        assert_eq!(name_of(&runtime, gone), "Gone");
        assert_eq!(name_of(&runtime, fresh), "Fresh");

        // the name can be taken again, the disposed record cannot be reused
        assert!(!allocate(&runtime, Class::NIL, c"Gone").is_nil());
        assert!(allocate(&runtime, gone, c"Orphan").is_nil());
        let sel = runtime.sel_register_name(c"late");
        assert_eq!(unsafe { runtime.class_add_method(gone, sel, noop, c"v@:") }, NO);
    }

    #[test]
    fn test_dispose_refuses_live_subclasses() {
        let runtime = LocalRuntime::new();
        let base = allocate(&runtime, Class::NIL, c"Parent");
        let child = allocate(&runtime, base, c"Kid");

        unsafe { runtime.objc_dispose_class_pair(base) };
        assert_eq!(runtime.class_pair_count(), 2);
        assert_eq!(unsafe { runtime.class_get_superclass(child) }, base);

        unsafe {
            runtime.objc_dispose_class_pair(child);
            runtime.objc_dispose_class_pair(base);
        }
        assert_eq!(runtime.class_pair_count(), 0);
    }

    #[test]
    fn test_unknown_handles_read_as_nil() {
        let runtime = LocalRuntime::new();
        let mut slot = [0usize; 8];
        let addr = slot.as_mut_ptr().cast::<c_void>();
        // never handed out by this runtime
        let (cls, obj, sel, property, method) = unsafe {
            (
                Class::from_ptr(addr),
                Object::from_ptr(addr),
                Sel::from_ptr(addr),
                Property::from_ptr(addr),
                Method::from_ptr(addr),
            )
        };

        assert_eq!(name_of(&runtime, cls), "nil");
        unsafe {
            assert!(runtime.class_get_superclass(cls).is_nil());
            assert_eq!(runtime.class_get_instance_size(cls), 0);
            assert!(runtime.object_get_class(obj).is_nil());
            assert!(runtime.sel_get_name(sel).is_null());
            assert!(runtime.property_get_name(property).is_null());
            assert!(runtime.method_get_implementation(method).is_none());
        }

        // a class from another runtime is just as unknown
        let other = LocalRuntime::new();
        let foreign = allocate(&other, Class::NIL, c"Foreign");
        assert_eq!(name_of(&runtime, foreign), "nil");
    }

    #[test]
    fn test_instance_sizes() {
        let runtime = LocalRuntime::with_root_size(24);
        let root = allocate(&runtime, Class::NIL, c"Sized");
        let child = allocate(&runtime, root, c"SizedChild");
        assert_eq!(unsafe { runtime.class_get_instance_size(root) }, 24);
        assert_eq!(unsafe { runtime.class_get_instance_size(child) }, 24);
        assert_eq!(unsafe { runtime.class_get_instance_size(Class::NIL) }, 0);
    }

    #[test]
    fn test_methods_are_found_through_superclasses() {
        let runtime = LocalRuntime::new();
        let base = allocate(&runtime, Class::NIL, c"WithMethods");
        let child = allocate(&runtime, base, c"InheritsMethods");
        let sel = runtime.sel_register_name(c"run");

        assert_eq!(unsafe { runtime.class_add_method(base, sel, noop, c"v@:") }, YES);
        assert_eq!(unsafe { runtime.class_add_method(base, sel, noop, c"v@:") }, NO);
        assert_eq!(unsafe { runtime.class_add_method(base, Sel::NIL, noop, c"v@:") }, NO);

        let method = unsafe { runtime.class_get_instance_method(child, sel) };
        assert!(!method.is_nil());
        unsafe {
            assert_eq!(runtime.method_get_name(method), sel);
            assert_eq!(CStr::from_ptr(runtime.method_get_type_encoding(method)), c"v@:");
            assert!(runtime.method_get_implementation(method).is_some());
        }

        let other = runtime.sel_register_name(c"missing");
        assert!(unsafe { runtime.class_get_instance_method(child, other) }.is_nil());
    }

    #[test]
    fn test_property_attributes_are_rendered() {
        let runtime = LocalRuntime::new();
        let cls = allocate(&runtime, Class::NIL, c"WithProps");
        let attributes = [
            PropertyAttribute {
                name: c"T".as_ptr(),
                value: c"{Point=ii}".as_ptr(),
            },
            PropertyAttribute {
                name: c"N".as_ptr(),
                value: c"".as_ptr(),
            },
        ];
        assert_eq!(
            unsafe { runtime.class_add_property(cls, c"origin", &attributes) },
            YES
        );
        assert_eq!(
            unsafe { runtime.class_add_property(cls, c"origin", &attributes) },
            NO
        );

        let property = unsafe { runtime.class_get_property(cls, c"origin") };
        let rendered = unsafe { CStr::from_ptr(runtime.property_get_attributes(property)) };
        assert_eq!(rendered, c"T{Point=ii},N");

        unsafe { runtime.objc_register_class_pair(cls) };
        assert_eq!(
            unsafe { runtime.class_add_property(cls, c"late", &attributes) },
            NO
        );
    }

    #[test]
    fn test_selectors_are_interned() {
        let runtime = LocalRuntime::new();
        let a = runtime.sel_register_name(c"doThing:");
        let b = runtime.sel_register_name(c"doThing:");
        let c = runtime.sel_register_name(c"other");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(runtime.selector_count(), 2);
        assert_eq!(unsafe { CStr::from_ptr(runtime.sel_get_name(a)) }, c"doThing:");
    }

    #[test]
    fn test_nil_class_is_harmless() {
        let runtime = LocalRuntime::new();
        assert_eq!(name_of(&runtime, Class::NIL), "nil");
        assert!(unsafe { runtime.class_get_superclass(Class::NIL) }.is_nil());
        assert!(unsafe { runtime.class_copy_property_list(Class::NIL) }.is_empty());
        assert!(unsafe { runtime.class_get_property(Class::NIL, c"x") }.is_nil());
        unsafe {
            runtime.objc_register_class_pair(Class::NIL);
            runtime.objc_dispose_class_pair(Class::NIL);
        }
    }
}
