//! Declaring classes and registering them in one startup phase.
//!
//! An [`InterfaceList`] is an ordered list of class declarations owned by
//! the application. [`init_runtime`] creates and registers every class in
//! list order; [`deinit_runtime`] disposes them in reverse.
//!
//! # Example
//!
//! ```
//! use objenc::encoding::{TypeDesc, method_signature};
//! use objenc::runtime::{
//!     Interface, InterfaceList, MethodDecl, PropertyDecl, Runtime, deinit_runtime, init_runtime,
//! };
//!
//! unsafe extern "C" fn reset() {}
//!
//! let runtime = Runtime::local();
//! let mut list = InterfaceList::new();
//! list.push(
//!     Interface::new("Shape").property(PropertyDecl::of::<f64>("area").unwrap().readonly()),
//! );
//! list.push(
//!     Interface::new("Circle")
//!         .superclass("Shape")
//!         .property(PropertyDecl::of::<f64>("radius").unwrap())
//!         .method(MethodDecl::new(
//!             "reset",
//!             reset,
//!             method_signature(&TypeDesc::Void, &[]).unwrap(),
//!         )),
//! );
//!
//! init_runtime(&runtime, &mut list).unwrap();
//! let circle = runtime.class_by_name("Circle").unwrap();
//! assert!(runtime.property(circle, "area").is_some());
//!
//! // SAFETY: nothing below uses the classes again
//! unsafe { deinit_runtime(&runtime, &mut list) };
//! assert!(runtime.class_by_name("Circle").is_none());
//! ```

use super::backend::Backend;
use super::bridge::Runtime;
use super::handle::{Class, Imp};
use crate::encoding::{Encode, EncodedString};
use crate::error::{Error, Result};

/// A declared property: name, type encoding and attribute flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDecl {
    name: String,
    encoding: EncodedString,
    readonly: bool,
    nonatomic: bool,
}

impl PropertyDecl {
    /// A read-write, atomic property of the given encoding.
    pub fn new(name: impl Into<String>, encoding: EncodedString) -> Self {
        PropertyDecl {
            name: name.into(),
            encoding,
            readonly: false,
            nonatomic: false,
        }
    }

    /// A property whose type is `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`] if `T` has no encoding.
    pub fn of<T: Encode + ?Sized>(name: impl Into<String>) -> Result<Self> {
        Ok(Self::new(name, T::encoding()?))
    }

    /// Marks the property read-only (`R`).
    #[must_use]
    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    /// Marks the property nonatomic (`N`).
    #[must_use]
    pub fn nonatomic(mut self) -> Self {
        self.nonatomic = true;
        self
    }

    /// The property name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type encoding, used as the `T` attribute.
    pub fn encoding(&self) -> &EncodedString {
        &self.encoding
    }

    /// Whether the property is read-only.
    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    /// Whether the property is nonatomic.
    pub fn is_nonatomic(&self) -> bool {
        self.nonatomic
    }
}

/// A method to add: selector name, implementation and method encoding.
#[derive(Debug, Clone)]
pub struct MethodDecl {
    selector: String,
    imp: Imp,
    signature: EncodedString,
}

impl MethodDecl {
    /// A method for `selector`, implemented by `imp`, with a method
    /// encoding such as one from [`method_signature`](crate::encoding::method_signature).
    pub fn new(selector: impl Into<String>, imp: Imp, signature: EncodedString) -> Self {
        MethodDecl {
            selector: selector.into(),
            imp,
            signature,
        }
    }

    /// The selector name.
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// The implementation.
    pub fn imp(&self) -> Imp {
        self.imp
    }

    /// The method encoding, e.g. `v@:`.
    pub fn signature(&self) -> &EncodedString {
        &self.signature
    }
}

/// A class declaration.
///
/// Holds the live [`Class`] once [`init_runtime`] has registered it.
#[derive(Debug, Clone)]
pub struct Interface {
    name: String,
    superclass: Option<String>,
    properties: Vec<PropertyDecl>,
    methods: Vec<MethodDecl>,
    class: Option<Class>,
}

impl Interface {
    /// A root class with no properties or methods.
    pub fn new(name: impl Into<String>) -> Self {
        Interface {
            name: name.into(),
            superclass: None,
            properties: Vec::new(),
            methods: Vec::new(),
            class: None,
        }
    }

    /// Inherits from the class named `name`.
    #[must_use]
    pub fn superclass(mut self, name: impl Into<String>) -> Self {
        self.superclass = Some(name.into());
        self
    }

    /// Declares a property.
    #[must_use]
    pub fn property(mut self, property: PropertyDecl) -> Self {
        self.properties.push(property);
        self
    }

    /// Declares a method.
    #[must_use]
    pub fn method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    /// The class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The superclass name; `None` for a root class.
    pub fn superclass_name(&self) -> Option<&str> {
        self.superclass.as_deref()
    }

    /// Declared properties, in order.
    pub fn properties(&self) -> &[PropertyDecl] {
        &self.properties
    }

    /// Declared methods, in order.
    pub fn methods(&self) -> &[MethodDecl] {
        &self.methods
    }

    /// The registered class, if any.
    pub fn class(&self) -> Option<Class> {
        self.class
    }

    fn build<B: Backend>(&self, runtime: &Runtime<B>, superclass: Class) -> Result<Class> {
        let cls = runtime.allocate_class_pair(superclass, &self.name, 0)?;
        let populate = || -> Result<()> {
            for property in &self.properties {
                runtime.add_property(cls, property)?;
            }
            for method in &self.methods {
                let sel = runtime.selector(&method.selector)?;
                runtime.add_method(cls, sel, method.imp, &method.signature)?;
            }
            runtime.register_class_pair(cls)
        };

        if let Err(err) = populate() {
            // SAFETY: cls never left this function and has no subclasses
            // or instances
            unsafe { runtime.dispose_class_pair(cls) };
            return Err(err);
        }
        Ok(cls)
    }
}

/// Caller-owned, ordered class declarations.
#[derive(Debug, Clone, Default)]
pub struct InterfaceList {
    interfaces: Vec<Interface>,
}

impl InterfaceList {
    /// An empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a declaration. Superclasses must come before subclasses.
    pub fn push(&mut self, interface: Interface) -> &mut Self {
        self.interfaces.push(interface);
        self
    }

    /// Number of declarations.
    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    /// Whether the list has no declarations.
    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    /// Declarations in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Interface> {
        self.interfaces.iter()
    }

    /// The declaration named `name`.
    pub fn get(&self, name: &str) -> Option<&Interface> {
        self.interfaces.iter().find(|i| i.name == name)
    }
}

impl FromIterator<Interface> for InterfaceList {
    fn from_iter<I: IntoIterator<Item = Interface>>(iter: I) -> Self {
        InterfaceList {
            interfaces: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a InterfaceList {
    type Item = &'a Interface;
    type IntoIter = std::slice::Iter<'a, Interface>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Creates and registers every class in `list`, in order.
///
/// Interfaces that already hold a class are skipped. A superclass is looked
/// up among the interfaces before it, then in the runtime.
///
/// # Errors
///
/// Fails with the first error. The failing class is disposed, and so is
/// every class this call registered, last first.
///
/// - [`Error::ClassNotFound`] if a superclass name resolves to nothing
/// - any error from [`Runtime::allocate_class_pair`],
///   [`Runtime::add_property`] or [`Runtime::add_method`]
pub fn init_runtime<B: Backend>(runtime: &Runtime<B>, list: &mut InterfaceList) -> Result<()> {
    objenc_log::info!("registering {} interfaces", list.len());

    let mut registered = Vec::new();
    for index in 0..list.interfaces.len() {
        if list.interfaces[index].class.is_some() {
            continue;
        }

        let interface = &list.interfaces[index];
        let result = resolve_superclass(runtime, &list.interfaces[..index], interface)
            .and_then(|superclass| interface.build(runtime, superclass));

        match result {
            Ok(cls) => {
                list.interfaces[index].class = Some(cls);
                registered.push(index);
            }
            Err(err) => {
                objenc_log::warn!(
                    "registering {} failed: {err}; rolling back {} classes",
                    list.interfaces[index].name,
                    registered.len()
                );
                for &done in registered.iter().rev() {
                    if let Some(cls) = list.interfaces[done].class.take() {
                        // SAFETY: these classes were registered by this call
                        // and not yet returned; later ones go first, so no
                        // subclass outlives its superclass
                        unsafe { runtime.dispose_class_pair(cls) };
                    }
                }
                return Err(err);
            }
        }
    }

    Ok(())
}

/// Disposes every registered class in `list`, last first.
///
/// Calling it again does nothing.
///
/// # Safety
///
/// The contract of [`Runtime::dispose_class_pair`] applies to every class in
/// `list`: no handle to them, no instance of them and no subclass declared
/// outside `list` may be used afterwards.
pub unsafe fn deinit_runtime<B: Backend>(runtime: &Runtime<B>, list: &mut InterfaceList) {
    objenc_log::info!("disposing {} interfaces", list.len());
    for interface in list.interfaces.iter_mut().rev() {
        if let Some(cls) = interface.class.take() {
            // SAFETY: upheld by the caller; reverse order disposes
            // subclasses in the list before their superclasses
            unsafe { runtime.dispose_class_pair(cls) };
        }
    }
}

fn resolve_superclass<B: Backend>(
    runtime: &Runtime<B>,
    earlier: &[Interface],
    interface: &Interface,
) -> Result<Class> {
    let Some(name) = interface.superclass.as_deref() else {
        return Ok(Class::NIL);
    };

    earlier
        .iter()
        .rev()
        .find(|i| i.name == name)
        .and_then(|i| i.class)
        .or_else(|| runtime.class_by_name(name))
        .ok_or_else(|| Error::ClassNotFound {
            name: name.to_string(),
        })
}
