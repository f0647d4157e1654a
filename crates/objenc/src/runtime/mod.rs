//! Bindings to the Objective-C runtime.
//!
//! This module exposes the runtime through three layers:
//!
//! - [`handle`]: opaque, pointer-sized handles (`Class`, `Object`, `Sel`, ...)
//! - [`backend`]: the raw entry points, as the [`Backend`] trait
//! - [`bridge`]: [`Runtime`], the safe wrapper everything else goes through
//!
//! Two backends exist. [`LocalRuntime`] lives in-process and works on every
//! host. `Native` forwards to the system `libobjc` and needs the `native`
//! feature on an Apple target.
//!
//! [`interface`] builds on [`Runtime`] to register a list of class
//! declarations at startup.
//!
//! # Example
//!
//! ```rust
//! use objenc::runtime::{Class, Runtime};
//!
//! let runtime = Runtime::local();
//! let base = runtime.allocate_class_pair(Class::NIL, "Base", 0).unwrap();
//! runtime.register_class_pair(base).unwrap();
//!
//! let meta = runtime.metaclass(base);
//! assert!(runtime.is_metaclass(meta));
//! assert_eq!(runtime.class_name(meta), "Base");
//! ```

pub mod backend;
pub mod bridge;
pub mod handle;
pub mod interface;
pub mod local;
#[cfg(all(feature = "native", target_vendor = "apple"))]
pub mod native;

pub use backend::{Backend, PropertyAttribute};
pub use bridge::{Instance, Runtime};
pub use handle::{
    Bool, Class, Imp, Ivar, Method, NO, Object, Property, Protocol, Sel, YES, bool_from_objc,
    bool_to_objc,
};
pub use interface::{
    Interface, InterfaceList, MethodDecl, PropertyDecl, deinit_runtime, init_runtime,
};
pub use local::LocalRuntime;
#[cfg(all(feature = "native", target_vendor = "apple"))]
pub use native::Native;
