//! `objenc`: Objective-C type encodings and runtime bindings
//!
//! `objenc` describes Rust and C types to an Objective-C style runtime. It
//! provides:
//!
//! - **Type encodings** computed in two passes: the exact length first, then
//!   the string itself
//! - **Host integration** through the [`encoding::Encode`] trait and the
//!   [`encode_struct!`] macro
//! - **Runtime bindings** with safe wrappers over class pairs, instances,
//!   selectors and properties
//! - **Interface registration** from a caller-owned list at startup
//!
//! # Architecture
//!
//! - [`encoding`]: type descriptions, the size and encode passes, method
//!   signatures, grammar validation and a caller-owned cache
//! - [`runtime`]: handles, the [`runtime::Backend`] entry points, the
//!   in-process and native backends and the [`runtime::Runtime`] wrapper
//!
//! # Example
//!
//! ```rust
//! use objenc::encode_struct;
//! use objenc::encoding::Encode;
//! use objenc::runtime::{Class, PropertyDecl, Runtime};
//!
//! encode_struct! {
//!     pub struct Size {
//!         pub width: f64,
//!         pub height: f64,
//!     }
//! }
//!
//! assert_eq!(Size::encoding().unwrap(), "{Size=dd}");
//! assert_eq!(<*const Size>::encoding().unwrap(), "^{Size=dd}");
//!
//! let runtime = Runtime::local();
//! let view = runtime.allocate_class_pair(Class::NIL, "View", 0).unwrap();
//! runtime.add_property(view, &PropertyDecl::of::<Size>("size").unwrap()).unwrap();
//! runtime.register_class_pair(view).unwrap();
//!
//! let size = runtime.property(view, "size").unwrap();
//! assert_eq!(runtime.property_attributes(size), "T{Size=dd}");
//! ```

#![warn(missing_docs)]

pub mod encoding;
pub mod error;
pub mod runtime;

// Re-export commonly used types
pub use encoding::{EncodedString, Encode, TypeDesc};
pub use error::{Error, Result};
pub use runtime::{Class, Object, Runtime, Sel};
