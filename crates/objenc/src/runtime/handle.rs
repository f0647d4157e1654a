//! Opaque runtime handles.
//!
//! Every handle is a pointer-sized, `#[repr(transparent)]` wrapper around a
//! raw address owned by the runtime. Handles compare by address and have a
//! distinguished nil value. Holding a handle does not keep anything alive,
//! and the bindings never free class or selector handles.
//!
//! Handles are only built by a runtime, or through the `unsafe`
//! [`Class::from_ptr`] family, so a safe caller cannot forge one.

use std::ffi::c_void;
use std::fmt;
use std::ptr;

/// The runtime's `BOOL`.
pub type Bool = i8;

/// `YES`
pub const YES: Bool = 1;

/// `NO`
pub const NO: Bool = 0;

/// Method implementation pointer, cast to its real signature by the caller.
pub type Imp = unsafe extern "C" fn();

macro_rules! objc_handle {
    ($($(#[$meta:meta])* $name:ident;)*) => {
        $(
            $(#[$meta])*
            #[repr(transparent)]
            #[derive(Clone, Copy, PartialEq, Eq, Hash)]
            pub struct $name(*mut c_void);

            impl $name {
                /// The nil handle.
                pub const NIL: Self = Self(ptr::null_mut());

                /// Wraps a raw runtime address.
                ///
                /// # Safety
                ///
                /// `ptr` must be null or an address the runtime handed out
                /// for this kind of handle, still live in the runtime the
                /// handle will be passed to.
                #[must_use]
                pub const unsafe fn from_ptr(ptr: *mut c_void) -> Self {
                    Self(ptr)
                }

                /// Returns the raw runtime address.
                #[must_use]
                pub const fn as_ptr(self) -> *mut c_void {
                    self.0
                }

                /// Returns true for the nil handle.
                #[must_use]
                pub fn is_nil(self) -> bool {
                    self.0.is_null()
                }
            }

            impl Default for $name {
                fn default() -> Self {
                    Self::NIL
                }
            }

            impl fmt::Debug for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    if self.is_nil() {
                        write!(f, "{}(nil)", stringify!($name))
                    } else {
                        write!(f, "{}({:p})", stringify!($name), self.0)
                    }
                }
            }

            // SAFETY: a handle is only an address. It is never dereferenced
            // outside a backend call, and backends synchronize their own state.
            unsafe impl Send for $name {}
            unsafe impl Sync for $name {}
        )*
    };
}

objc_handle! {
    /// A class (`Class`).
    Class;
    /// An object instance (`id`).
    Object;
    /// A selector (`SEL`).
    Sel;
    /// A method (`Method`).
    Method;
    /// A declared property (`objc_property_t`).
    Property;
    /// A protocol (`Protocol *`).
    Protocol;
    /// An instance variable (`Ivar`).
    Ivar;
}

impl Class {
    /// Views a class as the object it is to the runtime.
    #[must_use]
    pub const fn as_object(self) -> Object {
        Object(self.0)
    }
}

/// Converts a runtime `BOOL` into `bool`.
///
/// # Panics
///
/// Panics on any value other than `YES` or `NO`. The runtime only ever
/// returns those two, so a third value means the boundary is broken.
///
/// ```
/// use objenc::runtime::{NO, YES, bool_from_objc};
///
/// assert!(bool_from_objc(YES));
/// assert!(!bool_from_objc(NO));
/// ```
#[must_use]
pub fn bool_from_objc(raw: Bool) -> bool {
    match raw {
        NO => false,
        YES => true,
        other => {
            objenc_log::error!("runtime returned BOOL value {other}");
            panic!("invariant violation: BOOL must be YES or NO, got {other}");
        }
    }
}

/// Converts `bool` into a runtime `BOOL`.
#[must_use]
pub const fn bool_to_objc(value: bool) -> Bool {
    if value { YES } else { NO }
}
