//! Deriving type descriptions from Rust types.
//!
//! [`Encode`] maps a Rust type onto its [`TypeDesc`]. Integer widths are
//! measured from the Rust type, so the platform's `c_long` and friends land
//! on the right token without naming them.

use super::{EncodedString, TypeDesc, encoding_of};
use crate::error::Result;
use crate::runtime::handle::{Class, Object, Sel};
use std::ffi::c_void;

/// Types with a known native shape.
///
/// # Example
///
/// ```
/// use objenc::encoding::Encode;
/// use std::ffi::c_char;
///
/// assert_eq!(i8::encoding().unwrap(), "c");
/// assert_eq!(u8::encoding().unwrap(), "C");
/// assert_eq!(<*const i32>::encoding().unwrap(), "^i");
/// assert_eq!(<*const c_char>::encoding().unwrap(), "*");
/// ```
pub trait Encode {
    /// Returns the structural description of `Self`.
    fn type_desc() -> TypeDesc;

    /// Encodes `Self` as a top-level type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`](crate::Error::UnsupportedType) if
    /// the description has no encoding.
    fn encoding() -> Result<EncodedString> {
        encoding_of(&Self::type_desc())
    }
}

macro_rules! impl_encode_int {
    ($($ty:ty => $signed:expr),* $(,)?) => {
        $(
            impl Encode for $ty {
                fn type_desc() -> TypeDesc {
                    TypeDesc::Int {
                        signed: $signed,
                        bits: <$ty>::BITS,
                    }
                }
            }
        )*
    };
}

impl_encode_int! {
    i8 => true,
    i16 => true,
    i32 => true,
    i64 => true,
    isize => true,
    u8 => false,
    u16 => false,
    u32 => false,
    u64 => false,
    usize => false,
}

impl Encode for f32 {
    fn type_desc() -> TypeDesc {
        TypeDesc::float(32)
    }
}

impl Encode for f64 {
    fn type_desc() -> TypeDesc {
        TypeDesc::float(64)
    }
}

impl Encode for bool {
    fn type_desc() -> TypeDesc {
        TypeDesc::Bool
    }
}

impl Encode for () {
    fn type_desc() -> TypeDesc {
        TypeDesc::Void
    }
}

impl Encode for c_void {
    fn type_desc() -> TypeDesc {
        TypeDesc::opaque("c_void")
    }
}

impl<T: Encode + ?Sized> Encode for *const T {
    fn type_desc() -> TypeDesc {
        TypeDesc::pointer(T::type_desc())
    }
}

impl<T: Encode + ?Sized> Encode for *mut T {
    fn type_desc() -> TypeDesc {
        TypeDesc::pointer(T::type_desc())
    }
}

impl Encode for Object {
    fn type_desc() -> TypeDesc {
        TypeDesc::object_handle()
    }
}

// Classes are objects to the runtime.
impl Encode for Class {
    fn type_desc() -> TypeDesc {
        TypeDesc::object_handle()
    }
}

impl Encode for Sel {
    fn type_desc() -> TypeDesc {
        TypeDesc::pointer(TypeDesc::opaque("objc_selector"))
    }
}

/// Declares a `#[repr(C)]` struct and implements [`Encode`] for it.
///
/// The struct's name is used as the encoded name. Field descriptions are
/// built lazily, so a struct may point to itself.
///
/// ```
/// use objenc::encode_struct;
/// use objenc::encoding::Encode;
///
/// encode_struct! {
///     pub struct Node {
///         pub next: *mut Node,
///         pub value: i32,
///     }
/// }
///
/// assert_eq!(Node::encoding().unwrap(), "{Node=^{Node}i}");
/// assert_eq!(<*mut Node>::encoding().unwrap(), "^{Node=^{Node}i}");
/// ```
#[macro_export]
macro_rules! encode_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $field_ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(C)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $field_ty,
            )*
        }

        impl $crate::encoding::Encode for $name {
            fn type_desc() -> $crate::encoding::TypeDesc {
                fn fields() -> ::std::vec::Vec<$crate::encoding::Field> {
                    ::std::vec![
                        $(
                            $crate::encoding::Field::new(
                                ::std::stringify!($field),
                                <$field_ty as $crate::encoding::Encode>::type_desc(),
                            ),
                        )*
                    ]
                }

                $crate::encoding::TypeDesc::deferred_struct(
                    ::std::stringify!($name),
                    fields,
                )
            }
        }
    };
}
