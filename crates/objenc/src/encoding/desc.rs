//! Structural type descriptions.
//!
//! A [`TypeDesc`] is the explicit, caller-owned view of a native type that
//! both encoding passes walk. Shapes that have no encoding (unions, arrays,
//! bitfields, functions) are representable so that they can be rejected
//! with the offending type named.

use std::borrow::Cow;
use std::ffi::{c_int, c_long, c_longlong, c_short};
use std::fmt;

const C_INT_BITS: u32 = c_int::BITS;
const C_SHORT_BITS: u32 = c_short::BITS;
const C_LONG_BITS: u32 = c_long::BITS;
const C_LONGLONG_BITS: u32 = c_longlong::BITS;

/// A named struct field.
#[derive(Debug, Clone)]
pub struct Field {
    /// Field name (informational; not part of the encoding).
    pub name: Cow<'static, str>,
    /// Field type.
    pub ty: TypeDesc,
}

impl Field {
    /// Creates a field.
    pub fn new(name: impl Into<Cow<'static, str>>, ty: TypeDesc) -> Self {
        Field {
            name: name.into(),
            ty,
        }
    }
}

/// The fields of a struct description.
///
/// `Deferred` fields are produced on demand, which is what lets a struct
/// refer to itself through a pointer: the fields are only materialized when
/// the struct is actually expanded.
#[derive(Clone)]
pub enum Fields {
    /// Fields listed up front.
    Listed(Vec<Field>),
    /// Fields built when first needed.
    Deferred(fn() -> Vec<Field>),
}

impl Fields {
    /// Returns the fields in declaration order.
    #[must_use]
    pub fn resolve(&self) -> Cow<'_, [Field]> {
        match self {
            Fields::Listed(fields) => Cow::Borrowed(fields.as_slice()),
            Fields::Deferred(build) => Cow::Owned(build()),
        }
    }
}

impl fmt::Debug for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fields::Listed(fields) => f.debug_list().entries(fields).finish(),
            Fields::Deferred(_) => f.write_str("<deferred>"),
        }
    }
}

/// Structural description of a native type.
///
/// # Example
///
/// ```
/// use objenc::encoding::{TypeDesc, encoding_of};
///
/// let point = TypeDesc::structure("Point", [("a", TypeDesc::unsigned(32))]);
/// assert_eq!(encoding_of(&point).unwrap().as_str(), "{Point=I}");
/// ```
#[derive(Debug, Clone)]
pub enum TypeDesc {
    /// Integer with its measured width in bits.
    Int {
        /// Whether the integer is signed.
        signed: bool,
        /// Width in bits.
        bits: u32,
    },
    /// Floating point number with its width in bits.
    Float {
        /// Width in bits.
        bits: u32,
    },
    /// Boolean.
    Bool,
    /// Void.
    Void,
    /// A runtime object. Only encodable behind a pointer (`@`).
    Object,
    /// An opaque type. Only encodable behind a pointer (`?`).
    Opaque {
        /// Type name, for diagnostics.
        name: Cow<'static, str>,
    },
    /// Pointer to another type.
    Pointer(Box<TypeDesc>),
    /// C-layout struct.
    Struct {
        /// Struct name as it appears in the encoding.
        name: Cow<'static, str>,
        /// Fields in declaration order.
        fields: Fields,
    },
    /// Union (unsupported).
    Union {
        /// Union name.
        name: Cow<'static, str>,
    },
    /// Fixed-size array (unsupported).
    Array {
        /// Element count.
        len: usize,
        /// Element type.
        elem: Box<TypeDesc>,
    },
    /// Bitfield (unsupported).
    BitField {
        /// Width in bits.
        bits: u32,
    },
    /// Function (unsupported, also behind a pointer).
    Function,
}

impl TypeDesc {
    /// Signed integer of `bits` width.
    #[must_use]
    pub const fn signed(bits: u32) -> Self {
        TypeDesc::Int { signed: true, bits }
    }

    /// Unsigned integer of `bits` width.
    #[must_use]
    pub const fn unsigned(bits: u32) -> Self {
        TypeDesc::Int {
            signed: false,
            bits,
        }
    }

    /// Floating point number of `bits` width.
    #[must_use]
    pub const fn float(bits: u32) -> Self {
        TypeDesc::Float { bits }
    }

    /// Pointer to `pointee`.
    #[must_use]
    pub fn pointer(pointee: TypeDesc) -> Self {
        TypeDesc::Pointer(Box::new(pointee))
    }

    /// Object handle (`id`), i.e. a pointer to an object.
    #[must_use]
    pub fn object_handle() -> Self {
        TypeDesc::pointer(TypeDesc::Object)
    }

    /// C string (`char *`).
    #[must_use]
    pub fn c_string() -> Self {
        TypeDesc::pointer(TypeDesc::signed(8))
    }

    /// Opaque type named `name`.
    pub fn opaque(name: impl Into<Cow<'static, str>>) -> Self {
        TypeDesc::Opaque { name: name.into() }
    }

    /// Struct with fields listed up front.
    pub fn structure<N, I>(name: impl Into<Cow<'static, str>>, fields: I) -> Self
    where
        N: Into<Cow<'static, str>>,
        I: IntoIterator<Item = (N, TypeDesc)>,
    {
        TypeDesc::Struct {
            name: name.into(),
            fields: Fields::Listed(
                fields
                    .into_iter()
                    .map(|(field, ty)| Field::new(field, ty))
                    .collect(),
            ),
        }
    }

    /// Struct whose fields are built on demand.
    pub fn deferred_struct(
        name: impl Into<Cow<'static, str>>,
        fields: fn() -> Vec<Field>,
    ) -> Self {
        TypeDesc::Struct {
            name: name.into(),
            fields: Fields::Deferred(fields),
        }
    }

    /// Token for scalar leaves, chosen by measured width.
    ///
    /// `int`, `short`, `long` and `long long` are tried in that order, so on
    /// LP64 a 64-bit integer is reported as `long`.
    pub(crate) fn leaf_token(&self) -> Option<u8> {
        match *self {
            TypeDesc::Int { signed, bits } => {
                let (lower, upper) = if bits == 8 {
                    (b'c', b'C')
                } else if bits == C_INT_BITS {
                    (b'i', b'I')
                } else if bits == C_SHORT_BITS {
                    (b's', b'S')
                } else if bits == C_LONG_BITS {
                    (b'l', b'L')
                } else if bits == C_LONGLONG_BITS {
                    (b'q', b'Q')
                } else {
                    return None;
                };
                Some(if signed { lower } else { upper })
            }
            TypeDesc::Float { bits: 32 } => Some(b'f'),
            TypeDesc::Float { bits: 64 } => Some(b'd'),
            TypeDesc::Bool => Some(b'B'),
            TypeDesc::Void => Some(b'v'),
            _ => None,
        }
    }

    /// Single-token encoding of a pointer to `self`, if it has one.
    pub(crate) fn pointee_token(&self) -> Option<u8> {
        match self {
            TypeDesc::Object => Some(b'@'),
            TypeDesc::Int { bits: 8, .. } => Some(b'*'),
            TypeDesc::Opaque { .. } | TypeDesc::Void => Some(b'?'),
            _ => None,
        }
    }

    /// Returns true if `name` can appear between `{` and `}`.
    pub(crate) fn is_valid_struct_name(name: &str) -> bool {
        !name.is_empty()
            && !name
                .bytes()
                .any(|b| matches!(b, 0 | b'{' | b'}' | b'=' | b'^'))
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Int { signed: true, bits } => write!(f, "i{bits}"),
            TypeDesc::Int {
                signed: false,
                bits,
            } => write!(f, "u{bits}"),
            TypeDesc::Float { bits } => write!(f, "f{bits}"),
            TypeDesc::Bool => f.write_str("bool"),
            TypeDesc::Void => f.write_str("void"),
            TypeDesc::Object => f.write_str("object"),
            TypeDesc::Opaque { name } => write!(f, "opaque {name}"),
            TypeDesc::Pointer(pointee) => write!(f, "*{pointee}"),
            TypeDesc::Struct { name, .. } => write!(f, "struct {name}"),
            TypeDesc::Union { name } => write!(f, "union {name}"),
            TypeDesc::Array { len, elem } => write!(f, "[{elem}; {len}]"),
            TypeDesc::BitField { bits } => write!(f, "bitfield:{bits}"),
            TypeDesc::Function => f.write_str("fn"),
        }
    }
}
