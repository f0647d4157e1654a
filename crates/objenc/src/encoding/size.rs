//! Size Calculator: the first encoding pass.
//!
//! Walks a [`TypeDesc`] and returns the exact length of its encoding without
//! producing it. The Literal Encoder mirrors every branch here, so the two
//! passes accept and reject the same shapes.

use super::TypeDesc;
use crate::error::{Error, Result};

/// Deepest indirection level at which a struct is still expanded.
///
/// Depth 0 is the top-level type; every pointer or struct field adds one.
pub const EXPANSION_DEPTH: usize = 1;

/// Returns the length of the encoding of `ty` at indirection `depth`.
///
/// # Example
///
/// ```
/// use objenc::encoding::{TypeDesc, encoded_size};
///
/// let point = TypeDesc::structure("Point", [("a", TypeDesc::unsigned(32))]);
/// assert_eq!(encoded_size(&point, 0).unwrap(), "{Point=I}".len());
/// assert_eq!(encoded_size(&point, 2).unwrap(), "{Point}".len());
/// ```
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] if `ty` or anything it expands into
/// has no encoding.
pub fn encoded_size(ty: &TypeDesc, depth: usize) -> Result<usize> {
    match ty {
        TypeDesc::Int { .. }
        | TypeDesc::Float { .. }
        | TypeDesc::Bool
        | TypeDesc::Void => match ty.leaf_token() {
            Some(_) => Ok(1),
            None => Err(unsupported(ty)),
        },
        TypeDesc::Pointer(pointee) => {
            if pointee.pointee_token().is_some() {
                Ok(1)
            } else {
                Ok(1 + encoded_size(pointee, depth + 1)?)
            }
        }
        TypeDesc::Struct { name, fields } => {
            if !TypeDesc::is_valid_struct_name(name) {
                return Err(unsupported(ty));
            }

            let mut size = name.len() + 2;
            if depth <= EXPANSION_DEPTH {
                size += 1;
                for field in fields.resolve().iter() {
                    size += encoded_size(&field.ty, depth + 1)?;
                }
            }
            Ok(size)
        }
        TypeDesc::Object
        | TypeDesc::Opaque { .. }
        | TypeDesc::Union { .. }
        | TypeDesc::Array { .. }
        | TypeDesc::BitField { .. }
        | TypeDesc::Function => Err(unsupported(ty)),
    }
}

pub(crate) fn unsupported(ty: &TypeDesc) -> Error {
    Error::UnsupportedType { ty: ty.to_string() }
}
