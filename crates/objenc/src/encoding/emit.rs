//! Literal Encoder: the second encoding pass.
//!
//! Fills a buffer pre-sized by [`encoded_size`](super::encoded_size) with
//! grammar tokens, branch for branch with the Size Calculator. The output
//! must come out at exactly the computed length; anything else is a bug in
//! one of the passes and panics.

use super::size::{EXPANSION_DEPTH, encoded_size, unsupported};
use super::TypeDesc;
use crate::error::{Error, Result};
use std::ffi::{CStr, CString, c_char};
use std::fmt;

/// An immutable, null-terminated type encoding.
///
/// This is the only form in which encodings cross into the runtime.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EncodedString(CString);

impl EncodedString {
    /// Returns the encoding as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Only ASCII tokens and validated names are ever written.
        self.0.to_str().unwrap_or_default()
    }

    /// Returns the encoding as a C string.
    #[must_use]
    pub fn as_c_str(&self) -> &CStr {
        &self.0
    }

    /// Returns a pointer to the null-terminated encoding.
    #[must_use]
    pub fn as_ptr(&self) -> *const c_char {
        self.0.as_ptr()
    }

    /// Returns the encoding bytes, without the terminator.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Length in bytes, without the terminator.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.as_bytes().len()
    }

    /// Returns true if the encoding is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.as_bytes().is_empty()
    }

    /// Wraps bytes already known to be NUL-free.
    pub(crate) fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        CString::new(bytes)
            .map(EncodedString)
            .map_err(|err| Error::InvalidEncoding {
                position: err.nul_position(),
                encoding: String::from_utf8_lossy(&err.into_vec()).into_owned(),
            })
    }
}

impl fmt::Display for EncodedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for EncodedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedString({:?})", self.as_str())
    }
}

impl AsRef<CStr> for EncodedString {
    fn as_ref(&self) -> &CStr {
        &self.0
    }
}

impl PartialEq<str> for EncodedString {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for EncodedString {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

/// Encodes `ty` at `depth` into a string of exactly `expected_len` bytes.
///
/// `expected_len` must be `encoded_size(ty, depth)`.
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] for the same shapes the Size
/// Calculator rejects.
///
/// # Panics
///
/// Panics if the produced length differs from `expected_len`.
pub fn encode(ty: &TypeDesc, depth: usize, expected_len: usize) -> Result<EncodedString> {
    let mut buf = Vec::with_capacity(expected_len + 1);
    emit(ty, depth, &mut buf)?;

    assert_eq!(
        buf.len(),
        expected_len,
        "encoding of {ty} at depth {depth} disagrees with its computed length"
    );

    EncodedString::from_bytes(buf)
}

/// Encodes `ty` as a top-level type (depth 0), running both passes.
///
/// # Example
///
/// ```
/// use objenc::encoding::{TypeDesc, encoding_of};
///
/// let example = TypeDesc::structure(
///     "Example",
///     [
///         ("obj", TypeDesc::object_handle()),
///         ("s", TypeDesc::c_string()),
///         ("n", TypeDesc::signed(32)),
///     ],
/// );
/// assert_eq!(encoding_of(&example).unwrap(), "{Example=@*i}");
///
/// let twice = TypeDesc::pointer(TypeDesc::pointer(example));
/// assert_eq!(encoding_of(&twice).unwrap(), "^^{Example}");
/// ```
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] if the type has no encoding.
pub fn encoding_of(ty: &TypeDesc) -> Result<EncodedString> {
    encoding_at(ty, 0)
}

/// Encodes `ty` at an explicit indirection `depth`.
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] if the type has no encoding.
pub fn encoding_at(ty: &TypeDesc, depth: usize) -> Result<EncodedString> {
    let len = encoded_size(ty, depth)?;
    let encoded = encode(ty, depth, len)?;
    objenc_log::trace!("{ty} at depth {depth} -> {encoded}");
    Ok(encoded)
}

fn emit(ty: &TypeDesc, depth: usize, out: &mut Vec<u8>) -> Result<()> {
    match ty {
        TypeDesc::Int { .. }
        | TypeDesc::Float { .. }
        | TypeDesc::Bool
        | TypeDesc::Void => {
            let token = ty.leaf_token().ok_or_else(|| unsupported(ty))?;
            out.push(token);
        }
        TypeDesc::Pointer(pointee) => match pointee.pointee_token() {
            Some(token) => out.push(token),
            None => {
                out.push(b'^');
                emit(pointee, depth + 1, out)?;
            }
        },
        TypeDesc::Struct { name, fields } => {
            if !TypeDesc::is_valid_struct_name(name) {
                return Err(unsupported(ty));
            }

            out.push(b'{');
            out.extend_from_slice(name.as_bytes());
            if depth <= EXPANSION_DEPTH {
                out.push(b'=');
                for field in fields.resolve().iter() {
                    emit(&field.ty, depth + 1, out)?;
                }
            }
            out.push(b'}');
        }
        TypeDesc::Object
        | TypeDesc::Opaque { .. }
        | TypeDesc::Union { .. }
        | TypeDesc::Array { .. }
        | TypeDesc::BitField { .. }
        | TypeDesc::Function => return Err(unsupported(ty)),
    }
    Ok(())
}
