//! Method signatures and grammar validation.
//!
//! A method encoding is the return type's encoding, then `@` (self) and
//! `:` (`_cmd`), then one encoding per argument:
//!
//! - `"v@:"` - void return, no arguments
//! - `"i@:i"` - int return, one int argument
//! - `"v@:^{Point=ii}"` - void return, one struct pointer argument

use super::{EncodedString, TypeDesc, encoded_size, encode};
use crate::error::{Error, Result};

const LEAVES: &[u8] = b"cislqCISLQfdBv@*?";

/// Builds the method encoding for `ret (self, _cmd, args...)`.
///
/// Each type is encoded as a top-level type.
///
/// # Example
///
/// ```
/// use objenc::encoding::{TypeDesc, method_signature};
///
/// let sig = method_signature(&TypeDesc::Void, &[]).unwrap();
/// assert_eq!(sig, "v@:");
///
/// let sig = method_signature(
///     &TypeDesc::signed(32),
///     &[TypeDesc::object_handle(), TypeDesc::float(64)],
/// )
/// .unwrap();
/// assert_eq!(sig, "i@:@d");
/// ```
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] if any type has no encoding.
pub fn method_signature(ret: &TypeDesc, args: &[TypeDesc]) -> Result<EncodedString> {
    fn push(ty: &TypeDesc, buf: &mut Vec<u8>) -> Result<()> {
        let len = encoded_size(ty, 0)?;
        buf.extend_from_slice(encode(ty, 0, len)?.as_bytes());
        Ok(())
    }

    let mut buf = Vec::new();
    push(ret, &mut buf)?;
    buf.extend_from_slice(b"@:");
    for arg in args {
        push(arg, &mut buf)?;
    }

    EncodedString::from_bytes(buf)
}

/// Checks that `encoding` is exactly one type in the encoding grammar.
///
/// ```
/// use objenc::encoding::validate_type_encoding;
///
/// assert!(validate_type_encoding("^{Example=@*i}").is_ok());
/// assert!(validate_type_encoding("{Example}").is_ok());
/// assert!(validate_type_encoding("{Example=").is_err());
/// assert!(validate_type_encoding("ii").is_err());
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidEncoding`] with the offset of the first
/// character that does not fit the grammar.
pub fn validate_type_encoding(encoding: &str) -> Result<()> {
    let bytes = encoding.as_bytes();
    let end = parse_type(bytes, 0).map_err(|position| invalid(encoding, position))?;
    if end != bytes.len() {
        return Err(invalid(encoding, end));
    }
    Ok(())
}

/// Checks that `encoding` is a method encoding: a return type, `@`, `:`,
/// then zero or more argument types.
///
/// ```
/// use objenc::encoding::validate_method_encoding;
///
/// assert!(validate_method_encoding("v@:").is_ok());
/// assert!(validate_method_encoding("i@:i*").is_ok());
/// assert!(validate_method_encoding("v@").is_err());
/// assert!(validate_method_encoding("v:@").is_err());
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidEncoding`] if the string is not a method encoding.
pub fn validate_method_encoding(encoding: &str) -> Result<()> {
    parse_method_encoding(encoding).map(|_| ())
}

/// Splits a method encoding into its return type and argument types.
///
/// The implicit `self` and `_cmd` arguments are included in the argument
/// list.
///
/// ```
/// use objenc::encoding::parse_method_encoding;
///
/// let (ret, args) = parse_method_encoding("i@:^{P=ii}d").unwrap();
/// assert_eq!(ret, "i");
/// assert_eq!(args, vec!["@", ":", "^{P=ii}", "d"]);
/// ```
///
/// # Errors
///
/// Returns [`Error::InvalidEncoding`] if the string is not a method encoding.
pub fn parse_method_encoding(encoding: &str) -> Result<(String, Vec<String>)> {
    let bytes = encoding.as_bytes();

    let ret_end = parse_type(bytes, 0).map_err(|position| invalid(encoding, position))?;
    for (offset, expected) in [b'@', b':'].into_iter().enumerate() {
        let position = ret_end + offset;
        if bytes.get(position) != Some(&expected) {
            return Err(invalid(encoding, position));
        }
    }

    let mut args = vec!["@".to_string(), ":".to_string()];
    let mut position = ret_end + 2;
    while position < bytes.len() {
        let end = parse_type(bytes, position).map_err(|at| invalid(encoding, at))?;
        args.push(encoding[position..end].to_string());
        position = end;
    }

    Ok((encoding[..ret_end].to_string(), args))
}

/// Parses one type starting at `start`; returns the offset just past it,
/// or the offset of the first bad byte.
fn parse_type(bytes: &[u8], start: usize) -> std::result::Result<usize, usize> {
    match bytes.get(start) {
        Some(b) if LEAVES.contains(b) => Ok(start + 1),
        Some(b'^') => parse_type(bytes, start + 1),
        Some(b'{') => {
            let name_start = start + 1;
            let mut position = name_start;
            loop {
                match bytes.get(position) {
                    Some(b'=' | b'}') if position > name_start => break,
                    Some(0 | b'{' | b'}' | b'=' | b'^') | None => return Err(position),
                    Some(_) => position += 1,
                }
            }

            if bytes[position] == b'=' {
                position += 1;
                while bytes.get(position) != Some(&b'}') {
                    position = parse_type(bytes, position)?;
                }
            }
            Ok(position + 1)
        }
        _ => Err(start),
    }
}

fn invalid(encoding: &str, position: usize) -> Error {
    Error::InvalidEncoding {
        encoding: encoding.to_string(),
        position,
    }
}
