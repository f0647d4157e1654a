//! Type encodings for the Objective-C runtime.
//!
//! An encoding is the runtime's textual description of a value's shape:
//!
//! ```text
//! encoding := leaf | pointer | struct
//! leaf     := 'c'|'i'|'s'|'l'|'q'|'C'|'I'|'S'|'L'|'Q'|'f'|'d'|'B'|'v'|'@'|'*'|'?'
//! pointer  := '^' encoding
//! struct   := '{' name ['=' encoding*] '}'
//! ```
//!
//! Encoding runs in two passes over a [`TypeDesc`]. [`encoded_size`]
//! computes the exact output length, then [`encode`] fills a buffer of that
//! length. Both passes thread an indirection depth that starts at 0 and
//! grows by one through every pointer and struct field. A struct is
//! expanded (`{Name=...}`) up to depth 1 and abbreviated (`{Name}`) beyond.
//!
//! # Example
//!
//! ```
//! use objenc::encoding::{TypeDesc, encoded_size, encode};
//!
//! let ty = TypeDesc::pointer(TypeDesc::structure(
//!     "Point",
//!     [("x", TypeDesc::float(64)), ("y", TypeDesc::float(64))],
//! ));
//!
//! let len = encoded_size(&ty, 0).unwrap();
//! let encoded = encode(&ty, 0, len).unwrap();
//! assert_eq!(encoded.as_str(), "^{Point=dd}");
//! ```

pub mod cache;
pub mod desc;
pub mod emit;
pub mod host;
pub mod signature;
pub mod size;

pub use cache::EncodingCache;
pub use desc::{Field, Fields, TypeDesc};
pub use emit::{EncodedString, encode, encoding_at, encoding_of};
pub use host::Encode;
pub use signature::{
    method_signature, parse_method_encoding, validate_method_encoding,
    validate_type_encoding,
};
pub use size::{EXPANSION_DEPTH, encoded_size};
