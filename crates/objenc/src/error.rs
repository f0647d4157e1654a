//! Error types for `objenc`.
//!
//! Only recoverable conditions are represented here. A Literal Encoder
//! output whose length disagrees with the Size Calculator, or a BOOL from
//! the runtime that is neither `YES` nor `NO`, is a bug and panics instead.

use std::fmt;

/// Errors that can occur while encoding types or talking to the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The type shape has no encoding (unions, arrays, bitfields,
    /// functions, odd widths, opaque values).
    UnsupportedType {
        /// Description of the offending type.
        ty: String,
    },

    /// A string was rejected by the encoding grammar.
    InvalidEncoding {
        /// The rejected string.
        encoding: String,
        /// Byte offset of the first offending character.
        position: usize,
    },

    /// A name was empty or contained an interior NUL byte.
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// The runtime refused to allocate a class pair.
    ClassAllocationFailed {
        /// Name of the requested class.
        name: String,
    },

    /// No registered class has this name.
    ClassNotFound {
        /// The name that was looked up.
        name: String,
    },

    /// An operation that needs a live handle was given nil.
    NilHandle {
        /// Which handle was nil.
        what: &'static str,
    },

    /// A metaclass was given where a class is required.
    UnexpectedMetaclass {
        /// Name of the metaclass.
        name: String,
    },

    /// Instance memory could not be allocated.
    InstanceAllocationFailed {
        /// Requested size in bytes.
        size: usize,
    },

    /// The runtime refused to add a method.
    MethodRejected {
        /// Selector name of the method.
        selector: String,
    },

    /// The runtime refused to add a property.
    PropertyRejected {
        /// Name of the property.
        name: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnsupportedType { ty } => {
                write!(f, "Unsupported type for encoding: {ty}")
            }
            Error::InvalidEncoding { encoding, position } => {
                write!(
                    f,
                    "Invalid type encoding {encoding:?} at position {position}"
                )
            }
            Error::InvalidName { name } => {
                write!(f, "Invalid runtime name: {name:?}")
            }
            Error::ClassAllocationFailed { name } => {
                write!(f, "Failed to allocate class pair for {name}")
            }
            Error::ClassNotFound { name } => write!(f, "Class not found: {name}"),
            Error::NilHandle { what } => write!(f, "Unexpected nil {what}"),
            Error::UnexpectedMetaclass { name } => {
                write!(f, "Expected a class but got the metaclass of {name}")
            }
            Error::InstanceAllocationFailed { size } => {
                write!(f, "Failed to allocate instance of {size} bytes")
            }
            Error::MethodRejected { selector } => {
                write!(f, "Runtime rejected method {selector}")
            }
            Error::PropertyRejected { name } => {
                write!(f, "Runtime rejected property {name}")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Result type for `objenc` operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::UnsupportedType {
                ty: "union Value".to_string()
            }
            .to_string(),
            "Unsupported type for encoding: union Value"
        );
        assert_eq!(
            Error::InvalidEncoding {
                encoding: "{A".to_string(),
                position: 2
            }
            .to_string(),
            "Invalid type encoding \"{A\" at position 2"
        );
        assert_eq!(
            Error::NilHandle { what: "class" }.to_string(),
            "Unexpected nil class"
        );
        assert_eq!(
            Error::UnexpectedMetaclass {
                name: "Widget".to_string()
            }
            .to_string(),
            "Expected a class but got the metaclass of Widget"
        );
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(
            Error::ClassNotFound {
                name: "A".to_string()
            },
            Error::ClassNotFound {
                name: "A".to_string()
            }
        );
        assert_ne!(
            Error::InstanceAllocationFailed { size: 8 },
            Error::InstanceAllocationFailed { size: 16 }
        );
    }
}
