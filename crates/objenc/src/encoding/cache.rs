//! Caller-owned memo of encoded types.
//!
//! Encoding is pure, so each `(type, depth)` pair only ever needs to be
//! encoded once. The cache is an ordinary value owned by whoever does the
//! encoding; there is no process-wide table.

use super::{EncodedString, Encode, encoding_at};
use crate::error::Result;
use fxhash::FxHashMap;
use std::any::{TypeId, type_name};
use std::collections::hash_map::Entry;

/// Memoizes encodings of Rust types keyed by `(TypeId, depth)`.
///
/// # Example
///
/// ```
/// use objenc::encoding::EncodingCache;
///
/// let mut cache = EncodingCache::new();
/// assert_eq!(cache.get::<u16>().unwrap().as_str(), "S");
/// assert_eq!(cache.get::<u16>().unwrap().as_str(), "S");
/// assert_eq!(cache.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct EncodingCache {
    entries: FxHashMap<(TypeId, usize), EncodedString>,
}

impl EncodingCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the top-level encoding of `T`, encoding it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`](crate::Error::UnsupportedType) if
    /// `T` has no encoding. Failures are not cached.
    pub fn get<T: Encode + ?Sized + 'static>(&mut self) -> Result<&EncodedString> {
        self.get_at::<T>(0)
    }

    /// Returns the encoding of `T` at indirection `depth`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`](crate::Error::UnsupportedType) if
    /// `T` has no encoding at that depth.
    pub fn get_at<T: Encode + ?Sized + 'static>(
        &mut self,
        depth: usize,
    ) -> Result<&EncodedString> {
        match self.entries.entry((TypeId::of::<T>(), depth)) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                objenc_log::debug!(
                    "encoding {} at depth {depth} (cache miss)",
                    type_name::<T>()
                );
                let encoded = encoding_at(&T::type_desc(), depth)?;
                Ok(entry.insert(encoded))
            }
        }
    }

    /// Number of cached encodings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every cached encoding.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
