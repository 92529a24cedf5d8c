//! Byte View Module
//!
//! Immutable byte container handed out by cache lookups.

use std::fmt;
use std::sync::Arc;

use crate::cache::Value;

// == Byte View ==
/// An immutable view over cached bytes.
///
/// The bytes are shared behind an `Arc<[u8]>`, so cloning a view is cheap and
/// never copies. There is no way to obtain mutable access to the contents;
/// callers who need an owned buffer get a fresh copy via [`ByteView::byte_slice`].
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct ByteView {
    bytes: Arc<[u8]>,
}

impl ByteView {
    // == Constructor ==
    /// Creates a view holding a copy of `bytes`.
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            bytes: Arc::from(bytes),
        }
    }

    // == Length ==
    /// Returns the number of bytes in the view.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    // == Is Empty ==
    /// Returns true for a zero-length view.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    // == Byte Slice ==
    /// Returns a copy of the data.
    ///
    /// Mutating the returned vector never affects the cached value.
    pub fn byte_slice(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// Returns the data as a string, replacing invalid UTF-8 sequences.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

impl Value for ByteView {
    fn byte_len(&self) -> usize {
        self.len()
    }
}

impl From<&[u8]> for ByteView {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

/// Takes ownership of the buffer without copying it. The caller gives up
/// the `Vec`, so the view still cannot be changed through it.
impl From<Vec<u8>> for ByteView {
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::from(bytes),
        }
    }
}

impl From<&str> for ByteView {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteView")
            .field("len", &self.len())
            .field("bytes", &self.to_string_lossy())
            .finish()
    }
}
