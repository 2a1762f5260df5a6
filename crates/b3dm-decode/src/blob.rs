//! Embedded model blob extraction.

use std::borrow::Cow;
use std::ops::Range;

/// Alignment glTF binary readers expect for the start of a blob.
pub const MODEL_ALIGNMENT: usize = 8;

/// The glTF binary embedded at the tail of a payload.
///
/// Borrows from the payload when the blob already starts on an 8-byte
/// boundary and owns a copy otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelBlob<'a> {
    bytes: Cow<'a, [u8]>,
    offset: usize,
}

impl<'a> ModelBlob<'a> {
    /// Extract `range` from `buffer`, copying when `range.start` is unaligned.
    ///
    /// `range` must lie within `buffer`.
    pub(crate) fn extract(buffer: &'a [u8], range: Range<usize>) -> Self {
        let offset = range.start;
        let slice = &buffer[range];
        let bytes = if offset % MODEL_ALIGNMENT == 0 {
            Cow::Borrowed(slice)
        } else {
            Cow::Owned(slice.to_vec())
        };
        Self { bytes, offset }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Offset of the blob within the original payload.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Whether the blob is a view into the original payload.
    #[must_use]
    pub fn is_borrowed(&self) -> bool {
        matches!(self.bytes, Cow::Borrowed(_))
    }

    /// Detach from the payload, copying only if still borrowed.
    #[must_use]
    pub fn into_owned(self) -> ModelBlob<'static> {
        ModelBlob {
            bytes: Cow::Owned(self.bytes.into_owned()),
            offset: self.offset,
        }
    }
}

impl AsRef<[u8]> for ModelBlob<'_> {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}
