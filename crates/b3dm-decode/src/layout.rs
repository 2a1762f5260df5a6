//! Sub-buffer offset computation.

use std::ops::Range;

use crate::Header;
use crate::error::{DecodeResult, FormatError, Section};

/// Byte ranges of the five sections that follow the header.
///
/// The ranges are contiguous and in file order: each one starts where the
/// previous one ends, the first starts at the header length and the last
/// ends at `total_byte_length`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubBufferLayout {
    pub feature_table_json: Range<usize>,
    pub feature_table_binary: Range<usize>,
    pub batch_table_json: Range<usize>,
    pub batch_table_binary: Range<usize>,
    pub model_blob: Range<usize>,
}

impl SubBufferLayout {
    /// Accumulate section offsets for `header` and check them against a
    /// buffer of `buffer_len` bytes.
    pub fn compute(header: &Header, buffer_len: usize) -> DecodeResult<Self> {
        let mut cursor = Cursor {
            position: header.header_length(),
            buffer_len,
        };

        let feature_table_json =
            cursor.advance(header.feature_table_json_length, Section::FeatureTableJson)?;
        let feature_table_binary = cursor.advance(
            header.feature_table_binary_length,
            Section::FeatureTableBinary,
        )?;
        let batch_table_json =
            cursor.advance(header.batch_table_json_length, Section::BatchTableJson)?;
        let batch_table_binary =
            cursor.advance(header.batch_table_binary_length, Section::BatchTableBinary)?;
        let model_blob = cursor.until(header.total_byte_length, Section::ModelBlob)?;

        Ok(Self {
            feature_table_json,
            feature_table_binary,
            batch_table_json,
            batch_table_binary,
            model_blob,
        })
    }

    /// The sections in file order.
    #[must_use]
    pub fn ranges(&self) -> [&Range<usize>; 5] {
        [
            &self.feature_table_json,
            &self.feature_table_binary,
            &self.batch_table_json,
            &self.batch_table_binary,
            &self.model_blob,
        ]
    }
}

struct Cursor {
    position: usize,
    buffer_len: usize,
}

impl Cursor {
    /// Claim the next `length` bytes.
    fn advance(&mut self, length: u32, section: Section) -> DecodeResult<Range<usize>> {
        let end = usize::try_from(length)
            .ok()
            .and_then(|length| self.position.checked_add(length))
            .unwrap_or(usize::MAX);
        self.until_end(end, section)
    }

    /// Claim everything up to the declared total length.
    fn until(&mut self, total_byte_length: u32, section: Section) -> DecodeResult<Range<usize>> {
        let end = usize::try_from(total_byte_length).unwrap_or(usize::MAX);
        if end < self.position {
            return Err(FormatError::TruncatedBuffer {
                section,
                needed: self.position,
                available: end,
            });
        }
        self.until_end(end, section)
    }

    fn until_end(&mut self, end: usize, section: Section) -> DecodeResult<Range<usize>> {
        if end > self.buffer_len {
            return Err(FormatError::TruncatedBuffer {
                section,
                needed: end,
                available: self.buffer_len,
            });
        }
        let range = self.position..end;
        self.position = end;
        Ok(range)
    }
}
