//! Fixed header parsing and legacy layout detection.

use crate::error::{DecodeResult, FormatError, Section};

/// The four-byte tag every payload starts with.
pub const MAGIC: [u8; 4] = *b"b3dm";

/// The only container version in existence.
pub const VERSION: u32 = 1;

/// Size of the current header; also the minimum payload length accepted.
pub const HEADER_LENGTH: usize = 28;

/// Smallest `u32` whose high byte is `"` (0x22).
///
/// Under the older layouts the slot read as a table length actually holds the
/// start of the batch table JSON or the glTF magic, so its little-endian value
/// is at least this large. No real table comes close.
pub const LEGACY_THRESHOLD: u32 = 0x2200_0000;

const OFFSET_VERSION: usize = 4;
const OFFSET_TOTAL_BYTE_LENGTH: usize = 8;
const OFFSET_FIELD_A: usize = 12;
const OFFSET_FIELD_B: usize = 16;
const OFFSET_FIELD_C: usize = 20;
const OFFSET_FIELD_D: usize = 24;

/// Header field arrangement, decided once per payload.
///
/// - `Legacy1`: `[batchLength] [batchTableByteLength]`
/// - `Legacy2`: `[batchTableJsonByteLength] [batchTableBinaryByteLength] [batchLength]`
/// - `Current`: `[featureTableJsonByteLength] [featureTableBinaryByteLength]
///   [batchTableJsonByteLength] [batchTableBinaryByteLength]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLayout {
    Current,
    Legacy1,
    Legacy2,
}

impl HeaderLayout {
    /// Classify a header from the raw values at offsets 20 and 24.
    #[must_use]
    pub fn detect(field_c: u32, field_d: u32) -> Self {
        if field_c >= LEGACY_THRESHOLD {
            Self::Legacy1
        } else if field_d >= LEGACY_THRESHOLD {
            Self::Legacy2
        } else {
            Self::Current
        }
    }

    /// Number of bytes the header occupies under this layout.
    #[must_use]
    pub const fn header_length(self) -> usize {
        match self {
            Self::Current => 28,
            Self::Legacy1 => 20,
            Self::Legacy2 => 24,
        }
    }
}

/// Decoded header fields.
///
/// Length fields carry their meaning under the detected layout, so a legacy
/// payload reports zero-length feature tables here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub magic: [u8; 4],
    pub version: u32,
    pub total_byte_length: u32,
    pub layout: HeaderLayout,
    pub feature_table_json_length: u32,
    pub feature_table_binary_length: u32,
    pub batch_table_json_length: u32,
    pub batch_table_binary_length: u32,
    /// Batch count stored in the header by legacy layouts; zero otherwise.
    pub legacy_batch_length: u32,
}

impl Header {
    /// Parse and validate the header at the start of `buffer`.
    pub fn parse(buffer: &[u8]) -> DecodeResult<Self> {
        let magic = read_magic(buffer)?;
        if magic != MAGIC {
            return Err(FormatError::BadMagic { found: magic });
        }

        if buffer.len() < HEADER_LENGTH {
            return Err(FormatError::TruncatedBuffer {
                section: Section::Header,
                needed: HEADER_LENGTH,
                available: buffer.len(),
            });
        }

        let version = read_u32(buffer, OFFSET_VERSION);
        if version != VERSION {
            return Err(FormatError::UnsupportedVersion { version });
        }

        let total_byte_length = read_u32(buffer, OFFSET_TOTAL_BYTE_LENGTH);
        let field_a = read_u32(buffer, OFFSET_FIELD_A);
        let field_b = read_u32(buffer, OFFSET_FIELD_B);
        let field_c = read_u32(buffer, OFFSET_FIELD_C);
        let field_d = read_u32(buffer, OFFSET_FIELD_D);

        let layout = HeaderLayout::detect(field_c, field_d);
        let header = match layout {
            HeaderLayout::Current => Self {
                magic,
                version,
                total_byte_length,
                layout,
                feature_table_json_length: field_a,
                feature_table_binary_length: field_b,
                batch_table_json_length: field_c,
                batch_table_binary_length: field_d,
                legacy_batch_length: 0,
            },
            HeaderLayout::Legacy1 => Self {
                magic,
                version,
                total_byte_length,
                layout,
                feature_table_json_length: 0,
                feature_table_binary_length: 0,
                batch_table_json_length: field_b,
                batch_table_binary_length: 0,
                legacy_batch_length: field_a,
            },
            HeaderLayout::Legacy2 => Self {
                magic,
                version,
                total_byte_length,
                layout,
                feature_table_json_length: 0,
                feature_table_binary_length: 0,
                batch_table_json_length: field_a,
                batch_table_binary_length: field_b,
                legacy_batch_length: field_c,
            },
        };
        Ok(header)
    }

    /// Number of bytes occupied by the header.
    #[must_use]
    pub const fn header_length(&self) -> usize {
        self.layout.header_length()
    }
}

fn read_magic(buffer: &[u8]) -> DecodeResult<[u8; 4]> {
    let bytes = buffer.get(..4).ok_or(FormatError::TruncatedBuffer {
        section: Section::Magic,
        needed: 4,
        available: buffer.len(),
    })?;
    let mut magic = [0u8; 4];
    magic.copy_from_slice(bytes);
    Ok(magic)
}

/// Read a little-endian `u32`. Callers have already checked the length.
fn read_u32(buffer: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buffer[offset],
        buffer[offset + 1],
        buffer[offset + 2],
        buffer[offset + 3],
    ])
}
