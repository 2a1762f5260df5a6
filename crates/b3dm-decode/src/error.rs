//! Error types for container decoding.

use std::fmt;

use thiserror::Error;

/// A region of the payload, used to say where a bounds check failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Magic,
    Header,
    FeatureTableJson,
    FeatureTableBinary,
    BatchTableJson,
    BatchTableBinary,
    ModelBlob,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Magic => "magic",
            Self::Header => "header",
            Self::FeatureTableJson => "feature table JSON",
            Self::FeatureTableBinary => "feature table binary",
            Self::BatchTableJson => "batch table JSON",
            Self::BatchTableBinary => "batch table binary",
            Self::ModelBlob => "model blob",
        };
        f.write_str(name)
    }
}

/// Which of the two metadata tables a JSON error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Feature,
    Batch,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Feature => f.write_str("feature table"),
            Self::Batch => f.write_str("batch table"),
        }
    }
}

/// Errors that can occur while decoding a tile payload.
///
/// All of these describe the integrity of a single payload. Decoding the
/// same bytes again always yields the same error.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("invalid magic: expected \"b3dm\", found {found:?}")]
    BadMagic { found: [u8; 4] },

    #[error("unsupported version {version}, only 1 is valid")]
    UnsupportedVersion { version: u32 },

    #[error("buffer truncated in {section}: need {needed} bytes, have {available}")]
    TruncatedBuffer {
        section: Section,
        needed: usize,
        available: usize,
    },

    #[error("{table} JSON is invalid: {source}")]
    InvalidJson {
        table: TableKind,
        source: serde_json::Error,
    },
}

/// Result type for decode operations.
pub type DecodeResult<T> = Result<T, FormatError>;
