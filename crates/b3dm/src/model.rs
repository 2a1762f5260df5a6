//! Summary of an extracted glTF binary.
//!
//! Only the container header and the JSON chunk are read. Mesh data is
//! left to downstream tools.

use serde::Deserialize;
use thiserror::Error;

const GLB_MAGIC: [u8; 4] = *b"glTF";
const CHUNK_JSON: u32 = 0x4E4F_534A;

/// Extension name for Draco-compressed meshes.
pub const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("not a glTF binary")]
    BadMagic,
    #[error("unsupported glTF binary version {0}")]
    UnsupportedVersion(u32),
    #[error("glTF binary truncated")]
    Truncated,
    #[error("first chunk is not JSON")]
    MissingJson,
    #[error("invalid glTF JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// What the downstream pipeline needs to know about a model blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSummary {
    /// glTF binary container version (1 or 2).
    pub version: u32,
    /// Length declared in the glTF binary header.
    pub length: u32,
    pub extensions_used: Vec<String>,
    pub extensions_required: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GltfExtensions {
    #[serde(default)]
    extensions_used: Vec<String>,
    #[serde(default)]
    extensions_required: Vec<String>,
}

impl ModelSummary {
    pub fn inspect(blob: &[u8]) -> Result<Self, SummaryError> {
        if blob.get(..4) != Some(&GLB_MAGIC[..]) {
            return Err(SummaryError::BadMagic);
        }
        let version = read_u32(blob, 4)?;
        let length = read_u32(blob, 8)?;

        // v1: [contentLength][contentFormat] then content.
        // v2: chunks of [chunkLength][chunkType][data].
        let json_format = match version {
            1 => 0,
            2 => CHUNK_JSON,
            other => return Err(SummaryError::UnsupportedVersion(other)),
        };
        let json_length = read_u32(blob, 12)?;
        if read_u32(blob, 16)? != json_format {
            return Err(SummaryError::MissingJson);
        }

        let end = usize::try_from(json_length)
            .ok()
            .and_then(|len| len.checked_add(20))
            .ok_or(SummaryError::Truncated)?;
        let json = blob.get(20..end).ok_or(SummaryError::Truncated)?;
        let extensions: GltfExtensions = serde_json::from_slice(json)?;

        Ok(Self {
            version,
            length,
            extensions_used: extensions.extensions_used,
            extensions_required: extensions.extensions_required,
        })
    }

    /// Whether meshes must be Draco-decoded before use.
    #[must_use]
    pub fn requires_draco(&self) -> bool {
        self.extensions_required.iter().any(|e| e == DRACO_EXTENSION)
    }
}

fn read_u32(blob: &[u8], offset: usize) -> Result<u32, SummaryError> {
    let bytes = blob
        .get(offset..offset + 4)
        .ok_or(SummaryError::Truncated)?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}
