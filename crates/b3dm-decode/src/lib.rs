//! Decode Batched 3D Model (b3dm) tile payloads.
//!
//! A b3dm payload is a fixed header followed by a feature table, a batch
//! table (each a JSON document plus a binary body) and an embedded glTF
//! binary. This crate splits a payload into those parts. It does no I/O and
//! keeps no state, so it can be called from any threading context - the
//! library user controls parallelism.
//!
//! # Header revisions
//!
//! Older tilesets use two earlier header arrangements that carry no version
//! marker of their own. They are recognised by a length field whose value
//! is too large to be real (see [`LEGACY_THRESHOLD`] and [`HeaderLayout`]).
//!
//! # Key functions
//!
//! - [`decode`]: Split a payload into a [`DecodedTile`]
//! - [`Header::parse`]: Validate and read the fixed header
//! - [`SubBufferLayout::compute`]: Compute section byte ranges

mod error;

pub mod blob;
pub mod header;
pub mod layout;
pub mod table;

pub use blob::{MODEL_ALIGNMENT, ModelBlob};
pub use error::{DecodeResult, FormatError, Section, TableKind};
pub use header::{HEADER_LENGTH, Header, HeaderLayout, LEGACY_THRESHOLD, MAGIC, VERSION};
pub use layout::SubBufferLayout;
pub use table::{BATCH_LENGTH, Table};

/// A payload split into its parts.
///
/// Tables and an aligned model blob borrow from the payload; call
/// [`DecodedTile::into_owned`] to detach them.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTile<'a> {
    pub header: Header,
    pub layout: SubBufferLayout,
    pub feature_table: Table<'a>,
    pub batch_table: Table<'a>,
    pub model_blob: ModelBlob<'a>,
}

impl DecodedTile<'_> {
    /// Length of the embedded glTF binary in bytes.
    #[must_use]
    pub fn model_blob_length(&self) -> usize {
        self.model_blob.len()
    }

    /// Copy any borrowed parts so the tile outlives the payload.
    #[must_use]
    pub fn into_owned(self) -> DecodedTile<'static> {
        DecodedTile {
            header: self.header,
            layout: self.layout,
            feature_table: self.feature_table.into_owned(),
            batch_table: self.batch_table.into_owned(),
            model_blob: self.model_blob.into_owned(),
        }
    }
}

/// Decode a complete b3dm payload.
///
/// Fails without partial output if the header is invalid, a section runs
/// past the end of `buffer`, or a non-empty JSON section does not parse.
///
/// When the feature table JSON is empty it is replaced with
/// `{"BATCH_LENGTH": n}`, where `n` is the batch length stored in a legacy
/// header (zero for current headers).
pub fn decode(buffer: &[u8]) -> DecodeResult<DecodedTile<'_>> {
    let header = Header::parse(buffer)?;
    let layout = SubBufferLayout::compute(&header, buffer.len())?;

    let mut feature_table = Table::decode(
        TableKind::Feature,
        &buffer[layout.feature_table_json.clone()],
        &buffer[layout.feature_table_binary.clone()],
    )?;
    let batch_table = Table::decode(
        TableKind::Batch,
        &buffer[layout.batch_table_json.clone()],
        &buffer[layout.batch_table_binary.clone()],
    )?;
    table::fill_batch_length(&mut feature_table.json, header.legacy_batch_length);

    let model_blob = ModelBlob::extract(buffer, layout.model_blob.clone());

    Ok(DecodedTile {
        header,
        layout,
        feature_table,
        batch_table,
        model_blob,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Payload {
        fields: [u32; 4],
        sections: Vec<u8>,
    }

    fn current(feature_json: &[u8], batch_json: &[u8], model: &[u8]) -> Vec<u8> {
        build(Payload {
            fields: [
                u32::try_from(feature_json.len()).unwrap(),
                0,
                u32::try_from(batch_json.len()).unwrap(),
                0,
            ],
            sections: [feature_json, batch_json, model].concat(),
        })
    }

    fn build(payload: Payload) -> Vec<u8> {
        let total = u32::try_from(HEADER_LENGTH + payload.sections.len()).unwrap();
        let mut out = Vec::new();
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&VERSION.to_le_bytes());
        out.extend_from_slice(&total.to_le_bytes());
        for field in payload.fields {
            out.extend_from_slice(&field.to_le_bytes());
        }
        out.extend_from_slice(&payload.sections);
        out
    }

    #[test]
    fn test_decode_current_layout() {
        let model = b"glTF\x02\x00\x00\x00model-body";
        let buffer = current(br#"{"BATCH_LENGTH":5}"#, b"{}", model);
        let tile = decode(&buffer).unwrap();

        assert_eq!(tile.header.layout, HeaderLayout::Current);
        assert_eq!(tile.feature_table.json, json!({ "BATCH_LENGTH": 5 }));
        assert_eq!(tile.batch_table.json, json!({}));
        assert!(tile.feature_table.binary.is_empty());
        assert_eq!(tile.model_blob.as_bytes(), model);
        assert_eq!(tile.model_blob_length(), model.len());
        assert_eq!(tile.layout.model_blob.end, buffer.len());
    }

    #[test]
    fn test_empty_feature_table_gets_zero_batch_length() {
        let buffer = current(b"", b"", b"glTF");
        let tile = decode(&buffer).unwrap();
        assert_eq!(tile.feature_table.json, json!({ "BATCH_LENGTH": 0 }));
        assert_eq!(tile.feature_table.batch_length(), Some(0));
    }

    #[test]
    fn test_binary_bodies_are_verbatim() {
        let parts: [&[u8]; 5] = [
            b"{}",
            &[1, 2, 3, 4],
            br#"{"id":{"byteOffset":0}}"#,
            &[9, 8],
            b"glTF",
        ];
        let buffer = build(Payload {
            fields: [2, 4, 23, 2],
            sections: parts.concat(),
        });
        let tile = decode(&buffer).unwrap();
        assert_eq!(tile.feature_table.binary.as_ref(), &[1, 2, 3, 4]);
        assert_eq!(tile.batch_table.binary.as_ref(), &[9, 8]);
        assert_eq!(
            tile.batch_table.json,
            json!({ "id": { "byteOffset": 0 } })
        );
        assert_eq!(tile.model_blob.as_bytes(), b"glTF");
    }

    #[test]
    fn test_decode_legacy1() {
        // [magic][version][total][batchLength][batchTableByteLength] then JSON.
        let batch_json = br#""ids""#;
        let model = b"glTF-body";
        let total = 20 + batch_json.len() + model.len();
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&MAGIC);
        buffer.extend_from_slice(&VERSION.to_le_bytes());
        buffer.extend_from_slice(&u32::try_from(total).unwrap().to_le_bytes());
        buffer.extend_from_slice(&4u32.to_le_bytes());
        buffer.extend_from_slice(&u32::try_from(batch_json.len()).unwrap().to_le_bytes());
        buffer.extend_from_slice(batch_json);
        buffer.extend_from_slice(model);

        let tile = decode(&buffer).unwrap();
        assert_eq!(tile.header.layout, HeaderLayout::Legacy1);
        assert_eq!(tile.header.legacy_batch_length, 4);
        assert_eq!(tile.feature_table.json, json!({ "BATCH_LENGTH": 4 }));
        assert_eq!(tile.batch_table.json, json!("ids"));
        assert_eq!(tile.model_blob.as_bytes(), model);
    }

    #[test]
    fn test_decode_legacy2() {
        // [magic][version][total][batchTableJson][batchTableBinary][batchLength] then JSON.
        let batch_json = br#"{"a":[1,2]}"#;
        let batch_binary = [7u8, 7];
        let model = b"glTF-body";
        let total = 24 + batch_json.len() + batch_binary.len() + model.len();
        let mut buffer = Vec::new();
        buffer.extend_from_slice(&MAGIC);
        buffer.extend_from_slice(&VERSION.to_le_bytes());
        buffer.extend_from_slice(&u32::try_from(total).unwrap().to_le_bytes());
        buffer.extend_from_slice(&u32::try_from(batch_json.len()).unwrap().to_le_bytes());
        buffer.extend_from_slice(&2u32.to_le_bytes());
        buffer.extend_from_slice(&2u32.to_le_bytes());
        buffer.extend_from_slice(batch_json);
        buffer.extend_from_slice(&batch_binary);
        buffer.extend_from_slice(model);

        let tile = decode(&buffer).unwrap();
        assert_eq!(tile.header.layout, HeaderLayout::Legacy2);
        assert_eq!(tile.header.legacy_batch_length, 2);
        assert_eq!(tile.feature_table.json, json!({ "BATCH_LENGTH": 2 }));
        assert_eq!(tile.batch_table.json, json!({ "a": [1, 2] }));
        assert_eq!(tile.batch_table.binary.as_ref(), &batch_binary);
        assert_eq!(tile.model_blob.as_bytes(), model);
    }

    #[test]
    fn test_model_blob_alignment() {
        // Feature JSON of 4 bytes puts the blob at 32, 5 bytes at 33.
        let aligned = current(b"{}  ", b"", b"glTF0123");
        let tile = decode(&aligned).unwrap();
        assert_eq!(tile.model_blob.offset(), 32);
        assert!(tile.model_blob.is_borrowed());

        let unaligned = current(b"{}   ", b"", b"glTF0123");
        let tile = decode(&unaligned).unwrap();
        assert_eq!(tile.model_blob.offset(), 33);
        assert!(!tile.model_blob.is_borrowed());
        assert_eq!(tile.model_blob.as_bytes(), b"glTF0123");
    }

    #[test]
    fn test_invalid_batch_json() {
        let buffer = current(b"", b"{not json", b"glTF");
        let err = decode(&buffer).unwrap_err();
        assert!(matches!(
            err,
            FormatError::InvalidJson {
                table: TableKind::Batch,
                ..
            }
        ));
    }

    #[test]
    fn test_bad_magic_ignores_rest_of_header() {
        let mut buffer = current(b"", b"", b"glTF");
        buffer[..4].copy_from_slice(b"glTF");
        let err = decode(&buffer).unwrap_err();
        assert!(matches!(err, FormatError::BadMagic { .. }));
    }

    #[test]
    fn test_declared_length_past_buffer() {
        let mut buffer = current(b"", b"", b"glTF");
        buffer.truncate(buffer.len() - 1);
        let err = decode(&buffer).unwrap_err();
        assert!(matches!(
            err,
            FormatError::TruncatedBuffer {
                section: Section::ModelBlob,
                ..
            }
        ));
    }

    #[test]
    fn test_into_owned_detaches_from_payload() {
        let buffer = current(br#"{"BATCH_LENGTH":1}"#, b"", b"glTF1234");
        let tile = decode(&buffer).unwrap().into_owned();
        drop(buffer);
        assert_eq!(tile.feature_table.batch_length(), Some(1));
        assert_eq!(tile.model_blob.as_bytes(), b"glTF1234");
    }
}
