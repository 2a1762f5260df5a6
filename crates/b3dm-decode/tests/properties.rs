//! Property tests for the b3dm container decoder.

use b3dm_decode::{
    FormatError, HEADER_LENGTH, HeaderLayout, LEGACY_THRESHOLD, MAGIC, VERSION, decode,
};
use proptest::prelude::*;
use serde_json::json;

/// Build a current-layout payload from its sections.
fn payload(
    feature_json: &[u8],
    feature_bin: &[u8],
    batch_json: &[u8],
    batch_bin: &[u8],
    model: &[u8],
) -> Vec<u8> {
    let len = |bytes: &[u8]| u32::try_from(bytes.len()).unwrap();
    let total = HEADER_LENGTH
        + feature_json.len()
        + feature_bin.len()
        + batch_json.len()
        + batch_bin.len()
        + model.len();

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&u32::try_from(total).unwrap().to_le_bytes());
    for field in [len(feature_json), len(feature_bin), len(batch_json), len(batch_bin)] {
        out.extend_from_slice(&field.to_le_bytes());
    }
    for section in [feature_json, feature_bin, batch_json, batch_bin, model] {
        out.extend_from_slice(section);
    }
    out
}

/// A header whose field at offset 20 is `field_c`, followed by enough zeros
/// to satisfy either layout.
fn header_with_field_c(field_c: u32) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&64u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&field_c.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.resize(64, 0);
    out
}

#[test]
fn threshold_boundary() {
    // Below the threshold the value is a genuine length that overruns the buffer.
    let below = header_with_field_c(LEGACY_THRESHOLD - 1);
    assert!(matches!(
        decode(&below),
        Err(FormatError::TruncatedBuffer { .. })
    ));
    let header = b3dm_decode::Header::parse(&below).unwrap();
    assert_eq!(header.layout, HeaderLayout::Current);

    let at = header_with_field_c(LEGACY_THRESHOLD);
    let tile = decode(&at).unwrap();
    assert_eq!(tile.header.layout, HeaderLayout::Legacy1);
    assert_eq!(tile.header.header_length(), 20);
}

#[test]
fn round_trip_known_tables() {
    let model: Vec<u8> = (0..=255).collect();
    let buffer = payload(br#"{"BATCH_LENGTH": 5}"#, &[], b"{}", &[], &model);
    let tile = decode(&buffer).unwrap();
    assert_eq!(tile.feature_table.json, json!({ "BATCH_LENGTH": 5 }));
    assert_eq!(tile.batch_table.json, json!({}));
    assert_eq!(tile.model_blob.as_bytes(), model.as_slice());
}

proptest! {
    #[test]
    fn short_buffers_never_decode(bytes in proptest::collection::vec(any::<u8>(), 0..HEADER_LENGTH)) {
        let rejected = matches!(
            decode(&bytes),
            Err(FormatError::TruncatedBuffer { .. } | FormatError::BadMagic { .. })
        );
        prop_assert!(rejected);
    }

    #[test]
    fn short_buffers_with_magic_are_truncated(rest in proptest::collection::vec(any::<u8>(), 0..HEADER_LENGTH - 4)) {
        let mut bytes = MAGIC.to_vec();
        bytes.extend_from_slice(&rest);
        let truncated = matches!(decode(&bytes), Err(FormatError::TruncatedBuffer { .. }));
        prop_assert!(truncated);
    }

    #[test]
    fn sections_partition_payload(
        feature_pad in 0usize..16,
        feature_bin in proptest::collection::vec(any::<u8>(), 0..32),
        batch_pad in 0usize..16,
        batch_bin in proptest::collection::vec(any::<u8>(), 0..32),
        model in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let feature_json = format!("{{\"BATCH_LENGTH\":1}}{}", " ".repeat(feature_pad));
        let batch_json = format!("{{}}{}", " ".repeat(batch_pad));
        let buffer = payload(
            feature_json.as_bytes(),
            &feature_bin,
            batch_json.as_bytes(),
            &batch_bin,
            &model,
        );
        let tile = decode(&buffer).unwrap();

        prop_assert_eq!(tile.header.header_length(), HEADER_LENGTH);
        let mut cursor = HEADER_LENGTH;
        for range in tile.layout.ranges() {
            prop_assert_eq!(range.start, cursor);
            prop_assert!(range.end >= range.start);
            cursor = range.end;
        }
        prop_assert_eq!(cursor, tile.header.total_byte_length as usize);
        prop_assert_eq!(tile.feature_table.binary.as_ref(), feature_bin.as_slice());
        prop_assert_eq!(tile.batch_table.binary.as_ref(), batch_bin.as_slice());
        prop_assert_eq!(tile.model_blob.as_bytes(), model.as_slice());
        prop_assert_eq!(tile.model_blob.is_borrowed(), tile.model_blob.offset() % 8 == 0);
    }

    #[test]
    fn wrong_magic_is_rejected(magic in any::<[u8; 4]>(), rest in proptest::collection::vec(any::<u8>(), 24..64)) {
        prop_assume!(magic != MAGIC);
        let mut bytes = magic.to_vec();
        bytes.extend_from_slice(&rest);
        let rejected = matches!(decode(&bytes), Err(FormatError::BadMagic { found }) if found == magic);
        prop_assert!(rejected);
    }
}
