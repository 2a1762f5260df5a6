//! Feature and batch table decoding.

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::error::{DecodeResult, FormatError, TableKind};

/// Key under which the feature table carries the number of batched models.
pub const BATCH_LENGTH: &str = "BATCH_LENGTH";

/// A metadata table: a JSON document plus its binary body.
///
/// The binary body is kept verbatim; its layout is described by the JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<'a> {
    pub json: Value,
    pub binary: Cow<'a, [u8]>,
}

impl<'a> Table<'a> {
    pub(crate) fn decode(kind: TableKind, json: &[u8], binary: &'a [u8]) -> DecodeResult<Self> {
        Ok(Self {
            json: parse_json(kind, json)?,
            binary: Cow::Borrowed(binary),
        })
    }

    /// The `BATCH_LENGTH` entry, if present and a non-negative integer.
    #[must_use]
    pub fn batch_length(&self) -> Option<u64> {
        self.json.get(BATCH_LENGTH).and_then(Value::as_u64)
    }

    /// Copy the binary body so the table no longer borrows the payload.
    #[must_use]
    pub fn into_owned(self) -> Table<'static> {
        Table {
            json: self.json,
            binary: Cow::Owned(self.binary.into_owned()),
        }
    }
}

/// Parse a JSON section. An empty section is an empty object.
fn parse_json(kind: TableKind, bytes: &[u8]) -> DecodeResult<Value> {
    if bytes.is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(bytes).map_err(|source| FormatError::InvalidJson {
        table: kind,
        source,
    })
}

/// Replace an empty feature table JSON with `{"BATCH_LENGTH": batch_length}`.
pub(crate) fn fill_batch_length(json: &mut Value, batch_length: u32) {
    if json.as_object().is_some_and(Map::is_empty) {
        let mut map = Map::new();
        map.insert(BATCH_LENGTH.to_owned(), Value::from(batch_length));
        *json = Value::Object(map);
    }
}
