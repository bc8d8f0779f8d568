//! # Slot Parser
//!
//! Serializes credential data into fixed-size claim slots.
//!
//! The schema names which data fields go into which slot:
//!
//! ```json
//! {
//!   "$metadata": {
//!     "serialization": {
//!       "indexDataSlotA": "birthday",
//!       "valueDataSlotA": "documentType"
//!     }
//!   }
//! }
//! ```
//!
//! Fields are read from `credentialSubject` when the data has one, else
//! from the data root. Each slot is [`SLOT_LEN`] bytes:
//!
//! - unsigned integers: little-endian,
//! - booleans: `0` or `1`,
//! - strings: UTF-8, at most 31 bytes so the slot stays below the field
//!   modulus, zero padded.
//!
//! Slots the schema does not name stay zero. The index buffer is
//! `indexDataSlotA ‖ indexDataSlotB` and the value buffer is
//! `valueDataSlotA ‖ valueDataSlotB`.

use schemaproc_core::{BoxError, ParsedSlots, Parser};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Size of one data slot in bytes.
pub const SLOT_LEN: usize = 32;

/// Longest string that fits a slot.
const MAX_STRING_LEN: usize = SLOT_LEN - 1;

/// Error while parsing data into slots.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// Data (or its `credentialSubject`) is not a JSON object.
    #[error("data must be a JSON object")]
    DataNotObject,

    /// The schema names a field the data does not contain.
    #[error("field '{field}' for {slot} is missing from data")]
    MissingField { slot: &'static str, field: String },

    /// The field holds a value that has no slot encoding.
    #[error("field '{field}' has unsupported value: {reason}")]
    UnsupportedValue { field: String, reason: String },

    /// String is too long to fit into a slot.
    #[error("field '{field}' is {len} bytes, slot holds at most 31")]
    ValueTooLarge { field: String, len: usize },
}

/// Field names per slot, from `$metadata.serialization`.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
struct SlotLayout {
    #[serde(default)]
    index_data_slot_a: Option<String>,
    #[serde(default)]
    index_data_slot_b: Option<String>,
    #[serde(default)]
    value_data_slot_a: Option<String>,
    #[serde(default)]
    value_data_slot_b: Option<String>,
}

impl SlotLayout {
    fn from_schema(schema: &Value) -> Result<Self, ParseError> {
        match schema.pointer("/$metadata/serialization") {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(raw) => serde_json::from_value(raw.clone())
                .map_err(|e| ParseError::InvalidSchema(format!("bad $metadata.serialization: {e}"))),
        }
    }
}

/// [`Parser`] that fills claim slots from `$metadata.serialization`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SlotParser;

impl SlotParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse `data` into index and value slots according to `schema`.
    pub fn parse(&self, data: &[u8], schema: &[u8]) -> Result<ParsedSlots, ParseError> {
        let schema: Value = serde_json::from_slice(schema)
            .map_err(|e| ParseError::InvalidSchema(format!("invalid JSON: {e}")))?;
        let data: Value = serde_json::from_slice(data)
            .map_err(|e| ParseError::InvalidData(format!("invalid JSON: {e}")))?;

        let layout = SlotLayout::from_schema(&schema)?;
        let fields = subject_fields(&data)?;

        let mut index = Vec::with_capacity(2 * SLOT_LEN);
        index.extend(fill_slot(fields, "indexDataSlotA", &layout.index_data_slot_a)?);
        index.extend(fill_slot(fields, "indexDataSlotB", &layout.index_data_slot_b)?);

        let mut value = Vec::with_capacity(2 * SLOT_LEN);
        value.extend(fill_slot(fields, "valueDataSlotA", &layout.value_data_slot_a)?);
        value.extend(fill_slot(fields, "valueDataSlotB", &layout.value_data_slot_b)?);

        tracing::debug!(?layout, "parsed claim slots");
        Ok(ParsedSlots { index, value })
    }
}

impl Parser for SlotParser {
    fn parse_slots(&self, data: &[u8], schema: &[u8]) -> Result<ParsedSlots, BoxError> {
        Ok(self.parse(data, schema)?)
    }
}

fn subject_fields(data: &Value) -> Result<&Map<String, Value>, ParseError> {
    let root = data.as_object().ok_or(ParseError::DataNotObject)?;
    match root.get("credentialSubject") {
        Some(subject) => subject.as_object().ok_or(ParseError::DataNotObject),
        None => Ok(root),
    }
}

fn fill_slot(
    fields: &Map<String, Value>,
    slot: &'static str,
    field: &Option<String>,
) -> Result<[u8; SLOT_LEN], ParseError> {
    let Some(field) = field.as_deref().filter(|f| !f.is_empty()) else {
        return Ok([0u8; SLOT_LEN]);
    };
    let value = fields.get(field).ok_or_else(|| ParseError::MissingField {
        slot,
        field: field.to_string(),
    })?;
    encode_value(field, value)
}

fn encode_value(field: &str, value: &Value) -> Result<[u8; SLOT_LEN], ParseError> {
    let unsupported = |reason: &str| ParseError::UnsupportedValue {
        field: field.to_string(),
        reason: reason.to_string(),
    };

    let mut slot = [0u8; SLOT_LEN];
    match value {
        Value::Bool(b) => slot[0] = u8::from(*b),
        Value::Number(n) => {
            let n = n.as_u64().ok_or_else(|| {
                unsupported("only non-negative integers fit a slot")
            })?;
            slot[..8].copy_from_slice(&n.to_le_bytes());
        }
        Value::String(s) => {
            let bytes = s.as_bytes();
            if bytes.len() > MAX_STRING_LEN {
                return Err(ParseError::ValueTooLarge {
                    field: field.to_string(),
                    len: bytes.len(),
                });
            }
            slot[..bytes.len()].copy_from_slice(bytes);
        }
        Value::Null => return Err(unsupported("null")),
        Value::Array(_) => return Err(unsupported("array")),
        Value::Object(_) => return Err(unsupported("object")),
    }
    Ok(slot)
}
