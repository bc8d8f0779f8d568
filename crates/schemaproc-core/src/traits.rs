//! # Collaborator Traits
//!
//! The three capabilities the [`Processor`](crate::Processor) delegates to.
//! Schema content, document format, and slot encoding are opaque at this
//! layer; they belong to whichever implementation is plugged in.
//!
//! All traits require `Send + Sync` so a configured processor can be shared
//! across threads. Implementations are expected to be stateless or
//! internally synchronized.

use std::sync::Arc;

/// Error type returned by collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Raw schema bytes and the format tag reported by the loader.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedSchema {
    /// Schema content as loaded.
    pub bytes: Vec<u8>,
    /// Format tag, usually the file extension without the dot (`"json"`).
    pub extension: String,
}

impl LoadedSchema {
    pub fn new(bytes: impl Into<Vec<u8>>, extension: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            extension: extension.into(),
        }
    }
}

/// Index and value slot buffers produced by a parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSlots {
    pub index: Vec<u8>,
    pub value: Vec<u8>,
}

impl ParsedSlots {
    pub fn new(index: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            index: index.into(),
            value: value.into(),
        }
    }
}

/// Resolves a schema identifier (usually a URL) to schema bytes.
pub trait SchemaLoader: Send + Sync {
    /// Load the schema identified by `url`.
    fn load(&self, url: &str) -> Result<LoadedSchema, BoxError>;
}

/// Checks data and documents against a schema.
pub trait Validator: Send + Sync {
    /// Validate claim data against `schema`.
    fn validate_data(&self, data: &[u8], schema: &[u8]) -> Result<(), BoxError>;

    /// Validate a whole document against `schema`.
    fn validate_document(&self, doc: &[u8], schema: &[u8]) -> Result<(), BoxError>;
}

/// Serializes data into index and value slots according to a schema.
pub trait Parser: Send + Sync {
    fn parse_slots(&self, data: &[u8], schema: &[u8]) -> Result<ParsedSlots, BoxError>;
}

impl<T: SchemaLoader + ?Sized> SchemaLoader for Arc<T> {
    fn load(&self, url: &str) -> Result<LoadedSchema, BoxError> {
        (**self).load(url)
    }
}

impl<T: SchemaLoader + ?Sized> SchemaLoader for &T {
    fn load(&self, url: &str) -> Result<LoadedSchema, BoxError> {
        (**self).load(url)
    }
}

impl<T: Validator + ?Sized> Validator for Arc<T> {
    fn validate_data(&self, data: &[u8], schema: &[u8]) -> Result<(), BoxError> {
        (**self).validate_data(data, schema)
    }

    fn validate_document(&self, doc: &[u8], schema: &[u8]) -> Result<(), BoxError> {
        (**self).validate_document(doc, schema)
    }
}

impl<T: Validator + ?Sized> Validator for &T {
    fn validate_data(&self, data: &[u8], schema: &[u8]) -> Result<(), BoxError> {
        (**self).validate_data(data, schema)
    }

    fn validate_document(&self, doc: &[u8], schema: &[u8]) -> Result<(), BoxError> {
        (**self).validate_document(doc, schema)
    }
}

impl<T: Parser + ?Sized> Parser for Arc<T> {
    fn parse_slots(&self, data: &[u8], schema: &[u8]) -> Result<ParsedSlots, BoxError> {
        (**self).parse_slots(data, schema)
    }
}

impl<T: Parser + ?Sized> Parser for &T {
    fn parse_slots(&self, data: &[u8], schema: &[u8]) -> Result<ParsedSlots, BoxError> {
        (**self).parse_slots(data, schema)
    }
}
