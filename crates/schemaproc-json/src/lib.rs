//! # schemaproc-json — Reference Collaborators
//!
//! Concrete implementations of the three `schemaproc-core` capabilities
//! for JSON Schema based credentials.
//!
//! ## Schema Loading (`loader`)
//!
//! [`UriLoader`] resolves `file://` URLs and plain paths from disk, and
//! `http(s)://` URLs with a blocking HTTP client that retries transport
//! failures with exponential backoff. The format tag is the lowercase
//! extension of the last path segment.
//!
//! ## Validation (`validate`)
//!
//! [`JsonSchemaValidator`] compiles schema bytes with the `jsonschema`
//! crate. Data is validated as JSON; documents may be JSON or YAML.
//! Cross-schema `$ref`s resolve only from schemas registered up front,
//! never from the network.
//!
//! ## Slot Parsing (`parser`)
//!
//! [`SlotParser`] reads `$metadata.serialization` from the schema and packs
//! the named data fields into two 32-byte index slots and two 32-byte
//! value slots.
//!
//! ## Configuration (`config`)
//!
//! [`LoaderConfig`] reads `SCHEMAPROC_*` environment variables.
//!
//! ## Crate Policy
//!
//! - Depends only on `schemaproc-core` internally.
//! - Every collaborator error is a structured `thiserror` enum; the facade
//!   passes it to the caller unchanged.

pub mod config;
pub mod loader;
pub mod parser;
mod retry;
pub mod validate;

pub use config::{ConfigError, LoaderConfig, MAX_RETRIES_LIMIT};
pub use loader::{LoadError, UriLoader};
pub use parser::{ParseError, SlotParser, SLOT_LEN};
pub use retry::RetryPolicy;
pub use validate::{
    JsonSchemaValidator, SchemaValidationError, ValidationMode, ValidationViolations, Violation,
};

use schemaproc_core::Processor;

/// A processor with all three slots filled by the reference collaborators.
///
/// # Errors
///
/// Returns [`LoadError::Client`] if the HTTP client cannot be built.
pub fn default_processor(config: &LoaderConfig) -> Result<Processor, LoadError> {
    let loader = UriLoader::from_config(config)?;
    Ok(Processor::new()
        .schema_loader(loader)
        .validator(JsonSchemaValidator::new())
        .parser(SlotParser::new()))
}
