//! # schemaproc-core — Schema Processor Facade
//!
//! Composes three independently implemented capabilities behind a single
//! entry point:
//!
//! - **Schema loading** ([`SchemaLoader`]) — resolves a schema identifier
//!   to raw schema bytes plus a format tag.
//! - **Validation** ([`Validator`]) — checks raw data or a raw document
//!   against schema bytes.
//! - **Slot parsing** ([`Parser`]) — converts raw data into index and
//!   value slot buffers for a given schema.
//!
//! The [`Processor`] holds at most one collaborator per capability. It is
//! constructed empty and configured with option functions ([`Opt`]) that
//! are applied in order, last write wins. Every operation checks its slot
//! and either forwards the call verbatim or fails with the matching
//! "not configured" error.
//!
//! ## Crate Policy
//!
//! - No I/O, no schema format knowledge, no parsing logic. Concrete
//!   collaborators live in `schemaproc-json` or in caller code.
//! - Collaborator errors are never inspected, retried, or re-wrapped.
//! - No `unsafe` code. No `.unwrap()` outside tests.

pub mod error;
pub mod processor;
pub mod traits;

pub use error::ProcessorError;
pub use processor::{
    init_processor_options, with_parser, with_schema_loader, with_validator, Opt, Processor,
};
pub use traits::{BoxError, LoadedSchema, ParsedSlots, Parser, SchemaLoader, Validator};
