//! # schemaproc-cli — Schema Processor Command-Line Interface
//!
//! ## Subcommands
//!
//! - `load` — resolve a schema identifier and print or save its bytes
//! - `validate` — validate a data file or document against a schema
//! - `parse` — serialize a data file into index and value slots
//!
//! ## Crate Policy
//!
//! - Argument parsing lives here; every operation goes through a
//!   `schemaproc_core::Processor`.
//! - Handlers return an exit code; errors propagate as `anyhow::Error`.

pub mod load;
pub mod parse;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use schemaproc_core::{with_parser, with_schema_loader, with_validator, Processor};
use schemaproc_json::{JsonSchemaValidator, LoaderConfig, SlotParser, UriLoader};

/// Read an input file, naming it in the error.
pub(crate) fn read_input(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))
}

/// Apply command-line overrides on top of environment configuration.
pub fn resolve_config(schema_dir: Option<PathBuf>, offline: bool) -> Result<LoaderConfig> {
    let mut config = LoaderConfig::from_env().context("invalid SCHEMAPROC_* environment")?;
    if let Some(dir) = schema_dir {
        config.schema_dir = dir;
    }
    if offline {
        config.allow_remote = false;
    }
    Ok(config)
}

/// Wire the reference collaborators into a processor.
///
/// `refs` is a directory of schemas made available to `$ref`.
pub fn build_processor(config: &LoaderConfig, refs: Option<&Path>) -> Result<Processor> {
    let loader = UriLoader::from_config(config)?;

    let mut validator = JsonSchemaValidator::new();
    if let Some(dir) = refs {
        let count = validator.register_dir(dir)?;
        tracing::info!(dir = %dir.display(), count, "registered referenced schemas");
    }

    Ok(Processor::with_options([
        with_schema_loader(loader),
        with_validator(validator),
        with_parser(SlotParser::new()),
    ]))
}

pub(crate) fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
