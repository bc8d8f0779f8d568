//! # Load Subcommand
//!
//! Resolves a schema identifier through the processor's loader.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use schemaproc_core::Processor;

/// Arguments for the load subcommand.
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Schema identifier: a path, `file://` URL, or `http(s)://` URL.
    pub id: String,

    /// Write the schema bytes to this file instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Execute the load subcommand.
pub fn run_load(args: &LoadArgs, processor: &Processor) -> Result<u8> {
    let schema = processor
        .load(&args.id)
        .with_context(|| format!("failed to load schema '{}'", args.id))?;

    let format = if schema.extension.is_empty() {
        "unknown"
    } else {
        schema.extension.as_str()
    };

    match &args.out {
        Some(path) => {
            std::fs::write(path, &schema.bytes)
                .with_context(|| format!("cannot write {}", path.display()))?;
            println!(
                "{}: {} bytes, format {format} -> {}",
                args.id,
                schema.bytes.len(),
                path.display()
            );
        }
        None => {
            eprintln!("{}: {} bytes, format {format}", args.id, schema.bytes.len());
            std::io::stdout()
                .write_all(&schema.bytes)
                .context("cannot write schema to stdout")?;
        }
    }
    Ok(0)
}
