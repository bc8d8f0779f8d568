//! # Parse Subcommand
//!
//! Serializes a data file into index and value slots and prints them as
//! hex-encoded JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use schemaproc_core::{ParsedSlots, Processor};
use serde::Serialize;

use crate::{read_input, to_hex};

/// Arguments for the parse subcommand.
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Schema identifier.
    #[arg(long)]
    pub schema: String,

    /// File holding the credential data.
    pub input: PathBuf,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SlotsOutput {
    pub index: String,
    pub value: String,
}

impl From<&ParsedSlots> for SlotsOutput {
    fn from(slots: &ParsedSlots) -> Self {
        Self {
            index: to_hex(&slots.index),
            value: to_hex(&slots.value),
        }
    }
}

/// Parse slots and return the rendered output.
pub fn parse_to_output(args: &ParseArgs, processor: &Processor) -> Result<SlotsOutput> {
    let schema = processor
        .load(&args.schema)
        .with_context(|| format!("failed to load schema '{}'", args.schema))?;
    let data = read_input(&args.input)?;
    let slots = processor
        .parse_slots(&data, &schema.bytes)
        .with_context(|| format!("cannot parse slots from {}", args.input.display()))?;
    Ok(SlotsOutput::from(&slots))
}

/// Execute the parse subcommand.
pub fn run_parse(args: &ParseArgs, processor: &Processor) -> Result<u8> {
    let output = parse_to_output(args, processor)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(0)
}
