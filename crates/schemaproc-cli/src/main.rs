//! # schemaproc CLI entry point
//!
//! Parses command-line arguments, wires the reference collaborators into a
//! processor, and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use schemaproc_cli::load::{run_load, LoadArgs};
use schemaproc_cli::parse::{run_parse, ParseArgs};
use schemaproc_cli::validate::{run_validate, ValidateArgs};
use schemaproc_cli::{build_processor, resolve_config};

/// Schema processor: load schemas, validate credential data, parse claim slots.
#[derive(Parser, Debug)]
#[command(name = "schemaproc", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory for relative schema paths. Overrides SCHEMAPROC_SCHEMA_DIR.
    #[arg(long, global = true)]
    schema_dir: Option<PathBuf>,

    /// Directory of schemas available to `$ref`.
    #[arg(long, global = true)]
    refs: Option<PathBuf>,

    /// Never fetch schemas over HTTP.
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a schema and print or save its bytes.
    Load(LoadArgs),

    /// Validate claim data or a document against a schema.
    Validate(ValidateArgs),

    /// Serialize claim data into index and value slots.
    Parse(ParseArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = resolve_config(cli.schema_dir, cli.offline).and_then(|config| {
        tracing::debug!(?config, "resolved loader configuration");
        let processor = build_processor(&config, cli.refs.as_deref())?;
        match &cli.command {
            Commands::Load(args) => run_load(args, &processor),
            Commands::Validate(args) => run_validate(args, &processor),
            Commands::Parse(args) => run_parse(args, &processor),
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(2)
        }
    }
}
