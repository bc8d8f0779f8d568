//! # Validate Subcommand
//!
//! Validates a data file (or, with `--document`, a JSON/YAML document)
//! against a schema resolved through the processor's loader.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use schemaproc_core::{Processor, ProcessorError};
use schemaproc_json::SchemaValidationError;

use crate::read_input;

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema identifier.
    #[arg(long)]
    pub schema: String,

    /// File holding the data or document.
    pub input: PathBuf,

    /// Validate as a whole document instead of claim data.
    #[arg(long)]
    pub document: bool,
}

/// Execute the validate subcommand. Returns 1 when the input is invalid.
pub fn run_validate(args: &ValidateArgs, processor: &Processor) -> Result<u8> {
    let schema = processor
        .load(&args.schema)
        .with_context(|| format!("failed to load schema '{}'", args.schema))?;
    let input = read_input(&args.input)?;

    let result = if args.document {
        processor.validate_document(&input, &schema.bytes)
    } else {
        processor.validate_data(&input, &schema.bytes)
    };

    match result {
        Ok(()) => {
            println!("OK: {}", args.input.display());
            Ok(0)
        }
        Err(ProcessorError::Collaborator(e)) => match e.downcast_ref::<SchemaValidationError>() {
            Some(SchemaValidationError::ValidationFailed { violations, .. }) => {
                println!(
                    "FAIL: {} ({} violation(s))",
                    args.input.display(),
                    violations.len()
                );
                println!("{violations}");
                Ok(1)
            }
            _ => Err(anyhow::anyhow!(e))
                .with_context(|| format!("cannot validate {}", args.input.display())),
        },
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemaproc_json::{JsonSchemaValidator, UriLoader};

    fn setup() -> (tempfile::TempDir, Processor) {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("age.json"),
            r#"{"type": "object", "required": ["birthday"]}"#,
        )
        .unwrap();
        let processor = Processor::new()
            .schema_loader(UriLoader::local(tmp.path()))
            .validator(JsonSchemaValidator::new());
        (tmp, processor)
    }

    fn args(tmp: &tempfile::TempDir, content: &str, document: bool) -> ValidateArgs {
        let input = tmp.path().join("input");
        std::fs::write(&input, content).unwrap();
        ValidateArgs {
            schema: "age.json".to_string(),
            input,
            document,
        }
    }

    #[test]
    fn valid_data_exits_zero() {
        let (tmp, processor) = setup();
        let code = run_validate(&args(&tmp, r#"{"birthday": 1}"#, false), &processor).unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn violations_exit_one() {
        let (tmp, processor) = setup();
        let code = run_validate(&args(&tmp, "{}", false), &processor).unwrap();
        assert_eq!(code, 1);
    }

    #[test]
    fn yaml_document_is_accepted() {
        let (tmp, processor) = setup();
        let code = run_validate(&args(&tmp, "birthday: 1\n", true), &processor).unwrap();
        assert_eq!(code, 0);
    }

    #[test]
    fn unparseable_input_is_an_error() {
        let (tmp, processor) = setup();
        let err = run_validate(&args(&tmp, "not json", false), &processor).unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.starts_with("cannot validate"), "{chain}");
        assert!(chain.contains("invalid data input"), "{chain}");
    }
}
