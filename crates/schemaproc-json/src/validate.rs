//! # Schema Validation
//!
//! Validates credential data and documents against JSON Schema definitions.
//!
//! ## Modes
//!
//! - **Data** — the input must be JSON. Any JSON value is accepted as the
//!   instance.
//! - **Document** — the input may be JSON or YAML and its root must be an
//!   object. YAML is converted to the JSON data model before validation.
//!
//! ## Schema Resolution
//!
//! The draft is taken from the schema's `$schema` keyword unless a draft
//! is forced with [`JsonSchemaValidator::with_draft`]. External `$ref`s
//! resolve from schemas registered with [`JsonSchemaValidator::register`]
//! or [`JsonSchemaValidator::register_dir`]. Unregistered references fail;
//! the validator never goes to the network.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use jsonschema::{Draft, Retrieve, Uri, ValidationOptions};
use schemaproc_core::{BoxError, Validator};
use serde_json::Value;
use thiserror::Error;

/// Resolves `$ref` URIs from schemas held in memory.
struct LocalSchemaRetriever {
    schemas_by_uri: HashMap<String, Value>,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();

        if let Some(value) = self.schemas_by_uri.get(uri_str) {
            return Ok(value.clone());
        }

        // Fall back to the bare filename for relative references.
        let filename = uri_str.rsplit('/').next().unwrap_or(uri_str);
        if let Some(value) = self.schemas_by_uri.get(filename) {
            return Ok(value.clone());
        }

        Err(format!("unresolved schema reference '{uri_str}'").into())
    }
}

/// Which validator entry point produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Data,
    Document,
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data => write!(f, "data"),
            Self::Document => write!(f, "document"),
        }
    }
}

/// Error during schema validation.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The input did not conform to the schema.
    #[error("{mode} validation failed:\n{violations}")]
    ValidationFailed {
        mode: ValidationMode,
        violations: ValidationViolations,
    },

    /// The schema bytes are not a JSON document.
    #[error("invalid schema: {reason}")]
    InvalidSchema { reason: String },

    /// The schema parsed but could not be compiled.
    #[error("validator build error: {reason}")]
    ValidatorBuildError { reason: String },

    /// The data or document could not be parsed.
    #[error("invalid {mode} input: {reason}")]
    InvalidInput { mode: ValidationMode, reason: String },

    /// A schema registered from disk could not be read.
    #[error("schema load error for '{schema_name}': {reason}")]
    SchemaLoadError { schema_name: String, reason: String },
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// JSON Schema validator backed by the `jsonschema` crate.
///
/// Schemas arrive as bytes on every call and are compiled per call. The
/// registry of referenced schemas is fixed once the validator is shared.
#[derive(Debug, Default, Clone)]
pub struct JsonSchemaValidator {
    /// Referenced schemas keyed by URI, `$id`, and bare filename.
    schemas_by_uri: HashMap<String, Value>,
    draft: Option<Draft>,
}

impl JsonSchemaValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a draft instead of detecting it from `$schema`.
    pub fn with_draft(mut self, draft: Draft) -> Self {
        self.draft = Some(draft);
        self
    }

    /// Make `schema` available to `$ref` under `uri` and under its own `$id`.
    pub fn register(&mut self, uri: impl Into<String>, schema: Value) -> &mut Self {
        if let Some(id) = schema.get("$id").and_then(|v| v.as_str()) {
            self.schemas_by_uri.insert(id.to_string(), schema.clone());
        }
        self.schemas_by_uri.insert(uri.into(), schema);
        self
    }

    /// Register every `*.json` file in `dir` under its filename and `$id`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaLoadError` if the directory or a schema file cannot be
    /// read or parsed as JSON.
    pub fn register_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize, SchemaValidationError> {
        let dir = dir.as_ref();
        let load_err = |name: &str, reason: String| SchemaValidationError::SchemaLoadError {
            schema_name: name.to_string(),
            reason,
        };

        let entries = std::fs::read_dir(dir).map_err(|e| {
            load_err(
                &dir.display().to_string(),
                format!("cannot read schema directory: {e}"),
            )
        })?;

        let mut count = 0;
        for entry in entries {
            let path = entry
                .map_err(|e| load_err(&dir.display().to_string(), e.to_string()))?
                .path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.ends_with(".json") {
                continue;
            }
            let content = std::fs::read_to_string(&path)
                .map_err(|e| load_err(name, format!("cannot read file: {e}")))?;
            let value: Value = serde_json::from_str(&content)
                .map_err(|e| load_err(name, format!("invalid JSON: {e}")))?;
            self.register(name, value);
            count += 1;
        }
        tracing::debug!(dir = %dir.display(), count, "registered referenced schemas");
        Ok(count)
    }

    /// Number of registry entries (URIs, not distinct schemas).
    pub fn registry_len(&self) -> usize {
        self.schemas_by_uri.len()
    }

    fn build_options(&self) -> ValidationOptions {
        let mut opts = jsonschema::options();
        if let Some(draft) = self.draft {
            opts.with_draft(draft);
        }
        opts.with_retriever(LocalSchemaRetriever {
            schemas_by_uri: self.schemas_by_uri.clone(),
        });
        opts
    }

    /// Compile schema bytes into a `jsonschema::Validator`.
    pub fn compile(&self, schema: &[u8]) -> Result<jsonschema::Validator, SchemaValidationError> {
        let schema_value: Value =
            serde_json::from_slice(schema).map_err(|e| SchemaValidationError::InvalidSchema {
                reason: format!("invalid JSON: {e}"),
            })?;
        self.build_options()
            .build(&schema_value)
            .map_err(|e| SchemaValidationError::ValidatorBuildError {
                reason: e.to_string(),
            })
    }

    /// Validate a parsed instance against schema bytes.
    pub fn validate_value(
        &self,
        instance: &Value,
        schema: &[u8],
        mode: ValidationMode,
    ) -> Result<(), SchemaValidationError> {
        let validator = self.compile(schema)?;

        let violations: Vec<Violation> = validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if violations.is_empty() {
            tracing::debug!(%mode, "validation passed");
            Ok(())
        } else {
            tracing::debug!(%mode, count = violations.len(), "validation failed");
            Err(SchemaValidationError::ValidationFailed {
                mode,
                violations: ValidationViolations { violations },
            })
        }
    }

    /// Validate JSON data bytes.
    pub fn check_data(&self, data: &[u8], schema: &[u8]) -> Result<(), SchemaValidationError> {
        let instance: Value =
            serde_json::from_slice(data).map_err(|e| SchemaValidationError::InvalidInput {
                mode: ValidationMode::Data,
                reason: format!("invalid JSON: {e}"),
            })?;
        self.validate_value(&instance, schema, ValidationMode::Data)
    }

    /// Validate JSON or YAML document bytes.
    pub fn check_document(&self, doc: &[u8], schema: &[u8]) -> Result<(), SchemaValidationError> {
        let instance = parse_document(doc)?;
        self.validate_value(&instance, schema, ValidationMode::Document)
    }
}

impl Validator for JsonSchemaValidator {
    fn validate_data(&self, data: &[u8], schema: &[u8]) -> Result<(), BoxError> {
        Ok(self.check_data(data, schema)?)
    }

    fn validate_document(&self, doc: &[u8], schema: &[u8]) -> Result<(), BoxError> {
        Ok(self.check_document(doc, schema)?)
    }
}

fn parse_document(doc: &[u8]) -> Result<Value, SchemaValidationError> {
    let invalid = |reason: String| SchemaValidationError::InvalidInput {
        mode: ValidationMode::Document,
        reason,
    };

    let value = match serde_json::from_slice::<Value>(doc) {
        Ok(v) => v,
        Err(_) => {
            let yaml: serde_yaml::Value = serde_yaml::from_slice(doc)
                .map_err(|e| invalid(format!("neither JSON nor YAML: {e}")))?;
            yaml_to_json_value(&yaml)
                .map_err(|e| invalid(format!("YAML-to-JSON conversion failed: {e}")))?
        }
    };

    if !value.is_object() {
        return Err(invalid("document root must be an object".to_string()));
    }
    Ok(value)
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Tags are dropped; map keys must be strings, numbers, or booleans.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn age_schema() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "required": ["birthday", "documentType"],
            "properties": {
                "birthday": { "type": "integer", "minimum": 0 },
                "documentType": { "type": "integer" }
            },
            "additionalProperties": false
        }))
        .unwrap()
    }

    #[test]
    fn valid_data_passes() {
        let v = JsonSchemaValidator::new();
        v.check_data(br#"{"birthday": 19960424, "documentType": 1}"#, &age_schema())
            .unwrap();
    }

    #[test]
    fn missing_field_reports_violation() {
        let v = JsonSchemaValidator::new();
        let err = v
            .check_data(br#"{"birthday": 19960424}"#, &age_schema())
            .unwrap_err();
        match &err {
            SchemaValidationError::ValidationFailed { mode, violations } => {
                assert_eq!(*mode, ValidationMode::Data);
                let messages: Vec<&str> =
                    violations.violations().iter().map(|v| v.message.as_str()).collect();
                assert!(
                    messages.iter().any(|m| m.contains("documentType")),
                    "Expected violation mentioning 'documentType', got: {messages:?}"
                );
            }
            other => panic!("Expected ValidationFailed, got: {other}"),
        }
    }

    #[test]
    fn violation_carries_instance_path() {
        let v = JsonSchemaValidator::new();
        let err = v
            .check_data(br#"{"birthday": "yesterday", "documentType": 1}"#, &age_schema())
            .unwrap_err();
        let SchemaValidationError::ValidationFailed { violations, .. } = err else {
            panic!("expected ValidationFailed");
        };
        assert!(violations
            .violations()
            .iter()
            .any(|v| v.instance_path == "/birthday"));
    }

    #[test]
    fn additional_properties_rejected() {
        let v = JsonSchemaValidator::new();
        let err = v
            .check_data(
                br#"{"birthday": 1, "documentType": 1, "extra": true}"#,
                &age_schema(),
            )
            .unwrap_err();
        assert!(matches!(err, SchemaValidationError::ValidationFailed { .. }));
    }

    #[test]
    fn data_must_be_json() {
        let v = JsonSchemaValidator::new();
        let err = v.check_data(b"birthday: 1", &age_schema()).unwrap_err();
        assert!(matches!(
            err,
            SchemaValidationError::InvalidInput {
                mode: ValidationMode::Data,
                ..
            }
        ));
    }

    #[test]
    fn schema_must_be_json() {
        let v = JsonSchemaValidator::new();
        let err = v.check_data(b"{}", b"not json").unwrap_err();
        assert!(matches!(err, SchemaValidationError::InvalidSchema { .. }));
    }

    #[test]
    fn uncompilable_schema_is_build_error() {
        let v = JsonSchemaValidator::new();
        let err = v
            .check_data(b"{}", br#"{"type": "not-a-type"}"#)
            .unwrap_err();
        assert!(
            matches!(err, SchemaValidationError::ValidatorBuildError { .. }),
            "got: {err}"
        );
    }

    #[test]
    fn yaml_document_is_accepted() {
        let v = JsonSchemaValidator::new();
        let doc = b"birthday: 19960424\ndocumentType: 2\n";
        v.check_document(doc, &age_schema()).unwrap();
    }

    #[test]
    fn document_root_must_be_object() {
        let v = JsonSchemaValidator::new();
        let err = v.check_document(b"[1, 2]", b"{}").unwrap_err();
        assert!(matches!(
            err,
            SchemaValidationError::InvalidInput {
                mode: ValidationMode::Document,
                ..
            }
        ));
    }

    #[test]
    fn data_mode_accepts_non_object_roots() {
        let v = JsonSchemaValidator::new();
        v.check_data(b"[1, 2]", br#"{"type": "array"}"#).unwrap();
    }

    #[test]
    fn registered_ref_resolves() {
        let mut v = JsonSchemaValidator::new();
        v.register(
            "https://schemas.example.org/address.json",
            json!({ "type": "object", "required": ["city"] }),
        );
        let schema = serde_json::to_vec(&json!({
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "type": "object",
            "properties": {
                "address": { "$ref": "https://schemas.example.org/address.json" }
            }
        }))
        .unwrap();

        v.check_data(br#"{"address": {"city": "Tallinn"}}"#, &schema)
            .unwrap();
        let err = v.check_data(br#"{"address": {}}"#, &schema).unwrap_err();
        assert!(matches!(err, SchemaValidationError::ValidationFailed { .. }));
    }

    #[test]
    fn unregistered_ref_fails_without_network() {
        let v = JsonSchemaValidator::new();
        let schema = br#"{"$ref": "https://schemas.example.org/missing.json"}"#;
        let err = v.check_data(b"{}", schema).unwrap_err();
        assert!(
            matches!(err, SchemaValidationError::ValidatorBuildError { .. }),
            "got: {err}"
        );
    }

    #[test]
    fn register_dir_indexes_by_filename_and_id() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("a.json"),
            r#"{"$id": "https://schemas.example.org/a.json", "type": "string"}"#,
        )
        .unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

        let mut v = JsonSchemaValidator::new();
        assert_eq!(v.register_dir(tmp.path()).unwrap(), 1);
        assert_eq!(v.registry_len(), 2);
    }

    #[test]
    fn register_dir_rejects_bad_json() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("broken.json"), "{").unwrap();
        let err = JsonSchemaValidator::new()
            .register_dir(tmp.path())
            .unwrap_err();
        assert!(matches!(err, SchemaValidationError::SchemaLoadError { .. }));
    }

    #[test]
    fn forced_draft_is_applied() {
        let v = JsonSchemaValidator::new().with_draft(Draft::Draft7);
        v.check_data(b"5", br#"{"type": "integer"}"#).unwrap();
    }

    #[test]
    fn trait_errors_downcast_to_validation_error() {
        let v = JsonSchemaValidator::new();
        let err = Validator::validate_data(&v, b"{}", &age_schema()).unwrap_err();
        assert!(err.downcast_ref::<SchemaValidationError>().is_some());
    }

    #[test]
    fn yaml_to_json_conversion() {
        let yaml_str = r#"
id: urn:uuid:1
count: 42
enabled: true
items:
  - one
  - two
"#;
        let yaml_value: serde_yaml::Value = serde_yaml::from_str(yaml_str).unwrap();
        let json_value = yaml_to_json_value(&yaml_value).unwrap();

        assert_eq!(json_value["id"], "urn:uuid:1");
        assert_eq!(json_value["count"], 42);
        assert_eq!(json_value["enabled"], true);
        assert_eq!(json_value["items"][0], "one");
    }

    #[test]
    fn violation_display_root() {
        let v = Violation {
            instance_path: String::new(),
            schema_path: "/required".to_string(),
            message: r#""birthday" is a required property"#.to_string(),
        };
        assert!(v.to_string().contains("(root)"));
    }
}
