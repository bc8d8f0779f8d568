//! # Processor
//!
//! The facade itself. Three optional collaborator slots, configured by
//! option functions applied in order, and four guard-then-forward
//! operations.
//!
//! ## Configuration
//!
//! ```
//! use schemaproc_core::{with_schema_loader, BoxError, LoadedSchema, Processor, SchemaLoader};
//!
//! struct Static;
//!
//! impl SchemaLoader for Static {
//!     fn load(&self, _url: &str) -> Result<LoadedSchema, BoxError> {
//!         Ok(LoadedSchema::new(b"{}".to_vec(), "json"))
//!     }
//! }
//!
//! let processor = Processor::with_options([with_schema_loader(Static)]);
//! let schema = processor.load("https://example.com/schema.json").unwrap();
//! assert_eq!(schema.extension, "json");
//! ```
//!
//! Configuration is expected to finish before the processor is shared.
//! The processor adds no locking of its own.

use std::fmt;
use std::sync::Arc;

use crate::error::ProcessorError;
use crate::traits::{LoadedSchema, ParsedSlots, Parser, SchemaLoader, Validator};

/// A configuration unit: sets exactly one slot of a [`Processor`].
pub type Opt = Box<dyn FnOnce(&mut Processor) + Send>;

/// Facade over a schema loader, a validator, and a slot parser.
#[derive(Clone, Default)]
pub struct Processor {
    validator: Option<Arc<dyn Validator>>,
    schema_loader: Option<Arc<dyn SchemaLoader>>,
    parser: Option<Arc<dyn Parser>>,
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Processor")
            .field("validator", &self.has_validator())
            .field("schema_loader", &self.has_loader())
            .field("parser", &self.has_parser())
            .finish()
    }
}

/// Option that sets the validator slot.
pub fn with_validator(validator: impl Validator + 'static) -> Opt {
    let validator: Arc<dyn Validator> = Arc::new(validator);
    Box::new(move |p: &mut Processor| p.validator = Some(validator))
}

/// Option that sets the schema loader slot.
pub fn with_schema_loader(loader: impl SchemaLoader + 'static) -> Opt {
    let loader: Arc<dyn SchemaLoader> = Arc::new(loader);
    Box::new(move |p: &mut Processor| p.schema_loader = Some(loader))
}

/// Option that sets the parser slot.
pub fn with_parser(parser: impl Parser + 'static) -> Opt {
    let parser: Arc<dyn Parser> = Arc::new(parser);
    Box::new(move |p: &mut Processor| p.parser = Some(parser))
}

/// Apply `opts` to `processor` in order and return it.
pub fn init_processor_options<I>(processor: &mut Processor, opts: I) -> &mut Processor
where
    I: IntoIterator<Item = Opt>,
{
    for opt in opts {
        opt(processor);
    }
    processor
}

impl Processor {
    /// An unconfigured processor. Every operation fails until its slot is set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a processor from options applied in order.
    pub fn with_options<I>(opts: I) -> Self
    where
        I: IntoIterator<Item = Opt>,
    {
        let mut processor = Self::new();
        init_processor_options(&mut processor, opts);
        processor
    }

    /// Set the validator slot, replacing any previous validator.
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Set the schema loader slot, replacing any previous loader.
    pub fn schema_loader(mut self, loader: impl SchemaLoader + 'static) -> Self {
        self.schema_loader = Some(Arc::new(loader));
        self
    }

    /// Set the parser slot, replacing any previous parser.
    pub fn parser(mut self, parser: impl Parser + 'static) -> Self {
        self.parser = Some(Arc::new(parser));
        self
    }

    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    pub fn has_loader(&self) -> bool {
        self.schema_loader.is_some()
    }

    pub fn has_parser(&self) -> bool {
        self.parser.is_some()
    }

    /// Load a schema by the given URL.
    ///
    /// # Errors
    ///
    /// [`ProcessorError::LoaderNotConfigured`] if no loader is set,
    /// otherwise whatever the loader returns.
    pub fn load(&self, url: &str) -> Result<LoadedSchema, ProcessorError> {
        let Some(loader) = &self.schema_loader else {
            tracing::debug!(url, "schema load rejected: loader not configured");
            return Err(ProcessorError::LoaderNotConfigured);
        };
        tracing::debug!(url, "forwarding schema load");
        loader.load(url).map_err(ProcessorError::Collaborator)
    }

    /// Serialize input data to index and value slots.
    ///
    /// # Errors
    ///
    /// [`ProcessorError::ParserNotConfigured`] if no parser is set,
    /// otherwise whatever the parser returns.
    pub fn parse_slots(&self, data: &[u8], schema: &[u8]) -> Result<ParsedSlots, ProcessorError> {
        let Some(parser) = &self.parser else {
            tracing::debug!("slot parse rejected: parser not configured");
            return Err(ProcessorError::ParserNotConfigured);
        };
        tracing::debug!(
            data_len = data.len(),
            schema_len = schema.len(),
            "forwarding slot parse"
        );
        parser
            .parse_slots(data, schema)
            .map_err(ProcessorError::Collaborator)
    }

    /// Validate claim data against the given schema.
    ///
    /// # Errors
    ///
    /// [`ProcessorError::ValidatorNotConfigured`] if no validator is set,
    /// otherwise whatever the validator returns.
    pub fn validate_data(&self, data: &[u8], schema: &[u8]) -> Result<(), ProcessorError> {
        let validator = self.require_validator("data")?;
        validator
            .validate_data(data, schema)
            .map_err(ProcessorError::Collaborator)
    }

    /// Validate a document against the given schema.
    ///
    /// # Errors
    ///
    /// [`ProcessorError::ValidatorNotConfigured`] if no validator is set,
    /// otherwise whatever the validator returns.
    pub fn validate_document(&self, doc: &[u8], schema: &[u8]) -> Result<(), ProcessorError> {
        let validator = self.require_validator("document")?;
        validator
            .validate_document(doc, schema)
            .map_err(ProcessorError::Collaborator)
    }

    fn require_validator(&self, mode: &'static str) -> Result<&Arc<dyn Validator>, ProcessorError> {
        match &self.validator {
            Some(v) => {
                tracing::debug!(mode, "forwarding validation");
                Ok(v)
            }
            None => {
                tracing::debug!(mode, "validation rejected: validator not configured");
                Err(ProcessorError::ValidatorNotConfigured)
            }
        }
    }
}
