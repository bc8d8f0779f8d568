//! # Facade Errors
//!
//! The facade raises exactly three errors of its own, one per missing
//! collaborator kind. Everything else originates in a collaborator and is
//! carried through [`ProcessorError::Collaborator`] untouched: same
//! `Display`, same `source()` chain, same boxed value.

use thiserror::Error;

use crate::traits::BoxError;

/// Error returned by [`Processor`](crate::Processor) operations.
#[derive(Error, Debug)]
pub enum ProcessorError {
    /// `load` was called but no schema loader was configured.
    #[error("loader is not defined")]
    LoaderNotConfigured,

    /// `parse_slots` was called but no parser was configured.
    #[error("parser is not defined")]
    ParserNotConfigured,

    /// `validate_data` or `validate_document` was called but no validator
    /// was configured.
    #[error("validator is not defined")]
    ValidatorNotConfigured,

    /// Error returned by the configured collaborator.
    #[error(transparent)]
    Collaborator(BoxError),
}

impl ProcessorError {
    /// True for the three "not configured" variants.
    pub fn is_not_configured(&self) -> bool {
        !matches!(self, Self::Collaborator(_))
    }

    /// Borrow the collaborator's error, if this is one.
    pub fn collaborator(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Collaborator(e) => Some(e.as_ref()),
            _ => None,
        }
    }

    /// Take back the exact error value the collaborator returned.
    pub fn into_collaborator(self) -> Option<BoxError> {
        match self {
            Self::Collaborator(e) => Some(e),
            _ => None,
        }
    }
}
