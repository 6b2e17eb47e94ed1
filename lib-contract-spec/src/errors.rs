//! Contract Spec Errors

use std::time::Duration;

use thiserror::Error;

/// Error surfaced by the spec decoder and its helpers
///
/// Boundary-scan failures never appear here unless the decoder was
/// configured with `reject_truncated`; they are reported through
/// [`crate::Truncation`] instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    #[error("Malformed record at byte offset {offset}: {reason}")]
    MalformedRecord { offset: usize, reason: String },

    #[error("Spec buffer truncated at byte offset {offset}: {discarded} trailing bytes could not be decoded")]
    Truncated { offset: usize, discarded: usize },

    #[error("Invalid wasm module: {0}")]
    InvalidModule(String),

    #[error("Custom section '{0}' not found")]
    SectionNotFound(String),

    #[error("Invalid input encoding: {0}")]
    InvalidEncoding(String),

    #[error("Invalid decoder configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Decode did not finish within {0:?}")]
    DeadlineExceeded(Duration),

    #[error("Decode task failed: {0}")]
    Task(String),
}

impl SpecError {
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        SpecError::MalformedRecord {
            offset,
            reason: reason.into(),
        }
    }
}

/// Result type for spec decoding operations
pub type SpecResult<T> = Result<T, SpecError>;
