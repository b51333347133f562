//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur while composing prompts or collecting results
///
/// Per-report pipeline failures are not errors: they come back as
/// `FailureKind` markers inside a `LabeledResult`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractorError {
    /// No chat template registered under this model family
    #[error("Unsupported model family: {0}")]
    UnsupportedModelFamily(String),

    /// A result for this report id was already recorded
    #[error("Duplicate report id: {0}")]
    DuplicateReport(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonParse(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::JsonParse(e.to_string())
    }
}
