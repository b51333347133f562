//! Error types for the CLI application.

use radlabel_domain::{CompletionError, SchemaError};
use radlabel_extractor::ExtractorError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Labeling pipeline error
    #[error(transparent)]
    Extractor(#[from] ExtractorError),

    /// Schema file error
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Completion service error
    #[error("Completion service error: {0}")]
    Completion(#[from] CompletionError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
