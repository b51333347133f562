//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::completion::{CompletionError, GenerationOptions};

/// Trait for text-completion services
///
/// Implemented by the infrastructure layer (radlabel-llm)
///
/// Calls are synchronous and may block for the whole generation. Output is
/// not assumed to be repeatable, even at temperature 0, and callers own any
/// retry policy.
pub trait CompletionClient {
    /// Generate text for a fully composed prompt
    fn complete(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, CompletionError>;

    /// Name of the model behind this client, for logging and metadata
    fn model_name(&self) -> &str;
}
