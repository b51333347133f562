//! Completion module - generation parameters and boundary errors

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a completion service
///
/// Opaque by design of the boundary: the core only distinguishes a timeout
/// from every other failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompletionError {
    /// Upstream failure (transport, HTTP status, undecodable body, model error)
    #[error("Generation failure: {0}")]
    GenerationFailure(String),

    /// The service did not answer within its configured timeout
    #[error("Completion timed out")]
    Timeout,
}

/// Sampling parameters passed to the completion service with every prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    /// Upper bound on generated tokens
    pub max_tokens: u32,

    /// Sampling temperature in `[0, 1]`
    pub temperature: f32,

    /// Nucleus sampling mass in `(0, 1]`
    pub top_p: f32,

    /// Repetition penalty, at least 1
    pub repeat_penalty: f32,

    /// Top-k sampling cutoff; 0 disables it
    pub top_k: u32,

    /// Sequences that end generation early
    pub stop: Vec<String>,
}

impl GenerationOptions {
    /// Validate ranges accepted by the completion boundary
    pub fn validate(&self) -> Result<(), String> {
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(format!(
                "temperature {} out of range [0.0, 1.0]",
                self.temperature
            ));
        }
        if !(self.top_p > 0.0 && self.top_p <= 1.0) {
            return Err(format!("top_p {} out of range (0.0, 1.0]", self.top_p));
        }
        if self.repeat_penalty.is_nan() || self.repeat_penalty < 1.0 {
            return Err(format!(
                "repeat_penalty {} must be at least 1.0",
                self.repeat_penalty
            ));
        }
        Ok(())
    }

    /// Set the token budget
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Add a stop sequence
    pub fn with_stop(mut self, stop: impl Into<String>) -> Self {
        self.stop.push(stop.into());
        self
    }
}

impl Default for GenerationOptions {
    /// Near-greedy sampling suited to structured answers
    fn default() -> Self {
        Self {
            max_tokens: 512,
            temperature: 0.1,
            top_p: 0.95,
            repeat_penalty: 1.1,
            top_k: 40,
            stop: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_are_valid() {
        assert!(GenerationOptions::default().validate().is_ok());
    }

    #[test]
    fn test_zero_max_tokens() {
        let options = GenerationOptions::default().with_max_tokens(0);
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_temperature_bounds() {
        assert!(GenerationOptions::default().with_temperature(0.0).validate().is_ok());
        assert!(GenerationOptions::default().with_temperature(1.0).validate().is_ok());
        assert!(GenerationOptions::default().with_temperature(1.5).validate().is_err());
        assert!(GenerationOptions::default().with_temperature(-0.1).validate().is_err());
    }

    #[test]
    fn test_top_p_excludes_zero() {
        let mut options = GenerationOptions::default();
        options.top_p = 0.0;
        assert!(options.validate().is_err());
        options.top_p = 1.0;
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_repeat_penalty_floor() {
        let mut options = GenerationOptions::default();
        options.repeat_penalty = 0.9;
        assert!(options.validate().is_err());
        options.repeat_penalty = f32::NAN;
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_partial_options_deserialize_with_defaults() {
        let options: GenerationOptions =
            serde_json::from_str(r#"{"max_tokens": 128, "stop": ["</s>"]}"#).unwrap();
        assert_eq!(options.max_tokens, 128);
        assert_eq!(options.stop, vec!["</s>".to_string()]);
        assert_eq!(options.top_k, GenerationOptions::default().top_k);
    }
}
