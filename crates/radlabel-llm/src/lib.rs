//! Radlabel Completion Clients
//!
//! Implementations of the `CompletionClient` trait from `radlabel-domain`.
//!
//! # Clients
//!
//! - `MockClient`: Deterministic scripted client for testing
//! - `OllamaClient`: Local Ollama API integration
//!
//! # Examples
//!
//! ```
//! use radlabel_domain::{CompletionClient, GenerationOptions};
//! use radlabel_llm::MockClient;
//!
//! let client = MockClient::new(r#"{"pneumothorax": false}"#);
//! let text = client.complete("any prompt", &GenerationOptions::default()).unwrap();
//! assert_eq!(text, r#"{"pneumothorax": false}"#);
//! ```

#![warn(missing_docs)]

pub mod ollama;

use radlabel_domain::{CompletionClient, CompletionError, GenerationOptions};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use ollama::{OllamaClient, OllamaConfig};

#[derive(Debug, Clone)]
enum Scripted {
    Text(String),
    Error(CompletionError),
}

/// Mock completion client for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
/// Scripted entries match when the prompt *contains* the registered fragment,
/// which lets tests key responses on a report body without reproducing the
/// whole chat template. The first matching entry wins.
///
/// # Examples
///
/// ```
/// use radlabel_domain::{CompletionClient, CompletionError, GenerationOptions};
/// use radlabel_llm::MockClient;
///
/// let options = GenerationOptions::default();
/// let mut client = MockClient::default();
/// client.add_response("report one", "first");
/// client.add_error("report two", CompletionError::Timeout);
///
/// assert_eq!(client.complete("... report one ...", &options).unwrap(), "first");
/// assert_eq!(client.complete("report two", &options), Err(CompletionError::Timeout));
/// assert_eq!(client.call_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockClient {
    default_response: String,
    model: String,
    scripted: Arc<Mutex<Vec<(String, Scripted)>>>,
    call_count: Arc<Mutex<usize>>,
    last_request: Arc<Mutex<Option<(String, GenerationOptions)>>>,
}

impl MockClient {
    /// Create a new MockClient with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            model: "mock".to_string(),
            scripted: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Report a different model name
    pub fn with_model_name(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Respond with `response` to prompts containing `fragment`
    pub fn add_response(&mut self, fragment: impl Into<String>, response: impl Into<String>) {
        lock(&self.scripted).push((fragment.into(), Scripted::Text(response.into())));
    }

    /// Fail prompts containing `fragment` with `error`
    pub fn add_error(&mut self, fragment: impl Into<String>, error: CompletionError) {
        lock(&self.scripted).push((fragment.into(), Scripted::Error(error)));
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *lock(&self.call_count) = 0;
    }

    /// Prompt passed to the most recent call
    pub fn last_prompt(&self) -> Option<String> {
        lock(&self.last_request).as_ref().map(|(prompt, _)| prompt.clone())
    }

    /// Options passed to the most recent call
    pub fn last_options(&self) -> Option<GenerationOptions> {
        lock(&self.last_request).as_ref().map(|(_, options)| options.clone())
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl CompletionClient for MockClient {
    fn complete(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, CompletionError> {
        *lock(&self.call_count) += 1;
        *lock(&self.last_request) = Some((prompt.to_string(), options.clone()));

        let scripted = lock(&self.scripted);
        match scripted.iter().find(|(fragment, _)| prompt.contains(fragment.as_str())) {
            Some((_, Scripted::Text(response))) => Ok(response.clone()),
            Some((_, Scripted::Error(error))) => Err(error.clone()),
            None => Ok(self.default_response.clone()),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
