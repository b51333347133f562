//! Ollama Client Implementation
//!
//! Sends fully composed prompts to a local Ollama server.
//!
//! # Features
//!
//! - Blocking HTTP communication with the Ollama generate API
//! - Raw mode: the prompt already carries the chat template, so the server
//!   must not wrap it again
//! - Generation options mapped onto Ollama's option names
//! - Request timeout owned by the client configuration
//!
//! # Examples
//!
//! ```no_run
//! use radlabel_domain::{CompletionClient, GenerationOptions};
//! use radlabel_llm::{OllamaClient, OllamaConfig};
//!
//! let client = OllamaClient::new(OllamaConfig::with_model("mistral")).unwrap();
//! let text = client.complete("[INST] Say hello [/INST]", &GenerationOptions::default());
//! ```

use radlabel_domain::{CompletionClient, CompletionError, GenerationOptions};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default model tag
pub const DEFAULT_MODEL: &str = "llama2";

/// Default request timeout; local generation on CPU is slow
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Connection settings for an Ollama server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// API endpoint (e.g., "http://localhost:11434")
    pub endpoint: String,

    /// Model tag as known to the server (e.g., "llama2", "mistral")
    pub model: String,

    /// Whole-request timeout (seconds)
    pub timeout_secs: u64,
}

impl OllamaConfig {
    /// Default endpoint and timeout for a given model
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Get the timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Ollama API client
///
/// One request per call, no retries. A transport timeout surfaces as
/// [`CompletionError::Timeout`]; everything else as
/// [`CompletionError::GenerationFailure`].
pub struct OllamaClient {
    config: OllamaConfig,
    client: reqwest::blocking::Client,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    raw: bool,
    options: OllamaOptions,
}

/// Sampling options in Ollama's naming
#[derive(Serialize)]
struct OllamaOptions {
    num_predict: u32,
    temperature: f32,
    top_p: f32,
    repeat_penalty: f32,
    top_k: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

impl From<&GenerationOptions> for OllamaOptions {
    fn from(options: &GenerationOptions) -> Self {
        Self {
            num_predict: options.max_tokens,
            temperature: options.temperature,
            top_p: options.top_p,
            repeat_penalty: options.repeat_penalty,
            top_k: options.top_k,
            stop: options.stop.clone(),
        }
    }
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    #[allow(dead_code)]
    done: bool,
}

impl OllamaClient {
    /// Create a new Ollama client
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be initialized
    pub fn new(config: OllamaConfig) -> Result<Self, CompletionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                CompletionError::GenerationFailure(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Connection settings in use
    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.config.endpoint.trim_end_matches('/'))
    }
}

impl CompletionClient for OllamaClient {
    fn complete(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, CompletionError> {
        let request_body = OllamaGenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            raw: true,
            options: options.into(),
        };

        debug!(
            "Sending {} char prompt to {} ({})",
            prompt.len(),
            self.config.endpoint,
            self.config.model
        );
        let started = Instant::now();

        let response = self
            .client
            .post(self.generate_url())
            .json(&request_body)
            .send()
            .map_err(transport_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CompletionError::GenerationFailure(format!(
                "Model not available: {}",
                self.config.model
            )));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CompletionError::GenerationFailure(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body: OllamaGenerateResponse = response.json().map_err(|e| {
            if e.is_timeout() {
                CompletionError::Timeout
            } else {
                CompletionError::GenerationFailure(format!("Failed to parse response: {}", e))
            }
        })?;

        debug!(
            "Completion of {} chars in {} ms",
            body.response.len(),
            started.elapsed().as_millis()
        );

        Ok(body.response)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

fn transport_error(e: reqwest::Error) -> CompletionError {
    if e.is_timeout() {
        CompletionError::Timeout
    } else {
        CompletionError::GenerationFailure(format!("Request failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_ollama_client_creation() {
        let client = OllamaClient::new(OllamaConfig::default()).unwrap();
        assert_eq!(client.config().endpoint, DEFAULT_ENDPOINT);
        assert_eq!(client.model_name(), DEFAULT_MODEL);
        assert_eq!(client.config().timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_ollama_config_with_model() {
        let config = OllamaConfig::with_model("mistral");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.model, "mistral");
    }

    #[test]
    fn test_generate_url_trims_trailing_slash() {
        let mut config = OllamaConfig::default();
        config.endpoint = "http://gpu-box:11434/".to_string();
        let client = OllamaClient::new(config).unwrap();
        assert_eq!(client.generate_url(), "http://gpu-box:11434/api/generate");
    }

    #[test]
    fn test_request_body_maps_options() {
        let options = GenerationOptions::default()
            .with_max_tokens(256)
            .with_stop("</s>");
        let body = OllamaGenerateRequest {
            model: "llama2",
            prompt: "p",
            stream: false,
            raw: true,
            options: (&options).into(),
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["raw"], true);
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 256);
        assert_eq!(json["options"]["top_k"], 40);
        assert_eq!(json["options"]["stop"][0], "</s>");
    }

    #[test]
    fn test_request_body_omits_empty_stop() {
        let options = GenerationOptions::default();
        let json = serde_json::to_value(OllamaOptions::from(&options)).unwrap();
        assert!(json.get("stop").is_none());
    }

    #[test]
    fn test_ollama_error_handling() {
        // Invalid port never reaches the network
        let mut config = OllamaConfig::default();
        config.endpoint = "http://localhost:99999".to_string();
        let client = OllamaClient::new(config).unwrap();

        let result = client.complete("test", &GenerationOptions::default());
        assert!(matches!(result, Err(CompletionError::GenerationFailure(_))));
    }

    #[test]
    fn test_ollama_timeout() {
        // A server that accepts the connection and never answers
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                thread::sleep(Duration::from_secs(3));
            }
        });

        let config = OllamaConfig {
            endpoint: format!("http://{}", addr),
            model: "llama2".to_string(),
            timeout_secs: 1,
        };
        let client = OllamaClient::new(config).unwrap();

        let result = client.complete("test", &GenerationOptions::default());
        assert_eq!(result, Err(CompletionError::Timeout));

        server.join().unwrap();
    }

    // Integration tests (requires running Ollama)
    #[test]
    #[ignore] // Only run when Ollama is available
    fn test_ollama_generate_integration() {
        let client = OllamaClient::new(OllamaConfig::default()).unwrap();
        let result = client.complete(
            "[INST] Say 'hello' and nothing else [/INST]",
            &GenerationOptions::default(),
        );

        if let Ok(response) = result {
            assert!(!response.is_empty());
        }
    }
}
