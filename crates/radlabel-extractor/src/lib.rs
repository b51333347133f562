//! Radlabel Extractor
//!
//! Labels free-text radiology reports with boolean findings by prompting an
//! LLM with a JSON schema and recovering a JSON object from its answer.
//!
//! # Overview
//!
//! A report is wrapped in a task prompt (fenced report, schema, instructions),
//! the task prompt is wrapped in the chat template of the target model
//! family, the completion service answers in free text, and the first
//! balanced JSON object in that text becomes the report's label record.
//!
//! # Architecture
//!
//! ```text
//! SchemaSpec + report → PromptComposer → CompletionClient → extract_first_object → ResultStore
//! ```
//!
//! # Key Features
//!
//! - **Data-driven chat templates**: model families are registry entries,
//!   extendable from configuration
//! - **String-aware brace scanning**: braces inside JSON strings and escaped
//!   quotes never break extraction
//! - **Explicit failure markers**: unknown model family, generation failure,
//!   timeout and "no object found" are all per-report results
//! - **Optional strict mode**: conform records to the schema
//!
//! # Example Usage
//!
//! ```
//! use radlabel_domain::SchemaSpec;
//! use radlabel_extractor::{Labeler, LabelerConfig, ResultStore};
//! use radlabel_llm::MockClient;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = Arc::new(SchemaSpec::booleans(["pneumothorax", "pleural_effusion"])?);
//! let client = MockClient::new(r#"Sure! {"pneumothorax": false, "pleural_effusion": false}"#);
//! let labeler = Labeler::from_config(client, schema, LabelerConfig::default())?;
//!
//! let store = ResultStore::new();
//! labeler.label_into(&store, "rpt-001", "No pneumothorax or effusion.")?;
//!
//! let result = store.get("rpt-001").unwrap();
//! assert_eq!(result.record().unwrap().finding("pneumothorax"), Some(false));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod labeler;
mod parser;
mod prompt;
mod store;
mod template;
mod types;


pub use config::{
    LabelerConfig, DEFAULT_INSTRUCTIONS, DEFAULT_MODEL_FAMILY, DEFAULT_SYSTEM_INSTRUCTION,
};
pub use error::ExtractorError;
pub use labeler::Labeler;
pub use parser::{balanced_span, candidate_spans, extract_first_object, Extraction};
pub use prompt::PromptComposer;
pub use store::ResultStore;
pub use template::{ChatTemplate, SystemPlacement, TemplateRegistry};
pub use types::PromptRequest;
