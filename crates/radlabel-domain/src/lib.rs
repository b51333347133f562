//! Radlabel Domain Layer
//!
//! This crate holds the data model and trait boundaries for labeling
//! free-text radiology reports with an LLM. It performs no I/O: prompt
//! composition, response extraction and transport all live in other crates.
//!
//! ## Key Concepts
//!
//! - **Finding**: a single clinical observation to extract (e.g. pneumothorax)
//! - **Schema**: the ordered set of findings and their declared value types
//! - **Label record**: the mapping a model produced for one report
//! - **Labeled result**: a report identifier paired with its record or an
//!   explicit failure marker
//! - **Completion client**: the opaque text-completion service boundary
//!
//! ## Architecture
//!
//! - Only `serde`/`serde_json` and `thiserror` as external dependencies
//! - Pure data and validation logic
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod completion;
pub mod label;
pub mod schema;
pub mod traits;

// Re-exports for convenience
pub use completion::{CompletionError, GenerationOptions};
pub use label::{FailureKind, LabelOutcome, LabelRecord, LabeledResult};
pub use schema::{FindingSpec, FindingType, SchemaError, SchemaSpec, ValidationReport};
pub use traits::CompletionClient;
