//! Label module - what a model produced for one report

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Findings extracted from one completion
///
/// Keys keep the order the model emitted them. Keys outside the schema are
/// kept as-is; see [`crate::SchemaSpec::conform`] for strict normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelRecord(Map<String, Value>);

impl LabelRecord {
    /// An empty record
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Insert or replace a value
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(name.into(), value)
    }

    /// Raw value for a key
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Boolean value of a finding
    ///
    /// `None` when the key is absent, `null`, or not a boolean.
    pub fn finding(&self, name: &str) -> Option<bool> {
        self.0.get(name).and_then(Value::as_bool)
    }

    /// Keys in emitted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Entries in emitted order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no keys
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying JSON object
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into the underlying JSON object
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for LabelRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Why a report produced no label record
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureKind {
    /// No chat template is registered for the requested model family
    #[error("Unsupported model family: {0}")]
    UnsupportedModelFamily(String),

    /// The completion service failed
    #[error("Generation failure: {0}")]
    GenerationFailure(String),

    /// The completion service timed out
    #[error("Completion timed out")]
    Timeout,

    /// The completion held no parseable JSON object
    #[error("No structured object found in completion")]
    NoStructuredObjectFound,
}

/// Record or failure for one report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LabelOutcome {
    /// Extraction succeeded
    #[serde(rename = "labels")]
    Labeled(LabelRecord),

    /// Extraction failed; the marker says why
    #[serde(rename = "failure")]
    Failed(FailureKind),
}

/// One report's output, keyed by the caller's report identifier
///
/// Serializes as `{"report_id": ..., "labels": {...}}` on success and
/// `{"report_id": ..., "failure": {"kind": ...}}` otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledResult {
    /// Caller-supplied identifier, unique per labeling run
    pub report_id: String,

    /// Record or failure marker
    #[serde(flatten)]
    pub outcome: LabelOutcome,
}

impl LabeledResult {
    /// A successful result
    pub fn labeled(report_id: impl Into<String>, record: LabelRecord) -> Self {
        Self {
            report_id: report_id.into(),
            outcome: LabelOutcome::Labeled(record),
        }
    }

    /// A failed result
    pub fn failed(report_id: impl Into<String>, failure: FailureKind) -> Self {
        Self {
            report_id: report_id.into(),
            outcome: LabelOutcome::Failed(failure),
        }
    }

    /// The record, if extraction succeeded
    pub fn record(&self) -> Option<&LabelRecord> {
        match &self.outcome {
            LabelOutcome::Labeled(record) => Some(record),
            LabelOutcome::Failed(_) => None,
        }
    }

    /// The failure marker, if extraction failed
    pub fn failure(&self) -> Option<&FailureKind> {
        match &self.outcome {
            LabelOutcome::Labeled(_) => None,
            LabelOutcome::Failed(failure) => Some(failure),
        }
    }

    /// Whether extraction succeeded
    pub fn is_labeled(&self) -> bool {
        matches!(self.outcome, LabelOutcome::Labeled(_))
    }
}
