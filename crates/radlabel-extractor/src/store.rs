//! Per-session collection of labeled results

use crate::error::ExtractorError;
use radlabel_domain::LabeledResult;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Labeled results keyed by report id, in recording order
///
/// Shareable across concurrent pipelines through `&self`. The lock covers a
/// single insert or lookup and is never held while a completion runs. Each
/// id can be written once; results are not mutated afterwards.
#[derive(Debug, Default)]
pub struct ResultStore {
    inner: Mutex<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    results: Vec<LabeledResult>,
    index: HashMap<String, usize>,
}

impl ResultStore {
    /// An empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a report's result
    ///
    /// # Errors
    /// `DuplicateReport` if the id already has a result; the first one is kept
    pub fn record(&self, result: LabeledResult) -> Result<(), ExtractorError> {
        let mut inner = self.lock();
        if inner.index.contains_key(&result.report_id) {
            return Err(ExtractorError::DuplicateReport(result.report_id));
        }

        let position = inner.results.len();
        inner.index.insert(result.report_id.clone(), position);
        inner.results.push(result);
        Ok(())
    }

    /// The result for a report, if recorded
    pub fn get(&self, report_id: &str) -> Option<LabeledResult> {
        let inner = self.lock();
        inner
            .index
            .get(report_id)
            .map(|&position| inner.results[position].clone())
    }

    /// Whether a report has a result
    pub fn contains(&self, report_id: &str) -> bool {
        self.lock().index.contains_key(report_id)
    }

    /// Number of recorded results
    pub fn len(&self) -> usize {
        self.lock().results.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.lock().results.is_empty()
    }

    /// Snapshot of all results in recording order
    pub fn results(&self) -> Vec<LabeledResult> {
        self.lock().results.clone()
    }

    /// Count of (labeled, failed) results
    pub fn tally(&self) -> (usize, usize) {
        let inner = self.lock();
        let labeled = inner.results.iter().filter(|r| r.is_labeled()).count();
        (labeled, inner.results.len() - labeled)
    }

    /// Output mapping: report id to `{"labels": ...}` or `{"failure": ...}`
    pub fn to_json(&self) -> Result<Value, ExtractorError> {
        let inner = self.lock();
        let mut output = Map::with_capacity(inner.results.len());
        for result in &inner.results {
            output.insert(result.report_id.clone(), serde_json::to_value(&result.outcome)?);
        }
        Ok(Value::Object(output))
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
