//! Core Labeler implementation

use crate::config::LabelerConfig;
use crate::error::ExtractorError;
use crate::parser::{extract_first_object, Extraction};
use crate::prompt::PromptComposer;
use crate::store::ResultStore;
use crate::template::TemplateRegistry;
use radlabel_domain::{
    CompletionClient, CompletionError, FailureKind, LabeledResult, SchemaSpec,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Longest slice of a failed completion echoed into the logs
const PREVIEW_CHARS: usize = 120;

/// The Labeler turns one report into one labeled result
///
/// compose prompt → complete → extract first JSON object → (conform)
///
/// Schema, templates and config are read-only after construction, so one
/// Labeler can serve many threads at once when the client allows it.
pub struct Labeler<C>
where
    C: CompletionClient,
{
    client: Arc<C>,
    schema: Arc<SchemaSpec>,
    composer: PromptComposer,
    schema_text: String,
    config: LabelerConfig,
}

impl<C> Labeler<C>
where
    C: CompletionClient,
{
    /// Create a new Labeler
    ///
    /// # Errors
    /// `Config` when the configuration fails validation
    pub fn new(
        client: C,
        schema: Arc<SchemaSpec>,
        registry: Arc<TemplateRegistry>,
        config: LabelerConfig,
    ) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;

        Ok(Self {
            client: Arc::new(client),
            schema_text: schema.render(),
            schema,
            composer: PromptComposer::new(registry),
            config,
        })
    }

    /// Create a Labeler whose registry is the built-in templates plus the
    /// ones declared in `config`
    pub fn from_config(
        client: C,
        schema: Arc<SchemaSpec>,
        config: LabelerConfig,
    ) -> Result<Self, ExtractorError> {
        let registry = Arc::new(config.registry());
        Self::new(client, schema, registry, config)
    }

    /// Schema in use
    pub fn schema(&self) -> &SchemaSpec {
        &self.schema
    }

    /// Configuration in use
    pub fn config(&self) -> &LabelerConfig {
        &self.config
    }

    /// Templates available to this Labeler
    pub fn registry(&self) -> &TemplateRegistry {
        self.composer.registry()
    }

    /// Model name reported by the completion client
    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// The exact prompt that [`Labeler::label`] would send for a report
    pub fn prompt_for(&self, report_text: &str) -> Result<String, ExtractorError> {
        let request = self.config.prompt_request(&self.schema_text, report_text);
        self.composer.compose(&request)
    }

    /// Label one report
    ///
    /// Never fails: every failure kind comes back as a marker in the result.
    pub fn label(&self, report_id: &str, report_text: &str) -> LabeledResult {
        let started = Instant::now();

        let prompt = match self.prompt_for(report_text) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!("Report '{}': {}", report_id, e);
                let failure = match e {
                    ExtractorError::UnsupportedModelFamily(family) => {
                        FailureKind::UnsupportedModelFamily(family)
                    }
                    other => FailureKind::GenerationFailure(other.to_string()),
                };
                return LabeledResult::failed(report_id, failure);
            }
        };

        debug!("Report '{}': prompt length {} chars", report_id, prompt.len());

        let completion = match self.client.complete(&prompt, &self.config.generation) {
            Ok(text) => text,
            Err(e) => {
                warn!("Report '{}': completion failed: {}", report_id, e);
                let failure = match e {
                    CompletionError::Timeout => FailureKind::Timeout,
                    CompletionError::GenerationFailure(detail) => {
                        FailureKind::GenerationFailure(detail)
                    }
                };
                return LabeledResult::failed(report_id, failure);
            }
        };

        debug!(
            "Report '{}': completion length {} chars",
            report_id,
            completion.len()
        );

        let record = match extract_first_object(&completion) {
            Extraction::Found { record, .. } => record,
            Extraction::NotFound => {
                warn!(
                    "Report '{}': no JSON object in completion: {:?}",
                    report_id,
                    preview(&completion)
                );
                return LabeledResult::failed(report_id, FailureKind::NoStructuredObjectFound);
            }
        };

        let report = self.schema.validate(&record);
        let record = if self.config.strict_validation {
            if !report.is_clean() {
                debug!(
                    "Report '{}': conforming record (unexpected {:?}, missing {:?}, mistyped {:?})",
                    report_id, report.unexpected, report.missing, report.mistyped
                );
            }
            self.schema.conform(&record)
        } else {
            if !report.unexpected.is_empty() {
                warn!(
                    "Report '{}': keys outside the schema passed through: {:?}",
                    report_id, report.unexpected
                );
            }
            record
        };

        info!(
            "Report '{}' labeled with {} findings in {} ms",
            report_id,
            record.len(),
            started.elapsed().as_millis()
        );

        LabeledResult::labeled(report_id, record)
    }

    /// Label one report and record the result
    ///
    /// The store is only touched before and after the completion call.
    ///
    /// # Errors
    /// `DuplicateReport` if the store already holds this id; the model is
    /// not called in that case
    pub fn label_into(
        &self,
        store: &ResultStore,
        report_id: &str,
        report_text: &str,
    ) -> Result<(), ExtractorError> {
        if store.contains(report_id) {
            return Err(ExtractorError::DuplicateReport(report_id.to_string()));
        }
        store.record(self.label(report_id, report_text))
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        text.to_string()
    } else {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radlabel_llm::MockClient;

    fn create_test_labeler(client: MockClient, config: LabelerConfig) -> Labeler<MockClient> {
        let schema = Arc::new(SchemaSpec::booleans(["pneumothorax", "pleural_effusion"]).unwrap());
        Labeler::from_config(client, schema, config).unwrap()
    }

    #[test]
    fn test_label_success() {
        let client = MockClient::new(r#"{"pneumothorax": true, "pleural_effusion": false}"#);
        let labeler = create_test_labeler(client, LabelerConfig::default());

        let result = labeler.label("rpt-1", "Small left apical pneumothorax.");
        let record = result.record().unwrap();
        assert_eq!(result.report_id, "rpt-1");
        assert_eq!(record.finding("pneumothorax"), Some(true));
        assert_eq!(record.finding("pleural_effusion"), Some(false));
    }

    #[test]
    fn test_prompt_carries_schema_and_report() {
        let client = MockClient::new("{}");
        let labeler = create_test_labeler(client.clone(), LabelerConfig::default());

        labeler.label("rpt-1", "Heart size normal.");
        let prompt = client.last_prompt().unwrap();
        assert!(prompt.starts_with("<s>[INST] <<SYS>>"));
        assert!(prompt.contains("Heart size normal."));
        assert!(prompt.contains(&labeler.schema().render()));
        assert_eq!(prompt, labeler.prompt_for("Heart size normal.").unwrap());
    }

    #[test]
    fn test_generation_options_forwarded() {
        let client = MockClient::new("{}");
        let mut config = LabelerConfig::default();
        config.generation.max_tokens = 77;
        let labeler = create_test_labeler(client.clone(), config);

        labeler.label("rpt-1", "text");
        assert_eq!(client.last_options().unwrap().max_tokens, 77);
    }

    #[test]
    fn test_unsupported_family_skips_model() {
        let client = MockClient::new("{}");
        let mut config = LabelerConfig::default();
        config.model_family = "falcon-chat".to_string();
        let labeler = create_test_labeler(client.clone(), config);

        let result = labeler.label("rpt-1", "text");
        assert_eq!(
            result.failure(),
            Some(&FailureKind::UnsupportedModelFamily("falcon-chat".to_string()))
        );
        assert_eq!(client.call_count(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = LabelerConfig::default();
        config.generation.top_p = 0.0;
        let schema = Arc::new(SchemaSpec::booleans(["edema"]).unwrap());
        let result = Labeler::from_config(MockClient::default(), schema, config);
        assert!(matches!(result, Err(ExtractorError::Config(_))));
    }

    #[test]
    fn test_permissive_passes_extra_keys() {
        let client = MockClient::new(r#"{"pneumothorx": true, "pleural_effusion": false}"#);
        let labeler = create_test_labeler(client, LabelerConfig::default());

        let result = labeler.label("rpt-1", "text");
        let record = result.record().unwrap();
        assert_eq!(record.finding("pneumothorx"), Some(true));
        assert!(record.get("pneumothorax").is_none());
    }

    #[test]
    fn test_strict_conforms_record() {
        let client = MockClient::new(r#"{"pneumothorx": true, "pleural_effusion": false}"#);
        let labeler = create_test_labeler(client, LabelerConfig::strict());

        let result = labeler.label("rpt-1", "text");
        let record = result.record().unwrap();
        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec!["pneumothorax", "pleural_effusion"]);
        assert_eq!(record.get("pneumothorax"), Some(&serde_json::Value::Null));
        assert_eq!(record.finding("pleural_effusion"), Some(false));
    }

    #[test]
    fn test_preview_truncates() {
        let long = "x".repeat(500);
        let short = preview(&long);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), PREVIEW_CHARS + 3);
        assert_eq!(preview("short"), "short");
    }
}
