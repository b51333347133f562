//! LLM prompt composition for report labeling

use crate::error::ExtractorError;
use crate::template::TemplateRegistry;
use crate::types::PromptRequest;
use std::sync::Arc;

/// Builds the exact text sent to the completion service
///
/// Composition is pure: the same inputs always produce the same prompt.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    registry: Arc<TemplateRegistry>,
}

impl PromptComposer {
    /// Create a composer over a template registry
    pub fn new(registry: Arc<TemplateRegistry>) -> Self {
        Self { registry }
    }

    /// Templates this composer can apply
    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Build the model-agnostic task prompt
    ///
    /// Fixed order: fenced report, extraction request, schema, then any
    /// additional instructions (skipped when blank).
    pub fn build_task_prompt(
        report_text: &str,
        schema_text: &str,
        instructions: Option<&str>,
    ) -> String {
        let mut prompt = String::with_capacity(report_text.len() + schema_text.len() + 256);

        // 1. The report
        prompt.push_str(REPORT_INTRO);
        prompt.push_str("\n```\n");
        prompt.push_str(report_text);
        prompt.push_str("\n```\n");

        // 2. What to do with it
        prompt.push_str(EXTRACTION_REQUEST);
        prompt.push('\n');

        // 3. The schema
        prompt.push_str(schema_text);

        // 4. Optional extra guidance
        if let Some(instructions) = instructions.map(str::trim).filter(|s| !s.is_empty()) {
            prompt.push('\n');
            prompt.push_str(instructions);
        }

        prompt
    }

    /// Wrap a task prompt in the delimiters of a model family
    ///
    /// # Errors
    /// `UnsupportedModelFamily` when no template is registered for the
    /// family; there is no fallback template.
    pub fn apply_chat_template(
        &self,
        task_prompt: &str,
        system_instruction: &str,
        model_family: &str,
    ) -> Result<String, ExtractorError> {
        let template = self.registry.resolve(model_family)?;
        Ok(template.render(task_prompt, system_instruction))
    }

    /// Build the task prompt and apply the chat template in one step
    pub fn compose(&self, request: &PromptRequest) -> Result<String, ExtractorError> {
        let task_prompt = Self::build_task_prompt(
            &request.report_text,
            &request.schema_text,
            request.instructions.as_deref(),
        );
        self.apply_chat_template(
            &task_prompt,
            &request.system_instruction,
            &request.model_family,
        )
    }
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new(Arc::new(TemplateRegistry::builtin()))
    }
}

const REPORT_INTRO: &str = "Here is a radiology report:";

const EXTRACTION_REQUEST: &str =
    "Extract the findings from the report and answer with a JSON object that follows this schema:";
