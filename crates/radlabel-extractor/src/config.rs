//! Configuration for the Labeler

use crate::template::{ChatTemplate, TemplateRegistry};
use crate::types::PromptRequest;
use radlabel_domain::GenerationOptions;
use serde::{Deserialize, Serialize};

/// Default role instruction for the system slot
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are an expert radiologist. \
You read radiology reports and extract structured findings. \
Answer only with a JSON object that follows the given schema.";

/// Default task instructions appended after the schema
pub const DEFAULT_INSTRUCTIONS: &str = "Set a finding to true only when the report states it is present. \
Set it to false when the report states it is absent or does not mention it. \
Do not add keys that are not in the schema.";

/// Default model family
pub const DEFAULT_MODEL_FAMILY: &str = "llama2-chat";

/// Configuration for the Labeler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelerConfig {
    /// Registry key of the chat template to use
    pub model_family: String,

    /// Role instruction; blank omits the system block
    pub system_instruction: String,

    /// Extra task instructions appended after the schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,

    /// Conform records to the schema instead of passing model keys through
    pub strict_validation: bool,

    /// Sampling parameters sent with every prompt
    pub generation: GenerationOptions,

    /// Additional chat templates, registered over the built-in ones
    pub templates: Vec<ChatTemplate>,
}

impl LabelerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model_family.trim().is_empty() {
            return Err("model_family cannot be empty".to_string());
        }
        self.generation.validate()?;
        if let Some(template) = self.templates.iter().find(|t| t.name.trim().is_empty()) {
            return Err(format!(
                "template name cannot be empty (user_prefix {:?})",
                template.user_prefix
            ));
        }
        Ok(())
    }

    /// Built-in templates plus the ones declared here
    pub fn registry(&self) -> TemplateRegistry {
        TemplateRegistry::builtin().with_templates(self.templates.iter().cloned())
    }

    /// Prompt inputs for one report under this configuration
    pub fn prompt_request(&self, schema_text: &str, report_text: &str) -> PromptRequest {
        PromptRequest {
            system_instruction: self.system_instruction.clone(),
            schema_text: schema_text.to_string(),
            report_text: report_text.to_string(),
            instructions: self.instructions.clone(),
            model_family: self.model_family.clone(),
        }
    }

    /// Strict preset: records are conformed to the schema
    pub fn strict() -> Self {
        Self {
            strict_validation: true,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for LabelerConfig {
    /// Permissive Llama 2 chat configuration
    fn default() -> Self {
        Self {
            model_family: DEFAULT_MODEL_FAMILY.to_string(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            instructions: Some(DEFAULT_INSTRUCTIONS.to_string()),
            strict_validation: false,
            generation: GenerationOptions::default(),
            templates: Vec::new(),
        }
    }
}
