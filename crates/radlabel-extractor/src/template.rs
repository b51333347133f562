//! Chat templates keyed by model family
//!
//! Each model family expects its own turn delimiters. Templates are plain
//! data so a new family is one more registry entry (built in, or loaded from
//! a config file) rather than another branch in the composer.

use crate::error::ExtractorError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where the system instruction goes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SystemPlacement {
    /// A separate turn before the user turn (ChatML, Llama 3, Phi-3)
    Turn {
        /// Opens the system turn
        prefix: String,
        /// Closes the system turn
        suffix: String,
    },

    /// A delimited block at the start of the user turn (Llama 2 `<<SYS>>`)
    Delimited {
        /// Opens the system block
        prefix: String,
        /// Closes the system block
        suffix: String,
    },

    /// No system delimiter; the instruction is prepended to the user message
    Merged {
        /// Text between instruction and task prompt
        separator: String,
    },
}

/// Delimiters for one model family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTemplate {
    /// Model family name used as the registry key
    pub name: String,

    /// Beginning-of-sequence marker, if the model wants it spelled out
    #[serde(default)]
    pub bos: String,

    /// System instruction placement
    pub system: SystemPlacement,

    /// Opens the user turn
    pub user_prefix: String,

    /// Closes the user turn
    pub user_suffix: String,

    /// Opens the assistant turn the model completes
    #[serde(default)]
    pub assistant_prefix: String,
}

impl ChatTemplate {
    /// Wrap a task prompt and system instruction in this family's delimiters
    ///
    /// A blank system instruction emits no system block at all.
    pub fn render(&self, task_prompt: &str, system_instruction: &str) -> String {
        let system = system_instruction.trim();
        let mut prompt = String::with_capacity(
            self.bos.len() + system.len() + task_prompt.len() + 128,
        );

        prompt.push_str(&self.bos);

        if system.is_empty() {
            prompt.push_str(&self.user_prefix);
        } else {
            match &self.system {
                SystemPlacement::Turn { prefix, suffix } => {
                    prompt.push_str(prefix);
                    prompt.push_str(system);
                    prompt.push_str(suffix);
                    prompt.push_str(&self.user_prefix);
                }
                SystemPlacement::Delimited { prefix, suffix } => {
                    prompt.push_str(&self.user_prefix);
                    prompt.push_str(prefix);
                    prompt.push_str(system);
                    prompt.push_str(suffix);
                }
                SystemPlacement::Merged { separator } => {
                    prompt.push_str(&self.user_prefix);
                    prompt.push_str(system);
                    prompt.push_str(separator);
                }
            }
        }

        prompt.push_str(task_prompt);
        prompt.push_str(&self.user_suffix);
        prompt.push_str(&self.assistant_prefix);
        prompt
    }

    /// `<s>[INST] <<SYS>>\n...\n<</SYS>>\n\n... [/INST]`
    pub fn llama2_chat() -> Self {
        Self {
            name: "llama2-chat".to_string(),
            bos: "<s>".to_string(),
            system: SystemPlacement::Delimited {
                prefix: "<<SYS>>\n".to_string(),
                suffix: "\n<</SYS>>\n\n".to_string(),
            },
            user_prefix: "[INST] ".to_string(),
            user_suffix: " [/INST]".to_string(),
            assistant_prefix: String::new(),
        }
    }

    /// `<s>[INST] system\n\ntask [/INST]`; Mistral has no system role
    pub fn mistral_instruct() -> Self {
        Self {
            name: "mistral-instruct".to_string(),
            bos: "<s>".to_string(),
            system: SystemPlacement::Merged {
                separator: "\n\n".to_string(),
            },
            user_prefix: "[INST] ".to_string(),
            user_suffix: " [/INST]".to_string(),
            assistant_prefix: String::new(),
        }
    }

    /// `<|im_start|>role\n...<|im_end|>` turns
    pub fn chatml() -> Self {
        Self {
            name: "chatml".to_string(),
            bos: String::new(),
            system: SystemPlacement::Turn {
                prefix: "<|im_start|>system\n".to_string(),
                suffix: "<|im_end|>\n".to_string(),
            },
            user_prefix: "<|im_start|>user\n".to_string(),
            user_suffix: "<|im_end|>\n".to_string(),
            assistant_prefix: "<|im_start|>assistant\n".to_string(),
        }
    }

    /// Llama 3 header-id turns
    pub fn llama3_instruct() -> Self {
        Self {
            name: "llama3-instruct".to_string(),
            bos: "<|begin_of_text|>".to_string(),
            system: SystemPlacement::Turn {
                prefix: "<|start_header_id|>system<|end_header_id|>\n\n".to_string(),
                suffix: "<|eot_id|>".to_string(),
            },
            user_prefix: "<|start_header_id|>user<|end_header_id|>\n\n".to_string(),
            user_suffix: "<|eot_id|>".to_string(),
            assistant_prefix: "<|start_header_id|>assistant<|end_header_id|>\n\n".to_string(),
        }
    }

    /// `<|system|>...<|end|>` turns
    pub fn phi3() -> Self {
        Self {
            name: "phi3".to_string(),
            bos: String::new(),
            system: SystemPlacement::Turn {
                prefix: "<|system|>\n".to_string(),
                suffix: "<|end|>\n".to_string(),
            },
            user_prefix: "<|user|>\n".to_string(),
            user_suffix: "<|end|>\n".to_string(),
            assistant_prefix: "<|assistant|>\n".to_string(),
        }
    }
}

/// Chat templates by model family name
///
/// Read-only once handed to a composer; share it behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, ChatTemplate>,
}

impl TemplateRegistry {
    /// A registry with no templates
    pub fn new() -> Self {
        Self::default()
    }

    /// The families shipped with radlabel
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for template in [
            ChatTemplate::llama2_chat(),
            ChatTemplate::mistral_instruct(),
            ChatTemplate::chatml(),
            ChatTemplate::llama3_instruct(),
            ChatTemplate::phi3(),
        ] {
            registry.register(template);
        }
        registry
    }

    /// Add a template, replacing any existing one with the same name
    pub fn register(&mut self, template: ChatTemplate) -> Option<ChatTemplate> {
        self.templates.insert(template.name.clone(), template)
    }

    /// Add several templates
    pub fn with_templates(mut self, templates: impl IntoIterator<Item = ChatTemplate>) -> Self {
        for template in templates {
            self.register(template);
        }
        self
    }

    /// Look up a template
    pub fn get(&self, family: &str) -> Option<&ChatTemplate> {
        self.templates.get(family)
    }

    /// Look up a template, failing for unknown families
    pub fn resolve(&self, family: &str) -> Result<&ChatTemplate, ExtractorError> {
        self.get(family)
            .ok_or_else(|| ExtractorError::UnsupportedModelFamily(family.to_string()))
    }

    /// Registered family names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Number of registered families
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether no family is registered
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
