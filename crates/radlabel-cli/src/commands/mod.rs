//! Command implementations.

pub mod init_config;
pub mod label;
pub mod prompt;
pub mod templates;

pub use self::init_config::execute_init_config;
pub use self::label::{execute_label, label_reports};
pub use self::prompt::{compose_prompt, execute_prompt};
pub use self::templates::execute_templates;

use radlabel_extractor::LabelerConfig;

/// Labeler configuration with command-line overrides applied.
pub(crate) fn labeler_config(
    base: &LabelerConfig,
    model_family: Option<&str>,
    strict: bool,
) -> LabelerConfig {
    let mut config = base.clone();
    if let Some(family) = model_family {
        config.model_family = family.to_string();
    }
    if strict {
        config.strict_validation = true;
    }
    config
}
