//! Prompt command implementation.

use crate::cli::PromptArgs;
use crate::config::Config;
use crate::error::Result;
use crate::input;
use radlabel_domain::SchemaSpec;
use radlabel_extractor::{LabelerConfig, PromptComposer};
use std::sync::Arc;

/// Execute the prompt command.
pub fn execute_prompt(args: PromptArgs, config: &Config) -> Result<()> {
    let schema = input::load_schema(args.schema.as_deref(), config)?;
    let report = input::read_report(&args.report, None)?;
    let labeler_config = super::labeler_config(&config.labeler, args.model_family.as_deref(), false);

    println!("{}", compose_prompt(&schema, &report.text, &labeler_config)?);
    Ok(())
}

/// The prompt a labeling run would send for this report.
pub fn compose_prompt(
    schema: &SchemaSpec,
    report_text: &str,
    config: &LabelerConfig,
) -> Result<String> {
    let composer = PromptComposer::new(Arc::new(config.registry()));
    let request = config.prompt_request(&schema.render(), report_text);
    Ok(composer.compose(&request)?)
}
