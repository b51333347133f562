//! Label command implementation.

use crate::cli::LabelArgs;
use crate::config::Config;
use crate::error::Result;
use crate::input::{self, ReportInput};
use crate::output::Formatter;
use radlabel_domain::CompletionClient;
use radlabel_extractor::{Labeler, ResultStore};
use radlabel_llm::OllamaClient;
use std::fs;
use std::sync::Arc;
use tracing::info;

/// Execute the label command.
pub fn execute_label(args: LabelArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let schema = Arc::new(input::load_schema(args.schema.as_deref(), config)?);
    let reports = input::read_reports(&args.reports, args.id.as_deref())?;

    let mut ollama = config.ollama.clone();
    if let Some(model) = args.model {
        ollama.model = model;
    }
    if let Some(endpoint) = args.endpoint {
        ollama.endpoint = endpoint;
    }

    let labeler_config =
        super::labeler_config(&config.labeler, args.model_family.as_deref(), args.strict);
    let client = OllamaClient::new(ollama)?;
    let labeler = Labeler::from_config(client, schema, labeler_config)?;

    info!(
        "Labeling {} report(s) with model '{}' ({})",
        reports.len(),
        labeler.model_name(),
        labeler.config().model_family
    );

    let store = label_reports(&labeler, &reports)?;
    let output = formatter.results_json(&store, args.pretty)?;

    match args.output {
        Some(path) => {
            fs::write(&path, format!("{}\n", output))?;
            eprintln!("{}", formatter.success(&format!("Wrote {}", path.display())));
        }
        None => println!("{}", output),
    }

    for result in store.results() {
        if let Some(failure) = result.failure() {
            eprintln!("{}", formatter.error(&format!("{}: {}", result.report_id, failure)));
        }
    }

    let (labeled, failed) = store.tally();
    eprintln!("{}", formatter.summary(labeled, failed));

    Ok(())
}

/// Label reports one after another into a fresh store.
///
/// Per-report failures are recorded in the store, not returned.
pub fn label_reports<C>(labeler: &Labeler<C>, reports: &[ReportInput]) -> Result<ResultStore>
where
    C: CompletionClient,
{
    let store = ResultStore::new();
    for report in reports {
        labeler.label_into(&store, &report.id, &report.text)?;
    }
    Ok(store)
}
