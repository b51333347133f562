//! Output formatting for the CLI.

use crate::error::Result;
use colored::*;
use radlabel_extractor::{ResultStore, SystemPlacement, TemplateRegistry};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// Format the result collection as JSON.
    pub fn results_json(&self, store: &ResultStore, pretty: bool) -> Result<String> {
        let value = store.to_json()?;
        if pretty {
            Ok(serde_json::to_string_pretty(&value)?)
        } else {
            Ok(serde_json::to_string(&value)?)
        }
    }

    /// Format the registered model families as a table.
    pub fn templates_table(&self, registry: &TemplateRegistry, default_family: &str) -> String {
        if registry.is_empty() {
            return self.colorize("No model families registered.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Family", "System", "User turn", "Default"]);

        for name in registry.names() {
            let Some(template) = registry.get(name) else {
                continue;
            };
            let system = match &template.system {
                SystemPlacement::Turn { .. } => "turn",
                SystemPlacement::Delimited { .. } => "delimited",
                SystemPlacement::Merged { .. } => "merged",
            };
            let user_turn = format!("{:?} … {:?}", template.user_prefix, template.user_suffix);
            let marker = if name == default_family { "*" } else { "" };
            builder.push_record([name, system, user_turn.as_str(), marker]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Summary line for a labeling run.
    pub fn summary(&self, labeled: usize, failed: usize) -> String {
        let message = format!("Labeled {} report(s), {} failed", labeled, failed);
        if failed == 0 {
            self.success(&message)
        } else {
            self.warning(&message)
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radlabel_domain::{FailureKind, LabelRecord, LabeledResult};
    use serde_json::{json, Value};

    fn sample_store() -> ResultStore {
        let store = ResultStore::new();
        let mut record = LabelRecord::new();
        record.insert("pneumothorax", json!(false));
        store.record(LabeledResult::labeled("rpt-1", record)).unwrap();
        store
            .record(LabeledResult::failed("rpt-2", FailureKind::NoStructuredObjectFound))
            .unwrap();
        store
    }

    #[test]
    fn test_results_json_compact_and_pretty() {
        let formatter = Formatter::new(false);
        let store = sample_store();

        let compact = formatter.results_json(&store, false).unwrap();
        assert!(!compact.contains('\n'));

        let pretty = formatter.results_json(&store, true).unwrap();
        assert!(pretty.contains('\n'));

        let parsed: Value = serde_json::from_str(&pretty).unwrap();
        assert_eq!(parsed["rpt-1"]["labels"]["pneumothorax"], json!(false));
        assert_eq!(
            parsed["rpt-2"]["failure"]["kind"],
            json!("no_structured_object_found")
        );
    }

    #[test]
    fn test_templates_table() {
        let formatter = Formatter::new(false);
        let output = formatter.templates_table(&TemplateRegistry::builtin(), "chatml");
        assert!(output.contains("Family"));
        assert!(output.contains("llama2-chat"));
        assert!(output.contains("delimited"));
        assert!(output.contains("merged"));
    }

    #[test]
    fn test_empty_registry() {
        let formatter = Formatter::new(false);
        let output = formatter.templates_table(&TemplateRegistry::new(), "chatml");
        assert!(output.contains("No model families registered"));
    }

    #[test]
    fn test_summary() {
        let formatter = Formatter::new(false);
        assert_eq!(formatter.summary(3, 0), "✓ Labeled 3 report(s), 0 failed");
        assert_eq!(formatter.summary(2, 1), "⚠ Labeled 2 report(s), 1 failed");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(false);
        assert_eq!(formatter.error("boom"), "✗ boom");
    }
}
