//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Radlabel - Label radiology reports with findings extracted by an LLM.
#[derive(Debug, Parser)]
#[command(name = "radlabel")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (defaults to ~/.radlabel/config.toml)
    #[arg(short, long, global = true, env = "RADLABEL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Label one or more report files and print the results as JSON
    Label(LabelArgs),

    /// Print the prompt that would be sent for a report, without calling the model
    Prompt(PromptArgs),

    /// List the registered model families
    Templates,

    /// Write the default configuration file
    InitConfig(InitConfigArgs),
}

/// Arguments for the label command.
#[derive(Debug, Parser)]
pub struct LabelArgs {
    /// Report files; `-` reads a single report from stdin
    #[arg(required = true)]
    pub reports: Vec<PathBuf>,

    /// Schema file (JSON object of finding name to type)
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// Report id, when labeling a single report (defaults to the file stem)
    #[arg(long)]
    pub id: Option<String>,

    /// Chat template to wrap the prompt in
    #[arg(short, long)]
    pub model_family: Option<String>,

    /// Model name on the completion service
    #[arg(long)]
    pub model: Option<String>,

    /// Completion service endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Conform every record to the schema
    #[arg(long)]
    pub strict: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Write the JSON output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the prompt command.
#[derive(Debug, Parser)]
pub struct PromptArgs {
    /// Report file; `-` reads stdin
    pub report: PathBuf,

    /// Schema file (JSON object of finding name to type)
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// Chat template to wrap the prompt in
    #[arg(short, long)]
    pub model_family: Option<String>,
}

/// Arguments for the init-config command.
#[derive(Debug, Parser)]
pub struct InitConfigArgs {
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_label() {
        let cli = Cli::try_parse_from([
            "radlabel",
            "label",
            "a.txt",
            "b.txt",
            "--schema",
            "schema.json",
            "--model-family",
            "chatml",
            "--strict",
        ])
        .unwrap();

        match cli.command {
            Command::Label(args) => {
                assert_eq!(args.reports, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
                assert_eq!(args.schema, Some(PathBuf::from("schema.json")));
                assert_eq!(args.model_family.as_deref(), Some("chatml"));
                assert!(args.strict);
                assert!(!args.pretty);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_label_requires_a_report() {
        assert!(Cli::try_parse_from(["radlabel", "label", "--schema", "s.json"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["radlabel", "templates", "--verbose", "--no-color"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.no_color);
        assert!(matches!(cli.command, Command::Templates));
    }

    #[test]
    fn test_parse_init_config() {
        let cli = Cli::try_parse_from(["radlabel", "init-config", "--force"]).unwrap();
        assert!(matches!(cli.command, Command::InitConfig(InitConfigArgs { force: true })));
    }
}
