//! Radlabel CLI - Label radiology reports with an LLM.

use clap::Parser;
use radlabel_cli::commands;
use radlabel_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "radlabel_cli=info,radlabel_extractor=info,radlabel_llm=info";
const VERBOSE_FILTER: &str = "radlabel_cli=debug,radlabel_extractor=debug,radlabel_llm=debug";

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable
    let filter = if cli.verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .compact()
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> radlabel_cli::Result<()> {
    let config_path = Config::resolve_path(cli.config.as_deref())?;

    match cli.command {
        Command::InitConfig(args) => {
            let formatter = Formatter::new(!cli.no_color);
            commands::execute_init_config(args, &config_path, &formatter)
        }
        Command::Label(args) => {
            let config = Config::load_from(&config_path)?;
            let formatter = formatter_for(cli.no_color, &config);
            commands::execute_label(args, &config, &formatter)
        }
        Command::Prompt(args) => {
            let config = Config::load_from(&config_path)?;
            commands::execute_prompt(args, &config)
        }
        Command::Templates => {
            let config = Config::load_from(&config_path)?;
            let formatter = formatter_for(cli.no_color, &config);
            commands::execute_templates(&config, &formatter)
        }
    }
}

fn formatter_for(no_color: bool, config: &Config) -> Formatter {
    Formatter::new(!no_color && config.settings.color)
}
