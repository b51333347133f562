//! Templates command implementation.

use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the templates command.
pub fn execute_templates(config: &Config, formatter: &Formatter) -> Result<()> {
    let registry = config.labeler.registry();
    println!(
        "{}",
        formatter.templates_table(&registry, &config.labeler.model_family)
    );
    Ok(())
}
