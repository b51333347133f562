//! Reading schema and report files.

use crate::config::Config;
use crate::error::{CliError, Result};
use radlabel_domain::SchemaSpec;
use std::collections::HashSet;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Path that stands for stdin.
pub const STDIN_PATH: &str = "-";

/// Report id used for a report read from stdin.
pub const STDIN_REPORT_ID: &str = "stdin";

/// One report to label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportInput {
    /// Report id recorded with the result
    pub id: String,

    /// Report body
    pub text: String,
}

/// Whether a path means stdin.
pub fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == STDIN_PATH
}

/// Default report id for a path: the file stem, or `stdin`.
pub fn report_id_for(path: &Path) -> Result<String> {
    if is_stdin(path) {
        return Ok(STDIN_REPORT_ID.to_string());
    }

    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .ok_or_else(|| {
            CliError::InvalidInput(format!("Cannot derive a report id from '{}'", path.display()))
        })
}

/// Read one report from a file or stdin.
pub fn read_report(path: &Path, id: Option<&str>) -> Result<ReportInput> {
    let text = if is_stdin(path) {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        text
    } else {
        fs::read_to_string(path)?
    };

    let id = match id {
        Some(id) => id.to_string(),
        None => report_id_for(path)?,
    };

    Ok(ReportInput { id, text })
}

/// Read every report named on the command line.
///
/// `--id` only applies to a single report, and stdin may only be named alone.
pub fn read_reports(paths: &[PathBuf], id: Option<&str>) -> Result<Vec<ReportInput>> {
    if paths.len() > 1 {
        if id.is_some() {
            return Err(CliError::InvalidInput(
                "--id can only be used with a single report".to_string(),
            ));
        }
        if paths.iter().any(|p| is_stdin(p)) {
            return Err(CliError::InvalidInput(
                "'-' (stdin) must be the only report".to_string(),
            ));
        }
    }

    let reports: Vec<ReportInput> = paths
        .iter()
        .map(|path| read_report(path, id))
        .collect::<Result<_>>()?;

    let mut seen = HashSet::with_capacity(reports.len());
    for report in &reports {
        if !seen.insert(report.id.as_str()) {
            return Err(CliError::InvalidInput(format!(
                "Two reports share the id '{}'",
                report.id
            )));
        }
    }

    Ok(reports)
}

/// Schema from `--schema`, falling back to the configured path.
pub fn load_schema(explicit: Option<&Path>, config: &Config) -> Result<SchemaSpec> {
    let path = explicit
        .or(config.schema_path.as_deref())
        .ok_or_else(|| {
            CliError::InvalidInput(
                "No schema given; pass --schema or set schema_path in the config".to_string(),
            )
        })?;

    let contents = fs::read_to_string(path)?;
    Ok(SchemaSpec::from_json(&contents)?)
}
