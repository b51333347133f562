//! Integration tests for the radlabel CLI
//!
//! These run the built binary against files in a temporary directory. Only
//! commands that never reach a completion service are exercised here, plus a
//! label run pointed at a closed port.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const SCHEMA: &str = r#"{
  "cardiomegaly": {"type": "boolean"},
  "lung_opacity": {"type": "boolean"},
  "pneumothorax": {"type": "boolean"},
  "pleural_effusion": {"type": "boolean"}
}"#;

fn radlabel(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_radlabel"))
        .arg("--config")
        .arg(config)
        .arg("--no-color")
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("HTTP_PROXY")
        .env_remove("http_proxy")
        .env_remove("ALL_PROXY")
        .env_remove("all_proxy")
        .output()
        .unwrap()
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_init_config_then_templates() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");

    let output = radlabel(&config, &["init-config"]);
    assert!(output.status.success());
    assert!(config.exists());

    let again = radlabel(&config, &["init-config"]);
    assert!(!again.status.success());
    assert!(String::from_utf8_lossy(&again.stderr).contains("--force"));

    let output = radlabel(&config, &["templates"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for family in ["chatml", "llama2-chat", "llama3-instruct", "mistral-instruct", "phi3"] {
        assert!(stdout.contains(family), "missing {}", family);
    }
}

#[test]
fn test_templates_from_config_file() {
    let dir = TempDir::new().unwrap();
    let config = write(
        &dir,
        "config.toml",
        r#"
[labeler]
model_family = "gemma"

[[labeler.templates]]
name = "gemma"
user_prefix = "<start_of_turn>user\n"
user_suffix = "<end_of_turn>\n"
assistant_prefix = "<start_of_turn>model\n"
system = { mode = "merged", separator = "\n\n" }
"#,
    );

    let output = radlabel(&config, &["templates"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("gemma"));
}

#[test]
fn test_prompt_dry_run() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("absent.toml");
    let schema = write(&dir, "schema.json", SCHEMA);
    let report = write(&dir, "rpt-001.txt", "No pneumothorax or effusion. Normal study.");

    let output = radlabel(
        &config,
        &[
            "prompt",
            report.to_str().unwrap(),
            "--schema",
            schema.to_str().unwrap(),
        ],
    );
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("<s>[INST] <<SYS>>\n"));
    assert!(stdout.contains("```\nNo pneumothorax or effusion. Normal study.\n```"));
    assert!(stdout.contains(r#""pleural_effusion": {"type": "boolean"}"#));
    assert!(stdout.trim_end().ends_with("[/INST]"));
}

#[test]
fn test_prompt_unknown_family_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("absent.toml");
    let schema = write(&dir, "schema.json", SCHEMA);
    let report = write(&dir, "rpt.txt", "Normal.");

    let output = radlabel(
        &config,
        &[
            "prompt",
            report.to_str().unwrap(),
            "--schema",
            schema.to_str().unwrap(),
            "--model-family",
            "bloom",
        ],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("bloom"));
}

#[test]
fn test_label_without_schema_fails() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("absent.toml");
    let report = write(&dir, "rpt.txt", "Normal.");

    let output = radlabel(&config, &["label", report.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Error: "));
}

#[test]
fn test_label_with_unreachable_service_records_failures() {
    let dir = TempDir::new().unwrap();
    let config = write(
        &dir,
        "config.toml",
        r#"
[ollama]
endpoint = "http://127.0.0.1:9"
timeout_secs = 5
"#,
    );
    let schema = write(&dir, "schema.json", SCHEMA);
    let first = write(&dir, "rpt-001.txt", "Normal study.");
    let second = write(&dir, "rpt-002.txt", "Small right effusion.");

    let output = radlabel(
        &config,
        &[
            "label",
            first.to_str().unwrap(),
            second.to_str().unwrap(),
            "--schema",
            schema.to_str().unwrap(),
        ],
    );
    assert!(output.status.success());

    let results: Value = serde_json::from_slice(&output.stdout).unwrap();
    for id in ["rpt-001", "rpt-002"] {
        assert_eq!(results[id]["failure"]["kind"], "generation_failure", "{}", id);
    }
    assert!(String::from_utf8_lossy(&output.stderr).contains("2 failed"));
}
