//! # CLI Command Tests
//!
//! Runs each subcommand against a file-backed store in a temporary directory.

use clap::Parser;
use rollbook::cli::{Cli, Commands, cmd_bootstrap_admin, cmd_init, cmd_shell, cmd_status};
use rollbook::config::{AppConfig, BackendKind};
use rollbook::error::AppError;
use rollbook_core::{HashCost, RecordError};
use std::io::Cursor;

fn file_config(dir: &tempfile::TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.storage.backend = BackendKind::File;
    config.storage.path = Some(dir.path().join("records.json"));
    config.credentials = HashCost {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    };
    config
}

fn bootstrap(config: &AppConfig, input: &str) -> (Result<(), AppError>, String) {
    let mut output = Vec::new();
    let result = cmd_bootstrap_admin(
        config,
        "Head",
        "head",
        Cursor::new(input.as_bytes().to_vec()),
        &mut output,
    );
    (result, String::from_utf8(output).expect("utf8"))
}

#[test]
fn init_creates_store_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = file_config(&dir);

    let mut output = Vec::new();
    cmd_init(&config, &mut output).expect("init");

    assert!(dir.path().join("records.json").exists());
    let out = String::from_utf8(output).expect("utf8");
    assert!(out.contains("Initialized file store"));
    assert!(out.contains("Students: 0, admins: 0"));
}

#[test]
fn bootstrap_admin_only_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = file_config(&dir);

    let (result, out) = bootstrap(&config, "secret123\nsecret123\n");
    result.expect("first bootstrap");
    assert!(out.contains("Created administrator 'head' (id 1)."));

    let (result, _) = bootstrap(&config, "secret123\nsecret123\n");
    assert!(matches!(
        result,
        Err(AppError::Record(RecordError::InvalidInput(_)))
    ));
}

#[test]
fn bootstrap_admin_rejects_mismatch() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = file_config(&dir);

    let (result, _) = bootstrap(&config, "secret123\nsecret321\n");
    assert!(matches!(
        result,
        Err(AppError::Record(RecordError::PasswordMismatch))
    ));
}

#[test]
fn status_reports_counts_as_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = file_config(&dir);
    let (result, _) = bootstrap(&config, "secret123\nsecret123\n");
    result.expect("bootstrap");

    let mut output = Vec::new();
    cmd_status(&config, true, &mut output).expect("status");
    let value: serde_json::Value = serde_json::from_slice(&output).expect("json");

    assert_eq!(value["backend"], "file");
    assert_eq!(value["students"], 0);
    assert_eq!(value["admins"], 1);
}

#[test]
fn status_text_names_backend() {
    let config = AppConfig::default();
    let mut output = Vec::new();
    cmd_status(&config, false, &mut output).expect("status");
    let out = String::from_utf8(output).expect("utf8");
    assert!(out.contains("Backend:  memory"));
    assert!(out.contains("Admins:   0"));
}

#[test]
fn shell_command_persists_to_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = file_config(&dir);
    let (result, _) = bootstrap(&config, "secret123\nsecret123\n");
    result.expect("bootstrap");

    let script = "1\nhead\nsecret123\n1\n1\n5\nMeera\n18\nI\nCIVIL\n1\nSurvey\n75\n6\n4\n";
    let mut output = Vec::new();
    let input = Cursor::new(script.as_bytes().to_vec());
    cmd_shell(&config, true, input, &mut output).expect("shell");

    let mut output = Vec::new();
    cmd_status(&config, true, &mut output).expect("status");
    let value: serde_json::Value = serde_json::from_slice(&output).expect("json");
    assert_eq!(value["students"], 1);
}

#[test]
fn parses_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "rollbook",
        "status",
        "--json",
        "--backend",
        "redb",
        "--database",
        "db.redb",
    ])
    .expect("parse");

    assert_eq!(cli.backend.as_deref(), Some("redb"));
    assert!(matches!(cli.command, Some(Commands::Status { json: true })));
    let overrides = cli.overrides();
    assert_eq!(
        overrides.database.as_deref(),
        Some(std::path::Path::new("db.redb"))
    );
}
