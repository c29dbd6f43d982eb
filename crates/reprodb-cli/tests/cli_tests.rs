//! CLI integration tests for reprodb.
//!
//! These tests verify command-line argument parsing, help output,
//! and exit codes for various error conditions. Nothing here talks
//! to a real database.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the reprodb binary.
fn cmd() -> Command {
    Command::cargo_bin("reprodb").unwrap()
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("migrate"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("reprodb"));
}

// =============================================================================
// Global Flags Tests
// =============================================================================

#[test]
fn test_config_flag_default() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("[default: reprodb.yaml]"));
}

#[test]
fn test_log_format_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--log-format"))
        .stdout(predicate::str::contains("[default: text]"));
}

#[test]
fn test_verbosity_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--verbosity"))
        .stdout(predicate::str::contains("[default: info]"));
}

#[test]
fn test_output_json_flag_exists() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--output-json"));
}

// =============================================================================
// Error Condition Tests
// =============================================================================

#[test]
fn test_missing_config_file_fails() {
    cmd()
        .args(["--config", "/nonexistent/reprodb.yaml", "migrate"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_invalid_yaml_config_fails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "database: [this, is, not, a, mapping]").unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "status"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_config_missing_required_field_fails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "database:\n  host: ''\n  database: reproducibledb\n  user: jenkins"
    )
    .unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "migrate"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("database.host"));
}

#[test]
fn test_invalid_verbosity_fails() {
    cmd()
        .args(["--verbosity", "chatty", "status"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("invalid verbosity"));
}

#[test]
fn test_invalid_log_format_fails() {
    cmd()
        .args(["--log-format", "xml", "status"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("invalid log format"));
}

#[test]
fn test_unknown_subcommand_fails() {
    cmd().arg("frobnicate").assert().failure();
}
