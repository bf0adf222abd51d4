//! Smoke tests for the navprobe CLI
//!
//! These tests run the built binary end to end against the simulated site.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the navprobe binary
fn navprobe() -> Command {
    let mut cmd = Command::cargo_bin("navprobe").expect("navprobe binary should exist");
    cmd.env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    navprobe()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    navprobe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("graph"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_no_args_shows_help() {
    navprobe().assert().failure(); // Requires a subcommand
}

// ============================================================================
// Run Tests
// ============================================================================

#[test]
fn test_run_default() {
    navprobe()
        .args(["--color", "never", "run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("HOMEPAGE --"))
        .stdout(predicate::str::contains("Coverage Report"))
        .stdout(predicate::str::contains("PASS 30/30 steps, completed"));
}

#[test]
fn test_run_json_report() {
    let output = navprobe()
        .args(["run", "--steps", "5", "--seed", "9", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["budget"], 5);
    assert_eq!(report["trace"].as_array().unwrap().len(), 5);
    assert_eq!(report["trace"][0]["from"], "HOMEPAGE");
    assert_eq!(report["outcome"]["status"], "completed");
    assert_eq!(report["coverage"]["transitions"]["total"], 9);
}

#[test]
fn test_run_random_strategy() {
    navprobe()
        .args(["--color", "never", "run", "--strategy", "random", "--steps", "12"])
        .assert()
        .success()
        .stdout(predicate::str::contains("12/12 steps"));
}

#[test]
fn test_run_quiet_prints_nothing_on_success() {
    navprobe()
        .args(["-q", "run", "--steps", "4"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_run_zero_results_fails() {
    navprobe()
        .args(["--color", "never", "run", "--zero-results"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FAIL"))
        .stdout(predicate::str::contains("(failed)"))
        .stderr(predicate::str::contains("Run failed"))
        .stderr(predicate::str::contains("Search should return at least one result"));
}

#[test]
fn test_run_zero_results_json_still_prints_report() {
    let output = navprobe()
        .args(["run", "--zero-results", "--format", "json"])
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();
    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["outcome"]["status"], "failed");
    assert_eq!(report["outcome"]["kind"], "assertion_failure");
}

#[test]
fn test_run_rejects_unknown_strategy() {
    navprobe()
        .args(["run", "--strategy", "depth-first"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_run_with_config_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("site.yaml");
    fs::write(
        &path,
        "base_url: https://news.test/\nsearch_term: election\nwait:\n  timeout_ms: 100\n  poll_interval_ms: 10\n",
    )
    .unwrap();

    navprobe()
        .args(["run", "--steps", "6", "--format", "json", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"completed\""));
}

#[test]
fn test_run_with_missing_config_file() {
    navprobe()
        .args(["run", "--config", "/nonexistent/site.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

// ============================================================================
// Graph Tests
// ============================================================================

#[test]
fn test_graph_text() {
    navprobe()
        .args(["--color", "never", "graph"])
        .assert()
        .success()
        .stdout(predicate::str::contains("HOMEPAGE (initial)"))
        .stdout(predicate::str::contains("--filterResults--> FILTERED_SEARCH_PAGE"))
        .stdout(predicate::str::contains("graph is valid"));
}

#[test]
fn test_graph_dot() {
    navprobe()
        .args(["graph", "--format", "dot"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("digraph StateMachine {"))
        .stdout(predicate::str::contains(
            "\"HOMEPAGE\" -> \"ARTICLE_PAGE\" [label=\"clickArticle\"];",
        ));
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_defaults() {
    navprobe()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("abcnews.go.com"))
        .stdout(predicate::str::contains("search_term: manslaughter"))
        .stdout(predicate::str::contains("date_filter: Last Week"));
}

#[test]
fn test_config_rejects_invalid_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bad.yaml");
    fs::write(&path, "search_term: \"\"\n").unwrap();

    navprobe()
        .arg("config")
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config"));
}
