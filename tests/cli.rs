//! CLI smoke tests against the compiled binary.
//!
//! Everything here runs offline: argument validation, stdin parsing,
//! and the aggregation short-circuit that needs no model call.

#![allow(clippy::panic)]

use assert_cmd::Command;
use predicates::prelude::*;

fn finpanel() -> Command {
    Command::cargo_bin("finpanel").unwrap_or_else(|e| panic!("binary not found: {e}"))
}

#[test]
fn help_lists_commands() {
    finpanel()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("aggregate"))
        .stdout(predicate::str::contains("init-prompts"));
}

#[test]
fn version_prints_crate_name() {
    finpanel()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("finpanel"));
}

#[test]
fn ask_requires_a_query() {
    finpanel()
        .arg("ask")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn aggregate_rejects_malformed_stdin() {
    finpanel()
        .env_remove("FINPANEL_PROVIDER")
        .arg("aggregate")
        .write_stdin("not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON input"));
}

#[test]
fn aggregate_empty_array_answers_offline() {
    finpanel()
        .env_remove("FINPANEL_PROVIDER")
        .arg("aggregate")
        .write_stdin("[]")
        .assert()
        .success()
        .stdout(predicate::str::contains("No information available."));
}

#[test]
fn init_prompts_writes_to_custom_dir() {
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir failed: {e}"));
    let target = dir.path().join("prompts");

    finpanel()
        .arg("init-prompts")
        .arg("--dir")
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("prompt template"));

    assert!(target.join("judge.md").exists());
    assert!(target.join("analyst.md").exists());
    assert!(target.join("aggregator.md").exists());
}
