//! End-to-end CLI checks that need no network: help, version, and the
//! validation paths that fail before any remote call.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const CONFIG: &str = "\
project:
  owner: acme
  number: 3
repositories:
  - acme/widgets
fields:
  status:
    field: Status
    values:
      backlog: Backlog
";

/// A working directory with a valid `.pmu.yml` and a dummy token so
/// commands get past setup and fail on local validation only.
fn configured_cmd(tmp: &TempDir) -> Command {
    fs::write(tmp.path().join(".pmu.yml"), CONFIG).unwrap();
    let mut cmd = Command::cargo_bin("pmu").unwrap();
    cmd.current_dir(tmp.path())
        .env("GITHUB_TOKEN", "dummy-token")
        .env_remove("GH_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("pmu")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sub"))
        .stdout(predicate::str::contains("move"))
        .stdout(predicate::str::contains("split"));
}

#[test]
fn version_prints_package_version() {
    Command::cargo_bin("pmu")
        .unwrap()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pmu version"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn version_json_is_structured() {
    let output = Command::cargo_bin("pmu")
        .unwrap()
        .args(["version", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn missing_config_is_reported() {
    let tmp = TempDir::new().unwrap();
    Command::cargo_bin("pmu")
        .unwrap()
        .current_dir(tmp.path())
        .env("GITHUB_TOKEN", "dummy-token")
        .args(["sub", "add", "1", "2"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(".pmu.yml"));
}

#[test]
fn missing_token_is_reported_before_any_request() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".pmu.yml"), CONFIG).unwrap();
    Command::cargo_bin("pmu")
        .unwrap()
        .current_dir(tmp.path())
        .env_remove("GITHUB_TOKEN")
        .env_remove("GH_TOKEN")
        .arg("list")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not authenticated"));
}

#[test]
fn move_requires_a_field_change() {
    let tmp = TempDir::new().unwrap();
    configured_cmd(&tmp)
        .args(["move", "1"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("at least one field change"));
}

#[test]
fn move_rejects_malformed_field_pair() {
    let tmp = TempDir::new().unwrap();
    configured_cmd(&tmp)
        .args(["move", "1", "--field", "nodelimiter"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("key=value"));
}

#[test]
fn split_requires_a_task_source() {
    let tmp = TempDir::new().unwrap();
    configured_cmd(&tmp)
        .args(["split", "5"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--from-body"));
}

#[test]
fn bad_issue_reference_is_rejected() {
    let tmp = TempDir::new().unwrap();
    configured_cmd(&tmp)
        .args(["sub", "add", "abc", "2"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid issue reference"));
}

#[test]
fn unknown_relation_is_rejected() {
    let tmp = TempDir::new().unwrap();
    configured_cmd(&tmp)
        .args(["sub", "list", "1", "--relation", "cousins"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unknown relation"));
}
