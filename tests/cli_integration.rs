//! Integration tests for the placegate CLI.

#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn placegate_bin(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("placegate").expect("binary is built");
    cmd.current_dir(dir.path()).env_remove("PLACEGATE_API_KEY");
    cmd
}

#[test]
fn test_version_command() {
    let dir = TempDir::new().unwrap();
    placegate_bin(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("placegate"));
}

#[test]
fn test_help_command() {
    let dir = TempDir::new().unwrap();
    placegate_bin(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("lookup")
                .and(predicate::str::contains("stats"))
                .and(predicate::str::contains("clear-cache"))
                .and(predicate::str::contains("reset-limit")),
        );
}

#[test]
fn test_init_then_stats() {
    let dir = TempDir::new().unwrap();

    placegate_bin(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("initialized"));
    assert!(dir.path().join("placegate.toml").exists());

    placegate_bin(&dir)
        .args(["stats", "--json"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"maxSize\": 10")
                .and(predicate::str::contains("\"remaining\": 15")),
        );
}

#[test]
fn test_clear_cache_and_reset_limit() {
    let dir = TempDir::new().unwrap();

    placegate_bin(&dir)
        .arg("clear-cache")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cache cleared"));

    placegate_bin(&dir)
        .arg("reset-limit")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rate limit reset"));
}

#[test]
fn test_lookup_without_api_key_fails() {
    let dir = TempDir::new().unwrap();
    placegate_bin(&dir)
        .args(["lookup", "--type", "hotels", "--sw", "1.0,2.0", "--ne", "1.5,2.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key"));
}

#[test]
fn test_lookup_rejects_inverted_bounds() {
    let dir = TempDir::new().unwrap();
    placegate_bin(&dir)
        .args(["lookup", "--sw", "2.0,2.0", "--ne", "1.0,1.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidBounds"));
}

#[test]
fn test_lookup_rejects_blank_type() {
    let dir = TempDir::new().unwrap();
    for raw in ["", "foo bar"] {
        placegate_bin(&dir)
            .args(["lookup", "--type", raw, "--sw", "1,1", "--ne", "2,2"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid query type"));
    }
}
