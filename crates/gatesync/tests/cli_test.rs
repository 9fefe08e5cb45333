//! Integration tests for the `gatesync` CLI binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! and error handling — all without requiring live remote endpoints.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `gatesync` binary with env isolation.
///
/// Clears all `GATESYNC_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn gatesync_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("gatesync");
    cmd.env("HOME", "/tmp/gatesync-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/gatesync-test-nonexistent")
        .env_remove("GATESYNC_PROFILE")
        .env_remove("GATESYNC_ACCOUNT_ID")
        .env_remove("GATESYNC_API_KEY")
        .env_remove("GATESYNC_OUTPUT")
        .env_remove("GATESYNC_INSECURE")
        .env_remove("GATESYNC_TIMEOUT");
    cmd
}

/// Same isolation, but with config directories under a real tempdir.
fn gatesync_cmd_with_home(dir: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = gatesync_cmd();
    cmd.env("HOME", dir).env("XDG_CONFIG_HOME", dir);
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = gatesync_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(
        text.contains("Usage"),
        "Expected 'Usage' in output:\n{text}"
    );
}

#[test]
fn test_help_flag() {
    gatesync_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("allow-lists")
            .and(predicate::str::contains("sync"))
            .and(predicate::str::contains("serve"))
            .and(predicate::str::contains("lists")),
    );
}

#[test]
fn test_version_flag() {
    gatesync_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gatesync"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    gatesync_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    gatesync_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = gatesync_cmd().arg("foobar").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_sync_without_config() {
    gatesync_cmd().arg("sync").assert().failure().stderr(
        predicate::str::contains("Configuration").or(predicate::str::contains("config")),
    );
}

#[test]
fn test_lists_without_config() {
    gatesync_cmd()
        .args(["lists", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration").or(predicate::str::contains("config")));
}

#[test]
fn test_invalid_output_format() {
    let output = gatesync_cmd()
        .args(["--output", "invalid", "sync"])
        .output()
        .unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid output format"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid")
            || text.contains("possible values")
            || text.contains("valid value"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_invalid_serve_interval() {
    gatesync_cmd()
        .args(["serve", "--every", "notaduration"])
        .assert()
        .failure();
}

#[test]
fn test_global_flags_parsing() {
    // All flags should parse correctly — the failure should be about
    // missing configuration, not about argument parsing.
    gatesync_cmd()
        .args([
            "--output",
            "json",
            "--verbose",
            "--insecure",
            "--timeout",
            "60",
            "sync",
        ])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("Configuration").or(predicate::str::contains("config")),
        );
}

// ── Config subcommands ──────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    // `config show` uses load_config_or_default() so it succeeds even
    // when no config file exists — it just renders the default config.
    gatesync_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_config_profiles_empty() {
    gatesync_cmd()
        .args(["config", "profiles"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No profiles configured"));
}

#[test]
fn test_config_init_then_profiles() {
    let dir = tempfile::tempdir().unwrap();

    gatesync_cmd_with_home(dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stderr(predicate::str::contains("template written"));

    gatesync_cmd_with_home(dir.path())
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default *"));
}

#[test]
fn test_config_init_refuses_overwrite() {
    let dir = tempfile::tempdir().unwrap();

    gatesync_cmd_with_home(dir.path())
        .args(["config", "init"])
        .assert()
        .success();

    gatesync_cmd_with_home(dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_use_unknown_profile() {
    gatesync_cmd()
        .args(["config", "use", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

// ── Subcommand help discovery ───────────────────────────────────────

#[test]
fn test_sync_flags_exist() {
    gatesync_cmd()
        .args(["sync", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--store")
                .and(predicate::str::contains("--strategy"))
                .and(predicate::str::contains("--dry-run")),
        );
}

#[test]
fn test_lists_subcommands_exist() {
    gatesync_cmd()
        .args(["lists", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("list").and(predicate::str::contains("items")));
}

#[test]
fn test_serve_flags_exist() {
    gatesync_cmd()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--listen").and(predicate::str::contains("--every")));
}
