//! CLI argument parsing tests for rmir
//!
//! Values are checked together with `--help` so that nothing is mirrored; clap validates every
//! argument before printing help.

use assert_cmd::Command;

#[test]
fn test_help_runs() {
    Command::cargo_bin("rmir")
        .unwrap()
        .arg("--help")
        .assert()
        .success();
}

#[test]
fn test_help_documents_daemon_umask() {
    Command::cargo_bin("rmir")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains("umask of 022"));
}

#[test]
fn test_version_runs() {
    Command::cargo_bin("rmir")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicates::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_arguments_fail() {
    Command::cargo_bin("rmir")
        .unwrap()
        .arg("--once")
        .assert()
        .failure();
}

// ============================================================================
// Interval Argument Parsing Tests
// ============================================================================

#[test]
fn test_interval_seconds() {
    Command::cargo_bin("rmir")
        .unwrap()
        .args(["--interval", "30", "--help"])
        .assert()
        .success();
}

#[test]
fn test_interval_human_readable() {
    Command::cargo_bin("rmir")
        .unwrap()
        .args(["-i", "1m 30s", "--help"])
        .assert()
        .success();
}

#[test]
fn test_interval_zero_rejected() {
    Command::cargo_bin("rmir")
        .unwrap()
        .args(["--interval", "0", "src", "dst"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("interval must be positive"));
}

#[test]
fn test_interval_garbage_rejected() {
    Command::cargo_bin("rmir")
        .unwrap()
        .args(["--interval", "soon", "src", "dst"])
        .assert()
        .failure();
}

// ============================================================================
// Size Threshold Argument Parsing Tests
// ============================================================================

#[test]
fn test_size_threshold_plain_bytes() {
    Command::cargo_bin("rmir")
        .unwrap()
        .args(["--size-threshold", "4096", "--help"])
        .assert()
        .success();
}

#[test]
fn test_size_threshold_with_unit() {
    Command::cargo_bin("rmir")
        .unwrap()
        .args(["-t", "64KiB", "--help"])
        .assert()
        .success();
}

#[test]
fn test_size_threshold_garbage_rejected() {
    Command::cargo_bin("rmir")
        .unwrap()
        .args(["--size-threshold", "lots", "src", "dst"])
        .assert()
        .failure();
}

// ============================================================================
// Flag Conflict Tests
// ============================================================================

#[test]
fn test_log_conflicts_with_syslog() {
    Command::cargo_bin("rmir")
        .unwrap()
        .args(["--log", "/tmp/rmir.log", "--syslog", "src", "dst"])
        .assert()
        .failure();
}

#[test]
fn test_daemon_conflicts_with_list() {
    Command::cargo_bin("rmir")
        .unwrap()
        .args(["--daemon", "--list", "src", "dst"])
        .assert()
        .failure();
}

#[test]
fn test_verbose_counts() {
    Command::cargo_bin("rmir")
        .unwrap()
        .args(["-vvv", "--help"])
        .assert()
        .success();
}
