//! CLI integration tests for flow-cli
//!
//! Every test points `--config` into a temporary directory so the user's
//! own configuration is never read or written.

use std::path::Path;
use std::process::Command;

// PUSH1 1, PUSH1 4, CALLDATALOAD, ADD, PUSH1 0, MSTORE, PUSH1 32, PUSH1 0, RETURN
const INCREMENT_ARG: &str = "0x60016004350160005260206000f3";

fn run_flowevm(config: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_flowevm"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

fn call_data(arg: &str) -> String {
    format!("0xaabbccdd{:0>64}", arg)
}

// ==================== Help ====================

#[test]
fn test_cli_help() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_flowevm(&dir.path().join("config.toml"), &["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("run"));
    assert!(stdout.contains("analyze"));
    assert!(stdout.contains("config"));
}

// ==================== Run ====================

#[test]
fn test_run_prints_verdict_last() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_flowevm(
        &dir.path().join("config.toml"),
        &["run", "--code", INCREMENT_ARG, "--input", &call_data("5")],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("output: 0x{:0>64}", "6")));
    assert_eq!(stdout.lines().last(), Some("taint: potential overflow"));
}

#[test]
fn test_run_json_streams_steps_then_summary() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_flowevm(
        &dir.path().join("config.toml"),
        &["--json", "run", "--code", INCREMENT_ARG, "--input", &call_data("5")],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).expect("Invalid JSON line"))
        .collect();

    // nine instructions then the summary
    assert_eq!(lines.len(), 10);
    assert_eq!(lines[0]["opName"], "PUSH1");
    assert_eq!(lines[8]["opName"], "RETURN");
    let summary = &lines[9];
    assert_eq!(summary["status"], "returned");
    assert_eq!(summary["verdict"], "potential overflow");
}

#[test]
fn test_run_invalid_hex() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_flowevm(&dir.path().join("config.toml"), &["run", "--code", "0xzz"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid hex"));
}

#[test]
fn test_run_uses_configured_fork() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "fork = \"byzantium\"\n").unwrap();

    // PUSH1 1, PUSH1 1, SHL is invalid before Constantinople
    let output = run_flowevm(&config, &["run", "--code", "0x600160011b"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("status: faulted"));
}

#[test]
fn test_run_self_recursion_to_depth_limit() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "fork = \"homestead\"\n").unwrap();

    // SLOAD 0, ADD 1, SSTORE 0, then CALL self with all but 100 gas
    let code = "0x600054600101600055600060006000600060003060645a03f100";
    let output = run_flowevm(&config, &["run", "--code", code, "--gas", "20000000"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("status: stopped"));
}

// ==================== Analyze ====================

#[test]
fn test_analyze_triggers_potential_overflow() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_flowevm(
        &dir.path().join("config.toml"),
        &["analyze", "--code", INCREMENT_ARG, "--input", &call_data("5")],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[run 0 with value]"));
    assert_eq!(stdout.lines().last(), Some("taint: potential overflow triggered"));
}

#[test]
fn test_analyze_json() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_flowevm(
        &dir.path().join("config.toml"),
        &["--json", "analyze", "--code", INCREMENT_ARG, "--input", &call_data("5")],
    );
    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Invalid JSON");
    assert_eq!(json["result"], "potential overflow triggered");
    assert_eq!(json["overflow"], true);
    assert_eq!(json["attempts"].as_array().map(Vec::len), Some(4));
}

#[test]
fn test_analyze_respects_retry_cap() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "max_retry_args = 0\n").unwrap();

    let output = run_flowevm(
        &config,
        &["--json", "analyze", "--code", INCREMENT_ARG, "--input", &call_data("5")],
    );
    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Invalid JSON");
    // first run, max value run, and the selector-only variant
    assert_eq!(json["attempts"].as_array().map(Vec::len), Some(3));
    assert_eq!(json["result"], "potential overflow not triggered");
}

// ==================== Config ====================

#[test]
fn test_config_set_and_show() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    let output = run_flowevm(&config, &["config", "--set-gas-limit", "123456"]);
    assert!(output.status.success());
    assert!(config.exists());

    let output = run_flowevm(&config, &["--json", "config", "--show"]);
    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Invalid JSON");
    assert_eq!(json["gas_limit"], 123456);
    assert_eq!(json["fork"], "constantinople");
}

#[test]
fn test_config_rejects_unknown_fork() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    let output = run_flowevm(&config, &["--json", "config", "--set-fork", "paris"]);
    assert!(!output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Invalid JSON");
    assert_eq!(json["success"], false);
    assert!(!config.exists());
}
