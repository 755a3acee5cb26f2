//! CLI integration tests. None of these reach a remote endpoint.

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `lpscan` pointed at a config path that does not exist, so built-in
/// defaults apply regardless of the working directory.
fn lpscan(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("lpscan");
    cmd.arg("--config")
        .arg(dir.path().join("lpscan.toml"))
        .env_remove("RUST_LOG")
        .env_remove("LPSCAN_BSC_RPC_URL");
    cmd
}

#[test]
fn test_help() {
    let dir = TempDir::new().unwrap();
    lpscan(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("positions"))
        .stdout(predicate::str::contains("networks"))
        .stdout(predicate::str::contains("estimate"));
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    lpscan(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lpscan"));
}

#[test]
fn test_networks_lists_registry() {
    let dir = TempDir::new().unwrap();
    lpscan(&dir)
        .args(["networks", "--color", "never"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BNB Smart Chain"))
        .stdout(predicate::str::contains("42161"))
        .stdout(predicate::str::contains("PancakeSwap V3"));
}

#[test]
fn test_networks_json() {
    let dir = TempDir::new().unwrap();
    let output = lpscan(&dir).args(["--json", "networks"]).output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["command"], "networks");
    assert_eq!(value["networks"].as_array().unwrap().len(), 4);
}

#[test]
fn test_estimate_json() {
    let dir = TempDir::new().unwrap();
    let output = lpscan(&dir)
        .args(["--json", "estimate", "100", "--concurrency", "10"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let estimate = &value["estimate"];
    assert_eq!(estimate["positions"], 100);
    assert_eq!(estimate["concurrency"], 10);
    let sequential = value["sequential_total_secs"].as_f64().unwrap();
    let concurrent = value["concurrent_total_secs"].as_f64().unwrap();
    assert!((sequential - 80.0).abs() < 1e-9);
    assert!((concurrent - 8.0).abs() < 1e-9);
}

#[test]
fn test_estimate_human_output() {
    let dir = TempDir::new().unwrap();
    lpscan(&dir)
        .args(["estimate", "50", "--color", "never"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sequential"))
        .stdout(predicate::str::contains("Concurrent"));
}

#[test]
fn test_estimate_rejects_zero_concurrency() {
    let dir = TempDir::new().unwrap();
    lpscan(&dir)
        .args(["--json", "estimate", "100", "--concurrency", "0"])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("max_concurrent_requests"));
}

#[test]
fn test_config_validate_defaults() {
    let dir = TempDir::new().unwrap();
    lpscan(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn test_config_validate_rejects_bad_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("lpscan.toml"),
        "[concurrency]\nmax_concurrent_requests = 0\n",
    )
    .unwrap();

    lpscan(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_concurrent_requests"));
}

#[test]
fn test_positions_rejects_malformed_owner() {
    let dir = TempDir::new().unwrap();
    lpscan(&dir)
        .args(["positions", "not-an-address"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid address"));
}

#[test]
fn test_positions_rejects_disabled_network() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("lpscan.toml"),
        "[networks.polygon]\nenabled = false\n",
    )
    .unwrap();

    lpscan(&dir)
        .args([
            "positions",
            "0x000000000000000000000000000000000000dEaD",
            "--network",
            "polygon",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("disabled"));
}
