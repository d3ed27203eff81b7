use assert_cmd::prelude::*;
use serde_json::Value;
use std::path::Path;
use std::process::Command;

fn write_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("verify.yaml");
    let yaml = format!(
        "output_dir: {}\ntimeouts:\n  expect_ms: 1500\n  navigation_ms: 1500\nsimulation:\n  glitch_delay_ms: 200\n",
        dir.join("out").display()
    );
    std::fs::write(&path, yaml).unwrap();
    path
}

fn verify() -> Command {
    let bin = assert_cmd::cargo::cargo_bin!("storefront-verify");
    let mut cmd = Command::new(bin);
    cmd.env_remove("BASE_URL").env_remove("SAUCE_PASSWORD").env_remove("RUST_LOG");
    cmd
}

#[test]
fn personas_lists_catalog_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let assert = verify()
        .args(["--config", config.to_str().unwrap(), "--output", "json", "personas"])
        .assert()
        .success();

    let value: Value = serde_json::from_slice(&assert.get_output().stdout).expect("valid json");
    let personas = value.as_array().unwrap();
    assert_eq!(personas.len(), 4);
    assert_eq!(personas[1]["key"], "locked_out");
    assert_eq!(personas[3]["min_added_latency_ms"], 3000);
    assert!(personas[0].get("password").is_none());
}

#[test]
fn run_writes_results_and_persona_reports() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    verify()
        .args([
            "--config",
            config.to_str().unwrap(),
            "run",
            "--persona",
            "standard",
            "--persona",
            "locked_out",
        ])
        .assert()
        .success();

    let out = dir.path().join("out");
    let results: Value =
        serde_json::from_slice(&std::fs::read(out.join("results.json")).unwrap()).unwrap();
    assert_eq!(results["total"], 2);
    assert_eq!(results["failed"], 0);
    assert!(out.join("standard.json").exists());
    assert!(out.join("locked_out.json").exists());
    assert!(out.join("artifacts").join("standard-checkout-complete.png").exists());
}

#[test]
fn unknown_persona_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    verify()
        .args(["--config", config.to_str().unwrap(), "run", "--persona", "admin"])
        .assert()
        .failure();
}

#[test]
fn compare_reports_glitch_delta() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let assert = verify()
        .args(["--config", config.to_str().unwrap(), "--output", "json", "compare"])
        .assert()
        .success();

    let value: Value = serde_json::from_slice(&assert.get_output().stdout).expect("valid json");
    assert_eq!(value["step_id"], "submit-login");
    assert_eq!(value["candidate"], "performance_glitch");
    assert_eq!(value["candidate_slower"], true);
}
