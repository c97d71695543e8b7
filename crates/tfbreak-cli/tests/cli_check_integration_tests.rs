//! CLI end-to-end tests
//!
//! Run the built `tfbreak` binary against snapshot files and module
//! directories in a scratch directory and check output and exit codes.

use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn write_json(path: &Path, value: &Value) {
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// Old version has no inputs; new version adds required `region` at variables.tf:2.
fn setup(temp_dir: &TempDir, variables_tf: &str) {
    let root = temp_dir.path();
    write_json(&root.join("old.json"), &json!({}));
    write_json(
        &root.join("new.json"),
        &json!({
            "variables": {
                "region": {
                    "name": "region",
                    "type": "string",
                    "location": { "filename": "variables.tf", "line": 2 }
                }
            }
        }),
    );
    fs::create_dir_all(root.join("new")).unwrap();
    fs::write(root.join("new").join("variables.tf"), variables_tf).unwrap();
}

fn tfbreak(temp_dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tfbreak"))
        .current_dir(temp_dir.path())
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

const CHECK: &[&str] = &["check", "--old", "old.json", "--new", "new.json"];

#[test]
fn test_required_input_fails_check() {
    let temp_dir = TempDir::new().unwrap();
    setup(&temp_dir, "\nvariable \"region\" {}\n");

    let output = tfbreak(&temp_dir, CHECK);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("BC001 required-input-added variables.tf:2"));
    assert!(stdout.contains("Result: FAIL"));
}

#[test]
fn test_annotation_in_new_dir_passes_check() {
    let temp_dir = TempDir::new().unwrap();
    setup(
        &temp_dir,
        "# tfbreak:ignore required-input-added # region is documented as mandatory\nvariable \"region\" {}\n",
    );

    let mut args = CHECK.to_vec();
    args.extend(["--new-dir", "new", "--format", "json", "--show-ignored"]);
    let output = tfbreak(&temp_dir, &args);

    assert_eq!(output.status.code(), Some(0));
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["outcome"], "PASS");
    assert_eq!(report["findings"][0]["ignored"], true);
    assert_eq!(
        report["findings"][0]["ignore_reason"],
        "region is documented as mandatory"
    );
}

#[test]
fn test_config_file_disables_rule() {
    let temp_dir = TempDir::new().unwrap();
    setup(&temp_dir, "variable \"region\" {}\n");
    fs::write(
        temp_dir.path().join("tfbreak.toml"),
        "[rules]\ndisable = [\"required-input-added\"]\n",
    )
    .unwrap();

    let output = tfbreak(&temp_dir, CHECK);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_invalid_config_exits_with_error() {
    let temp_dir = TempDir::new().unwrap();
    setup(&temp_dir, "variable \"region\" {}\n");
    fs::write(temp_dir.path().join("bad.toml"), "fail_on = \"ERROR\"\n").unwrap();

    let mut args = CHECK.to_vec();
    args.extend(["--config", "bad.toml"]);
    let output = tfbreak(&temp_dir, &args);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_INVALID_SEVERITY"));
}

#[test]
fn test_missing_snapshot_exits_with_error() {
    let temp_dir = TempDir::new().unwrap();

    let output = tfbreak(&temp_dir, CHECK);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_IO"));
}

#[test]
fn test_plugin_findings_are_merged() {
    let temp_dir = TempDir::new().unwrap();
    setup(&temp_dir, "variable \"region\" {}\n");
    write_json(
        &temp_dir.path().join("plugin.json"),
        &json!([{
            "rule_id": "PL001",
            "rule_name": "naming-convention",
            "severity": "INFO",
            "message": "bucket name changed"
        }]),
    );

    let mut args = CHECK.to_vec();
    args.extend(["--plugin-findings", "plugin.json", "--format", "json"]);
    let output = tfbreak(&temp_dir, &args);

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = report["findings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["rule_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["BC001", "PL001"]);
}

#[test]
fn test_rules_and_explain_commands() {
    let temp_dir = TempDir::new().unwrap();

    let rules = tfbreak(&temp_dir, &["rules"]);
    assert_eq!(rules.status.code(), Some(0));
    let listing = String::from_utf8_lossy(&rules.stdout);
    assert_eq!(listing.lines().count(), 20);
    assert!(listing.lines().next().unwrap().starts_with("BC001  BREAKING"));

    let explain = tfbreak(&temp_dir, &["explain", "input-removed"]);
    assert_eq!(explain.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&explain.stdout).starts_with("BC002 input-removed (BREAKING)"));

    let unknown = tfbreak(&temp_dir, &["explain", "BC999"]);
    assert_eq!(unknown.status.code(), Some(2));
}
