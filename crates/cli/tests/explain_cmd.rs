//! CLI tests for the `ged explain` subcommand.

use std::process::Command;

use assert_cmd::cargo;

fn ged_cmd() -> Command {
    Command::new(cargo::cargo_bin!("ged"))
}

#[test]
fn explain_known_code_json_returns_explanation() {
    let output = ged_cmd()
        .args(["explain", "GED1002", "--output", "json"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(json["id"], "GED1002");
    assert_eq!(json["severity"], "warn");
    assert!(json["explanation"].is_string());
}

#[test]
fn explain_unknown_code_json_returns_null_explanation() {
    let output = ged_cmd()
        .args(["explain", "GED9999", "--output", "json"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(json["id"], "GED9999");
    assert!(json["explanation"].is_null());
    assert!(json["severity"].is_null());
}

#[test]
fn explain_pretty_shows_human_readable_text() {
    let output = ged_cmd()
        .args(["explain", "GED1006", "--output", "pretty"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("GED1006") && stdout.contains(':'),
        "unexpected output: {stdout}"
    );
}
