//! Integration tests for the `rgbledctl` binary.
//!
//! These run the binary against a temporary device directory, so no serial
//! hardware is needed.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs::File;

fn cli() -> assert_cmd::Command {
    cargo_bin_cmd!("rgbledctl")
}

fn device_dir(names: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in names {
        File::create(dir.path().join(name)).unwrap();
    }
    dir
}

#[test]
fn cli_help_succeeds() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("rgbledctl"));
}

#[test]
fn cli_version_prints_version() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn cli_list_filters_by_prefix() {
    let dir = device_dir(&["ttyACM0", "ttyUSB0", "ttyACM12"]);

    cli()
        .args(["list", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("[1]").and(predicate::str::contains("ttyACM0")))
        .stdout(predicate::str::contains("[2]").and(predicate::str::contains("ttyACM12")))
        .stdout(predicate::str::contains("ttyUSB0").not());
}

#[test]
fn cli_list_json_produces_valid_json() {
    let dir = device_dir(&["ttyACM0", "ttyUSB0"]);

    let output = cli()
        .args(["list", "--json", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value =
        serde_json::from_slice(&output).expect("list --json should produce valid JSON");
    let devices = json.as_array().expect("JSON output should be an array");
    assert_eq!(devices.len(), 1);
    assert!(devices[0].as_str().unwrap().ends_with("ttyACM0"));
}

#[test]
fn cli_list_empty_dir() {
    let dir = device_dir(&[]);

    cli()
        .args(["list", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No devices found!"));
}

#[test]
fn cli_send_rejects_malformed_color() {
    let dir = device_dir(&["ttyACM0"]);

    cli()
        .args(["send", "#12345", "--dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid color"));
}

#[test]
fn cli_send_without_devices_fails() {
    let dir = device_dir(&[]);

    cli()
        .args(["send", "255,0,128", "--dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No serial devices found"));
}

#[test]
fn cli_console_without_devices_fails() {
    let dir = device_dir(&[]);

    cli()
        .args(["console", "--dir"])
        .arg(dir.path())
        .write_stdin("\n")
        .assert()
        .failure()
        .stdout(predicate::str::contains("No devices found!"));
}
