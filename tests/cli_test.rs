//! Integration tests for the toolwarden binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn setup_project(catalog: Option<&str>) -> TempDir {
    let temp = TempDir::new().unwrap();
    let data_dir = temp.path().join(".toolwarden");
    fs::create_dir_all(&data_dir).unwrap();
    if let Some(catalog) = catalog {
        fs::write(temp.path().join("tools.yml"), catalog).unwrap();
        fs::write(data_dir.join("config.yml"), "catalog: tools.yml\n").unwrap();
    }
    temp
}

fn toolwarden(temp: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("toolwarden"));
    cmd.current_dir(temp.path())
        .env_remove("TOOLWARDEN_PROJECT")
        .env_remove("TOOLWARDEN_CATALOG")
        .env("NO_COLOR", "1");
    cmd
}

const SHELL_CATALOG: &str = r#"
tools:
  - id: echoer
    name: Echoer
    install: { method: manual, instructions: "it ships with sh" }
    detection:
      - command: [sh, -c, "echo echoer 1.2.3"]
        output_contains: echoer
    display:
      - key: score
        label: Score
    run: [sh, -c, "echo '{\"score\": 42}'"]
  - id: ghost
    name: Ghost
    install: { method: manual, instructions: "Download ghost from its website" }
    detection:
      - command: toolwarden-test-no-such-binary --version
    run: toolwarden-test-no-such-binary scan
"#;

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("toolwarden"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("analysis tools"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("toolwarden"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_list_shows_builtin_catalog() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(None);
    toolwarden(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("greenframe"))
        .stdout(predicate::str::contains("semgrep"));
    Ok(())
}

#[test]
fn cli_catalog_flag_replaces_builtin() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(None);
    fs::write(temp.path().join("other.yml"), SHELL_CATALOG)?;
    toolwarden(&temp)
        .args(["list", "--catalog", "other.yml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("echoer"))
        .stdout(predicate::str::contains("greenframe").not());
    Ok(())
}

#[test]
fn cli_invalid_catalog_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(Some("tools: [unclosed"));
    toolwarden(&temp)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("catalog"));
    Ok(())
}

#[test]
fn cli_schema_prints_json() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(None);
    toolwarden(&temp)
        .arg("schema")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"tools\""));
    Ok(())
}

#[test]
fn cli_completions_bash() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(None);
    toolwarden(&temp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("toolwarden"));
    Ok(())
}

#[test]
fn cli_unknown_tool_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(None);
    toolwarden(&temp)
        .args(["check", "no-such-tool"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown tool: no-such-tool"));
    Ok(())
}

#[test]
fn cli_check_detects_real_tool() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(Some(SHELL_CATALOG));
    toolwarden(&temp)
        .args(["check", "echoer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Echoer is ready"))
        .stdout(predicate::str::contains("1.2.3"));
    Ok(())
}

#[test]
fn cli_check_missing_tool() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(Some(SHELL_CATALOG));
    toolwarden(&temp)
        .args(["check", "ghost"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Ghost is not installed"));
    Ok(())
}

#[test]
fn cli_run_prints_display_fields_and_logs() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(Some(SHELL_CATALOG));
    toolwarden(&temp)
        .args(["run", "echoer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Score"))
        .stdout(predicate::str::contains("42"));

    assert!(temp.path().join(".toolwarden/logs/echoer.jsonl").exists());

    toolwarden(&temp)
        .args(["logs", "echoer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("run"));
    Ok(())
}

#[test]
fn cli_run_blocked_when_not_installed() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(Some(SHELL_CATALOG));
    toolwarden(&temp)
        .args(["run", "ghost"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not installed"));
    Ok(())
}

#[test]
fn cli_install_manual_shows_instructions() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(Some(SHELL_CATALOG));
    toolwarden(&temp)
        .args(["install", "ghost"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Download ghost from its website"));

    let state = fs::read_to_string(temp.path().join(".toolwarden/state.json"))?;
    assert!(state.contains("lastError"));
    Ok(())
}

#[test]
fn cli_override_vanished_binary_is_flagged() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(Some(SHELL_CATALOG));
    toolwarden(&temp)
        .args(["override", "ghost", "toolwarden-test-no-such-binary", "run"])
        .assert()
        .success();

    // The custom command marks the tool installed, so it is usable until a run fails.
    toolwarden(&temp).args(["check", "ghost"]).assert().success();

    toolwarden(&temp)
        .args(["run", "ghost"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("toolwarden-test-no-such-binary"));

    let state = fs::read_to_string(temp.path().join(".toolwarden/state.json"))?;
    assert!(state.contains("detectionFailed"));
    assert!(state.contains("installationStatus"));
    Ok(())
}

#[test]
fn cli_logs_clear() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(Some(SHELL_CATALOG));
    toolwarden(&temp).args(["run", "echoer"]).assert().success();

    toolwarden(&temp)
        .args(["logs", "echoer", "--clear"])
        .assert()
        .success();

    toolwarden(&temp)
        .args(["logs", "echoer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No log entries"));
    Ok(())
}
