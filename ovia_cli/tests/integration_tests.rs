//! Integration tests for the ovia binary.
//!
//! These tests verify end-to-end behavior including:
//! - Registration and document creation
//! - Cycle calendar projection and CSV export
//! - Pregnancy save / show / clear
//! - Error reporting for missing or invalid data

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// CLI command isolated from the user's real config file
fn cli(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ovia").expect("Failed to find ovia binary");
    cmd.env("XDG_CONFIG_HOME", dir.join("config"))
        .arg("--data-dir")
        .arg(dir.join("data"));
    cmd
}

fn register(dir: &Path) -> String {
    let output = cli(dir)
        .args(["register", "--name", "Ada", "--email", "ada@example.com"])
        .output()
        .expect("Failed to run register");
    assert!(output.status.success());
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("Failed to run command");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Menstrual cycle and pregnancy tracker",
        ));
}

#[test]
fn test_register_creates_document() {
    let temp_dir = setup_test_dir();
    let user = register(temp_dir.path());

    let doc_path = temp_dir.path().join("data/users").join(format!("{}.json", user));
    let doc: Value = serde_json::from_str(&fs::read_to_string(doc_path).unwrap()).unwrap();
    assert_eq!(doc["name"], "Ada");
    assert_eq!(doc["email"], "ada@example.com");
    assert!(doc["createdAt"].is_string());
}

#[test]
fn test_register_requires_name() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path())
        .args(["register", "--name", "", "--email", "ada@example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("All fields are required"));
}

#[test]
fn test_cycle_set_and_show() {
    let temp_dir = setup_test_dir();
    let user = register(temp_dir.path());

    cli(temp_dir.path())
        .args(["cycle", "set", "--user", &user, "--last-period-date", "2024-01-01"])
        .args(["--cycle-length", "28", "--period-duration", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cycle data saved"));

    let json = stdout_json(
        cli(temp_dir.path()).args(["cycle", "show", "--user", &user, "--today", "2024-01-03"]),
    );

    assert_eq!(json["currentPhase"], "Menstrual");
    assert_eq!(json["currentDayInCycle"], 3);
    assert_eq!(json["cycleLength"], 28);
    assert_eq!(json["periodDays"][0], "2024-01-01");
    assert_eq!(json["periodDays"][4], "2024-01-05");
    assert_eq!(json["ovulationDays"][0], "2024-01-15");
    assert_eq!(json["fertileWindow"][0], "2024-01-13");
    assert_eq!(json["ovulationDays"].as_array().unwrap().len(), 12);
}

#[test]
fn test_cycle_show_outside_horizon() {
    let temp_dir = setup_test_dir();
    let user = register(temp_dir.path());

    cli(temp_dir.path())
        .args(["cycle", "set", "--user", &user, "--last-period-date", "2024-01-01"])
        .assert()
        .success();

    let json = stdout_json(
        cli(temp_dir.path()).args(["cycle", "show", "--user", &user, "--today", "2026-01-01"]),
    );
    assert_eq!(json["currentPhase"], "Unknown");
    assert!(json["currentDayInCycle"].is_null());
}

#[test]
fn test_cycle_show_without_data_fails() {
    let temp_dir = setup_test_dir();
    let user = register(temp_dir.path());

    cli(temp_dir.path())
        .args(["cycle", "show", "--user", &user])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NotFound"));
}

#[test]
fn test_cycle_set_rejects_zero_length() {
    let temp_dir = setup_test_dir();
    let user = register(temp_dir.path());

    cli(temp_dir.path())
        .args(["cycle", "set", "--user", &user, "--last-period-date", "2024-01-01"])
        .args(["--cycle-length", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cycleLength"));
}

#[test]
fn test_cycle_length_limits() {
    let temp_dir = setup_test_dir();
    let user = register(temp_dir.path());

    cli(temp_dir.path())
        .args(["cycle", "set", "--user", &user, "--last-period-date", "2024-01-01"])
        .args(["--cycle-length", "365", "--period-duration", "365"])
        .assert()
        .success();

    let json = stdout_json(
        cli(temp_dir.path()).args(["cycle", "show", "--user", &user, "--today", "2024-01-03"]),
    );
    assert_eq!(json["cycleLength"], 365);
    assert_eq!(json["ovulationDays"][0], "2024-12-17");

    for length in ["366", "4294967295"] {
        cli(temp_dir.path())
            .args(["cycle", "set", "--user", &user, "--last-period-date", "2024-01-01"])
            .args(["--cycle-length", length])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Validation"));
    }
}

#[test]
fn test_weeks_pregnant_limits() {
    let temp_dir = setup_test_dir();
    let user = register(temp_dir.path());

    let saved = stdout_json(cli(temp_dir.path()).args([
        "pregnancy", "set", "--user", &user, "--weeks", "52", "--today", "2024-06-01",
    ]));
    assert_eq!(saved["lmp"], "2023-06-03T00:00:00.000Z");

    for weeks in ["53", "4294967295"] {
        cli(temp_dir.path())
            .args(["pregnancy", "set", "--user", &user, "--weeks", weeks])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Validation"))
            .stderr(predicate::str::contains("panicked").not());
    }
}

#[test]
fn test_cycle_export_csv() {
    let temp_dir = setup_test_dir();
    let user = register(temp_dir.path());
    let out = temp_dir.path().join("exports/calendar.csv");

    cli(temp_dir.path())
        .args(["cycle", "set", "--user", &user, "--last-period-date", "2024-01-01"])
        .assert()
        .success();

    cli(temp_dir.path())
        .args(["cycle", "export", "--user", &user, "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 132 calendar days"));

    let csv = fs::read_to_string(&out).unwrap();
    assert!(csv.starts_with("cycle,date,kind\n0,2024-01-01,period\n"));
    assert!(csv.contains("0,2024-01-15,ovulation"));
}

#[test]
fn test_pregnancy_set_from_weeks_and_show() {
    let temp_dir = setup_test_dir();
    let user = register(temp_dir.path());

    let saved = stdout_json(cli(temp_dir.path()).args([
        "pregnancy", "set", "--user", &user, "--weeks", "10", "--today", "2024-06-01",
    ]));
    assert_eq!(saved["isPregnant"], true);
    assert_eq!(saved["weeksPregnant"], 10);
    assert_eq!(saved["lmp"], "2024-03-23T00:00:00.000Z");
    assert_eq!(saved["dueDate"], "2024-12-28T00:00:00.000Z");

    let status = stdout_json(cli(temp_dir.path()).args([
        "pregnancy", "show", "--user", &user, "--today", "2024-06-01",
    ]));
    assert_eq!(status["weeksPregnant"], 10);
    assert_eq!(status["daysRemaining"], 210);
    assert_eq!(status["percentageProgress"], 25);
    assert_eq!(status["trimester"], "First");
    assert_eq!(status["lmp"], "2024-03-23");
    assert_eq!(status["dueDate"], "2024-12-28");
}

#[test]
fn test_pregnancy_set_from_due_date() {
    let temp_dir = setup_test_dir();
    let user = register(temp_dir.path());

    let saved = stdout_json(cli(temp_dir.path()).args([
        "pregnancy", "set", "--user", &user, "--due-date", "2024-12-28", "--today", "2024-09-14",
    ]));
    assert_eq!(saved["lmp"], "2024-03-23T00:00:00.000Z");
    assert_eq!(saved["weeksPregnant"], 25);
}

#[test]
fn test_pregnancy_set_requires_anchor() {
    let temp_dir = setup_test_dir();
    let user = register(temp_dir.path());

    cli(temp_dir.path())
        .args(["pregnancy", "set", "--user", &user])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation"));
}

#[test]
fn test_pregnancy_clear_hides_status() {
    let temp_dir = setup_test_dir();
    let user = register(temp_dir.path());

    cli(temp_dir.path())
        .args(["pregnancy", "set", "--user", &user, "--lmp", "2024-03-23"])
        .assert()
        .success();

    cli(temp_dir.path())
        .args(["pregnancy", "clear", "--user", &user])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pregnancy cleared"));

    cli(temp_dir.path())
        .args(["pregnancy", "show", "--user", &user])
        .assert()
        .failure();
}

#[test]
fn test_cycle_and_pregnancy_data_coexist() {
    let temp_dir = setup_test_dir();
    let user = register(temp_dir.path());

    cli(temp_dir.path())
        .args(["cycle", "set", "--user", &user, "--last-period-date", "2024-01-01"])
        .assert()
        .success();
    cli(temp_dir.path())
        .args(["pregnancy", "set", "--user", &user, "--lmp", "2024-03-23"])
        .assert()
        .success();

    let doc_path = temp_dir.path().join("data/users").join(format!("{}.json", user));
    let doc: Value = serde_json::from_str(&fs::read_to_string(doc_path).unwrap()).unwrap();
    assert_eq!(doc["name"], "Ada");
    assert_eq!(doc["lastPeriodDate"], "2024-01-01");
    assert_eq!(doc["cycleLength"], 28);
    assert_eq!(doc["isPregnant"], true);
}
