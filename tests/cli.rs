use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

#[test]
fn link_budget_prints_a_table_with_advisories() {
    Command::cargo_bin("link_budget")
        .expect("link_budget bin")
        .args(["--scenario", "configs/link", "--name", "s-band leo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("=== Link Budget: S-band LEO ==="))
        .stdout(predicate::str::contains("negative"))
        .stdout(predicate::str::contains("Increase antenna gain"));
}

#[test]
fn link_budget_json_is_machine_readable() {
    let output = Command::cargo_bin("link_budget")
        .expect("link_budget bin")
        .args(["--scenario", "configs/link/uhf_leo.toml", "--json"])
        .output()
        .expect("run link_budget");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["status"], "sufficient");
    assert!(value["link_margin_db"].as_f64().unwrap() > 15.0);
    assert!(value["recommendations"].as_array().unwrap().is_empty());
}

#[test]
fn link_budget_rejects_fading_models() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("rayleigh.toml");
    let sband = fs::read_to_string("configs/link/sband_leo.toml").unwrap();
    fs::write(&path, sband.replace("\"AWGN\"", "\"Rayleigh\"")).unwrap();

    Command::cargo_bin("link_budget")
        .expect("link_budget bin")
        .args(["--scenario", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not supported"));
}

#[test]
fn margin_sweep_prints_points_in_display_units() {
    let output = Command::cargo_bin("margin_sweep")
        .expect("margin_sweep bin")
        .args([
            "--scenario",
            "configs/link",
            "--name",
            "UHF LEO",
            "--parameter",
            "distance",
            "--start",
            "500",
            "--end",
            "1500",
            "--step",
            "250",
        ])
        .output()
        .expect("run margin_sweep");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let rows: Vec<&str> = stdout.lines().skip(1).collect();
    assert_eq!(rows.len(), 5);
    assert!(rows[0].trim_start().starts_with("500.000"));
    assert!(rows[4].trim_start().starts_with("1500.000"));
}

#[test]
fn margin_sweep_rejects_unknown_modulation() {
    Command::cargo_bin("margin_sweep")
        .expect("margin_sweep bin")
        .args([
            "--scenario",
            "configs/link",
            "--parameter",
            "modulation",
            "--start",
            "0",
            "--end",
            "3",
            "--step",
            "1",
            "--modulation",
            "256QAM",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("256QAM"));
}

#[test]
fn data_budget_daily_reports_days_until_full() {
    Command::cargo_bin("data_budget")
        .expect("data_budget bin")
        .args(["daily", "--scenario", "configs/data/scenarios.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated / day : 10800.0 MB"))
        .stdout(predicate::str::contains("Days until full : 0.1"))
        .stdout(predicate::str::contains("Recommendations:"));
}

#[test]
fn data_budget_timeline_with_pass_schedule_is_viable() {
    Command::cargo_bin("data_budget")
        .expect("data_budget bin")
        .args([
            "timeline",
            "--scenario",
            "configs/timeline/first_day.yaml",
            "--passes",
            "configs/timeline/passes.csv",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Windows         : 5"))
        .stdout(predicate::str::contains("(viable)"));
}

#[test]
fn data_budget_timeline_json_contains_samples() {
    let output = Command::cargo_bin("data_budget")
        .expect("data_budget bin")
        .args([
            "timeline",
            "--scenario",
            "configs/timeline/first_day.yaml",
            "--json",
        ])
        .output()
        .expect("run data_budget");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["viable"], false);
    assert_eq!(value["timeline"].as_array().unwrap().len(), 8);
}

#[test]
fn project_save_then_show() {
    let dir = tempfile::tempdir().expect("tempdir");
    let project = dir.path().join("studies/pathfinder.json");

    Command::cargo_bin("project")
        .expect("project bin")
        .args([
            "save",
            "--name",
            "Pathfinder",
            "--output",
            project.to_str().unwrap(),
            "--link",
            "configs/link",
            "--data",
            "configs/data/scenarios.yaml",
        ])
        .assert()
        .success();
    assert!(project.is_file());

    Command::cargo_bin("project")
        .expect("project bin")
        .args(["show", project.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("=== Project: Pathfinder ==="))
        .stdout(predicate::str::contains("Daily backlog   : 7800.0 MB"))
        .stdout(predicate::str::contains("Storage margin  : -"));
}

#[test]
fn project_save_accepts_a_timeline_start() {
    let dir = tempfile::tempdir().expect("tempdir");
    let manifest = dir.path().join("open.yaml");
    fs::write(
        &manifest,
        "- name: Open start\n  data_rate_mbps: 1.0\n  storage_capacity_mb: 20000.0\n  mission_duration_hours: 24.0\n  default_downlink_rate_bps: 10000000.0\n  downlink_opportunities:\n    - start: \"2026-01-01T04:00:00Z\"\n      end: \"2026-01-01T04:10:00Z\"\n",
    )
    .unwrap();
    let project = dir.path().join("open.json");

    Command::cargo_bin("project")
        .expect("project bin")
        .args([
            "save",
            "--name",
            "Open",
            "--output",
            project.to_str().unwrap(),
            "--timeline",
            manifest.to_str().unwrap(),
            "--timeline-start",
            "2026-01-01T00:00:00Z",
        ])
        .assert()
        .success();

    Command::cargo_bin("project")
        .expect("project bin")
        .args(["show", project.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Storage margin  : 10025.0 MB"));
}
