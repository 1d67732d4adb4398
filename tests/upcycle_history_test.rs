use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::tempdir;

fn upcycle(home: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("upcycle");
    cmd.current_dir(home)
        .env("UPCYCLE_HOME", home)
        .env("UPCYCLE_PROVIDER", "local")
        .env_remove("UPCYCLE_CONFIG_PATH")
        .env_remove("UPCYCLE_RECORDS_FILE")
        .env_remove("UPCYCLE_LOGS_DIR")
        .env_remove("UPCYCLE_HISTORY_ENABLED")
        .env_remove("UPCYCLE_HISTORY_LIMIT")
        .env_remove("UPCYCLE_USER");
    cmd
}

fn analyze(home: &Path, user: &str, material: &str) -> String {
    let out = upcycle(home)
        .args(["--json", "--user", user, "analyze"])
        .args(["--material", material, "--category", "Misc", "--quantity", "2"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: Value = serde_json::from_slice(&out).expect("json report");
    report["details"]
        .as_array()
        .expect("details")
        .iter()
        .filter_map(Value::as_str)
        .find_map(|line| line.strip_prefix("record.id="))
        .expect("record id detail")
        .to_string()
}

#[test]
fn history_lists_newest_first_for_the_user() {
    let tmp = tempdir().expect("tempdir");
    analyze(tmp.path(), "amy", "plastic");
    analyze(tmp.path(), "bo", "metal");
    analyze(tmp.path(), "amy", "glass");

    let out = upcycle(tmp.path())
        .args(["--json", "--user", "amy", "history"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: Value = serde_json::from_slice(&out).expect("json report");
    let records = report["payload"].as_array().expect("records");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["request"]["material"], "glass");
    assert_eq!(records[1]["request"]["material"], "plastic");
    assert_eq!(records[0]["userId"], "amy");

    upcycle(tmp.path())
        .args(["--user", "amy", "history", "--limit", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("records=1"));
}

#[test]
fn show_is_scoped_to_the_owner() {
    let tmp = tempdir().expect("tempdir");
    let id = analyze(tmp.path(), "amy", "rubber tires");

    upcycle(tmp.path())
        .args(["--user", "amy", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("record={id}")));

    upcycle(tmp.path())
        .args(["--user", "bo", "show", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn no_save_and_disabled_history_leave_no_records() {
    let tmp = tempdir().expect("tempdir");

    upcycle(tmp.path())
        .args(["analyze", "--material", "paper", "--category", "Boxes"])
        .args(["--quantity", "1", "--no-save"])
        .assert()
        .success()
        .stdout(predicate::str::contains("record.saved=false"));

    upcycle(tmp.path())
        .env("UPCYCLE_HISTORY_ENABLED", "false")
        .args(["analyze", "--material", "paper", "--category", "Boxes"])
        .args(["--quantity", "1"])
        .assert()
        .success();

    assert!(!tmp.path().join("records.jsonl").exists());
}
