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
        .env_remove("UPCYCLE_LOGS_DIR")
        .env_remove("UPCYCLE_TIMEOUT_SECS")
        .env_remove("UPCYCLE_HISTORY_LIMIT");
    cmd
}

#[test]
fn carbon_reports_mass_and_factor() {
    let tmp = tempdir().expect("tempdir");

    let out = upcycle(tmp.path())
        .args(["--json", "carbon", "--material", "plastic", "--quantity", "10", "--unit", "pieces"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: Value = serde_json::from_slice(&out).expect("json report");
    assert_eq!(report["payload"]["factorKey"], "plastic");
    assert_eq!(report["payload"]["result"]["ifWasted"], 1.3);
    assert_eq!(report["payload"]["result"]["ifUpcycled"], 1.0);
}

#[test]
fn carbon_rejects_blank_material() {
    let tmp = tempdir().expect("tempdir");

    upcycle(tmp.path())
        .args(["carbon", "--material", "  ", "--quantity", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("material cannot be empty"));
}

#[test]
fn carbon_rejects_quantities_past_the_ceiling() {
    let tmp = tempdir().expect("tempdir");

    upcycle(tmp.path())
        .args(["carbon", "--material", "plastic", "--quantity", "1e300"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds the limit"));
}

#[test]
fn categories_fall_back_to_the_table() {
    let tmp = tempdir().expect("tempdir");

    upcycle(tmp.path())
        .args(["categories", "--material", "plastic bottles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("category.1="))
        .stdout(predicate::str::contains("source=fallback:disabled"));
}

#[test]
fn status_reports_local_provider_and_known_env() {
    let tmp = tempdir().expect("tempdir");

    let out = upcycle(tmp.path())
        .args(["--json", "status"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: Value = serde_json::from_slice(&out).expect("json report");
    assert_eq!(report["payload"]["provider"], "local");
    assert_eq!(report["payload"]["timeoutSecs"], 45);
    assert_eq!(report["payload"]["auditEvents"], 0);
    let known: Vec<&str> = report["payload"]["knownEnv"]
        .as_array()
        .expect("knownEnv")
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(known.contains(&"UPCYCLE_PROVIDER"));
    assert!(known.contains(&"UPCYCLE_HOME"));
    assert!(!known.contains(&"UPCYCLE_WARN"));
}
