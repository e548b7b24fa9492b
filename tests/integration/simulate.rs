use legacy_import::test_utils::{BatchFile, fixtures};
use serde_json::Value;

use super::common::cli;

fn outcome<'a>(report: &'a Value, name: &str) -> &'a Value {
    report["outcomes"].as_array().unwrap().iter().find(|o| o["name"] == name).unwrap()
}

#[test]
fn test_simulate_creates_everything() {
    let file = BatchFile::new(&fixtures::site_batch()).unwrap();
    let output = cli(file.path().parent().unwrap())
        .args(["simulate", "--max-parallel", "2"])
        .arg(file.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    let outcomes = report["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 7);
    assert!(outcomes.iter().all(|o| o["status"] == "created"));
    assert_eq!(report["waves"], 3);
}

#[test]
fn test_simulate_failure_skips_children() {
    let file = BatchFile::new(&fixtures::site_batch()).unwrap();
    let output = cli(file.path().parent().unwrap())
        .args(["simulate", "--fail", "20", "--fail", "50"])
        .arg(file.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcome(&report, "About")["status"], "failed");
    assert_eq!(outcome(&report, "Team")["status"], "skipped");

    let careers = outcome(&report, "Careers");
    assert_eq!(careers["status"], "created");
    assert_eq!(careers["missingReferences"], serde_json::json!(["50"]));
}

#[test]
fn test_simulate_rejects_zero_parallelism() {
    let file = BatchFile::new(&fixtures::site_batch()).unwrap();
    cli(file.path().parent().unwrap())
        .args(["simulate", "--max-parallel", "0"])
        .arg(file.path())
        .assert()
        .failure();
}

#[test]
fn test_simulate_invalid_batch_fails() {
    let file = BatchFile::new(&fixtures::cyclic_batch()).unwrap();
    cli(file.path().parent().unwrap()).arg("simulate").arg(file.path()).assert().failure().stdout("");
}
