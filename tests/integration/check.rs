use legacy_import::test_utils::{BatchFile, fixtures};
use predicates::prelude::*;
use serde_json::json;

use super::common::cli;

#[test]
fn test_check_valid_batch() {
    let file = BatchFile::new(&fixtures::site_batch()).unwrap();
    cli(file.path().parent().unwrap())
        .args(["check"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid: 7 items (5 with legacy IDs) in 3 waves"));
}

#[test]
fn test_check_reports_cycle() {
    let file = BatchFile::new(&fixtures::cyclic_batch()).unwrap();
    cli(file.path().parent().unwrap())
        .arg("check")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Circular dependency detected: A → B → A"));
}

#[test]
fn test_check_reports_duplicate() {
    let file = BatchFile::new(&json!([
        {"legacyId": "7", "name": "Jobs"},
        {"legacyId": "7", "name": "Careers"}
    ]))
    .unwrap();
    cli(file.path().parent().unwrap())
        .arg("check")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Duplicate legacy ID '7'"))
        .stderr(predicate::str::contains("Jobs"))
        .stderr(predicate::str::contains("Careers"));
}

#[test]
fn test_check_reports_dangling_parent() {
    let file = BatchFile::new(&json!([{"legacyId": "1", "legacyParentId": "missing", "name": "Orphan"}])).unwrap();
    cli(file.path().parent().unwrap())
        .arg("check")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing parent legacy ID 'missing'"));
}

#[test]
fn test_check_unknown_resolver_suggests_alias() {
    let file = BatchFile::new(&json!([{"name": "x", "flag|boolen": "yes"}])).unwrap();
    cli(file.path().parent().unwrap())
        .arg("check")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown resolver alias 'boolen'"))
        .stderr(predicate::str::contains("boolean"));
}

#[test]
fn test_check_warns_on_bad_cells_and_strict_fails() {
    let file = BatchFile::new(&json!([{"name": "x", "count|int": "many"}])).unwrap();
    let home = file.path().parent().unwrap();

    cli(home)
        .arg("check")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Row 1, column 'count'"));

    cli(home).arg("check").arg("--strict").arg(file.path()).assert().failure();
}

#[test]
fn test_check_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    cli(dir.path())
        .arg("check")
        .arg(dir.path().join("nope.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.json"));
}

#[test]
fn test_check_invalid_json() {
    let file = BatchFile::with_contents("{ not json").unwrap();
    cli(file.path().parent().unwrap())
        .arg("check")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid batch file"));
}
