use legacy_import::test_utils::{BatchFile, fixtures};
use predicates::prelude::*;
use serde_json::{Value, json};

use super::common::cli;

#[test]
fn test_plan_text_lists_creation_order() {
    let file = BatchFile::new(&json!([
        {"legacyId": "1", "name": "Root"},
        {"legacyId": "2", "legacyParentId": "1", "name": "Child"},
        {"name": "NoLegacy"}
    ]))
    .unwrap();

    let output = cli(file.path().parent().unwrap()).arg("plan").arg(file.path()).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();

    let no_legacy = stdout.find("NoLegacy").unwrap();
    let root = stdout.find("Root").unwrap();
    let child = stdout.find("Child").unwrap();
    assert!(no_legacy < root && root < child);
    assert!(stdout.contains("[wave 1] Child (2) parent: 1"));
}

#[test]
fn test_plan_json_document() {
    let file = BatchFile::new(&fixtures::site_batch()).unwrap();
    let output = cli(file.path().parent().unwrap())
        .args(["plan", "--format", "json"])
        .arg(file.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let document: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(document["waves"], 3);
    let names: Vec<&str> = document["items"].as_array().unwrap().iter().map(|i| i["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Banner", "Footer", "Home", "Logo", "About", "Careers", "Team"]);

    let team = &document["items"][6];
    assert_eq!(team["wave"], 2);
    assert_eq!(team["dependencies"], json!(["10", "40"]));
    assert_eq!(team["row"], 4);
}

#[test]
fn test_plan_tree() {
    let file = BatchFile::new(&json!([
        {"legacyId": "1", "name": "Home"},
        {"legacyId": "2", "legacyParentId": "1", "name": "About"}
    ]))
    .unwrap();
    cli(file.path().parent().unwrap())
        .args(["plan", "--tree"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Hierarchy"))
        .stdout(predicate::str::contains("└── Home [1]"))
        .stdout(predicate::str::contains("    └── About [2]"));
}

#[test]
fn test_plan_is_deterministic() {
    let file = BatchFile::new(&fixtures::site_batch()).unwrap();
    let home = file.path().parent().unwrap();
    let run = || cli(home).args(["plan", "--format", "json"]).arg(file.path()).output().unwrap().stdout;
    assert_eq!(run(), run());
}
