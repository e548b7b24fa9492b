use legacy_import::test_utils::BatchFile;
use predicates::prelude::*;
use serde_json::json;

use super::common::cli;

fn custom_batch() -> serde_json::Value {
    json!([
        {"Id": "b", "Parent": "a", "Title": "Child", "links|link": "a;c"},
        {"Id": "a", "Title": "Root"},
        {"Id": "c", "Title": "Other"}
    ])
}

const CUSTOM_CONFIG: &str = r#"
reference_separator = ";"

[columns]
legacy_id = "Id"
legacy_parent_id = "Parent"
name = "Title"

[aliases]
link = "legacyContentPicker"
"#;

#[test]
fn test_config_flag_changes_columns_and_aliases() {
    let file = BatchFile::new(&custom_batch()).unwrap();
    let config = file.write_sibling("import.toml", CUSTOM_CONFIG).unwrap();

    cli(file.path().parent().unwrap())
        .arg("--config")
        .arg(&config)
        .arg("check")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("3 items (3 with legacy IDs) in 2 waves"));
}

#[test]
fn test_config_env_var_is_used() {
    let file = BatchFile::new(&custom_batch()).unwrap();
    let config = file.write_sibling("import.toml", CUSTOM_CONFIG).unwrap();

    cli(file.path().parent().unwrap())
        .env("LEGACY_IMPORT_CONFIG", &config)
        .arg("check")
        .arg(file.path())
        .assert()
        .success();
}

#[test]
fn test_config_in_home_directory_is_used() {
    let file = BatchFile::new(&custom_batch()).unwrap();
    let home = file.path().parent().unwrap();
    std::fs::create_dir_all(home.join(".legacy-import")).unwrap();
    std::fs::write(home.join(".legacy-import").join("config.toml"), CUSTOM_CONFIG).unwrap();

    cli(home).arg("check").arg(file.path()).assert().success();
}

#[test]
fn test_without_config_custom_alias_is_unknown() {
    let file = BatchFile::new(&custom_batch()).unwrap();
    cli(file.path().parent().unwrap())
        .arg("check")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown resolver alias 'link'"));
}

#[test]
fn test_invalid_config_is_reported() {
    let file = BatchFile::new(&custom_batch()).unwrap();
    let config = file.write_sibling("bad.toml", "reference_separator = [").unwrap();

    cli(file.path().parent().unwrap())
        .arg("-c")
        .arg(&config)
        .arg("check")
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
}
