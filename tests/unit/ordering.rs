//! Preparing and ordering whole batches.

use legacy_import::batch::BatchPreparer;
use legacy_import::config::ImportConfig;
use legacy_import::core::ImportError;
use legacy_import::models::ImportItem;
use legacy_import::resolver::HierarchyResolver;
use legacy_import::test_utils::{fixtures, init_test_logging};

fn prepare(batch: &serde_json::Value) -> Vec<ImportItem> {
    let preparer = BatchPreparer::new(&ImportConfig::default()).unwrap();
    preparer.prepare(&fixtures::records(batch)).unwrap().items
}

fn position(items: &[ImportItem], legacy_id: &str) -> usize {
    items.iter().position(|item| item.legacy_id.as_deref() == Some(legacy_id)).unwrap()
}

#[test]
fn site_batch_orders_parents_and_references_first() {
    init_test_logging(None);
    let ordered = HierarchyResolver::validate_and_sort(prepare(&fixtures::site_batch())).unwrap();

    let names: Vec<&str> = ordered.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(&names[..2], &["Banner", "Footer"]);

    assert!(position(&ordered, "10") < position(&ordered, "20"));
    assert!(position(&ordered, "20") < position(&ordered, "30"));
    assert!(position(&ordered, "10") < position(&ordered, "40"));
    assert!(position(&ordered, "50") < position(&ordered, "40"));
    assert!(position(&ordered, "40") < position(&ordered, "30"));
}

#[test]
fn ordering_is_stable_across_runs() {
    let first = HierarchyResolver::validate_and_sort(prepare(&fixtures::site_batch())).unwrap();
    let second = HierarchyResolver::validate_and_sort(prepare(&fixtures::site_batch())).unwrap();
    assert_eq!(first, second);
}

#[test]
fn cyclic_batch_is_rejected_with_both_items() {
    let err = HierarchyResolver::validate_and_sort(prepare(&fixtures::cyclic_batch())).unwrap_err();
    match err {
        ImportError::CycleDetected { path, participants } => {
            assert_eq!(path, vec!["A", "B", "A"]);
            assert_eq!(participants, vec!["A", "B"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn picker_reference_to_unknown_row_is_dangling() {
    let batch = serde_json::json!([
        {"legacyId": "1", "name": "Page", "image|legacyMediaPicker": "99"}
    ]);
    let err = HierarchyResolver::validate_and_sort(prepare(&batch)).unwrap_err();
    assert!(err.is_batch_fatal());
    assert!(err.to_string().contains("'99'"));
}

#[test]
fn duplicate_ids_differing_only_in_case_are_rejected() {
    let batch = serde_json::json!([
        {"legacyId": "Page-1", "name": "First"},
        {"legacyId": "page-1", "name": "Second"}
    ]);
    let err = HierarchyResolver::validate_and_sort(prepare(&batch)).unwrap_err();
    assert!(matches!(err, ImportError::DuplicateLegacyId { .. }));
    let message = err.to_string();
    assert!(message.contains("First"));
    assert!(message.contains("Second"));
}
