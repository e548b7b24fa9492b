//! Preparing, ordering and executing a batch end to end.

use legacy_import::batch::BatchPreparer;
use legacy_import::cache::ImportRunContext;
use legacy_import::config::ImportConfig;
use legacy_import::execution::{DryRunCreator, ExecuteOptions, ItemStatus, execute_plan};
use legacy_import::resolver::HierarchyResolver;
use legacy_import::test_utils::fixtures;
use serde_json::Value;

#[tokio::test]
async fn site_batch_imports_with_resolved_references() {
    let config = ImportConfig::default();
    let batch = BatchPreparer::new(&config).unwrap().prepare(&fixtures::records(&fixtures::site_batch())).unwrap();
    assert!(batch.issues.is_empty());

    let items = HierarchyResolver::validate_and_sort(batch.items).unwrap();
    let ctx = ImportRunContext::new();
    let creator = DryRunCreator::new();
    let options = ExecuteOptions {
        max_parallel: 2,
        extractor: config.extractor(),
    };

    let report = execute_plan(&ctx, &items, &creator, &options).await;
    assert_eq!(report.created(), 7);
    assert!(report.is_complete());
    assert_eq!(ctx.legacy_ids().count(), 5);

    let team = report.outcomes.iter().find(|outcome| outcome.name == "Team").unwrap();
    let ItemStatus::Created { id } = team.status else {
        panic!("Team should have been created");
    };
    let request = creator.request(id).unwrap();

    let home = ctx.legacy_ids().get("10").unwrap();
    let careers = ctx.legacy_ids().get("40").unwrap();
    assert_eq!(request.parent_id, ctx.legacy_ids().get("20"));
    assert_eq!(request.properties["related"], Value::String(format!("{home},{careers}")));

    let careers_request = creator.request(careers).unwrap();
    let logo = ctx.legacy_ids().get("50").unwrap();
    assert_eq!(careers_request.properties["hero"], Value::String(logo.to_string()));
}

#[tokio::test]
async fn failed_reference_degrades_without_blocking() {
    let config = ImportConfig::default();
    let batch = BatchPreparer::new(&config).unwrap().prepare(&fixtures::records(&fixtures::site_batch())).unwrap();
    let items = HierarchyResolver::validate_and_sort(batch.items).unwrap();

    let ctx = ImportRunContext::new();
    let creator = DryRunCreator::failing(["50"]);
    let report = execute_plan(&ctx, &items, &creator, &ExecuteOptions::default()).await;

    let careers = report.outcomes.iter().find(|outcome| outcome.name == "Careers").unwrap();
    assert!(matches!(careers.status, ItemStatus::Created { .. }));
    assert_eq!(careers.missing_references, vec!["50"]);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.skipped(), 0);
}
