//! Loading shared by every command: read, prepare, validate, order.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::batch::{BatchPreparer, RowIssue, load_records};
use crate::config::ImportConfig;
use crate::models::ImportItem;
use crate::resolver::HierarchyResolver;

/// A batch in creation order.
#[derive(Debug)]
pub struct PreparedPlan {
    /// Items in creation order.
    pub items: Vec<ImportItem>,
    /// Cells dropped during preparation.
    pub issues: Vec<RowIssue>,
}

/// Read the batch file at `path` and order it.
///
/// Fails on unreadable files, bad headers, and any batch-level validation or
/// cycle error. Row-level conversion problems are returned as issues.
pub fn prepare_plan(path: &Path, config: &ImportConfig) -> Result<PreparedPlan> {
    let records = load_records(path).with_context(|| format!("Failed to load batch {}", path.display()))?;
    let batch = BatchPreparer::new(config)?.prepare(&records)?;
    let items = HierarchyResolver::validate_and_sort(batch.items)?;

    Ok(PreparedPlan {
        items,
        issues: batch.issues,
    })
}

/// Print row issues as warnings.
pub(crate) fn print_issues(issues: &[RowIssue]) {
    for issue in issues {
        println!(
            "{} Row {}, column '{}': {}",
            "⚠".yellow(),
            issue.row,
            issue.column,
            issue.message
        );
    }
}
