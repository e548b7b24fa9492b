//! Validation and creation ordering for import batches.
//!
//! [`HierarchyResolver::validate_and_sort`] is the entry point. It takes a batch
//! of [`ImportItem`]s and returns the same items reordered so every item comes
//! after each item it references, or a batch-fatal [`ImportError`].
//!
//! # Pipeline
//!
//! 1. [`GraphValidator`] rejects duplicate legacy IDs, then dangling parent or
//!    dependency references.
//! 2. [`DependencyGraph::build`] creates one node per legacy-bearing item and one
//!    edge per parent link or property dependency.
//! 3. [`TopologicalSorter`] orders the graph with Kahn's algorithm and reports a
//!    cycle when some items can never become ready.
//!
//! # Output order
//!
//! The result is made of three tiers, each keeping its own relative order:
//!
//! - items without a legacy ID that reference nothing, in batch order
//! - legacy-bearing items, in sorted order
//! - items without a legacy ID that reference a parent or dependency, in batch
//!   order
//!
//! Items without a legacy ID cannot be referenced, so they never hold anything
//! else back. The last tier exists so an item still follows the parent it names.
//!
//! Nothing is returned alongside an error: a batch either sorts completely or
//! must not be created at all.

pub mod dependency_graph;
pub mod topological;
pub mod validation;

pub use dependency_graph::{DependencyGraph, EdgeKind, GraphNode};
pub use topological::TopologicalSorter;
pub use validation::GraphValidator;

use crate::core::ImportError;
use crate::models::ImportItem;

/// Validates and orders import batches.
pub struct HierarchyResolver;

impl HierarchyResolver {
    /// Validate `items` and return them in creation order.
    ///
    /// # Errors
    ///
    /// - [`ImportError::DuplicateLegacyId`] when two items share a legacy ID
    /// - [`ImportError::DanglingReference`] when a parent or dependency is not in
    ///   the batch
    /// - [`ImportError::CycleDetected`] when items reference each other in a loop
    ///
    /// # Examples
    ///
    /// ```
    /// use legacy_import::models::ImportItem;
    /// use legacy_import::resolver::HierarchyResolver;
    ///
    /// let items = vec![
    ///     ImportItem::new("Root").with_legacy_id("1"),
    ///     ImportItem::new("Child").with_legacy_id("2").with_parent("1"),
    ///     ImportItem::new("NoLegacy"),
    /// ];
    /// let ordered = HierarchyResolver::validate_and_sort(items)?;
    /// let names: Vec<_> = ordered.iter().map(|item| item.name.as_str()).collect();
    /// assert_eq!(names, ["NoLegacy", "Root", "Child"]);
    /// # Ok::<(), legacy_import::core::ImportError>(())
    /// ```
    pub fn validate_and_sort(items: Vec<ImportItem>) -> Result<Vec<ImportItem>, ImportError> {
        let order = Self::order_indices(&items)?;

        let mut slots: Vec<Option<ImportItem>> = items.into_iter().map(Some).collect();
        Ok(order.into_iter().filter_map(|index| slots[index].take()).collect())
    }

    /// Batch indices of `items` in creation order, without moving the items.
    ///
    /// Same checks and ordering as [`validate_and_sort`](Self::validate_and_sort).
    pub fn order_indices(items: &[ImportItem]) -> Result<Vec<usize>, ImportError> {
        tracing::debug!("Ordering batch of {} items", items.len());

        GraphValidator::validate(items)?;

        let graph = DependencyGraph::build(items);
        let sorted = TopologicalSorter::sort(&graph).inspect_err(|e| {
            tracing::warn!("Batch cannot be ordered: {}", e);
        })?;

        let (leading, trailing): (Vec<(usize, &ImportItem)>, Vec<(usize, &ImportItem)>) = items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.has_legacy_id())
            .partition(|(_, item)| !item.has_references());

        let mut order = Vec::with_capacity(items.len());
        order.extend(leading.into_iter().map(|(index, _)| index));
        order.extend(sorted);
        order.extend(trailing.into_iter().map(|(index, _)| index));

        tracing::debug!(
            "Ordered {} items ({} legacy-bearing, {} without legacy ID)",
            order.len(),
            graph.node_count(),
            items.len() - graph.node_count()
        );
        Ok(order)
    }
}
