//! Creation order for legacy-bearing items using Kahn's algorithm.
//!
//! The queue is seeded with every zero in-degree node in batch order and is
//! drained first-in first-out, so items with no ordering constraint between
//! them keep the relative order in which they became ready. The same batch
//! always sorts the same way.

use petgraph::graph::NodeIndex;
use std::collections::{HashSet, VecDeque};

use super::dependency_graph::DependencyGraph;
use crate::core::ImportError;

/// Sorts a [`DependencyGraph`] so every item follows the items it references.
pub struct TopologicalSorter;

impl TopologicalSorter {
    /// Batch indices of the graph's items in creation order.
    ///
    /// Fails with [`ImportError::CycleDetected`] when some items can never
    /// become ready. The error names one cycle and every item left unordered.
    pub fn sort(graph: &DependencyGraph) -> Result<Vec<usize>, ImportError> {
        let mut in_degree = graph.in_degrees();
        let mut queue: VecDeque<NodeIndex> =
            graph.node_indices().filter(|index| in_degree[index.index()] == 0).collect();
        let mut sorted = Vec::with_capacity(graph.node_count());

        while let Some(current) = queue.pop_front() {
            sorted.push(current);

            for dependent in graph.dependents(current) {
                let degree = &mut in_degree[dependent.index()];
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(dependent);
                }
            }
        }

        if sorted.len() < graph.node_count() {
            let done: HashSet<NodeIndex> = sorted.iter().copied().collect();
            let unsorted: HashSet<NodeIndex> = graph.node_indices().filter(|index| !done.contains(index)).collect();

            let path = graph
                .find_cycle(&unsorted)
                .into_iter()
                .map(|index| graph.node(index).legacy_id.clone())
                .collect();
            let participants = graph
                .node_indices()
                .filter(|index| unsorted.contains(index))
                .map(|index| graph.node(index).legacy_id.clone())
                .collect();

            return Err(ImportError::CycleDetected {
                path,
                participants,
            });
        }

        tracing::trace!("Sorted {} legacy items", sorted.len());
        Ok(sorted.into_iter().map(|index| graph.node(index).index).collect())
    }
}
