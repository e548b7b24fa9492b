//! Dependency graph over the legacy-bearing items of a batch.
//!
//! Nodes are the items that carry a legacy ID, added in batch order. Each edge
//! points from a referenced item to the item that references it, so every edge
//! reads "create this before that":
//!
//! - one [`EdgeKind::Parent`] edge per parent link
//! - one [`EdgeKind::Property`] edge per extracted property dependency
//!
//! A parent that is also listed as a dependency yields a single edge. The graph
//! is built per call and discarded once the batch is ordered.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::models::ImportItem;

/// Why one item must be created before another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// The dependent item's parent.
    Parent,
    /// A property of the dependent item references this item.
    Property,
}

/// A legacy-bearing item in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraphNode {
    /// Position of the item in the batch.
    pub index: usize,
    /// The item's legacy ID, trimmed but with its original casing.
    pub legacy_id: String,
}

impl fmt::Display for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.legacy_id)
    }
}

/// Directed "referenced -> dependent" graph of a batch.
pub struct DependencyGraph {
    /// The underlying directed graph.
    graph: DiGraph<GraphNode, EdgeKind>,
    /// Map from normalized legacy IDs to graph indices.
    node_map: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Build the graph for `items`.
    ///
    /// Items without a legacy ID are not part of the graph. References to legacy
    /// IDs that are not in the batch are skipped; validation has already
    /// rejected them. Duplicate legacy IDs keep the first item.
    #[must_use]
    pub fn build(items: &[ImportItem]) -> Self {
        let mut graph = Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        };

        for (index, item) in items.iter().enumerate() {
            if let Some(key) = item.legacy_key() {
                let legacy_id = item.legacy_id.as_deref().unwrap_or_default().trim().to_string();
                graph.ensure_node(key, GraphNode {
                    index,
                    legacy_id,
                });
            }
        }

        for item in items {
            let Some(dependent) = item.legacy_key().and_then(|key| graph.node_map.get(&key).copied()) else {
                continue;
            };

            if let Some(parent) = item.parent_key() {
                graph.add_edge(&parent, dependent, EdgeKind::Parent);
            }
            for dependency in &item.dependencies {
                if let Some(key) = crate::cache::normalize_key(dependency) {
                    graph.add_edge(&key, dependent, EdgeKind::Property);
                }
            }
        }

        tracing::debug!(
            "Built dependency graph with {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        graph
    }

    fn ensure_node(&mut self, key: String, node: GraphNode) -> NodeIndex {
        if let Some(&index) = self.node_map.get(&key) {
            index
        } else {
            let index = self.graph.add_node(node);
            self.node_map.insert(key, index);
            index
        }
    }

    /// Add `referenced -> dependent` unless an edge between them already exists.
    fn add_edge(&mut self, referenced: &str, dependent: NodeIndex, kind: EdgeKind) {
        let Some(&from) = self.node_map.get(referenced) else {
            tracing::debug!("Skipping reference to '{}' outside the batch", referenced);
            return;
        };
        if !self.graph.contains_edge(from, dependent) {
            self.graph.add_edge(from, dependent, kind);
        }
    }

    /// Node for a legacy ID (any casing).
    #[must_use]
    pub fn node_for(&self, legacy_id: &str) -> Option<NodeIndex> {
        crate::cache::normalize_key(legacy_id).and_then(|key| self.node_map.get(&key).copied())
    }

    /// The item behind a node.
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> &GraphNode {
        &self.graph[index]
    }

    /// All nodes in batch order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        self.graph.node_indices()
    }

    /// Items that must wait for `index`, in the order their edges were added.
    #[must_use]
    pub fn dependents(&self, index: NodeIndex) -> Vec<NodeIndex> {
        // petgraph yields the most recently added edge first
        let mut dependents: Vec<NodeIndex> = self.graph.neighbors_directed(index, Direction::Outgoing).collect();
        dependents.reverse();
        dependents
    }

    /// Items `index` waits for, with the edge kind, in the order added.
    #[must_use]
    pub fn dependencies(&self, index: NodeIndex) -> Vec<(NodeIndex, EdgeKind)> {
        use petgraph::visit::EdgeRef;

        let mut dependencies: Vec<(NodeIndex, EdgeKind)> = self
            .graph
            .edges_directed(index, Direction::Incoming)
            .map(|edge| (edge.source(), *edge.weight()))
            .collect();
        dependencies.reverse();
        dependencies
    }

    /// Number of unresolved edges pointing at each node, indexed by node index.
    #[must_use]
    pub fn in_degrees(&self) -> Vec<usize> {
        self.graph
            .node_indices()
            .map(|index| self.graph.neighbors_directed(index, Direction::Incoming).count())
            .collect()
    }

    /// Find a cycle among `unsorted` nodes.
    ///
    /// Every node left over by Kahn's algorithm still waits on another leftover
    /// node, so walking from the first leftover node (in batch order) to one of
    /// its leftover dependencies must eventually revisit a node. Parent edges are
    /// followed in preference to property edges. The returned path lists nodes
    /// where each depends on the next, closing on its first node.
    #[must_use]
    pub fn find_cycle(&self, unsorted: &HashSet<NodeIndex>) -> Vec<NodeIndex> {
        let Some(start) = self.node_indices().find(|index| unsorted.contains(index)) else {
            return Vec::new();
        };

        let mut walked: Vec<NodeIndex> = vec![start];
        let mut position: HashMap<NodeIndex, usize> = HashMap::from([(start, 0)]);
        let mut current = start;

        loop {
            let candidates: Vec<(NodeIndex, EdgeKind)> =
                self.dependencies(current).into_iter().filter(|(node, _)| unsorted.contains(node)).collect();
            let next = candidates
                .iter()
                .find(|(_, kind)| *kind == EdgeKind::Parent)
                .or_else(|| candidates.first())
                .map(|(node, _)| *node);

            let Some(next) = next else {
                // Only reachable if `unsorted` was not produced by a Kahn pass.
                return walked;
            };

            if let Some(&first) = position.get(&next) {
                let mut cycle = walked.split_off(first);
                cycle.push(next);
                return cycle;
            }

            position.insert(next, walked.len());
            walked.push(next);
            current = next;
        }
    }

    /// Check if the graph is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Get the total number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the total number of edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Render the parent hierarchy as a tree.
    ///
    /// Roots are nodes without a parent edge. Property dependencies are listed
    /// after each node's name as `(needs: ...)`.
    #[must_use]
    pub fn to_tree_string(&self, items: &[ImportItem]) -> String {
        let mut result = String::new();
        let mut visited = HashSet::new();

        let roots: Vec<NodeIndex> = self
            .node_indices()
            .filter(|index| self.dependencies(*index).iter().all(|(_, kind)| *kind != EdgeKind::Parent))
            .collect();

        for (i, root) in roots.iter().enumerate() {
            self.build_tree_string(*root, items, &mut result, "", i == roots.len() - 1, &mut visited);
        }

        result
    }

    fn build_tree_string(
        &self,
        node: NodeIndex,
        items: &[ImportItem],
        result: &mut String,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last {
            "└── "
        } else {
            "├── "
        };
        let label = self.label(node, items);
        result.push_str(&format!("{prefix}{connector}{label}\n"));

        let child_prefix = if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };

        if !visited.insert(node) {
            result.push_str(&format!("{child_prefix}└── (circular reference)\n"));
            return;
        }

        let children: Vec<NodeIndex> = self
            .dependents(node)
            .into_iter()
            .filter(|child| self.dependencies(*child).contains(&(node, EdgeKind::Parent)))
            .collect();

        for (i, child) in children.iter().enumerate() {
            self.build_tree_string(*child, items, result, &child_prefix, i == children.len() - 1, visited);
        }
    }

    fn label(&self, node: NodeIndex, items: &[ImportItem]) -> String {
        let graph_node = &self.graph[node];
        let name = items.get(graph_node.index).map(ImportItem::display_name).unwrap_or_default();
        let needs: Vec<String> = self
            .dependencies(node)
            .into_iter()
            .filter(|(_, kind)| *kind == EdgeKind::Property)
            .map(|(dependency, _)| self.graph[dependency].legacy_id.clone())
            .collect();

        if needs.is_empty() {
            format!("{name} [{}]", graph_node.legacy_id)
        } else {
            format!("{name} [{}] (needs: {})", graph_node.legacy_id, needs.join(", "))
        }
    }
}
