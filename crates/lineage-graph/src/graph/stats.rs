//! Basic statistics for a commit graph.
//!
//! # Statistics Provided
//!
//! - **node_count** / **edge_count**: commits and resolved parent links.
//! - **root_count** / **tip_count**: commits with no parents / no children.
//! - **merge_count**: commits with two or more resolved parents.
//! - **pruned_edge_count**: parent references dropped during construction.
//! - **max_parents** / **max_children**: widest merge and widest fork.
//! - **weakly_connected_component_count**: disjoint histories in the batch.
//!   More than one means the batch holds unrelated histories (or pruning
//!   split one apart).

use petgraph::algo::connected_components;
use serde::Serialize;

use lineage_core::Seed;

use super::build::Graph;

/// Summary statistics for a [`Graph`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub root_count: usize,
    pub tip_count: usize,
    pub merge_count: usize,
    pub pruned_edge_count: usize,
    pub max_parents: usize,
    pub max_children: usize,
    pub weakly_connected_component_count: usize,
}

impl GraphStats {
    #[must_use]
    pub fn from_graph<S: Seed>(graph: &Graph<S>) -> Self {
        let mut stats = Self {
            node_count: graph.len(),
            edge_count: graph.edge_count(),
            root_count: graph.roots().len(),
            tip_count: graph.tips().len(),
            pruned_edge_count: graph.pruned_edge_count(),
            ..Self::default()
        };

        for node in graph.nodes() {
            let parents = node.parents().len();
            if parents > 1 {
                stats.merge_count += 1;
            }
            stats.max_parents = stats.max_parents.max(parents);
            stats.max_children = stats.max_children.max(node.children().len());
        }

        if !graph.is_empty() {
            stats.weakly_connected_component_count = connected_components(&graph.to_digraph());
        }
        stats
    }
}
