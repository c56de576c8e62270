//! Cycle diagnostics.
//!
//! A well-formed history never contains a cycle, so these helpers are for
//! explaining bad input rather than for routine use. They run Tarjan's
//! strongly-connected-components algorithm over a petgraph export.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use lineage_core::Seed;

use super::build::Graph;

/// Every cycle in `graph`.
///
/// Each entry is the sorted member list of one strongly connected component
/// with more than one node, or a single node with a self-loop. Entries are
/// sorted too, so the result is deterministic.
#[must_use]
pub fn find_cycles<S: Seed>(graph: &Graph<S>) -> Vec<Vec<S::Id>> {
    cyclic_components(&graph.to_digraph())
}

/// Cyclic strongly connected components of any petgraph [`DiGraph`].
#[must_use]
pub fn cyclic_components<N: Clone + Ord>(graph: &DiGraph<N, ()>) -> Vec<Vec<N>> {
    let mut cycles: Vec<Vec<N>> = tarjan_scc(graph)
        .into_iter()
        .filter(|component| {
            component.len() > 1
                || component
                    .first()
                    .is_some_and(|node| has_self_loop(graph, *node))
        })
        .map(|component| {
            let mut ids: Vec<N> = component
                .into_iter()
                .map(|index| graph[index].clone())
                .collect();
            ids.sort_unstable();
            ids
        })
        .collect();

    cycles.sort_unstable();
    cycles
}

fn has_self_loop<N>(graph: &DiGraph<N, ()>, node: NodeIndex) -> bool {
    graph.find_edge(node, node).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{chain, key, seed};

    #[test]
    fn acyclic_history_has_no_cycles() {
        assert!(find_cycles(&chain(5)).is_empty());
    }

    #[test]
    fn reports_each_cycle_sorted() {
        let graph = Graph::build(
            vec![
                seed("x", &["z"]),
                seed("y", &["x"]),
                seed("z", &["y"]),
                seed("self", &["self"]),
                seed("free", &[]),
            ],
            false,
        )
        .expect("build");

        assert_eq!(
            find_cycles(&graph),
            vec![vec![key("self")], vec![key("x"), key("y"), key("z")]]
        );
    }
}
