use std::collections::{HashMap, HashSet};

use lineage_core::{Entry, Seed};
use lineage_core::error::ErrorCode;
use lineage_graph::graph::{ancestors, find_cycles};
use lineage_graph::{ColorMap, Graph, MutableGraph};
use proptest::prelude::*;

use generators::{arb_dag, arb_partial_dag};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn roots_and_tips_partition_by_degree(entries in arb_dag()) {
        let graph = Graph::build(entries.clone(), false).expect("closed batch");
        let named: HashSet<&String> = entries.iter().flat_map(|e| e.parents.iter()).collect();

        let roots: HashSet<&String> =
            graph.roots().iter().map(|h| graph.node(*h).expect("own").id()).collect();
        let tips: HashSet<&String> =
            graph.tips().iter().map(|h| graph.node(*h).expect("own").id()).collect();

        for entry in &entries {
            prop_assert_eq!(roots.contains(&entry.id), entry.parents.is_empty());
            prop_assert_eq!(tips.contains(&entry.id), !named.contains(&entry.id));
        }
        prop_assert!(!roots.is_empty());
        prop_assert!(!tips.is_empty());
        prop_assert!(find_cycles(&graph).is_empty());
    }

    #[test]
    fn building_is_deterministic(entries in arb_dag()) {
        let first = Graph::build(entries.clone(), false).expect("first");
        let second = Graph::build(entries, false).expect("second");
        let ids = |graph: &Graph<Entry>, handles: &[lineage_graph::NodeId]| -> Vec<String> {
            handles.iter().map(|h| graph.node(*h).expect("own").id().clone()).collect()
        };
        prop_assert_eq!(ids(&first, first.roots()), ids(&second, second.roots()));
        prop_assert_eq!(ids(&first, first.tips()), ids(&second, second.tips()));
        prop_assert_eq!(first.edge_count(), second.edge_count());
    }

    #[test]
    fn sort_places_children_before_parents(entries in arb_dag()) {
        let graph = Graph::build(entries, false).expect("build");
        let order = MutableGraph::from_graph(&graph, true)
            .topological_sort_destructive()
            .expect("acyclic");
        prop_assert_eq!(order.len(), graph.len());

        let position: HashMap<&String, usize> =
            order.iter().enumerate().map(|(i, e)| (&e.id, i)).collect();
        for entry in &order {
            for parent in entry.parents() {
                prop_assert!(position[&entry.id] < position[parent]);
            }
        }
    }

    #[test]
    fn pruning_counts_every_dangling_reference((entries, holes) in arb_partial_dag()) {
        let strict = Graph::build(entries.clone(), false);
        if holes == 0 {
            prop_assert!(strict.is_ok());
        } else {
            prop_assert_eq!(strict.expect_err("dangling").code(), ErrorCode::MissingParent);
        }

        let pruned = Graph::build(entries, true).expect("pruned build");
        prop_assert_eq!(pruned.pruned_edge_count(), holes);
    }

    #[test]
    fn root_masks_cover_exactly_the_ancestor_roots(entries in arb_dag()) {
        let graph = Graph::build(entries, false).expect("build");
        prop_assume!(graph.roots().len() <= 64);

        let mut colors = ColorMap::new(&graph);
        let bits = colors.mark_roots();

        for node in graph.nodes() {
            let above = ancestors(&graph, node.handle()).expect("own");
            let mut expected = 0;
            for (root, bit) in graph.roots().iter().zip(&bits) {
                if *root == node.handle() || above.contains(*root).expect("own") {
                    expected |= bit;
                }
            }
            prop_assert_eq!(colors.get(node.handle()), Ok(expected));
        }
    }
}
