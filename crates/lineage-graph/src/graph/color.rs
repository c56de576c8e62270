//! Reachability coloring.
//!
//! A [`ColorMap`] holds one `u64` per node of a graph. Two traversals fill
//! it:
//!
//! - [`color_recursive`](ColorMap::color_recursive) overwrites values with a
//!   color and stops at nodes that already have it.
//! - [`mask_recursive`](ColorMap::mask_recursive) ORs a bitmask into values
//!   and stops at nodes that already carry every bit of it.
//!
//! Both walk with an explicit stack, in the [`Direction`] the caller picks
//! (or through any expander closure).
//!
//! # Root Bitmasks
//!
//! [`mark_roots`](ColorMap::mark_roots) gives each root its own bit and
//! marks all of its descendants, so each node ends up with the set of roots
//! it descends from. Values are 64 bits wide: root `i` gets bit `i % 64`,
//! so histories with more than 64 roots alias roots onto shared bits.

use std::collections::BTreeMap;
use std::ops::RangeBounds;

use lineage_core::Seed;
use serde::Serialize;
use tracing::{debug, warn};

use super::build::{Graph, Node, NodeId};
use crate::error::GraphError;

/// Number of distinct root bits a value can hold.
pub const ROOT_BITS: usize = 64;

/// Which links a traversal follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    /// Towards roots.
    Parents,
    /// Towards tips.
    Children,
}

impl Direction {
    /// The neighbours of `node` in this direction.
    #[must_use]
    pub fn expand<S: Seed>(self, node: &Node<S>) -> &[NodeId] {
        match self {
            Self::Parents => node.parents(),
            Self::Children => node.children(),
        }
    }
}

/// One integer value per node of a graph.
#[derive(Debug, Clone)]
pub struct ColorMap<'g, S: Seed> {
    graph: &'g Graph<S>,
    values: Vec<u64>,
    fill: u64,
}

impl<'g, S: Seed> ColorMap<'g, S> {
    /// Every node starts at 0.
    #[must_use]
    pub fn new(graph: &'g Graph<S>) -> Self {
        Self::with_fill(graph, 0)
    }

    /// Every node starts at `fill`.
    #[must_use]
    pub fn with_fill(graph: &'g Graph<S>, fill: u64) -> Self {
        Self {
            graph,
            values: vec![fill; graph.len()],
            fill,
        }
    }

    #[must_use]
    pub const fn graph(&self) -> &'g Graph<S> {
        self.graph
    }

    /// Put every node back to the fill value.
    pub fn reset(&mut self) {
        self.values.fill(self.fill);
    }

    /// # Errors
    ///
    /// [`GraphError::OwnerMismatch`] for a handle from another graph.
    pub fn get(&self, handle: NodeId) -> Result<u64, GraphError> {
        self.graph.check_owner(handle)?;
        Ok(self.values[handle.index()])
    }

    /// # Errors
    ///
    /// [`GraphError::NodeNotFound`] when `id` is not in the graph.
    pub fn get_id(&self, id: &S::Id) -> Result<u64, GraphError> {
        let node = self.graph.lookup(id)?;
        Ok(self.values[node.handle().index()])
    }

    /// Overwrite one value, returning the previous one.
    ///
    /// # Errors
    ///
    /// [`GraphError::OwnerMismatch`] for a handle from another graph.
    pub fn set(&mut self, handle: NodeId, value: u64) -> Result<u64, GraphError> {
        self.graph.check_owner(handle)?;
        Ok(std::mem::replace(&mut self.values[handle.index()], value))
    }

    /// Set `color` on every node reachable from `starts` (inclusive) along
    /// `direction`. Nodes already at `color` are neither counted nor
    /// expanded.
    ///
    /// Returns the number of nodes whose value changed.
    ///
    /// # Errors
    ///
    /// [`GraphError::OwnerMismatch`] for a start handle from another graph.
    /// Nothing is colored in that case.
    pub fn color_recursive<I>(
        &mut self,
        color: u64,
        direction: Direction,
        starts: I,
    ) -> Result<usize, GraphError>
    where
        I: IntoIterator<Item = NodeId>,
    {
        self.color_recursive_with(color, |node| direction.expand(node), starts)
    }

    /// [`color_recursive`](Self::color_recursive) with a custom expander.
    ///
    /// # Errors
    ///
    /// Same as [`color_recursive`](Self::color_recursive).
    pub fn color_recursive_with<F, I>(
        &mut self,
        color: u64,
        expand: F,
        starts: I,
    ) -> Result<usize, GraphError>
    where
        F: Fn(&Node<S>) -> &[NodeId],
        I: IntoIterator<Item = NodeId>,
    {
        self.traverse(expand, starts, |value| {
            if *value == color {
                false
            } else {
                *value = color;
                true
            }
        })
    }

    /// OR `mask` into every node reachable from `starts` (inclusive) along
    /// `direction`. Nodes that already carry every bit of `mask` are
    /// neither counted nor expanded.
    ///
    /// Returns the number of nodes whose value changed.
    ///
    /// # Errors
    ///
    /// [`GraphError::OwnerMismatch`] for a start handle from another graph.
    /// Nothing is marked in that case.
    pub fn mask_recursive<I>(
        &mut self,
        mask: u64,
        direction: Direction,
        starts: I,
    ) -> Result<usize, GraphError>
    where
        I: IntoIterator<Item = NodeId>,
    {
        self.mask_recursive_with(mask, |node| direction.expand(node), starts)
    }

    /// [`mask_recursive`](Self::mask_recursive) with a custom expander.
    ///
    /// # Errors
    ///
    /// Same as [`mask_recursive`](Self::mask_recursive).
    pub fn mask_recursive_with<F, I>(
        &mut self,
        mask: u64,
        expand: F,
        starts: I,
    ) -> Result<usize, GraphError>
    where
        F: Fn(&Node<S>) -> &[NodeId],
        I: IntoIterator<Item = NodeId>,
    {
        self.traverse(expand, starts, or_mask(mask))
    }

    /// Assign root `i` the bit `1 << (i % 64)` and mark its descendants.
    ///
    /// Returns the bit given to each root, in [`Graph::roots`] order.
    pub fn mark_roots(&mut self) -> Vec<u64> {
        let graph = self.graph;
        let roots = graph.roots();
        if roots.len() > ROOT_BITS {
            warn!(
                roots = roots.len(),
                bits = ROOT_BITS,
                "more roots than mask bits; root bits will alias"
            );
        }

        let mut bits = Vec::with_capacity(roots.len());
        let mut marked = 0;
        for (i, &root) in roots.iter().enumerate() {
            let bit = 1u64 << (i % ROOT_BITS);
            marked += self.walk(
                |node| Direction::Children.expand(node),
                vec![root],
                or_mask(bit),
            );
            bits.push(bit);
        }
        debug!(roots = roots.len(), marked, "marked root reachability");
        bits
    }

    /// Nodes whose value equals `value`, in arena order.
    #[must_use]
    pub fn nodes_with(&self, value: u64) -> Vec<&'g Node<S>> {
        self.select(|v| v == value)
    }

    /// Nodes whose value lies in `range`, in arena order.
    #[must_use]
    pub fn nodes_in_range<R: RangeBounds<u64>>(&self, range: R) -> Vec<&'g Node<S>> {
        self.select(|v| range.contains(&v))
    }

    /// Nodes carrying every bit of `mask` (`value & mask == mask`).
    #[must_use]
    pub fn nodes_matching(&self, mask: u64) -> Vec<&'g Node<S>> {
        self.select(|v| v & mask == mask)
    }

    /// Count of nodes per distinct value.
    #[must_use]
    pub fn histogram(&self) -> BTreeMap<u64, usize> {
        let mut counts = BTreeMap::new();
        for &value in &self.values {
            *counts.entry(value).or_insert(0) += 1;
        }
        counts
    }

    fn select(&self, keep: impl Fn(u64) -> bool) -> Vec<&'g Node<S>> {
        let graph = self.graph;
        self.values
            .iter()
            .enumerate()
            .filter(|(_, value)| keep(**value))
            .map(|(index, _)| graph.at(index))
            .collect()
    }

    fn traverse<F, I, V>(&mut self, expand: F, starts: I, visit: V) -> Result<usize, GraphError>
    where
        F: Fn(&Node<S>) -> &[NodeId],
        I: IntoIterator<Item = NodeId>,
        V: FnMut(&mut u64) -> bool,
    {
        let mut stack: Vec<NodeId> = starts.into_iter().collect();
        for &start in &stack {
            self.graph.check_owner(start)?;
        }
        stack.reverse();
        Ok(self.walk(expand, stack, visit))
    }

    /// Depth-first walk over handles already checked against the graph.
    fn walk<F, V>(&mut self, expand: F, mut stack: Vec<NodeId>, mut visit: V) -> usize
    where
        F: Fn(&Node<S>) -> &[NodeId],
        V: FnMut(&mut u64) -> bool,
    {
        let graph = self.graph;
        let mut changed = 0;
        while let Some(handle) = stack.pop() {
            if !visit(&mut self.values[handle.index()]) {
                continue;
            }
            changed += 1;
            stack.extend(expand(graph.slot(handle)).iter().copied());
        }
        changed
    }
}

/// Visitor that ORs `mask` in and reports whether anything changed.
fn or_mask(mask: u64) -> impl FnMut(&mut u64) -> bool {
    move |value| {
        if *value & mask == mask {
            false
        } else {
            *value |= mask;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{chain, key, two_roots};

    fn ids<'g>(nodes: &[&'g Node<crate::test_support::TestSeed>]) -> Vec<&'g str> {
        nodes.iter().map(|n| n.id().as_str()).collect()
    }

    #[test]
    fn color_stops_at_already_colored_nodes() {
        let graph = chain(5);
        let mut colors = ColorMap::new(&graph);
        let tip = graph.tips()[0];

        let n2 = graph.handle_of(&key("n2")).expect("n2");
        assert_eq!(colors.color_recursive(3, Direction::Parents, [n2]), Ok(3));
        assert_eq!(colors.color_recursive(3, Direction::Parents, [tip]), Ok(2));
        assert_eq!(colors.color_recursive(3, Direction::Parents, [tip]), Ok(0));
        assert_eq!(ids(&colors.nodes_with(3)).len(), 5);

        assert_eq!(colors.color_recursive(9, Direction::Children, [n2]), Ok(3));
        assert_eq!(ids(&colors.nodes_with(9)), ["n2", "n3", "n4"]);
        assert_eq!(ids(&colors.nodes_with(3)), ["n0", "n1"]);
    }

    #[test]
    fn fill_value_and_reset() {
        let graph = chain(3);
        let mut colors = ColorMap::with_fill(&graph, 7);
        assert_eq!(colors.histogram(), BTreeMap::from([(7, 3)]));

        let root = graph.roots()[0];
        assert_eq!(colors.set(root, 1), Ok(7));
        assert_eq!(colors.get(root), Ok(1));
        colors.reset();
        assert_eq!(colors.get_id(&key("n0")), Ok(7));
    }

    #[test]
    fn mask_accumulates_bits_from_each_root() {
        let graph = two_roots();
        let mut colors = ColorMap::new(&graph);
        let r1 = graph.handle_of(&key("r1")).expect("r1");
        let r2 = graph.handle_of(&key("r2")).expect("r2");

        assert_eq!(colors.mask_recursive(0b01, Direction::Children, [r1]), Ok(3));
        assert_eq!(colors.mask_recursive(0b10, Direction::Children, [r2]), Ok(3));
        assert_eq!(colors.mask_recursive(0b10, Direction::Children, [r2]), Ok(0));

        assert_eq!(colors.get_id(&key("a1")), Ok(0b01));
        assert_eq!(colors.get_id(&key("a2")), Ok(0b10));
        assert_eq!(colors.get_id(&key("m")), Ok(0b11));
        assert_eq!(colors.get_id(&key("solo")), Ok(0));

        assert_eq!(ids(&colors.nodes_matching(0b10)), ["r2", "a2", "m"]);
        assert_eq!(ids(&colors.nodes_in_range(1..=2)), ["r1", "r2", "a1", "a2"]);
        assert_eq!(
            colors.histogram(),
            BTreeMap::from([(0, 1), (0b01, 2), (0b10, 2), (0b11, 1)])
        );
    }

    #[test]
    fn mark_roots_assigns_one_bit_per_root() {
        let graph = two_roots();
        let mut colors = ColorMap::new(&graph);
        assert_eq!(colors.mark_roots(), [0b001, 0b010, 0b100]);

        assert_eq!(colors.get_id(&key("m")), Ok(0b011));
        assert_eq!(colors.get_id(&key("solo")), Ok(0b100));
        assert_eq!(ids(&colors.nodes_with(0b001)), ["r1", "a1"]);
    }

    #[test]
    fn more_than_64_roots_alias() {
        let seeds = (0..66).map(|i| crate::test_support::seed(&format!("r{i}"), &[]));
        let graph = Graph::build(seeds, false).expect("build");
        let mut colors = ColorMap::new(&graph);
        let bits = colors.mark_roots();

        assert_eq!(bits[0], 1);
        assert_eq!(bits[64], 1);
        assert_eq!(bits[65], 2);
        assert_eq!(colors.get_id(&key("r64")), colors.get_id(&key("r0")));
    }

    #[test]
    fn custom_expander_follows_first_parent_only() {
        let graph = two_roots();
        let mut colors = ColorMap::new(&graph);
        let merge = graph.handle_of(&key("m")).expect("m");

        let colored = colors
            .color_recursive_with(5, |node| &node.parents()[..node.parents().len().min(1)], [merge])
            .expect("own handle");
        assert_eq!(colored, 3);
        assert_eq!(ids(&colors.nodes_with(5)), ["r1", "a1", "m"]);
    }

    #[test]
    fn foreign_start_is_rejected_before_any_change() {
        let graph = chain(2);
        let other = chain(2);
        let mut colors = ColorMap::new(&graph);
        let own = graph.roots()[0];
        let foreign = other.roots()[0];

        let err = colors
            .mask_recursive(1, Direction::Children, [own, foreign])
            .expect_err("foreign start");
        assert!(matches!(err, GraphError::OwnerMismatch { .. }));
        assert_eq!(colors.histogram(), BTreeMap::from([(0, 2)]));
    }
}
