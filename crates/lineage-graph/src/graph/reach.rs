//! Ancestry queries over an immutable [`Graph`].
//!
//! All walks use an explicit stack and a visited bitset, so deep histories
//! do not grow the call stack.

use fixedbitset::FixedBitSet;
use lineage_core::Seed;

use super::build::{Graph, NodeId};
use super::color::Direction;
use super::set::NodeSet;
use crate::error::GraphError;

/// Every node reachable from `start` through parent links, excluding
/// `start` itself.
///
/// # Errors
///
/// [`GraphError::OwnerMismatch`] when `start` belongs to another graph.
pub fn ancestors<S: Seed>(graph: &Graph<S>, start: NodeId) -> Result<NodeSet<'_, S>, GraphError> {
    reachable(graph, start, Direction::Parents)
}

/// Every node reachable from `start` through child links, excluding
/// `start` itself.
///
/// # Errors
///
/// [`GraphError::OwnerMismatch`] when `start` belongs to another graph.
pub fn descendants<S: Seed>(
    graph: &Graph<S>,
    start: NodeId,
) -> Result<NodeSet<'_, S>, GraphError> {
    reachable(graph, start, Direction::Children)
}

/// Whether `ancestor` is reachable from `descendant` through parent links.
///
/// A node is not its own ancestor. Stops as soon as `ancestor` is found.
///
/// # Errors
///
/// [`GraphError::OwnerMismatch`] when either handle belongs to another
/// graph.
pub fn is_ancestor<S: Seed>(
    graph: &Graph<S>,
    ancestor: NodeId,
    descendant: NodeId,
) -> Result<bool, GraphError> {
    graph.check_owner(ancestor)?;
    let start = graph.node(descendant)?;

    let mut seen = FixedBitSet::with_capacity(graph.len());
    let mut stack: Vec<NodeId> = start.parents().to_vec();
    while let Some(handle) = stack.pop() {
        if handle == ancestor {
            return Ok(true);
        }
        if seen.put(handle.index()) {
            continue;
        }
        stack.extend_from_slice(graph.slot(handle).parents());
    }
    Ok(false)
}

fn reachable<S: Seed>(
    graph: &Graph<S>,
    start: NodeId,
    direction: Direction,
) -> Result<NodeSet<'_, S>, GraphError> {
    let origin = graph.node(start)?;
    let mut found = NodeSet::new(graph);
    let mut stack: Vec<NodeId> = direction.expand(origin).to_vec();
    while let Some(handle) = stack.pop() {
        if found.insert(handle)? {
            stack.extend_from_slice(direction.expand(graph.slot(handle)));
        }
    }
    Ok(found)
}
