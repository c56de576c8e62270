//! Immutable commit graph and its builder.
//!
//! # Representation
//!
//! Nodes live in a flat arena (`Vec<Node<S>>`) owned by the [`Graph`].
//! Parent and child links are lists of [`NodeId`] handles into that arena,
//! never references, so there are no ownership cycles. A handle also
//! carries the [`GraphId`] of the graph that issued it; collections bound
//! to a graph compare that tag on every handle they accept.
//!
//! # Edge Direction
//!
//! Edges run child → parent, matching the way history records them. A
//! root has no parents; a tip has no children.
//!
//! # Construction
//!
//! [`Graph::build`] makes three passes over the batch:
//!
//! 1. Index every seed by identifier (duplicate ids are fatal).
//! 2. Resolve each declared parent. Missing parents are fatal unless
//!    pruning is allowed, in which case the edge is dropped and counted.
//! 3. Collect roots and tips, both in input order.
//!
//! The result is read-only. Destructive algorithms work on a
//! [`MutableGraph`](super::MutableGraph) copy.

use std::collections::HashMap;
use std::collections::hash_map::Entry as MapEntry;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use lineage_core::Seed;
use lineage_core::config::GraphConfig;
use petgraph::graph::DiGraph;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::GraphError;

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// Opaque identity of one [`Graph`] instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GraphId(u64);

impl GraphId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a node: the owning graph plus the node's arena index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId {
    graph: GraphId,
    index: usize,
}

impl NodeId {
    #[must_use]
    pub const fn graph(self) -> GraphId {
        self.graph
    }

    /// Position in the owning graph's arena (input order).
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.graph, self.index)
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// One seed plus its resolved links.
#[derive(Debug)]
pub struct Node<S> {
    seed: S,
    handle: NodeId,
    parents: Vec<NodeId>,
    children: Vec<NodeId>,
}

impl<S: Seed> Node<S> {
    #[must_use]
    pub const fn seed(&self) -> &S {
        &self.seed
    }

    #[must_use]
    pub fn id(&self) -> &S::Id {
        self.seed.id()
    }

    #[must_use]
    pub const fn handle(&self) -> NodeId {
        self.handle
    }

    /// Resolved parents, in declared order, minus pruned ones.
    #[must_use]
    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    /// Nodes that list this one as a parent, in input order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    #[must_use]
    pub fn is_tip(&self) -> bool {
        self.children.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// Immutable, fully linked commit graph.
#[derive(Debug)]
pub struct Graph<S: Seed> {
    id: GraphId,
    nodes: Vec<Node<S>>,
    index: HashMap<S::Id, usize>,
    roots: Vec<NodeId>,
    tips: Vec<NodeId>,
    edge_count: usize,
    pruned_edge_count: usize,
}

impl<S: Seed> Graph<S> {
    /// Build a graph from a batch of seeds.
    ///
    /// A parent listed twice by the same seed is linked once.
    ///
    /// # Errors
    ///
    /// - [`GraphError::DuplicateId`] when two seeds share an id.
    /// - [`GraphError::MissingParent`] when a parent is not in the batch
    ///   and `allow_pruning` is false.
    #[instrument(skip(seeds))]
    pub fn build<I>(seeds: I, allow_pruning: bool) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = S>,
    {
        let id = GraphId::next();

        // Pass 1: arena + id index.
        let seeds = seeds.into_iter();
        let mut nodes: Vec<Node<S>> = Vec::with_capacity(seeds.size_hint().0);
        let mut index: HashMap<S::Id, usize> = HashMap::with_capacity(nodes.capacity());
        for seed in seeds {
            let position = nodes.len();
            match index.entry(seed.id().clone()) {
                MapEntry::Occupied(slot) => {
                    return Err(GraphError::DuplicateId {
                        id: slot.key().to_string(),
                    });
                }
                MapEntry::Vacant(slot) => {
                    slot.insert(position);
                }
            }
            nodes.push(Node {
                seed,
                handle: NodeId {
                    graph: id,
                    index: position,
                },
                parents: Vec::new(),
                children: Vec::new(),
            });
        }

        // Pass 2: resolve parents.
        let mut pruned_edge_count = 0;
        let mut resolved: Vec<Vec<usize>> = Vec::with_capacity(nodes.len());
        for node in &nodes {
            let declared = node.seed.parents();
            let mut links = Vec::with_capacity(declared.len());
            for parent in declared {
                match index.get(parent) {
                    Some(&position) => {
                        if !links.contains(&position) {
                            links.push(position);
                        }
                    }
                    None if allow_pruning => {
                        pruned_edge_count += 1;
                        debug!(node = %node.id(), %parent, "pruned edge to missing parent");
                    }
                    None => {
                        return Err(GraphError::MissingParent {
                            node: node.id().to_string(),
                            parent: parent.to_string(),
                        });
                    }
                }
            }
            resolved.push(links);
        }

        let handle = |index| NodeId { graph: id, index };
        let mut edge_count = 0;
        for (child, links) in resolved.into_iter().enumerate() {
            edge_count += links.len();
            for &parent in &links {
                nodes[parent].children.push(handle(child));
            }
            nodes[child].parents = links.into_iter().map(handle).collect();
        }

        // Pass 3: roots and tips.
        let roots: Vec<NodeId> = nodes.iter().filter(|n| n.is_root()).map(Node::handle).collect();
        let tips: Vec<NodeId> = nodes.iter().filter(|n| n.is_tip()).map(Node::handle).collect();

        debug!(
            graph = %id,
            nodes = nodes.len(),
            edges = edge_count,
            roots = roots.len(),
            tips = tips.len(),
            pruned = pruned_edge_count,
            "graph built"
        );

        Ok(Self {
            id,
            nodes,
            index,
            roots,
            tips,
            edge_count,
            pruned_edge_count,
        })
    }

    /// [`build`](Self::build) with the pruning switch taken from config.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn build_with<I>(seeds: I, config: &GraphConfig) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = S>,
    {
        Self::build(seeds, config.allow_pruning)
    }

    #[must_use]
    pub const fn id(&self) -> GraphId {
        self.id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of resolved child → parent edges.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Parent references dropped because they pointed outside the batch.
    #[must_use]
    pub const fn pruned_edge_count(&self) -> usize {
        self.pruned_edge_count
    }

    /// Nodes with no resolved parents, in input order.
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Nodes with no children, in input order.
    #[must_use]
    pub fn tips(&self) -> &[NodeId] {
        &self.tips
    }

    /// The first root's identifier.
    ///
    /// Stable across clones of the same history, so it works as a key for
    /// cataloguing repositories. `None` for an empty (or fully cyclic)
    /// graph.
    #[must_use]
    pub fn root_identity(&self) -> Option<&S::Id> {
        self.roots.first().map(|root| self.slot(*root).id())
    }

    /// All nodes in input order.
    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &Node<S>> + '_ {
        self.nodes.iter()
    }

    /// Look up a node by identifier.
    #[must_use]
    pub fn get(&self, id: &S::Id) -> Option<&Node<S>> {
        self.index.get(id).map(|&position| &self.nodes[position])
    }

    /// Look up a node by identifier, failing when absent.
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeNotFound`] when `id` is not in the graph.
    pub fn lookup(&self, id: &S::Id) -> Result<&Node<S>, GraphError> {
        self.get(id).ok_or_else(|| GraphError::not_found(id))
    }

    #[must_use]
    pub fn handle_of(&self, id: &S::Id) -> Option<NodeId> {
        self.get(id).map(Node::handle)
    }

    #[must_use]
    pub fn contains(&self, id: &S::Id) -> bool {
        self.index.contains_key(id)
    }

    /// Resolve a handle.
    ///
    /// # Errors
    ///
    /// [`GraphError::OwnerMismatch`] when the handle was issued by another
    /// graph.
    pub fn node(&self, handle: NodeId) -> Result<&Node<S>, GraphError> {
        self.check_owner(handle)?;
        Ok(self.slot(handle))
    }

    /// Verify that `handle` was issued by this graph.
    ///
    /// # Errors
    ///
    /// [`GraphError::OwnerMismatch`] otherwise.
    pub fn check_owner(&self, handle: NodeId) -> Result<(), GraphError> {
        if handle.graph == self.id {
            Ok(())
        } else {
            Err(GraphError::OwnerMismatch {
                expected: self.id,
                found: handle.graph,
            })
        }
    }

    /// Export to a petgraph [`DiGraph`] with child → parent edges.
    ///
    /// Petgraph node indices equal arena indices.
    #[must_use]
    pub fn to_digraph(&self) -> DiGraph<S::Id, ()> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.edge_count);
        let indices: Vec<_> = self
            .nodes
            .iter()
            .map(|node| graph.add_node(node.id().clone()))
            .collect();
        for node in &self.nodes {
            let child = indices[node.handle.index];
            for parent in &node.parents {
                graph.add_edge(child, indices[parent.index], ());
            }
        }
        graph
    }

    /// Node behind a handle already known to belong to this graph.
    pub(crate) fn slot(&self, handle: NodeId) -> &Node<S> {
        self.at(handle.index)
    }

    pub(crate) fn at(&self, index: usize) -> &Node<S> {
        &self.nodes[index]
    }
}
