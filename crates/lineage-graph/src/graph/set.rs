//! Set of nodes bound to one [`Graph`].
//!
//! Membership is a [`FixedBitSet`] over the graph's arena indices. Every
//! operation that takes a [`NodeId`] checks that the handle was issued by
//! the bound graph.

use fixedbitset::FixedBitSet;
use lineage_core::Seed;

use super::build::{Graph, Node, NodeId};
use crate::error::GraphError;

/// What identifier lookups do when the identifier is not in the graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissPolicy {
    /// Fail with [`GraphError::NodeNotFound`] / [`GraphError::KeyNotFound`].
    #[default]
    Error,
    /// Answer with the empty value (`false`, `None`).
    Default,
}

/// Set of nodes of a single graph.
#[derive(Debug, Clone)]
pub struct NodeSet<'g, S: Seed> {
    graph: &'g Graph<S>,
    bits: FixedBitSet,
    policy: MissPolicy,
}

impl<'g, S: Seed> NodeSet<'g, S> {
    #[must_use]
    pub fn new(graph: &'g Graph<S>) -> Self {
        Self::with_policy(graph, MissPolicy::default())
    }

    #[must_use]
    pub fn with_policy(graph: &'g Graph<S>, policy: MissPolicy) -> Self {
        Self {
            graph,
            bits: FixedBitSet::with_capacity(graph.len()),
            policy,
        }
    }

    #[must_use]
    pub const fn graph(&self) -> &'g Graph<S> {
        self.graph
    }

    #[must_use]
    pub const fn policy(&self) -> MissPolicy {
        self.policy
    }

    /// Add a node. Returns `true` if it was not already present.
    ///
    /// # Errors
    ///
    /// [`GraphError::OwnerMismatch`] for a handle from another graph.
    pub fn insert(&mut self, handle: NodeId) -> Result<bool, GraphError> {
        self.graph.check_owner(handle)?;
        Ok(!self.bits.put(handle.index()))
    }

    /// Add a node by reference.
    ///
    /// # Errors
    ///
    /// [`GraphError::OwnerMismatch`] for a node of another graph.
    pub fn insert_node(&mut self, node: &Node<S>) -> Result<bool, GraphError> {
        self.insert(node.handle())
    }

    /// Add a node by identifier.
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeNotFound`] when `id` is not in the graph.
    pub fn insert_id(&mut self, id: &S::Id) -> Result<bool, GraphError> {
        let node = self.graph.lookup(id)?;
        Ok(!self.bits.put(node.handle().index()))
    }

    /// Add many nodes by identifier and return how many were new.
    ///
    /// With `skip_missing`, identifiers that are not in the graph are
    /// ignored instead of failing the batch.
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeNotFound`] for the first unknown identifier when
    /// `skip_missing` is false. Identifiers before it stay inserted.
    pub fn insert_ids<'i, I>(&mut self, ids: I, skip_missing: bool) -> Result<usize, GraphError>
    where
        I: IntoIterator<Item = &'i S::Id>,
        S::Id: 'i,
    {
        let mut added = 0;
        for id in ids {
            match self.graph.get(id) {
                Some(node) => {
                    if !self.bits.put(node.handle().index()) {
                        added += 1;
                    }
                }
                None if skip_missing => {}
                None => return Err(GraphError::not_found(id)),
            }
        }
        Ok(added)
    }

    /// Remove a node. Returns `true` if it was present.
    ///
    /// # Errors
    ///
    /// [`GraphError::OwnerMismatch`] for a handle from another graph.
    pub fn remove(&mut self, handle: NodeId) -> Result<bool, GraphError> {
        self.graph.check_owner(handle)?;
        let present = self.bits.contains(handle.index());
        self.bits.set(handle.index(), false);
        Ok(present)
    }

    /// # Errors
    ///
    /// [`GraphError::OwnerMismatch`] for a handle from another graph.
    pub fn contains(&self, handle: NodeId) -> Result<bool, GraphError> {
        self.graph.check_owner(handle)?;
        Ok(self.bits.contains(handle.index()))
    }

    /// Membership by identifier.
    ///
    /// An identifier outside the graph is an error under
    /// [`MissPolicy::Error`] and `false` under [`MissPolicy::Default`].
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeNotFound`] as described above.
    pub fn contains_id(&self, id: &S::Id) -> Result<bool, GraphError> {
        match (self.graph.get(id), self.policy) {
            (Some(node), _) => Ok(self.bits.contains(node.handle().index())),
            (None, MissPolicy::Default) => Ok(false),
            (None, MissPolicy::Error) => Err(GraphError::not_found(id)),
        }
    }

    /// Add every member of `other`.
    ///
    /// # Errors
    ///
    /// [`GraphError::OwnerMismatch`] when `other` is bound to another graph.
    pub fn union_with(&mut self, other: &NodeSet<'_, S>) -> Result<(), GraphError> {
        if other.graph.id() != self.graph.id() {
            return Err(GraphError::OwnerMismatch {
                expected: self.graph.id(),
                found: other.graph.id(),
            });
        }
        self.bits.union_with(&other.bits);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.count_ones(..)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.ones().next().is_none()
    }

    pub fn clear(&mut self) {
        self.bits.clear();
    }

    /// Member handles in arena order.
    pub fn handles(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.iter().map(Node::handle)
    }

    /// Member nodes in arena order.
    pub fn iter(&self) -> impl Iterator<Item = &'g Node<S>> + '_ {
        let graph = self.graph;
        self.bits.ones().map(move |index| graph.at(index))
    }

    /// Member identifiers in arena order.
    pub fn ids(&self) -> impl Iterator<Item = &'g S::Id> + '_ {
        self.iter().map(Node::id)
    }
}
