//! Per-node values bound to one [`Graph`].

use lineage_core::Seed;

use super::build::{Graph, Node, NodeId};
use super::set::MissPolicy;
use crate::error::GraphError;

/// Map from nodes of a single graph to values of type `T`.
///
/// Storage is a dense slot per arena index, so lookups are O(1).
#[derive(Debug, Clone)]
pub struct NodeMap<'g, S: Seed, T> {
    graph: &'g Graph<S>,
    slots: Vec<Option<T>>,
    len: usize,
    policy: MissPolicy,
}

impl<'g, S: Seed, T> NodeMap<'g, S, T> {
    #[must_use]
    pub fn new(graph: &'g Graph<S>) -> Self {
        Self::with_policy(graph, MissPolicy::default())
    }

    #[must_use]
    pub fn with_policy(graph: &'g Graph<S>, policy: MissPolicy) -> Self {
        let mut slots = Vec::with_capacity(graph.len());
        slots.resize_with(graph.len(), || None);
        Self {
            graph,
            slots,
            len: 0,
            policy,
        }
    }

    #[must_use]
    pub const fn graph(&self) -> &'g Graph<S> {
        self.graph
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Store a value, returning the previous one.
    ///
    /// # Errors
    ///
    /// [`GraphError::OwnerMismatch`] for a handle from another graph.
    pub fn insert(&mut self, handle: NodeId, value: T) -> Result<Option<T>, GraphError> {
        self.graph.check_owner(handle)?;
        let previous = self.slots[handle.index()].replace(value);
        if previous.is_none() {
            self.len += 1;
        }
        Ok(previous)
    }

    /// # Errors
    ///
    /// [`GraphError::OwnerMismatch`] for a node of another graph.
    pub fn insert_node(&mut self, node: &Node<S>, value: T) -> Result<Option<T>, GraphError> {
        self.insert(node.handle(), value)
    }

    /// Store a value under an identifier.
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeNotFound`] when `id` is not in the graph.
    pub fn insert_id(&mut self, id: &S::Id, value: T) -> Result<Option<T>, GraphError> {
        let handle = self.graph.lookup(id)?.handle();
        self.insert(handle, value)
    }

    /// Value for a node, `None` when nothing is stored.
    ///
    /// # Errors
    ///
    /// [`GraphError::OwnerMismatch`] for a handle from another graph.
    pub fn get(&self, handle: NodeId) -> Result<Option<&T>, GraphError> {
        self.graph.check_owner(handle)?;
        Ok(self.slots[handle.index()].as_ref())
    }

    /// # Errors
    ///
    /// [`GraphError::OwnerMismatch`] for a handle from another graph.
    pub fn get_mut(&mut self, handle: NodeId) -> Result<Option<&mut T>, GraphError> {
        self.graph.check_owner(handle)?;
        Ok(self.slots[handle.index()].as_mut())
    }

    /// Value for an identifier, subject to the miss policy.
    ///
    /// Under [`MissPolicy::Error`] an unknown identifier is
    /// [`GraphError::NodeNotFound`] and a known node without a value is
    /// [`GraphError::KeyNotFound`]. Under [`MissPolicy::Default`] both are
    /// `Ok(None)`.
    ///
    /// # Errors
    ///
    /// As described above.
    pub fn get_id(&self, id: &S::Id) -> Result<Option<&T>, GraphError> {
        let Some(node) = self.graph.get(id) else {
            return match self.policy {
                MissPolicy::Default => Ok(None),
                MissPolicy::Error => Err(GraphError::not_found(id)),
            };
        };
        match (self.slots[node.handle().index()].as_ref(), self.policy) {
            (Some(value), _) => Ok(Some(value)),
            (None, MissPolicy::Default) => Ok(None),
            (None, MissPolicy::Error) => Err(GraphError::KeyNotFound { id: id.to_string() }),
        }
    }

    /// Value for a node, inserting `make()` first when absent.
    ///
    /// # Errors
    ///
    /// [`GraphError::OwnerMismatch`] for a handle from another graph.
    pub fn get_or_insert_with<F>(&mut self, handle: NodeId, make: F) -> Result<&mut T, GraphError>
    where
        F: FnOnce() -> T,
    {
        self.graph.check_owner(handle)?;
        let slot = &mut self.slots[handle.index()];
        if slot.is_none() {
            self.len += 1;
        }
        Ok(slot.get_or_insert_with(make))
    }

    /// Remove and return the value for a node.
    ///
    /// # Errors
    ///
    /// [`GraphError::OwnerMismatch`] for a handle from another graph.
    pub fn remove(&mut self, handle: NodeId) -> Result<Option<T>, GraphError> {
        self.graph.check_owner(handle)?;
        let previous = self.slots[handle.index()].take();
        if previous.is_some() {
            self.len -= 1;
        }
        Ok(previous)
    }

    /// # Errors
    ///
    /// [`GraphError::OwnerMismatch`] for a handle from another graph.
    pub fn contains(&self, handle: NodeId) -> Result<bool, GraphError> {
        Ok(self.get(handle)?.is_some())
    }

    /// Stored entries in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (&'g Node<S>, &T)> + '_ {
        let graph = self.graph;
        self.slots
            .iter()
            .enumerate()
            .filter_map(move |(index, slot)| slot.as_ref().map(|value| (graph.at(index), value)))
    }
}
