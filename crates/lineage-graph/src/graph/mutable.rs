//! Destructible graph copy for one-shot algorithms.
//!
//! A [`MutableGraph`] owns its seeds and supports adding and removing edges
//! and nodes. Its main consumer is
//! [`topological_sort_destructive`](MutableGraph::topological_sort_destructive),
//! which removes edges as it goes and consumes the graph.
//!
//! # Kahn Orientation
//!
//! A node's children are treated as its incoming edges and its parents as
//! its outgoing edges. The work stack starts with the tips, so the output
//! runs from tips to roots; every child precedes all of its parents.

use std::collections::HashMap;
use std::collections::hash_map::Entry as MapEntry;

use lineage_core::Seed;
use petgraph::graph::DiGraph;
use tracing::{debug, instrument, warn};

use super::build::Graph;
use super::cycles::cyclic_components;
use crate::error::GraphError;

#[derive(Debug)]
struct Slot<S> {
    seed: S,
    parents: Vec<usize>,
    children: Vec<usize>,
}

/// Mutable, single-use copy of a commit graph.
#[derive(Debug)]
pub struct MutableGraph<S: Seed> {
    slots: Vec<Option<Slot<S>>>,
    index: HashMap<S::Id, usize>,
    live: usize,
}

impl<S: Seed + Clone> MutableGraph<S> {
    /// Copy every seed of `graph` as a standalone node.
    ///
    /// With `link_edges`, edges are re-created from each seed's declared
    /// parents; parents outside the graph are skipped.
    #[must_use]
    pub fn from_graph(graph: &Graph<S>, link_edges: bool) -> Self {
        let mut copy = Self::with_capacity(graph.len());
        for node in graph.nodes() {
            let position = copy.slots.len();
            copy.index.insert(node.id().clone(), position);
            copy.slots.push(Some(Slot {
                seed: node.seed().clone(),
                parents: Vec::new(),
                children: Vec::new(),
            }));
        }
        copy.live = copy.slots.len();
        if link_edges {
            copy.link_declared_parents();
        }
        copy
    }
}

impl<S: Seed> MutableGraph<S> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            live: 0,
        }
    }

    /// Build directly from seeds, skipping the immutable graph.
    ///
    /// # Errors
    ///
    /// [`GraphError::DuplicateId`] when two seeds share an id.
    pub fn from_seeds<I>(seeds: I, link_edges: bool) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = S>,
    {
        let seeds = seeds.into_iter();
        let mut graph = Self::with_capacity(seeds.size_hint().0);
        for seed in seeds {
            let position = graph.slots.len();
            match graph.index.entry(seed.id().clone()) {
                MapEntry::Occupied(slot) => {
                    return Err(GraphError::DuplicateId {
                        id: slot.key().to_string(),
                    });
                }
                MapEntry::Vacant(slot) => {
                    slot.insert(position);
                }
            }
            graph.slots.push(Some(Slot {
                seed,
                parents: Vec::new(),
                children: Vec::new(),
            }));
        }
        graph.live = graph.slots.len();
        if link_edges {
            graph.link_declared_parents();
        }
        Ok(graph)
    }

    fn link_declared_parents(&mut self) {
        let mut edges = Vec::new();
        for (child, slot) in self.slots.iter().enumerate() {
            let Some(slot) = slot else { continue };
            for parent in slot.seed.parents() {
                if let Some(&position) = self.index.get(parent) {
                    edges.push((child, position));
                }
            }
        }
        for (child, parent) in edges {
            self.link(child, parent);
        }
    }

    /// Number of nodes still present.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.live
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    #[must_use]
    pub fn contains(&self, id: &S::Id) -> bool {
        self.index.contains_key(id)
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.slots.iter().flatten().map(|slot| slot.parents.len()).sum()
    }

    /// Identifiers of a node's current parents.
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeNotFound`] when `id` is not present.
    pub fn parents_of(&self, id: &S::Id) -> Result<Vec<&S::Id>, GraphError> {
        let (_, slot) = self.live(id)?;
        Ok(self.ids_at(&slot.parents))
    }

    /// Identifiers of a node's current children.
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeNotFound`] when `id` is not present.
    pub fn children_of(&self, id: &S::Id) -> Result<Vec<&S::Id>, GraphError> {
        let (_, slot) = self.live(id)?;
        Ok(self.ids_at(&slot.children))
    }

    /// Link `child` → `parent`. Returns `false` if the edge already exists
    /// or, with `ignore_missing`, if either endpoint is absent.
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeNotFound`] for an absent endpoint when
    /// `ignore_missing` is false.
    pub fn add_edge(
        &mut self,
        child: &S::Id,
        parent: &S::Id,
        ignore_missing: bool,
    ) -> Result<bool, GraphError> {
        let endpoints = (self.index.get(child), self.index.get(parent));
        let (child, parent) = match endpoints {
            (Some(&child), Some(&parent)) => (child, parent),
            _ if ignore_missing => return Ok(false),
            (None, _) => return Err(GraphError::not_found(child)),
            (_, None) => return Err(GraphError::not_found(parent)),
        };
        Ok(self.link(child, parent))
    }

    /// Unlink `child` → `parent`. Returns `false` if there was no such edge.
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeNotFound`] for an absent endpoint.
    pub fn remove_edge(&mut self, child: &S::Id, parent: &S::Id) -> Result<bool, GraphError> {
        let (child, _) = self.live(child)?;
        let (parent, _) = self.live(parent)?;
        Ok(self.unlink(child, parent))
    }

    /// Sever every edge of a node, then remove it and return its seed.
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeNotFound`] when `id` is not present.
    pub fn remove_node(&mut self, id: &S::Id) -> Result<S, GraphError> {
        let (position, slot) = self.live(id)?;
        let parents = slot.parents.clone();
        let children = slot.children.clone();
        for parent in parents {
            self.unlink(position, parent);
        }
        for child in children {
            self.unlink(child, position);
        }

        self.index.remove(id);
        self.live -= 1;
        self.slots[position]
            .take()
            .map(|slot| slot.seed)
            .ok_or_else(|| GraphError::not_found(id))
    }

    /// Kahn's algorithm, consuming the graph.
    ///
    /// Returns seeds ordered tips to roots: each child comes before every
    /// parent it links to.
    ///
    /// # Errors
    ///
    /// [`GraphError::CycleDetected`] when nodes remain linked after the work
    /// stack drains. The error lists the leftover nodes and the cycles
    /// among them.
    #[instrument(skip(self), fields(nodes = self.live))]
    pub fn topological_sort_destructive(mut self) -> Result<Vec<S>, GraphError> {
        let mut stack: Vec<usize> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(position, slot)| {
                slot.as_ref()
                    .filter(|slot| slot.children.is_empty())
                    .map(|_| position)
            })
            .collect();
        debug!(tips = stack.len(), "seeded work stack");

        let mut order = Vec::with_capacity(self.live);
        while let Some(position) = stack.pop() {
            let Some(slot) = self.slots[position].take() else {
                continue;
            };
            for &parent in &slot.parents {
                if let Some(parent_slot) = self.slots[parent].as_mut() {
                    remove_one(&mut parent_slot.children, position);
                    if parent_slot.children.is_empty() {
                        stack.push(parent);
                    }
                }
            }
            order.push(slot.seed);
        }

        if order.len() == self.live {
            return Ok(order);
        }

        let error = self.cycle_error();
        warn!(
            sorted = order.len(),
            residual = self.live - order.len(),
            "commit graph is not acyclic"
        );
        Err(error)
    }

    /// [`topological_sort_destructive`](Self::topological_sort_destructive)
    /// reversed: roots first, every parent before its children.
    ///
    /// # Errors
    ///
    /// Same as the tips-first sort.
    pub fn topological_sort_roots_first(self) -> Result<Vec<S>, GraphError> {
        let mut order = self.topological_sort_destructive()?;
        order.reverse();
        Ok(order)
    }

    fn cycle_error(&self) -> GraphError {
        let mut residual_graph: DiGraph<String, ()> = DiGraph::new();
        let mut mapped = HashMap::new();
        let mut residual = Vec::new();
        for (position, slot) in self.slots.iter().enumerate() {
            if let Some(slot) = slot {
                let id = slot.seed.id().to_string();
                residual.push(id.clone());
                mapped.insert(position, residual_graph.add_node(id));
            }
        }
        for (position, slot) in self.slots.iter().enumerate() {
            let Some(slot) = slot else { continue };
            for parent in &slot.parents {
                if let (Some(&from), Some(&to)) = (mapped.get(&position), mapped.get(parent)) {
                    residual_graph.add_edge(from, to, ());
                }
            }
        }
        residual.sort_unstable();

        GraphError::CycleDetected {
            residual,
            components: cyclic_components(&residual_graph),
        }
    }

    fn live(&self, id: &S::Id) -> Result<(usize, &Slot<S>), GraphError> {
        self.index
            .get(id)
            .and_then(|&position| Some((position, self.slots.get(position)?.as_ref()?)))
            .ok_or_else(|| GraphError::not_found(id))
    }

    fn ids_at(&self, positions: &[usize]) -> Vec<&S::Id> {
        positions
            .iter()
            .filter_map(|&position| self.slots.get(position)?.as_ref())
            .map(|slot| slot.seed.id())
            .collect()
    }

    fn link(&mut self, child: usize, parent: usize) -> bool {
        let Some(child_slot) = self.slots[child].as_mut() else {
            return false;
        };
        if child_slot.parents.contains(&parent) {
            return false;
        }
        child_slot.parents.push(parent);
        if let Some(parent_slot) = self.slots[parent].as_mut() {
            parent_slot.children.push(child);
        }
        true
    }

    fn unlink(&mut self, child: usize, parent: usize) -> bool {
        let removed = self.slots[child]
            .as_mut()
            .is_some_and(|slot| remove_one(&mut slot.parents, parent));
        if removed {
            if let Some(parent_slot) = self.slots[parent].as_mut() {
                remove_one(&mut parent_slot.children, child);
            }
        }
        removed
    }
}

fn remove_one(list: &mut Vec<usize>, value: usize) -> bool {
    list.iter()
        .position(|&item| item == value)
        .map(|at| list.remove(at))
        .is_some()
}
