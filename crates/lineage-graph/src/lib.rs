#![forbid(unsafe_code)]
//! lineage-graph library.
//!
//! Commit-graph construction, topological ordering and reachability over
//! any [`lineage_core::Seed`].
//!
//! # Conventions
//!
//! - **Errors**: [`GraphError`] for library calls; `anyhow::Result` only in
//!   [`load`].
//! - **Logging**: `tracing` macros (`debug!`, `warn!`) and `#[instrument]`.

pub mod error;
pub mod graph;
pub mod load;

#[cfg(test)]
mod test_support;

pub use error::GraphError;
pub use graph::{ColorMap, Direction, Graph, MutableGraph, NodeId, NodeMap, NodeSet};
pub use load::{load_graph, load_graph_as};
