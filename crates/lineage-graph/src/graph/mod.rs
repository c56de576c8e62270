//! Generic commit-graph engine.
//!
//! - [`build`]: the immutable [`Graph`], its nodes and handles.
//! - [`set`] / [`map`]: node-keyed collections bound to one graph.
//! - [`mutable`]: destructible copy and Kahn topological sort.
//! - [`color`]: per-node integer values and reachability marking.
//! - [`reach`]: ancestor / descendant queries.
//! - [`cycles`]: strongly-connected-component diagnostics.
//! - [`stats`]: summary counts.
//!
//! Everything is generic over [`Seed`](lineage_core::Seed), so the same code
//! runs over full [`Entry`](lineage_core::Entry) records or compact
//! [`Summary`](lineage_core::Summary) records.

pub mod build;
pub mod color;
pub mod cycles;
pub mod map;
pub mod mutable;
pub mod reach;
pub mod set;
pub mod stats;

pub use build::{Graph, GraphId, Node, NodeId};
pub use color::{ColorMap, Direction, ROOT_BITS};
pub use cycles::find_cycles;
pub use map::NodeMap;
pub use mutable::MutableGraph;
pub use reach::{ancestors, descendants, is_ancestor};
pub use set::{MissPolicy, NodeSet};
pub use stats::GraphStats;
