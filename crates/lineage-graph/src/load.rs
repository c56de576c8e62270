//! Raw log text straight to a [`Graph`].

use std::io::BufRead;

use anyhow::{Context, Result};
use lineage_core::config::LineageConfig;
use lineage_core::entry::{Entry, parse_reader};
use lineage_core::Seed;
use tracing::{debug, instrument};

use crate::graph::Graph;

/// Parse a raw log from `reader` and build a graph of full entries.
///
/// Honors both the parser and graph sections of `config`.
///
/// # Errors
///
/// Fails with context when reading, parsing, or graph construction fails.
pub fn load_graph<R: BufRead>(reader: R, config: &LineageConfig) -> Result<Graph<Entry>> {
    load_graph_as(reader, config)
}

/// Like [`load_graph`], converting each entry first (for example to
/// [`Summary`](lineage_core::Summary)).
///
/// # Errors
///
/// Same as [`load_graph`].
#[instrument(skip_all)]
pub fn load_graph_as<S, R>(reader: R, config: &LineageConfig) -> Result<Graph<S>>
where
    S: Seed + From<Entry>,
    R: BufRead,
{
    let mut seeds = Vec::new();
    for (position, entry) in parse_reader(reader, &config.parser).enumerate() {
        let entry = entry.with_context(|| {
            format!("Failed to read commit log after {position} record(s)")
        })?;
        seeds.push(S::from(entry));
    }
    debug!(records = seeds.len(), "parsed commit log");

    Graph::build_with(seeds, &config.graph).context("Failed to build commit graph")
}
