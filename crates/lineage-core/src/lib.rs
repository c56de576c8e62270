//! lineage-core library.
//!
//! Commit records and the raw-log parser that produces them.
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums with an [`ErrorCode`] per variant;
//!   `anyhow::Result` only at config-loading edges.
//! - **Logging**: `tracing` macros (`debug!`, `trace!`, `warn!`). No
//!   subscriber is installed here.

#![forbid(unsafe_code)]

pub mod config;
pub mod entry;
pub mod error;
pub mod seed;

pub use config::{LineageConfig, resolve_config};
pub use entry::{Entry, Signature, Summary};
pub use error::ErrorCode;
pub use seed::Seed;
