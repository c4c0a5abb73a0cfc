//! Cache-related MCP tools.
//!
//! This module provides tools for inspecting and purging the in-memory
//! resource cache.

pub mod purge;
pub mod stats;

pub use purge::{CachePurgeParams, purge_impl};
pub use stats::{CacheStatsParams, stats_impl};
