//! In-memory resource cache for fetched JSON documents.
//!
//! Entries live for the lifetime of the process. It supports:
//!
//! - A freshness window after which an entry is refetched on next use
//! - At most one in-flight fetch per key; concurrent callers share its result
//! - Failures that reach every waiter but never populate the cache
//! - Inspection and purge operations for maintenance tools

pub mod entry;
pub mod store;

pub use crate::Error;

pub use entry::{CacheStats, EntryInfo, EntryState};
pub use store::ResourceCache;
