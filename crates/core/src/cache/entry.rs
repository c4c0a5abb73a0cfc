//! Cache entry states and reporting types.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::{BoxFuture, Shared};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;

use crate::Error;

/// A fetch shared by every caller waiting on the same key.
pub(crate) type PendingFetch = Shared<BoxFuture<'static, Result<Arc<Value>, Error>>>;

/// Stored state of one key.
pub(crate) enum Entry {
    Loading { generation: u64, fetch: PendingFetch },
    Ready { payload: Arc<Value>, fetched_at: Instant, fetched_at_utc: DateTime<Utc> },
    Failed { error: Error, failed_at_utc: DateTime<Utc> },
}

impl Entry {
    pub(crate) fn state(&self) -> EntryState {
        match self {
            Entry::Loading { .. } => EntryState::Loading,
            Entry::Ready { .. } => EntryState::Success,
            Entry::Failed { .. } => EntryState::Error,
        }
    }
}

/// Externally visible state of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum EntryState {
    /// Never fetched, invalidated or purged.
    Idle,
    Loading,
    Success,
    Error,
}

/// Snapshot of one cache entry.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EntryInfo {
    pub key: String,
    pub state: EntryState,
    /// RFC 3339 time the payload arrived (or the failure was recorded).
    pub fetched_at: Option<String>,
    /// Whether a successful payload is still inside the freshness window.
    pub fresh: bool,
    pub error: Option<String>,
}

/// Aggregate cache counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CacheStats {
    pub entries: usize,
    pub fresh: usize,
    pub stale: usize,
    pub loading: usize,
    pub failed: usize,
    /// Calls served from a fresh entry.
    pub hits: u64,
    /// Calls that started a fetch.
    pub misses: u64,
    /// Calls that joined a fetch already in flight.
    pub coalesced: u64,
}
