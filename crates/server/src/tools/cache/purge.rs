//! cache_purge tool implementation.
//!
//! Removes one key, every expired entry, or everything not in flight.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use holocron_core::{Error, ResourceCache};

use crate::tools::json_result;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Remove only this key (e.g. "collection:films").
    #[serde(default)]
    pub key: Option<String>,

    /// Remove only stale payloads and recorded failures.
    #[serde(default)]
    pub expired_only: bool,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Number of entries removed.
    pub removed: usize,
}

/// Implementation of the cache_purge tool.
///
/// With neither parameter set, every entry that is not in flight is removed.
pub async fn purge_impl(cache: &ResourceCache, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    let removed = match params.key {
        Some(_) if params.expired_only => {
            return Err(Error::InvalidInput("key and expired_only cannot be combined".to_string()).into());
        }
        Some(key) if key.trim().is_empty() => {
            return Err(Error::InvalidInput("key cannot be empty".to_string()).into());
        }
        Some(key) => usize::from(cache.invalidate(key.trim()).await),
        None if params.expired_only => cache.purge_expired().await,
        None => cache.clear().await,
    };

    tracing::info!(removed, "cache purged");
    json_result(&CachePurgeOutput { removed })
}
