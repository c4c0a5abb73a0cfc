//! cache_stats tool implementation.
//!
//! Reports counters and per-key state of the resource cache.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use holocron_core::{CacheStats, EntryInfo, ResourceCache};

use crate::tools::json_result;

/// Parameters for the cache_stats tool (none).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheStatsParams {}

/// Output from the cache_stats tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStatsOutput {
    /// Aggregate counters.
    pub stats: CacheStats,
    /// Every cached key, sorted.
    pub entries: Vec<EntryInfo>,
}

/// Implementation of the cache_stats tool.
pub async fn stats_impl(cache: &ResourceCache, _params: CacheStatsParams) -> Result<CallToolResult, McpError> {
    let output = CacheStatsOutput { stats: cache.stats().await, entries: cache.entries().await };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::output;
    use holocron_core::{EntryState, Error};
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_stats_empty() {
        let cache = ResourceCache::new(Duration::from_secs(300));
        let result = stats_impl(&cache, CacheStatsParams::default()).await.unwrap();
        let output: CacheStatsOutput = output(&result);
        assert_eq!(output.stats.entries, 0);
        assert!(output.entries.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stats_reports_entries() {
        let cache = ResourceCache::new(Duration::from_secs(300));
        cache.get_or_fetch("collection:films", || async { Ok(json!([])) }).await.unwrap();
        cache.get_or_fetch("collection:films", || async { Ok(json!([])) }).await.unwrap();
        let _ = cache
            .get_or_fetch("entity:https://swapi.info/api/people/9", || async { Err(Error::Fetch("status 404".into())) })
            .await;

        let result = stats_impl(&cache, CacheStatsParams::default()).await.unwrap();
        let output: CacheStatsOutput = output(&result);
        assert_eq!(output.stats.entries, 2);
        assert_eq!(output.stats.fresh, 1);
        assert_eq!(output.stats.failed, 1);
        assert_eq!(output.stats.hits, 1);
        assert_eq!(output.entries[0].key, "collection:films");
        assert_eq!(output.entries[0].state, EntryState::Success);
        assert_eq!(output.entries[1].state, EntryState::Error);
    }
}
