//! Keyed store with freshness and request coalescing.
//!
//! The store lock is only held to read or swap entries, never while a fetch
//! is awaited. An in-flight fetch is a shared future: whichever caller polls
//! it drives it, so abandoning one caller does not cancel the fetch for the
//! others, and a later caller picks the same fetch back up.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::future::FutureExt;
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::entry::{CacheStats, Entry, EntryInfo, EntryState, PendingFetch};
use crate::Error;

#[derive(Default)]
struct Store {
    entries: HashMap<String, Entry>,
    next_generation: u64,
    hits: u64,
    misses: u64,
    coalesced: u64,
}

/// Process-wide resource cache.
///
/// Created once at start-up and shared behind an `Arc`.
pub struct ResourceCache {
    store: Mutex<Store>,
    freshness: Duration,
}

impl std::fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCache").field("freshness", &self.freshness).finish_non_exhaustive()
    }
}

impl ResourceCache {
    pub fn new(freshness: Duration) -> Self {
        Self { store: Mutex::new(Store::default()), freshness }
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    /// Return the payload for `key`, fetching it with `fetch` if needed.
    ///
    /// A fresh payload is returned without calling `fetch`. If a fetch for
    /// `key` is already in flight, this call waits for it instead of starting
    /// another. Otherwise `fetch` is called once and its result stored; an
    /// error is returned to every waiter and leaves no payload behind.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Result<Arc<Value>, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, Error>> + Send + 'static,
    {
        let (generation, pending) = {
            let mut store = self.store.lock().await;

            match store.entries.get(key) {
                Some(Entry::Ready { payload, fetched_at, .. }) if fetched_at.elapsed() < self.freshness => {
                    let payload = Arc::clone(payload);
                    store.hits += 1;
                    tracing::debug!(key, "cache hit");
                    return Ok(payload);
                }
                Some(Entry::Loading { generation, fetch }) => {
                    let joined = (*generation, fetch.clone());
                    store.coalesced += 1;
                    tracing::debug!(key, "joining in-flight fetch");
                    joined
                }
                _ => {
                    let generation = store.next_generation;
                    store.next_generation += 1;
                    store.misses += 1;

                    let pending: PendingFetch = fetch().map(|result| result.map(Arc::new)).boxed().shared();
                    store.entries.insert(key.to_string(), Entry::Loading { generation, fetch: pending.clone() });
                    tracing::debug!(key, generation, "cache miss, fetching");
                    (generation, pending)
                }
            }
        };

        let result = pending.await;
        self.settle(key, generation, &result).await;
        result
    }

    /// Record the outcome of fetch `generation` unless the entry moved on.
    async fn settle(&self, key: &str, generation: u64, result: &Result<Arc<Value>, Error>) {
        let mut store = self.store.lock().await;

        let current = matches!(
            store.entries.get(key),
            Some(Entry::Loading { generation: g, .. }) if *g == generation
        );
        if !current {
            return;
        }

        let entry = match result {
            Ok(payload) => {
                Entry::Ready { payload: Arc::clone(payload), fetched_at: Instant::now(), fetched_at_utc: Utc::now() }
            }
            Err(error) => {
                tracing::warn!(key, %error, "fetch failed");
                Entry::Failed { error: error.clone(), failed_at_utc: Utc::now() }
            }
        };
        store.entries.insert(key.to_string(), entry);
    }

    /// Fresh payload for `key`, without fetching.
    pub async fn peek(&self, key: &str) -> Option<Arc<Value>> {
        let store = self.store.lock().await;
        match store.entries.get(key) {
            Some(Entry::Ready { payload, fetched_at, .. }) if fetched_at.elapsed() < self.freshness => {
                Some(Arc::clone(payload))
            }
            _ => None,
        }
    }

    /// Current state of `key`.
    pub async fn state(&self, key: &str) -> EntryState {
        let store = self.store.lock().await;
        store.entries.get(key).map_or(EntryState::Idle, Entry::state)
    }

    /// Drop `key`. Waiters on an in-flight fetch still get its result, but it is not stored.
    pub async fn invalidate(&self, key: &str) -> bool {
        self.store.lock().await.entries.remove(key).is_some()
    }

    /// Drop stale payloads and recorded failures. In-flight fetches are kept.
    ///
    /// Returns the number of removed entries.
    pub async fn purge_expired(&self) -> usize {
        let freshness = self.freshness;
        let mut store = self.store.lock().await;
        let before = store.entries.len();
        store.entries.retain(|_, entry| match entry {
            Entry::Loading { .. } => true,
            Entry::Ready { fetched_at, .. } => fetched_at.elapsed() < freshness,
            Entry::Failed { .. } => false,
        });
        before - store.entries.len()
    }

    /// Drop every entry that is not in flight.
    pub async fn clear(&self) -> usize {
        let mut store = self.store.lock().await;
        let before = store.entries.len();
        store.entries.retain(|_, entry| matches!(entry, Entry::Loading { .. }));
        before - store.entries.len()
    }

    pub async fn stats(&self) -> CacheStats {
        let store = self.store.lock().await;
        let mut stats = CacheStats {
            entries: store.entries.len(),
            hits: store.hits,
            misses: store.misses,
            coalesced: store.coalesced,
            ..Default::default()
        };

        for entry in store.entries.values() {
            match entry {
                Entry::Loading { .. } => stats.loading += 1,
                Entry::Ready { fetched_at, .. } if fetched_at.elapsed() < self.freshness => stats.fresh += 1,
                Entry::Ready { .. } => stats.stale += 1,
                Entry::Failed { .. } => stats.failed += 1,
            }
        }

        stats
    }

    /// Per-key snapshot, sorted by key.
    pub async fn entries(&self) -> Vec<EntryInfo> {
        let store = self.store.lock().await;
        let mut infos: Vec<EntryInfo> = store
            .entries
            .iter()
            .map(|(key, entry)| {
                let (fetched_at, fresh, error) = match entry {
                    Entry::Loading { .. } => (None, false, None),
                    Entry::Ready { fetched_at, fetched_at_utc, .. } => {
                        (Some(fetched_at_utc.to_rfc3339()), fetched_at.elapsed() < self.freshness, None)
                    }
                    Entry::Failed { error, failed_at_utc } => {
                        (Some(failed_at_utc.to_rfc3339()), false, Some(error.to_string()))
                    }
                };
                EntryInfo { key: key.clone(), state: entry.state(), fetched_at, fresh, error }
            })
            .collect();
        infos.sort_by(|a, b| a.key.cmp(&b.key));
        infos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const FIVE_MINUTES: Duration = Duration::from_secs(300);
    const SLOW: Duration = Duration::from_millis(50);

    fn counting_fetch(
        calls: &Arc<AtomicUsize>, delay: Duration, result: Result<Value, Error>,
    ) -> impl FnOnce() -> futures_util::future::BoxFuture<'static, Result<Value, Error>> + use<> {
        let calls = Arc::clone(calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(delay).await;
                result
            }
            .boxed()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_gets_issue_one_fetch() {
        let cache = ResourceCache::new(FIVE_MINUTES);
        let calls = Arc::new(AtomicUsize::new(0));
        let payload = json!([{ "title": "A New Hope" }]);

        let (a, b) = tokio::join!(
            cache.get_or_fetch("collection:films", counting_fetch(&calls, SLOW, Ok(payload.clone()))),
            cache.get_or_fetch("collection:films", counting_fetch(&calls, SLOW, Ok(json!(null)))),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*a.unwrap(), payload);
        assert_eq!(*b.unwrap(), payload);

        let stats = cache.stats().await;
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.coalesced, 1);
        assert_eq!(stats.fresh, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_entry_served_without_fetch() {
        let cache = ResourceCache::new(FIVE_MINUTES);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_fetch("k", counting_fetch(&calls, Duration::ZERO, Ok(json!(1)))).await.unwrap();
        tokio::time::advance(Duration::from_secs(299)).await;
        let value = cache.get_or_fetch("k", counting_fetch(&calls, Duration::ZERO, Ok(json!(2)))).await.unwrap();

        assert_eq!(*value, json!(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().await.hits, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_entry_is_refetched() {
        let cache = ResourceCache::new(FIVE_MINUTES);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_fetch("k", counting_fetch(&calls, Duration::ZERO, Ok(json!(1)))).await.unwrap();
        tokio::time::advance(FIVE_MINUTES).await;
        assert!(cache.peek("k").await.is_none());

        let value = cache.get_or_fetch("k", counting_fetch(&calls, Duration::ZERO, Ok(json!(2)))).await.unwrap();
        assert_eq!(*value, json!(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_reaches_all_waiters_and_is_not_cached() {
        let cache = ResourceCache::new(FIVE_MINUTES);
        let calls = Arc::new(AtomicUsize::new(0));
        let failure = Err(Error::Fetch("status 503".into()));

        let (a, b) = tokio::join!(
            cache.get_or_fetch("k", counting_fetch(&calls, Duration::from_millis(10), failure.clone())),
            cache.get_or_fetch("k", counting_fetch(&calls, Duration::from_millis(10), Ok(json!("unused")))),
        );
        assert_eq!(a.unwrap_err(), Error::Fetch("status 503".into()));
        assert_eq!(b.unwrap_err(), Error::Fetch("status 503".into()));
        assert_eq!(cache.state("k").await, EntryState::Error);
        assert!(cache.peek("k").await.is_none());

        let retry = cache.get_or_fetch("k", counting_fetch(&calls, Duration::ZERO, Ok(json!("ok")))).await;
        assert_eq!(*retry.unwrap(), json!("ok"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.state("k").await, EntryState::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_fetch_is_resumed_not_restarted() {
        let cache = ResourceCache::new(FIVE_MINUTES);
        let calls = Arc::new(AtomicUsize::new(0));

        let abandoned = tokio::time::timeout(
            Duration::from_millis(10),
            cache.get_or_fetch("k", counting_fetch(&calls, Duration::from_millis(100), Ok(json!("first")))),
        )
        .await;
        assert!(abandoned.is_err());
        assert_eq!(cache.state("k").await, EntryState::Loading);

        let value = cache.get_or_fetch("k", counting_fetch(&calls, Duration::ZERO, Ok(json!("second")))).await;
        assert_eq!(*value.unwrap(), json!("first"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let cache = ResourceCache::new(FIVE_MINUTES);
        let calls = Arc::new(AtomicUsize::new(0));

        let (a, b) = tokio::join!(
            cache.get_or_fetch("a", counting_fetch(&calls, Duration::from_millis(5), Ok(json!("a")))),
            cache.get_or_fetch("b", counting_fetch(&calls, Duration::from_millis(5), Err(Error::Parse("bad".into())))),
        );
        assert!(a.is_ok());
        assert!(b.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.state("a").await, EntryState::Success);
        assert_eq!(cache.state("b").await, EntryState::Error);
        assert_eq!(cache.state("c").await, EntryState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_during_flight_does_not_store() {
        let cache = Arc::new(ResourceCache::new(FIVE_MINUTES));
        let calls = Arc::new(AtomicUsize::new(0));

        let task = {
            let cache = Arc::clone(&cache);
            let fetch = counting_fetch(&calls, SLOW, Ok(json!(1)));
            tokio::spawn(async move { cache.get_or_fetch("k", fetch).await })
        };
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(cache.invalidate("k").await);

        assert_eq!(*task.await.unwrap().unwrap(), json!(1));
        assert_eq!(cache.state("k").await, EntryState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired_and_entries() {
        let cache = ResourceCache::new(FIVE_MINUTES);
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get_or_fetch("old", counting_fetch(&calls, Duration::ZERO, Ok(json!(1)))).await.unwrap();
        tokio::time::advance(Duration::from_secs(400)).await;
        cache.get_or_fetch("new", counting_fetch(&calls, Duration::ZERO, Ok(json!(2)))).await.unwrap();
        let _ = cache.get_or_fetch("bad", counting_fetch(&calls, Duration::ZERO, Err(Error::Fetch("x".into())))).await;

        let stats = cache.stats().await;
        assert_eq!((stats.fresh, stats.stale, stats.failed), (1, 1, 1));

        let infos = cache.entries().await;
        let keys: Vec<_> = infos.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["bad", "new", "old"]);
        assert!(infos[1].fresh);
        assert!(!infos[2].fresh);
        assert!(infos[0].error.as_deref().unwrap_or_default().contains("FETCH_FAILED"));

        assert_eq!(cache.purge_expired().await, 2);
        assert_eq!(cache.state("new").await, EntryState::Success);
        assert_eq!(cache.clear().await, 1);
        assert_eq!(cache.stats().await.entries, 0);
    }
}
