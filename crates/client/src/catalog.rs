//! Collection and cross-reference fetchers.
//!
//! Every document goes through the shared [`ResourceCache`]: collections
//! under `collection:<section>`, single entities under `entity:<canonical url>`.
//! The cache stores raw JSON; typed decoding happens on every read.
//!
//! Background loads bump a progress counter after delivering their result,
//! so a caller can wait for the next delivery without holding view state.

use std::sync::Arc;

use futures_util::future::join_all;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};

use holocron_core::{CrossRefs, Error, RelatedUpdate, Resource, ResourceCache, Slot};

use crate::fetch::{JsonSource, canonicalize, collection_url};

/// Typed, cached access to the catalog API.
#[derive(Clone)]
pub struct Catalog {
    source: Arc<dyn JsonSource>,
    cache: Arc<ResourceCache>,
    base_url: String,
    progress: Arc<watch::Sender<u64>>,
}

/// Pending result of a background collection load.
pub type CollectionLoad<E> = oneshot::Receiver<Result<Arc<Vec<E>>, Error>>;

impl Catalog {
    pub fn new(source: Arc<dyn JsonSource>, cache: Arc<ResourceCache>, base_url: impl Into<String>) -> Self {
        let (progress, _) = watch::channel(0);
        Self { source, cache, base_url: base_url.into(), progress: Arc::new(progress) }
    }

    pub fn cache(&self) -> &Arc<ResourceCache> {
        &self.cache
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the whole collection of `E`, in API order.
    pub async fn fetch_all<E: Resource>(&self) -> Result<Vec<E>, Error> {
        let url = collection_url(&self.base_url, E::KIND)?;
        let value = self.load(&E::KIND.collection_key(), url.to_string()).await?;
        decode_collection(&value)
    }

    /// The collection of `E` if the cache holds a fresh copy. Never fetches.
    pub async fn peek_all<E: Resource>(&self) -> Option<Result<Vec<E>, Error>> {
        let value = self.cache.peek(&E::KIND.collection_key()).await?;
        Some(decode_collection(&value))
    }

    /// Load the collection of `E` on a background task.
    ///
    /// The result arrives on the returned receiver; the progress counter is
    /// bumped once it has been sent.
    pub fn spawn_collection<E: Resource>(&self) -> CollectionLoad<E> {
        let (tx, rx) = oneshot::channel();
        let catalog = self.clone();

        tokio::spawn(async move {
            let result = catalog.fetch_all::<E>().await.map(Arc::new);
            if tx.send(result).is_err() {
                tracing::debug!(section = %E::KIND, "collection result no longer wanted");
            }
            catalog.bump();
        });

        rx
    }

    /// Fetch the single entity at `url`.
    pub async fn fetch_one<E: Resource>(&self, url: &str) -> Result<E, Error> {
        let url = canonicalize(url)?;
        let value = self.load(&entity_key(url.as_str()), url.to_string()).await?;
        E::deserialize(value.as_ref()).map_err(|e| Error::Parse(format!("{url}: {e}")))
    }

    /// Fetch every URL concurrently; slots come back in `urls` order.
    pub async fn fetch_many<E: Resource>(&self, urls: &[String]) -> CrossRefs<E> {
        let results = join_all(urls.iter().map(|url| self.fetch_one::<E>(url))).await;
        let slots = urls.iter().cloned().zip(results.into_iter().map(Slot::from)).collect();
        CrossRefs::from_slots(slots)
    }

    /// Start one background fetch per URL and stream settled slots.
    ///
    /// Each update carries `selection` and the URL's index. Dropping the
    /// receiver abandons delivery; fetches already started still finish and
    /// populate the cache.
    pub fn spawn_related<E: Resource>(
        &self, selection: &str, urls: &[String],
    ) -> mpsc::UnboundedReceiver<RelatedUpdate<E>> {
        let (tx, rx) = mpsc::unbounded_channel();

        for (index, url) in urls.iter().enumerate() {
            let catalog = self.clone();
            let tx = tx.clone();
            let url = url.clone();
            let selection = selection.to_string();

            tokio::spawn(async move {
                let slot = Slot::from(catalog.fetch_one::<E>(&url).await);
                if tx.send(RelatedUpdate { selection, index, slot }).is_err() {
                    tracing::debug!(url, "related result no longer wanted");
                }
                catalog.bump();
            });
        }

        rx
    }

    /// Watch the progress counter; `changed()` resolves after the next
    /// background delivery.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.progress.subscribe()
    }

    fn bump(&self) {
        self.progress.send_modify(|n| *n = n.wrapping_add(1));
    }

    async fn load(&self, key: &str, url: String) -> Result<Arc<Value>, Error> {
        let source = Arc::clone(&self.source);
        self.cache
            .get_or_fetch(key, move || async move { source.get_json(&url).await })
            .await
    }
}

fn decode_collection<E: Resource>(value: &Value) -> Result<Vec<E>, Error> {
    Vec::<E>::deserialize(value).map_err(|e| Error::Parse(format!("{} collection: {e}", E::KIND)))
}

/// Cache key of a single entity document.
pub fn entity_key(canonical_url: &str) -> String {
    format!("entity:{canonical_url}")
}
