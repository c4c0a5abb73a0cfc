//! Shared helpers for tool tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rmcp::model::CallToolResult;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;

use holocron_client::{Browser, BrowserConfig, Catalog, JsonSource};
use holocron_core::{Error, ResourceCache};

/// Canned JSON documents keyed by URL, with optional latency.
#[derive(Default)]
pub(crate) struct StubSource {
    responses: HashMap<String, (Duration, Value)>,
}

impl StubSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with(self, url: &str, value: Value) -> Self {
        self.with_delay(url, Duration::ZERO, value)
    }

    pub(crate) fn with_delay(mut self, url: &str, delay: Duration, value: Value) -> Self {
        self.responses.insert(url.to_string(), (delay, value));
        self
    }
}

#[async_trait]
impl JsonSource for StubSource {
    async fn get_json(&self, url: &str) -> Result<Value, Error> {
        let Some((delay, value)) = self.responses.get(url).cloned() else {
            return Err(Error::Fetch(format!("status 404 for {url}")));
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(value)
    }
}

pub(crate) fn catalog(source: StubSource) -> Catalog {
    let source: Arc<dyn JsonSource> = Arc::new(source);
    Catalog::new(source, Arc::new(ResourceCache::new(Duration::from_secs(300))), "https://swapi.info/api")
}

pub(crate) fn browser(source: StubSource) -> Mutex<Browser> {
    Mutex::new(Browser::new(catalog(source), BrowserConfig::default()))
}

/// Decode the JSON text content of a tool result.
pub(crate) fn output<T: DeserializeOwned>(result: &CallToolResult) -> T {
    let content = serde_json::to_value(&result.content[0]).unwrap();
    let text = content
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
