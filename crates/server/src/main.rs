//! holocron server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use holocron_client::{Browser, BrowserConfig, Catalog, FetchClient, FetchConfig, JsonSource};
use holocron_core::{AppConfig, ResourceCache};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
#[cfg(test)]
mod testing;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(base_url = %config.base_url, "Starting holocron server on stdio transport");

    let source: Arc<dyn JsonSource> = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
    let cache = Arc::new(ResourceCache::new(config.freshness()));
    let catalog = Catalog::new(source, cache, config.base_url.clone());
    let browser = Browser::new(catalog, BrowserConfig::from(&config));

    let handler = handler::HolocronServer::new(browser);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
