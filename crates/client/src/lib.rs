//! Client code for holocron.
//!
//! This crate provides the HTTP fetch pipeline, cached typed access to the
//! catalog API and the view-state engine driven by the server.

pub mod browser;
pub mod catalog;
pub mod fetch;

#[cfg(test)]
mod testing;

pub use browser::{Browser, BrowserConfig, CollectionStatus, DetailView, LinkState, ListItem, RelatedLink, View};
pub use catalog::{Catalog, entity_key};
pub use fetch::{FetchClient, FetchConfig, FetchResponse, JsonSource};
