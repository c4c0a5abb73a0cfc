//! Client-side search and pagination over an in-memory collection.
//!
//! Matching is a case-insensitive substring test against the entity's
//! display name. Pages are 1-based; an out-of-range page is an empty slice.

mod state;

pub use state::FilterState;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::Resource;

/// One page of a filtered collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, E> {
    pub items: Vec<&'a E>,
    pub page: usize,
    pub total_pages: usize,
    pub filtered_count: usize,
}

impl<E> Page<'_, E> {
    pub fn controls(&self) -> PageControls {
        PageControls::new(self.page, self.total_pages)
    }
}

/// Enabled state of the Prev/Next controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PageControls {
    pub prev_disabled: bool,
    pub next_disabled: bool,
}

impl PageControls {
    pub fn new(page: usize, total_pages: usize) -> Self {
        Self { prev_disabled: page <= 1, next_disabled: page >= total_pages }
    }
}

/// Whether `name` contains `term`, ignoring case. The empty term matches all.
pub fn matches(name: &str, term: &str) -> bool {
    term.is_empty() || name.to_lowercase().contains(&term.to_lowercase())
}

/// Entities whose display name matches `term`, in collection order.
pub fn filter<'a, E: Resource>(collection: &'a [E], term: &str) -> Vec<&'a E> {
    collection.iter().filter(|entity| matches(entity.name(), term)).collect()
}

/// `ceil(count / page_size)`; zero when `page_size` is zero.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 { 0 } else { count.div_ceil(page_size) }
}

/// Filter `collection` by `term` and cut out page `page` of `page_size` items.
pub fn apply<'a, E: Resource>(collection: &'a [E], term: &str, page_size: usize, page: usize) -> Page<'a, E> {
    let filtered = filter(collection, term);
    let filtered_count = filtered.len();
    let total_pages = total_pages(filtered_count, page_size);

    let start = page.checked_sub(1).and_then(|p| p.checked_mul(page_size));
    let items = match start {
        Some(start) if start < filtered_count => {
            let end = start.saturating_add(page_size).min(filtered_count);
            filtered[start..end].to_vec()
        }
        _ => Vec::new(),
    };

    Page { items, page, total_pages, filtered_count }
}
