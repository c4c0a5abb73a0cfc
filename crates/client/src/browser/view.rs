//! Rendered view state returned to the caller after every interaction.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use holocron_core::{DetailField, Kind};

/// Everything visible for the active section.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct View {
    /// Current path, including the selected id.
    pub path: String,
    pub section: Kind,
    pub status: CollectionStatus,
    /// Failure message when `status` is `failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub search: SearchView,
    pub items: Vec<ListItem>,
    pub pagination: PaginationView,
    /// Detail panel; absent when nothing (or nothing known) is selected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<DetailView>,
}

/// Load state of the section's collection.
///
/// While `loading`, items from the previous load (if any) are still listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum CollectionStatus {
    NotLoaded,
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchView {
    /// Text in the search box.
    pub raw: String,
    /// Term the list is filtered by.
    pub applied: String,
    /// Whether `raw` is waiting for the debounce window to close.
    pub pending: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListItem {
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    pub selected: bool,
    /// Path that selects this item.
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PaginationView {
    pub page: usize,
    pub total_pages: usize,
    pub filtered_count: usize,
    pub prev_disabled: bool,
    pub next_disabled: bool,
    /// Numbered page buttons.
    pub pages: Vec<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DetailView {
    pub id: String,
    pub name: String,
    pub fields: Vec<DetailField>,
    pub related_kind: Kind,
    /// True while any related link is still loading.
    pub related_loading: bool,
    pub related: Vec<RelatedLink>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LinkState {
    Pending,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RelatedLink {
    pub url: String,
    pub state: LinkState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
