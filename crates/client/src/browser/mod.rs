//! View-state engine for browsing the catalog.
//!
//! A [`Browser`] owns one section per [`Kind`]. Navigating to a path mounts
//! that section: its collection is (re)loaded through the shared cache and the
//! routed id becomes the selection, which starts the related fetches shown in
//! the detail panel. Search and pagination state is kept per section, so
//! switching back and forth preserves it.
//!
//! Network loads run on background tasks. Their results are applied by
//! [`Browser::refresh`] or the `settle_*` methods; until then the view shows
//! the affected panel as loading.
//!
//! Time only moves through [`Browser::tick`]; a pending search term is
//! committed when its debounce deadline has passed.

mod section;
pub mod view;

use std::time::Duration;

use tokio::time::Instant;

use holocron_core::{AppConfig, Character, Error, FilterState, Film, Kind, Route};

use crate::catalog::Catalog;
use section::Section;

pub use view::{CollectionStatus, DetailView, LinkState, ListItem, PaginationView, RelatedLink, SearchView, View};

/// Presentation settings for the browser.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Items per page (default: 20)
    pub page_size: usize,

    /// Quiet period before a typed search term applies (default: 1s)
    pub debounce: Duration,

    /// Maximum characters of a list excerpt (default: 128)
    pub excerpt_chars: usize,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self { page_size: 20, debounce: Duration::from_millis(1000), excerpt_chars: 128 }
    }
}

impl From<&AppConfig> for BrowserConfig {
    fn from(config: &AppConfig) -> Self {
        Self { page_size: config.page_size, debounce: config.debounce(), excerpt_chars: config.excerpt_chars }
    }
}

/// Navigation, search and pagination state over both catalog sections.
pub struct Browser {
    catalog: Catalog,
    config: BrowserConfig,
    active: Kind,
    films: Section<Film>,
    characters: Section<Character>,
}

impl Browser {
    pub fn new(catalog: Catalog, config: BrowserConfig) -> Self {
        Self {
            films: Section::new(config.debounce),
            characters: Section::new(config.debounce),
            active: Kind::Films,
            catalog,
            config,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    pub fn active(&self) -> Kind {
        self.active
    }

    /// Current path of the active section.
    pub fn route(&self) -> Route {
        let id = match self.active {
            Kind::Films => self.films.selected(),
            Kind::Characters => self.characters.selected(),
        };
        Route { section: self.active, id: id.map(str::to_string) }
    }

    /// Go to `path`, mounting its section and applying its selection.
    ///
    /// Does not wait for the network. Collection and related failures are
    /// reported through [`Browser::render`]; only an unroutable path is an error.
    pub async fn navigate(&mut self, path: &str) -> Result<Route, Error> {
        let route = Route::parse(path)?;
        tracing::debug!(%route, "navigate");

        self.active = route.section;
        match route.section {
            Kind::Films => self.films.open(&self.catalog, route.id).await,
            Kind::Characters => self.characters.open(&self.catalog, route.id).await,
        }

        Ok(self.route())
    }

    /// Type into the active section's search box.
    pub fn type_search(&mut self, term: &str) {
        self.filter_mut().type_term(term, Instant::now());
    }

    pub fn clear_search(&mut self) {
        self.filter_mut().clear(Instant::now());
    }

    /// Commit search terms whose debounce window has closed.
    ///
    /// Returns `true` when the active section's applied term changed.
    pub fn tick(&mut self) -> bool {
        let now = Instant::now();
        let films = self.films.filter_mut().tick(now);
        let characters = self.characters.filter_mut().tick(now);
        match self.active {
            Kind::Films => films,
            Kind::Characters => characters,
        }
    }

    /// When the active section's pending search term will apply.
    pub fn search_deadline(&self) -> Option<Instant> {
        self.filter().deadline()
    }

    /// Wait out the active section's debounce window, then commit.
    pub async fn settle_search(&mut self) -> bool {
        if let Some(deadline) = self.search_deadline() {
            tokio::time::sleep_until(deadline).await;
        }
        self.tick()
    }

    pub fn next_page(&mut self) -> bool {
        let total = self.total_pages();
        self.filter_mut().next_page(total)
    }

    pub fn prev_page(&mut self) -> bool {
        self.filter_mut().prev_page()
    }

    /// Jump to a numbered page, clamped to the available range.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        let total = self.total_pages();
        self.filter_mut().go_to_page(page, total)
    }

    /// Commit due search terms and apply background results that have arrived.
    pub fn refresh(&mut self) {
        self.tick();
        self.films.drain(&self.catalog);
        self.characters.drain(&self.catalog);
    }

    /// Whether the active section's collection is still loading.
    pub fn is_loading(&self) -> bool {
        match self.active {
            Kind::Films => self.films.is_loading(),
            Kind::Characters => self.characters.is_loading(),
        }
    }

    /// Whether the active detail panel still has related links in flight.
    pub fn is_related_loading(&self) -> bool {
        match self.active {
            Kind::Films => self.films.is_related_loading(),
            Kind::Characters => self.characters.is_related_loading(),
        }
    }

    /// Wait for the active section's collection load and apply it.
    pub async fn settle_collection(&mut self) {
        match self.active {
            Kind::Films => self.films.settle_collection(&self.catalog).await,
            Kind::Characters => self.characters.settle_collection(&self.catalog).await,
        }
    }

    /// Wait until the active section's collection and every related link of
    /// its selection have settled.
    pub async fn settle_related(&mut self) {
        match self.active {
            Kind::Films => self.films.settle_related(&self.catalog).await,
            Kind::Characters => self.characters.settle_related(&self.catalog).await,
        }
    }

    /// Snapshot of the active section.
    pub fn render(&self) -> View {
        let BrowserConfig { page_size, excerpt_chars, .. } = self.config;
        match self.active {
            Kind::Films => self.films.view(page_size, excerpt_chars),
            Kind::Characters => self.characters.view(page_size, excerpt_chars),
        }
    }

    fn total_pages(&self) -> usize {
        match self.active {
            Kind::Films => self.films.total_pages(self.config.page_size),
            Kind::Characters => self.characters.total_pages(self.config.page_size),
        }
    }

    fn filter(&self) -> &FilterState {
        match self.active {
            Kind::Films => self.films.filter(),
            Kind::Characters => self.characters.filter(),
        }
    }

    fn filter_mut(&mut self) -> &mut FilterState {
        match self.active {
            Kind::Films => self.films.filter_mut(),
            Kind::Characters => self.characters.filter_mut(),
        }
    }
}
