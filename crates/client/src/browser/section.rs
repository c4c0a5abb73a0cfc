//! State of one browsable section (films or characters).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::oneshot::error::TryRecvError;

use holocron_core::filter;
use holocron_core::selection;
use holocron_core::{Error, FilterState, RelatedPanel, RelatedUpdate, Resource, Route, Slot};

use super::view::{CollectionStatus, DetailView, LinkState, ListItem, PaginationView, RelatedLink, SearchView, View};
use crate::catalog::{Catalog, CollectionLoad};

enum Collection<E> {
    NotLoaded,
    /// A load is in flight; the previous items, if any, stay visible.
    Loading(Option<Arc<Vec<E>>>),
    Ready(Arc<Vec<E>>),
    Failed(Error),
}

pub(crate) struct Section<E: Resource> {
    filter: FilterState,
    collection: Collection<E>,
    load: Option<CollectionLoad<E>>,
    selected: Option<String>,
    related: Option<RelatedPanel<E::Related>>,
    updates: Option<mpsc::UnboundedReceiver<RelatedUpdate<E::Related>>>,
}

impl<E: Resource> Section<E> {
    pub(crate) fn new(debounce: Duration) -> Self {
        Self {
            filter: FilterState::new(debounce),
            collection: Collection::NotLoaded,
            load: None,
            selected: None,
            related: None,
            updates: None,
        }
    }

    pub(crate) fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub(crate) fn filter_mut(&mut self) -> &mut FilterState {
        &mut self.filter
    }

    pub(crate) fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Whether the collection load is still in flight.
    pub(crate) fn is_loading(&self) -> bool {
        self.load.is_some()
    }

    /// Whether any related link of the selection is still in flight.
    pub(crate) fn is_related_loading(&self) -> bool {
        self.related.as_ref().is_some_and(RelatedPanel::is_loading)
    }

    fn items(&self) -> Option<&[E]> {
        match &self.collection {
            Collection::Ready(items) | Collection::Loading(Some(items)) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Mount the section with the routed selection.
    ///
    /// A fresh cached collection applies at once; otherwise a background load
    /// starts and the section reports `loading` until [`Section::drain`] or
    /// [`Section::settle_collection`] picks up the result. Related links that
    /// failed on a previous mount are requested again.
    pub(crate) async fn open(&mut self, catalog: &Catalog, id: Option<String>) {
        self.selected = id;

        if self.load.is_none() {
            match catalog.peek_all::<E>().await {
                Some(result) => self.apply_collection(result.map(Arc::new)),
                None => {
                    let previous = match &self.collection {
                        Collection::Ready(items) | Collection::Loading(Some(items)) => Some(Arc::clone(items)),
                        _ => None,
                    };
                    self.collection = Collection::Loading(previous);
                    self.load = Some(catalog.spawn_collection::<E>());
                }
            }
        }

        if self.related.as_ref().is_some_and(RelatedPanel::has_failures) {
            tracing::debug!(section = %E::KIND, "retrying failed related links");
            self.related = None;
            self.updates = None;
        }

        self.sync_related(catalog);
    }

    fn apply_collection(&mut self, result: Result<Arc<Vec<E>>, Error>) {
        self.collection = match result {
            Ok(items) => Collection::Ready(items),
            Err(err) => {
                tracing::warn!(section = %E::KIND, error = %err, "collection load failed");
                Collection::Failed(err)
            }
        };
    }

    /// Make the related panel follow the selection.
    ///
    /// A panel already showing the selected entity is kept; otherwise it is
    /// rebuilt and its related loads start, once the entity resolves.
    fn sync_related(&mut self, catalog: &Catalog) {
        let Some(id) = self.selected.clone() else {
            self.related = None;
            self.updates = None;
            return;
        };
        if self.related.as_ref().is_some_and(|panel| panel.selection() == id) {
            return;
        }

        self.related = None;
        self.updates = None;

        let Some(entity) = selection::resolve(self.items(), Some(id.as_str())) else {
            if self.load.is_none() {
                tracing::debug!(section = %E::KIND, id = %id, "selection matches no loaded entity");
            }
            return;
        };

        let urls = entity.related_urls().to_vec();
        self.related = Some(RelatedPanel::new(id.as_str(), &urls));
        self.updates = Some(catalog.spawn_related::<E::Related>(&id, &urls));
    }

    /// Apply background results that have already arrived.
    pub(crate) fn drain(&mut self, catalog: &Catalog) {
        if let Some(load) = self.load.as_mut() {
            let settled = match load.try_recv() {
                Ok(result) => Some(result),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Closed) => Some(Err(abandoned::<E>())),
            };
            if let Some(result) = settled {
                self.load = None;
                self.apply_collection(result);
                self.sync_related(catalog);
            }
        }

        if let (Some(updates), Some(panel)) = (self.updates.as_mut(), self.related.as_mut()) {
            while let Ok(update) = updates.try_recv() {
                panel.apply(update);
            }
        }
    }

    /// Wait for the collection load, if one is in flight, and apply it.
    pub(crate) async fn settle_collection(&mut self, catalog: &Catalog) {
        if let Some(load) = self.load.take() {
            let result = load.await.unwrap_or_else(|_| Err(abandoned::<E>()));
            self.apply_collection(result);
            self.sync_related(catalog);
        }
    }

    /// Wait until the collection and every related slot of the selection have settled.
    pub(crate) async fn settle_related(&mut self, catalog: &Catalog) {
        self.settle_collection(catalog).await;

        if let (Some(updates), Some(panel)) = (self.updates.as_mut(), self.related.as_mut()) {
            while panel.is_loading() {
                match updates.recv().await {
                    Some(update) => {
                        panel.apply(update);
                    }
                    None => break,
                }
            }
        }
    }

    pub(crate) fn total_pages(&self, page_size: usize) -> usize {
        self.items()
            .map_or(0, |items| filter::total_pages(filter::filter(items, self.filter.term()).len(), page_size))
    }

    pub(crate) fn view(&self, page_size: usize, excerpt_chars: usize) -> View {
        let (status, error) = match &self.collection {
            Collection::NotLoaded => (CollectionStatus::NotLoaded, None),
            Collection::Loading(_) => (CollectionStatus::Loading, None),
            Collection::Ready(_) => (CollectionStatus::Ready, None),
            Collection::Failed(err) => (CollectionStatus::Failed, Some(err.to_string())),
        };

        let (items, pagination) = match self.items() {
            Some(collection) => {
                let page = filter::apply(collection, self.filter.term(), page_size, self.filter.page());
                let controls = page.controls();
                let items: Vec<ListItem> =
                    page.items.iter().map(|entity| self.list_item(entity, excerpt_chars)).collect();
                let pagination = PaginationView {
                    page: page.page,
                    total_pages: page.total_pages,
                    filtered_count: page.filtered_count,
                    prev_disabled: controls.prev_disabled,
                    next_disabled: controls.next_disabled,
                    pages: (1..=page.total_pages).collect(),
                };
                (items, pagination)
            }
            None => (
                Vec::new(),
                PaginationView {
                    page: self.filter.page(),
                    total_pages: 0,
                    filtered_count: 0,
                    prev_disabled: true,
                    next_disabled: true,
                    pages: Vec::new(),
                },
            ),
        };

        View {
            path: Route { section: E::KIND, id: self.selected.clone() }.to_path(),
            section: E::KIND,
            status,
            error,
            search: SearchView {
                raw: self.filter.raw_term().to_string(),
                applied: self.filter.term().to_string(),
                pending: self.filter.is_pending(),
            },
            items,
            pagination,
            detail: self.detail(),
        }
    }

    fn list_item(&self, entity: &E, excerpt_chars: usize) -> ListItem {
        let id = entity.id().map(str::to_string);
        ListItem {
            selected: id.is_some() && id == self.selected,
            path: id.as_ref().map(|id| Route::entity(E::KIND, id.as_str()).to_path()),
            id,
            name: entity.name().to_string(),
            excerpt: entity.excerpt(excerpt_chars),
        }
    }

    fn detail(&self) -> Option<DetailView> {
        let entity = selection::resolve(self.items(), self.selected.as_deref())?;
        let id = self.selected.clone()?;
        let panel = self.related.as_ref().filter(|panel| panel.selection() == id);

        let related: Vec<RelatedLink> = panel
            .map(|panel| panel.refs().slots().iter().map(|(url, slot)| related_link(url, slot)).collect())
            .unwrap_or_default();

        Some(DetailView {
            id,
            name: entity.name().to_string(),
            fields: entity.details(),
            related_kind: E::KIND.related(),
            related_loading: panel.is_some_and(RelatedPanel::is_loading),
            related,
        })
    }
}

fn related_link<R: Resource>(url: &str, slot: &Slot<R>) -> RelatedLink {
    let mut link =
        RelatedLink { url: url.to_string(), state: LinkState::Pending, id: None, name: None, path: None, error: None };
    match slot {
        Slot::Pending => {}
        Slot::Ready(entity) => {
            link.state = LinkState::Ready;
            link.id = entity.id().map(str::to_string);
            link.name = Some(entity.name().to_string());
            link.path = entity.id().map(|id| Route::entity(R::KIND, id).to_path());
        }
        Slot::Failed(err) => {
            link.state = LinkState::Failed;
            link.error = Some(err.to_string());
        }
    }
    link
}

fn abandoned<E: Resource>() -> Error {
    Error::Fetch(format!("{} load abandoned", E::KIND))
}
