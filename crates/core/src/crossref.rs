//! Independently loading related-entity slots.
//!
//! A selected entity lists related URLs. Each URL gets its own slot that
//! settles to an entity or an error on its own; the set is loading while any
//! slot is still pending. Slot order always matches the requested URL order.

use crate::Error;

/// Load state of one related URL.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot<E> {
    Pending,
    Ready(E),
    Failed(Error),
}

impl<E> Slot<E> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Slot::Pending)
    }

    pub fn entity(&self) -> Option<&E> {
        match self {
            Slot::Ready(entity) => Some(entity),
            _ => None,
        }
    }
}

impl<E> From<Result<E, Error>> for Slot<E> {
    fn from(result: Result<E, Error>) -> Self {
        match result {
            Ok(entity) => Slot::Ready(entity),
            Err(err) => Slot::Failed(err),
        }
    }
}

/// Ordered `(url, slot)` pairs for one selection.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossRefs<E> {
    slots: Vec<(String, Slot<E>)>,
}

impl<E> CrossRefs<E> {
    /// All slots pending, in `urls` order.
    pub fn pending(urls: &[String]) -> Self {
        Self { slots: urls.iter().map(|url| (url.clone(), Slot::Pending)).collect() }
    }

    pub fn from_slots(slots: Vec<(String, Slot<E>)>) -> Self {
        Self { slots }
    }

    pub fn slots(&self) -> &[(String, Slot<E>)] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// True while at least one slot is pending.
    pub fn is_loading(&self) -> bool {
        self.slots.iter().any(|(_, slot)| slot.is_pending())
    }

    /// True when at least one slot settled with an error.
    pub fn has_failures(&self) -> bool {
        self.slots.iter().any(|(_, slot)| matches!(slot, Slot::Failed(_)))
    }

    /// Settle slot `index`. Already settled slots and unknown indexes are left alone.
    pub fn settle(&mut self, index: usize, slot: Slot<E>) -> bool {
        match self.slots.get_mut(index) {
            Some((_, current)) if current.is_pending() => {
                *current = slot;
                true
            }
            _ => false,
        }
    }
}

/// A settled slot tagged with the selection it was requested for.
#[derive(Debug, Clone)]
pub struct RelatedUpdate<E> {
    pub selection: String,
    pub index: usize,
    pub slot: Slot<E>,
}

/// Related slots owned by one selected entity.
///
/// Updates tagged with another selection are stale and dropped.
#[derive(Debug, Clone)]
pub struct RelatedPanel<E> {
    selection: String,
    refs: CrossRefs<E>,
}

impl<E> RelatedPanel<E> {
    pub fn new(selection: impl Into<String>, urls: &[String]) -> Self {
        Self { selection: selection.into(), refs: CrossRefs::pending(urls) }
    }

    pub fn selection(&self) -> &str {
        &self.selection
    }

    pub fn refs(&self) -> &CrossRefs<E> {
        &self.refs
    }

    pub fn is_loading(&self) -> bool {
        self.refs.is_loading()
    }

    pub fn has_failures(&self) -> bool {
        self.refs.has_failures()
    }

    /// Apply `update` if it belongs to this panel's selection.
    pub fn apply(&mut self, update: RelatedUpdate<E>) -> bool {
        if update.selection != self.selection {
            tracing::debug!(stale = %update.selection, current = %self.selection, "discarding related update");
            return false;
        }
        self.refs.settle(update.index, update.slot)
    }
}
