//! Debounced search term and current page.
//!
//! The raw term follows every keystroke. Each keystroke (re)schedules a
//! deadline; [`FilterState::tick`] commits the raw term once the deadline has
//! passed. Committing a different term resets the page to 1.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct FilterState {
    raw_term: String,
    term: String,
    page: usize,
    delay: Duration,
    deadline: Option<Instant>,
}

impl FilterState {
    pub fn new(delay: Duration) -> Self {
        Self { raw_term: String::new(), term: String::new(), page: 1, delay, deadline: None }
    }

    /// What the user typed.
    pub fn raw_term(&self) -> &str {
        &self.raw_term
    }

    /// The committed term filtering and pagination react to.
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// When the pending term will be committed, if one is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Record a keystroke and restart the debounce window.
    pub fn type_term(&mut self, term: impl Into<String>, now: Instant) {
        self.raw_term = term.into();
        self.deadline = Some(now + self.delay);
    }

    /// Empty the search box; the list follows after the debounce window.
    pub fn clear(&mut self, now: Instant) {
        self.type_term(String::new(), now);
    }

    /// Commit the raw term if its deadline has passed.
    ///
    /// Returns `true` when the committed term changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.commit()
            }
            _ => false,
        }
    }

    fn commit(&mut self) -> bool {
        if self.raw_term == self.term {
            return false;
        }
        self.term.clone_from(&self.raw_term);
        self.page = 1;
        true
    }

    /// Move forward one page; inert on the last page.
    pub fn next_page(&mut self, total_pages: usize) -> bool {
        if self.page < total_pages {
            self.page += 1;
            true
        } else {
            false
        }
    }

    /// Move back one page; inert on the first page.
    pub fn prev_page(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to `page`, clamped to `[1, total_pages]`.
    pub fn go_to_page(&mut self, page: usize, total_pages: usize) -> bool {
        let target = page.clamp(1, total_pages.max(1));
        let moved = target != self.page;
        self.page = target;
        moved
    }
}
