use chrono::{DateTime, Utc};
use reelbox_models::{CatalogItem, WatchFilter, WatchlistEntry};
use tracing::{debug, info};

use crate::store::{StoreError, WatchlistStore};

/// Entry totals for a watchlist header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WatchlistCounts {
    pub total: usize,
    pub watched: usize,
    pub unwatched: usize,
}

/// The user's saved titles, in insertion order.
///
/// Every mutating call writes the full collection to the store before it
/// returns. The in-memory list only changes once the store accepted the new
/// collection, so both copies stay in step when a write fails.
pub struct Watchlist<S: WatchlistStore> {
    entries: Vec<WatchlistEntry>,
    store: S,
}

impl<S: WatchlistStore> Watchlist<S> {
    /// Load from the store; absent or unreadable data starts an empty list
    pub fn open(store: S) -> Self {
        let entries = store.load().unwrap_or_default();
        info!(
            operation = "watchlist_open",
            entries = entries.len(),
            "Watchlist ready"
        );
        Self { entries, store }
    }

    /// Add a catalog item. Returns `false` when the id is already saved, in
    /// which case the existing entry is kept unchanged.
    pub fn add(&mut self, item: CatalogItem) -> Result<bool, StoreError> {
        self.add_at(item, Utc::now())
    }

    pub fn add_at(
        &mut self,
        item: CatalogItem,
        added_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        if self.contains(&item.id) {
            debug!("Watchlist already contains {}", item.id);
            self.store.save(&self.entries)?;
            return Ok(false);
        }

        let mut next = self.entries.clone();
        info!(
            operation = "watchlist_add",
            id = %item.id,
            title = %item.title,
            "Adding to watchlist"
        );
        next.push(WatchlistEntry::new(item, added_at));
        self.commit(next)?;
        Ok(true)
    }

    /// Remove by id. Returns whether an entry was removed.
    pub fn remove(&mut self, id: &str) -> Result<bool, StoreError> {
        let next: Vec<WatchlistEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.id() != id)
            .cloned()
            .collect();
        let removed = next.len() != self.entries.len();
        if removed {
            info!(operation = "watchlist_remove", id = %id, "Removed from watchlist");
        }
        self.commit(next)?;
        Ok(removed)
    }

    /// Flip the watched flag. Returns the new value, or `None` if the id is not saved.
    pub fn toggle_watched(&mut self, id: &str) -> Result<Option<bool>, StoreError> {
        let mut next = self.entries.clone();
        let toggled = next.iter_mut().find(|entry| entry.id() == id).map(|entry| {
            entry.watched = !entry.watched;
            entry.watched
        });
        if let Some(watched) = toggled {
            info!(operation = "watchlist_toggle", id = %id, watched, "Toggled watched flag");
        }
        self.commit(next)?;
        Ok(toggled)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|entry| entry.id() == id)
    }

    pub fn get(&self, id: &str) -> Option<&WatchlistEntry> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    /// Entries matching `filter`, in insertion order. The iterator is lazy
    /// and can be cloned to walk the list again.
    pub fn list(&self, filter: WatchFilter) -> impl Iterator<Item = &WatchlistEntry> + Clone + '_ {
        self.entries.iter().filter(move |entry| filter.matches(entry))
    }

    pub fn entries(&self) -> &[WatchlistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn counts(&self) -> WatchlistCounts {
        let watched = self.entries.iter().filter(|entry| entry.watched).count();
        WatchlistCounts {
            total: self.entries.len(),
            watched,
            unwatched: self.entries.len() - watched,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn commit(&mut self, next: Vec<WatchlistEntry>) -> Result<(), StoreError> {
        self.store.save(&next)?;
        self.entries = next;
        Ok(())
    }
}
