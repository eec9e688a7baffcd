use reelbox_models::WatchlistEntry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Storage key the watchlist lives under
pub const WATCHLIST_KEY: &str = "watchlist";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize watchlist: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write watchlist to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Durable copy of the watchlist.
///
/// `load` never fails: missing, unreadable and unparseable data all come back
/// as `None` and the caller picks the fallback. `save` replaces the whole
/// stored value or leaves the previous one in place.
pub trait WatchlistStore {
    fn load(&self) -> Option<Vec<WatchlistEntry>>;
    fn save(&self, entries: &[WatchlistEntry]) -> Result<(), StoreError>;
}

pub fn encode(entries: &[WatchlistEntry]) -> Result<String, StoreError> {
    Ok(serde_json::to_string_pretty(entries)?)
}

pub fn decode(content: &str) -> Result<Vec<WatchlistEntry>, serde_json::Error> {
    serde_json::from_str(content)
}

/// Watchlist stored as JSON in `<dir>/watchlist.json`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("{}.json", WATCHLIST_KEY)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

impl WatchlistStore for JsonFileStore {
    fn load(&self) -> Option<Vec<WatchlistEntry>> {
        if !self.path.exists() {
            debug!("Watchlist file does not exist: {:?}", self.path);
            return None;
        }

        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read watchlist file {:?}: {}", self.path, e);
                return None;
            }
        };

        match decode(&content) {
            Ok(entries) => {
                info!("Loaded watchlist: {} entries", entries.len());
                Some(entries)
            }
            Err(e) => {
                warn!(
                    operation = "watchlist_load",
                    error = %e,
                    "Stored watchlist could not be parsed, starting empty"
                );
                None
            }
        }
    }

    fn save(&self, entries: &[WatchlistEntry]) -> Result<(), StoreError> {
        let json = encode(entries)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.write_err(e))?;
        }

        // Atomic write: write to temp file, then rename
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, json).map_err(|e| self.write_err(e))?;
        std::fs::rename(&temp_path, &self.path).map_err(|e| self.write_err(e))?;

        debug!("Watchlist saved: {} entries", entries.len());
        Ok(())
    }
}

/// In-memory key/value substitute; clones share the same backing map
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored text under the watchlist key
    pub fn raw(&self) -> Option<String> {
        self.lock().get(WATCHLIST_KEY).cloned()
    }

    pub fn set_raw(&self, content: impl Into<String>) {
        self.lock().insert(WATCHLIST_KEY.to_string(), content.into());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map still holds complete values: writes are single inserts
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl WatchlistStore for MemoryStore {
    fn load(&self) -> Option<Vec<WatchlistEntry>> {
        let content = self.raw()?;
        match decode(&content) {
            Ok(entries) => Some(entries),
            Err(e) => {
                warn!("Stored watchlist could not be parsed: {}", e);
                None
            }
        }
    }

    fn save(&self, entries: &[WatchlistEntry]) -> Result<(), StoreError> {
        let json = encode(entries)?;
        self.set_raw(json);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use reelbox_models::{CatalogItem, MediaType};
    use tempfile::TempDir;

    fn entries() -> Vec<WatchlistEntry> {
        let mut first = WatchlistEntry::new(
            CatalogItem::new("tt0372784", "Batman Begins")
                .with_year("2005")
                .with_media_type(MediaType::Movie),
            Utc::now(),
        );
        first.item.extra.insert("Rated".to_string(), "PG-13".into());
        let mut second = WatchlistEntry::new(
            CatalogItem::new("tt0903747", "Breaking Bad").with_media_type(MediaType::Series),
            Utc::now(),
        );
        second.watched = true;
        vec![first, second]
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        let original = entries();

        store.save(&original).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, original);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_store_absent() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.load().is_none());
    }

    #[test]
    fn test_file_store_corrupted() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        std::fs::write(store.path(), "[{\"imdbID\": \"tt1\", ").unwrap();

        assert!(store.load().is_none());
        // The corrupted file is left for inspection, not deleted
        assert!(store.path().exists());
    }

    #[test]
    fn test_file_store_replaces_prior_value() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        store.save(&entries()).unwrap();
        store.save(&[]).unwrap();

        assert_eq!(store.load().unwrap(), Vec::<WatchlistEntry>::new());
    }

    #[test]
    fn test_memory_store_shares_state() {
        let store = MemoryStore::new();
        let handle = store.clone();
        assert!(store.load().is_none());

        store.save(&entries()).unwrap();
        assert_eq!(handle.load().unwrap().len(), 2);

        handle.set_raw("not json");
        assert!(store.load().is_none());
    }
}
