use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::media::CatalogItem;

/// A saved catalog item.
///
/// Serialized flat: the catalog fields followed by `addedAt` and `watched`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistEntry {
    #[serde(flatten)]
    pub item: CatalogItem,
    #[serde(rename = "addedAt")]
    pub added_at: DateTime<Utc>,
    #[serde(default)]
    pub watched: bool,
}

impl WatchlistEntry {
    pub fn new(item: CatalogItem, added_at: DateTime<Utc>) -> Self {
        Self {
            item,
            added_at,
            watched: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.item.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchFilter {
    #[default]
    All,
    Watched,
    Unwatched,
}

impl WatchFilter {
    pub fn matches(self, entry: &WatchlistEntry) -> bool {
        match self {
            WatchFilter::All => true,
            WatchFilter::Watched => entry.watched,
            WatchFilter::Unwatched => !entry.watched,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WatchFilter::All => "all",
            WatchFilter::Watched => "watched",
            WatchFilter::Unwatched => "unwatched",
        }
    }
}

impl FromStr for WatchFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(WatchFilter::All),
            "watched" => Ok(WatchFilter::Watched),
            "unwatched" => Ok(WatchFilter::Unwatched),
            _ => Err(format!("Invalid filter: {}. Use 'all', 'watched', or 'unwatched'", s)),
        }
    }
}

impl fmt::Display for WatchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
