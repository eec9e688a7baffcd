pub mod store;
pub mod update;
pub mod watchlist;

pub use store::{JsonFileStore, MemoryStore, StoreError, WatchlistStore, WATCHLIST_KEY};
pub use update::{
    PlatformError, PlatformEvent, PlatformEvents, UpdateController, UpdateListener, UpdatePlatform,
    UpdatePoller, UpdateState, WaitingVersion,
};
pub use watchlist::{Watchlist, WatchlistCounts};
