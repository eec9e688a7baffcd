pub mod category;
pub mod details;
pub mod media;
pub mod watchlist;

pub use category::Category;
pub use details::{CatalogDetails, SourceRating};
pub use media::{CatalogItem, MediaType};
pub use watchlist::{WatchFilter, WatchlistEntry};
