pub mod error;
pub mod factory;
pub mod feed;
pub mod omdb;
pub mod release;
pub mod traits;
pub mod trailer;
pub mod youtube;

pub use error::SourceError;
pub use factory::{create_catalog, create_trailer_resolver, create_update_platform};
pub use feed::{home_feed, FeedRow, HOME_ROWS};
pub use omdb::OmdbClient;
pub use release::{ManifestPlatform, ReleaseManifest, ReleaseRecord};
pub use traits::{CatalogSource, SearchPage, VideoSearch};
pub use trailer::{
    embed_url, fallback_for, watch_url, TrailerResolver, DEFAULT_TRAILER, FALLBACK_TRAILERS,
};
pub use youtube::YoutubeSearch;
