//! Builds the external collaborators from configuration.

use reelbox_config::{CatalogConfig, PathManager, TrailerConfig, UpdateConfig};
use reelbox_core::PlatformError;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::SourceError;
use crate::omdb::OmdbClient;
use crate::release::ManifestPlatform;
use crate::traits::{CatalogSource, VideoSearch};
use crate::trailer::TrailerResolver;
use crate::youtube::YoutubeSearch;

pub fn create_catalog(config: &CatalogConfig) -> Result<Arc<dyn CatalogSource>, SourceError> {
    let client = OmdbClient::new(config.api_key.clone(), config.base_url.clone())?;
    Ok(Arc::new(client))
}

/// Without a video-search key the resolver goes straight to the fallback table
pub fn create_trailer_resolver(config: &TrailerConfig) -> TrailerResolver {
    let search: Option<Arc<dyn VideoSearch>> =
        match YoutubeSearch::new(config.api_key.clone(), config.base_url.clone()) {
            Ok(search) => Some(Arc::new(search)),
            Err(SourceError::MissingKey(service)) => {
                debug!("{} key not configured, trailer search disabled", service);
                None
            }
            Err(e) => {
                warn!("Failed to create video search client: {}", e);
                None
            }
        };

    TrailerResolver::new(search, config.demo_fallback)
}

/// `Ok(None)` when no manifest URL is configured: the app has no update capability
pub fn create_update_platform(
    config: &UpdateConfig,
    paths: &PathManager,
) -> Result<Option<Arc<ManifestPlatform>>, PlatformError> {
    let Some(url) = config.manifest_url.as_ref().filter(|u| !u.trim().is_empty()) else {
        debug!("No release manifest configured, updates disabled");
        return Ok(None);
    };

    let platform = ManifestPlatform::new(url.clone(), paths.releases_dir())?;
    Ok(Some(Arc::new(platform)))
}
