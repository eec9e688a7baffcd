pub mod browse;
pub mod config;
pub mod prompts;
pub mod ui;
pub mod update;
pub mod watchlist;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use reelbox_config::{Config, PathManager};
use reelbox_core::{JsonFileStore, Watchlist};
use reelbox_sources::{create_catalog, CatalogSource};
use std::sync::Arc;

/// Loaded configuration plus the directories it points at
pub struct Session {
    pub config: Config,
    pub paths: PathManager,
}

impl Session {
    pub fn load() -> Result<Self> {
        let paths = PathManager::default();
        let config_file = paths.config_file();

        let config = Config::load_or_default(&config_file)
            .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
        config
            .validate()
            .map_err(|e| eyre!("Invalid configuration in {}: {}", config_file.display(), e))?;

        Ok(Self { config, paths })
    }

    pub fn open_watchlist(&self) -> Watchlist<JsonFileStore> {
        Watchlist::open(JsonFileStore::new(self.paths.data_dir()))
    }

    pub fn catalog(&self) -> Result<Arc<dyn CatalogSource>> {
        create_catalog(&self.config.catalog).map_err(|e| {
            eyre!(
                "{}. Set catalog.api_key in {} or export OMDB_API_KEY",
                e,
                self.paths.config_file().display()
            )
        })
    }
}
