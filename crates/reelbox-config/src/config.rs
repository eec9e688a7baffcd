use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound for the update poll interval: the platform is asked at least hourly
pub const MAX_CHECK_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub trailers: TrailerConfig,
    #[serde(default)]
    pub updates: UpdateConfig,
}

/// Metadata API (OMDb) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_catalog_url")]
    pub base_url: String,
}

/// Video-search API (YouTube Data v3) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrailerConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_trailer_url")]
    pub base_url: String,
    /// Fall back to the built-in trailer table when the search fails
    #[serde(default = "default_true")]
    pub demo_fallback: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// Release manifest to poll; updates are disabled when unset
    #[serde(default)]
    pub manifest_url: Option<String>,
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_catalog_url() -> String {
    "https://www.omdbapi.com/".to_string()
}

fn default_trailer_url() -> String {
    "https://www.googleapis.com/youtube/v3/search".to_string()
}

fn default_check_interval_secs() -> u64 {
    MAX_CHECK_INTERVAL_SECS
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_catalog_url(),
        }
    }
}

impl Default for TrailerConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_trailer_url(),
            demo_fallback: default_true(),
        }
    }
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            manifest_url: None,
            check_interval_secs: default_check_interval_secs(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file if present, otherwise defaults; env overrides applied either way
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            Self::load_from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// `OMDB_API_KEY` / `YOUTUBE_API_KEY` take precedence over the file
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("OMDB_API_KEY") {
            if !key.trim().is_empty() {
                self.catalog.api_key = key;
            }
        }
        if let Ok(key) = std::env::var("YOUTUBE_API_KEY") {
            if !key.trim().is_empty() {
                self.trailers.api_key = key;
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !is_http_url(&self.catalog.base_url) {
            return Err(anyhow::anyhow!("catalog.base_url must be an http(s) URL"));
        }
        if !is_http_url(&self.trailers.base_url) {
            return Err(anyhow::anyhow!("trailers.base_url must be an http(s) URL"));
        }
        if let Some(url) = &self.updates.manifest_url {
            if !is_http_url(url) {
                return Err(anyhow::anyhow!("updates.manifest_url must be an http(s) URL"));
            }
        }
        if self.updates.check_interval_secs == 0 {
            return Err(anyhow::anyhow!("updates.check_interval_secs must be positive"));
        }
        if self.updates.check_interval_secs > MAX_CHECK_INTERVAL_SECS {
            return Err(anyhow::anyhow!(
                "updates.check_interval_secs must be at most {} (checks run at least hourly)",
                MAX_CHECK_INTERVAL_SECS
            ));
        }
        Ok(())
    }

    pub fn is_catalog_configured(&self) -> bool {
        !self.catalog.api_key.trim().is_empty()
    }

    pub fn is_trailer_search_configured(&self) -> bool {
        !self.trailers.api_key.trim().is_empty()
    }

    pub fn updates_enabled(&self) -> bool {
        self.updates.manifest_url.is_some()
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}
