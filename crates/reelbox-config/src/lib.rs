pub mod config;
pub mod paths;

pub use config::{CatalogConfig, Config, TrailerConfig, UpdateConfig, MAX_CHECK_INTERVAL_SECS};
pub use paths::{PathManager, home_override};
