use anyhow::Result;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "reelbox";

/// Base directory override (`REELBOX_HOME`), used by tests and portable installs
pub fn home_override() -> Option<PathBuf> {
    std::env::var_os("REELBOX_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

pub struct PathManager {
    config_dir: PathBuf,
    data_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join(APP_DIR);

        Ok(Self::from_base(base_dir))
    }

    /// Lay everything out under a single directory: config at the top, data and logs in subdirs
    pub fn from_base(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            config_dir: base.clone(),
            data_dir: base.join("data"),
            log_dir: base.join("logs"),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn releases_dir(&self) -> PathBuf {
        self.data_dir.join("releases")
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn session_log_file(&self) -> PathBuf {
        self.log_dir.join("reelbox.log")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        std::fs::create_dir_all(self.releases_dir())?;
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        if let Some(base) = home_override() {
            return Self::from_base(base);
        }

        // Platform-specific paths (e.g., ~/.config/reelbox on Linux), falling back to the cwd
        Self::new().unwrap_or_else(|_| Self::from_base(PathBuf::from(".").join(APP_DIR)))
    }
}
