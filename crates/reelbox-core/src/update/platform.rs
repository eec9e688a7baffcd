use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;

/// Handle to a fully installed version held back from taking over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitingVersion {
    version: String,
}

impl WaitingVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

/// Install progress reported by the host platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformEvent {
    /// A new version began installing in the background
    InstallStarted { version: String },
    /// The installing version finished. `controller_active` is true when an
    /// older version is still serving the running app (an update rather
    /// than a first install).
    InstallCompleted { controller_active: bool },
}

pub type PlatformEvents = UnboundedReceiver<PlatformEvent>;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("update request failed: {0}")]
    Request(String),
    #[error("update state I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("no version is waiting to activate")]
    NoWaitingVersion,
}

/// Host hooks the update lifecycle depends on
#[async_trait]
pub trait UpdatePlatform: Send + Sync {
    /// Subscribe to install events. `Ok(None)` means the host has no
    /// installable-app support at all.
    async fn register(&self) -> Result<Option<PlatformEvents>, PlatformError>;

    /// Version already installed and waiting, if any (checked at startup)
    async fn waiting_version(&self) -> Result<Option<WaitingVersion>, PlatformError>;

    /// Tell the waiting version to take over now
    async fn skip_waiting(&self, waiting: &WaitingVersion) -> Result<(), PlatformError>;

    /// Reload the running app
    async fn reload(&self) -> Result<(), PlatformError>;

    /// Ask the platform to look for a new version now
    async fn check_now(&self) -> Result<(), PlatformError>;
}
