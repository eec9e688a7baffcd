//! Update platform backed by a remote release manifest.
//!
//! The releases directory holds at most two records: `installed.json` for the
//! version the app currently runs, and `waiting.json` for a newer version
//! staged by a check and not yet activated.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reelbox_core::{PlatformError, PlatformEvent, PlatformEvents, UpdatePlatform, WaitingVersion};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::sync::Notify;
use tracing::{debug, info, warn};

const INSTALLED_FILE: &str = "installed.json";
const WAITING_FILE: &str = "waiting.json";
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Body served at the manifest URL
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseManifest {
    pub version: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseRecord {
    pub version: String,
    pub recorded_at: DateTime<Utc>,
}

impl ReleaseRecord {
    fn now(version: &str) -> Self {
        Self {
            version: version.to_string(),
            recorded_at: Utc::now(),
        }
    }
}

pub struct ManifestPlatform {
    client: Client,
    manifest_url: String,
    releases_dir: PathBuf,
    events: Mutex<Option<UnboundedSender<PlatformEvent>>>,
    reload_signal: Arc<Notify>,
}

impl ManifestPlatform {
    pub fn new(manifest_url: String, releases_dir: PathBuf) -> Result<Self, PlatformError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| PlatformError::Request(e.to_string()))?;

        Ok(Self {
            client,
            manifest_url,
            releases_dir,
            events: Mutex::new(None),
            reload_signal: Arc::new(Notify::new()),
        })
    }

    /// Fired by `reload()`; the running session waits on it
    pub fn reload_signal(&self) -> Arc<Notify> {
        self.reload_signal.clone()
    }

    pub fn releases_dir(&self) -> &Path {
        &self.releases_dir
    }

    pub async fn installed_version(&self) -> Option<String> {
        read_record(&self.installed_path()).await.map(|r| r.version)
    }

    pub async fn fetch_manifest(&self) -> Result<ReleaseManifest, PlatformError> {
        let response = self
            .client
            .get(&self.manifest_url)
            .send()
            .await
            .map_err(|e| PlatformError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(PlatformError::Request(format!(
                "Failed to fetch release manifest: {}",
                status
            )));
        }

        response
            .json::<ReleaseManifest>()
            .await
            .map_err(|e| PlatformError::Request(format!("Invalid release manifest: {}", e)))
    }

    /// Record `version` as available. Returns false when it is already
    /// installed or waiting, or when another version is still waiting: a
    /// staged release is never replaced before it has been activated. The
    /// first version ever seen is installed directly; later ones are staged
    /// as waiting.
    pub async fn stage(&self, version: &str) -> Result<bool, PlatformError> {
        let installed = read_record(&self.installed_path()).await;
        let waiting = read_record(&self.waiting_path()).await;

        let known = installed
            .iter()
            .chain(waiting.iter())
            .any(|record| record.version == version);
        if known {
            debug!(version = %version, "Release already known");
            return Ok(false);
        }
        if let Some(waiting) = &waiting {
            debug!(
                version = %version,
                waiting = %waiting.version,
                "Another release is waiting to activate, not staging"
            );
            return Ok(false);
        }

        self.emit(PlatformEvent::InstallStarted {
            version: version.to_string(),
        });

        let controller_active = installed.is_some();
        let target = if controller_active {
            self.waiting_path()
        } else {
            self.installed_path()
        };
        write_record(&target, &ReleaseRecord::now(version)).await?;

        info!(
            operation = "release_stage",
            version = %version,
            update = controller_active,
            "Release installed"
        );
        self.emit(PlatformEvent::InstallCompleted { controller_active });
        Ok(true)
    }

    fn installed_path(&self) -> PathBuf {
        self.releases_dir.join(INSTALLED_FILE)
    }

    fn waiting_path(&self) -> PathBuf {
        self.releases_dir.join(WAITING_FILE)
    }

    fn emit(&self, event: PlatformEvent) {
        let events = self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        match events.as_ref() {
            Some(sender) => {
                if sender.send(event).is_err() {
                    debug!("Update listener is gone, event dropped");
                }
            }
            None => debug!("No update listener registered, event dropped"),
        }
    }
}

#[async_trait]
impl UpdatePlatform for ManifestPlatform {
    async fn register(&self) -> Result<Option<PlatformEvents>, PlatformError> {
        tokio::fs::create_dir_all(&self.releases_dir).await?;

        let (tx, rx) = unbounded_channel();
        *self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(tx);
        debug!(manifest = %self.manifest_url, "Update platform registered");
        Ok(Some(rx))
    }

    async fn waiting_version(&self) -> Result<Option<WaitingVersion>, PlatformError> {
        Ok(read_record(&self.waiting_path())
            .await
            .map(|record| WaitingVersion::new(record.version)))
    }

    async fn skip_waiting(&self, waiting: &WaitingVersion) -> Result<(), PlatformError> {
        let staged = read_record(&self.waiting_path())
            .await
            .filter(|record| record.version == waiting.version())
            .ok_or(PlatformError::NoWaitingVersion)?;

        write_record(&self.installed_path(), &ReleaseRecord::now(&staged.version)).await?;
        tokio::fs::remove_file(self.waiting_path()).await?;

        info!(
            operation = "release_activate",
            version = %staged.version,
            "Waiting release activated"
        );
        Ok(())
    }

    async fn reload(&self) -> Result<(), PlatformError> {
        self.reload_signal.notify_one();
        Ok(())
    }

    async fn check_now(&self) -> Result<(), PlatformError> {
        let manifest = self.fetch_manifest().await?;
        debug!(version = %manifest.version, "Release manifest fetched");
        self.stage(&manifest.version).await?;
        Ok(())
    }
}

/// Missing and unreadable records both count as absent
async fn read_record(path: &Path) -> Option<ReleaseRecord> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!("Failed to read release record {:?}: {}", path, e);
            return None;
        }
    };

    match serde_json::from_str(&content) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!("Release record {:?} is corrupted: {}", path, e);
            None
        }
    }
}

async fn write_record(path: &Path, record: &ReleaseRecord) -> Result<(), PlatformError> {
    let json = serde_json::to_string_pretty(record)
        .map_err(|e| PlatformError::Request(format!("Failed to encode release record: {}", e)))?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, json).await?;
    tokio::fs::rename(&temp_path, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelbox_core::{UpdateController, UpdateState};
    use tempfile::TempDir;

    fn platform(dir: &TempDir) -> Arc<ManifestPlatform> {
        Arc::new(
            ManifestPlatform::new(
                "https://updates.example.test/manifest.json".to_string(),
                dir.path().join("releases"),
            )
            .unwrap(),
        )
    }

    fn drain(events: &mut PlatformEvents) -> Vec<PlatformEvent> {
        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        seen
    }

    #[tokio::test]
    async fn test_first_release_installs_directly() {
        let dir = TempDir::new().unwrap();
        let platform = platform(&dir);
        let mut events = platform.register().await.unwrap().unwrap();

        assert!(platform.stage("1.0.0").await.unwrap());

        assert_eq!(
            drain(&mut events),
            vec![
                PlatformEvent::InstallStarted { version: "1.0.0".to_string() },
                PlatformEvent::InstallCompleted { controller_active: false },
            ]
        );
        assert_eq!(platform.installed_version().await.as_deref(), Some("1.0.0"));
        assert!(platform.waiting_version().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_known_release_is_ignored() {
        let dir = TempDir::new().unwrap();
        let platform = platform(&dir);
        let mut events = platform.register().await.unwrap().unwrap();
        platform.stage("1.0.0").await.unwrap();
        platform.stage("1.1.0").await.unwrap();
        drain(&mut events);

        assert!(!platform.stage("1.0.0").await.unwrap());
        assert!(!platform.stage("1.1.0").await.unwrap());
        assert!(drain(&mut events).is_empty());
    }

    #[tokio::test]
    async fn test_newer_release_waits_then_activates() {
        let dir = TempDir::new().unwrap();
        let platform = platform(&dir);
        let mut events = platform.register().await.unwrap().unwrap();
        platform.stage("1.0.0").await.unwrap();
        drain(&mut events);

        platform.stage("1.1.0").await.unwrap();

        assert_eq!(
            drain(&mut events).last(),
            Some(&PlatformEvent::InstallCompleted { controller_active: true })
        );
        let waiting = platform.waiting_version().await.unwrap().unwrap();
        assert_eq!(waiting.version(), "1.1.0");

        platform.skip_waiting(&waiting).await.unwrap();

        assert_eq!(platform.installed_version().await.as_deref(), Some("1.1.0"));
        assert!(platform.waiting_version().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_skip_waiting_without_staged_release() {
        let dir = TempDir::new().unwrap();
        let platform = platform(&dir);
        platform.register().await.unwrap();

        let result = platform.skip_waiting(&WaitingVersion::new("9.9.9")).await;
        assert!(matches!(result, Err(PlatformError::NoWaitingVersion)));
    }

    #[tokio::test]
    async fn test_corrupted_record_counts_as_absent() {
        let dir = TempDir::new().unwrap();
        let platform = platform(&dir);
        platform.register().await.unwrap();
        std::fs::write(platform.releases_dir().join(WAITING_FILE), "{oops").unwrap();

        assert!(platform.waiting_version().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_controller_drives_staged_update() {
        let dir = TempDir::new().unwrap();
        let platform = platform(&dir);
        let reload = platform.reload_signal();
        let mut controller = UpdateController::new(platform.clone(), Duration::from_secs(3600));
        assert!(controller.init().await);

        platform.stage("1.0.0").await.unwrap();
        controller.next_transition().await;
        controller.next_transition().await;
        assert_eq!(controller.state(), &UpdateState::Idle);

        platform.stage("1.1.0").await.unwrap();
        controller.next_transition().await;
        controller.next_transition().await;
        assert!(controller.update_available());

        assert!(controller.confirm().await.unwrap());
        reload.notified().await;
        assert_eq!(platform.installed_version().await.as_deref(), Some("1.1.0"));
        controller.shutdown().await;
    }

    #[tokio::test]
    async fn test_newer_release_does_not_replace_offered_one() {
        let dir = TempDir::new().unwrap();
        let platform = platform(&dir);
        let mut controller = UpdateController::new(platform.clone(), Duration::from_secs(3600));
        assert!(controller.init().await);

        platform.stage("1.0.0").await.unwrap();
        platform.stage("1.1.0").await.unwrap();
        controller.drain_pending().await;
        assert_eq!(
            controller.state().pending_activation(),
            Some(&WaitingVersion::new("1.1.0"))
        );

        assert!(!platform.stage("1.2.0").await.unwrap());
        assert_eq!(controller.drain_pending().await, 0);
        assert_eq!(
            platform.waiting_version().await.unwrap(),
            Some(WaitingVersion::new("1.1.0"))
        );

        assert!(controller.confirm().await.unwrap());
        assert_eq!(platform.installed_version().await.as_deref(), Some("1.1.0"));
        assert!(platform.waiting_version().await.unwrap().is_none());

        // Once activated, the next release stages normally
        assert!(platform.stage("1.2.0").await.unwrap());
        assert_eq!(
            platform.waiting_version().await.unwrap(),
            Some(WaitingVersion::new("1.2.0"))
        );
        controller.shutdown().await;
    }

    #[tokio::test]
    async fn test_waiting_release_offered_on_next_start() {
        let dir = TempDir::new().unwrap();
        {
            let first_run = platform(&dir);
            first_run.register().await.unwrap();
            first_run.stage("1.0.0").await.unwrap();
            first_run.stage("1.1.0").await.unwrap();
        }

        let mut controller = UpdateController::new(platform(&dir), Duration::from_secs(3600));
        controller.init().await;

        assert_eq!(
            controller.state().pending_activation(),
            Some(&WaitingVersion::new("1.1.0"))
        );
        controller.shutdown().await;
    }
}
