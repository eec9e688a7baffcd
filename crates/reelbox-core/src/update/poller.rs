use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::update::platform::UpdatePlatform;

/// Shortest accepted interval; zero would make the timer panic
pub const MIN_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Background task asking the platform to check for a new version on a fixed interval.
///
/// The check only prompts the platform; any resulting install arrives through
/// the platform's event stream. The task is aborted when the poller is
/// dropped, so the timer never outlives its owner.
pub struct UpdatePoller {
    handle: Option<JoinHandle<()>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl UpdatePoller {
    /// Start polling. The first check runs one full interval from now.
    /// Intervals below [`MIN_CHECK_INTERVAL`] are raised to it.
    pub fn spawn(platform: Arc<dyn UpdatePlatform>, every: Duration) -> Self {
        if every < MIN_CHECK_INTERVAL {
            warn!(
                requested_ms = every.as_millis() as u64,
                "Update check interval too short, using {}s",
                MIN_CHECK_INTERVAL.as_secs()
            );
        }
        let every = every.max(MIN_CHECK_INTERVAL);
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    _ = ticker.tick() => {
                        debug!(operation = "update_check", "Running periodic update check");
                        if let Err(e) = platform.check_now().await {
                            warn!(
                                operation = "update_check_error",
                                error = %e,
                                "Periodic update check failed"
                            );
                        }
                    }
                }
            }

            debug!("Update poller stopped");
        });

        info!(
            operation = "update_poller_started",
            interval_secs = every.as_secs(),
            "Update checks scheduled"
        );

        Self {
            handle: Some(handle),
            shutdown_tx,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }

    /// Signal the task to stop and wait for it to exit
    pub async fn stop(mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!("Update poller exited abnormally: {}", e);
                }
            }
        }
    }
}

impl Drop for UpdatePoller {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
