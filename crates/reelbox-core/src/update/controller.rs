use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, info, warn};

use crate::update::platform::{PlatformError, PlatformEvents, UpdatePlatform, WaitingVersion};
use crate::update::poller::UpdatePoller;
use crate::update::state::{Effect, UpdateEvent, UpdateMachine, UpdateState};

/// Receives the "update available" notification
pub trait UpdateListener: Send {
    fn update_ready(&mut self, waiting: &WaitingVersion);
}

impl<F> UpdateListener for F
where
    F: FnMut(&WaitingVersion) + Send,
{
    fn update_ready(&mut self, waiting: &WaitingVersion) {
        (*self)(waiting)
    }
}

/// Owns the update lifecycle for one running app.
///
/// Construct it, call [`init`](Self::init), feed it with
/// [`next_transition`](Self::next_transition) and user decisions, and call
/// [`shutdown`](Self::shutdown) when the app exits. When the platform has no
/// update support the controller stays `Idle` for its whole life.
pub struct UpdateController {
    platform: Arc<dyn UpdatePlatform>,
    machine: UpdateMachine,
    check_interval: Duration,
    events: Option<PlatformEvents>,
    poller: Option<UpdatePoller>,
    listener: Option<Box<dyn UpdateListener>>,
}

impl UpdateController {
    pub fn new(platform: Arc<dyn UpdatePlatform>, check_interval: Duration) -> Self {
        Self {
            platform,
            machine: UpdateMachine::new(),
            check_interval,
            events: None,
            poller: None,
            listener: None,
        }
    }

    pub fn with_listener(mut self, listener: impl UpdateListener + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Subscribe to the platform, offer an already-waiting version, and start
    /// the periodic check. Returns whether update support is available.
    pub async fn init(&mut self) -> bool {
        let events = match self.platform.register().await {
            Ok(Some(events)) => events,
            Ok(None) => {
                info!(operation = "update_init", "App updates are not supported here");
                return false;
            }
            Err(e) => {
                warn!(
                    operation = "update_init",
                    error = %e,
                    "Could not register for app updates; continuing without them"
                );
                return false;
            }
        };
        self.events = Some(events);

        match self.platform.waiting_version().await {
            Ok(Some(waiting)) => {
                info!(version = waiting.version(), "A new version is already waiting");
                if let Err(e) = self.apply(UpdateEvent::WaitingFound(waiting)).await {
                    warn!("Failed to apply waiting version: {}", e);
                }
            }
            Ok(None) => debug!("No waiting version at startup"),
            Err(e) => warn!("Could not look up a waiting version: {}", e),
        }

        self.poller = Some(UpdatePoller::spawn(self.platform.clone(), self.check_interval));
        true
    }

    /// True while subscribed to platform events
    pub fn is_active(&self) -> bool {
        self.events.is_some()
    }

    /// Wait for the next platform event and apply it. Returns `None` when
    /// the controller is not subscribed or the platform closed the stream.
    pub async fn next_transition(&mut self) -> Option<&UpdateState> {
        let event = match self.events.as_mut() {
            Some(events) => events.recv().await,
            None => return None,
        };

        match event {
            Some(event) => {
                if let Err(e) = self.apply(event.into()).await {
                    warn!("Update transition failed: {}", e);
                }
                Some(self.machine.state())
            }
            None => {
                debug!("Platform event stream closed");
                self.events = None;
                None
            }
        }
    }

    /// Apply every event already delivered without waiting for more.
    /// Returns how many were applied.
    pub async fn drain_pending(&mut self) -> usize {
        let mut applied = 0;
        loop {
            let event = match self.events.as_mut().map(|events| events.try_recv()) {
                Some(Ok(event)) => event,
                Some(Err(TryRecvError::Disconnected)) => {
                    debug!("Platform event stream closed");
                    self.events = None;
                    break;
                }
                Some(Err(TryRecvError::Empty)) | None => break,
            };
            if let Err(e) = self.apply(event.into()).await {
                warn!("Update transition failed: {}", e);
            }
            applied += 1;
        }
        applied
    }

    /// Accept the offered update: the waiting version is told to take over
    /// and the app reloads. Returns `false` when no update was ready.
    pub async fn confirm(&mut self) -> Result<bool, PlatformError> {
        match self.apply(UpdateEvent::Confirm).await? {
            Some(Effect::Activate(_)) => Ok(true),
            _ => Ok(false),
        }
    }

    /// Hide the prompt; the waiting version stays available
    pub async fn dismiss(&mut self) {
        // Dismiss never produces an effect, so it cannot fail
        let _ = self.apply(UpdateEvent::Dismiss).await;
    }

    /// Offer a dismissed update again
    pub async fn remind(&mut self) {
        let _ = self.apply(UpdateEvent::Remind).await;
    }

    /// Ask the platform for a new version right away
    pub async fn check_now(&self) -> Result<(), PlatformError> {
        if !self.is_active() {
            return Ok(());
        }
        self.platform.check_now().await
    }

    pub fn state(&self) -> &UpdateState {
        self.machine.state()
    }

    pub fn update_available(&self) -> bool {
        self.machine.state().update_available()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().map(|p| p.is_running()).unwrap_or(false)
    }

    /// Stop the periodic check and drop the event subscription
    pub async fn shutdown(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop().await;
        }
        self.events = None;
        info!(
            operation = "update_shutdown",
            state = self.state().name(),
            "Update controller stopped"
        );
    }

    async fn apply(&mut self, event: UpdateEvent) -> Result<Option<Effect>, PlatformError> {
        let before = self.machine.state().name();
        let effect = self.machine.apply(event);
        let after = self.machine.state().name();
        if before != after {
            info!(
                operation = "update_transition",
                from = before,
                to = after,
                "Update state changed"
            );
        }

        match &effect {
            Some(Effect::Notify(waiting)) => {
                if let Some(listener) = self.listener.as_mut() {
                    listener.update_ready(waiting);
                }
            }
            Some(Effect::Activate(waiting)) => {
                let signal = self.platform.skip_waiting(waiting).await;
                if let Err(e) = &signal {
                    warn!(version = waiting.version(), "Take-over signal failed: {}", e);
                }
                // The reload happens even when the signal failed
                self.platform.reload().await?;
                signal?;
            }
            None => {}
        }

        Ok(effect)
    }
}
