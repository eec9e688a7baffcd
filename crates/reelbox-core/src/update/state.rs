use tracing::debug;

use crate::update::platform::{PlatformEvent, WaitingVersion};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UpdateState {
    /// No new version known
    #[default]
    Idle,
    /// A new version began installing
    InstallDetected { version: String },
    /// A new version is installed and waiting; `suppressed` after the user
    /// dismissed the prompt
    UpdateReady {
        waiting: WaitingVersion,
        suppressed: bool,
    },
    /// Hand-off in progress; terminal for this activation cycle
    Reloading { version: String },
}

impl UpdateState {
    pub fn name(&self) -> &'static str {
        match self {
            UpdateState::Idle => "idle",
            UpdateState::InstallDetected { .. } => "install_detected",
            UpdateState::UpdateReady { .. } => "update_ready",
            UpdateState::Reloading { .. } => "reloading",
        }
    }

    pub fn update_available(&self) -> bool {
        matches!(self, UpdateState::UpdateReady { .. })
    }

    /// The waiting version, present only while an update is available
    pub fn pending_activation(&self) -> Option<&WaitingVersion> {
        match self {
            UpdateState::UpdateReady { waiting, .. } => Some(waiting),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateEvent {
    InstallStarted { version: String },
    InstallCompleted { controller_active: bool },
    /// A version was already waiting when the app started
    WaitingFound(WaitingVersion),
    /// User accepted the update
    Confirm,
    /// User closed the prompt without updating
    Dismiss,
    /// Offer a dismissed update again
    Remind,
}

impl From<PlatformEvent> for UpdateEvent {
    fn from(event: PlatformEvent) -> Self {
        match event {
            PlatformEvent::InstallStarted { version } => UpdateEvent::InstallStarted { version },
            PlatformEvent::InstallCompleted { controller_active } => {
                UpdateEvent::InstallCompleted { controller_active }
            }
        }
    }
}

/// Side effect the controller must carry out after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Tell the user an update is ready
    Notify(WaitingVersion),
    /// Signal the waiting version to take over, then reload
    Activate(WaitingVersion),
}

#[derive(Debug, Default)]
pub struct UpdateMachine {
    state: UpdateState,
}

impl UpdateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &UpdateState {
        &self.state
    }

    /// Apply one event. Events that do not fit the current state are ignored.
    pub fn apply(&mut self, event: UpdateEvent) -> Option<Effect> {
        let (next, effect) = match (&self.state, event) {
            (UpdateState::Reloading { .. }, event) => {
                debug!(?event, "Ignoring update event while reloading");
                return None;
            }
            (UpdateState::Idle, UpdateEvent::InstallStarted { version })
            | (UpdateState::InstallDetected { .. }, UpdateEvent::InstallStarted { version }) => {
                (UpdateState::InstallDetected { version }, None)
            }
            (UpdateState::Idle, UpdateEvent::WaitingFound(waiting)) => (
                UpdateState::UpdateReady {
                    waiting: waiting.clone(),
                    suppressed: false,
                },
                Some(Effect::Notify(waiting)),
            ),
            (
                UpdateState::InstallDetected { version },
                UpdateEvent::InstallCompleted { controller_active: true },
            ) => {
                let waiting = WaitingVersion::new(version.clone());
                (
                    UpdateState::UpdateReady {
                        waiting: waiting.clone(),
                        suppressed: false,
                    },
                    Some(Effect::Notify(waiting)),
                )
            }
            (
                UpdateState::InstallDetected { .. },
                UpdateEvent::InstallCompleted { controller_active: false },
            ) => {
                // First install: everything is cached, nothing to hand over
                (UpdateState::Idle, None)
            }
            (UpdateState::UpdateReady { waiting, .. }, UpdateEvent::Confirm) => (
                UpdateState::Reloading {
                    version: waiting.version().to_string(),
                },
                Some(Effect::Activate(waiting.clone())),
            ),
            (UpdateState::UpdateReady { waiting, suppressed: false }, UpdateEvent::Dismiss) => (
                UpdateState::UpdateReady {
                    waiting: waiting.clone(),
                    suppressed: true,
                },
                None,
            ),
            (UpdateState::UpdateReady { waiting, suppressed: true }, UpdateEvent::Remind) => (
                UpdateState::UpdateReady {
                    waiting: waiting.clone(),
                    suppressed: false,
                },
                Some(Effect::Notify(waiting.clone())),
            ),
            (state, event) => {
                debug!(state = state.name(), ?event, "Ignoring update event");
                return None;
            }
        };

        self.state = next;
        effect
    }
}
