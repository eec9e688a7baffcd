//! Installable-app update lifecycle.
//!
//! The platform reports install progress as a stream of [`PlatformEvent`]s.
//! [`UpdateMachine`] turns each event into exactly one transition, and
//! [`UpdateController`] drives the machine, notifies the listener and runs
//! the periodic update check.

pub mod controller;
pub mod platform;
pub mod poller;
pub mod state;

pub use controller::{UpdateController, UpdateListener};
pub use platform::{PlatformError, PlatformEvent, PlatformEvents, UpdatePlatform, WaitingVersion};
pub use poller::{UpdatePoller, MIN_CHECK_INTERVAL};
pub use state::{Effect, UpdateEvent, UpdateMachine, UpdateState};

#[cfg(test)]
mod tests;
