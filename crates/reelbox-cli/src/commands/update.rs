use super::prompts;
use super::ui::{self, Spinner};
use super::Session;
use crate::output::Output;
use crate::UpdateCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::Cell;
use reelbox_core::{UpdateController, UpdatePlatform, UpdateState, WaitingVersion};
use reelbox_sources::{create_update_platform, ManifestPlatform};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::info;

pub async fn run_update(cmd: UpdateCommands, output: &Output) -> Result<()> {
    let session = Session::load()?;

    let platform = create_update_platform(&session.config.updates, &session.paths)
        .map_err(|e| eyre!("Failed to set up updates: {}", e))?;
    let Some(platform) = platform else {
        if output.is_human() {
            output.info(
                "App updates are disabled. \
                 Set updates.manifest_url in the config file to enable them.",
            );
        } else {
            output.json(&json!({ "enabled": false }));
        }
        return Ok(());
    };

    let interval = Duration::from_secs(session.config.updates.check_interval_secs);
    match cmd {
        UpdateCommands::Status => status(&session, &platform, output).await,
        UpdateCommands::Check => check(platform, interval, output).await,
        UpdateCommands::Watch { .. } => watch(platform, interval, output).await,
    }
}

async fn status(session: &Session, platform: &ManifestPlatform, output: &Output) -> Result<()> {
    let installed = platform.installed_version().await;
    let waiting = platform
        .waiting_version()
        .await
        .map_err(|e| eyre!("Failed to read update state: {}", e))?;
    let updates = &session.config.updates;

    if !output.is_human() {
        output.json(&json!({
            "enabled": true,
            "manifest_url": updates.manifest_url,
            "check_interval_secs": updates.check_interval_secs,
            "installed": installed,
            "waiting": waiting.as_ref().map(|w| w.version()),
        }));
        return Ok(());
    }

    let mut table = ui::new_table();
    table.set_header(vec![ui::header_cell("Updates"), ui::header_cell("")]);
    table.add_row(vec![
        Cell::new("Manifest"),
        Cell::new(updates.manifest_url.as_deref().unwrap_or("-")),
    ]);
    table.add_row(vec![
        Cell::new("Check interval"),
        Cell::new(format!("{}s", updates.check_interval_secs)),
    ]);
    table.add_row(vec![
        Cell::new("Installed"),
        Cell::new(installed.as_deref().unwrap_or("none recorded")),
    ]);
    table.add_row(vec![
        Cell::new("Waiting"),
        Cell::new(waiting.as_ref().map(|w| w.version()).unwrap_or("none")),
    ]);
    output.println(table.to_string());

    if let Some(waiting) = waiting {
        output.info(format!(
            "Version {} is ready. Run `reelbox update check` to switch to it.",
            waiting.version()
        ));
    }
    Ok(())
}

/// Controller whose "update ready" notifications arrive on the returned channel
fn new_controller(
    platform: Arc<ManifestPlatform>,
    interval: Duration,
) -> (UpdateController, UnboundedReceiver<WaitingVersion>) {
    let (ready_tx, ready_rx) = unbounded_channel();
    let controller =
        UpdateController::new(platform, interval).with_listener(move |waiting: &WaitingVersion| {
            let _ = ready_tx.send(waiting.clone());
        });
    (controller, ready_rx)
}

async fn check(platform: Arc<ManifestPlatform>, interval: Duration, output: &Output) -> Result<()> {
    let (mut controller, mut ready) = new_controller(platform.clone(), interval);
    if !controller.init().await {
        output.warn("Update support is unavailable on this installation");
        return Ok(());
    }

    let checked = {
        let _spinner = Spinner::start("Checking for updates...", output);
        controller.check_now().await
    };
    let result = match checked {
        Ok(()) => {
            controller.drain_pending().await;
            match ready.try_recv() {
                Ok(waiting) => offer(&mut controller, &waiting, output).await,
                Err(_) => {
                    report_current(&platform, output).await;
                    Ok(())
                }
            }
        }
        Err(e) => Err(eyre!("Update check failed: {}", e)),
    };

    controller.shutdown().await;
    result
}

async fn report_current(platform: &ManifestPlatform, output: &Output) {
    match platform.installed_version().await {
        Some(version) if output.is_human() => {
            output.success(format!("Reelbox is up to date (version {})", version))
        }
        Some(version) => output.json(&json!({ "update_available": false, "installed": version })),
        None => output.success("Reelbox is up to date"),
    }
}

/// Ask whether to switch to the waiting version. Non-interactive sessions only report it.
async fn offer(
    controller: &mut UpdateController,
    waiting: &WaitingVersion,
    output: &Output,
) -> Result<()> {
    if !output.is_human() {
        output.json(&json!({ "update_available": true, "waiting": waiting.version() }));
        controller.dismiss().await;
        return Ok(());
    }
    if !ui::is_interactive() {
        output.info(format!(
            "Version {} is ready. Run `reelbox update check` in a terminal to switch to it.",
            waiting.version()
        ));
        controller.dismiss().await;
        return Ok(());
    }

    let accept = prompts::prompt_yes_no(
        &format!("Version {} is ready. Switch to it now?", waiting.version()),
        Some(true),
        output,
    )?;

    if !accept {
        controller.dismiss().await;
        output.info("Update postponed. It will be offered again later.");
        return Ok(());
    }

    if controller
        .confirm()
        .await
        .map_err(|e| eyre!("Failed to switch to version {}: {}", waiting.version(), e))?
    {
        output.success(format!("Switched to version {}", waiting.version()));
    }
    Ok(())
}

enum Step {
    Transition(Option<UpdateState>),
    Ready(WaitingVersion),
    Remind,
    Reload,
    Interrupted,
}

/// Long-running session: the controller polls in the background and each
/// ready version is offered as it arrives. Ends on reload or Ctrl+C.
async fn watch(platform: Arc<ManifestPlatform>, interval: Duration, output: &Output) -> Result<()> {
    let reload = platform.reload_signal();
    let (mut controller, mut ready) = new_controller(platform.clone(), interval);

    if !controller.init().await {
        output.warn("Update support is unavailable on this installation");
        return Ok(());
    }
    output.info(format!(
        "Watching for updates every {}s. Press Ctrl+C to stop.",
        interval.as_secs()
    ));

    let mut reminders = interval_at(Instant::now() + interval, interval);
    reminders.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let result = loop {
        let step = tokio::select! {
            transition = controller.next_transition() => Step::Transition(transition.cloned()),
            Some(waiting) = ready.recv() => Step::Ready(waiting),
            _ = reminders.tick() => Step::Remind,
            _ = reload.notified() => Step::Reload,
            _ = tokio::signal::ctrl_c() => Step::Interrupted,
        };

        match step {
            Step::Transition(Some(state)) => {
                info!(operation = "update_watch", state = state.name(), "Update state observed");
            }
            Step::Transition(None) => {
                output.warn("Update events stopped; ending session");
                break Ok(());
            }
            Step::Ready(waiting) => {
                if let Err(e) = offer(&mut controller, &waiting, output).await {
                    break Err(e);
                }
            }
            Step::Remind => {
                if matches!(controller.state(), UpdateState::UpdateReady { suppressed: true, .. }) {
                    controller.remind().await;
                }
            }
            Step::Reload => {
                let version = platform.installed_version().await.unwrap_or_default();
                output.success(format!(
                    "Reloading into version {}. Start reelbox again to continue.",
                    version
                ));
                break Ok(());
            }
            Step::Interrupted => {
                output.info("Stopping update watch");
                break Ok(());
            }
        }
    };

    controller.shutdown().await;
    result
}
