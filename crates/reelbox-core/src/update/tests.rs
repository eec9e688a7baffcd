use super::*;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

const HOUR: Duration = Duration::from_secs(3600);

#[derive(Default)]
struct FakePlatform {
    unsupported: bool,
    fail_register: bool,
    waiting: Mutex<Option<WaitingVersion>>,
    sender: Mutex<Option<UnboundedSender<PlatformEvent>>>,
    calls: Mutex<Vec<String>>,
    checks: AtomicUsize,
}

impl FakePlatform {
    fn emit(&self, event: PlatformEvent) {
        let sender = self.sender.lock().unwrap();
        sender.as_ref().expect("not registered").send(event).unwrap();
    }

    fn close(&self) {
        self.sender.lock().unwrap().take();
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl UpdatePlatform for FakePlatform {
    async fn register(&self) -> Result<Option<PlatformEvents>, PlatformError> {
        if self.fail_register {
            return Err(PlatformError::Request("registration refused".to_string()));
        }
        if self.unsupported {
            return Ok(None);
        }
        let (tx, rx) = unbounded_channel();
        *self.sender.lock().unwrap() = Some(tx);
        Ok(Some(rx))
    }

    async fn waiting_version(&self) -> Result<Option<WaitingVersion>, PlatformError> {
        Ok(self.waiting.lock().unwrap().clone())
    }

    async fn skip_waiting(&self, waiting: &WaitingVersion) -> Result<(), PlatformError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("skip_waiting:{}", waiting.version()));
        Ok(())
    }

    async fn reload(&self) -> Result<(), PlatformError> {
        self.calls.lock().unwrap().push("reload".to_string());
        Ok(())
    }

    async fn check_now(&self) -> Result<(), PlatformError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn counting_controller(platform: Arc<FakePlatform>) -> (UpdateController, Arc<AtomicUsize>) {
    let notifications = Arc::new(AtomicUsize::new(0));
    let counter = notifications.clone();
    let controller = UpdateController::new(platform, HOUR).with_listener(move |_: &WaitingVersion| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (controller, notifications)
}

async fn install(
    platform: &FakePlatform,
    controller: &mut UpdateController,
    controller_active: bool,
) {
    platform.emit(PlatformEvent::InstallStarted {
        version: "1.1.0".to_string(),
    });
    platform.emit(PlatformEvent::InstallCompleted { controller_active });
    controller.next_transition().await.unwrap();
    controller.next_transition().await.unwrap();
}

#[tokio::test]
async fn test_update_with_active_controller_notifies_once() {
    let platform = Arc::new(FakePlatform::default());
    let (mut controller, notifications) = counting_controller(platform.clone());
    assert!(controller.init().await);

    install(&platform, &mut controller, true).await;

    assert!(controller.update_available());
    assert_eq!(
        controller.state().pending_activation(),
        Some(&WaitingVersion::new("1.1.0"))
    );
    assert_eq!(notifications.load(Ordering::SeqCst), 1);
    controller.shutdown().await;
}

#[tokio::test]
async fn test_first_install_is_silent() {
    let platform = Arc::new(FakePlatform::default());
    let (mut controller, notifications) = counting_controller(platform.clone());
    controller.init().await;

    install(&platform, &mut controller, false).await;

    assert_eq!(controller.state(), &UpdateState::Idle);
    assert!(!controller.update_available());
    assert_eq!(notifications.load(Ordering::SeqCst), 0);
    controller.shutdown().await;
}

#[tokio::test]
async fn test_confirm_signals_then_reloads_once() {
    let platform = Arc::new(FakePlatform::default());
    let (mut controller, _) = counting_controller(platform.clone());
    controller.init().await;
    install(&platform, &mut controller, true).await;

    assert!(controller.confirm().await.unwrap());
    assert!(!controller.confirm().await.unwrap());

    assert_eq!(platform.calls(), vec!["skip_waiting:1.1.0", "reload"]);
    assert_eq!(
        controller.state(),
        &UpdateState::Reloading {
            version: "1.1.0".to_string()
        }
    );
    controller.shutdown().await;
}

#[tokio::test]
async fn test_confirm_without_update_does_nothing() {
    let platform = Arc::new(FakePlatform::default());
    let (mut controller, _) = counting_controller(platform.clone());
    controller.init().await;

    assert!(!controller.confirm().await.unwrap());
    assert!(platform.calls().is_empty());
    controller.shutdown().await;
}

#[tokio::test]
async fn test_waiting_version_offered_at_startup() {
    let platform = Arc::new(FakePlatform::default());
    *platform.waiting.lock().unwrap() = Some(WaitingVersion::new("2.0.0"));
    let (mut controller, notifications) = counting_controller(platform.clone());

    controller.init().await;

    assert!(controller.update_available());
    assert_eq!(notifications.load(Ordering::SeqCst), 1);
    controller.shutdown().await;
}

#[tokio::test]
async fn test_dismissed_update_can_be_offered_again() {
    let platform = Arc::new(FakePlatform::default());
    let (mut controller, notifications) = counting_controller(platform.clone());
    controller.init().await;
    install(&platform, &mut controller, true).await;

    controller.dismiss().await;
    assert!(controller.update_available());
    assert_eq!(notifications.load(Ordering::SeqCst), 1);

    controller.remind().await;
    assert_eq!(notifications.load(Ordering::SeqCst), 2);
    controller.shutdown().await;
}

#[tokio::test]
async fn test_unsupported_platform_stays_idle() {
    let platform = Arc::new(FakePlatform {
        unsupported: true,
        ..FakePlatform::default()
    });
    let (mut controller, notifications) = counting_controller(platform.clone());

    assert!(!controller.init().await);
    assert!(!controller.is_active());
    assert!(!controller.is_polling());
    assert!(controller.next_transition().await.is_none());
    assert!(controller.check_now().await.is_ok());
    assert_eq!(controller.state(), &UpdateState::Idle);
    assert_eq!(notifications.load(Ordering::SeqCst), 0);
    assert_eq!(platform.checks.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failed_registration_is_not_an_error() {
    let platform = Arc::new(FakePlatform {
        fail_register: true,
        ..FakePlatform::default()
    });
    let (mut controller, _) = counting_controller(platform);

    assert!(!controller.init().await);
    assert_eq!(controller.state(), &UpdateState::Idle);
}

#[tokio::test]
async fn test_closed_stream_deactivates() {
    let platform = Arc::new(FakePlatform::default());
    let (mut controller, _) = counting_controller(platform.clone());
    controller.init().await;

    platform.close();

    assert!(controller.next_transition().await.is_none());
    assert!(!controller.is_active());
    controller.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_poller_checks_every_interval() {
    let platform = Arc::new(FakePlatform::default());
    let poller = UpdatePoller::spawn(platform.clone(), HOUR);

    tokio::time::sleep(HOUR / 2).await;
    assert_eq!(platform.checks.load(Ordering::SeqCst), 0);

    tokio::time::sleep(HOUR * 2).await;
    assert_eq!(platform.checks.load(Ordering::SeqCst), 2);

    poller.stop().await;
    tokio::time::sleep(HOUR * 3).await;
    assert_eq!(platform.checks.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_poller_releases_timer() {
    let platform = Arc::new(FakePlatform::default());
    let poller = UpdatePoller::spawn(platform.clone(), HOUR);
    assert!(poller.is_running());

    drop(poller);
    tokio::time::sleep(HOUR * 3).await;

    assert_eq!(platform.checks.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_polling() {
    let platform = Arc::new(FakePlatform::default());
    let (mut controller, _) = counting_controller(platform.clone());
    controller.init().await;
    assert!(controller.is_polling());

    controller.shutdown().await;
    tokio::time::sleep(HOUR * 2).await;

    assert!(!controller.is_polling());
    assert!(!controller.is_active());
    assert_eq!(platform.checks.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_drain_pending_applies_delivered_events() {
    let platform = Arc::new(FakePlatform::default());
    let (mut controller, notifications) = counting_controller(platform.clone());
    controller.init().await;
    assert_eq!(controller.drain_pending().await, 0);

    platform.emit(PlatformEvent::InstallStarted {
        version: "1.2.0".to_string(),
    });
    platform.emit(PlatformEvent::InstallCompleted {
        controller_active: true,
    });

    assert_eq!(controller.drain_pending().await, 2);
    assert!(controller.update_available());
    assert_eq!(notifications.load(Ordering::SeqCst), 1);
    controller.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_zero_interval_is_raised_to_minimum() {
    let platform = Arc::new(FakePlatform::default());
    let mut controller = UpdateController::new(platform.clone(), Duration::ZERO);
    assert!(controller.init().await);

    tokio::time::sleep(MIN_CHECK_INTERVAL * 3 + MIN_CHECK_INTERVAL / 2).await;

    assert!(controller.is_polling());
    assert_eq!(platform.checks.load(Ordering::SeqCst), 3);
    controller.shutdown().await;
}
