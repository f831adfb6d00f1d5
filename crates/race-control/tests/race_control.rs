use std::time::Duration;

use car::{Car, CarConfig, RecordingEngine};
use driving::{AutomatedDriver, CarDrivingService, DriverConfig, ManualDriver, StatusSubscription};
use navigation::{NavigationDirections, NavigationFeed};
use race_control::{ActiveSignals, RaceControlService, RaceStatus, SignalSource, SignalTrigger};

struct Harness {
    service: RaceControlService,
    feed: NavigationFeed,
    starter: SignalTrigger,
    finisher: SignalTrigger,
}

async fn harness() -> Harness {
    let engine = RecordingEngine::new();
    let car = Car::new(Box::new(engine), CarConfig::default());
    let driving = CarDrivingService::new(car, 32);
    let feed = NavigationFeed::new(8);
    let automated = AutomatedDriver::new(feed.clone(), &DriverConfig::default()).unwrap();
    let starter = SignalTrigger::new();
    let finisher = SignalTrigger::new();

    let service = RaceControlService::new(
        driving,
        ManualDriver::default(),
        automated,
        SignalSource::Triggered(starter.clone()),
        SignalSource::Triggered(finisher.clone()),
        16,
    )
    .await;

    Harness {
        service,
        feed,
        starter,
        finisher,
    }
}

async fn wait_for_status(sub: &mut StatusSubscription<RaceStatus>, expected: RaceStatus) {
    tokio::time::timeout(Duration::from_secs(10), async {
        while let Some(status) = sub.next().await {
            if status == expected {
                return;
            }
        }
        panic!("race status channel closed");
    })
    .await
    .expect("timed out waiting for race status");
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

#[tokio::test]
async fn test_starts_in_manual_driving() {
    let h = harness().await;

    assert_eq!(h.service.race_status(), RaceStatus::ManualDriving);
    assert!(!h.service.is_racing().await);
    assert_eq!(h.service.driving().active_driver().await, Some("manual"));
    assert_eq!(h.service.active_signals().await, ActiveSignals::default());
}

#[tokio::test]
async fn test_full_race_ends_in_manual_driving() {
    let h = harness().await;
    let mut status = h.service.subscribe_status();

    h.service.init_race().await;
    assert_eq!(h.service.race_status(), RaceStatus::AwaitingStartSignal);
    assert_eq!(h.starter.listeners(), 1);

    assert!(h.starter.fire());
    wait_for_status(&mut status, RaceStatus::Racing).await;
    assert_eq!(h.service.driving().active_driver().await, Some("automated"));
    assert_eq!(
        h.service.active_signals().await,
        ActiveSignals {
            starter: false,
            finisher: true
        }
    );

    assert!(h.finisher.fire());
    wait_for_status(&mut status, RaceStatus::ManualDriving).await;
    settle().await;

    assert_eq!(h.service.active_signals().await, ActiveSignals::default());
    assert_eq!(h.starter.listeners(), 0);
    assert_eq!(h.finisher.listeners(), 0);
    assert_eq!(h.service.driving().active_driver().await, Some("manual"));
    assert!(h.service.driving().car_status().is_stopped());
}

#[tokio::test]
async fn test_pause_in_manual_driving_is_ignored() {
    let h = harness().await;

    h.service.pause_race().await;

    assert_eq!(h.service.race_status(), RaceStatus::ManualDriving);
    assert_eq!(h.service.driving().active_driver().await, Some("manual"));
}

#[tokio::test]
async fn test_guarded_events_ignored_outside_race() {
    let h = harness().await;

    h.service.start_race().await;
    h.service.continue_race().await;
    h.service.stop_race().await;
    h.service.finish_race().await;

    assert_eq!(h.service.race_status(), RaceStatus::ManualDriving);
    assert_eq!(h.service.driving().active_driver().await, Some("manual"));
}

#[tokio::test]
async fn test_pause_and_continue() {
    let h = harness().await;
    let mut car_status = h.service.driving().subscribe_status();

    h.service.init_race().await;
    h.service.start_race().await;
    assert_eq!(h.service.race_status(), RaceStatus::Racing);

    h.feed.publish(NavigationDirections::of(10));
    tokio::time::timeout(Duration::from_secs(2), async {
        while let Some(status) = car_status.next().await {
            if status.direction.degrees() == 10 {
                return;
            }
        }
    })
    .await
    .expect("automated driver never steered");

    h.service.pause_race().await;
    assert_eq!(h.service.race_status(), RaceStatus::RacingPaused);
    assert!(h.service.driving().car_status().is_stopped());
    assert_eq!(h.service.driving().active_driver().await, Some("manual"));
    assert!(h.service.active_signals().await.finisher);

    h.service.continue_race().await;
    assert_eq!(h.service.race_status(), RaceStatus::Racing);
    assert_eq!(h.service.driving().active_driver().await, Some("automated"));
}

#[tokio::test]
async fn test_finisher_ends_paused_race() {
    let h = harness().await;
    let mut status = h.service.subscribe_status();

    h.service.init_race().await;
    h.service.start_race().await;
    h.service.pause_race().await;

    h.finisher.fire();
    wait_for_status(&mut status, RaceStatus::ManualDriving).await;
    assert!(!h.service.is_racing().await);
}

#[tokio::test]
async fn test_pause_while_awaiting_start_keeps_starter_armed() {
    let h = harness().await;
    let mut status = h.service.subscribe_status();

    h.service.init_race().await;
    h.service.pause_race().await;
    assert_eq!(h.service.race_status(), RaceStatus::RacingPaused);
    assert_eq!(h.service.driving().active_driver().await, Some("manual"));
    assert!(h.service.active_signals().await.starter);

    // Pausing again changes nothing
    h.service.pause_race().await;
    assert_eq!(h.service.race_status(), RaceStatus::RacingPaused);

    h.starter.fire();
    wait_for_status(&mut status, RaceStatus::Racing).await;
    assert_eq!(h.service.driving().active_driver().await, Some("automated"));
}

#[tokio::test]
async fn test_stop_while_awaiting_cancels_starter() {
    let h = harness().await;

    h.service.init_race().await;
    h.service.stop_race().await;
    settle().await;

    assert_eq!(h.service.race_status(), RaceStatus::ManualDriving);
    assert_eq!(h.starter.listeners(), 0);
    assert!(!h.starter.fire());

    settle().await;
    assert_eq!(h.service.race_status(), RaceStatus::ManualDriving);
}

#[tokio::test]
async fn test_rearmed_starter_fires_once() {
    let h = harness().await;
    let mut status = h.service.subscribe_status();

    h.service.init_race().await;
    h.service.stop_race().await;
    h.service.init_race().await;
    settle().await;
    assert_eq!(h.starter.listeners(), 1);

    h.starter.fire();
    wait_for_status(&mut status, RaceStatus::Racing).await;
    settle().await;

    assert_eq!(h.service.race_status(), RaceStatus::Racing);
    assert_eq!(h.starter.listeners(), 0);
    assert_eq!(h.finisher.listeners(), 1);
    assert_eq!(h.service.driving().active_driver().await, Some("automated"));
}

#[tokio::test]
async fn test_repeated_init_keeps_single_starter() {
    let h = harness().await;

    h.service.init_race().await;
    h.service.init_race().await;
    settle().await;

    assert_eq!(h.starter.listeners(), 1);
    assert_eq!(h.service.race_status(), RaceStatus::AwaitingStartSignal);
}

#[tokio::test]
async fn test_init_during_race_returns_wheel_to_manual() {
    let h = harness().await;

    h.service.init_race().await;
    h.service.start_race().await;
    assert_eq!(h.service.driving().active_driver().await, Some("automated"));

    h.service.init_race().await;
    assert_eq!(h.service.race_status(), RaceStatus::AwaitingStartSignal);
    assert_eq!(h.service.driving().active_driver().await, Some("manual"));
    assert!(!h.service.active_signals().await.finisher);
}

#[tokio::test(start_paused = true)]
async fn test_timed_signals_run_the_race() {
    let engine = RecordingEngine::new();
    let driving = CarDrivingService::new(Car::new(Box::new(engine), CarConfig::default()), 32);
    let automated = AutomatedDriver::new(NavigationFeed::default(), &DriverConfig::default()).unwrap();
    let service = RaceControlService::new(
        driving,
        ManualDriver::default(),
        automated,
        SignalSource::Timed(Duration::from_secs(2)),
        SignalSource::Timed(Duration::from_secs(5)),
        16,
    )
    .await;
    let mut status = service.subscribe_status();

    service.init_race().await;
    wait_for_status(&mut status, RaceStatus::Racing).await;
    wait_for_status(&mut status, RaceStatus::ManualDriving).await;

    assert_eq!(service.active_signals().await, ActiveSignals::default());
}
