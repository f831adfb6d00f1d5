//! Race control service
//!
//! Transitions run under the race lock, so operator requests and signal
//! events are applied one at a time. Each signal subscription carries an id;
//! an event from a subscription that was cancelled meanwhile is discarded.

use std::sync::{Arc, Weak};

use driving::{
    AutomatedDriver, CarDrivingService, Driver, DriverConfig, ManualDriver, StatusChannel,
    StatusSubscription,
};
use navigation::NavigationFeed;
use tokio::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::RaceConfig;
use crate::signal::SignalSource;
use crate::status::RaceStatus;
use crate::RaceControlError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignalKind {
    Starter,
    Finisher,
}

struct SignalWatch {
    id: u64,
    handle: JoinHandle<()>,
}

struct RaceState {
    status: RaceStatus,
    next_signal_id: u64,
    starter: Option<SignalWatch>,
    finisher: Option<SignalWatch>,
}

impl RaceState {
    fn slot(&mut self, kind: SignalKind) -> &mut Option<SignalWatch> {
        match kind {
            SignalKind::Starter => &mut self.starter,
            SignalKind::Finisher => &mut self.finisher,
        }
    }

    fn cancel(&mut self, kind: SignalKind) {
        if let Some(watch) = self.slot(kind).take() {
            watch.handle.abort();
            debug!("Cancelled {:?} subscription {}", kind, watch.id);
        }
    }

    fn cancel_all(&mut self) {
        self.cancel(SignalKind::Starter);
        self.cancel(SignalKind::Finisher);
    }
}

/// Which signal subscriptions are live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActiveSignals {
    pub starter: bool,
    pub finisher: bool,
}

struct Inner {
    driving: CarDrivingService,
    manual: Driver,
    automated: Driver,
    starter: SignalSource,
    finisher: SignalSource,
    state: Mutex<RaceState>,
    race_status: StatusChannel<RaceStatus>,
}

/// The race state machine
#[derive(Clone)]
pub struct RaceControlService {
    inner: Arc<Inner>,
}

impl RaceControlService {
    /// Create the service and hand the wheel to the manual driver
    pub async fn new(
        driving: CarDrivingService,
        manual: ManualDriver,
        automated: AutomatedDriver,
        starter: SignalSource,
        finisher: SignalSource,
        status_buffer: usize,
    ) -> Self {
        let service = Self {
            inner: Arc::new(Inner {
                driving,
                manual: Driver::Manual(manual),
                automated: Driver::Automated(automated),
                starter,
                finisher,
                state: Mutex::new(RaceState {
                    status: RaceStatus::ManualDriving,
                    next_signal_id: 0,
                    starter: None,
                    finisher: None,
                }),
                race_status: StatusChannel::new(RaceStatus::ManualDriving, status_buffer),
            }),
        };
        service.start_manual_driving().await;
        service
    }

    /// Build the automated driver and signals from configuration
    pub async fn from_config(
        driving: CarDrivingService,
        manual: ManualDriver,
        navigation: NavigationFeed,
        driver_config: &DriverConfig,
        race_config: &RaceConfig,
    ) -> Result<Self, RaceControlError> {
        let automated = AutomatedDriver::new(navigation, driver_config)?;
        Ok(Self::new(
            driving,
            manual,
            automated,
            race_config.starter.source(),
            race_config.finisher.source(),
            race_config.status_buffer,
        )
        .await)
    }

    async fn lock(&self) -> MutexGuard<'_, RaceState> {
        self.inner.state.lock().await
    }

    /// Abandon any race and give the wheel to the operator
    pub async fn start_manual_driving(&self) {
        let mut state = self.lock().await;
        state.cancel_all();
        self.inner.driving.put_behind_wheel(&self.inner.manual).await;
        self.transition(&mut state, RaceStatus::ManualDriving);
    }

    /// Arm the starter; the operator keeps driving until it fires
    pub async fn init_race(&self) {
        let mut state = self.lock().await;
        state.cancel_all();
        if self.inner.driving.active_driver().await != Some(self.inner.manual.name()) {
            self.inner.driving.put_behind_wheel(&self.inner.manual).await;
        }
        self.watch(&mut state, SignalKind::Starter);
        self.transition(&mut state, RaceStatus::AwaitingStartSignal);
    }

    /// Start racing without waiting for the starter
    pub async fn start_race(&self) {
        let mut state = self.lock().await;
        if state.status != RaceStatus::AwaitingStartSignal {
            info!("Ignoring start race request in state {}", state.status);
            return;
        }
        self.start_race_locked(&mut state).await;
    }

    /// End the race as if the finisher fired
    pub async fn finish_race(&self) {
        let mut state = self.lock().await;
        if !state.status.is_racing() {
            info!("Ignoring finish race request in state {}", state.status);
            return;
        }
        self.end_race_locked(&mut state).await;
    }

    /// Abort the race and return to manual driving
    pub async fn stop_race(&self) {
        let mut state = self.lock().await;
        if !state.status.is_racing() {
            info!("Ignoring stop race request in state {}", state.status);
            return;
        }
        self.end_race_locked(&mut state).await;
    }

    /// Hand the wheel to the operator; armed signals stay armed
    pub async fn pause_race(&self) {
        let mut state = self.lock().await;
        if !state.status.is_racing() {
            info!("Ignoring pause race request in state {}", state.status);
            return;
        }
        self.inner.driving.put_behind_wheel(&self.inner.manual).await;
        self.transition(&mut state, RaceStatus::RacingPaused);
    }

    /// Resume a paused race
    pub async fn continue_race(&self) {
        let mut state = self.lock().await;
        if state.status != RaceStatus::RacingPaused {
            info!("Ignoring continue race request in state {}", state.status);
            return;
        }
        self.inner.driving.put_behind_wheel(&self.inner.automated).await;
        self.transition(&mut state, RaceStatus::Racing);
    }

    pub async fn is_racing(&self) -> bool {
        self.lock().await.status.is_racing()
    }

    pub async fn active_signals(&self) -> ActiveSignals {
        let state = self.lock().await;
        ActiveSignals {
            starter: state.starter.is_some(),
            finisher: state.finisher.is_some(),
        }
    }

    /// Latest published race status
    pub fn race_status(&self) -> RaceStatus {
        self.inner.race_status.current()
    }

    /// Subscribe to race status updates, starting with the latest one
    pub fn subscribe_status(&self) -> StatusSubscription<RaceStatus> {
        self.inner.race_status.subscribe()
    }

    pub fn driving(&self) -> &CarDrivingService {
        &self.inner.driving
    }

    async fn start_race_locked(&self, state: &mut RaceState) {
        state.cancel(SignalKind::Starter);
        self.inner.driving.put_behind_wheel(&self.inner.automated).await;
        self.watch(state, SignalKind::Finisher);
        self.transition(state, RaceStatus::Racing);
    }

    async fn end_race_locked(&self, state: &mut RaceState) {
        state.cancel_all();
        self.inner.driving.put_behind_wheel(&self.inner.manual).await;
        self.transition(state, RaceStatus::ManualDriving);
    }

    fn transition(&self, state: &mut RaceState, status: RaceStatus) {
        info!("Race status {} -> {}", state.status, status);
        state.status = status;
        self.inner.race_status.publish(status);
    }

    /// Subscribe to a signal and spawn the task waiting for it
    fn watch(&self, state: &mut RaceState, kind: SignalKind) {
        state.cancel(kind);
        state.next_signal_id += 1;
        let id = state.next_signal_id;

        let source = match kind {
            SignalKind::Starter => &self.inner.starter,
            SignalKind::Finisher => &self.inner.finisher,
        };
        let mut subscription = source.subscribe();
        let weak = Arc::downgrade(&self.inner);

        let handle = tokio::spawn(async move {
            if !subscription.fired().await {
                debug!("{:?} subscription {} ended without firing", kind, id);
                return;
            }
            on_signal(weak, kind, id).await;
        });
        *state.slot(kind) = Some(SignalWatch { id, handle });
        debug!("Subscribed to {:?} ({})", kind, id);
    }
}

async fn on_signal(inner: Weak<Inner>, kind: SignalKind, id: u64) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let service = RaceControlService { inner };
    let mut state = service.lock().await;

    // Detach rather than abort: this task is the one running the transition
    let current = state.slot(kind).take();
    match current {
        Some(watch) if watch.id == id => drop(watch),
        other => {
            *state.slot(kind) = other;
            debug!("Discarding late {:?} event from subscription {}", kind, id);
            return;
        }
    }

    match kind {
        SignalKind::Starter => {
            info!("Start signal received");
            service.start_race_locked(&mut state).await;
        }
        SignalKind::Finisher => {
            info!("Finish signal received");
            service.end_race_locked(&mut state).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::SignalTrigger;
    use car::{Car, CarConfig, RecordingEngine};

    async fn service() -> RaceControlService {
        let car = Car::new(Box::new(RecordingEngine::new()), CarConfig::default());
        let feed = NavigationFeed::new(8);
        RaceControlService::new(
            CarDrivingService::new(car, 16),
            ManualDriver::default(),
            AutomatedDriver::new(feed, &DriverConfig::default()).unwrap(),
            SignalSource::Triggered(SignalTrigger::new()),
            SignalSource::Triggered(SignalTrigger::new()),
            16,
        )
        .await
    }

    async fn starter_id(service: &RaceControlService) -> Option<u64> {
        service.lock().await.starter.as_ref().map(|watch| watch.id)
    }

    #[tokio::test]
    async fn test_event_from_cancelled_starter_is_discarded() {
        let service = service().await;

        service.init_race().await;
        let stale = starter_id(&service).await.unwrap();
        service.stop_race().await;
        service.init_race().await;
        let current = starter_id(&service).await.unwrap();
        assert_ne!(stale, current);

        on_signal(Arc::downgrade(&service.inner), SignalKind::Starter, stale).await;
        assert_eq!(service.race_status(), RaceStatus::AwaitingStartSignal);
        assert_eq!(starter_id(&service).await, Some(current));
        assert_eq!(service.driving().active_driver().await, Some("manual"));

        on_signal(Arc::downgrade(&service.inner), SignalKind::Starter, current).await;
        assert_eq!(service.race_status(), RaceStatus::Racing);
        assert_eq!(starter_id(&service).await, None);
    }

    #[tokio::test]
    async fn test_finisher_event_after_stop_is_discarded() {
        let service = service().await;

        service.init_race().await;
        service.start_race().await;
        let finisher = service.lock().await.finisher.as_ref().map(|watch| watch.id).unwrap();
        service.stop_race().await;

        on_signal(Arc::downgrade(&service.inner), SignalKind::Finisher, finisher).await;
        assert_eq!(service.race_status(), RaceStatus::ManualDriving);
        assert_eq!(service.active_signals().await, ActiveSignals::default());
    }
}
