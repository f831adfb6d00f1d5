//! Car driving service
//!
//! Owns the car and the single active command stream. Every hand-off stops
//! the car before the old driver is released and again once the new driver
//! is subscribed. Commands from a driver that was replaced are never applied:
//! each stream is tagged with a generation and the drive loop discards items
//! whose generation is no longer current.

use std::sync::{Arc, Weak};

use car::{Car, CarStatus};
use tokio::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::driver::{DriveCommandStream, Driver};
use crate::status::{StatusChannel, StatusSubscription};

struct ActiveDriver {
    generation: u64,
    name: &'static str,
    handle: JoinHandle<()>,
}

struct DrivingState {
    car: Car,
    generation: u64,
    active: Option<ActiveDriver>,
}

impl DrivingState {
    /// Stop the car and drop the active stream, if any
    fn release(&mut self) -> Option<&'static str> {
        self.car.stop();
        let previous = self.active.take()?;
        previous.handle.abort();
        self.car.stop();
        Some(previous.name)
    }
}

struct Inner {
    state: Mutex<DrivingState>,
    car_status: StatusChannel<CarStatus>,
}

impl Inner {
    async fn lock(&self) -> MutexGuard<'_, DrivingState> {
        self.state.lock().await
    }
}

/// Serializes drivers onto the car
#[derive(Clone)]
pub struct CarDrivingService {
    inner: Arc<Inner>,
}

impl CarDrivingService {
    pub fn new(car: Car, status_buffer: usize) -> Self {
        let status = car.status();
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(DrivingState {
                    car,
                    generation: 0,
                    active: None,
                }),
                car_status: StatusChannel::new(status, status_buffer),
            }),
        }
    }

    /// Hand the wheel to `driver`, replacing the current one.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn put_behind_wheel(&self, driver: &Driver) {
        let mut state = self.inner.lock().await;

        if let Some(previous) = state.release() {
            info!("Driver {} removed from behind the wheel", previous);
        }

        state.generation += 1;
        let generation = state.generation;
        let stream = driver.subscribe();
        let handle = tokio::spawn(drive_loop(Arc::downgrade(&self.inner), generation, stream));
        state.active = Some(ActiveDriver {
            generation,
            name: driver.name(),
            handle,
        });

        state.car.stop();
        self.inner.car_status.publish(state.car.status());
        info!("Driver {} behind the wheel (generation {})", driver.name(), generation);
    }

    /// Remove the current driver and leave the car stopped
    pub async fn release(&self) {
        let mut state = self.inner.lock().await;
        if let Some(previous) = state.release() {
            info!("Driver {} released, car parked", previous);
        }
        self.inner.car_status.publish(state.car.status());
    }

    /// Name of the driver currently behind the wheel
    pub async fn active_driver(&self) -> Option<&'static str> {
        let state = self.inner.lock().await;
        state
            .active
            .as_ref()
            .filter(|active| active.generation == state.generation)
            .map(|active| active.name)
    }

    /// Latest committed car status
    pub fn car_status(&self) -> CarStatus {
        self.inner.car_status.current()
    }

    /// Subscribe to car status updates, starting with the latest one
    pub fn subscribe_status(&self) -> StatusSubscription<CarStatus> {
        self.inner.car_status.subscribe()
    }
}

async fn drive_loop(inner: Weak<Inner>, generation: u64, mut stream: DriveCommandStream) {
    loop {
        let item = stream.next().await;

        let Some(inner) = inner.upgrade() else {
            return;
        };
        let mut state = inner.lock().await;
        if state.generation != generation {
            debug!("Discarding command from replaced driver (generation {})", generation);
            return;
        }

        match item {
            Some(Ok(command)) => {
                command.apply(&mut state.car);
                inner.car_status.publish(state.car.status());
            }
            Some(Err(e)) => {
                error!("Driver failed: {}, stopping the car", e);
                state.active = None;
                state.car.stop();
                inner.car_status.publish(state.car.status());
                return;
            }
            None => {
                warn!("Driver stream completed, stopping the car");
                state.active = None;
                state.car.stop();
                inner.car_status.publish(state.car.status());
                return;
            }
        }
    }
}
