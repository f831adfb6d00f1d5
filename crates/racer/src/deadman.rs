//! Operator deadman switch
//!
//! Parks the car when the operator link goes quiet. Any operator message
//! counts as a heartbeat; the first one after a trip hands the wheel back to
//! the manual driver.

use std::sync::Arc;
use std::time::Duration;

use race_control::RaceControlService;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};

struct Inner {
    race: RaceControlService,
    tripped: Mutex<bool>,
    beats: watch::Sender<()>,
}

impl Inner {
    async fn trip(&self, timeout: Duration) {
        let mut tripped = self.tripped.lock().await;
        if *tripped {
            return;
        }
        *tripped = true;
        warn!("No operator message for {:?}, parking the car", timeout);
        self.race.start_manual_driving().await;
        self.race.driving().release().await;
    }
}

/// Stops the car when no operator heartbeat arrives within the timeout
#[derive(Clone)]
pub struct DeadmanSwitch {
    inner: Arc<Inner>,
}

impl DeadmanSwitch {
    /// Arm the switch; abort the returned handle to disarm it
    pub fn spawn(timeout: Duration, race: RaceControlService) -> (Self, JoinHandle<()>) {
        let (beats, mut rx) = watch::channel(());
        let inner = Arc::new(Inner {
            race,
            tripped: Mutex::new(false),
            beats,
        });

        let watcher = Arc::clone(&inner);
        let handle = tokio::spawn(async move {
            info!("Deadman switch armed, timeout {:?}", timeout);
            loop {
                match tokio::time::timeout(timeout, rx.changed()).await {
                    Ok(Ok(())) => {}
                    Ok(Err(_)) => return,
                    Err(_) => {
                        watcher.trip(timeout).await;
                        if rx.changed().await.is_err() {
                            return;
                        }
                    }
                }
            }
        });

        (Self { inner }, handle)
    }

    /// Record operator activity; returns true when this re-enabled driving
    pub async fn beat(&self) -> bool {
        let mut tripped = self.inner.tripped.lock().await;
        self.inner.beats.send_replace(());
        if !*tripped {
            return false;
        }
        *tripped = false;
        info!("Operator link restored, resuming manual driving");
        self.inner.race.start_manual_driving().await;
        true
    }

    pub async fn is_tripped(&self) -> bool {
        *self.inner.tripped.lock().await
    }
}
