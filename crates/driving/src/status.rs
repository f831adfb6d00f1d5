//! Latest-value status broadcasting
//!
//! Subscribers receive the current value immediately, then every update.
//! A subscriber that falls behind skips to newer values instead of blocking
//! the publisher.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use tracing::warn;

struct Shared<T> {
    latest: Mutex<T>,
    tx: broadcast::Sender<T>,
}

/// Multi-subscriber channel that replays its latest value
pub struct StatusChannel<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for StatusChannel<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Clone + Send + 'static> StatusChannel<T> {
    pub fn new(initial: T, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            shared: Arc::new(Shared {
                latest: Mutex::new(initial),
                tx,
            }),
        }
    }

    fn latest(&self) -> MutexGuard<'_, T> {
        self.shared
            .latest
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record and broadcast a new value
    pub fn publish(&self, value: T) {
        let mut latest = self.latest();
        *latest = value.clone();
        // No receivers is fine, the value is still replayed to future subscribers
        let _ = self.shared.tx.send(value);
    }

    /// Most recently published value
    pub fn current(&self) -> T {
        self.latest().clone()
    }

    /// Subscribe, starting with the current value
    pub fn subscribe(&self) -> StatusSubscription<T> {
        // Holding the lock orders the snapshot before any later broadcast
        let latest = self.latest();
        let rx = self.shared.tx.subscribe();
        StatusSubscription {
            pending: Some(latest.clone()),
            rx,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.tx.receiver_count()
    }
}

/// A subscriber's view of a `StatusChannel`
pub struct StatusSubscription<T> {
    pending: Option<T>,
    rx: broadcast::Receiver<T>,
}

impl<T: Clone> StatusSubscription<T> {
    /// Next value; `None` once every publisher is gone
    pub async fn next(&mut self) -> Option<T> {
        if let Some(value) = self.pending.take() {
            return Some(value);
        }

        loop {
            match self.rx.recv().await {
                Ok(value) => return Some(value),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Status subscriber lagged, skipped {} updates", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
