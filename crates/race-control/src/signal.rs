//! Start and finish signal sources
//!
//! A signal emits at most one meaningful event per subscription. Sources are
//! restartable: every race subscribes afresh.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Handle for firing a `SignalSource::Triggered` signal from outside
#[derive(Debug, Clone)]
pub struct SignalTrigger {
    tx: broadcast::Sender<bool>,
}

impl SignalTrigger {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(4);
        Self { tx }
    }

    /// Fire the signal; returns false when nobody is subscribed
    pub fn fire(&self) -> bool {
        self.send(true)
    }

    /// Report a negative detection, which subscribers ignore
    pub fn send(&self, detected: bool) -> bool {
        self.tx.send(detected).is_ok()
    }

    /// Number of live subscriptions
    pub fn listeners(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SignalTrigger {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a start or finish signal comes from
#[derive(Debug, Clone)]
pub enum SignalSource {
    /// Fires once, this long after subscribing
    Timed(Duration),
    /// Never fires
    Never,
    /// Fires when the trigger reports a detection
    Triggered(SignalTrigger),
}

impl SignalSource {
    pub fn subscribe(&self) -> SignalSubscription {
        match self {
            SignalSource::Timed(delay) => SignalSubscription::Timed(Instant::now() + *delay),
            SignalSource::Never => SignalSubscription::Never,
            SignalSource::Triggered(trigger) => SignalSubscription::Triggered(trigger.tx.subscribe()),
        }
    }
}

/// A live subscription to a signal source
#[derive(Debug)]
pub enum SignalSubscription {
    Timed(Instant),
    Never,
    Triggered(broadcast::Receiver<bool>),
}

impl SignalSubscription {
    /// Wait for the signal; false when the source went away without firing
    pub async fn fired(&mut self) -> bool {
        match self {
            SignalSubscription::Timed(deadline) => {
                tokio::time::sleep_until(*deadline).await;
                true
            }
            SignalSubscription::Never => std::future::pending().await,
            SignalSubscription::Triggered(rx) => loop {
                match rx.recv().await {
                    Ok(true) => return true,
                    Ok(false) => debug!("Signal reported no detection"),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Signal subscription lagged, skipped {} events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => return false,
                }
            },
        }
    }
}
