//! Per-frame navigation output

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Steering decision for one processed frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationDirections {
    /// Heading relative to straight ahead (degrees, negative is left)
    pub degrees: i32,
}

impl NavigationDirections {
    pub fn of(degrees: i32) -> Self {
        Self { degrees }
    }
}

/// Broadcast feed of navigation decisions.
///
/// Every subscriber sees the headings published after it subscribed.
#[derive(Debug, Clone)]
pub struct NavigationFeed {
    tx: broadcast::Sender<NavigationDirections>,
}

impl NavigationFeed {
    /// Create a feed buffering up to `capacity` headings per slow subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish a heading; returns false when nobody is listening
    pub fn publish(&self, directions: NavigationDirections) -> bool {
        match self.tx.send(directions) {
            Ok(_) => true,
            Err(_) => {
                debug!("No subscribers for navigation directions {:?}", directions);
                false
            }
        }
    }

    /// Subscribe to headings published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<NavigationDirections> {
        self.tx.subscribe()
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for NavigationFeed {
    fn default() -> Self {
        Self::new(16)
    }
}
