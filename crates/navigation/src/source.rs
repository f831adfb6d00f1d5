//! Heading sources feeding the automated driver

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::directions::{NavigationDirections, NavigationFeed};
use crate::segment::LineSegment;
use crate::steering::LineNavigator;
use crate::NavigationError;

/// Runs the steering algorithm over frames delivered by the vision pipeline
pub struct LineNavigationSource;

impl LineNavigationSource {
    /// Spawn a task publishing one heading per received frame.
    ///
    /// The task ends when the frame sender is dropped.
    pub fn spawn(
        mut frames: mpsc::Receiver<Vec<LineSegment>>,
        navigator: LineNavigator,
        feed: NavigationFeed,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("Line navigation started");
            let mut processed: u64 = 0;

            while let Some(lines) = frames.recv().await {
                let directions = navigator.navigate(&lines);
                processed += 1;
                debug!(
                    frame = processed,
                    segments = lines.len(),
                    degrees = directions.degrees,
                    "Frame navigated"
                );
                feed.publish(directions);
            }

            info!("Line navigation stopped after {} frames", processed);
        })
    }
}

/// Replays a scripted heading sequence at a fixed interval, repeating forever
#[derive(Debug, Clone)]
pub struct FixedPathSource {
    interval: Duration,
    headings: Vec<i32>,
}

impl FixedPathSource {
    pub fn new(interval: Duration, headings: Vec<i32>) -> Result<Self, NavigationError> {
        if headings.is_empty() {
            return Err(NavigationError::EmptyPath);
        }
        if interval.is_zero() {
            return Err(NavigationError::ZeroInterval);
        }
        Ok(Self { interval, headings })
    }

    pub fn headings(&self) -> &[i32] {
        &self.headings
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the replay task; abort the handle to stop it
    pub fn spawn(self, feed: NavigationFeed) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                "Fixed path navigation started: {} headings every {:?}",
                self.headings.len(),
                self.interval
            );
            let mut ticker = tokio::time::interval(self.interval);

            for degrees in self.headings.iter().copied().cycle() {
                ticker.tick().await;
                feed.publish(NavigationDirections::of(degrees));
            }
        })
    }
}
