//! Drivers
//!
//! A driver is a source of drive commands. Every `subscribe` call opens a
//! fresh stream; the driving service holds at most one at a time.

use car::{Direction, DriveCommand, IncrementalDirection, Speed};
use navigation::{NavigationDirections, NavigationFeed};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::config::DriverConfig;
use crate::DrivingError;

/// A source of drive commands
#[derive(Debug, Clone)]
pub enum Driver {
    /// Relays operator commands
    Manual(ManualDriver),
    /// Follows navigation headings at cruise speed
    Automated(AutomatedDriver),
}

impl Driver {
    /// Open a new command stream
    pub fn subscribe(&self) -> DriveCommandStream {
        match self {
            Driver::Manual(driver) => DriveCommandStream {
                inner: StreamInner::Manual(driver.tx.subscribe()),
            },
            Driver::Automated(driver) => DriveCommandStream {
                inner: StreamInner::Automated {
                    headings: driver.feed.subscribe(),
                    cruise_speed: driver.cruise_speed,
                },
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Driver::Manual(_) => "manual",
            Driver::Automated(_) => "automated",
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, Driver::Manual(_))
    }
}

impl From<ManualDriver> for Driver {
    fn from(driver: ManualDriver) -> Self {
        Driver::Manual(driver)
    }
}

impl From<AutomatedDriver> for Driver {
    fn from(driver: AutomatedDriver) -> Self {
        Driver::Automated(driver)
    }
}

/// Relays drive commands pushed by a human operator
#[derive(Debug, Clone)]
pub struct ManualDriver {
    tx: broadcast::Sender<DriveCommand>,
}

impl ManualDriver {
    pub fn new(config: &DriverConfig) -> Self {
        let (tx, _) = broadcast::channel(config.command_buffer.max(1));
        Self { tx }
    }

    /// Forward an operator command; returns false when no stream is open
    pub fn push(&self, command: DriveCommand) -> bool {
        match self.tx.send(command) {
            Ok(_) => true,
            Err(_) => {
                debug!("Manual command {:?} dropped, manual driver not behind the wheel", command);
                false
            }
        }
    }

    pub fn push_incremental(&self, direction: IncrementalDirection) -> bool {
        self.push(DriveCommand::Incremental(direction))
    }
}

impl Default for ManualDriver {
    fn default() -> Self {
        Self::new(&DriverConfig::default())
    }
}

/// Follows navigation headings at a constant cruise speed
#[derive(Debug, Clone)]
pub struct AutomatedDriver {
    feed: NavigationFeed,
    cruise_speed: Speed,
}

impl AutomatedDriver {
    pub fn new(feed: NavigationFeed, config: &DriverConfig) -> Result<Self, DrivingError> {
        Ok(Self {
            feed,
            cruise_speed: Speed::new(config.cruise_speed)?,
        })
    }

    pub fn cruise_speed(&self) -> Speed {
        self.cruise_speed
    }

    fn command_for(cruise_speed: Speed, directions: NavigationDirections) -> Result<DriveCommand, DrivingError> {
        let direction = Direction::new(directions.degrees)?;
        Ok(DriveCommand::absolute(cruise_speed, direction))
    }
}

enum StreamInner {
    Manual(broadcast::Receiver<DriveCommand>),
    Automated {
        headings: broadcast::Receiver<NavigationDirections>,
        cruise_speed: Speed,
    },
}

/// An open command stream.
///
/// Yields `None` once the driver is gone. Commands a slow consumer missed
/// are skipped, only the newest ones matter to a moving car.
pub struct DriveCommandStream {
    inner: StreamInner,
}

impl DriveCommandStream {
    pub async fn next(&mut self) -> Option<Result<DriveCommand, DrivingError>> {
        match &mut self.inner {
            StreamInner::Manual(rx) => recv_latest(rx).await.map(Ok),
            StreamInner::Automated {
                headings,
                cruise_speed,
            } => {
                let directions = recv_latest(headings).await?;
                Some(AutomatedDriver::command_for(*cruise_speed, directions))
            }
        }
    }
}

async fn recv_latest<T: Clone>(rx: &mut broadcast::Receiver<T>) -> Option<T> {
    loop {
        match rx.recv().await {
            Ok(value) => return Some(value),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Drive command stream lagged, skipped {} commands", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use car::CarError;

    #[tokio::test]
    async fn test_manual_stream_relays_commands() {
        let manual = ManualDriver::default();
        let driver = Driver::from(manual.clone());
        let mut stream = driver.subscribe();

        assert!(manual.push_incremental(IncrementalDirection::Forward));
        assert_eq!(
            stream.next().await,
            Some(Ok(DriveCommand::Incremental(IncrementalDirection::Forward)))
        );
    }

    #[tokio::test]
    async fn test_manual_stream_ends_when_driver_dropped() {
        let driver = Driver::Manual(ManualDriver::default());
        let mut stream = driver.subscribe();
        drop(driver);

        assert_eq!(stream.next().await, None);
    }

    #[test]
    fn test_push_without_stream() {
        let manual = ManualDriver::default();
        assert!(!manual.push_incremental(IncrementalDirection::Stop));
    }

    #[tokio::test]
    async fn test_automated_maps_headings() {
        let feed = NavigationFeed::new(8);
        let driver = Driver::from(AutomatedDriver::new(feed.clone(), &DriverConfig::default()).unwrap());
        let mut stream = driver.subscribe();

        feed.publish(NavigationDirections::of(-25));
        assert_eq!(
            stream.next().await,
            Some(Ok(DriveCommand::absolute(
                Speed::new(16).unwrap(),
                Direction::new(-25).unwrap()
            )))
        );
    }

    #[tokio::test]
    async fn test_automated_rejects_out_of_range_heading() {
        let feed = NavigationFeed::new(8);
        let driver = Driver::from(AutomatedDriver::new(feed.clone(), &DriverConfig::default()).unwrap());
        let mut stream = driver.subscribe();

        feed.publish(NavigationDirections::of(75));
        assert!(matches!(
            stream.next().await,
            Some(Err(DrivingError::Car(CarError::OutOfRange { .. })))
        ));
    }

    #[test]
    fn test_invalid_cruise_speed() {
        let config = DriverConfig {
            cruise_speed: 150,
            ..Default::default()
        };
        assert!(AutomatedDriver::new(NavigationFeed::default(), &config).is_err());
    }
}
