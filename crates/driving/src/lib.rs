//! Driving
//!
//! Guarantees that exactly one driver controls the car at a time:
//! - Manual and automated drivers producing drive command streams
//! - The driving service that swaps drivers with a fail-safe stop
//! - Latest-value status broadcasting

pub mod config;
pub mod driver;
pub mod service;
pub mod status;

pub use config::DriverConfig;
pub use driver::{AutomatedDriver, DriveCommandStream, Driver, ManualDriver};
pub use service::CarDrivingService;
pub use status::{StatusChannel, StatusSubscription};

use car::CarError;
use thiserror::Error;

/// Driving error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DrivingError {
    #[error("Invalid drive command: {0}")]
    Car(#[from] CarError),
}
