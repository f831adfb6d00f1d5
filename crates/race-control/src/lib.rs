//! Race Control
//!
//! Race state machine switching the car between the manual and automated
//! drivers, driven by operator requests and start/finish signals.

pub mod config;
pub mod service;
pub mod signal;
pub mod status;

pub use config::{RaceConfig, SignalConfig};
pub use service::{ActiveSignals, RaceControlService};
pub use signal::{SignalSource, SignalSubscription, SignalTrigger};
pub use status::RaceStatus;

use driving::DrivingError;
use thiserror::Error;

/// Race control error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RaceControlError {
    #[error("Driver setup failed: {0}")]
    Driving(#[from] DrivingError),
}
