//! Car Actuation
//!
//! Domain model for the race car:
//! - Bounded `Speed` and `Direction` values with dead-zone and clamping rules
//! - `Car`, the single mutable actuator with fail-safe drive checks
//! - `DriveCommand`, one unit of actuation request
//! - `CarEngine`, the seam to the physical actuator

pub mod car;
pub mod command;
pub mod config;
pub mod engine;
pub mod status;
pub mod value;

pub use car::Car;
pub use command::{DriveCommand, IncrementalDirection};
pub use config::CarConfig;
pub use engine::{CarEngine, EngineCall, LoggingEngine, RecordingEngine};
pub use status::CarStatus;
pub use value::{Direction, Speed};

use thiserror::Error;

/// Car error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CarError {
    /// Value outside of its allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: i32,
        min: i32,
        max: i32,
    },
}
