//! Trojka Racer
//!
//! Process wiring for the race car: configuration loading, logging, operator
//! control events and the running racer.

pub mod deadman;
pub mod events;
pub mod racer;
pub mod settings;

pub use deadman::DeadmanSwitch;
pub use events::{CarControlEvent, OperatorMessage, RaceControlEvent, RaceControlType};
pub use racer::Racer;
pub use settings::{NavigationMode, RacerConfig};

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Racer error types
#[derive(Error, Debug)]
pub enum RacerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Malformed control event: {0}")]
    Event(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Navigation setup failed: {0}")]
    Navigation(#[from] navigation::NavigationError),

    #[error("Race control setup failed: {0}")]
    RaceControl(#[from] race_control::RaceControlError),

    #[error("Invalid setting: {0}")]
    Settings(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

/// Initialize logging at the given level name, falling back to `info`
pub fn init_logging(level: &str) -> Result<(), RacerError> {
    let max_level = level.parse::<Level>().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(max_level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| RacerError::Logging(e.to_string()))
}
