//! Racer configuration
//!
//! Defaults, overridden by an optional config file, overridden by
//! `TROJKA__`-prefixed environment variables (`TROJKA__CAR__SPEED_STEP=5`).

use std::time::Duration;

use car::CarConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use driving::DriverConfig;
use navigation::SteeringConfig;
use race_control::RaceConfig;
use serde::{Deserialize, Serialize};

use crate::RacerError;

/// Where the automated driver's headings come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum NavigationMode {
    /// Replay a scripted heading sequence
    FixedPath { interval_ms: u64, headings: Vec<i32> },
    /// Steer from lane-boundary segments supplied by the vision pipeline
    Vision { min_slope: f64, max_slope: f64 },
}

impl Default for NavigationMode {
    fn default() -> Self {
        NavigationMode::FixedPath {
            interval_ms: 250,
            headings: vec![0, 5, 15, 25, 25, 22, 15, 5, -15, -5, 0],
        }
    }
}

/// Complete racer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RacerConfig {
    /// Log level name (`trace` .. `error`)
    pub log_level: String,
    pub car: CarConfig,
    pub steering: SteeringConfig,
    pub driver: DriverConfig,
    pub race: RaceConfig,
    pub navigation: NavigationMode,

    /// Park the car when the operator is silent this long (ms); `None` disables
    pub operator_timeout_ms: Option<u64>,
}

impl Default for RacerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            car: CarConfig::default(),
            steering: SteeringConfig::default(),
            driver: DriverConfig::default(),
            race: RaceConfig::default(),
            navigation: NavigationMode::default(),
            operator_timeout_ms: Some(1000),
        }
    }
}

impl RacerConfig {
    /// Load from an optional file (format by extension) and the environment
    pub fn load(path: Option<&str>) -> Result<Self, RacerError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path));
        }
        Self::build(builder)
    }

    /// Deadman timeout, rejecting a zero interval
    pub fn operator_timeout(&self) -> Result<Option<Duration>, RacerError> {
        match self.operator_timeout_ms {
            Some(0) => Err(RacerError::Settings(
                "operator_timeout_ms must be non-zero".to_string(),
            )),
            other => Ok(other.map(Duration::from_millis)),
        }
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, RacerError> {
        let settings = builder
            .add_source(
                Environment::with_prefix("TROJKA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
