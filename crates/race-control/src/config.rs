//! Race control configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::signal::SignalSource;

/// Configured start or finish signal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SignalConfig {
    /// Fire once after a fixed delay
    Timed { after_ms: u64 },
    /// Never fire; the race ends by operator request only
    Never,
}

impl SignalConfig {
    pub fn source(&self) -> SignalSource {
        match self {
            SignalConfig::Timed { after_ms } => SignalSource::Timed(Duration::from_millis(*after_ms)),
            SignalConfig::Never => SignalSource::Never,
        }
    }
}

/// Race control configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    /// Pending race status updates buffered per subscriber
    pub status_buffer: usize,

    /// Signal that starts the race
    pub starter: SignalConfig,

    /// Signal that ends the race
    pub finisher: SignalConfig,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            status_buffer: 16,
            starter: SignalConfig::Timed { after_ms: 2000 },
            finisher: SignalConfig::Timed { after_ms: 5000 },
        }
    }
}
