//! Car tuning configuration

use serde::{Deserialize, Serialize};

/// Car tuning configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarConfig {
    /// Speed change per incremental step (percent)
    pub speed_step: i32,

    /// Steering change per incremental step (degrees)
    pub steering_step: i32,

    /// Smallest effective non-zero speed magnitude (percent)
    pub dead_zone: i32,

    /// Largest steering change accepted by a single absolute drive request (degrees)
    pub max_direction_change: i32,
}

impl Default for CarConfig {
    fn default() -> Self {
        Self {
            speed_step: 3,
            steering_step: 10,
            dead_zone: 10,
            max_direction_change: 60,
        }
    }
}

impl CarConfig {
    /// Create a cautious config (small steps, gentle steering changes)
    pub fn cautious() -> Self {
        Self {
            speed_step: 2,
            steering_step: 5,
            max_direction_change: 30,
            ..Default::default()
        }
    }
}
