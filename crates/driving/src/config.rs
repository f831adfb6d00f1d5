//! Driver configuration

use serde::{Deserialize, Serialize};

/// Driver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Speed the automated driver holds while following headings (percent)
    pub cruise_speed: i32,

    /// Pending manual commands buffered per driving stream
    pub command_buffer: usize,

    /// Pending status updates buffered per subscriber
    pub status_buffer: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            cruise_speed: 16,
            command_buffer: 64,
            status_buffer: 32,
        }
    }
}
