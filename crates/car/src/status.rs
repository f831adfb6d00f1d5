//! Car status snapshot

use serde::{Deserialize, Serialize};

use crate::value::{Direction, Speed};

/// Immutable snapshot of the committed speed and direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarStatus {
    /// Committed speed
    pub speed: Speed,

    /// Committed steering direction
    pub direction: Direction,
}

impl CarStatus {
    /// Check if the car is standing still with straight wheels
    pub fn is_stopped(&self) -> bool {
        self.speed.is_neutral() && self.direction.is_straight()
    }
}
