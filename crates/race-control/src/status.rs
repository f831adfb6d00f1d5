use std::fmt;

use serde::{Deserialize, Serialize};

/// Race phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RaceStatus {
    /// Operator drives the car
    #[default]
    ManualDriving,
    /// Waiting for the starter signal
    AwaitingStartSignal,
    /// Automated driver in control until the finisher fires
    Racing,
    /// Operator drives, race resumes on continue
    RacingPaused,
}

impl RaceStatus {
    /// True in every phase of a race in progress
    pub fn is_racing(&self) -> bool {
        matches!(
            self,
            RaceStatus::AwaitingStartSignal | RaceStatus::Racing | RaceStatus::RacingPaused
        )
    }
}

impl fmt::Display for RaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RaceStatus::ManualDriving => "MANUAL_DRIVING",
            RaceStatus::AwaitingStartSignal => "AWAITING_START_SIGNAL",
            RaceStatus::Racing => "RACING",
            RaceStatus::RacingPaused => "RACING_PAUSED",
        };
        f.write_str(name)
    }
}
