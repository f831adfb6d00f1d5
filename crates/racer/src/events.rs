//! Operator control events
//!
//! One JSON object per message, routed by its `target` field:
//!
//! ```json
//! {"target": "car", "type": "FORWARD"}
//! {"target": "race", "type": "INIT_RACE"}
//! {"target": "frame", "lines": [{"x1": 100, "y1": 480, "x2": 200, "y2": 200}]}
//! {"target": "heartbeat"}
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use car::{DriveCommand, IncrementalDirection};
use chrono::{DateTime, Utc};
use navigation::LineSegment;
use serde::{Deserialize, Serialize};

static NEXT_EVENT_ID: AtomicU64 = AtomicU64::new(1);

fn next_event_id() -> u64 {
    NEXT_EVENT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Manual steering request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarControlEvent {
    #[serde(default = "next_event_id")]
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: IncrementalDirection,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl CarControlEvent {
    pub fn new(kind: IncrementalDirection) -> Self {
        Self {
            id: next_event_id(),
            kind,
            timestamp: Utc::now(),
        }
    }

    pub fn command(&self) -> DriveCommand {
        DriveCommand::from(self.kind)
    }
}

/// Race control request kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RaceControlType {
    Manual,
    InitRace,
    Race,
    Stop,
    Pause,
    Continue,
}

/// Race control request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceControlEvent {
    #[serde(default = "next_event_id")]
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: RaceControlType,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl RaceControlEvent {
    pub fn new(kind: RaceControlType) -> Self {
        Self {
            id: next_event_id(),
            kind,
            timestamp: Utc::now(),
        }
    }
}

/// Any message accepted on the operator input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum OperatorMessage {
    Car(CarControlEvent),
    Race(RaceControlEvent),
    /// Lane-boundary segments of one camera frame
    Frame { lines: Vec<LineSegment> },
    /// Keeps the operator link alive without changing anything
    Heartbeat,
}

impl OperatorMessage {
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
