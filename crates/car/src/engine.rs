//! Actuator seam
//!
//! The physical PWM/serial translation lives behind `CarEngine`; this crate
//! only ships engines that log or record what they are told.

use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

use crate::value::{Direction, Speed};

/// Physical actuator receiving every committed value
pub trait CarEngine: Send {
    /// Apply a new motor speed
    fn update_motor(&mut self, speed: Speed);

    /// Apply a new steering direction
    fn update_direction(&mut self, direction: Direction);
}

/// Engine for development runs: logs every value and drives nothing
#[derive(Debug, Default)]
pub struct LoggingEngine;

impl CarEngine for LoggingEngine {
    fn update_motor(&mut self, speed: Speed) {
        debug!("Engine motor -> {} (pwm {}%)", speed, speed.as_percentage());
    }

    fn update_direction(&mut self, direction: Direction) {
        debug!("Engine steering -> {} (pwm {}%)", direction, direction.as_percentage());
    }
}

/// One call received by a `RecordingEngine`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCall {
    Motor(Speed),
    Steering(Direction),
}

/// Engine that keeps every call it received.
///
/// Clones share the same log, so a test can keep one clone and hand the
/// other to the car.
#[derive(Debug, Clone, Default)]
pub struct RecordingEngine {
    calls: Arc<Mutex<Vec<EngineCall>>>,
}

impl RecordingEngine {
    /// Create an empty recording engine
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> MutexGuard<'_, Vec<EngineCall>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// All calls received so far
    pub fn calls(&self) -> Vec<EngineCall> {
        self.log().clone()
    }

    /// Most recent motor value
    pub fn last_speed(&self) -> Option<Speed> {
        self.log().iter().rev().find_map(|call| match call {
            EngineCall::Motor(speed) => Some(*speed),
            EngineCall::Steering(_) => None,
        })
    }

    /// Most recent steering value
    pub fn last_direction(&self) -> Option<Direction> {
        self.log().iter().rev().find_map(|call| match call {
            EngineCall::Steering(direction) => Some(*direction),
            EngineCall::Motor(_) => None,
        })
    }

    /// Forget all recorded calls
    pub fn clear(&self) {
        self.log().clear();
    }
}

impl CarEngine for RecordingEngine {
    fn update_motor(&mut self, speed: Speed) {
        self.log().push(EngineCall::Motor(speed));
    }

    fn update_direction(&mut self, direction: Direction) {
        self.log().push(EngineCall::Steering(direction));
    }
}
