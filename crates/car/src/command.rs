//! Drive commands

use serde::{Deserialize, Serialize};

use crate::car::Car;
use crate::value::{Direction, Speed};

/// Relative change requested by an incremental command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncrementalDirection {
    Forward,
    Backward,
    Left,
    Right,
    Stop,
}

/// One unit of actuation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriveCommand {
    /// Drive to an explicit target state
    Absolute { speed: Speed, direction: Direction },

    /// Take one relative step
    Incremental(IncrementalDirection),
}

impl DriveCommand {
    /// Absolute command helper
    pub fn absolute(speed: Speed, direction: Direction) -> Self {
        DriveCommand::Absolute { speed, direction }
    }

    /// Apply this command to the car
    pub fn apply(&self, car: &mut Car) {
        match *self {
            DriveCommand::Absolute { speed, direction } => car.drive(speed, Some(direction)),
            DriveCommand::Incremental(step) => match step {
                IncrementalDirection::Forward => car.increase_speed(),
                IncrementalDirection::Backward => car.decrease_speed(),
                IncrementalDirection::Left => car.steer_left(),
                IncrementalDirection::Right => car.steer_right(),
                IncrementalDirection::Stop => car.stop(),
            },
        }
    }
}

impl From<IncrementalDirection> for DriveCommand {
    fn from(step: IncrementalDirection) -> Self {
        DriveCommand::Incremental(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CarConfig, RecordingEngine};

    fn car() -> Car {
        Car::new(Box::new(RecordingEngine::new()), CarConfig::default())
    }

    #[test]
    fn test_absolute_command() {
        let mut car = car();
        let command = DriveCommand::absolute(Speed::new(16).unwrap(), Direction::new(-12).unwrap());
        command.apply(&mut car);
        assert_eq!(car.status().speed.value(), 16);
        assert_eq!(car.status().direction.degrees(), -12);
    }

    #[test]
    fn test_incremental_commands() {
        let mut car = car();
        DriveCommand::from(IncrementalDirection::Forward).apply(&mut car);
        DriveCommand::from(IncrementalDirection::Right).apply(&mut car);
        assert_eq!(car.status().speed.value(), 10);
        assert_eq!(car.status().direction.degrees(), 10);

        DriveCommand::from(IncrementalDirection::Left).apply(&mut car);
        DriveCommand::from(IncrementalDirection::Left).apply(&mut car);
        assert_eq!(car.status().direction.degrees(), -10);

        DriveCommand::from(IncrementalDirection::Stop).apply(&mut car);
        assert!(car.status().is_stopped());
    }

    #[test]
    fn test_backward_from_standstill() {
        let mut car = car();
        DriveCommand::Incremental(IncrementalDirection::Backward).apply(&mut car);
        assert_eq!(car.status().speed.value(), -10);
    }
}
