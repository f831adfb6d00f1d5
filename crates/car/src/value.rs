//! Bounded speed and steering direction values

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::CarError;

/// Speed of the car as a percentage of full throttle, negative is reverse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Speed(i32);

impl Speed {
    /// Full reverse
    pub const MIN: i32 = -100;
    /// Full throttle
    pub const MAX: i32 = 100;
    /// Neutral
    pub const ZERO: Speed = Speed(0);

    /// Create a speed, failing when outside `[MIN, MAX]`
    pub fn new(value: i32) -> Result<Self, CarError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(CarError::OutOfRange {
                field: "speed",
                value,
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(Self(value))
    }

    /// Raw speed value
    pub fn value(&self) -> i32 {
        self.0
    }

    /// True when standing still
    pub fn is_neutral(&self) -> bool {
        self.0 == 0
    }

    /// Speed as a percentage of the maximum for its sign
    pub fn as_percentage(&self) -> i32 {
        if self.0 < 0 {
            (-100 * self.0) / Self::MIN
        } else {
            (100 * self.0) / Self::MAX
        }
    }

    /// Step the speed up, applying the dead-zone rule.
    ///
    /// Increasing while reversing slows the car down and may stop it.
    /// At `MAX` this is a no-op.
    pub fn increase(self, step: i32, dead_zone: i32) -> Speed {
        let stepped = self.0.saturating_add(step).min(Self::MAX);
        Speed(apply_dead_zone(self.0, stepped, dead_zone))
    }

    /// Step the speed down, applying the dead-zone rule.
    pub fn decrease(self, step: i32, dead_zone: i32) -> Speed {
        let stepped = self.0.saturating_sub(step).max(Self::MIN);
        Speed(apply_dead_zone(self.0, stepped, dead_zone))
    }
}

/// Snap a value that lands strictly inside `(0, dead_zone)` in magnitude.
///
/// Moving away from neutral snaps to the threshold, moving toward (or across)
/// neutral snaps to zero.
fn apply_dead_zone(previous: i32, next: i32, dead_zone: i32) -> i32 {
    if next == 0 || next.abs() >= dead_zone {
        return next;
    }
    let crossed_neutral = previous != 0 && previous.signum() != next.signum();
    if crossed_neutral || next.abs() < previous.abs() {
        0
    } else {
        dead_zone.min(Speed::MAX) * next.signum()
    }
}

impl TryFrom<i32> for Speed {
    type Error = CarError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Speed::new(value)
    }
}

impl From<Speed> for i32 {
    fn from(speed: Speed) -> Self {
        speed.0
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Steering wheel angle in degrees, negative is left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Direction(i32);

impl Direction {
    /// Full left lock
    pub const MIN_DEGREES: i32 = -60;
    /// Full right lock
    pub const MAX_DEGREES: i32 = 60;
    /// Wheels straight
    pub const STRAIGHT: Direction = Direction(0);

    /// Create a direction, failing when outside `[MIN_DEGREES, MAX_DEGREES]`
    pub fn new(degrees: i32) -> Result<Self, CarError> {
        if !(Self::MIN_DEGREES..=Self::MAX_DEGREES).contains(&degrees) {
            return Err(CarError::OutOfRange {
                field: "direction",
                value: degrees,
                min: Self::MIN_DEGREES,
                max: Self::MAX_DEGREES,
            });
        }
        Ok(Self(degrees))
    }

    /// Steering angle in degrees
    pub fn degrees(&self) -> i32 {
        self.0
    }

    /// True when the wheels point straight ahead
    pub fn is_straight(&self) -> bool {
        self.0 == 0
    }

    /// Direction as a percentage of the lock on its side
    pub fn as_percentage(&self) -> i32 {
        if self.0 < 0 {
            (-100 * self.0) / Self::MIN_DEGREES
        } else {
            (100 * self.0) / Self::MAX_DEGREES
        }
    }

    /// Turn the wheel left by `step` degrees, clamped at full lock
    pub fn steer_left(self, step: i32) -> Direction {
        Direction(self.0.saturating_sub(step).max(Self::MIN_DEGREES))
    }

    /// Turn the wheel right by `step` degrees, clamped at full lock
    pub fn steer_right(self, step: i32) -> Direction {
        Direction(self.0.saturating_add(step).min(Self::MAX_DEGREES))
    }
}

impl TryFrom<i32> for Direction {
    type Error = CarError;

    fn try_from(degrees: i32) -> Result<Self, Self::Error> {
        Direction::new(degrees)
    }
}

impl From<Direction> for i32 {
    fn from(direction: Direction) -> Self {
        direction.0
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_speed_bounds() {
        assert!(Speed::new(-100).is_ok());
        assert!(Speed::new(100).is_ok());
        assert_eq!(
            Speed::new(101),
            Err(CarError::OutOfRange {
                field: "speed",
                value: 101,
                min: -100,
                max: 100
            })
        );
        assert!(Speed::new(-101).is_err());
    }

    #[test]
    fn test_speed_dead_zone_from_standstill() {
        assert_eq!(Speed::ZERO.increase(3, 10).value(), 10);
        assert_eq!(Speed::ZERO.decrease(3, 10).value(), -10);
    }

    #[test]
    fn test_speed_dead_zone_toward_neutral() {
        let speed = Speed::new(12).unwrap();
        assert_eq!(speed.decrease(3, 10).value(), 0);

        let reversing = Speed::new(-10).unwrap();
        assert_eq!(reversing.increase(3, 10).value(), 0);
    }

    #[test]
    fn test_speed_step_outside_dead_zone() {
        let speed = Speed::new(40).unwrap();
        assert_eq!(speed.increase(3, 10).value(), 43);
        assert_eq!(speed.decrease(3, 10).value(), 37);
    }

    #[test]
    fn test_speed_clamped_at_bounds() {
        let max = Speed::new(Speed::MAX).unwrap();
        assert_eq!(max.increase(3, 10), max);
        let almost = Speed::new(98).unwrap();
        assert_eq!(almost.increase(3, 10).value(), 100);
        let min = Speed::new(Speed::MIN).unwrap();
        assert_eq!(min.decrease(3, 10), min);
    }

    #[test]
    fn test_percentages() {
        assert_eq!(Speed::new(-50).unwrap().as_percentage(), 50);
        assert_eq!(Speed::new(25).unwrap().as_percentage(), 25);
        assert_eq!(Direction::new(-30).unwrap().as_percentage(), 50);
        assert_eq!(Direction::new(60).unwrap().as_percentage(), 100);
        assert_eq!(Direction::STRAIGHT.as_percentage(), 0);
    }

    #[test]
    fn test_direction_clamped_and_idempotent() {
        let right = Direction::new(60).unwrap();
        assert_eq!(right.steer_right(10), right);
        let left = Direction::new(-55).unwrap();
        assert_eq!(left.steer_left(10).degrees(), -60);
        assert_eq!(Direction::STRAIGHT.steer_left(10).degrees(), -10);
    }

    #[test]
    fn test_serde_rejects_out_of_range() {
        assert!(serde_json::from_str::<Speed>("150").is_err());
        let direction: Direction = serde_json::from_str("-20").unwrap();
        assert_eq!(direction.degrees(), -20);
        assert_eq!(serde_json::to_string(&Speed::new(7).unwrap()).unwrap(), "7");
    }

    proptest! {
        #[test]
        fn prop_speed_constructs_in_range(value in -100i32..=100) {
            prop_assert_eq!(Speed::new(value).unwrap().value(), value);
        }

        #[test]
        fn prop_speed_rejects_out_of_range(value in prop_oneof![i32::MIN..-100, 101..i32::MAX]) {
            prop_assert!(Speed::new(value).is_err());
        }

        #[test]
        fn prop_speed_step_never_lands_in_dead_zone(
            value in -100i32..=100,
            step in 1i32..=20,
            dead_zone in 1i32..=30,
            up in any::<bool>(),
        ) {
            let speed = Speed::new(value).unwrap();
            let next = if up { speed.increase(step, dead_zone) } else { speed.decrease(step, dead_zone) };
            let magnitude = next.value().abs();
            prop_assert!(magnitude == 0 || magnitude >= dead_zone.min(Speed::MAX));
            prop_assert!((Speed::MIN..=Speed::MAX).contains(&next.value()));
        }

        #[test]
        fn prop_direction_steps_stay_in_range(degrees in -60i32..=60, step in 0i32..=120) {
            let direction = Direction::new(degrees).unwrap();
            let left = direction.steer_left(step).degrees();
            let right = direction.steer_right(step).degrees();
            prop_assert!((Direction::MIN_DEGREES..=Direction::MAX_DEGREES).contains(&left));
            prop_assert!((Direction::MIN_DEGREES..=Direction::MAX_DEGREES).contains(&right));
        }
    }
}
