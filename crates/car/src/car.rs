//! The car actuator

use tracing::{debug, info, warn};

use crate::config::CarConfig;
use crate::engine::CarEngine;
use crate::status::CarStatus;
use crate::value::{Direction, Speed};

/// The single mutable actuator.
///
/// Owns the committed speed and direction and forwards every committed value
/// to its engine. Unsafe requests never fail; they degrade to a stop.
pub struct Car {
    engine: Box<dyn CarEngine>,
    config: CarConfig,
    speed: Speed,
    direction: Direction,
}

impl Car {
    /// Create a car and push the neutral state to the engine
    pub fn new(engine: Box<dyn CarEngine>, config: CarConfig) -> Self {
        info!("Creating car with config: {:?}", config);
        let mut car = Self {
            engine,
            config,
            speed: Speed::ZERO,
            direction: Direction::STRAIGHT,
        };
        car.update_engine_speed();
        car.update_engine_direction();
        car
    }

    /// Drive to an absolute target; `None` keeps the current direction.
    ///
    /// A neutral target stops the car. A target that flips the driving
    /// direction without passing neutral, or turns the wheel further than
    /// `max_direction_change` in one go, is replaced by a stop.
    pub fn drive(&mut self, speed: Speed, direction: Option<Direction>) {
        let direction = direction.unwrap_or(self.direction);

        if speed.is_neutral() && direction.is_straight() {
            self.stop();
            return;
        }

        if !self.allowed_change(speed, direction) {
            warn!(
                "Received speed {} and direction {} that may not be applied with current speed {} and direction {}, stopping the car",
                speed, direction, self.speed, self.direction
            );
            self.stop();
            return;
        }

        self.speed = speed;
        self.direction = direction;
        self.update_engine_speed();
        self.update_engine_direction();
    }

    fn allowed_change(&self, speed: Speed, direction: Direction) -> bool {
        let current = self.speed.value();
        let target = speed.value();
        let same_sign = (target <= 0 && current <= 0) || (target >= 0 && current >= 0);
        let steering_delta = (direction.degrees() - self.direction.degrees()).abs();
        same_sign && steering_delta <= self.config.max_direction_change
    }

    /// Speed up one step; while reversing this slows the car down
    pub fn increase_speed(&mut self) {
        self.speed = self.speed.increase(self.config.speed_step, self.config.dead_zone);
        self.update_engine_speed();
    }

    /// Slow down one step; while reversing this reverses faster
    pub fn decrease_speed(&mut self) {
        self.speed = self.speed.decrease(self.config.speed_step, self.config.dead_zone);
        self.update_engine_speed();
    }

    /// Turn the wheel one step to the left
    pub fn steer_left(&mut self) {
        self.direction = self.direction.steer_left(self.config.steering_step);
        self.update_engine_direction();
    }

    /// Turn the wheel one step to the right
    pub fn steer_right(&mut self) {
        self.direction = self.direction.steer_right(self.config.steering_step);
        self.update_engine_direction();
    }

    /// Stop immediately: zero speed, wheels straight. Always reaches the engine.
    pub fn stop(&mut self) {
        self.speed = Speed::ZERO;
        self.direction = Direction::STRAIGHT;
        self.update_engine_speed();
        self.update_engine_direction();
    }

    /// Snapshot of the committed state
    pub fn status(&self) -> CarStatus {
        CarStatus {
            speed: self.speed,
            direction: self.direction,
        }
    }

    /// Tuning in use
    pub fn config(&self) -> &CarConfig {
        &self.config
    }

    fn update_engine_speed(&mut self) {
        debug!("Updating car engine speed: {}", self.speed);
        self.engine.update_motor(self.speed);
    }

    fn update_engine_direction(&mut self) {
        debug!("Updating car engine steering direction: {}", self.direction);
        self.engine.update_direction(self.direction);
    }
}
