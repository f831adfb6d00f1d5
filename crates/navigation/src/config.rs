//! Steering algorithm configuration

use serde::{Deserialize, Serialize};

use crate::NavigationError;

/// Smallest row distance; keeps the scan within `frame_height` rows
pub const MIN_SCAN_STEP: f64 = 1.0;

/// Steering algorithm configuration.
///
/// Coordinates are image pixels with the origin in the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// Frame width (pixels)
    pub frame_width: f64,

    /// Frame height (pixels); the car's reference point sits on this row
    pub frame_height: f64,

    /// First scanned row, near the bottom of the frame
    pub scan_start_y: f64,

    /// Distance between scanned rows (pixels)
    pub scan_step: f64,

    /// Vertical tolerance when matching a segment to a row (pixels)
    pub line_fuzz: f64,

    /// History length from which only the recent half is averaged
    pub recent_history_threshold: usize,

    /// Clamp headings to the steering range
    pub clamp_heading: bool,

    /// Largest heading magnitude when clamping (degrees)
    pub max_heading: i32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            frame_width: 640.0,
            frame_height: 480.0,
            scan_start_y: 360.0,
            scan_step: 4.0,
            line_fuzz: 6.0,
            recent_history_threshold: 5,
            clamp_heading: true,
            max_heading: 60,
        }
    }
}

impl SteeringConfig {
    /// Scale the default scan geometry to another frame size
    pub fn for_frame(width: f64, height: f64) -> Self {
        let defaults = Self::default();
        Self {
            frame_width: width,
            frame_height: height,
            scan_start_y: height * defaults.scan_start_y / defaults.frame_height,
            ..defaults
        }
    }

    /// Horizontal center of the frame
    pub fn mid_x(&self) -> f64 {
        self.frame_width / 2.0
    }

    /// Reject geometry the scan loop cannot work with
    pub fn validate(&self) -> Result<(), NavigationError> {
        let finite = self.frame_width.is_finite() && self.frame_height.is_finite();
        if !(finite && self.frame_width > 0.0 && self.frame_height > 0.0) {
            return Err(NavigationError::Config(format!(
                "frame size must be positive and finite, got {}x{}",
                self.frame_width, self.frame_height
            )));
        }
        if !(self.scan_step >= MIN_SCAN_STEP) {
            return Err(NavigationError::Config(format!(
                "scan_step must be at least {} pixel, got {}",
                MIN_SCAN_STEP, self.scan_step
            )));
        }
        if !(self.scan_start_y >= 0.0 && self.scan_start_y <= self.frame_height) {
            return Err(NavigationError::Config(format!(
                "scan_start_y must lie within [0, {}], got {}",
                self.frame_height, self.scan_start_y
            )));
        }
        if self.line_fuzz < 0.0 {
            return Err(NavigationError::Config(format!(
                "line_fuzz must not be negative, got {}",
                self.line_fuzz
            )));
        }
        if self.recent_history_threshold == 0 {
            return Err(NavigationError::Config(
                "recent_history_threshold must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SteeringConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_step_rejected() {
        let config = SteeringConfig {
            scan_step: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_step_too_small_to_move_rejected() {
        let config = SteeringConfig {
            scan_step: 1e-20,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_scan_start_outside_frame_rejected() {
        let below = SteeringConfig {
            scan_start_y: 481.0,
            ..Default::default()
        };
        let above = SteeringConfig {
            scan_start_y: -1.0,
            ..Default::default()
        };
        assert!(below.validate().is_err());
        assert!(above.validate().is_err());
    }

    #[test]
    fn test_nan_geometry_rejected() {
        let config = SteeringConfig {
            scan_step: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_for_frame_scales_scan_start() {
        let config = SteeringConfig::for_frame(320.0, 240.0);
        assert_eq!(config.scan_start_y, 180.0);
        assert_eq!(config.mid_x(), 160.0);
    }
}
