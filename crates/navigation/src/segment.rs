//! Line segment geometry

use serde::{Deserialize, Serialize};

/// Largest slope reported for (near) vertical segments
pub const MAX_SLOPE: f64 = 1_000_000.0;

/// A detected line segment in image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl LineSegment {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Absolute slope, capped at `MAX_SLOPE`
    pub fn slope(&self) -> f64 {
        ((self.y2 - self.y1) / (self.x2 - self.x1).max(0.000_000_1))
            .abs()
            .min(MAX_SLOPE)
    }

    /// Smallest y of both endpoints (the point farthest up the image)
    pub fn min_y(&self) -> f64 {
        self.y1.min(self.y2)
    }

    /// True when the segment's vertical extent, widened by `fuzz`, covers row `y`
    pub fn spans_row(&self, y: f64, fuzz: f64) -> bool {
        let forward = y + fuzz > self.y1 && y - fuzz < self.y2;
        let backward = y + fuzz > self.y2 && y - fuzz < self.y1;
        forward || backward
    }

    /// X where the segment's supporting line crosses row `y`.
    ///
    /// Horizontal segments are parallel to the row and never cross it.
    pub fn intersect_row(&self, y: f64) -> Option<f64> {
        let dy = self.y2 - self.y1;
        if dy.abs() < f64::EPSILON {
            return None;
        }
        let x = self.x1 + (y - self.y1) * (self.x2 - self.x1) / dy;
        x.is_finite().then_some(x)
    }
}

/// Keep segments whose slope lies in `[min_slope, max_slope]`
pub fn filter_by_slope(lines: &[LineSegment], min_slope: f64, max_slope: f64) -> Vec<LineSegment> {
    lines
        .iter()
        .filter(|line| {
            let slope = line.slope();
            slope >= min_slope && slope <= max_slope
        })
        .copied()
        .collect()
}
