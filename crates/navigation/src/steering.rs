//! Scan-line steering
//!
//! Walks horizontal rows from the near field up to the farthest detected
//! segment, tracking the track middle between the innermost left and right
//! boundaries. The heading points from the car's bottom-center reference to
//! the averaged far-field middle.

use tracing::{debug, trace};

use crate::config::SteeringConfig;
use crate::directions::NavigationDirections;
use crate::segment::LineSegment;
use crate::NavigationError;

/// Converts per-frame lane-boundary segments into a heading
#[derive(Debug, Clone)]
pub struct LineNavigator {
    config: SteeringConfig,
}

impl LineNavigator {
    /// Create a navigator, rejecting unusable scan geometry
    pub fn new(config: SteeringConfig) -> Result<Self, NavigationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SteeringConfig {
        &self.config
    }

    /// Compute the heading for one frame's segments.
    ///
    /// The scan never leaves the frame, so the work per frame is bounded by
    /// the scan geometry whatever coordinates the segments carry.
    pub fn navigate(&self, lines: &[LineSegment]) -> NavigationDirections {
        let Some(scan_min_y) = lines
            .iter()
            .map(LineSegment::min_y)
            .filter(|y| y.is_finite())
            .reduce(f64::min)
        else {
            trace!("No segments in frame, keeping straight ahead");
            return NavigationDirections::of(0);
        };

        if scan_min_y >= self.config.frame_height {
            debug!(scan_min_y, "Segments below reference row, keeping straight ahead");
            return NavigationDirections::of(0);
        }
        let scan_min_y = scan_min_y.floor().max(0.0);

        let history = self.scan_middles(lines, scan_min_y);
        let avg_top = history.recent_average();

        let degrees = self.heading(avg_top, scan_min_y);
        trace!(
            rows = history.len() - 1,
            avg_top,
            scan_min_y,
            degrees,
            "Computed heading"
        );
        NavigationDirections::of(degrees)
    }

    /// Middle history: the seeded center followed by one entry per accepted row
    fn scan_middles(&self, lines: &[LineSegment], scan_min_y: f64) -> MiddleHistory {
        let config = &self.config;
        let mut history = MiddleHistory::seeded(config.mid_x());
        let mut avg_middle = config.mid_x();
        let mut found_both_sides = false;

        let mut y = config.scan_start_y;
        while y > scan_min_y {
            let (left, right) = self.innermost_boundaries(lines, y, avg_middle);
            y -= config.scan_step;

            if left.is_none() && right.is_none() {
                continue;
            }
            if left.is_some() && right.is_some() {
                found_both_sides = true;
            } else if found_both_sides {
                // Once both boundaries were seen, one-sided rows are noise
                continue;
            }

            let left = left.unwrap_or(0.0);
            let right = right.unwrap_or(config.frame_width);
            history.push((left + right) / 2.0);

            avg_middle = if history.len() < config.recent_history_threshold {
                history.average()
            } else {
                history.recent_average()
            };
        }

        history
    }

    /// Innermost boundary intersections left and right of `middle` on row `y`
    fn innermost_boundaries(
        &self,
        lines: &[LineSegment],
        y: f64,
        middle: f64,
    ) -> (Option<f64>, Option<f64>) {
        let mut left: Option<f64> = None;
        let mut right: Option<f64> = None;

        for x in lines
            .iter()
            .filter(|line| line.spans_row(y, self.config.line_fuzz))
            .filter_map(|line| line.intersect_row(y))
        {
            if x < middle {
                left = Some(left.map_or(x, |l| l.max(x)));
            } else {
                right = Some(right.map_or(x, |r| r.min(x)));
            }
        }

        (left, right)
    }

    /// Heading from the bottom-center reference to `(target_x, target_y)`
    fn heading(&self, target_x: f64, target_y: f64) -> i32 {
        let dx = self.config.mid_x() - target_x;
        let dy = self.config.frame_height - target_y;
        let degrees = (dy.atan2(dx).to_degrees() - 90.0).round() as i32;

        if self.config.clamp_heading {
            let max = self.config.max_heading.abs();
            degrees.clamp(-max, max)
        } else {
            degrees
        }
    }
}

/// Middle estimates with running sums over the whole history and its back half
struct MiddleHistory {
    values: Vec<f64>,
    total: f64,
    back_start: usize,
    back_total: f64,
}

impl MiddleHistory {
    fn seeded(seed: f64) -> Self {
        Self {
            values: vec![seed],
            total: seed,
            back_start: 0,
            back_total: seed,
        }
    }

    fn push(&mut self, value: f64) {
        self.values.push(value);
        self.total += value;
        self.back_total += value;

        let start = self.values.len() / 2;
        while self.back_start < start {
            self.back_total -= self.values[self.back_start];
            self.back_start += 1;
        }
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn average(&self) -> f64 {
        self.total / self.values.len() as f64
    }

    /// Average of the back half, weighted toward recent rows
    fn recent_average(&self) -> f64 {
        self.back_total / (self.values.len() - self.back_start) as f64
    }
}
