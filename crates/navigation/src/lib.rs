//! Navigation
//!
//! Turns lane-boundary line segments detected in a camera frame into a
//! steering heading:
//! - Line segment geometry and slope filtering
//! - Scan-line steering algorithm
//! - Heading sources (vision driven or scripted) published on a feed

pub mod config;
pub mod directions;
pub mod segment;
pub mod source;
pub mod steering;

pub use config::SteeringConfig;
pub use directions::{NavigationDirections, NavigationFeed};
pub use segment::{filter_by_slope, LineSegment};
pub use source::{FixedPathSource, LineNavigationSource};
pub use steering::LineNavigator;

use thiserror::Error;

/// Navigation error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NavigationError {
    #[error("Invalid steering configuration: {0}")]
    Config(String),

    #[error("Fixed path has no headings")]
    EmptyPath,

    #[error("Fixed path interval must be non-zero")]
    ZeroInterval,
}
