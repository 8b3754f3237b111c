//! DMS error types

use std::time::Duration;
use thiserror::Error;

/// Landmark region names, used in error reports and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    LeftEye,
    RightEye,
    Mouth,
    Nose,
    LeftEar,
    RightEar,
}

impl Region {
    /// Key used by the landmark detector for this region
    pub fn key(&self) -> &'static str {
        match self {
            Region::LeftEye => "left_eye",
            Region::RightEye => "right_eye",
            Region::Mouth => "mouth",
            Region::Nose => "nose",
            Region::LeftEar => "left_ear",
            Region::RightEar => "right_ear",
        }
    }

    /// Number of points the region must carry
    pub fn arity(&self) -> usize {
        match self {
            Region::LeftEye | Region::RightEye => 6,
            Region::Mouth => 8,
            Region::Nose | Region::LeftEar | Region::RightEar => 1,
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Numeric failure while deriving a single indicator
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    /// Horizontal reference distance is zero (coincident points)
    #[error("{measure}: horizontal reference span is zero")]
    DegenerateSpan { measure: &'static str },

    /// NaN or infinite coordinate, or a non-finite result
    #[error("{measure}: non-finite value")]
    NonFinite { measure: &'static str },
}

/// Upstream detector handed over a point sequence of the wrong length
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("{region} has {actual} points, expected {expected}")]
    Arity {
        region: Region,
        expected: usize,
        actual: usize,
    },
}

/// DMS error types
#[derive(Error, Debug)]
pub enum DmsError {
    #[error("Malformed landmark set: {0}")]
    Shape(#[from] ShapeError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Frame at {now:?} is older than the last accepted frame at {last:?}")]
    NonMonotonicTimestamp { last: Duration, now: Duration },
}
