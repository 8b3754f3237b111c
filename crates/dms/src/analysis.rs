//! DMS analysis results and alerts

use crate::state::EpisodePhase;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// DMS alert types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DmsAlert {
    /// Driver has stayed in a drowsy episode past the drowsy time
    Drowsiness,
}

impl DmsAlert {
    pub fn as_str(&self) -> &'static str {
        match self {
            DmsAlert::Drowsiness => "drowsiness",
        }
    }
}

/// Indicator that may fail to compute for a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    EyeAspectRatio,
    MouthAspectRatio,
    /// Head tilt and elevation, computed together
    HeadPose,
}

impl Indicator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Indicator::EyeAspectRatio => "ear",
            Indicator::MouthAspectRatio => "mar",
            Indicator::HeadPose => "head_pose",
        }
    }

    /// Whether the episode trigger depends on this indicator
    pub fn is_required(&self) -> bool {
        matches!(self, Indicator::EyeAspectRatio | Indicator::HeadPose)
    }
}

/// Per-frame fatigue indicators. Unavailable values are reported as 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IndicatorSample {
    /// Mean eye aspect ratio of both eyes
    pub ear: f64,
    /// Mouth aspect ratio
    pub mar: f64,
    /// Head tilt in degrees
    pub head_tilt: f64,
    /// Head elevation in pixels
    pub head_elevation: f64,
}

/// Result of feeding one frame to a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrowsinessReading {
    /// Frame timestamp on the session clock
    pub timestamp: Duration,

    /// False when no landmark set was supplied for the frame
    pub observed: bool,

    /// Debounced alert decision
    pub is_drowsy: bool,

    pub sample: IndicatorSample,

    /// Indicators that could not be computed and were reported as 0.0
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub unavailable: Vec<Indicator>,

    /// Episode phase after this frame
    pub phase: EpisodePhase,

    /// Consecutive triggering frames after this frame
    pub frame_counter: u64,
}

impl DrowsinessReading {
    /// `(is_drowsy, ear, mar, head_tilt, head_elevation)`
    pub fn as_tuple(&self) -> (bool, f64, f64, f64, f64) {
        let s = &self.sample;
        (self.is_drowsy, s.ear, s.mar, s.head_tilt, s.head_elevation)
    }

    /// Whether any indicator fell back to 0.0
    pub fn is_degraded(&self) -> bool {
        !self.unavailable.is_empty()
    }

    /// True when the frame could not judge the driver: no landmarks, or a
    /// required indicator was unavailable
    pub fn is_inconclusive(&self) -> bool {
        !self.observed || self.unavailable.iter().any(Indicator::is_required)
    }

    /// Active alerts
    pub fn alerts(&self) -> Vec<DmsAlert> {
        if self.is_drowsy {
            vec![DmsAlert::Drowsiness]
        } else {
            vec![]
        }
    }

    /// Row for downstream loggers
    pub fn record(&self) -> FrameRecord {
        FrameRecord {
            timestamp: self.timestamp.as_secs_f64(),
            ear: self.sample.ear,
            mar: self.sample.mar,
            head_tilt: self.sample.head_tilt,
            head_elevation: self.sample.head_elevation,
            is_drowsy: self.is_drowsy,
        }
    }
}

/// Flat row: timestamp, EAR, MAR, head tilt, head elevation, alert flag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Seconds on the session clock
    pub timestamp: f64,
    pub ear: f64,
    pub mar: f64,
    pub head_tilt: f64,
    pub head_elevation: f64,
    pub is_drowsy: bool,
}
