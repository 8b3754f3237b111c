//! DMS configuration

use crate::DmsError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Drowsiness detection thresholds, fixed for the lifetime of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrowsinessConfig {
    /// Average eye aspect ratio below which the eyes count as closing
    pub ear_threshold: f64,

    /// Mouth aspect ratio yawn threshold. Reported alongside readings only;
    /// the episode trigger does not consult it.
    pub mar_threshold: f64,

    /// Absolute head tilt (degrees) above which the head counts as dropped
    pub head_tilt_threshold: f64,

    /// Accepted for compatibility with existing deployments; the episode
    /// timer alone decides when to alert.
    pub consecutive_frames: u32,

    /// Seconds an unbroken episode must last before alerting
    pub drowsy_time: f64,
}

impl Default for DrowsinessConfig {
    fn default() -> Self {
        Self {
            ear_threshold: 0.25,
            mar_threshold: 0.35,
            head_tilt_threshold: 20.0,
            consecutive_frames: 20,
            drowsy_time: 1.0,
        }
    }
}

impl DrowsinessConfig {
    /// Create strict config (quicker to alert)
    pub fn strict() -> Self {
        Self {
            ear_threshold: 0.28,
            head_tilt_threshold: 15.0,
            drowsy_time: 0.5,
            ..Default::default()
        }
    }

    /// Create lenient config (slower to alert)
    pub fn lenient() -> Self {
        Self {
            ear_threshold: 0.21,
            head_tilt_threshold: 30.0,
            drowsy_time: 2.0,
            ..Default::default()
        }
    }

    /// Reject thresholds that would make the decision meaningless
    pub fn validate(&self) -> Result<(), DmsError> {
        let finite_non_negative = [
            ("ear_threshold", self.ear_threshold),
            ("mar_threshold", self.mar_threshold),
            ("head_tilt_threshold", self.head_tilt_threshold),
            ("drowsy_time", self.drowsy_time),
        ];
        for (name, value) in finite_non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(DmsError::Config(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Episode duration that must be exceeded before alerting
    pub fn drowsy_duration(&self) -> Result<Duration, DmsError> {
        Duration::try_from_secs_f64(self.drowsy_time)
            .map_err(|e| DmsError::Config(format!("drowsy_time: {e}")))
    }
}
