//! Driver Monitoring System (DMS)
//!
//! Drowsiness detection from facial landmarks:
//! - Eye and mouth aspect ratios
//! - Head tilt and elevation
//! - Debounced drowsy episode tracking
//!
//! Face and landmark detection happen upstream; this crate starts from
//! landmark coordinates and does no I/O.

pub mod analysis;
pub mod config;
pub mod error;
pub mod geometry;
pub mod landmarks;
pub mod state;

pub use analysis::{DmsAlert, DrowsinessReading, FrameRecord, Indicator, IndicatorSample};
pub use config::DrowsinessConfig;
pub use error::{DmsError, GeometryError, Region, ShapeError};
pub use geometry::{FrameIndicators, HeadPose};
pub use landmarks::{LandmarkSet, Point2D, RawLandmarks};
pub use state::{DrowsinessState, EpisodePhase};

use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Identifies one monitored driver session in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Drowsiness monitor for a single driver session.
///
/// Frames must arrive in non-decreasing timestamp order. Each session owns
/// its own monitor; nothing is shared between sessions.
pub struct DrowsinessMonitor {
    config: DrowsinessConfig,
    drowsy_time: Duration,
    state: DrowsinessState,
    session_id: SessionId,
    last_timestamp: Option<Duration>,
    /// Alert flag of the last observed frame
    alerting: bool,
}

impl DrowsinessMonitor {
    /// Create a new monitor with configuration
    pub fn new(config: DrowsinessConfig) -> Result<Self, DmsError> {
        config.validate()?;
        let drowsy_time = config.drowsy_duration()?;
        let session_id = SessionId::new();

        info!(
            %session_id,
            ear_threshold = config.ear_threshold,
            head_tilt_threshold = config.head_tilt_threshold,
            drowsy_time = config.drowsy_time,
            "Drowsiness monitor started"
        );

        Ok(Self {
            config,
            drowsy_time,
            state: DrowsinessState::default(),
            session_id,
            last_timestamp: None,
            alerting: false,
        })
    }

    /// Analyze a single frame's landmarks.
    ///
    /// `None` means the detector found no face: the reading is all zeros and
    /// the episode is left exactly as it was.
    pub fn observe(
        &mut self,
        landmarks: Option<&LandmarkSet>,
        now: Duration,
    ) -> Result<DrowsinessReading, DmsError> {
        self.check_order(now)?;

        let Some(landmarks) = landmarks else {
            debug!(session_id = %self.session_id, ?now, "No landmarks for frame");
            return Ok(DrowsinessReading {
                timestamp: now,
                phase: self.reported_phase(now, false),
                frame_counter: self.state.frame_counter(),
                ..Default::default()
            });
        };

        let indicators = FrameIndicators::measure(landmarks);
        let mut unavailable = Vec::new();
        let ear = self.available(indicators.ear, Indicator::EyeAspectRatio, &mut unavailable);
        let mar = self.available(indicators.mar, Indicator::MouthAspectRatio, &mut unavailable);
        let pose = self.available(indicators.pose, Indicator::HeadPose, &mut unavailable);

        let sample = IndicatorSample {
            ear: ear.unwrap_or(0.0),
            mar: mar.unwrap_or(0.0),
            head_tilt: pose.map_or(0.0, |p| p.tilt_degrees),
            head_elevation: pose.map_or(0.0, |p| p.elevation),
        };

        let had_episode = self.state.episode_start().is_some();
        let is_drowsy = if ear.is_none() && pose.is_none() {
            // Nothing to judge the trigger on; hold the episode as for a missing frame
            false
        } else {
            let eyes_closing = ear.map_or(false, |ear| ear < self.config.ear_threshold);
            let head_dropped =
                pose.map_or(false, |p| p.tilt_degrees.abs() > self.config.head_tilt_threshold);
            let drowsy = self
                .state
                .update(eyes_closing || head_dropped, now, self.drowsy_time);
            drowsy && ear.is_some() && pose.is_some()
        };

        if is_drowsy && !self.alerting {
            warn!(
                session_id = %self.session_id,
                ear = sample.ear,
                head_tilt = sample.head_tilt,
                frames = self.state.frame_counter(),
                "Drowsiness alert raised"
            );
        } else if had_episode && self.state.episode_start().is_none() {
            debug!(session_id = %self.session_id, ?now, "Drowsy episode ended");
        }
        // A frame missing a required indicator holds the flag while the episode lasts
        self.alerting = if ear.is_some() && pose.is_some() {
            is_drowsy
        } else {
            self.alerting && self.state.episode_start().is_some()
        };

        Ok(DrowsinessReading {
            timestamp: now,
            observed: true,
            is_drowsy,
            sample,
            unavailable,
            phase: self.reported_phase(now, is_drowsy),
            frame_counter: self.state.frame_counter(),
        })
    }

    /// Shape-check raw detector output, then [`observe`](Self::observe) it.
    ///
    /// A malformed set is returned as [`DmsError::Shape`] and does not touch
    /// the session state.
    pub fn observe_raw(
        &mut self,
        landmarks: Option<&RawLandmarks>,
        now: Duration,
    ) -> Result<DrowsinessReading, DmsError> {
        let landmarks = landmarks.map(LandmarkSet::from_raw).transpose()?;
        self.observe(landmarks.as_ref(), now)
    }

    /// Reset driver state (on driver change)
    pub fn reset_state(&mut self) {
        info!(session_id = %self.session_id, "Drowsiness state reset");
        self.state.reset();
        self.last_timestamp = None;
        self.alerting = false;
    }

    pub fn config(&self) -> &DrowsinessConfig {
        &self.config
    }

    pub fn state(&self) -> &DrowsinessState {
        &self.state
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Episode phase as of the last accepted frame
    pub fn phase(&self) -> EpisodePhase {
        match self.last_timestamp {
            Some(now) => self.state.phase(now, self.drowsy_time),
            None => EpisodePhase::Idle,
        }
    }

    /// Phase as seen by this frame. A held or suppressed frame never reads
    /// as `Alerting`, so the phase always agrees with `is_drowsy`.
    fn reported_phase(&self, now: Duration, is_drowsy: bool) -> EpisodePhase {
        match self.state.phase(now, self.drowsy_time) {
            EpisodePhase::Alerting if !is_drowsy => EpisodePhase::Triggering,
            phase => phase,
        }
    }

    fn check_order(&mut self, now: Duration) -> Result<(), DmsError> {
        if let Some(last) = self.last_timestamp {
            if now < last {
                warn!(session_id = %self.session_id, ?last, ?now, "Out-of-order frame rejected");
                return Err(DmsError::NonMonotonicTimestamp { last, now });
            }
        }
        self.last_timestamp = Some(now);
        Ok(())
    }

    fn available<T>(
        &self,
        value: Result<T, GeometryError>,
        indicator: Indicator,
        unavailable: &mut Vec<Indicator>,
    ) -> Option<T> {
        match value {
            Ok(v) => Some(v),
            Err(e) => {
                debug!(session_id = %self.session_id, ?indicator, error = %e, "Indicator unavailable");
                unavailable.push(indicator);
                None
            }
        }
    }
}
