//! Drowsiness episode tracking

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where the current episode stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EpisodePhase {
    /// No triggering streak in progress
    #[default]
    Idle,
    /// Streak in progress, not yet long enough to alert
    Triggering,
    /// Streak has outlasted the drowsy time
    Alerting,
}

/// Driver state (tracked over time)
///
/// An episode is an unbroken run of triggering frames. One non-triggering
/// frame ends it; there is no grace period.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrowsinessState {
    /// Consecutive frames satisfying the trigger condition
    frame_counter: u64,

    /// When the current streak began
    episode_start: Option<Duration>,
}

impl DrowsinessState {
    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    pub fn episode_start(&self) -> Option<Duration> {
        self.episode_start
    }

    /// Advance by one observed frame and report whether the episode has
    /// lasted strictly longer than `drowsy_time`
    pub fn update(&mut self, triggered: bool, now: Duration, drowsy_time: Duration) -> bool {
        if triggered {
            self.frame_counter += 1;
            self.episode_start.get_or_insert(now);
        } else {
            self.frame_counter = 0;
            self.episode_start = None;
        }
        self.is_drowsy(now, drowsy_time)
    }

    pub fn is_drowsy(&self, now: Duration, drowsy_time: Duration) -> bool {
        self.episode_start
            .and_then(|start| now.checked_sub(start))
            .map_or(false, |elapsed| elapsed > drowsy_time)
    }

    pub fn phase(&self, now: Duration, drowsy_time: Duration) -> EpisodePhase {
        match self.episode_start {
            None => EpisodePhase::Idle,
            Some(_) if self.is_drowsy(now, drowsy_time) => EpisodePhase::Alerting,
            Some(_) => EpisodePhase::Triggering,
        }
    }

    /// Reset state (on driver change)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
