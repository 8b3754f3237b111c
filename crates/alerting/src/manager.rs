//! Alert Manager Implementation

use dms::{DmsAlert, DrowsinessReading};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, info, warn};

const HOUR: Duration = Duration::from_secs(3600);

/// Alert configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Minimum time between repeated alarms within one episode (seconds)
    pub cooldown_seconds: u64,
    /// Maximum alarms per hour before throttling
    pub max_alerts_per_hour: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cooldown_seconds: 5,
            max_alerts_per_hour: 120,
        }
    }
}

/// State of an alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertState {
    /// Session time this alert last fired
    pub last_fired: Duration,
    /// Number of times fired
    pub fire_count: usize,
    /// Whether alert is acknowledged
    pub acknowledged: bool,
}

/// Alert manager for deduplication and throttling.
///
/// Time comes from the caller on the same session clock the monitor uses.
pub struct AlertManager {
    /// Configuration
    config: AlertConfig,
    /// Alert states by kind
    states: HashMap<DmsAlert, AlertState>,
    /// Alerts active in the previous reading
    active: HashSet<DmsAlert>,
    /// Alerts fired in current hour
    hourly_count: usize,
    /// Hour start time
    hour_start: Option<Duration>,
}

impl AlertManager {
    /// Create a new alert manager
    pub fn new(config: AlertConfig) -> Self {
        info!("Creating alert manager with config: {:?}", config);
        Self {
            config,
            states: HashMap::new(),
            active: HashSet::new(),
            hourly_count: 0,
            hour_start: None,
        }
    }

    /// Feed one reading; returns the alert to sound, if any.
    ///
    /// An alert fires when it first becomes active, then repeats every
    /// cooldown period for as long as it stays active.
    pub fn on_reading(&mut self, reading: &DrowsinessReading) -> Option<DmsAlert> {
        let now = reading.timestamp;
        let current: HashSet<DmsAlert> = reading.alerts().into_iter().collect();

        let mut fired = None;
        for &alert in &current {
            let rising = !self.active.contains(&alert);
            if fired.is_none() && self.check(alert, now, rising) {
                self.record_fire(alert, now);
                fired = Some(alert);
            }
        }

        // Absent frames and frames missing a required indicator neither end
        // nor start the active alert
        if !reading.is_inconclusive() {
            self.active = current;
        }
        fired
    }

    /// Check if an alert should be fired based on throttling and cooldown
    pub fn should_fire(&mut self, alert: DmsAlert, now: Duration) -> bool {
        self.check(alert, now, false)
    }

    fn check(&mut self, alert: DmsAlert, now: Duration, rising: bool) -> bool {
        // Reset hourly counter if needed
        let hour_start = *self.hour_start.get_or_insert(now);
        if now.saturating_sub(hour_start) > HOUR {
            self.hourly_count = 0;
            self.hour_start = Some(now);
        }

        // Check hourly throttle
        if self.hourly_count >= self.config.max_alerts_per_hour {
            warn!("Alert throttled: max alerts per hour reached");
            return false;
        }

        if rising {
            return true;
        }

        // Check cooldown
        if let Some(state) = self.states.get(&alert) {
            let cooldown = Duration::from_secs(self.config.cooldown_seconds);
            if now.saturating_sub(state.last_fired) < cooldown {
                debug!("Alert suppressed: in cooldown period");
                return false;
            }
        }

        true
    }

    /// Record that an alert was fired
    pub fn record_fire(&mut self, alert: DmsAlert, now: Duration) {
        self.hourly_count += 1;

        let state = self.states.entry(alert).or_insert(AlertState {
            last_fired: now,
            fire_count: 0,
            acknowledged: false,
        });

        state.last_fired = now;
        state.fire_count += 1;
        state.acknowledged = false;

        info!("Alert recorded: {} (count: {})", alert.as_str(), state.fire_count);
    }

    /// Acknowledge an alert
    pub fn acknowledge(&mut self, alert: DmsAlert) -> bool {
        if let Some(state) = self.states.get_mut(&alert) {
            state.acknowledged = true;
            info!("Alert acknowledged: {}", alert.as_str());
            true
        } else {
            false
        }
    }

    /// Get pending (unacknowledged) alerts
    pub fn pending(&self) -> Vec<(DmsAlert, &AlertState)> {
        self.states
            .iter()
            .filter(|(_, state)| !state.acknowledged)
            .map(|(k, v)| (*k, v))
            .collect()
    }

    pub fn state(&self, alert: DmsAlert) -> Option<&AlertState> {
        self.states.get(&alert)
    }

    /// Get hourly alert count
    pub fn hourly_count(&self) -> usize {
        self.hourly_count
    }

    /// Clear all alert states
    pub fn clear(&mut self) {
        self.states.clear();
        self.active.clear();
        self.hourly_count = 0;
        self.hour_start = None;
    }
}

impl Default for AlertManager {
    fn default() -> Self {
        Self::new(AlertConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dms::Indicator;

    fn reading(ms: u64, is_drowsy: bool) -> DrowsinessReading {
        DrowsinessReading {
            timestamp: Duration::from_millis(ms),
            observed: true,
            is_drowsy,
            ..Default::default()
        }
    }

    #[test]
    fn test_fires_on_rising_edge() {
        let mut manager = AlertManager::default();
        assert_eq!(manager.on_reading(&reading(0, false)), None);
        assert_eq!(manager.on_reading(&reading(100, true)), Some(DmsAlert::Drowsiness));
        assert_eq!(manager.hourly_count(), 1);
    }

    #[test]
    fn test_repeats_after_cooldown() {
        let config = AlertConfig {
            cooldown_seconds: 2,
            ..Default::default()
        };
        let mut manager = AlertManager::new(config);

        assert!(manager.on_reading(&reading(1000, true)).is_some());
        assert!(manager.on_reading(&reading(2000, true)).is_none());
        assert!(manager.on_reading(&reading(2900, true)).is_none());
        assert!(manager.on_reading(&reading(3000, true)).is_some());

        let state = manager.state(DmsAlert::Drowsiness).unwrap();
        assert_eq!(state.fire_count, 2);
        assert_eq!(state.last_fired, Duration::from_millis(3000));
    }

    #[test]
    fn test_new_episode_bypasses_cooldown() {
        let mut manager = AlertManager::default();
        assert!(manager.on_reading(&reading(0, true)).is_some());
        assert!(manager.on_reading(&reading(500, false)).is_none());
        assert!(manager.on_reading(&reading(1600, true)).is_some());
    }

    #[test]
    fn test_absent_frame_keeps_alert_active() {
        let mut manager = AlertManager::default();
        assert!(manager.on_reading(&reading(0, true)).is_some());

        let absent = DrowsinessReading {
            timestamp: Duration::from_millis(100),
            ..Default::default()
        };
        assert!(manager.on_reading(&absent).is_none());

        // Still the same episode, so cooldown applies
        assert!(manager.on_reading(&reading(200, true)).is_none());
    }

    #[test]
    fn test_degraded_frame_keeps_alert_active() {
        let mut manager = AlertManager::default();
        assert!(manager.on_reading(&reading(1200, true)).is_some());

        let degraded = DrowsinessReading {
            unavailable: vec![Indicator::EyeAspectRatio],
            ..reading(1300, false)
        };
        assert!(manager.on_reading(&degraded).is_none());

        // Same episode, still inside the cooldown
        assert!(manager.on_reading(&reading(1400, true)).is_none());
        assert_eq!(manager.state(DmsAlert::Drowsiness).unwrap().fire_count, 1);
    }

    #[test]
    fn test_missing_mouth_can_end_alert() {
        let mut manager = AlertManager::default();
        assert!(manager.on_reading(&reading(0, true)).is_some());

        let clear = DrowsinessReading {
            unavailable: vec![Indicator::MouthAspectRatio],
            ..reading(100, false)
        };
        assert!(manager.on_reading(&clear).is_none());
        assert!(manager.on_reading(&reading(200, true)).is_some());
    }

    #[test]
    fn test_hourly_throttle() {
        let config = AlertConfig {
            cooldown_seconds: 0,
            max_alerts_per_hour: 3,
        };
        let mut manager = AlertManager::new(config);

        let fired = (0..10u64)
            .filter(|&i| manager.on_reading(&reading(i * 1000, true)).is_some())
            .count();
        assert_eq!(fired, 3);

        // Window rolls over
        assert!(manager.on_reading(&reading(3_700_000, true)).is_some());
    }

    #[test]
    fn test_should_fire_respects_cooldown() {
        let mut manager = AlertManager::default();
        let now = Duration::from_secs(10);
        assert!(manager.should_fire(DmsAlert::Drowsiness, now));
        manager.record_fire(DmsAlert::Drowsiness, now);
        assert!(!manager.should_fire(DmsAlert::Drowsiness, now + Duration::from_secs(1)));
        assert!(manager.should_fire(DmsAlert::Drowsiness, now + Duration::from_secs(5)));
    }

    #[test]
    fn test_acknowledgement() {
        let mut manager = AlertManager::default();
        assert!(!manager.acknowledge(DmsAlert::Drowsiness));

        manager.record_fire(DmsAlert::Drowsiness, Duration::ZERO);
        assert_eq!(manager.pending().len(), 1);

        assert!(manager.acknowledge(DmsAlert::Drowsiness));
        assert!(manager.pending().is_empty());

        manager.clear();
        assert!(manager.state(DmsAlert::Drowsiness).is_none());
        assert_eq!(manager.hourly_count(), 0);
    }

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let config: AlertConfig = serde_json::from_str(r#"{"cooldown_seconds": 9}"#).unwrap();
        assert_eq!(config.cooldown_seconds, 9);
        assert_eq!(config.max_alerts_per_hour, 120);
    }
}
