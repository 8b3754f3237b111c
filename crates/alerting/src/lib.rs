//! Alerting System
//!
//! Turns per-frame drowsiness readings into discrete alarm firings with
//! cooldown and hourly throttling.

mod manager;

pub use manager::{AlertManager, AlertConfig, AlertState};
