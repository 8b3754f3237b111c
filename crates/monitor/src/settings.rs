//! Layered runner settings: defaults, optional file, then environment

use alerting::AlertConfig;
use config::{Config, Environment, File};
use dms::DrowsinessConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment prefix, e.g. `DMS__DROWSINESS__EAR_THRESHOLD=0.22`
pub const ENV_PREFIX: &str = "DMS";

/// Log output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Everything the replay runner needs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    pub drowsiness: DrowsinessConfig,
    pub alerting: AlertConfig,
    pub logging: LogSettings,
}

impl MonitorSettings {
    /// Load settings from an optional file and `DMS__*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    pub fn load_with_prefix(path: Option<&Path>, prefix: &str) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder
            .add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
