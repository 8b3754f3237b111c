//! Drowsiness Monitor Runner
//!
//! Settings loading, logging setup, and JSON-lines landmark replay around
//! the `dms` core.

use std::path::Path;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

pub mod replay;
pub mod settings;

pub use replay::{replay, FrameInput, FrameOutput, ReplaySummary};
pub use settings::{LogSettings, MonitorSettings};

use dms::DmsError;

/// Runner errors
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Monitor error: {0}")]
    Dms(#[from] DmsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: invalid frame JSON: {source}")]
    Decode {
        line: usize,
        source: serde_json::Error,
    },

    #[error("line {line}: invalid timestamp {value}")]
    Timestamp { line: usize, value: f64 },

    #[error("line {line}: {source}")]
    Frame { line: usize, source: DmsError },

    #[error("Encoding error: {0}")]
    Encode(serde_json::Error),
}

/// Initialize logging.
///
/// `RUST_LOG` takes precedence over the configured level. Output goes to
/// stderr so replay rows on stdout stay machine-readable.
pub fn init_logging(settings: &LogSettings) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.as_str()));

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if settings.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    }
}

/// Replay frames from `input` (stdin when `None`) to `output` (stdout when `None`)
pub async fn run(
    input: Option<&Path>,
    output: Option<&Path>,
    settings: &MonitorSettings,
) -> Result<ReplaySummary, MonitorError> {
    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match input {
        Some(path) => {
            info!("Reading frames from {}", path.display());
            Box::new(BufReader::new(tokio::fs::File::open(path).await?))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let mut writer: Box<dyn AsyncWrite + Unpin + Send> = match output {
        Some(path) => {
            info!("Writing readings to {}", path.display());
            Box::new(tokio::fs::File::create(path).await?)
        }
        None => Box::new(tokio::io::stdout()),
    };

    replay(reader, &mut writer, settings).await
}
