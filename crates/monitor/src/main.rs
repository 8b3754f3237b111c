//! Drowsiness Monitor - replay entry point

use anyhow::Context;
use clap::Parser;
use monitor::{init_logging, run, MonitorSettings};
use std::path::PathBuf;
use tracing::info;

/// Replay JSON-lines facial landmark frames through the drowsiness monitor
#[derive(Debug, Parser)]
#[command(name = "drowsiness-replay", version)]
struct Cli {
    /// Settings file (TOML, JSON or YAML); `DMS__*` variables override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write JSON-lines readings [default: stdout]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON-lines landmark frames [default: stdin]
    input: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = MonitorSettings::load(cli.config.as_deref()).context("loading settings")?;
    init_logging(&settings.logging)?;

    info!("=== Drowsiness Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let summary = run(cli.input.as_deref(), cli.output.as_deref(), &settings).await?;
    info!(
        frames = summary.frames,
        observed = summary.observed,
        drowsy_frames = summary.drowsy_frames,
        degraded_frames = summary.degraded_frames,
        alarms = summary.alarms,
        "Done"
    );

    Ok(())
}
