//! JSON-lines landmark replay
//!
//! Each input line is one frame: `{"t": <seconds>, "landmarks": {...} | null}`.
//! Each output line is the frame's record plus any alarm that fired.

use crate::{MonitorError, MonitorSettings};
use alerting::AlertManager;
use dms::{DmsAlert, DrowsinessMonitor, DrowsinessReading, FrameRecord, RawLandmarks};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

/// One frame from the landmark detector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameInput {
    /// Seconds on the session clock
    pub t: f64,
    /// Absent or null when no face was found
    #[serde(default)]
    pub landmarks: Option<RawLandmarks>,
}

/// One output row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameOutput {
    #[serde(flatten)]
    pub record: FrameRecord,
    pub observed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm: Option<DmsAlert>,
}

/// Totals for a finished replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub frames: usize,
    pub observed: usize,
    pub drowsy_frames: usize,
    pub degraded_frames: usize,
    pub alarms: usize,
}

impl ReplaySummary {
    fn add(&mut self, reading: &DrowsinessReading, alarm: Option<DmsAlert>) {
        self.frames += 1;
        self.observed += usize::from(reading.observed);
        self.drowsy_frames += usize::from(reading.is_drowsy);
        self.degraded_frames += usize::from(reading.is_degraded());
        self.alarms += usize::from(alarm.is_some());
    }
}

/// Drive one monitoring session over a stream of frames.
///
/// Malformed JSON, bad timestamps and malformed landmark sets abort the
/// replay with the offending line number.
pub async fn replay<R, W>(
    reader: R,
    writer: &mut W,
    settings: &MonitorSettings,
) -> Result<ReplaySummary, MonitorError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut monitor = DrowsinessMonitor::new(settings.drowsiness.clone())?;
    let mut alerts = AlertManager::new(settings.alerting.clone());
    let mut summary = ReplaySummary::default();

    info!(session_id = %monitor.session_id(), "Replay started");

    let mut lines = reader.lines();
    let mut line_no = 0;
    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }

        let input: FrameInput = serde_json::from_str(&line)
            .map_err(|source| MonitorError::Decode { line: line_no, source })?;
        let now = Duration::try_from_secs_f64(input.t).map_err(|_| MonitorError::Timestamp {
            line: line_no,
            value: input.t,
        })?;

        let reading = monitor
            .observe_raw(input.landmarks.as_ref(), now)
            .map_err(|source| MonitorError::Frame { line: line_no, source })?;
        let alarm = alerts.on_reading(&reading);

        counter!("dms_frames_total").increment(1);
        for indicator in &reading.unavailable {
            counter!("dms_indicator_unavailable_total", "indicator" => indicator.as_str())
                .increment(1);
        }
        if let Some(alert) = alarm {
            counter!("dms_alarms_total", "alert" => alert.as_str()).increment(1);
            info!(t = input.t, ear = reading.sample.ear, "Alarm: {}", alert.as_str());
        }
        summary.add(&reading, alarm);

        let output = FrameOutput {
            record: reading.record(),
            observed: reading.observed,
            alarm,
        };
        let mut bytes = serde_json::to_vec(&output).map_err(MonitorError::Encode)?;
        bytes.push(b'\n');
        writer.write_all(&bytes).await?;
        debug!(line = line_no, drowsy = reading.is_drowsy, "Frame processed");
    }

    writer.flush().await?;
    info!(
        frames = summary.frames,
        drowsy_frames = summary.drowsy_frames,
        alarms = summary.alarms,
        "Replay finished"
    );
    Ok(summary)
}
