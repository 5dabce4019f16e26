use serde::Deserialize;
use splice_core::types::{ProbeResult, Resolution, TimeUs};
use std::path::Path;
use std::process::Stdio;

use crate::error::{ProbeError, Result};

// ---------------------------------------------------------------------------
// ffprobe JSON output structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    channels: Option<u32>,
    sample_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    bit_rate: Option<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run ffprobe on a media file and parse the result into a `ProbeResult`.
pub async fn probe_file(path: impl AsRef<Path>) -> Result<ProbeResult> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ProbeError::FileNotFound(path.to_path_buf()));
    }

    let output = tokio::process::Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| ProbeError::FfprobeExec(e.to_string()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ProbeError::FfprobeFailed(stderr.into_owned()));
    }

    let probe: FfprobeOutput = serde_json::from_slice(&output.stdout)?;
    Ok(parse_probe_output(&probe))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn parse_probe_output(probe: &FfprobeOutput) -> ProbeResult {
    let video_stream = probe.streams.iter().find(|s| s.codec_type == "video");
    let audio_stream = probe.streams.iter().find(|s| s.codec_type == "audio");

    let duration_us = probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .map(TimeUs::from_seconds)
        .unwrap_or(TimeUs::ZERO);

    let resolution = video_stream
        .and_then(|s| Some(Resolution::new(s.width?, s.height?)))
        .filter(|r| r.width > 0 && r.height > 0);

    let frame_rate = video_stream
        .and_then(|s| s.r_frame_rate.as_deref())
        .and_then(parse_frame_rate);

    let codec = video_stream
        .and_then(|s| s.codec_name.clone())
        .or_else(|| audio_stream.and_then(|s| s.codec_name.clone()));

    let bitrate = probe
        .format
        .bit_rate
        .as_deref()
        .and_then(|b| b.parse::<u64>().ok());

    let channels = audio_stream.and_then(|s| s.channels);

    let sample_rate = audio_stream
        .and_then(|s| s.sample_rate.as_deref())
        .and_then(|r| r.parse::<u32>().ok());

    ProbeResult {
        duration_us,
        resolution,
        frame_rate,
        codec,
        bitrate,
        channels,
        sample_rate,
        thumbnail: None,
        waveform: None,
    }
}

/// Parse ffprobe frame rate string like "30000/1001" or "30/1" into f64.
fn parse_frame_rate(rate: &str) -> Option<f64> {
    if let Some((num, den)) = rate.split_once('/') {
        let n: f64 = num.parse().ok()?;
        let d: f64 = den.parse().ok()?;
        if d == 0.0 {
            return None;
        }
        Some(n / d)
    } else {
        rate.parse().ok()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
