use std::path::Path;
use std::process::Stdio;

use crate::error::{ProbeError, Result};

/// Sample rate the audio is resampled to before peaks are taken.
pub const WAVEFORM_SAMPLE_RATE: u32 = 8000;

/// Decode the audio of a media file to mono PCM with ffmpeg and reduce it to
/// one peak per `samples_per_peak` samples, each in `[0, 1]`.
pub async fn extract_waveform(source_path: &Path, samples_per_peak: u32) -> Result<Vec<f32>> {
    let output = tokio::process::Command::new("ffmpeg")
        .arg("-i")
        .arg(source_path)
        .args([
            "-f",
            "s16le",
            "-ac",
            "1",
            "-ar",
            &WAVEFORM_SAMPLE_RATE.to_string(),
            "-acodec",
            "pcm_s16le",
            "-",
        ])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProbeError::FfmpegNotFound
            } else {
                ProbeError::Io(e)
            }
        })?;

    if !output.status.success() {
        return Err(ProbeError::FfmpegFailed(
            "waveform extraction failed".into(),
        ));
    }

    let samples: Vec<i16> = output
        .stdout
        .chunks_exact(2)
        .map(|chunk| i16::from_le_bytes([chunk[0], chunk[1]]))
        .collect();

    Ok(compute_peaks(&samples, samples_per_peak))
}

fn compute_peaks(samples: &[i16], samples_per_peak: u32) -> Vec<f32> {
    let window = samples_per_peak.max(1) as usize;
    samples
        .chunks(window)
        .map(|chunk| {
            let peak = chunk.iter().map(|s| s.unsigned_abs()).max().unwrap_or(0);
            (peak as f32 / 32768.0).min(1.0)
        })
        .collect()
}
