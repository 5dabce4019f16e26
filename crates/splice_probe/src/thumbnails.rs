use base64::Engine;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use uuid::Uuid;

use crate::error::{ProbeError, Result};

/// Where the poster frame for an asset is cached.
pub fn thumbnail_path(cache_dir: &Path, asset_id: Uuid) -> PathBuf {
    cache_dir.join(format!("{asset_id}.jpg"))
}

/// Poster frame time: one second in, or 10% of the duration for short media.
pub fn poster_time(duration_seconds: f64) -> f64 {
    (duration_seconds * 0.1).clamp(0.0, 1.0)
}

/// Extract a single thumbnail at a specific time from a video file.
pub async fn extract_thumbnail(
    source_path: &Path,
    output_path: &Path,
    time_seconds: f64,
    width: u32,
) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let status = tokio::process::Command::new("ffmpeg")
        .args(["-y", "-ss", &format!("{time_seconds:.3}"), "-i"])
        .arg(source_path)
        .args(["-vframes", "1", "-vf", &format!("scale={width}:-1"), "-q:v", "5"])
        .arg(output_path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProbeError::FfmpegNotFound
            } else {
                ProbeError::Io(e)
            }
        })?;

    if !status.success() {
        return Err(ProbeError::FfmpegFailed(format!(
            "thumbnail extraction exited with {status}"
        )));
    }
    Ok(())
}

/// Read a JPEG from disk as a `data:` URI.
pub async fn jpeg_data_uri(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path).await?;
    Ok(to_data_uri("image/jpeg", &bytes))
}

pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{encoded}")
}
