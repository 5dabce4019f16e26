//! ffprobe/ffmpeg-backed metadata prober for `splice_core`.

pub mod error;
pub mod probe;
pub mod thumbnails;
pub mod waveform;

use error::{ProbeError, Result};
use splice_core::media::{detect_kind, mime_from_extension, MetadataProber, ProbeOutcome};
use splice_core::types::{MediaKind, MediaSource, ProbeResult};
use std::path::{Path, PathBuf};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ProberOptions {
    /// Extract a poster frame for video assets.
    pub thumbnails: bool,
    pub thumbnail_width: u32,
    /// Compute peak data for audio assets.
    pub waveforms: bool,
    pub samples_per_peak: u32,
}

impl Default for ProberOptions {
    fn default() -> Self {
        Self {
            thumbnails: true,
            thumbnail_width: 160,
            waveforms: true,
            samples_per_peak: 800,
        }
    }
}

/// Runs each probe as a task on the given runtime. Thumbnails are cached
/// under `cache_dir` until the asset is released.
pub struct FfprobeProber {
    runtime: Handle,
    cache_dir: PathBuf,
    options: ProberOptions,
}

impl FfprobeProber {
    pub fn new(runtime: Handle, cache_dir: impl Into<PathBuf>, options: ProberOptions) -> Self {
        Self {
            runtime,
            cache_dir: cache_dir.into(),
            options,
        }
    }
}

impl MetadataProber for FfprobeProber {
    fn probe(&self, asset_id: Uuid, source: &MediaSource) -> oneshot::Receiver<ProbeOutcome> {
        let (tx, rx) = oneshot::channel();
        let path = source.path.clone();
        let kind = detect_kind(&source.mime, &source.path);
        let thumb_path = thumbnails::thumbnail_path(&self.cache_dir, asset_id);
        let options = self.options.clone();

        self.runtime.spawn(async move {
            let outcome = probe_source(&path, kind, &thumb_path, &options)
                .await
                .map_err(|e| e.to_string());
            if tx.send(outcome).is_err() {
                tracing::debug!(asset = %asset_id, "Probe finished after asset was dropped");
            }
        });

        rx
    }

    fn release(&self, asset_id: Uuid, _source: &MediaSource) {
        let path = thumbnails::thumbnail_path(&self.cache_dir, asset_id);
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::debug!(asset = %asset_id, "Removed cached thumbnail"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(asset = %asset_id, path = %path.display(), "Failed to remove thumbnail: {e}"),
        }
    }
}

async fn probe_source(path: &Path, kind: MediaKind, thumb_path: &Path, options: &ProberOptions) -> Result<ProbeResult> {
    let mut result = probe::probe_file(path).await?;

    if kind == MediaKind::Video && options.thumbnails && result.resolution.is_some() {
        let at = thumbnails::poster_time(result.duration_us.as_seconds());
        let thumbnail = async {
            thumbnails::extract_thumbnail(path, thumb_path, at, options.thumbnail_width).await?;
            thumbnails::jpeg_data_uri(thumb_path).await
        };
        match thumbnail.await {
            Ok(uri) => result.thumbnail = Some(uri),
            Err(e) => tracing::warn!(path = %path.display(), "Thumbnail extraction failed: {e}"),
        }
    }

    if kind == MediaKind::Audio && options.waveforms {
        match waveform::extract_waveform(path, options.samples_per_peak).await {
            Ok(peaks) => result.waveform = Some(peaks),
            Err(e) => tracing::warn!(path = %path.display(), "Waveform extraction failed: {e}"),
        }
    }

    Ok(result)
}

/// Describe a file on disk as a media source: file name, MIME type from the
/// extension, size from the filesystem.
pub fn media_source_from_path(path: impl AsRef<Path>) -> Result<MediaSource> {
    let path = path.as_ref();
    let metadata = std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ProbeError::FileNotFound(path.to_path_buf())
        } else {
            ProbeError::Io(e)
        }
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string());

    Ok(MediaSource {
        name,
        path: path.to_path_buf(),
        mime: mime_from_extension(path).to_string(),
        size_bytes: metadata.len(),
    })
}
