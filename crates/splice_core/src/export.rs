use crate::error::{CoreError, Result};
use crate::media::MediaRegistry;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Mp4,
    Webm,
    Mov,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportSettings {
    pub format: ExportFormat,
    pub resolution: Resolution,
    pub fps: f64,
    pub bitrate_kbps: u32,
    /// 0.0 (smallest) to 1.0 (best).
    pub quality: f64,
    pub audio_codec: String,
    pub video_codec: String,
}

impl ExportSettings {
    /// H.264/AAC MP4 at the project's resolution and frame rate.
    pub fn for_project(settings: &ProjectSettings) -> Self {
        Self {
            format: ExportFormat::Mp4,
            resolution: settings.resolution,
            fps: settings.fps,
            bitrate_kbps: 8_000,
            quality: 0.8,
            audio_codec: "aac".to_string(),
            video_codec: "libx264".to_string(),
        }
    }
}

/// One entry of the flat instruction list handed to the transcoder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportClip {
    pub source: MediaSource,
    /// Offset into the source where the clip begins (its in-point).
    pub start_us: TimeUs,
    pub duration_us: TimeUs,
    /// Index of the clip's track within the project.
    pub track_offset: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportRequest {
    pub settings: ExportSettings,
    pub clips: Vec<ExportClip>,
    pub total_duration_us: TimeUs,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportStage {
    #[default]
    Preparing,
    Encoding,
    Finalizing,
    Done,
}

/// Progress update during export.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExportProgress {
    pub percent: f64,
    pub stage: ExportStage,
    pub eta_seconds: Option<f64>,
}

pub type TranscodeFuture = Pin<Box<dyn Future<Output = std::result::Result<Vec<u8>, String>> + Send + 'static>>;

/// Encodes a flattened timeline. Implementations report progress on the
/// given channel and must not borrow from the request.
pub trait Transcoder {
    fn transcode(&self, request: ExportRequest, progress: watch::Sender<ExportProgress>) -> TranscodeFuture;
}

/// A running export. Holds its own copy of the clip list, so the editor
/// stays free for edits while it runs.
pub struct ExportJob {
    pub progress: watch::Receiver<ExportProgress>,
    pub clip_count: usize,
    output: TranscodeFuture,
}

impl ExportJob {
    /// Wait for the encoded bytes.
    pub async fn finish(self) -> Result<Vec<u8>> {
        self.output.await.map_err(CoreError::Transcode)
    }
}

/// Flatten the exportable clips in track order: visible, unmuted, unlocked
/// Video tracks only. Clips whose asset is no longer registered are skipped.
pub fn flatten(project: &Project, media: &MediaRegistry) -> Vec<ExportClip> {
    let mut clips = Vec::new();

    for (track_offset, track) in project.tracks.iter().enumerate() {
        if track.kind != TrackKind::Video || !track.visible || track.muted || track.locked {
            continue;
        }
        for clip in &track.clips {
            let Some(asset) = media.get(clip.asset_id) else {
                tracing::warn!(clip = %clip.id, asset = %clip.asset_id, "Skipping clip with missing asset");
                continue;
            };
            clips.push(ExportClip {
                source: asset.source.clone(),
                start_us: clip.in_point_us,
                duration_us: clip.duration_us,
                track_offset,
            });
        }
    }

    clips
}

/// Snapshot the timeline and hand it to `transcoder`.
pub fn start(
    project: &Project,
    media: &MediaRegistry,
    settings: ExportSettings,
    transcoder: &dyn Transcoder,
) -> Result<ExportJob> {
    let clips = flatten(project, media);
    if clips.is_empty() {
        return Err(CoreError::NothingToExport);
    }

    let clip_count = clips.len();
    let request = ExportRequest {
        settings,
        clips,
        total_duration_us: project.duration_us,
    };
    tracing::info!(clips = clip_count, format = ?request.settings.format, "Export started");

    let (progress_tx, progress_rx) = watch::channel(ExportProgress::default());
    let output = transcoder.transcode(request, progress_tx);

    Ok(ExportJob {
        progress: progress_rx,
        clip_count,
        output,
    })
}
