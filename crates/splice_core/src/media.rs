//! Imported media and the asynchronous probing that fills in its metadata.

use crate::types::*;
use chrono::Utc;
use std::path::Path;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Outcome of a single probe, as delivered by a [`MetadataProber`].
pub type ProbeOutcome = std::result::Result<ProbeResult, String>;

/// Extracts duration, resolution and stream details from a media source.
///
/// `probe` must return immediately; the result arrives later on the
/// receiver. Dropping the sender without a value counts as a failure.
pub trait MetadataProber {
    fn probe(&self, asset_id: Uuid, source: &MediaSource) -> oneshot::Receiver<ProbeOutcome>;

    /// Free anything the prober holds for this source (cached thumbnails,
    /// temporary files). Called when the asset leaves the registry.
    fn release(&self, asset_id: Uuid, source: &MediaSource);
}

struct PendingProbe {
    asset_id: Uuid,
    rx: oneshot::Receiver<ProbeOutcome>,
}

/// What a round of probe collection did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProbeReport {
    pub updated: Vec<Uuid>,
    pub failed: Vec<(Uuid, String)>,
}

impl ProbeReport {
    pub fn is_empty(&self) -> bool {
        self.updated.is_empty() && self.failed.is_empty()
    }
}

#[derive(Default)]
pub struct MediaRegistry {
    assets: Vec<MediaAsset>,
    pending: Vec<PendingProbe>,
}

impl MediaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assets in import order.
    pub fn assets(&self) -> &[MediaAsset] {
        &self.assets
    }

    pub fn get(&self, asset_id: Uuid) -> Option<&MediaAsset> {
        self.assets.iter().find(|a| a.id == asset_id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Register a source. Images get `image_duration` straight away; video
    /// and audio start at zero duration with a probe in flight.
    pub fn add_asset(
        &mut self,
        source: MediaSource,
        prober: &dyn MetadataProber,
        image_duration: TimeUs,
    ) -> MediaAsset {
        let kind = detect_kind(&source.mime, &source.path);
        let mut asset = MediaAsset {
            id: Uuid::new_v4(),
            name: source.name.clone(),
            kind,
            duration_us: TimeUs::ZERO,
            resolution: None,
            file_size: source.size_bytes,
            format: source.mime.clone(),
            thumbnail: None,
            waveform: None,
            metadata: MediaMetadata::default(),
            source,
            created_at: Utc::now(),
        };

        match kind {
            MediaKind::Image => asset.duration_us = image_duration,
            MediaKind::Video | MediaKind::Audio => {
                let rx = prober.probe(asset.id, &asset.source);
                self.pending.push(PendingProbe {
                    asset_id: asset.id,
                    rx,
                });
            }
        }

        tracing::info!(asset = %asset.id, name = %asset.name, kind = ?kind, "Asset imported");
        self.assets.push(asset.clone());
        asset
    }

    /// Drop an asset and any probe still running for it. Clips that
    /// reference the asset are not touched.
    pub fn remove_asset(&mut self, asset_id: Uuid, prober: &dyn MetadataProber) -> Option<MediaAsset> {
        let pos = self.assets.iter().position(|a| a.id == asset_id)?;
        let asset = self.assets.remove(pos);
        self.pending.retain(|p| p.asset_id != asset_id);
        prober.release(asset.id, &asset.source);
        tracing::info!(asset = %asset_id, "Asset removed");
        Some(asset)
    }

    /// Apply every probe that has already finished, without waiting.
    pub fn poll_probes(&mut self) -> ProbeReport {
        let mut report = ProbeReport::default();
        let mut still_pending = Vec::with_capacity(self.pending.len());

        for mut probe in std::mem::take(&mut self.pending) {
            match probe.rx.try_recv() {
                Ok(outcome) => self.apply(probe.asset_id, outcome, &mut report),
                Err(oneshot::error::TryRecvError::Empty) => still_pending.push(probe),
                Err(oneshot::error::TryRecvError::Closed) => {
                    self.apply(probe.asset_id, Err(dropped_probe()), &mut report)
                }
            }
        }

        self.pending = still_pending;
        report
    }

    /// Wait for every outstanding probe and apply the results.
    pub async fn settle_probes(&mut self) -> ProbeReport {
        let mut report = ProbeReport::default();
        for probe in std::mem::take(&mut self.pending) {
            let outcome = probe.rx.await.unwrap_or_else(|_| Err(dropped_probe()));
            self.apply(probe.asset_id, outcome, &mut report);
        }
        report
    }

    fn apply(&mut self, asset_id: Uuid, outcome: ProbeOutcome, report: &mut ProbeReport) {
        let Some(asset) = self.assets.iter_mut().find(|a| a.id == asset_id) else {
            tracing::debug!(asset = %asset_id, "Discarding probe result for removed asset");
            return;
        };

        match outcome {
            Ok(result) => {
                asset.duration_us = result.duration_us;
                if result.resolution.is_some() {
                    asset.resolution = result.resolution;
                }
                if result.thumbnail.is_some() {
                    asset.thumbnail = result.thumbnail;
                }
                if result.waveform.is_some() {
                    asset.waveform = result.waveform;
                }
                asset.metadata.codec = result.codec;
                asset.metadata.bitrate = result.bitrate;
                asset.metadata.frame_rate = result.frame_rate;
                asset.metadata.channels = result.channels;
                asset.metadata.sample_rate = result.sample_rate;
                tracing::debug!(asset = %asset_id, duration = %asset.duration_us, "Asset probed");
                report.updated.push(asset_id);
            }
            Err(reason) => {
                tracing::warn!(asset = %asset_id, %reason, "Metadata probe failed");
                report.failed.push((asset_id, reason));
            }
        }
    }
}

fn dropped_probe() -> String {
    "prober dropped the request".to_string()
}

/// Media kind from the MIME prefix, then the file extension, defaulting to video.
pub fn detect_kind(mime: &str, path: &Path) -> MediaKind {
    if mime.starts_with("video/") {
        return MediaKind::Video;
    }
    if mime.starts_with("audio/") {
        return MediaKind::Audio;
    }
    if mime.starts_with("image/") {
        return MediaKind::Image;
    }

    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp3" | "wav" | "aac" | "flac" | "ogg" | "m4a" | "opus" => MediaKind::Audio,
        "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp" | "svg" => MediaKind::Image,
        _ => MediaKind::Video,
    }
}

/// MIME type for a file extension, or `application/octet-stream`.
pub fn mime_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "aac" => "audio/aac",
        "flac" => "audio/flac",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        "opus" => "audio/opus",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
