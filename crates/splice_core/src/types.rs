use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Sub};
use std::path::PathBuf;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// TimeUs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeUs(pub i64);

impl TimeUs {
    pub const ZERO: Self = Self(0);

    pub fn from_seconds(s: f64) -> Self {
        Self((s * 1_000_000.0).round() as i64)
    }

    /// `self + rhs`, or `None` if the sum does not fit.
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn as_seconds(&self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Duration of a single frame at `fps`.
    pub fn frame(fps: f64) -> Self {
        if fps <= 0.0 {
            return Self::ZERO;
        }
        Self::from_seconds(1.0 / fps)
    }

    /// Format as `HH:MM:SS:FF` where FF counts frames inside the current second.
    pub fn to_timecode(&self, fps: f64) -> String {
        let total_us = self.0.max(0);
        let total_secs = total_us / 1_000_000;
        let frac = (total_us % 1_000_000) as f64 / 1_000_000.0;
        let frames = (frac * fps.max(0.0)).floor() as i64;
        let hours = total_secs / 3600;
        let mins = (total_secs % 3600) / 60;
        let secs = total_secs % 60;
        format!("{:02}:{:02}:{:02}:{:02}", hours, mins, secs, frames)
    }
}

// Saturating: times come straight from callers and may sit at the i64 limits.
impl Add for TimeUs {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for TimeUs {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Display for TimeUs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_us = self.0.unsigned_abs();
        let total_ms = total_us / 1_000;
        let ms = total_ms % 1_000;
        let total_secs = total_ms / 1_000;
        let secs = total_secs % 60;
        let total_mins = total_secs / 60;
        let mins = total_mins % 60;
        let hours = total_mins / 60;
        if self.0 < 0 {
            write!(f, "-{:02}:{:02}:{:02}.{:03}", hours, mins, secs, ms)
        } else {
            write!(f, "{:02}:{:02}:{:02}.{:03}", hours, mins, secs, ms)
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// ---------------------------------------------------------------------------
// MediaKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
    Image,
}

// ---------------------------------------------------------------------------
// MediaSource
// ---------------------------------------------------------------------------

/// Handle to the source material behind an asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaSource {
    pub name: String,
    pub path: PathBuf,
    /// MIME type as reported by the importer, e.g. `video/mp4`.
    pub mime: String,
    pub size_bytes: u64,
}

// ---------------------------------------------------------------------------
// MediaMetadata / ProbeResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MediaMetadata {
    pub codec: Option<String>,
    pub bitrate: Option<u64>,
    pub frame_rate: Option<f64>,
    pub channels: Option<u32>,
    pub sample_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// What a metadata prober reports back for one source.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProbeResult {
    pub duration_us: TimeUs,
    pub resolution: Option<Resolution>,
    pub frame_rate: Option<f64>,
    pub codec: Option<String>,
    pub bitrate: Option<u64>,
    pub channels: Option<u32>,
    pub sample_rate: Option<u32>,
    pub thumbnail: Option<String>,
    pub waveform: Option<Vec<f32>>,
}

// ---------------------------------------------------------------------------
// MediaAsset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaAsset {
    pub id: Uuid,
    pub name: String,
    pub kind: MediaKind,
    pub source: MediaSource,
    /// Zero until the asset has been probed.
    pub duration_us: TimeUs,
    pub resolution: Option<Resolution>,
    pub file_size: u64,
    pub format: String,
    pub thumbnail: Option<String>,
    pub waveform: Option<Vec<f32>>,
    pub metadata: MediaMetadata,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// TrackKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
    Subtitle,
    Overlay,
}

impl TrackKind {
    /// Upper-case label used for default track names.
    pub fn label(&self) -> &'static str {
        match self {
            TrackKind::Video => "VIDEO",
            TrackKind::Audio => "AUDIO",
            TrackKind::Subtitle => "SUBTITLE",
            TrackKind::Overlay => "OVERLAY",
        }
    }
}

// ---------------------------------------------------------------------------
// Effects and transitions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    ColorCorrection,
    Blur,
    Sharpen,
    Brightness,
    Contrast,
    Saturation,
    FadeIn,
    FadeOut,
    Crop,
    Scale,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Effect {
    pub id: Uuid,
    pub name: String,
    pub kind: EffectKind,
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Fade,
    Dissolve,
    Wipe,
    Slide,
    Cut,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transition {
    pub id: Uuid,
    pub name: String,
    pub kind: TransitionKind,
    pub duration_us: TimeUs,
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Clip
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ClipTransform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub rotation: f64,
}

impl Default for ClipTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
            rotation: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Clip {
    pub id: Uuid,
    pub name: String,
    pub track_id: Uuid,
    pub asset_id: Uuid,
    pub start_us: TimeUs,
    pub end_us: TimeUs,
    pub duration_us: TimeUs,
    pub in_point_us: TimeUs,
    pub out_point_us: TimeUs,
    pub transform: ClipTransform,
    pub effects: Vec<Effect>,
    pub transitions: Vec<Transition>,
    pub selected: bool,
    pub locked: bool,
    pub color: String,
    pub volume: Option<f64>,
    pub opacity: Option<f64>,
}

// ---------------------------------------------------------------------------
// Track
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Track {
    pub id: Uuid,
    pub name: String,
    pub kind: TrackKind,
    /// Always sorted by `start_us`.
    pub clips: Vec<Clip>,
    pub muted: bool,
    pub locked: bool,
    pub visible: bool,
    pub height: u32,
    pub color: String,
}

// ---------------------------------------------------------------------------
// ProjectSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ProjectSettings {
    pub resolution: Resolution,
    pub fps: f64,
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub settings: ProjectSettings,
    /// Derived: the latest clip end across all tracks.
    pub duration_us: TimeUs,
    pub tracks: Vec<Track>,
    pub created_at: DateTime<Utc>,
    /// Bumped by every mutation that changes the project.
    pub modified_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Transient view state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub current_time_us: TimeUs,
    pub playback_rate: f64,
    /// Always within `[0, 1]`.
    pub volume: f64,
    pub muted: bool,
    #[serde(rename = "loop")]
    pub looping: bool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_time_us: TimeUs::ZERO,
            playback_rate: 1.0,
            volume: 1.0,
            muted: false,
            looping: false,
        }
    }
}

/// Visible window of the timeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Viewport {
    pub start_us: TimeUs,
    pub end_us: TimeUs,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            start_us: TimeUs::ZERO,
            end_us: TimeUs::from_seconds(60.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineState {
    /// Always within `[0.1, 10]`.
    pub zoom: f64,
    pub scroll_position: f64,
    pub snap_to_grid: bool,
    pub grid_size_us: TimeUs,
    /// Selected clip ids in selection order.
    pub selected_clips: Vec<Uuid>,
    /// Mirrors `PlaybackState::current_time_us`.
    pub playhead_us: TimeUs,
    pub viewport: Viewport,
}

impl Default for TimelineState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            scroll_position: 0.0,
            snap_to_grid: true,
            grid_size_us: TimeUs::from_seconds(1.0),
            selected_clips: vec![],
            playhead_us: TimeUs::ZERO,
            viewport: Viewport::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Patches
// ---------------------------------------------------------------------------

/// Field-wise update for a project. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub resolution: Option<Resolution>,
    pub fps: Option<f64>,
}

/// Field-wise update for a track. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TrackPatch {
    pub name: Option<String>,
    pub muted: Option<bool>,
    pub locked: Option<bool>,
    pub visible: Option<bool>,
    pub height: Option<u32>,
    pub color: Option<String>,
}

/// Field-wise update for a clip. `None` leaves the field unchanged; for the
/// optional clip fields, `Some(None)` clears the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClipPatch {
    pub name: Option<String>,
    pub start_us: Option<TimeUs>,
    pub end_us: Option<TimeUs>,
    pub in_point_us: Option<TimeUs>,
    pub out_point_us: Option<TimeUs>,
    pub transform: Option<ClipTransform>,
    pub effects: Option<Vec<Effect>>,
    pub transitions: Option<Vec<Transition>>,
    pub selected: Option<bool>,
    pub locked: Option<bool>,
    pub color: Option<String>,
    pub volume: Option<Option<f64>>,
    pub opacity: Option<Option<f64>>,
}

impl ClipPatch {
    pub fn touches_timing(&self) -> bool {
        self.start_us.is_some() || self.end_us.is_some()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_us_add_sub() {
        let a = TimeUs(5_000_000);
        let b = TimeUs(3_000_000);
        assert_eq!(a + b, TimeUs(8_000_000));
        assert_eq!(a - b, TimeUs(2_000_000));
    }

    #[test]
    fn time_us_from_seconds_as_seconds() {
        let t = TimeUs::from_seconds(2.5);
        assert_eq!(t, TimeUs(2_500_000));
        assert!((t.as_seconds() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn time_us_display() {
        assert_eq!(TimeUs(0).to_string(), "00:00:00.000");
        assert_eq!(TimeUs(1_500_000).to_string(), "00:00:01.500");
        assert_eq!(TimeUs::from_seconds(3661.5).to_string(), "01:01:01.500");
    }

    #[test]
    fn time_us_saturates_at_limits() {
        let max = TimeUs(i64::MAX);
        assert_eq!(max + TimeUs(1), max);
        assert_eq!(TimeUs(i64::MIN) - TimeUs(1), TimeUs(i64::MIN));
        assert_eq!(TimeUs::from_seconds(f64::INFINITY), max);
        assert_eq!(max.checked_add(TimeUs(1)), None);
        assert_eq!(TimeUs(1).checked_add(TimeUs(2)), Some(TimeUs(3)));
    }

    #[test]
    fn timecode_counts_frames() {
        assert_eq!(TimeUs::ZERO.to_timecode(30.0), "00:00:00:00");
        assert_eq!(TimeUs::from_seconds(1.5).to_timecode(30.0), "00:00:01:15");
        assert_eq!(TimeUs::from_seconds(3725.25).to_timecode(24.0), "01:02:05:06");
    }

    #[test]
    fn frame_duration() {
        assert_eq!(TimeUs::frame(25.0), TimeUs(40_000));
        assert_eq!(TimeUs::frame(0.0), TimeUs::ZERO);
    }

    #[test]
    fn clip_patch_timing_detection() {
        assert!(!ClipPatch::default().touches_timing());
        let patch = ClipPatch {
            end_us: Some(TimeUs(1)),
            ..Default::default()
        };
        assert!(patch.touches_timing());
    }

    #[test]
    fn track_kind_serializes_lowercase() {
        let json = serde_json::to_string(&TrackKind::Subtitle).unwrap();
        assert_eq!(json, "\"subtitle\"");
        assert_eq!(TrackKind::Overlay.label(), "OVERLAY");
    }

    #[test]
    fn serde_roundtrip_asset() {
        let asset = MediaAsset {
            id: Uuid::new_v4(),
            name: "test.mp4".to_string(),
            kind: MediaKind::Video,
            source: MediaSource {
                name: "test.mp4".to_string(),
                path: PathBuf::from("/tmp/test.mp4"),
                mime: "video/mp4".to_string(),
                size_bytes: 1024,
            },
            duration_us: TimeUs(10_000_000),
            resolution: Some(Resolution::new(1920, 1080)),
            file_size: 1024,
            format: "video/mp4".to_string(),
            thumbnail: None,
            waveform: None,
            metadata: MediaMetadata {
                codec: Some("h264".to_string()),
                frame_rate: Some(30.0),
                ..Default::default()
            },
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&asset).unwrap();
        let back: MediaAsset = serde_json::from_str(&json).unwrap();
        assert_eq!(asset, back);
    }
}
