//! Editor configuration.

use crate::error::Result;
use crate::types::{ProjectSettings, Resolution, TimeUs};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Defaults and tuning knobs for an [`Editor`](crate::editor::Editor).
///
/// Every field is optional in the JSON form; missing ones take the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Resolution for projects created without one.
    pub resolution: Resolution,

    /// Frame rate for projects created without one.
    pub fps: f64,

    /// Nominal duration given to still images on import.
    pub image_duration_us: TimeUs,

    /// Shortest length a trim may leave a clip at.
    pub min_clip_duration_us: TimeUs,

    /// Factor applied by zoom in/out.
    pub zoom_step: f64,

    /// Distance within which a position snaps to a clip edge.
    pub snap_threshold_us: TimeUs,

    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "splice_core=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::default(),
            fps: 30.0,
            image_duration_us: TimeUs::from_seconds(5.0),
            min_clip_duration_us: TimeUs::from_seconds(0.1),
            zoom_step: 1.2,
            snap_threshold_us: TimeUs::from_seconds(0.2),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl EditorConfig {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), "Loaded editor config");
        Ok(config)
    }

    pub fn project_settings(&self) -> ProjectSettings {
        ProjectSettings {
            resolution: self.resolution,
            fps: self.fps,
        }
    }
}
