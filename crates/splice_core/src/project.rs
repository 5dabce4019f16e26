use crate::types::*;
use chrono::Utc;
use uuid::Uuid;

/// Pastel palette new clips cycle through.
pub const CLIP_PALETTE: [&str; 5] = ["#E3F2FD", "#E8F5E8", "#FFF3E0", "#F3E5F5", "#FFEBEE"];

impl Project {
    /// Create a project with the default "Video 1" and "Audio 1" tracks.
    pub fn new(name: impl Into<String>, settings: ProjectSettings) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            settings,
            duration_us: TimeUs::ZERO,
            tracks: vec![
                Track::new(TrackKind::Video, "Video 1"),
                Track::new(TrackKind::Audio, "Audio 1"),
            ],
            created_at: now,
            modified_at: now,
        }
    }

    /// Stamp the project as modified now.
    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }

    pub fn track(&self, track_id: Uuid) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == track_id)
    }

    pub fn clip(&self, clip_id: Uuid) -> Option<&Clip> {
        self.tracks
            .iter()
            .flat_map(|t| t.clips.iter())
            .find(|c| c.id == clip_id)
    }

    pub fn clip_count(&self) -> usize {
        self.tracks.iter().map(|t| t.clips.len()).sum()
    }
}

impl Track {
    pub fn new(kind: TrackKind, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            clips: vec![],
            muted: false,
            locked: false,
            visible: true,
            height: default_track_height(kind),
            color: default_track_color(kind).to_string(),
        }
    }
}

pub fn default_track_height(kind: TrackKind) -> u32 {
    match kind {
        TrackKind::Video => 80,
        _ => 60,
    }
}

pub fn default_track_color(kind: TrackKind) -> &'static str {
    match kind {
        TrackKind::Video => "#2196F3",
        TrackKind::Audio => "#4CAF50",
        TrackKind::Subtitle => "#FF9800",
        TrackKind::Overlay => "#9C27B0",
    }
}

/// Color for the `n`th clip created in a session.
pub fn clip_color(n: usize) -> &'static str {
    CLIP_PALETTE[n % CLIP_PALETTE.len()]
}

/// 1920x1080 30fps preset.
pub fn preset_1080p() -> ProjectSettings {
    ProjectSettings {
        resolution: Resolution::new(1920, 1080),
        fps: 30.0,
    }
}

/// 1080x1920 30fps (vertical/shorts) preset.
pub fn preset_shorts() -> ProjectSettings {
    ProjectSettings {
        resolution: Resolution::new(1080, 1920),
        fps: 30.0,
    }
}

/// 1280x720 30fps preset.
pub fn preset_720p() -> ProjectSettings {
    ProjectSettings {
        resolution: Resolution::new(1280, 720),
        fps: 30.0,
    }
}

/// 3840x2160 30fps (4K) preset.
pub fn preset_4k() -> ProjectSettings {
    ProjectSettings {
        resolution: Resolution::new(3840, 2160),
        fps: 30.0,
    }
}

/// 1920x1080 60fps preset.
pub fn preset_1080p_60() -> ProjectSettings {
    ProjectSettings {
        resolution: Resolution::new(1920, 1080),
        fps: 60.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_project_has_default_tracks() {
        let project = Project::new("Test Project", preset_1080p());
        assert_eq!(project.tracks.len(), 2);
        assert_eq!(project.tracks[0].kind, TrackKind::Video);
        assert_eq!(project.tracks[0].name, "Video 1");
        assert_eq!(project.tracks[0].height, 80);
        assert_eq!(project.tracks[1].kind, TrackKind::Audio);
        assert_eq!(project.tracks[1].name, "Audio 1");
        assert_eq!(project.tracks[1].height, 60);
        assert_eq!(project.duration_us, TimeUs::ZERO);
        assert_eq!(project.created_at, project.modified_at);
    }

    #[test]
    fn track_defaults_by_kind() {
        let sub = Track::new(TrackKind::Subtitle, "Subs");
        assert_eq!(sub.height, 60);
        assert_eq!(sub.color, "#FF9800");
        assert!(sub.visible);
        assert!(!sub.muted);
        assert!(!sub.locked);

        let overlay = Track::new(TrackKind::Overlay, "Top");
        assert_eq!(overlay.color, "#9C27B0");
    }

    #[test]
    fn clip_colors_cycle_and_differ_between_neighbours() {
        for n in 0..12 {
            assert_ne!(clip_color(n), clip_color(n + 1));
        }
        assert_eq!(clip_color(0), clip_color(CLIP_PALETTE.len()));
    }

    #[test]
    fn preset_values_are_correct() {
        assert_eq!(preset_1080p().resolution, Resolution::new(1920, 1080));
        assert_eq!(preset_shorts().resolution, Resolution::new(1080, 1920));
        assert_eq!(preset_720p().resolution, Resolution::new(1280, 720));
        assert_eq!(preset_4k().resolution, Resolution::new(3840, 2160));
        assert_eq!(preset_1080p_60().fps, 60.0);
    }

    #[test]
    fn lookups_on_empty_project() {
        let project = Project::new("Empty", preset_720p());
        assert!(project.clip(Uuid::new_v4()).is_none());
        assert!(project.track(project.tracks[0].id).is_some());
        assert_eq!(project.clip_count(), 0);
    }
}
