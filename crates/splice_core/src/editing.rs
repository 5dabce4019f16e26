use crate::error::{CoreError, Result};
use crate::types::*;
use uuid::Uuid;

impl Project {
    /// Append a new track. The default name is `"{KIND} {n}"`, where n counts
    /// the existing tracks of the same kind plus one.
    pub fn add_track(&mut self, kind: TrackKind, name: Option<String>) -> Track {
        let name = name.unwrap_or_else(|| {
            let n = self.tracks.iter().filter(|t| t.kind == kind).count() + 1;
            format!("{} {}", kind.label(), n)
        });
        let track = Track::new(kind, name);
        self.tracks.push(track.clone());
        self.touch();
        track
    }

    /// Remove a track together with its clips. Returns the removed track.
    pub fn remove_track(&mut self, track_id: Uuid) -> Option<Track> {
        let pos = self.tracks.iter().position(|t| t.id == track_id)?;
        let track = self.tracks.remove(pos);
        self.recompute_duration();
        self.touch();
        Some(track)
    }

    /// Apply a track patch. Returns false if the track does not exist.
    pub fn update_track(&mut self, track_id: Uuid, patch: &TrackPatch) -> bool {
        let Some(track) = self.tracks.iter_mut().find(|t| t.id == track_id) else {
            return false;
        };
        if let Some(name) = &patch.name {
            track.name = name.clone();
        }
        if let Some(muted) = patch.muted {
            track.muted = muted;
        }
        if let Some(locked) = patch.locked {
            track.locked = locked;
        }
        if let Some(visible) = patch.visible {
            track.visible = visible;
        }
        if let Some(height) = patch.height {
            track.height = height;
        }
        if let Some(color) = &patch.color {
            track.color = color.clone();
        }
        self.touch();
        true
    }

    /// Apply a project patch. Returns true if anything was supplied, in which
    /// case `modified_at` is bumped.
    pub fn update(&mut self, patch: &ProjectPatch) -> bool {
        let mut changed = false;
        if let Some(name) = &patch.name {
            self.name = name.clone();
            changed = true;
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
            changed = true;
        }
        if let Some(resolution) = patch.resolution {
            self.settings.resolution = resolution;
            changed = true;
        }
        if let Some(fps) = patch.fps {
            self.settings.fps = fps;
            changed = true;
        }
        if changed {
            self.touch();
        }
        changed
    }

    /// Place the whole of `asset` on a track starting at `start_us`.
    pub fn add_clip(
        &mut self,
        track_id: Uuid,
        asset: &MediaAsset,
        start_us: TimeUs,
        color: &str,
    ) -> Result<Clip> {
        let track = self
            .tracks
            .iter_mut()
            .find(|t| t.id == track_id)
            .ok_or(CoreError::TrackNotFound(track_id))?;

        if asset.duration_us <= TimeUs::ZERO {
            return Err(CoreError::EmptyAsset(asset.id));
        }
        let end_us = start_us.checked_add(asset.duration_us).ok_or_else(|| {
            CoreError::InvalidOperation(format!("clip starting at {start_us} runs past the end of the timeline"))
        })?;

        let clip = Clip {
            id: Uuid::new_v4(),
            name: asset.name.clone(),
            track_id,
            asset_id: asset.id,
            start_us,
            end_us,
            duration_us: asset.duration_us,
            in_point_us: TimeUs::ZERO,
            out_point_us: asset.duration_us,
            transform: ClipTransform::default(),
            effects: vec![],
            transitions: vec![],
            selected: false,
            locked: false,
            color: color.to_string(),
            volume: Some(1.0),
            opacity: Some(1.0),
        };

        if track.clips.iter().any(|c| clips_overlap(c, &clip)) {
            tracing::debug!(clip = %clip.id, track = %track_id, "clip overlaps an existing clip");
        }
        track.clips.push(clip.clone());
        sort_clips(track);
        self.recompute_duration();
        self.touch();
        Ok(clip)
    }

    /// Remove a clip from whichever track holds it. Returns the removed clip.
    pub fn remove_clip(&mut self, clip_id: Uuid) -> Option<Clip> {
        let (track_idx, clip_idx) = self.find_clip_location(clip_id)?;
        let clip = self.tracks[track_idx].clips.remove(clip_idx);
        self.recompute_duration();
        self.touch();
        Some(clip)
    }

    /// Merge a patch into a clip. Supplying either edge recomputes the clip's
    /// duration; in/out points are left exactly as given.
    pub fn update_clip(&mut self, clip_id: Uuid, patch: &ClipPatch) -> bool {
        let Some((track_idx, clip_idx)) = self.find_clip_location(clip_id) else {
            return false;
        };
        let clip = &mut self.tracks[track_idx].clips[clip_idx];

        if let Some(name) = &patch.name {
            clip.name = name.clone();
        }
        if let Some(start) = patch.start_us {
            clip.start_us = start;
        }
        if let Some(end) = patch.end_us {
            clip.end_us = end;
        }
        if let Some(in_point) = patch.in_point_us {
            clip.in_point_us = in_point;
        }
        if let Some(out_point) = patch.out_point_us {
            clip.out_point_us = out_point;
        }
        if let Some(transform) = patch.transform {
            clip.transform = transform;
        }
        if let Some(effects) = &patch.effects {
            clip.effects = effects.clone();
        }
        if let Some(transitions) = &patch.transitions {
            clip.transitions = transitions.clone();
        }
        if let Some(selected) = patch.selected {
            clip.selected = selected;
        }
        if let Some(locked) = patch.locked {
            clip.locked = locked;
        }
        if let Some(color) = &patch.color {
            clip.color = color.clone();
        }
        if let Some(volume) = patch.volume {
            clip.volume = volume;
        }
        if let Some(opacity) = patch.opacity {
            clip.opacity = opacity;
        }
        if patch.touches_timing() {
            clip.duration_us = clip.end_us - clip.start_us;
        }

        sort_clips(&mut self.tracks[track_idx]);
        self.recompute_duration();
        self.touch();
        true
    }

    /// Re-anchor a clip on `new_track_id` at `new_start_us`, keeping its length.
    ///
    /// The destination is checked before anything is touched, so an unknown
    /// track or an end past `i64::MAX` leaves the clip where it was.
    pub fn move_clip(&mut self, clip_id: Uuid, new_track_id: Uuid, new_start_us: TimeUs) -> bool {
        let Some(dest_idx) = self.tracks.iter().position(|t| t.id == new_track_id) else {
            return false;
        };
        let Some((track_idx, clip_idx)) = self.find_clip_location(clip_id) else {
            return false;
        };
        let duration = self.tracks[track_idx].clips[clip_idx].duration_us;
        let Some(new_end_us) = new_start_us.checked_add(duration) else {
            return false;
        };

        let mut clip = self.tracks[track_idx].clips.remove(clip_idx);
        clip.track_id = new_track_id;
        clip.start_us = new_start_us;
        clip.end_us = new_end_us;

        let dest = &mut self.tracks[dest_idx];
        dest.clips.push(clip);
        sort_clips(dest);
        self.recompute_duration();
        self.touch();
        true
    }

    /// Split a clip at a timeline position strictly inside it.
    /// Returns the ids of (left, right); the left half keeps the original id.
    pub fn split_clip(&mut self, clip_id: Uuid, split_us: TimeUs) -> Option<(Uuid, Uuid)> {
        let (track_idx, clip_idx) = self.find_clip_location(clip_id)?;
        let track = &mut self.tracks[track_idx];
        let original = &track.clips[clip_idx];

        if split_us <= original.start_us || split_us >= original.end_us {
            return None;
        }

        let offset = split_us - original.start_us;
        let split_source = original.in_point_us + offset;

        let mut right = original.clone();
        right.id = Uuid::new_v4();
        right.start_us = split_us;
        right.in_point_us = split_source;
        right.duration_us = right.end_us - split_us;

        let left = &mut track.clips[clip_idx];
        left.end_us = split_us;
        left.out_point_us = split_source;
        left.duration_us = offset;

        let ids = (left.id, right.id);
        track.clips.insert(clip_idx + 1, right);
        sort_clips(track);
        self.touch();
        Some(ids)
    }

    /// Drag the left edge of a clip. The right edge stays fixed and the
    /// in-point moves by the same amount as the start.
    pub fn trim_clip_start(&mut self, clip_id: Uuid, new_start_us: TimeUs, min_len: TimeUs) -> bool {
        let Some((track_idx, clip_idx)) = self.find_clip_location(clip_id) else {
            return false;
        };
        let clip = &mut self.tracks[track_idx].clips[clip_idx];

        let lo = (clip.start_us - clip.in_point_us).max(TimeUs::ZERO);
        let hi = clip.end_us - min_len;
        if hi < lo {
            return false;
        }
        let target = new_start_us.clamp(lo, hi);
        if target == clip.start_us {
            return false;
        }

        let delta = target - clip.start_us;
        clip.start_us = target;
        clip.in_point_us = clip.in_point_us + delta;
        clip.duration_us = clip.end_us - clip.start_us;

        sort_clips(&mut self.tracks[track_idx]);
        self.recompute_duration();
        self.touch();
        true
    }

    /// Drag the right edge of a clip. The out-point moves with the end and
    /// never passes `source_duration` when it is known.
    pub fn trim_clip_end(
        &mut self,
        clip_id: Uuid,
        new_end_us: TimeUs,
        min_len: TimeUs,
        source_duration: Option<TimeUs>,
    ) -> bool {
        let Some((track_idx, clip_idx)) = self.find_clip_location(clip_id) else {
            return false;
        };
        let clip = &mut self.tracks[track_idx].clips[clip_idx];

        let lo = clip.start_us + min_len;
        let hi = source_duration
            .filter(|d| *d > TimeUs::ZERO)
            .map(|d| clip.start_us + (d - clip.in_point_us));
        if hi.is_some_and(|hi| hi < lo) {
            return false;
        }
        let mut target = new_end_us.max(lo);
        if let Some(hi) = hi {
            target = target.min(hi);
        }
        if target == clip.end_us {
            return false;
        }

        let delta = target - clip.end_us;
        clip.end_us = target;
        clip.out_point_us = clip.out_point_us + delta;
        clip.duration_us = clip.end_us - clip.start_us;

        self.recompute_duration();
        self.touch();
        true
    }

    /// Set `duration_us` to the latest clip end (or zero). Returns true if it changed.
    pub fn recompute_duration(&mut self) -> bool {
        let duration = self
            .tracks
            .iter()
            .flat_map(|t| t.clips.iter())
            .map(|c| c.end_us)
            .max()
            .unwrap_or(TimeUs::ZERO)
            .max(TimeUs::ZERO);
        if duration == self.duration_us {
            return false;
        }
        self.duration_us = duration;
        true
    }

    /// Find the (track_index, clip_index) for a given clip id.
    fn find_clip_location(&self, clip_id: Uuid) -> Option<(usize, usize)> {
        for (ti, track) in self.tracks.iter().enumerate() {
            for (ci, clip) in track.clips.iter().enumerate() {
                if clip.id == clip_id {
                    return Some((ti, ci));
                }
            }
        }
        None
    }
}

/// Stable sort, so clips sharing a start keep their insertion order.
fn sort_clips(track: &mut Track) {
    track.clips.sort_by_key(|c| c.start_us);
}

/// Two clips overlap if their half-open ranges [start, end) intersect.
fn clips_overlap(a: &Clip, b: &Clip) -> bool {
    a.start_us < b.end_us && b.start_us < a.end_us
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::preset_1080p;
    use std::path::PathBuf;

    fn secs(s: f64) -> TimeUs {
        TimeUs::from_seconds(s)
    }

    fn make_asset(duration_s: f64) -> MediaAsset {
        MediaAsset {
            id: Uuid::new_v4(),
            name: "clip.mp4".to_string(),
            kind: MediaKind::Video,
            source: MediaSource {
                name: "clip.mp4".to_string(),
                path: PathBuf::from("/media/clip.mp4"),
                mime: "video/mp4".to_string(),
                size_bytes: 0,
            },
            duration_us: secs(duration_s),
            resolution: None,
            file_size: 0,
            format: "video/mp4".to_string(),
            thumbnail: None,
            waveform: None,
            metadata: MediaMetadata::default(),
            created_at: chrono::Utc::now(),
        }
    }

    fn make_project() -> (Project, Uuid) {
        let project = Project::new("Test", preset_1080p());
        let video = project.tracks[0].id;
        (project, video)
    }

    fn assert_sorted(project: &Project) {
        for track in &project.tracks {
            for pair in track.clips.windows(2) {
                assert!(pair[0].start_us <= pair[1].start_us);
            }
        }
    }

    fn max_end(project: &Project) -> TimeUs {
        project
            .tracks
            .iter()
            .flat_map(|t| t.clips.iter())
            .map(|c| c.end_us)
            .max()
            .unwrap_or(TimeUs::ZERO)
    }

    // -----------------------------------------------------------------------
    // tracks
    // -----------------------------------------------------------------------

    #[test]
    fn add_track_uses_kind_counter_for_name() {
        let (mut project, _) = make_project();
        let track = project.add_track(TrackKind::Video, None);
        assert_eq!(track.name, "VIDEO 2");
        let subs = project.add_track(TrackKind::Subtitle, None);
        assert_eq!(subs.name, "SUBTITLE 1");
        let named = project.add_track(TrackKind::Audio, Some("Music".into()));
        assert_eq!(named.name, "Music");
        assert_eq!(project.tracks.last().unwrap().id, named.id);
    }

    #[test]
    fn remove_track_drops_clips_and_duration() {
        let (mut project, video) = make_project();
        project.add_clip(video, &make_asset(10.0), secs(5.0), "#fff").unwrap();
        assert_eq!(project.duration_us, secs(15.0));

        let removed = project.remove_track(video).unwrap();
        assert_eq!(removed.clips.len(), 1);
        assert_eq!(project.duration_us, TimeUs::ZERO);
        assert!(project.remove_track(video).is_none());
    }

    #[test]
    fn update_track_merges_only_given_fields() {
        let (mut project, video) = make_project();
        let patch = TrackPatch {
            muted: Some(true),
            name: Some("A-roll".into()),
            ..Default::default()
        };
        assert!(project.update_track(video, &patch));
        let track = project.track(video).unwrap();
        assert!(track.muted);
        assert_eq!(track.name, "A-roll");
        assert!(track.visible);
        assert_eq!(track.height, 80);

        assert!(!project.update_track(Uuid::new_v4(), &patch));
    }

    // -----------------------------------------------------------------------
    // add_clip
    // -----------------------------------------------------------------------

    #[test]
    fn add_clip_spans_whole_asset() {
        let (mut project, video) = make_project();
        let clip = project.add_clip(video, &make_asset(10.0), secs(5.0), "#fff").unwrap();

        assert_eq!(clip.start_us, secs(5.0));
        assert_eq!(clip.end_us, secs(15.0));
        assert_eq!(clip.duration_us, secs(10.0));
        assert_eq!(clip.in_point_us, TimeUs::ZERO);
        assert_eq!(clip.out_point_us, secs(10.0));
        assert_eq!(clip.track_id, video);
        assert_eq!(project.duration_us, secs(15.0));
    }

    #[test]
    fn add_clip_past_time_limit_fails() {
        let (mut project, video) = make_project();
        let result = project.add_clip(video, &make_asset(5.0), TimeUs(i64::MAX - 10), "#fff");
        assert!(matches!(result.unwrap_err(), CoreError::InvalidOperation(_)));
        assert_eq!(project.clip_count(), 0);
        assert_eq!(project.duration_us, TimeUs::ZERO);
    }

    #[test]
    fn add_clip_to_nonexistent_track_fails() {
        let (mut project, _) = make_project();
        let result = project.add_clip(Uuid::new_v4(), &make_asset(1.0), TimeUs::ZERO, "#fff");
        assert!(matches!(result.unwrap_err(), CoreError::TrackNotFound(_)));
        assert_eq!(project.clip_count(), 0);
    }

    #[test]
    fn add_clip_with_unprobed_asset_fails() {
        let (mut project, video) = make_project();
        let result = project.add_clip(video, &make_asset(0.0), TimeUs::ZERO, "#fff");
        assert!(matches!(result.unwrap_err(), CoreError::EmptyAsset(_)));
        assert_eq!(project.clip_count(), 0);
    }

    #[test]
    fn add_clip_keeps_track_sorted_and_allows_overlap() {
        let (mut project, video) = make_project();
        let asset = make_asset(4.0);
        let late = project.add_clip(video, &asset, secs(10.0), "#fff").unwrap();
        let early = project.add_clip(video, &asset, secs(0.0), "#fff").unwrap();
        let overlapping = project.add_clip(video, &asset, secs(2.0), "#fff").unwrap();

        let ids: Vec<Uuid> = project.tracks[0].clips.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![early.id, overlapping.id, late.id]);
        assert_eq!(project.duration_us, secs(14.0));
    }

    #[test]
    fn equal_starts_keep_insertion_order() {
        let (mut project, video) = make_project();
        let asset = make_asset(2.0);
        let first = project.add_clip(video, &asset, secs(3.0), "#fff").unwrap();
        let second = project.add_clip(video, &asset, secs(3.0), "#fff").unwrap();
        project.add_clip(video, &asset, secs(1.0), "#fff").unwrap();

        let clips = &project.tracks[0].clips;
        assert_eq!(clips[1].id, first.id);
        assert_eq!(clips[2].id, second.id);
    }

    // -----------------------------------------------------------------------
    // remove / update
    // -----------------------------------------------------------------------

    #[test]
    fn remove_clip_recomputes_duration() {
        let (mut project, video) = make_project();
        let asset = make_asset(5.0);
        project.add_clip(video, &asset, secs(0.0), "#fff").unwrap();
        let last = project.add_clip(video, &asset, secs(20.0), "#fff").unwrap();
        assert_eq!(project.duration_us, secs(25.0));

        let removed = project.remove_clip(last.id).unwrap();
        assert_eq!(removed.id, last.id);
        assert_eq!(project.duration_us, secs(5.0));
        assert!(project.remove_clip(last.id).is_none());
    }

    #[test]
    fn update_clip_recomputes_duration_but_not_source_range() {
        let (mut project, video) = make_project();
        let clip = project.add_clip(video, &make_asset(10.0), secs(0.0), "#fff").unwrap();

        let patch = ClipPatch {
            end_us: Some(secs(6.0)),
            ..Default::default()
        };
        assert!(project.update_clip(clip.id, &patch));

        let updated = project.clip(clip.id).unwrap();
        assert_eq!(updated.duration_us, secs(6.0));
        assert_eq!(updated.out_point_us, secs(10.0));
        assert_eq!(project.duration_us, secs(6.0));
    }

    #[test]
    fn update_clip_without_timing_leaves_duration() {
        let (mut project, video) = make_project();
        let clip = project.add_clip(video, &make_asset(10.0), secs(0.0), "#fff").unwrap();
        let patch = ClipPatch {
            name: Some("Intro".into()),
            volume: Some(None),
            ..Default::default()
        };
        assert!(project.update_clip(clip.id, &patch));
        let updated = project.clip(clip.id).unwrap();
        assert_eq!(updated.name, "Intro");
        assert_eq!(updated.volume, None);
        assert_eq!(updated.duration_us, secs(10.0));
        assert_eq!(updated.opacity, Some(1.0));
    }

    #[test]
    fn update_clip_start_resorts_track() {
        let (mut project, video) = make_project();
        let asset = make_asset(2.0);
        let a = project.add_clip(video, &asset, secs(0.0), "#fff").unwrap();
        let b = project.add_clip(video, &asset, secs(5.0), "#fff").unwrap();

        let patch = ClipPatch {
            start_us: Some(secs(8.0)),
            end_us: Some(secs(10.0)),
            ..Default::default()
        };
        project.update_clip(a.id, &patch);
        assert_eq!(project.tracks[0].clips[0].id, b.id);
        assert_eq!(project.tracks[0].clips[1].id, a.id);
        assert_eq!(project.duration_us, secs(10.0));
    }

    // -----------------------------------------------------------------------
    // move_clip
    // -----------------------------------------------------------------------

    #[test]
    fn move_clip_to_other_track_preserves_duration() {
        let (mut project, video) = make_project();
        let other = project.add_track(TrackKind::Video, None).id;
        let clip = project.add_clip(video, &make_asset(4.0), secs(1.0), "#fff").unwrap();

        assert!(project.move_clip(clip.id, other, secs(20.0)));
        assert!(project.tracks[0].clips.is_empty());

        let moved = project.clip(clip.id).unwrap();
        assert_eq!(moved.track_id, other);
        assert_eq!(moved.start_us, secs(20.0));
        assert_eq!(moved.end_us, secs(24.0));
        assert_eq!(moved.duration_us, secs(4.0));
        assert_eq!(project.duration_us, secs(24.0));
    }

    #[test]
    fn move_clip_to_unknown_track_leaves_clip_in_place() {
        let (mut project, video) = make_project();
        let clip = project.add_clip(video, &make_asset(4.0), secs(1.0), "#fff").unwrap();
        let before = project.clone();

        assert!(!project.move_clip(clip.id, Uuid::new_v4(), secs(20.0)));
        assert_eq!(project, before);
    }

    #[test]
    fn move_clip_past_time_limit_leaves_clip_in_place() {
        let (mut project, video) = make_project();
        let clip = project.add_clip(video, &make_asset(4.0), secs(1.0), "#fff").unwrap();
        let before = project.clone();

        assert!(!project.move_clip(clip.id, video, TimeUs(i64::MAX - 10)));
        assert_eq!(project, before);
    }

    #[test]
    fn move_unknown_clip_is_noop() {
        let (mut project, video) = make_project();
        let before = project.clone();
        assert!(!project.move_clip(Uuid::new_v4(), video, secs(1.0)));
        assert_eq!(project, before);
    }

    // -----------------------------------------------------------------------
    // split_clip
    // -----------------------------------------------------------------------

    #[test]
    fn split_reconstructs_source_range() {
        let (mut project, video) = make_project();
        let clip = project.add_clip(video, &make_asset(20.0), secs(0.0), "#fff").unwrap();
        project.update_clip(
            clip.id,
            &ClipPatch {
                end_us: Some(secs(10.0)),
                in_point_us: Some(secs(2.0)),
                out_point_us: Some(secs(12.0)),
                ..Default::default()
            },
        );

        let (left_id, right_id) = project.split_clip(clip.id, secs(4.0)).unwrap();
        assert_eq!(left_id, clip.id);
        assert_ne!(right_id, clip.id);

        let left = project.clip(left_id).unwrap();
        assert_eq!(left.start_us, secs(0.0));
        assert_eq!(left.end_us, secs(4.0));
        assert_eq!(left.in_point_us, secs(2.0));
        assert_eq!(left.out_point_us, secs(6.0));
        assert_eq!(left.duration_us, secs(4.0));

        let right = project.clip(right_id).unwrap();
        assert_eq!(right.start_us, secs(4.0));
        assert_eq!(right.end_us, secs(10.0));
        assert_eq!(right.in_point_us, secs(6.0));
        assert_eq!(right.out_point_us, secs(12.0));
        assert_eq!(right.duration_us, secs(6.0));
        assert_eq!(right.asset_id, left.asset_id);
        assert_eq!(right.color, left.color);
    }

    #[test]
    fn split_outside_bounds_is_noop() {
        let (mut project, video) = make_project();
        let clip = project.add_clip(video, &make_asset(5.0), secs(2.0), "#fff").unwrap();
        let before = project.clone();

        for t in [0.0, 2.0, 7.0, 9.0] {
            assert!(project.split_clip(clip.id, secs(t)).is_none());
        }
        assert_eq!(project, before);
    }

    #[test]
    fn split_halves_stay_sorted_next_to_each_other() {
        let (mut project, video) = make_project();
        let asset = make_asset(5.0);
        let a = project.add_clip(video, &asset, secs(0.0), "#fff").unwrap();
        let b = project.add_clip(video, &asset, secs(5.0), "#fff").unwrap();

        let (_, right) = project.split_clip(a.id, secs(2.5)).unwrap();
        let ids: Vec<Uuid> = project.tracks[0].clips.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![a.id, right, b.id]);
    }

    // -----------------------------------------------------------------------
    // trims
    // -----------------------------------------------------------------------

    #[test]
    fn trim_start_moves_in_point_with_start() {
        let (mut project, video) = make_project();
        let clip = project.add_clip(video, &make_asset(10.0), secs(5.0), "#fff").unwrap();

        assert!(project.trim_clip_start(clip.id, secs(7.0), secs(0.1)));
        let c = project.clip(clip.id).unwrap();
        assert_eq!(c.start_us, secs(7.0));
        assert_eq!(c.end_us, secs(15.0));
        assert_eq!(c.in_point_us, secs(2.0));
        assert_eq!(c.out_point_us - c.in_point_us, c.duration_us);
    }

    #[test]
    fn trim_start_cannot_reach_before_source_start() {
        let (mut project, video) = make_project();
        let clip = project.add_clip(video, &make_asset(10.0), secs(5.0), "#fff").unwrap();
        project.trim_clip_start(clip.id, secs(8.0), secs(0.1));

        project.trim_clip_start(clip.id, secs(0.0), secs(0.1));
        let c = project.clip(clip.id).unwrap();
        assert_eq!(c.start_us, secs(5.0));
        assert_eq!(c.in_point_us, TimeUs::ZERO);
    }

    #[test]
    fn trim_start_keeps_minimum_length() {
        let (mut project, video) = make_project();
        let clip = project.add_clip(video, &make_asset(10.0), secs(0.0), "#fff").unwrap();
        project.trim_clip_start(clip.id, secs(50.0), secs(0.1));
        let c = project.clip(clip.id).unwrap();
        assert_eq!(c.start_us, secs(9.9));
        assert_eq!(c.duration_us, secs(0.1));
    }

    #[test]
    fn trim_end_is_bounded_by_source() {
        let (mut project, video) = make_project();
        let asset = make_asset(10.0);
        let clip = project.add_clip(video, &asset, secs(0.0), "#fff").unwrap();

        assert!(project.trim_clip_end(clip.id, secs(4.0), secs(0.1), Some(asset.duration_us)));
        let c = project.clip(clip.id).unwrap();
        assert_eq!(c.end_us, secs(4.0));
        assert_eq!(c.out_point_us, secs(4.0));
        assert_eq!(project.duration_us, secs(4.0));

        project.trim_clip_end(clip.id, secs(30.0), secs(0.1), Some(asset.duration_us));
        let c = project.clip(clip.id).unwrap();
        assert_eq!(c.end_us, secs(10.0));
        assert_eq!(c.out_point_us, secs(10.0));
    }

    #[test]
    fn trim_unknown_clip_is_noop() {
        let (mut project, _) = make_project();
        assert!(!project.trim_clip_start(Uuid::new_v4(), secs(1.0), secs(0.1)));
        assert!(!project.trim_clip_end(Uuid::new_v4(), secs(1.0), secs(0.1), None));
    }

    // -----------------------------------------------------------------------
    // invariants over sequences
    // -----------------------------------------------------------------------

    #[test]
    fn sorted_and_duration_hold_across_operations() {
        let (mut project, video) = make_project();
        let other = project.add_track(TrackKind::Video, None).id;
        let asset = make_asset(3.0);

        let mut ids = vec![];
        for start in [9.0, 1.0, 5.0, 0.5, 12.0] {
            ids.push(project.add_clip(video, &asset, secs(start), "#fff").unwrap().id);
            assert_sorted(&project);
            assert_eq!(project.duration_us, max_end(&project));
        }

        project.move_clip(ids[0], other, secs(2.0));
        assert_sorted(&project);
        assert_eq!(project.duration_us, max_end(&project));

        project.update_clip(
            ids[1],
            &ClipPatch {
                start_us: Some(secs(30.0)),
                end_us: Some(secs(33.0)),
                ..Default::default()
            },
        );
        assert_sorted(&project);
        assert_eq!(project.duration_us, secs(33.0));

        project.remove_clip(ids[1]);
        assert_sorted(&project);
        assert_eq!(project.duration_us, max_end(&project));

        project.split_clip(ids[2], secs(6.0));
        assert_sorted(&project);
        assert_eq!(project.duration_us, max_end(&project));

        for id in ids {
            project.remove_clip(id);
        }
        project.tracks.iter_mut().for_each(|t| t.clips.clear());
        project.recompute_duration();
        assert_eq!(project.duration_us, TimeUs::ZERO);
    }

    #[test]
    fn recompute_reports_change_only_once() {
        let (mut project, video) = make_project();
        project.add_clip(video, &make_asset(3.0), secs(0.0), "#fff").unwrap();
        assert!(!project.recompute_duration());
    }

    #[test]
    fn project_patch_applies_named_fields() {
        let (mut project, _) = make_project();
        assert!(!project.update(&ProjectPatch::default()));
        let patch = ProjectPatch {
            fps: Some(24.0),
            description: Some("cut 2".into()),
            ..Default::default()
        };
        assert!(project.update(&patch));
        assert_eq!(project.settings.fps, 24.0);
        assert_eq!(project.description, "cut 2");
        assert_eq!(project.name, "Test");
    }

    #[test]
    fn mutations_bump_modified_at() {
        let (mut project, video) = make_project();
        let created = project.created_at;
        let stale = created - chrono::Duration::hours(1);
        let check = |project: &mut Project, changed: bool| {
            assert_eq!(project.modified_at > stale, changed);
            project.modified_at = stale;
        };

        project.modified_at = stale;
        assert!(!project.update(&ProjectPatch::default()));
        check(&mut project, false);
        project.update(&ProjectPatch {
            name: Some("Renamed".into()),
            ..Default::default()
        });
        check(&mut project, true);

        let clip = project.add_clip(video, &make_asset(6.0), secs(0.0), "#fff").unwrap();
        check(&mut project, true);
        project.split_clip(clip.id, secs(3.0));
        check(&mut project, true);
        project.split_clip(clip.id, secs(30.0));
        check(&mut project, false);
        project.trim_clip_end(clip.id, secs(2.0), secs(0.1), None);
        check(&mut project, true);
        project.move_clip(clip.id, Uuid::new_v4(), secs(1.0));
        check(&mut project, false);
        project.remove_clip(clip.id);
        check(&mut project, true);
        project.add_track(TrackKind::Overlay, None);
        check(&mut project, true);

        assert_eq!(project.created_at, created);
    }

    #[test]
    fn adjacent_clips_dont_overlap() {
        let (mut project, video) = make_project();
        let asset = make_asset(5.0);
        let a = project.add_clip(video, &asset, secs(0.0), "#fff").unwrap();
        let b = project.add_clip(video, &asset, secs(5.0), "#fff").unwrap();
        assert!(!clips_overlap(&a, &b));
        let c = project.add_clip(video, &asset, secs(4.9), "#fff").unwrap();
        assert!(clips_overlap(&a, &c));
    }
}
