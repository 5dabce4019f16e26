//! The command surface. An [`Editor`] owns the open project, the transport
//! and view state, the media registry and the change bus. Every successful
//! command publishes fresh snapshots before it returns.

use crate::bus::ChangeBus;
use crate::config::EditorConfig;
use crate::error::{CoreError, Result};
use crate::export::{self, ExportClip, ExportJob, ExportSettings, Transcoder};
use crate::media::{MediaRegistry, MetadataProber, ProbeReport};
use crate::playback::{TimeMarker, Transport};
use crate::project::clip_color;
use crate::snapping;
use crate::types::*;
use tokio::sync::watch;
use uuid::Uuid;

pub struct Editor {
    config: EditorConfig,
    project: Option<Project>,
    transport: Transport,
    media: MediaRegistry,
    bus: ChangeBus,
    prober: Box<dyn MetadataProber + Send + Sync>,
    clips_created: usize,
}

impl Editor {
    pub fn new(config: EditorConfig, prober: Box<dyn MetadataProber + Send + Sync>) -> Self {
        Self {
            config,
            project: None,
            transport: Transport::new(),
            media: MediaRegistry::new(),
            bus: ChangeBus::new(),
            prober,
            clips_created: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    pub fn playback(&self) -> &PlaybackState {
        self.transport.playback()
    }

    pub fn timeline_state(&self) -> &TimelineState {
        self.transport.timeline()
    }

    pub fn assets(&self) -> &[MediaAsset] {
        self.media.assets()
    }

    pub fn asset(&self, asset_id: Uuid) -> Result<&MediaAsset> {
        self.media.get(asset_id).ok_or(CoreError::AssetNotFound(asset_id))
    }

    pub fn clip(&self, clip_id: Uuid) -> Result<&Clip> {
        self.active()?.clip(clip_id).ok_or(CoreError::ClipNotFound(clip_id))
    }

    pub fn subscribe_project(&self) -> watch::Receiver<Option<Project>> {
        self.bus.subscribe_project()
    }

    pub fn subscribe_playback(&self) -> watch::Receiver<PlaybackState> {
        self.bus.subscribe_playback()
    }

    pub fn subscribe_timeline(&self) -> watch::Receiver<TimelineState> {
        self.bus.subscribe_timeline()
    }

    pub fn subscribe_assets(&self) -> watch::Receiver<Vec<MediaAsset>> {
        self.bus.subscribe_assets()
    }

    // -----------------------------------------------------------------------
    // Project lifecycle
    // -----------------------------------------------------------------------

    /// Replace the open project with a fresh one. Unset settings come from
    /// the config.
    pub fn create_project(&mut self, name: &str, resolution: Option<Resolution>, fps: Option<f64>) -> Project {
        let mut settings = self.config.project_settings();
        if let Some(resolution) = resolution {
            settings.resolution = resolution;
        }
        if let Some(fps) = fps {
            settings.fps = fps;
        }

        let project = Project::new(name, settings);
        tracing::info!(project = %project.id, name, resolution = %settings.resolution, fps = settings.fps, "Project created");
        self.project = Some(project.clone());
        self.transport.clear_selection();
        self.publish_project();
        self.publish_view();
        project
    }

    pub fn close_project(&mut self) -> Result<()> {
        let project = self.project.take().ok_or(CoreError::NoActiveProject)?;
        tracing::info!(project = %project.id, "Project closed");
        self.transport.clear_selection();
        self.publish_project();
        self.publish_view();
        Ok(())
    }

    pub fn update_project(&mut self, patch: &ProjectPatch) -> Result<()> {
        if self.active_mut()?.update(patch) {
            self.publish_project();
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Tracks
    // -----------------------------------------------------------------------

    pub fn add_track(&mut self, kind: TrackKind, name: Option<String>) -> Result<Track> {
        let track = self.active_mut()?.add_track(kind, name);
        tracing::debug!(track = %track.id, name = %track.name, "Track added");
        self.publish_project();
        Ok(track)
    }

    /// Remove a track and its clips. Unknown ids are a no-op.
    pub fn remove_track(&mut self, track_id: Uuid) -> Result<Option<Track>> {
        let removed = self.active_mut()?.remove_track(track_id);
        match &removed {
            Some(track) => {
                tracing::debug!(track = %track_id, clips = track.clips.len(), "Track removed");
                self.prune_selection();
                self.publish_project();
            }
            None => tracing::debug!(track = %track_id, "remove_track: no such track"),
        }
        Ok(removed)
    }

    pub fn update_track(&mut self, track_id: Uuid, patch: &TrackPatch) -> Result<bool> {
        let updated = self.active_mut()?.update_track(track_id, patch);
        if updated {
            self.publish_project();
        } else {
            tracing::debug!(track = %track_id, "update_track: no such track");
        }
        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Clips
    // -----------------------------------------------------------------------

    /// Place the whole of `asset` on a track at `start_us`.
    pub fn add_clip(&mut self, track_id: Uuid, asset: &MediaAsset, start_us: TimeUs) -> Result<Clip> {
        let color = clip_color(self.clips_created);
        let clip = self.active_mut()?.add_clip(track_id, asset, start_us, color)?;
        self.clips_created += 1;
        tracing::debug!(clip = %clip.id, track = %track_id, start = %start_us, "Clip added");
        self.publish_project();
        Ok(clip)
    }

    /// Like [`add_clip`](Self::add_clip), resolving the asset in the registry.
    pub fn add_clip_from_library(&mut self, track_id: Uuid, asset_id: Uuid, start_us: TimeUs) -> Result<Clip> {
        self.active()?;
        let asset = self.asset(asset_id)?.clone();
        self.add_clip(track_id, &asset, start_us)
    }

    pub fn remove_clip(&mut self, clip_id: Uuid) -> Result<Option<Clip>> {
        let removed = self.active_mut()?.remove_clip(clip_id);
        if removed.is_some() {
            tracing::debug!(clip = %clip_id, "Clip removed");
            self.prune_selection();
            self.publish_project();
        } else {
            tracing::debug!(clip = %clip_id, "remove_clip: no such clip");
        }
        Ok(removed)
    }

    pub fn update_clip(&mut self, clip_id: Uuid, patch: &ClipPatch) -> Result<bool> {
        let updated = self.active_mut()?.update_clip(clip_id, patch);
        if updated {
            self.publish_project();
        } else {
            tracing::debug!(clip = %clip_id, "update_clip: no such clip");
        }
        Ok(updated)
    }

    /// Move a clip to `track_id` at `start_us`. If either id is unknown the
    /// project is left exactly as it was.
    pub fn move_clip(&mut self, clip_id: Uuid, track_id: Uuid, start_us: TimeUs) -> Result<bool> {
        let moved = self.active_mut()?.move_clip(clip_id, track_id, start_us);
        if moved {
            tracing::debug!(clip = %clip_id, track = %track_id, start = %start_us, "Clip moved");
            self.publish_project();
        } else {
            tracing::debug!(clip = %clip_id, track = %track_id, "move_clip: unknown clip or track");
        }
        Ok(moved)
    }

    pub fn split_clip(&mut self, clip_id: Uuid, at_us: TimeUs) -> Result<Option<(Uuid, Uuid)>> {
        let split = self.active_mut()?.split_clip(clip_id, at_us);
        if let Some((left, right)) = split {
            tracing::debug!(%left, %right, at = %at_us, "Clip split");
            self.publish_project();
        } else {
            tracing::debug!(clip = %clip_id, at = %at_us, "split_clip: not inside clip");
        }
        Ok(split)
    }

    pub fn trim_clip_start(&mut self, clip_id: Uuid, start_us: TimeUs) -> Result<bool> {
        let min_len = self.config.min_clip_duration_us;
        let trimmed = self.active_mut()?.trim_clip_start(clip_id, start_us, min_len);
        if trimmed {
            self.publish_project();
        }
        Ok(trimmed)
    }

    /// Trim the clip's right edge, never past the end of its source material.
    pub fn trim_clip_end(&mut self, clip_id: Uuid, end_us: TimeUs) -> Result<bool> {
        let min_len = self.config.min_clip_duration_us;
        let source_duration = self
            .active()?
            .clip(clip_id)
            .and_then(|c| self.media.get(c.asset_id))
            .map(|a| a.duration_us);
        let trimmed = self.active_mut()?.trim_clip_end(clip_id, end_us, min_len, source_duration);
        if trimmed {
            self.publish_project();
        }
        Ok(trimmed)
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    pub fn select_clip(&mut self, clip_id: Uuid, multi: bool) -> Result<()> {
        if self.active()?.clip(clip_id).is_none() {
            tracing::debug!(clip = %clip_id, "select_clip: no such clip");
            return Ok(());
        }
        self.transport.select(clip_id, multi);
        self.publish_view();
        Ok(())
    }

    pub fn clear_selection(&mut self) -> Result<()> {
        self.active()?;
        self.transport.clear_selection();
        self.publish_view();
        Ok(())
    }

    /// Remove every selected clip. Returns how many were removed.
    pub fn delete_selected_clips(&mut self) -> Result<usize> {
        let selected = self.transport.timeline().selected_clips.clone();
        let project = self.active_mut()?;
        if selected.is_empty() {
            return Ok(0);
        }
        let removed = selected.iter().filter(|id| project.remove_clip(**id).is_some()).count();

        self.transport.clear_selection();
        tracing::debug!(removed, "Deleted selected clips");
        self.publish_project();
        self.publish_view();
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Playback
    // -----------------------------------------------------------------------

    pub fn play(&mut self) {
        self.transport.play();
        self.publish_view();
    }

    pub fn pause(&mut self) {
        self.transport.pause();
        self.publish_view();
    }

    pub fn stop(&mut self) {
        self.transport.stop();
        self.publish_view();
    }

    pub fn toggle_playback(&mut self) {
        self.transport.toggle_playback();
        self.publish_view();
    }

    pub fn seek(&mut self, time: TimeUs) {
        self.transport.seek(time);
        self.publish_view();
    }

    /// Seek to the time under a horizontal offset into the timeline content.
    pub fn seek_to_pixel(&mut self, x: f64) {
        let time = self.transport.pixels_to_time(x);
        self.seek(time);
    }

    pub fn step_frame(&mut self, forward: bool) -> Result<()> {
        let project = self.active()?;
        let (fps, duration) = (project.settings.fps, project.duration_us);
        self.transport.step_frame(forward, fps, duration);
        self.publish_view();
        Ok(())
    }

    pub fn seek_to_end(&mut self) -> Result<()> {
        let duration = self.active()?.duration_us;
        self.transport.seek_to_end(duration);
        self.publish_view();
        Ok(())
    }

    pub fn set_playback_rate(&mut self, rate: f64) {
        self.transport.set_playback_rate(rate);
        self.publish_view();
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.transport.set_volume(volume);
        self.publish_view();
    }

    pub fn toggle_mute(&mut self) {
        self.transport.toggle_mute();
        self.publish_view();
    }

    pub fn toggle_loop(&mut self) {
        self.transport.toggle_loop();
        self.publish_view();
    }

    // -----------------------------------------------------------------------
    // Timeline view
    // -----------------------------------------------------------------------

    pub fn set_zoom(&mut self, zoom: f64) {
        self.transport.set_zoom(zoom);
        self.publish_view();
    }

    pub fn zoom_in(&mut self) {
        self.transport.zoom_in(self.config.zoom_step);
        self.publish_view();
    }

    pub fn zoom_out(&mut self) {
        self.transport.zoom_out(self.config.zoom_step);
        self.publish_view();
    }

    /// Zoom so the whole project fits `width_px`. An empty project keeps
    /// the current zoom.
    pub fn fit_to_window(&mut self, width_px: f64) -> Result<bool> {
        let duration = self.active()?.duration_us;
        let fitted = self.transport.fit_to_window(width_px, duration);
        if fitted {
            self.publish_view();
        }
        Ok(fitted)
    }

    pub fn time_to_pixels(&self, time: TimeUs) -> f64 {
        self.transport.time_to_pixels(time)
    }

    pub fn pixels_to_time(&self, pixels: f64) -> TimeUs {
        self.transport.pixels_to_time(pixels)
    }

    /// Ruler ticks across the project at the current zoom.
    pub fn time_markers(&self) -> Result<Vec<TimeMarker>> {
        Ok(self.transport.time_markers(self.active()?.duration_us))
    }

    pub fn set_scroll_position(&mut self, position: f64) {
        self.transport.set_scroll_position(position);
        self.publish_view();
    }

    pub fn toggle_snap_to_grid(&mut self) {
        self.transport.toggle_snap_to_grid();
        self.publish_view();
    }

    pub fn set_grid_size(&mut self, grid: TimeUs) -> Result<()> {
        if !self.transport.set_grid_size(grid) {
            return Err(CoreError::InvalidOperation(format!("grid size must be positive, got {grid}")));
        }
        self.publish_view();
        Ok(())
    }

    pub fn set_viewport(&mut self, start: TimeUs, end: TimeUs) -> Result<()> {
        if !self.transport.set_viewport(start, end) {
            return Err(CoreError::InvalidOperation(format!("viewport start {start} is not before end {end}")));
        }
        self.publish_view();
        Ok(())
    }

    /// Grid position for a drag to `time`. Advisory only.
    pub fn snap_time(&self, time: TimeUs) -> TimeUs {
        self.transport.snap_time(time)
    }

    /// Nearest clip edge within the configured threshold, ignoring `exclude`.
    pub fn snap_to_clip_edges(&self, time: TimeUs, exclude: Option<Uuid>) -> TimeUs {
        let Some(project) = &self.project else {
            return time;
        };
        let points = snapping::collect_snap_points(project, exclude);
        snapping::find_snap_point(time, &points, self.config.snap_threshold_us)
    }

    // -----------------------------------------------------------------------
    // Media
    // -----------------------------------------------------------------------

    /// Register a source and start probing it.
    pub fn import_asset(&mut self, source: MediaSource) -> MediaAsset {
        let asset = self
            .media
            .add_asset(source, self.prober.as_ref(), self.config.image_duration_us);
        self.publish_assets();
        asset
    }

    /// Remove an asset from the registry. Clips referencing it stay put.
    pub fn remove_asset(&mut self, asset_id: Uuid) -> Result<MediaAsset> {
        let asset = self
            .media
            .remove_asset(asset_id, self.prober.as_ref())
            .ok_or(CoreError::AssetNotFound(asset_id))?;
        self.publish_assets();
        Ok(asset)
    }

    /// Apply finished probes without waiting.
    pub fn poll_probes(&mut self) -> ProbeReport {
        let report = self.media.poll_probes();
        if !report.is_empty() {
            self.publish_assets();
        }
        report
    }

    /// Wait for every outstanding probe.
    pub async fn settle_probes(&mut self) -> ProbeReport {
        let report = self.media.settle_probes().await;
        if !report.is_empty() {
            self.publish_assets();
        }
        report
    }

    // -----------------------------------------------------------------------
    // Export
    // -----------------------------------------------------------------------

    pub fn default_export_settings(&self) -> Result<ExportSettings> {
        Ok(ExportSettings::for_project(&self.active()?.settings))
    }

    /// The flat instruction list an export would use right now.
    pub fn export_clips(&self) -> Result<Vec<ExportClip>> {
        Ok(export::flatten(self.active()?, &self.media))
    }

    pub fn start_export(&self, settings: ExportSettings, transcoder: &dyn Transcoder) -> Result<ExportJob> {
        export::start(self.active()?, &self.media, settings, transcoder)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn active(&self) -> Result<&Project> {
        self.project.as_ref().ok_or(CoreError::NoActiveProject)
    }

    fn active_mut(&mut self) -> Result<&mut Project> {
        self.project.as_mut().ok_or(CoreError::NoActiveProject)
    }

    fn prune_selection(&mut self) {
        match &self.project {
            Some(project) => self.transport.retain_selection(|id| project.clip(*id).is_some()),
            None => self.transport.clear_selection(),
        }
        self.publish_view();
    }

    fn publish_project(&self) {
        self.bus.publish_project(self.project.as_ref());
    }

    fn publish_view(&self) {
        self.bus.publish_playback(self.transport.playback());
        self.bus.publish_timeline(self.transport.timeline());
    }

    fn publish_assets(&self) {
        self.bus.publish_assets(self.media.assets().to_vec());
    }
}
