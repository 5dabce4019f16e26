//! Transport and timeline view state: play/pause, playhead, volume, zoom,
//! scroll, grid and selection.
//!
//! Horizontal positions are in pixels: one second spans
//! [`PIXELS_PER_SECOND`] pixels at zoom 1, and `scroll_position` uses the
//! same unit.
//!
//! None of this is part of the project. The playhead exists twice, once in
//! [`PlaybackState`] and once in [`TimelineState`]; every method here that
//! moves one moves the other.

use crate::snapping;
use crate::types::*;
use uuid::Uuid;

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;
pub const PIXELS_PER_SECOND: f64 = 50.0;

/// A labelled tick on the time ruler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeMarker {
    pub time_us: TimeUs,
    pub position_px: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transport {
    playback: PlaybackState,
    timeline: TimelineState,
}

impl Transport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub fn timeline(&self) -> &TimelineState {
        &self.timeline
    }

    // -----------------------------------------------------------------------
    // Playback
    // -----------------------------------------------------------------------

    pub fn play(&mut self) {
        self.playback.is_playing = true;
        tracing::debug!(time = %self.playback.current_time_us, rate = self.playback.playback_rate, "Playback started");
    }

    pub fn pause(&mut self) {
        self.playback.is_playing = false;
        tracing::debug!(time = %self.playback.current_time_us, "Playback paused");
    }

    /// Pause and return the playhead to zero.
    pub fn stop(&mut self) {
        self.playback.is_playing = false;
        self.set_time(TimeUs::ZERO);
        tracing::debug!("Playback stopped");
    }

    pub fn toggle_playback(&mut self) {
        if self.playback.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Move the playhead. The time is taken as given, without clamping.
    pub fn seek(&mut self, time: TimeUs) {
        self.set_time(time);
        tracing::debug!(time = %time, "Seeked");
    }

    /// Move one frame forward or back, staying within `[0, duration]`.
    pub fn step_frame(&mut self, forward: bool, fps: f64, duration: TimeUs) {
        let frame = TimeUs::frame(fps);
        let current = self.playback.current_time_us;
        let target = if forward { current + frame } else { current - frame };
        self.seek(target.clamp(TimeUs::ZERO, duration.max(TimeUs::ZERO)));
    }

    pub fn seek_to_end(&mut self, duration: TimeUs) {
        self.seek(duration);
    }

    pub fn set_playback_rate(&mut self, rate: f64) {
        self.playback.playback_rate = rate;
        tracing::debug!(rate, "Playback rate set");
    }

    /// Set the volume, clamped to `[0, 1]`. NaN counts as silence.
    pub fn set_volume(&mut self, volume: f64) {
        self.playback.volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
    }

    pub fn toggle_mute(&mut self) {
        self.playback.muted = !self.playback.muted;
    }

    pub fn toggle_loop(&mut self) {
        self.playback.looping = !self.playback.looping;
        tracing::debug!(looping = self.playback.looping, "Loop toggled");
    }

    fn set_time(&mut self, time: TimeUs) {
        self.playback.current_time_us = time;
        self.timeline.playhead_us = time;
    }

    // -----------------------------------------------------------------------
    // Timeline view
    // -----------------------------------------------------------------------

    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_nan() {
            return;
        }
        self.timeline.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn zoom_in(&mut self, step: f64) {
        self.set_zoom(self.timeline.zoom * step);
    }

    pub fn zoom_out(&mut self, step: f64) {
        if step > 0.0 {
            self.set_zoom(self.timeline.zoom / step);
        }
    }

    /// Zoom so that `duration` exactly fills `width_px`, within the zoom
    /// limits. Returns false (and changes nothing) if either is not positive.
    pub fn fit_to_window(&mut self, width_px: f64, duration: TimeUs) -> bool {
        if duration <= TimeUs::ZERO || width_px.is_nan() || width_px <= 0.0 {
            return false;
        }
        self.set_zoom(width_px / (duration.as_seconds() * PIXELS_PER_SECOND));
        tracing::debug!(zoom = self.timeline.zoom, width_px, "Fit to window");
        true
    }

    pub fn time_to_pixels(&self, time: TimeUs) -> f64 {
        time.as_seconds() * self.pixels_per_second()
    }

    /// Offsets left of the origin map to zero.
    pub fn pixels_to_time(&self, pixels: f64) -> TimeUs {
        TimeUs::from_seconds(pixels.max(0.0) / self.pixels_per_second())
    }

    /// Spacing between ruler ticks; coarser as the view zooms out.
    pub fn ruler_interval(&self) -> TimeUs {
        let zoom = self.timeline.zoom;
        let secs = if zoom > 2.0 {
            1.0
        } else if zoom > 1.0 {
            5.0
        } else if zoom > 0.5 {
            10.0
        } else {
            30.0
        };
        TimeUs::from_seconds(secs)
    }

    /// Ruler ticks from zero up to and including `duration`.
    pub fn time_markers(&self, duration: TimeUs) -> Vec<TimeMarker> {
        let interval = self.ruler_interval();
        let mut markers = vec![];
        let mut time = TimeUs::ZERO;
        while time <= duration {
            markers.push(TimeMarker {
                time_us: time,
                position_px: self.time_to_pixels(time),
            });
            match time.checked_add(interval) {
                Some(next) => time = next,
                None => break,
            }
        }
        markers
    }

    fn pixels_per_second(&self) -> f64 {
        self.timeline.zoom * PIXELS_PER_SECOND
    }

    pub fn set_scroll_position(&mut self, position: f64) {
        self.timeline.scroll_position = position.max(0.0);
    }

    pub fn toggle_snap_to_grid(&mut self) {
        self.timeline.snap_to_grid = !self.timeline.snap_to_grid;
    }

    /// Returns false (and changes nothing) for a non-positive grid.
    pub fn set_grid_size(&mut self, grid: TimeUs) -> bool {
        if grid <= TimeUs::ZERO {
            return false;
        }
        self.timeline.grid_size_us = grid;
        true
    }

    /// Returns false (and changes nothing) unless `start < end`.
    pub fn set_viewport(&mut self, start: TimeUs, end: TimeUs) -> bool {
        if start >= end {
            return false;
        }
        self.timeline.viewport = Viewport {
            start_us: start,
            end_us: end,
        };
        true
    }

    /// Where a drag to `time` would land: on the grid when snapping is on,
    /// otherwise unchanged.
    pub fn snap_time(&self, time: TimeUs) -> TimeUs {
        if self.timeline.snap_to_grid {
            snapping::quantize(time, self.timeline.grid_size_us)
        } else {
            time
        }
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// With `multi`, toggle the clip in the selection; otherwise make it the
    /// only selected clip.
    pub fn select(&mut self, clip_id: Uuid, multi: bool) {
        let selected = &mut self.timeline.selected_clips;
        if !multi {
            selected.clear();
            selected.push(clip_id);
        } else if let Some(pos) = selected.iter().position(|id| *id == clip_id) {
            selected.remove(pos);
        } else {
            selected.push(clip_id);
        }
    }

    pub fn clear_selection(&mut self) {
        self.timeline.selected_clips.clear();
    }

    /// Drop selected ids that no longer satisfy `keep`.
    pub fn retain_selection(&mut self, keep: impl Fn(&Uuid) -> bool) {
        self.timeline.selected_clips.retain(|id| keep(id));
    }
}
