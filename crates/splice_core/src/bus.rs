//! Change notifications for presentation layers.
//!
//! Each stream is a `watch` channel carrying a full snapshot. A new receiver
//! sees the current value straight away and is woken for every later change.

use crate::types::*;
use tokio::sync::watch;

pub struct ChangeBus {
    project: watch::Sender<Option<Project>>,
    playback: watch::Sender<PlaybackState>,
    timeline: watch::Sender<TimelineState>,
    assets: watch::Sender<Vec<MediaAsset>>,
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeBus {
    pub fn new() -> Self {
        Self {
            project: watch::Sender::new(None),
            playback: watch::Sender::new(PlaybackState::default()),
            timeline: watch::Sender::new(TimelineState::default()),
            assets: watch::Sender::new(Vec::new()),
        }
    }

    pub fn subscribe_project(&self) -> watch::Receiver<Option<Project>> {
        self.project.subscribe()
    }

    pub fn subscribe_playback(&self) -> watch::Receiver<PlaybackState> {
        self.playback.subscribe()
    }

    pub fn subscribe_timeline(&self) -> watch::Receiver<TimelineState> {
        self.timeline.subscribe()
    }

    pub fn subscribe_assets(&self) -> watch::Receiver<Vec<MediaAsset>> {
        self.assets.subscribe()
    }

    /// Publish a project snapshot. Returns whether subscribers were notified.
    pub fn publish_project(&self, project: Option<&Project>) -> bool {
        publish(&self.project, project.cloned())
    }

    pub fn publish_playback(&self, state: &PlaybackState) -> bool {
        publish(&self.playback, *state)
    }

    pub fn publish_timeline(&self, state: &TimelineState) -> bool {
        publish(&self.timeline, state.clone())
    }

    pub fn publish_assets(&self, assets: Vec<MediaAsset>) -> bool {
        publish(&self.assets, assets)
    }
}

/// Replace the channel value only when it differs, so receivers are not woken
/// for no-op commands. Works with or without live receivers.
fn publish<T: PartialEq>(tx: &watch::Sender<T>, value: T) -> bool {
    tx.send_if_modified(|current| {
        if *current == value {
            return false;
        }
        *current = value;
        true
    })
}
