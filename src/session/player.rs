use serde::{Deserialize, Serialize};

use crate::library::TrackStore;

/// Volume, loop and resume-position preferences.
///
/// `is_playing` is runtime only and never persisted.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerState {
    pub volume: f32,
    pub previous_volume: f32,
    pub is_looping: bool,
    /// Seconds into the current track.
    pub playback_position: f64,
    #[serde(skip)]
    pub is_playing: bool,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            volume: 1.0,
            previous_volume: 1.0,
            is_looping: false,
            playback_position: 0.0,
            is_playing: false,
        }
    }
}

/// What the transport should do once a track finishes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TrackEnd {
    /// Loop is on: seek to zero and keep playing.
    Restart,
    /// The cursor moved to the next track in the working set.
    Advanced,
    /// Nothing to advance to.
    Stopped,
}

impl PlayerState {
    /// Set the volume, clamped to `0.0..=1.0`. A non-zero volume is remembered
    /// for unmuting.
    pub fn set_volume(&mut self, volume: f32) {
        let volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
        self.volume = volume;
        if volume > 0.0 {
            self.previous_volume = volume;
        }
    }

    /// Mute, or restore the last audible volume (half volume if none).
    pub fn toggle_mute(&mut self) {
        if self.volume > 0.0 {
            self.previous_volume = self.volume;
            self.volume = 0.0;
        } else if self.previous_volume > 0.0 {
            self.volume = self.previous_volume;
        } else {
            self.volume = 0.5;
        }
    }

    pub fn is_muted(&self) -> bool {
        self.volume == 0.0
    }

    pub fn toggle_loop(&mut self) {
        self.is_looping = !self.is_looping;
    }

    pub fn set_is_playing(&mut self, playing: bool) {
        self.is_playing = playing;
    }

    pub fn set_playback_position(&mut self, seconds: f64) {
        self.playback_position = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
    }

    /// Handle the transport's "ended" notification.
    pub fn on_track_ended(&mut self, tracks: &mut TrackStore) -> TrackEnd {
        self.playback_position = 0.0;
        if self.is_looping {
            return TrackEnd::Restart;
        }
        if tracks.play_next() {
            TrackEnd::Advanced
        } else {
            self.is_playing = false;
            TrackEnd::Stopped
        }
    }
}
