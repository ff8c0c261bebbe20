//! Core types for playback control

use harmony_core::{format_millis, LikedSongIds, Song};
use serde::{Deserialize, Serialize};

/// Lifecycle of the currently held audio resource
///
/// `Idle → Loading → Playing ⇄ Paused → Idle`. Seeking is a separate flag
/// layered over `Playing`/`Paused`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// No resource held
    Idle,

    /// Load requested, waiting for the engine
    Loading,

    /// Resource ready and playing
    Playing,

    /// Resource ready and paused
    Paused,
}

impl PlaybackStatus {
    /// Whether a loaded resource is held (playing or paused)
    pub fn is_ready(self) -> bool {
        matches!(self, PlaybackStatus::Playing | PlaybackStatus::Paused)
    }
}

/// Configuration for the playback controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Shuffle re-sampling budget, per queue entry (default: 2)
    ///
    /// A shuffled skip draws at most `queue_len * shuffle_attempts_per_song`
    /// times looking for a song other than the current one.
    pub shuffle_attempts_per_song: usize,

    /// Duration reported before metadata arrives, in ms (default: 1)
    pub placeholder_duration_ms: u64,

    /// Initial shuffle flag (default: false)
    pub shuffle: bool,

    /// Initial loop flag (default: false). Ignored if `shuffle` is also set.
    pub looping: bool,

    /// Capacity of the service command channel (default: 64)
    pub command_capacity: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            shuffle_attempts_per_song: 2,
            placeholder_duration_ms: 1,
            shuffle: false,
            looping: false,
            command_capacity: 64,
        }
    }
}

/// Read-only view of playback state for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    /// Song at the current index, if any
    pub current_song: Option<Song>,

    /// Current queue position
    pub current_index: Option<usize>,

    /// Number of songs in the queue
    pub queue_len: usize,

    /// Resource lifecycle
    pub status: PlaybackStatus,

    /// Shuffle flag
    pub is_shuffled: bool,

    /// Loop flag
    pub is_looping: bool,

    /// Whether a user scrub is in progress
    pub is_seeking: bool,

    /// Whether the seek bar should accept input
    pub can_seek: bool,

    /// Playback position in ms
    pub position_ms: u64,

    /// Song duration in ms
    pub duration_ms: u64,

    /// Liked song IDs
    pub liked_song_ids: LikedSongIds,
}

impl PlaybackSnapshot {
    /// Whether audio is playing
    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    /// Whether a load is in flight
    pub fn is_loading(&self) -> bool {
        self.status == PlaybackStatus::Loading
    }

    /// Whether the current song is liked
    pub fn is_current_liked(&self) -> bool {
        self.current_song
            .as_ref()
            .is_some_and(|song| self.liked_song_ids.contains(&song.id))
    }

    /// Progress through the current song, clamped to 0.0-1.0
    pub fn progress(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        (self.position_ms as f64 / self.duration_ms as f64).clamp(0.0, 1.0)
    }

    /// Position as `m:ss`
    pub fn position_label(&self) -> String {
        format_millis(self.position_ms)
    }

    /// Duration as `m:ss`
    pub fn duration_label(&self) -> String {
        format_millis(self.duration_ms)
    }
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self {
            current_song: None,
            current_index: None,
            queue_len: 0,
            status: PlaybackStatus::Idle,
            is_shuffled: false,
            is_looping: false,
            is_seeking: false,
            can_seek: false,
            position_ms: 0,
            duration_ms: 0,
            liked_song_ids: LikedSongIds::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlaybackConfig::default();
        assert_eq!(config.shuffle_attempts_per_song, 2);
        assert_eq!(config.placeholder_duration_ms, 1);
        assert!(!config.shuffle);
        assert!(!config.looping);
    }

    #[test]
    fn progress_is_zero_safe() {
        let snapshot = PlaybackSnapshot::default();
        assert_eq!(snapshot.progress(), 0.0);

        let snapshot = PlaybackSnapshot {
            position_ms: 2_500,
            duration_ms: 10_000,
            ..Default::default()
        };
        assert_eq!(snapshot.progress(), 0.25);
        assert_eq!(snapshot.position_label(), "0:02");
        assert_eq!(snapshot.duration_label(), "0:10");
    }

    #[test]
    fn progress_clamps_overshoot() {
        let snapshot = PlaybackSnapshot {
            position_ms: 1_200,
            duration_ms: 1,
            ..Default::default()
        };
        assert_eq!(snapshot.progress(), 1.0);
    }
}
