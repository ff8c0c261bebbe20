//! Playback Events
//!
//! Event-based communication for UI synchronization. Events are emitted at
//! key points:
//! - Status changes (loading/playing/paused/idle)
//! - Song changes (on every selection or automatic advance)
//! - Position updates (each engine status notification)
//! - Errors that the presentation layer should surface

use crate::error::{ErrorKind, PlaybackError};
use crate::types::PlaybackStatus;
use harmony_core::SongId;
use serde::{Deserialize, Serialize};

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Resource lifecycle changed
    StateChanged {
        /// The new status
        status: PlaybackStatus,
    },

    /// The current song changed (load requested)
    SongChanged {
        /// ID of the new current song
        song_id: SongId,
        /// ID of the previous song (if any)
        previous_song_id: Option<SongId>,
    },

    /// The current song finished loading and started playing
    PlaybackStarted {
        /// ID of the song
        song_id: SongId,
    },

    /// Position update from the engine
    PositionUpdate {
        /// Current playback position
        position_ms: u64,
        /// Total song duration
        duration_ms: u64,
    },

    /// Song reached its natural end
    SongFinished {
        /// ID of the finished song
        song_id: SongId,
    },

    /// Shuffle/loop flags changed
    ModesChanged {
        /// Shuffle flag
        shuffled: bool,
        /// Loop flag
        looping: bool,
    },

    /// A song was liked or unliked
    LikedChanged {
        /// ID of the song
        song_id: SongId,
        /// Whether it is liked now
        liked: bool,
    },

    /// Something failed; show a transient alert
    Error {
        /// Error category
        kind: ErrorKind,
        /// Human-readable message
        message: String,
    },
}

impl From<&PlaybackError> for PlaybackEvent {
    fn from(error: &PlaybackError) -> Self {
        PlaybackEvent::Error {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}
