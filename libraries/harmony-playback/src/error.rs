//! Error types for playback control

use harmony_core::SongId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Playback errors
///
/// None of these are fatal: every failure leaves the controller in a
/// well-defined resting state.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The audio engine could not load or decode the song's audio
    #[error("Failed to load song {song_id}: {reason}")]
    LoadFailure { song_id: SongId, reason: String },

    /// Rejected locally (bad seek target, missing song id)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Selected song is absent from the queue it was played from
    #[error("Song {0} is not part of the queue")]
    CatalogMismatch(SongId),

    /// Saving the liked set failed
    #[error("Failed to persist liked songs: {0}")]
    PersistenceFailure(String),

    /// The audio engine rejected a play/pause/seek request
    #[error("Audio engine error: {0}")]
    Engine(String),

    /// The player service is no longer running
    #[error("Player service stopped")]
    ServiceStopped,
}

impl PlaybackError {
    /// Create an engine error
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Category used when reporting the error to the presentation layer
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlaybackError::LoadFailure { .. } => ErrorKind::LoadFailure,
            PlaybackError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            PlaybackError::CatalogMismatch(_) => ErrorKind::CatalogMismatch,
            PlaybackError::PersistenceFailure(_) => ErrorKind::PersistenceFailure,
            PlaybackError::Engine(_) | PlaybackError::ServiceStopped => ErrorKind::Engine,
        }
    }
}

/// Error category carried by `PlaybackEvent::Error`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Audio could not be loaded; playback returned to idle
    LoadFailure,
    /// Request rejected without touching state
    InvalidArgument,
    /// Song not found in the supplied queue
    CatalogMismatch,
    /// Liked set could not be saved; in-memory value kept
    PersistenceFailure,
    /// Engine request failed; playback is not playing
    Engine,
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
