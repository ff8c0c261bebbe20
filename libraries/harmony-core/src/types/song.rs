/// Song domain type
use crate::types::SongId;
use serde::{Deserialize, Serialize};

/// A playable song
///
/// Immutable once loaded into a catalog. `audio_ref` is whatever the audio
/// engine understands (URL, file path, bundled asset name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Unique song identifier
    pub id: SongId,

    /// Song title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Artwork URL or local reference
    pub artwork_ref: String,

    /// Playable audio URL or local reference
    pub audio_ref: String,
}

impl Song {
    /// Create a new song
    pub fn new(
        id: impl Into<SongId>,
        title: impl Into<String>,
        artist: impl Into<String>,
        artwork_ref: impl Into<String>,
        audio_ref: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            artwork_ref: artwork_ref.into(),
            audio_ref: audio_ref.into(),
        }
    }

    /// Whether the song matches a lowercase search query by title or artist
    pub(crate) fn matches(&self, query_lower: &str) -> bool {
        self.title.to_lowercase().contains(query_lower)
            || self.artist.to_lowercase().contains(query_lower)
    }
}
