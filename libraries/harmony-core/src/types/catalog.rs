/// Ordered song catalog
use crate::types::{LikedSongIds, Song, SongId};
use serde::{Deserialize, Serialize};

/// Ordered list of songs available for selection
///
/// The catalog is independent of the playback queue: screens pick songs (and
/// usually a slice of the catalog as the new queue) from here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    songs: Vec<Song>,
}

impl Catalog {
    /// Create a catalog from an ordered list of songs
    pub fn new(songs: Vec<Song>) -> Self {
        Self { songs }
    }

    /// All songs in catalog order
    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    /// Consume the catalog, returning its songs
    pub fn into_songs(self) -> Vec<Song> {
        self.songs
    }

    /// Number of songs
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Look up a song by ID
    pub fn get(&self, id: &SongId) -> Option<&Song> {
        self.songs.iter().find(|song| &song.id == id)
    }

    /// Position of a song in catalog order
    pub fn position_of(&self, id: &SongId) -> Option<usize> {
        self.songs.iter().position(|song| &song.id == id)
    }

    /// Case-insensitive substring search over title and artist
    ///
    /// A blank query matches every song.
    pub fn search(&self, query: &str) -> Vec<Song> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.songs.clone();
        }

        self.songs
            .iter()
            .filter(|song| song.matches(&query))
            .cloned()
            .collect()
    }

    /// Liked songs, in catalog order
    pub fn liked(&self, liked: &LikedSongIds) -> Vec<Song> {
        self.songs
            .iter()
            .filter(|song| liked.contains(&song.id))
            .cloned()
            .collect()
    }
}

impl From<Vec<Song>> for Catalog {
    fn from(songs: Vec<Song>) -> Self {
        Self::new(songs)
    }
}
