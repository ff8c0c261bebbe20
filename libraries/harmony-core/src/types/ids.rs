/// ID types for Harmony entities
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Song identifier
///
/// Opaque string assigned by the catalog. Ordered so that liked sets
/// serialize deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(String);

impl SongId {
    /// Create a new song ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the ID is empty (or only whitespace)
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SongId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SongId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Set of liked song IDs, persisted by a `LikedSongsStore`
pub type LikedSongIds = BTreeSet<SongId>;
