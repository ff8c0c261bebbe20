/// Listening activity recorded for the social feed
use crate::types::SongId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// A song started playing
    Playing,
}

impl ActivityKind {
    /// Stable string form used by persistence backends
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Playing => "playing",
        }
    }
}

/// A single activity entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Song the activity refers to
    pub song_id: SongId,

    /// What happened
    pub kind: ActivityKind,

    /// When it happened
    pub occurred_at: DateTime<Utc>,
}

impl Activity {
    /// A "now playing" activity stamped with the current time
    pub fn playing(song_id: SongId) -> Self {
        Self {
            song_id,
            kind: ActivityKind::Playing,
            occurred_at: Utc::now(),
        }
    }
}
