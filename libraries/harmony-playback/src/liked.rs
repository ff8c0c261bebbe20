//! Liked-song set
//!
//! Optimistic in-memory copy of the persisted set. Every toggle marks the set
//! dirty; the service takes the dirty set and saves it in the background.
//!
//! Nothing is handed out for saving until the persisted set has been loaded.
//! Toggles made before then are remembered and applied on top of it, so a
//! save never replaces stored likes with a partial set.

use crate::error::{PlaybackError, Result};
use harmony_core::{LikedSongIds, SongId};
use std::collections::BTreeMap;

/// In-memory liked set with a pending-save marker
#[derive(Debug, Clone, Default)]
pub struct LikedSongs {
    ids: LikedSongIds,
    dirty: bool,
    loaded: bool,
    // Latest liked state per song toggled before `load`
    early_toggles: BTreeMap<SongId, bool>,
}

impl LikedSongs {
    /// Create new empty liked set
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`
    ///
    /// Returns whether the song is liked afterwards.
    pub fn toggle(&mut self, id: &SongId) -> Result<bool> {
        if id.is_empty() {
            return Err(PlaybackError::invalid_argument("song id is empty"));
        }

        let liked = if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        };
        self.dirty = true;
        if !self.loaded {
            self.early_toggles.insert(id.clone(), liked);
        }
        Ok(liked)
    }

    /// Whether `id` is liked
    pub fn contains(&self, id: &SongId) -> bool {
        self.ids.contains(id)
    }

    /// Current set
    pub fn ids(&self) -> &LikedSongIds {
        &self.ids
    }

    /// Install the persisted set
    ///
    /// Toggles made before the load win over the stored membership of the
    /// same songs. Returns whether such toggles were merged, leaving the
    /// merged set due for saving.
    pub fn load(&mut self, ids: LikedSongIds) -> bool {
        self.ids = ids;
        self.loaded = true;

        let early_toggles = std::mem::take(&mut self.early_toggles);
        let merged = !early_toggles.is_empty();
        for (id, liked) in early_toggles {
            if liked {
                self.ids.insert(id);
            } else {
                self.ids.remove(&id);
            }
        }
        self.dirty = self.dirty || merged;
        merged
    }

    /// Take the set for saving if it changed since the last take
    ///
    /// Always `None` before [`load`](Self::load).
    pub fn take_dirty(&mut self) -> Option<LikedSongIds> {
        if self.dirty && self.loaded {
            self.dirty = false;
            Some(self.ids.clone())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_twice_restores_membership() {
        let mut liked = LikedSongs::new();
        let id = SongId::from("x");

        assert!(liked.toggle(&id).unwrap());
        assert!(liked.contains(&id));
        assert!(!liked.toggle(&id).unwrap());
        assert!(liked.ids().is_empty());
    }

    #[test]
    fn empty_id_is_rejected_without_change() {
        let mut liked = LikedSongs::new();
        let err = liked.toggle(&SongId::from("")).unwrap_err();
        assert!(matches!(err, PlaybackError::InvalidArgument(_)));
        assert!(liked.take_dirty().is_none());
    }

    #[test]
    fn dirty_set_is_taken_once() {
        let mut liked = LikedSongs::new();
        liked.load(LikedSongIds::new());
        liked.toggle(&SongId::from("a")).unwrap();
        liked.toggle(&SongId::from("b")).unwrap();

        let taken = liked.take_dirty().unwrap();
        assert_eq!(taken.len(), 2);
        assert!(liked.take_dirty().is_none());
    }

    #[test]
    fn load_is_clean() {
        let mut liked = LikedSongs::new();
        assert!(!liked.load(ids(&["a"])));
        assert!(liked.contains(&SongId::from("a")));
        assert!(liked.take_dirty().is_none());
    }

    #[test]
    fn early_toggles_apply_on_top_of_loaded_set() {
        let mut liked = LikedSongs::new();
        liked.toggle(&SongId::from("x")).unwrap();
        liked.toggle(&SongId::from("b")).unwrap();
        liked.toggle(&SongId::from("b")).unwrap();
        assert!(liked.take_dirty().is_none());

        assert!(liked.load(ids(&["a", "b"])));

        assert_eq!(liked.ids(), &ids(&["a", "x"]));
        assert_eq!(liked.take_dirty(), Some(ids(&["a", "x"])));
    }

    fn ids(values: &[&str]) -> LikedSongIds {
        values.iter().map(|v| SongId::from(*v)).collect()
    }
}
