//! Playback queue
//!
//! The ordered song list currently governing next/previous traversal, plus
//! the index of the song the controller is bound to.

use harmony_core::{Song, SongId};

/// Ordered queue with a cursor
///
/// ```text
///   0: Song A
/// > 1: Song B   (current)
///   2: Song C
/// ```
///
/// Invariant: `current`, when set, is always `< songs.len()`.
#[derive(Debug, Clone, Default)]
pub struct Queue {
    /// Songs in traversal order
    songs: Vec<Song>,

    /// Cursor into `songs`
    current: Option<usize>,
}

impl Queue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue contents, clearing the cursor
    pub fn replace(&mut self, songs: Vec<Song>) {
        self.songs = songs;
        self.current = None;
    }

    /// Number of songs
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Song at an index
    pub fn get(&self, index: usize) -> Option<&Song> {
        self.songs.get(index)
    }

    /// All songs in order
    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    /// Index of a song by ID
    pub fn position_of(&self, id: &SongId) -> Option<usize> {
        self.songs.iter().position(|song| &song.id == id)
    }

    /// Cursor position
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Song under the cursor
    pub fn current(&self) -> Option<&Song> {
        self.current.and_then(|index| self.songs.get(index))
    }

    /// Move the cursor
    ///
    /// Out-of-range indices clear the cursor rather than leave it dangling.
    pub fn set_current(&mut self, index: Option<usize>) {
        self.current = index.filter(|&i| i < self.songs.len());
    }

    /// Round-robin successor of the cursor
    ///
    /// Wraps from the last song to the first; starts at the first song when
    /// there is no cursor. `None` only for an empty queue.
    pub fn next_index(&self) -> Option<usize> {
        let len = self.songs.len();
        if len == 0 {
            return None;
        }
        Some(self.current.map_or(0, |i| (i + 1) % len))
    }

    /// Round-robin predecessor of the cursor
    ///
    /// Wraps from the first song to the last; starts at the last song when
    /// there is no cursor. `None` only for an empty queue.
    pub fn previous_index(&self) -> Option<usize> {
        let len = self.songs.len();
        if len == 0 {
            return None;
        }
        Some(self.current.map_or(len - 1, |i| (i + len - 1) % len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_song(id: &str) -> Song {
        Song::new(id, format!("Song {id}"), "Test Artist", "", format!("/music/{id}.mp3"))
    }

    fn abc() -> Queue {
        let mut queue = Queue::new();
        queue.replace(vec![
            create_test_song("a"),
            create_test_song("b"),
            create_test_song("c"),
        ]);
        queue
    }

    #[test]
    fn empty_queue_has_no_successor() {
        let queue = Queue::new();
        assert_eq!(queue.next_index(), None);
        assert_eq!(queue.previous_index(), None);
    }

    #[test]
    fn next_wraps_to_start() {
        let mut queue = abc();
        queue.set_current(Some(2));
        assert_eq!(queue.next_index(), Some(0));
    }

    #[test]
    fn previous_wraps_to_end() {
        let mut queue = abc();
        queue.set_current(Some(0));
        assert_eq!(queue.previous_index(), Some(2));
    }

    #[test]
    fn no_cursor_starts_at_edges() {
        let queue = abc();
        assert_eq!(queue.next_index(), Some(0));
        assert_eq!(queue.previous_index(), Some(2));
    }

    #[test]
    fn out_of_range_cursor_is_cleared() {
        let mut queue = abc();
        queue.set_current(Some(3));
        assert_eq!(queue.current_index(), None);
        assert!(queue.current().is_none());
    }

    #[test]
    fn replace_clears_cursor() {
        let mut queue = abc();
        queue.set_current(Some(1));
        queue.replace(vec![create_test_song("x")]);
        assert_eq!(queue.current_index(), None);
        assert_eq!(queue.position_of(&SongId::from("x")), Some(0));
    }
}
