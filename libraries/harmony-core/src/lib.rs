//! Harmony Core
//!
//! Platform-agnostic domain types, collaborator traits, and error handling
//! shared by every Harmony crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Song`, `SongId`, `Catalog`, `Activity`
//! - **Collaborator Traits**: `CatalogProvider`, `LikedSongsStore`, `ActivitySink`
//! - **Error Handling**: Unified `HarmonyError` and `Result` types
//!
//! Playback itself lives in `harmony-playback`; persistence backends live in
//! `harmony-storage`. Both only talk to each other through the traits here.
//!
//! # Example
//!
//! ```rust
//! use harmony_core::{Catalog, LikedSongIds, Song, SongId};
//!
//! let catalog = Catalog::new(vec![
//!     Song::new("1", "Bella Ciao", "Manu Pilas", "art/1.jpg", "music/song1.mp3"),
//!     Song::new("2", "Everything u are", "Hindia", "art/2.jpg", "music/song2.mp3"),
//! ]);
//!
//! assert_eq!(catalog.search("hindia").len(), 1);
//!
//! let mut liked = LikedSongIds::new();
//! liked.insert(SongId::from("1"));
//! assert_eq!(catalog.liked(&liked)[0].title, "Bella Ciao");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod provider;
pub mod types;

// Re-export commonly used types
pub use error::{HarmonyError, Result};
pub use provider::{ActivitySink, CatalogProvider, LikedSongsStore};
pub use types::{format_millis, Activity, ActivityKind, Catalog, LikedSongIds, Song, SongId};
