//! Harmony - Playback Control
//!
//! Platform-agnostic playback state machine for Harmony.
//!
//! This crate provides:
//! - Play a song from a queue, skip next/previous (round robin or shuffled)
//! - Play/pause, stop
//! - Shuffle and loop modes (mutually exclusive)
//! - Seek with pause-during-scrub and resume-after-seek
//! - Optimistic liked-song toggling with background persistence
//! - Generation-tagged resource lifecycle: one audio resource at a time,
//!   stale engine completions ignored
//!
//! # Architecture
//!
//! `harmony-playback` knows nothing about audio decoding or storage:
//! - Audio output is an [`AudioEngine`] reporting back over an
//!   [`EngineNotifier`]
//! - Liked-song persistence and activity recording are `harmony-core` traits
//!
//! [`PlaybackController`] is the synchronous state machine. [`PlayerService`]
//! owns it on a tokio task and serializes commands, engine notifications and
//! background results; the presentation layer talks to it through a
//! [`PlayerHandle`].
//!
//! # Example: Controller
//!
//! ```rust,no_run
//! use harmony_playback::{
//!     AudioEngine, Generation, LoadRequest, PlaybackConfig, PlaybackController, Result,
//! };
//! use harmony_core::Song;
//!
//! struct SilentEngine;
//!
//! impl AudioEngine for SilentEngine {
//!     fn load(&mut self, _request: LoadRequest) -> Result<()> { Ok(()) }
//!     fn play(&mut self, _resource: Generation) -> Result<()> { Ok(()) }
//!     fn pause(&mut self, _resource: Generation) -> Result<()> { Ok(()) }
//!     fn seek(&mut self, _resource: Generation, _position_ms: u64) -> Result<()> { Ok(()) }
//!     fn set_looping(&mut self, _resource: Generation, _looping: bool) -> Result<()> { Ok(()) }
//!     fn unload(&mut self, _resource: Generation) -> Result<()> { Ok(()) }
//! }
//!
//! let songs = vec![
//!     Song::new("1", "Bella Ciao", "Manu Pilas", "", "bella-ciao.mp3"),
//!     Song::new("2", "Last Night on Earth", "Green Day", "", "last-night.mp3"),
//! ];
//!
//! let mut controller = PlaybackController::new(Box::new(SilentEngine), PlaybackConfig::default());
//! controller.play(&songs[0], Some(songs.clone())).ok();
//! controller.toggle_loop();
//!
//! for event in controller.drain_events() {
//!     println!("{event:?}");
//! }
//! ```

mod controller;
mod engine;
mod error;
mod events;
mod liked;
mod queue;
mod service;
mod shuffle;
pub mod types;

// Public exports
pub use controller::PlaybackController;
pub use engine::{
    notification_channel, AudioEngine, EngineEvent, EngineEvents, EngineNotifier, EngineStatus,
    Generation, LoadOptions, LoadRequest, ResourceMetadata,
};
pub use error::{ErrorKind, PlaybackError, Result};
pub use events::PlaybackEvent;
pub use queue::Queue;
pub use service::{PlayerHandle, PlayerService};
pub use types::{PlaybackConfig, PlaybackSnapshot, PlaybackStatus};
