//! Platform-agnostic audio engine seam
//!
//! Abstracts the platform player (native mobile player, desktop decoder,
//! a simulated clock in tests). Every request is non-blocking: the `Result`
//! only reports immediate rejection, completions arrive later as
//! [`EngineEvent`]s on the notification channel.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;

/// Monotonically increasing tag for one load request
///
/// The generation doubles as the resource identifier: the engine addresses
/// the resource it loads for a request by that request's generation, so an
/// in-flight load can be released before it ever completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Generation(u64);

impl Generation {
    /// Create a generation from its raw value
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw value
    pub fn value(self) -> u64 {
        self.0
    }

    /// The generation that follows this one
    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Options applied when a resource is loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Start playing as soon as the resource is ready
    pub autoplay: bool,

    /// Loop the resource at end of stream
    pub looping: bool,
}

/// A request to load one song's audio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    /// Tag identifying the request and the resulting resource
    pub generation: Generation,

    /// Audio URL or local reference from the song
    pub audio_ref: String,

    /// Playback options
    pub options: LoadOptions,
}

/// Metadata known once a resource has loaded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMetadata {
    /// Duration in ms, if the container reports one
    pub duration_ms: Option<u64>,
}

/// Periodic status notification for a loaded resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatus {
    /// Whether the resource is still loaded
    pub loaded: bool,

    /// Current position in ms
    pub position_ms: u64,

    /// Duration in ms (absent until metadata is known)
    pub duration_ms: Option<u64>,

    /// Whether audio is currently audible
    pub is_playing: bool,

    /// Set once when the resource reaches its natural end
    pub did_just_finish: bool,

    /// Engine error, set when the resource was unloaded due to a failure
    pub error: Option<String>,
}

/// Notification from the engine to the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Load request completed; the resource is ready
    Loaded {
        generation: Generation,
        metadata: ResourceMetadata,
    },

    /// Load request failed
    LoadFailed {
        generation: Generation,
        reason: String,
    },

    /// Status update for a loaded resource
    Status {
        generation: Generation,
        status: EngineStatus,
    },
}

impl EngineEvent {
    /// Generation the event belongs to
    pub fn generation(&self) -> Generation {
        match self {
            EngineEvent::Loaded { generation, .. }
            | EngineEvent::LoadFailed { generation, .. }
            | EngineEvent::Status { generation, .. } => *generation,
        }
    }
}

/// Receiving half of the notification channel, owned by the player service
pub type EngineEvents = mpsc::UnboundedReceiver<EngineEvent>;

/// Sending half of the notification channel, held by the engine
///
/// Sends never block. A closed channel means the player is gone and is
/// silently ignored.
#[derive(Debug, Clone)]
pub struct EngineNotifier {
    tx: mpsc::UnboundedSender<EngineEvent>,
}

impl EngineNotifier {
    /// Report a completed load
    pub fn loaded(&self, generation: Generation, metadata: ResourceMetadata) {
        self.send(EngineEvent::Loaded {
            generation,
            metadata,
        });
    }

    /// Report a failed load
    pub fn load_failed(&self, generation: Generation, reason: impl Into<String>) {
        self.send(EngineEvent::LoadFailed {
            generation,
            reason: reason.into(),
        });
    }

    /// Report a status update
    pub fn status(&self, generation: Generation, status: EngineStatus) {
        self.send(EngineEvent::Status { generation, status });
    }

    /// Send a raw event
    pub fn send(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }

    /// Whether the receiving side has gone away
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Create the engine → controller notification channel
pub fn notification_channel() -> (EngineNotifier, EngineEvents) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EngineNotifier { tx }, rx)
}

/// Platform audio engine
///
/// Implementors load resources asynchronously and report through an
/// [`EngineNotifier`]. Requests against an unknown or already released
/// resource must be harmless no-ops.
pub trait AudioEngine: Send {
    /// Start loading a resource; completion is reported as `Loaded` or
    /// `LoadFailed` with the request's generation
    fn load(&mut self, request: LoadRequest) -> Result<()>;

    /// Resume playback of a loaded resource
    fn play(&mut self, resource: Generation) -> Result<()>;

    /// Pause playback of a loaded resource
    fn pause(&mut self, resource: Generation) -> Result<()>;

    /// Move the play head
    fn seek(&mut self, resource: Generation, position_ms: u64) -> Result<()>;

    /// Toggle end-of-stream looping
    fn set_looping(&mut self, resource: Generation, looping: bool) -> Result<()>;

    /// Release a loaded or still-loading resource
    fn unload(&mut self, resource: Generation) -> Result<()>;
}

/// Engine request recorded by [`RecordingEngine`]
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Load(LoadRequest),
    Play(Generation),
    Pause(Generation),
    Seek(Generation, u64),
    SetLooping(Generation, bool),
    Unload(Generation),
}

/// Engine that records requests and never completes on its own
///
/// Tests drive completions by feeding `EngineEvent`s to the controller.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct RecordingEngine {
    calls: std::sync::Arc<std::sync::Mutex<Vec<EngineCall>>>,
    failing: std::sync::Arc<std::sync::Mutex<std::collections::HashSet<&'static str>>>,
}

#[cfg(test)]
impl RecordingEngine {
    /// Create new recording engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the named request ("load", "play", "pause", "seek", "set_looping",
    /// "unload") fail from now on
    pub fn fail(&self, request: &'static str) {
        self.failing.lock().unwrap().insert(request);
    }

    /// Stop failing the named request
    pub fn recover(&self, request: &'static str) {
        self.failing.lock().unwrap().remove(request);
    }

    /// All recorded calls
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Generation of the most recent load request
    pub fn last_load(&self) -> Option<Generation> {
        self.calls().iter().rev().find_map(|call| match call {
            EngineCall::Load(request) => Some(request.generation),
            _ => None,
        })
    }

    /// Most recent load request
    pub fn last_load_request(&self) -> Option<LoadRequest> {
        self.calls().into_iter().rev().find_map(|call| match call {
            EngineCall::Load(request) => Some(request),
            _ => None,
        })
    }

    fn record(&self, name: &'static str, call: EngineCall) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(name) {
            return Err(crate::error::PlaybackError::engine(format!("{name} failed")));
        }
        Ok(())
    }
}

#[cfg(test)]
impl AudioEngine for RecordingEngine {
    fn load(&mut self, request: LoadRequest) -> Result<()> {
        self.record("load", EngineCall::Load(request))
    }

    fn play(&mut self, resource: Generation) -> Result<()> {
        self.record("play", EngineCall::Play(resource))
    }

    fn pause(&mut self, resource: Generation) -> Result<()> {
        self.record("pause", EngineCall::Pause(resource))
    }

    fn seek(&mut self, resource: Generation, position_ms: u64) -> Result<()> {
        self.record("seek", EngineCall::Seek(resource, position_ms))
    }

    fn set_looping(&mut self, resource: Generation, looping: bool) -> Result<()> {
        self.record("set_looping", EngineCall::SetLooping(resource, looping))
    }

    fn unload(&mut self, resource: Generation) -> Result<()> {
        self.record("unload", EngineCall::Unload(resource))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generations_increase() {
        let first = Generation::new(1);
        assert!(first.next() > first);
        assert_eq!(first.next().value(), 2);
    }

    #[tokio::test]
    async fn notifier_delivers_in_order() {
        let (notifier, mut events) = notification_channel();
        let generation = Generation::new(7);

        notifier.loaded(generation, ResourceMetadata { duration_ms: Some(1_000) });
        notifier.status(generation, EngineStatus::default());

        let first = events.recv().await.unwrap();
        assert!(matches!(first, EngineEvent::Loaded { .. }));
        assert_eq!(first.generation(), generation);
        assert!(matches!(events.recv().await.unwrap(), EngineEvent::Status { .. }));
    }

    #[test]
    fn notifier_ignores_closed_channel() {
        let (notifier, events) = notification_channel();
        drop(events);
        assert!(notifier.is_closed());
        notifier.load_failed(Generation::new(1), "gone");
    }
}
