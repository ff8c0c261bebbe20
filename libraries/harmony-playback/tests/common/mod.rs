//! Shared test doubles for playback integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use harmony_core::{Activity, ActivitySink, HarmonyError, LikedSongIds, LikedSongsStore, Song, SongId};
use harmony_playback::{
    notification_channel, AudioEngine, EngineEvents, EngineNotifier, EngineStatus, Generation,
    LoadRequest, PlaybackError, ResourceMetadata, Result,
};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Duration every fake resource reports
pub const FAKE_DURATION_MS: u64 = 10_000;

/// Audio references with this prefix fail to load
pub const MISSING_PREFIX: &str = "missing:";

// ===== Songs =====

pub fn song(id: &str) -> Song {
    Song::new(id, format!("Song {id}"), "Test Artist", "", format!("/music/{id}.mp3"))
}

pub fn missing_song(id: &str) -> Song {
    Song::new(id, format!("Song {id}"), "Test Artist", "", format!("{MISSING_PREFIX}{id}"))
}

pub fn songs(count: usize) -> Vec<Song> {
    (0..count).map(|i| song(&format!("s{i}"))).collect()
}

// ===== Engine =====

#[derive(Debug, Default)]
struct EngineState {
    loads: Vec<LoadRequest>,
    live: BTreeSet<Generation>,
    seeks: Vec<(Generation, u64)>,
}

/// Engine that completes loads immediately through its notifier
///
/// Loads of `missing:` references fail; everything else loads with
/// [`FAKE_DURATION_MS`].
pub struct FakeEngine {
    notifier: EngineNotifier,
    state: Arc<Mutex<EngineState>>,
}

/// Test-side view of a [`FakeEngine`]
#[derive(Clone)]
pub struct EngineTracker {
    notifier: EngineNotifier,
    state: Arc<Mutex<EngineState>>,
}

impl FakeEngine {
    pub fn new() -> (Self, EngineTracker, EngineEvents) {
        let (notifier, events) = notification_channel();
        let state = Arc::new(Mutex::new(EngineState::default()));
        let engine = Self {
            notifier: notifier.clone(),
            state: Arc::clone(&state),
        };
        (engine, EngineTracker { notifier, state }, events)
    }
}

impl AudioEngine for FakeEngine {
    fn load(&mut self, request: LoadRequest) -> Result<()> {
        let generation = request.generation;
        let missing = request.audio_ref.starts_with(MISSING_PREFIX);
        {
            let mut state = self.state.lock().unwrap();
            state.loads.push(request);
            if !missing {
                state.live.insert(generation);
            }
        }

        if missing {
            self.notifier.load_failed(generation, "file not found");
        } else {
            self.notifier.loaded(
                generation,
                ResourceMetadata {
                    duration_ms: Some(FAKE_DURATION_MS),
                },
            );
        }
        Ok(())
    }

    fn play(&mut self, resource: Generation) -> Result<()> {
        self.require_live(resource)
    }

    fn pause(&mut self, resource: Generation) -> Result<()> {
        self.require_live(resource)
    }

    fn seek(&mut self, resource: Generation, position_ms: u64) -> Result<()> {
        self.require_live(resource)?;
        self.state.lock().unwrap().seeks.push((resource, position_ms));
        Ok(())
    }

    fn set_looping(&mut self, resource: Generation, _looping: bool) -> Result<()> {
        self.require_live(resource)
    }

    fn unload(&mut self, resource: Generation) -> Result<()> {
        self.state.lock().unwrap().live.remove(&resource);
        Ok(())
    }
}

impl FakeEngine {
    fn require_live(&self, resource: Generation) -> Result<()> {
        if self.state.lock().unwrap().live.contains(&resource) {
            Ok(())
        } else {
            Err(PlaybackError::engine(format!("no resource {resource}")))
        }
    }
}

impl EngineTracker {
    /// Resources loaded and not yet released
    pub fn live_resources(&self) -> usize {
        self.state.lock().unwrap().live.len()
    }

    /// Number of load requests seen
    pub fn load_count(&self) -> usize {
        self.state.lock().unwrap().loads.len()
    }

    pub fn last_load(&self) -> Option<LoadRequest> {
        self.state.lock().unwrap().loads.last().cloned()
    }

    pub fn seeks(&self) -> Vec<(Generation, u64)> {
        self.state.lock().unwrap().seeks.clone()
    }

    /// Report a position update for the most recent load
    pub fn report_position(&self, position_ms: u64) {
        if let Some(request) = self.last_load() {
            self.notifier.status(
                request.generation,
                EngineStatus {
                    loaded: true,
                    position_ms,
                    duration_ms: Some(FAKE_DURATION_MS),
                    is_playing: true,
                    ..Default::default()
                },
            );
        }
    }

    /// Report that the most recent load reached its natural end
    pub fn finish(&self) {
        if let Some(request) = self.last_load() {
            self.notifier.status(
                request.generation,
                EngineStatus {
                    loaded: true,
                    position_ms: FAKE_DURATION_MS,
                    duration_ms: Some(FAKE_DURATION_MS),
                    is_playing: false,
                    did_just_finish: true,
                    error: None,
                },
            );
        }
    }
}

// ===== Persistence =====

/// In-memory liked store with switchable save failures
#[derive(Default)]
pub struct MemoryLikedStore {
    ids: Mutex<LikedSongIds>,
    fail_saves: AtomicBool,
    saves: AtomicUsize,
    load_gate: Option<Arc<Notify>>,
}

impl MemoryLikedStore {
    /// Store whose initial load blocks until the returned gate is notified
    pub fn with_gated_load(ids: &[&str]) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let mut store = Self::with_ids(ids);
        store.load_gate = Some(gate.clone());
        (store, gate)
    }

    pub fn with_ids(ids: &[&str]) -> Self {
        let store = Self::default();
        *store.ids.lock().unwrap() = ids.iter().map(|id| SongId::from(*id)).collect();
        store
    }

    pub fn failing() -> Self {
        let store = Self::default();
        store.fail_saves.store(true, Ordering::SeqCst);
        store
    }

    pub fn stored(&self) -> LikedSongIds {
        self.ids.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LikedSongsStore for MemoryLikedStore {
    async fn load_liked_ids(&self) -> harmony_core::Result<LikedSongIds> {
        if let Some(gate) = &self.load_gate {
            gate.notified().await;
        }
        Ok(self.stored())
    }

    async fn save_liked_ids(&self, ids: &LikedSongIds) -> harmony_core::Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(HarmonyError::storage("disk full"));
        }
        *self.ids.lock().unwrap() = ids.clone();
        Ok(())
    }
}

/// Activity sink that keeps everything in memory
#[derive(Default)]
pub struct MemoryActivitySink {
    recorded: Mutex<Vec<Activity>>,
}

impl MemoryActivitySink {
    pub fn recorded(&self) -> Vec<Activity> {
        self.recorded.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActivitySink for MemoryActivitySink {
    async fn record(&self, activity: Activity) -> harmony_core::Result<()> {
        self.recorded.lock().unwrap().push(activity);
        Ok(())
    }
}
