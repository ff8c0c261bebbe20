//! Simulated audio engine
//!
//! Stands in for a platform player: loads take a fixed delay, a clock task
//! per resource advances the play head and reports status, and references
//! starting with `missing:` fail to load.
//!
//! Like a platform player, every pass over the end of a track is reported
//! with `did_just_finish`, looping or not. The controller decides whether
//! that advances the queue, so a loop flag left on the resource after
//! shuffle clears loop does not stall playback.

use crate::config::EngineSettings;
use harmony_playback::{
    AudioEngine, EngineNotifier, EngineStatus, Generation, LoadRequest, ResourceMetadata, Result,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Audio references with this prefix fail to load
pub const MISSING_PREFIX: &str = "missing:";

/// Playback state of one simulated resource
#[derive(Debug, Clone, Copy, Default)]
struct Track {
    loaded: bool,
    playing: bool,
    looping: bool,
    position_ms: u64,
    duration_ms: u64,
}

type Tracks = Arc<Mutex<HashMap<Generation, Track>>>;

/// Timer-driven engine for demos and tests
pub struct SimulatedEngine {
    settings: EngineSettings,
    notifier: EngineNotifier,
    tracks: Tracks,
    clocks: HashMap<Generation, JoinHandle<()>>,
}

impl SimulatedEngine {
    /// Create an engine reporting through `notifier`
    pub fn new(settings: EngineSettings, notifier: EngineNotifier) -> Self {
        Self {
            settings,
            notifier,
            tracks: Arc::new(Mutex::new(HashMap::new())),
            clocks: HashMap::new(),
        }
    }

    /// Number of resources currently held (loading or loaded)
    pub fn resource_count(&self) -> usize {
        self.tracks.lock().map(|tracks| tracks.len()).unwrap_or(0)
    }

    fn update(&self, resource: Generation, apply: impl FnOnce(&mut Track)) {
        if let Ok(mut tracks) = self.tracks.lock() {
            if let Some(track) = tracks.get_mut(&resource) {
                apply(track);
            }
        }
    }
}

impl AudioEngine for SimulatedEngine {
    fn load(&mut self, request: LoadRequest) -> Result<()> {
        let generation = request.generation;
        let duration_ms = self.settings.song_duration_ms;

        if let Ok(mut tracks) = self.tracks.lock() {
            tracks.insert(
                generation,
                Track {
                    playing: request.options.autoplay,
                    looping: request.options.looping,
                    duration_ms,
                    ..Track::default()
                },
            );
        }

        let clock = tokio::spawn(run_clock(
            request,
            self.settings,
            self.notifier.clone(),
            Arc::clone(&self.tracks),
        ));
        self.clocks.insert(generation, clock);
        Ok(())
    }

    fn play(&mut self, resource: Generation) -> Result<()> {
        self.update(resource, |track| {
            if track.position_ms >= track.duration_ms {
                track.position_ms = 0;
            }
            track.playing = true;
        });
        Ok(())
    }

    fn pause(&mut self, resource: Generation) -> Result<()> {
        self.update(resource, |track| track.playing = false);
        Ok(())
    }

    fn seek(&mut self, resource: Generation, position_ms: u64) -> Result<()> {
        self.update(resource, |track| {
            track.position_ms = position_ms.min(track.duration_ms);
        });
        Ok(())
    }

    fn set_looping(&mut self, resource: Generation, looping: bool) -> Result<()> {
        self.update(resource, |track| track.looping = looping);
        Ok(())
    }

    fn unload(&mut self, resource: Generation) -> Result<()> {
        if let Some(clock) = self.clocks.remove(&resource) {
            clock.abort();
        }
        if let Ok(mut tracks) = self.tracks.lock() {
            tracks.remove(&resource);
        }
        debug!(%resource, "Simulated resource released");
        Ok(())
    }
}

impl Drop for SimulatedEngine {
    fn drop(&mut self) {
        for (_, clock) in self.clocks.drain() {
            clock.abort();
        }
    }
}

/// Load delay, then one status notification per tick until released
async fn run_clock(request: LoadRequest, settings: EngineSettings, notifier: EngineNotifier, tracks: Tracks) {
    let generation = request.generation;
    tokio::time::sleep(Duration::from_millis(settings.load_delay_ms)).await;

    if request.audio_ref.starts_with(MISSING_PREFIX) {
        if let Ok(mut tracks) = tracks.lock() {
            tracks.remove(&generation);
        }
        notifier.load_failed(generation, format!("{} not found", request.audio_ref));
        return;
    }

    let duration_ms = {
        let Ok(mut tracks) = tracks.lock() else {
            return;
        };
        let Some(track) = tracks.get_mut(&generation) else {
            return;
        };
        track.loaded = true;
        track.duration_ms
    };
    notifier.loaded(
        generation,
        ResourceMetadata {
            duration_ms: Some(duration_ms),
        },
    );

    let mut ticker = tokio::time::interval(Duration::from_millis(settings.tick_ms));
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let status = {
            let Ok(mut tracks) = tracks.lock() else {
                return;
            };
            let Some(track) = tracks.get_mut(&generation) else {
                return;
            };
            if !track.playing {
                continue;
            }
            advance(track, settings.tick_ms)
        };

        trace!(%generation, position_ms = status.position_ms, "Simulated tick");
        notifier.status(generation, status);
        if notifier.is_closed() {
            return;
        }
    }
}

/// Move the play head one tick forward and describe the result
///
/// Reaching the end reports `did_just_finish` whether or not the track
/// loops; a looping track wraps to the start and keeps playing.
fn advance(track: &mut Track, tick_ms: u64) -> EngineStatus {
    let mut did_just_finish = false;
    track.position_ms = track.position_ms.saturating_add(tick_ms);

    if track.position_ms >= track.duration_ms {
        did_just_finish = true;
        if track.looping {
            track.position_ms = 0;
        } else {
            track.position_ms = track.duration_ms;
            track.playing = false;
        }
    }

    EngineStatus {
        loaded: track.loaded,
        position_ms: track.position_ms,
        duration_ms: Some(track.duration_ms),
        is_playing: track.playing,
        did_just_finish,
        error: None,
    }
}
