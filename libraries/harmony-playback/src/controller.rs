//! Playback controller - core orchestration
//!
//! Coordinates queue, shuffle/loop modes, seeking, the liked set, and the
//! audio engine's asynchronous resource lifecycle.

use crate::{
    engine::{AudioEngine, EngineEvent, EngineStatus, Generation, LoadOptions, LoadRequest, ResourceMetadata},
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    liked::LikedSongs,
    queue::Queue,
    shuffle,
    types::{PlaybackConfig, PlaybackSnapshot, PlaybackStatus},
};
use harmony_core::{LikedSongIds, Song, SongId};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

/// Central playback control
///
/// Single authority for "what plays, in what order, at what position":
/// - Queue and current index
/// - Shuffle and loop modes (mutually exclusive)
/// - Resource lifecycle (`Idle → Loading → Playing/Paused → Idle`)
/// - Seeking overlay with resume-after-seek
/// - Optimistic liked set
///
/// Every resource is tagged with a [`Generation`]. The held resource is always
/// released before the next one is requested, and engine events carrying any
/// other generation are discarded.
pub struct PlaybackController {
    // State
    status: PlaybackStatus,
    queue: Queue,
    position_ms: u64,
    duration_ms: u64,

    // Modes
    shuffled: bool,
    looping: bool,

    // Seeking
    is_seeking: bool,
    resume_after_seek: bool,
    seek_ready: bool,

    // Engine resource
    engine: Box<dyn AudioEngine>,
    resource: Option<Generation>,
    resource_looping: bool,
    last_generation: Generation,

    liked: LikedSongs,
    config: PlaybackConfig,
    rng: StdRng,

    // Event queue for UI synchronization
    pending_events: Vec<PlaybackEvent>,
}

impl PlaybackController {
    /// Create new playback controller
    pub fn new(engine: Box<dyn AudioEngine>, config: PlaybackConfig) -> Self {
        Self::with_rng(engine, config, StdRng::from_entropy())
    }

    /// Create a controller with a specific random source for shuffle
    pub fn with_rng(engine: Box<dyn AudioEngine>, config: PlaybackConfig, rng: StdRng) -> Self {
        let shuffled = config.shuffle;
        let looping = config.looping && !shuffled;

        Self {
            status: PlaybackStatus::Idle,
            queue: Queue::new(),
            position_ms: 0,
            duration_ms: config.placeholder_duration_ms,
            shuffled,
            looping,
            is_seeking: false,
            resume_after_seek: false,
            seek_ready: false,
            engine,
            resource: None,
            resource_looping: looping,
            last_generation: Generation::new(0),
            liked: LikedSongs::new(),
            config,
            rng,
            pending_events: Vec::new(),
        }
    }

    // ===== Song Selection =====

    /// Play `song`, optionally replacing the queue first
    ///
    /// With `new_queue`, the queue becomes that list and the cursor moves to
    /// `song` within it; without, `song` is looked up in the current queue.
    /// Either way a song that is not found is a `CatalogMismatch` and nothing
    /// changes.
    pub fn play(&mut self, song: &Song, new_queue: Option<Vec<Song>>) -> Result<()> {
        let previous_song_id = self.current_song_id();

        let index = match new_queue {
            Some(songs) => {
                let index = songs
                    .iter()
                    .position(|candidate| candidate.id == song.id)
                    .ok_or_else(|| PlaybackError::CatalogMismatch(song.id.clone()))?;
                self.queue.replace(songs);
                index
            }
            None => self
                .queue
                .position_of(&song.id)
                .ok_or_else(|| PlaybackError::CatalogMismatch(song.id.clone()))?,
        };

        self.load_index(index, previous_song_id)
    }

    /// Skip to the next song
    ///
    /// Round robin when not shuffled, otherwise a random song other than the
    /// current one. No-op on an empty queue.
    pub fn next(&mut self) -> Result<()> {
        let index = if self.shuffled {
            self.shuffled_index()
        } else {
            self.queue.next_index()
        };
        self.skip_to(index)
    }

    /// Go back to the previous song
    ///
    /// Round robin when not shuffled. Under shuffle there is no history:
    /// "previous" is another random song.
    pub fn previous(&mut self) -> Result<()> {
        let index = if self.shuffled {
            self.shuffled_index()
        } else {
            self.queue.previous_index()
        };
        self.skip_to(index)
    }

    fn skip_to(&mut self, index: Option<usize>) -> Result<()> {
        match index {
            Some(index) => {
                let previous_song_id = self.current_song_id();
                self.load_index(index, previous_song_id)
            }
            None => Ok(()),
        }
    }

    fn shuffled_index(&mut self) -> Option<usize> {
        let len = self.queue.len();
        let max_attempts = len
            .saturating_mul(self.config.shuffle_attempts_per_song)
            .max(1);
        shuffle::pick_index(&mut self.rng, len, self.queue.current_index(), max_attempts)
    }

    /// Release whatever is held and start loading the song at `index`
    fn load_index(&mut self, index: usize, previous_song_id: Option<SongId>) -> Result<()> {
        let Some(song) = self.queue.get(index).cloned() else {
            return Ok(());
        };

        self.release_resource();

        let generation = self.next_generation();
        self.queue.set_current(Some(index));
        self.position_ms = 0;
        self.duration_ms = self.config.placeholder_duration_ms;
        self.set_status(PlaybackStatus::Loading);
        self.emit(PlaybackEvent::SongChanged {
            song_id: song.id.clone(),
            previous_song_id,
        });

        let request = LoadRequest {
            generation,
            audio_ref: song.audio_ref.clone(),
            options: LoadOptions {
                autoplay: true,
                looping: self.looping,
            },
        };

        debug!(%generation, song_id = %song.id, "Requesting load");
        self.resource = Some(generation);
        self.resource_looping = self.looping;

        if let Err(e) = self.engine.load(request) {
            return Err(self.fail_load(e.to_string()));
        }

        Ok(())
    }

    /// Release the held resource (loaded or in flight) and go idle
    fn release_resource(&mut self) {
        if let Some(generation) = self.resource.take() {
            debug!(%generation, "Releasing resource");
            if let Err(e) = self.engine.unload(generation) {
                warn!(%generation, error = %e, "Failed to release resource");
            }
        }
        self.is_seeking = false;
        self.resume_after_seek = false;
        self.seek_ready = false;
        self.set_status(PlaybackStatus::Idle);
    }

    /// Abandon the current load: back to idle with no current song
    fn fail_load(&mut self, reason: String) -> PlaybackError {
        let song_id = self
            .current_song_id()
            .unwrap_or_else(|| SongId::new(String::new()));

        self.resource = None;
        self.queue.set_current(None);
        self.position_ms = 0;
        self.duration_ms = self.config.placeholder_duration_ms;
        self.seek_ready = false;
        self.is_seeking = false;
        self.resume_after_seek = false;
        self.set_status(PlaybackStatus::Idle);

        let error = PlaybackError::LoadFailure { song_id, reason };
        warn!(error = %error, "Load failed");
        self.emit((&error).into());
        error
    }

    fn next_generation(&mut self) -> Generation {
        self.last_generation = self.last_generation.next();
        self.last_generation
    }

    // ===== Playback Control =====

    /// Pause if playing, resume if paused
    ///
    /// No-op while idle or loading. During a seek only the resume-after-seek
    /// intent flips; the engine stays paused until the seek completes.
    pub fn toggle_play_pause(&mut self) -> Result<()> {
        if self.is_seeking && self.status.is_ready() {
            self.resume_after_seek = !self.resume_after_seek;
            return Ok(());
        }

        match self.status {
            PlaybackStatus::Playing => self.pause(),
            PlaybackStatus::Paused => self.resume(),
            PlaybackStatus::Idle | PlaybackStatus::Loading => Ok(()),
        }
    }

    /// Pause playback
    pub fn pause(&mut self) -> Result<()> {
        let Some(generation) = self.ready_resource() else {
            return Ok(());
        };

        if self.is_seeking {
            self.resume_after_seek = false;
            return Ok(());
        }
        if self.status != PlaybackStatus::Playing {
            return Ok(());
        }

        match self.engine.pause(generation) {
            Ok(()) => {
                self.set_status(PlaybackStatus::Paused);
                Ok(())
            }
            Err(e) => Err(self.engine_failure(e)),
        }
    }

    /// Resume playback
    pub fn resume(&mut self) -> Result<()> {
        let Some(generation) = self.ready_resource() else {
            return Ok(());
        };

        if self.is_seeking {
            self.resume_after_seek = true;
            return Ok(());
        }
        if self.status != PlaybackStatus::Paused {
            return Ok(());
        }

        match self.engine.play(generation) {
            Ok(()) => {
                self.set_status(PlaybackStatus::Playing);
                Ok(())
            }
            Err(e) => Err(self.engine_failure(e)),
        }
    }

    /// Stop playback
    ///
    /// Releases the resource and clears the current song, keeping the queue.
    pub fn stop(&mut self) {
        self.release_resource();
        self.queue.set_current(None);
        self.position_ms = 0;
        self.duration_ms = self.config.placeholder_duration_ms;
    }

    /// Engine request failed: not playing, error reported
    fn engine_failure(&mut self, error: PlaybackError) -> PlaybackError {
        warn!(error = %error, "Engine request failed");
        if self.status == PlaybackStatus::Playing {
            self.set_status(PlaybackStatus::Paused);
        }
        self.emit((&error).into());
        error
    }

    // ===== Shuffle & Loop =====

    /// Flip shuffle; enabling it clears loop
    ///
    /// Returns the new shuffle flag.
    pub fn toggle_shuffle(&mut self) -> bool {
        self.shuffled = !self.shuffled;
        if self.shuffled && self.looping {
            self.looping = false;
        }
        self.emit_modes_changed();
        self.shuffled
    }

    /// Flip loop; enabling it clears shuffle
    ///
    /// The new flag is pushed to a ready resource (best effort: a failure is
    /// logged and the flag is kept). A resource still loading picks it up when
    /// the load completes. Returns the new loop flag.
    pub fn toggle_loop(&mut self) -> bool {
        self.looping = !self.looping;
        if self.looping && self.shuffled {
            self.shuffled = false;
        }

        if let Some(generation) = self.ready_resource() {
            self.push_looping(generation);
        }

        self.emit_modes_changed();
        self.looping
    }

    fn push_looping(&mut self, generation: Generation) {
        match self.engine.set_looping(generation, self.looping) {
            Ok(()) => self.resource_looping = self.looping,
            Err(e) => warn!(%generation, error = %e, "Failed to update looping"),
        }
    }

    // ===== Seek =====

    /// Start a user scrub
    ///
    /// Pauses the engine if playing and remembers to resume afterwards.
    /// Position notifications are ignored until the seek completes. No-op
    /// unless a resource is ready for seeking.
    pub fn begin_seek(&mut self) -> Result<()> {
        let Some(generation) = self.ready_resource() else {
            return Ok(());
        };
        if !self.seek_ready || self.is_seeking {
            return Ok(());
        }

        self.resume_after_seek = self.status == PlaybackStatus::Playing;
        if self.resume_after_seek {
            if let Err(e) = self.engine.pause(generation) {
                warn!(%generation, error = %e, "Failed to pause for seek");
            }
            self.set_status(PlaybackStatus::Paused);
        }
        self.is_seeking = true;
        Ok(())
    }

    /// Finish a scrub at `target_ms`
    ///
    /// Targets outside `0..=duration` are rejected with `InvalidArgument` and
    /// leave every field untouched (including the seeking flag). Negative
    /// targets are rejected in every state; the upper bound needs a loaded
    /// duration. Also usable without `begin_seek` as a direct seek.
    pub fn complete_seek(&mut self, target_ms: i64) -> Result<()> {
        let Ok(target) = u64::try_from(target_ms) else {
            return Err(PlaybackError::invalid_argument(format!(
                "seek target {target_ms}ms is negative"
            )));
        };

        let Some(generation) = self.ready_resource() else {
            return Ok(());
        };
        if !self.seek_ready {
            return Ok(());
        }

        let duration_ms = self.duration_ms;
        if target > duration_ms {
            return Err(PlaybackError::invalid_argument(format!(
                "seek target {target_ms}ms outside 0..={duration_ms}ms"
            )));
        }

        self.position_ms = target;
        if let Err(e) = self.engine.seek(generation, target) {
            warn!(%generation, error = %e, "Seek failed");
        }

        self.finish_seek(generation)
    }

    /// Abandon a scrub without moving the play head
    pub fn cancel_seek(&mut self) -> Result<()> {
        let Some(generation) = self.ready_resource() else {
            return Ok(());
        };
        if !self.is_seeking {
            return Ok(());
        }
        self.finish_seek(generation)
    }

    fn finish_seek(&mut self, generation: Generation) -> Result<()> {
        let resume = self.is_seeking && self.resume_after_seek;
        self.is_seeking = false;
        self.resume_after_seek = false;
        self.emit_position();

        if resume {
            match self.engine.play(generation) {
                Ok(()) => self.set_status(PlaybackStatus::Playing),
                Err(e) => return Err(self.engine_failure(e)),
            }
        }
        Ok(())
    }

    // ===== Liked Songs =====

    /// Flip whether `song_id` is liked
    ///
    /// Applied immediately; the service persists the new set in the
    /// background. Returns whether the song is liked afterwards.
    pub fn toggle_like(&mut self, song_id: &SongId) -> Result<bool> {
        let liked = self.liked.toggle(song_id)?;
        debug!(%song_id, liked, "Toggled like");
        self.emit(PlaybackEvent::LikedChanged {
            song_id: song_id.clone(),
            liked,
        });
        Ok(liked)
    }

    /// Install the liked set loaded from persistence
    ///
    /// Likes toggled before it arrived are applied on top. Returns whether
    /// any were, in which case the merged set is due for saving.
    pub fn set_liked_ids(&mut self, ids: LikedSongIds) -> bool {
        let count = ids.len();
        let merged = self.liked.load(ids);
        debug!(count, merged, "Liked songs loaded");
        merged
    }

    /// Take the liked set if it changed since the last call
    ///
    /// Held back until [`set_liked_ids`](Self::set_liked_ids) has run once.
    pub fn take_liked_for_persist(&mut self) -> Option<LikedSongIds> {
        self.liked.take_dirty()
    }

    /// Report that saving the liked set failed
    ///
    /// The optimistic in-memory set is kept; there is no retry.
    pub fn report_persistence_failure(&mut self, reason: impl Into<String>) {
        let error = PlaybackError::PersistenceFailure(reason.into());
        warn!(error = %error, "Liked songs not saved");
        self.emit((&error).into());
    }

    // ===== Engine Notifications =====

    /// Apply a notification from the audio engine
    ///
    /// Events for any generation other than the held resource are stale and
    /// dropped.
    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        if Some(event.generation()) != self.resource {
            debug!(generation = %event.generation(), "Discarding stale engine event");
            return;
        }

        match event {
            EngineEvent::Loaded {
                generation,
                metadata,
            } => self.on_loaded(generation, metadata),
            EngineEvent::LoadFailed { reason, .. } => {
                if self.status == PlaybackStatus::Loading {
                    let _ = self.fail_load(reason);
                }
            }
            EngineEvent::Status { status, .. } => self.on_status(status),
        }
    }

    fn on_loaded(&mut self, generation: Generation, metadata: ResourceMetadata) {
        if self.status != PlaybackStatus::Loading {
            debug!(%generation, "Duplicate load completion ignored");
            return;
        }

        if let Some(duration_ms) = metadata.duration_ms.filter(|&d| d > 0) {
            self.duration_ms = duration_ms;
        }
        self.seek_ready = true;

        if self.resource_looping != self.looping {
            self.push_looping(generation);
        }

        self.set_status(PlaybackStatus::Playing);

        if let Some(song_id) = self.current_song_id() {
            info!(%generation, %song_id, "Playback started");
            self.emit(PlaybackEvent::PlaybackStarted { song_id });
        }
    }

    fn on_status(&mut self, status: EngineStatus) {
        if !self.status.is_ready() {
            return;
        }

        if !status.loaded {
            // The engine dropped the resource; nothing is left to drive
            if let Some(reason) = status.error {
                let error = PlaybackError::Engine(reason);
                warn!(error = %error, "Resource unloaded by engine");
                self.emit((&error).into());
            } else {
                debug!("Resource unloaded by engine");
            }
            self.release_resource();
            self.position_ms = 0;
            self.duration_ms = 0;
            self.emit_position();
            return;
        }

        self.duration_ms = status
            .duration_ms
            .filter(|&d| d > 0)
            .unwrap_or(self.config.placeholder_duration_ms);
        if !self.is_seeking {
            self.position_ms = status.position_ms;
        }
        self.seek_ready = true;
        self.emit_position();

        if status.did_just_finish && !self.looping {
            if let Some(song_id) = self.current_song_id() {
                self.emit(PlaybackEvent::SongFinished { song_id });
            }
            if let Err(e) = self.next() {
                debug!(error = %e, "Auto-advance failed");
            }
        }
    }

    // ===== State Queries =====

    /// Current resource lifecycle status
    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    /// Whether audio is playing
    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    /// Whether a load is in flight
    pub fn is_loading(&self) -> bool {
        self.status == PlaybackStatus::Loading
    }

    /// Song under the cursor
    pub fn current_song(&self) -> Option<&Song> {
        self.queue.current()
    }

    /// Cursor position
    pub fn current_index(&self) -> Option<usize> {
        self.queue.current_index()
    }

    /// Active queue
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Shuffle flag
    pub fn is_shuffled(&self) -> bool {
        self.shuffled
    }

    /// Loop flag
    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Whether a scrub is in progress
    pub fn is_seeking(&self) -> bool {
        self.is_seeking
    }

    /// Whether the seek bar should accept input
    pub fn can_seek(&self) -> bool {
        self.seek_ready && self.status.is_ready()
    }

    /// Playback position in ms
    pub fn position_ms(&self) -> u64 {
        self.position_ms
    }

    /// Song duration in ms
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Liked song IDs
    pub fn liked_ids(&self) -> &LikedSongIds {
        self.liked.ids()
    }

    /// Whether `song_id` is liked
    pub fn is_liked(&self, song_id: &SongId) -> bool {
        self.liked.contains(song_id)
    }

    /// Generation of the held resource, if any
    pub fn resource(&self) -> Option<Generation> {
        self.resource
    }

    /// Read-only copy of the state for presentation
    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            current_song: self.queue.current().cloned(),
            current_index: self.queue.current_index(),
            queue_len: self.queue.len(),
            status: self.status,
            is_shuffled: self.shuffled,
            is_looping: self.looping,
            is_seeking: self.is_seeking,
            can_seek: self.can_seek(),
            position_ms: self.position_ms,
            duration_ms: self.duration_ms,
            liked_song_ids: self.liked.ids().clone(),
        }
    }

    // ===== Events =====

    /// Drain all pending events
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    fn ready_resource(&self) -> Option<Generation> {
        self.resource.filter(|_| self.status.is_ready())
    }

    fn current_song_id(&self) -> Option<SongId> {
        self.queue.current().map(|song| song.id.clone())
    }

    fn set_status(&mut self, status: PlaybackStatus) {
        if self.status != status {
            debug!(from = ?self.status, to = ?status, "Playback status changed");
            self.status = status;
            self.emit(PlaybackEvent::StateChanged { status });
        }
    }

    fn emit_modes_changed(&mut self) {
        self.emit(PlaybackEvent::ModesChanged {
            shuffled: self.shuffled,
            looping: self.looping,
        });
    }

    fn emit_position(&mut self) {
        self.emit(PlaybackEvent::PositionUpdate {
            position_ms: self.position_ms,
            duration_ms: self.duration_ms,
        });
    }

    fn emit(&mut self, event: PlaybackEvent) {
        self.pending_events.push(event);
    }
}
