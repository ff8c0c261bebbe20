//! Player service and presentation handle
//!
//! [`PlayerService`] owns the [`PlaybackController`] and is the only place it
//! is mutated. User commands, engine notifications and background results
//! are serialized through one `select!` loop; after each one the service
//! publishes a fresh [`PlaybackSnapshot`] and forwards [`PlaybackEvent`]s.
//!
//! Liked-song persistence and activity recording run on background workers
//! and never block the loop.

use crate::{
    controller::PlaybackController,
    engine::{AudioEngine, EngineEvents},
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    types::{PlaybackConfig, PlaybackSnapshot},
};
use harmony_core::{Activity, ActivitySink, HarmonyError, LikedSongIds, LikedSongsStore, Song, SongId};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Capacity of the event broadcast channel
const EVENT_CAPACITY: usize = 256;

/// Commands sent from [`PlayerHandle`] to the service loop
#[derive(Debug)]
enum PlayerCommand {
    Play {
        song: Song,
        queue: Option<Vec<Song>>,
        reply: oneshot::Sender<Result<()>>,
    },
    TogglePlayPause(oneshot::Sender<Result<()>>),
    Pause(oneshot::Sender<Result<()>>),
    Resume(oneshot::Sender<Result<()>>),
    Stop(oneshot::Sender<()>),
    Next(oneshot::Sender<Result<()>>),
    Previous(oneshot::Sender<Result<()>>),
    ToggleShuffle(oneshot::Sender<bool>),
    ToggleLoop(oneshot::Sender<bool>),
    BeginSeek(oneshot::Sender<Result<()>>),
    CompleteSeek {
        target_ms: i64,
        reply: oneshot::Sender<Result<()>>,
    },
    CancelSeek(oneshot::Sender<Result<()>>),
    ToggleLike {
        song_id: SongId,
        reply: oneshot::Sender<Result<bool>>,
    },
    Shutdown(oneshot::Sender<()>),
}

/// Results from background tasks
#[derive(Debug)]
enum Background {
    LikedLoaded(std::result::Result<LikedSongIds, HarmonyError>),
    SaveFailed(String),
}

/// Background workers started by [`PlayerService::run`]
struct Workers {
    liked_load: JoinHandle<()>,
    liked_saves: watch::Sender<Option<LikedSongIds>>,
    activities: Option<mpsc::UnboundedSender<Activity>>,
    handles: Vec<JoinHandle<()>>,
}

/// Async owner of the playback controller
pub struct PlayerService {
    controller: PlaybackController,
    commands: mpsc::Receiver<PlayerCommand>,
    engine_events: EngineEvents,
    background_tx: mpsc::UnboundedSender<Background>,
    background_rx: mpsc::UnboundedReceiver<Background>,
    liked_store: Arc<dyn LikedSongsStore>,
    activity_sink: Option<Arc<dyn ActivitySink>>,
    snapshots: watch::Sender<PlaybackSnapshot>,
    events: broadcast::Sender<PlaybackEvent>,
}

impl PlayerService {
    /// Create a service around `engine` and the handle that drives it
    ///
    /// `engine_events` must be the receiving side of the notification channel
    /// whose notifier the engine reports through.
    pub fn new(
        engine: Box<dyn AudioEngine>,
        engine_events: EngineEvents,
        liked_store: Arc<dyn LikedSongsStore>,
        config: PlaybackConfig,
    ) -> (Self, PlayerHandle) {
        let capacity = config.command_capacity.max(1);
        Self::with_controller(
            PlaybackController::new(engine, config),
            engine_events,
            liked_store,
            capacity,
        )
    }

    /// Create a service around an already configured controller
    pub fn with_controller(
        controller: PlaybackController,
        engine_events: EngineEvents,
        liked_store: Arc<dyn LikedSongsStore>,
        command_capacity: usize,
    ) -> (Self, PlayerHandle) {
        let (command_tx, commands) = mpsc::channel(command_capacity.max(1));
        let (background_tx, background_rx) = mpsc::unbounded_channel();
        let (snapshots, snapshot_rx) = watch::channel(controller.snapshot());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let handle = PlayerHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            events: events.clone(),
        };

        let service = Self {
            controller,
            commands,
            engine_events,
            background_tx,
            background_rx,
            liked_store,
            activity_sink: None,
            snapshots,
            events,
        };

        (service, handle)
    }

    /// Record a "playing" activity whenever a song starts
    pub fn with_activity_sink(mut self, sink: Arc<dyn ActivitySink>) -> Self {
        self.activity_sink = Some(sink);
        self
    }

    /// Spawn the service loop onto the current runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Run until shut down or every handle is dropped
    pub async fn run(mut self) {
        info!("Player service started");
        let mut workers = self.start_workers();
        let mut shutdown_reply = None;

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(PlayerCommand::Shutdown(reply)) => {
                        shutdown_reply = Some(reply);
                        break;
                    }
                    Some(command) => self.handle_command(command, &workers),
                    None => break,
                },
                Some(event) = self.engine_events.recv() => {
                    self.controller.handle_engine_event(event);
                    self.flush(&workers);
                }
                Some(message) = self.background_rx.recv() => {
                    self.handle_background(message);
                    self.flush(&workers);
                }
            }
        }

        // A finished liked load may still be queued; without it nothing is saved
        while let Ok(message) = self.background_rx.try_recv() {
            self.handle_background(message);
        }
        self.controller.stop();
        self.flush(&workers);

        // An unfinished load has nothing left to update
        workers.liked_load.abort();

        // Closing the channels lets the workers drain and exit
        drop(workers.liked_saves);
        workers.activities.take();
        for handle in workers.handles.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "Background worker panicked");
            }
        }

        info!("Player service stopped");
        if let Some(reply) = shutdown_reply {
            let _ = reply.send(());
        }
    }

    fn start_workers(&self) -> Workers {
        let mut handles = Vec::new();

        // Initial liked-set load
        let store = Arc::clone(&self.liked_store);
        let background = self.background_tx.clone();
        let liked_load = tokio::spawn(async move {
            let result = store.load_liked_ids().await;
            let _ = background.send(Background::LikedLoaded(result));
        });

        // Liked-set saves, latest value wins
        let (liked_saves, mut pending) = watch::channel(None::<LikedSongIds>);
        let store = Arc::clone(&self.liked_store);
        let background = self.background_tx.clone();
        handles.push(tokio::spawn(async move {
            while pending.changed().await.is_ok() {
                let Some(ids) = pending.borrow_and_update().clone() else {
                    continue;
                };
                match store.save_liked_ids(&ids).await {
                    Ok(()) => debug!(count = ids.len(), "Liked songs saved"),
                    Err(e) => {
                        let _ = background.send(Background::SaveFailed(e.to_string()));
                    }
                }
            }
        }));

        // Activity recording, in order
        let activities = self.activity_sink.as_ref().map(|sink| {
            let sink = Arc::clone(sink);
            let (tx, mut rx) = mpsc::unbounded_channel::<Activity>();
            handles.push(tokio::spawn(async move {
                while let Some(activity) = rx.recv().await {
                    if let Err(e) = sink.record(activity).await {
                        warn!(error = %e, "Failed to record activity");
                    }
                }
            }));
            tx
        });

        Workers {
            liked_load,
            liked_saves,
            activities,
            handles,
        }
    }

    fn handle_command(&mut self, command: PlayerCommand, workers: &Workers) {
        let controller = &mut self.controller;
        match command {
            PlayerCommand::Play { song, queue, reply } => {
                let result = controller.play(&song, queue);
                self.respond(workers, reply, result);
            }
            PlayerCommand::TogglePlayPause(reply) => {
                let result = controller.toggle_play_pause();
                self.respond(workers, reply, result);
            }
            PlayerCommand::Pause(reply) => {
                let result = controller.pause();
                self.respond(workers, reply, result);
            }
            PlayerCommand::Resume(reply) => {
                let result = controller.resume();
                self.respond(workers, reply, result);
            }
            PlayerCommand::Stop(reply) => {
                controller.stop();
                self.respond(workers, reply, ());
            }
            PlayerCommand::Next(reply) => {
                let result = controller.next();
                self.respond(workers, reply, result);
            }
            PlayerCommand::Previous(reply) => {
                let result = controller.previous();
                self.respond(workers, reply, result);
            }
            PlayerCommand::ToggleShuffle(reply) => {
                let shuffled = controller.toggle_shuffle();
                self.respond(workers, reply, shuffled);
            }
            PlayerCommand::ToggleLoop(reply) => {
                let looping = controller.toggle_loop();
                self.respond(workers, reply, looping);
            }
            PlayerCommand::BeginSeek(reply) => {
                let result = controller.begin_seek();
                self.respond(workers, reply, result);
            }
            PlayerCommand::CompleteSeek { target_ms, reply } => {
                let result = controller.complete_seek(target_ms);
                self.respond(workers, reply, result);
            }
            PlayerCommand::CancelSeek(reply) => {
                let result = controller.cancel_seek();
                self.respond(workers, reply, result);
            }
            PlayerCommand::ToggleLike { song_id, reply } => {
                let result = controller.toggle_like(&song_id);
                self.respond(workers, reply, result);
            }
            PlayerCommand::Shutdown(reply) => {
                self.respond(workers, reply, ());
            }
        }
    }

    fn handle_background(&mut self, message: Background) {
        match message {
            Background::LikedLoaded(Ok(ids)) => {
                self.controller.set_liked_ids(ids);
            }
            Background::LikedLoaded(Err(e)) => {
                warn!(error = %e, "Failed to load liked songs, starting with none");
                self.controller.set_liked_ids(LikedSongIds::new());
            }
            Background::SaveFailed(reason) => self.controller.report_persistence_failure(reason),
        }
    }

    /// Publish state, then answer the caller
    ///
    /// Callers observe the snapshot that reflects their own command.
    fn respond<T>(&mut self, workers: &Workers, reply: oneshot::Sender<T>, value: T) {
        self.flush(workers);
        let _ = reply.send(value);
    }

    /// Hand off pending saves and activities, then publish events and state
    fn flush(&mut self, workers: &Workers) {
        if let Some(ids) = self.controller.take_liked_for_persist() {
            workers.liked_saves.send_replace(Some(ids));
        }

        for event in self.controller.drain_events() {
            if let (PlaybackEvent::PlaybackStarted { song_id }, Some(activities)) =
                (&event, &workers.activities)
            {
                let _ = activities.send(Activity::playing(song_id.clone()));
            }
            let _ = self.events.send(event);
        }

        let snapshot = self.controller.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}

/// Cloneable handle for the presentation layer
///
/// Every operation is forwarded to the service loop and answered once the
/// resulting state has been published. Fails with
/// [`PlaybackError::ServiceStopped`] after the service exits.
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    commands: mpsc::Sender<PlayerCommand>,
    snapshots: watch::Receiver<PlaybackSnapshot>,
    events: broadcast::Sender<PlaybackEvent>,
}

impl PlayerHandle {
    /// Play `song`, optionally replacing the queue
    pub async fn play(&self, song: Song, queue: Option<Vec<Song>>) -> Result<()> {
        self.request(|reply| PlayerCommand::Play { song, queue, reply })
            .await?
    }

    /// Pause if playing, resume if paused
    pub async fn toggle_play_pause(&self) -> Result<()> {
        self.request(PlayerCommand::TogglePlayPause).await?
    }

    /// Pause playback
    pub async fn pause(&self) -> Result<()> {
        self.request(PlayerCommand::Pause).await?
    }

    /// Resume playback
    pub async fn resume(&self) -> Result<()> {
        self.request(PlayerCommand::Resume).await?
    }

    /// Stop playback and release the resource
    pub async fn stop(&self) -> Result<()> {
        self.request(PlayerCommand::Stop).await
    }

    /// Skip to the next song
    pub async fn next(&self) -> Result<()> {
        self.request(PlayerCommand::Next).await?
    }

    /// Go back to the previous song
    pub async fn previous(&self) -> Result<()> {
        self.request(PlayerCommand::Previous).await?
    }

    /// Flip shuffle, returning the new flag
    pub async fn toggle_shuffle(&self) -> Result<bool> {
        self.request(PlayerCommand::ToggleShuffle).await
    }

    /// Flip loop, returning the new flag
    pub async fn toggle_loop(&self) -> Result<bool> {
        self.request(PlayerCommand::ToggleLoop).await
    }

    /// Start a scrub
    pub async fn begin_seek(&self) -> Result<()> {
        self.request(PlayerCommand::BeginSeek).await?
    }

    /// Finish a scrub at `target_ms`
    pub async fn complete_seek(&self, target_ms: i64) -> Result<()> {
        self.request(|reply| PlayerCommand::CompleteSeek { target_ms, reply })
            .await?
    }

    /// Abandon a scrub
    pub async fn cancel_seek(&self) -> Result<()> {
        self.request(PlayerCommand::CancelSeek).await?
    }

    /// Flip whether `song_id` is liked, returning the new state
    pub async fn toggle_like(&self, song_id: SongId) -> Result<bool> {
        self.request(|reply| PlayerCommand::ToggleLike { song_id, reply })
            .await?
    }

    /// Stop the service, waiting for pending saves to finish
    pub async fn shutdown(&self) -> Result<()> {
        self.request(PlayerCommand::Shutdown).await
    }

    /// Latest published state
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified whenever the state changes
    pub fn subscribe_snapshots(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshots.clone()
    }

    /// Receiver for playback events published from now on
    pub fn subscribe_events(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> PlayerCommand,
    ) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| PlaybackError::ServiceStopped)?;
        response.await.map_err(|_| PlaybackError::ServiceStopped)
    }
}
