//! Scripted listening session
//!
//! Drives a [`PlayerHandle`] the way a user would: pick a song from the
//! catalog, like it, skip around, scrub, switch modes, and finally browse the
//! liked view.

use crate::error::{DemoError, Result};
use harmony_core::{Catalog, Song};
use harmony_playback::{PlaybackEvent, PlaybackSnapshot, PlayerHandle};
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tracing::{info, warn};

/// One line of now-playing text for a snapshot
pub fn describe(snapshot: &PlaybackSnapshot) -> String {
    let Some(song) = &snapshot.current_song else {
        return "(nothing playing)".to_string();
    };

    let mut flags = Vec::new();
    if snapshot.is_shuffled {
        flags.push("shuffle");
    }
    if snapshot.is_looping {
        flags.push("loop");
    }
    if snapshot.is_current_liked() {
        flags.push("liked");
    }
    if snapshot.is_seeking {
        flags.push("seeking");
    }

    format!(
        "{} - {} [{} / {}] {:?}{}",
        song.title,
        song.artist,
        snapshot.position_label(),
        snapshot.duration_label(),
        snapshot.status,
        if flags.is_empty() {
            String::new()
        } else {
            format!(" ({})", flags.join(", "))
        }
    )
}

/// Run the scripted session for roughly `seconds`
pub async fn run(handle: &PlayerHandle, catalog: &Catalog, seconds: u64) -> Result<()> {
    let first = catalog.songs().first().cloned().ok_or(DemoError::EmptyCatalog)?;
    let deadline = Instant::now() + Duration::from_secs(seconds);
    let step = Duration::from_secs(seconds.max(6) / 6);

    let mut events = handle.subscribe_events();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(PlaybackEvent::SongChanged { song_id, .. }) => info!(%song_id, "Now loading"),
                Ok(PlaybackEvent::Error { kind, message }) => warn!(?kind, %message, "Playback error"),
                Ok(_) => {}
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event printer lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    println!("Catalog: {} songs", catalog.len());
    handle.play(first.clone(), Some(catalog.songs().to_vec())).await?;
    wait_until_playing(handle).await;
    show(handle);

    handle.toggle_like(first.id.clone()).await?;
    show(handle);
    pause_for(step, deadline).await;

    handle.next().await?;
    wait_until_playing(handle).await;
    show(handle);

    let snapshot = handle.snapshot();
    if snapshot.can_seek {
        handle.begin_seek().await?;
        let target = i64::try_from(snapshot.duration_ms / 2).unwrap_or(0);
        handle.complete_seek(target).await?;
        show(handle);
    }
    pause_for(step, deadline).await;

    handle.toggle_shuffle().await?;
    handle.next().await?;
    wait_until_playing(handle).await;
    show(handle);
    pause_for(step, deadline).await;

    let green_day = catalog.search("green day");
    if let Some(song) = green_day.first().cloned() {
        play_from(handle, song, green_day).await?;
    }
    handle.toggle_loop().await?;
    show(handle);

    // Let the clock run out the remaining time
    let mut snapshots = handle.subscribe_snapshots();
    while Instant::now() < deadline {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match timeout(remaining, snapshots.changed()).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) | Err(_) => break,
        }
        let snapshot = snapshots.borrow_and_update().clone();
        if snapshot.position_ms % 2_000 < 500 {
            println!("  {}", describe(&snapshot));
        }
    }

    let liked = catalog.liked(&handle.snapshot().liked_song_ids);
    println!("Liked songs ({}):", liked.len());
    for song in &liked {
        println!("  {} - {}", song.title, song.artist);
    }

    printer.abort();
    Ok(())
}

async fn play_from(handle: &PlayerHandle, song: Song, queue: Vec<Song>) -> Result<()> {
    handle.play(song, Some(queue)).await?;
    wait_until_playing(handle).await;
    show(handle);
    Ok(())
}

async fn wait_until_playing(handle: &PlayerHandle) {
    let mut snapshots = handle.subscribe_snapshots();
    let ready = timeout(Duration::from_secs(5), snapshots.wait_for(|s| !s.is_loading())).await;
    if ready.is_err() {
        warn!("Timed out waiting for load");
    }
}

async fn pause_for(step: Duration, deadline: Instant) {
    let until = (Instant::now() + step).min(deadline);
    sleep(until.saturating_duration_since(Instant::now())).await;
}

fn show(handle: &PlayerHandle) {
    println!("{}", describe(&handle.snapshot()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use harmony_core::SongId;
    use harmony_playback::PlaybackStatus;

    #[test]
    fn describe_idle() {
        assert_eq!(describe(&PlaybackSnapshot::default()), "(nothing playing)");
    }

    #[test]
    fn describe_playing_with_flags() {
        let song = Song::new("1-0", "Bella Ciao", "Manu Pilas", "", "song1.mp3");
        let snapshot = PlaybackSnapshot {
            current_song: Some(song),
            current_index: Some(0),
            queue_len: 30,
            status: PlaybackStatus::Playing,
            is_looping: true,
            position_ms: 65_000,
            duration_ms: 180_000,
            liked_song_ids: [SongId::from("1-0")].into_iter().collect(),
            ..PlaybackSnapshot::default()
        };

        assert_eq!(
            describe(&snapshot),
            "Bella Ciao - Manu Pilas [1:05 / 3:00] Playing (loop, liked)"
        );
    }
}
