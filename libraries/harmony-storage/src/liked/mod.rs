//! Liked songs
//!
//! Per-user set of liked song ids. Saves replace the whole set in one
//! transaction, so a reader never observes a half-written set.

use async_trait::async_trait;
use harmony_core::{LikedSongIds, LikedSongsStore, SongId};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::Result;

/// Get every liked song id for a user
pub async fn get_all(pool: &SqlitePool, user_id: &str) -> Result<LikedSongIds> {
    let rows = sqlx::query("SELECT song_id FROM liked_songs WHERE user_id = ?")
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| -> Result<SongId> {
            let song_id: String = row.try_get("song_id")?;
            Ok(SongId::new(song_id))
        })
        .collect()
}

/// Replace a user's liked set
///
/// # Errors
///
/// Returns an error if any statement fails; the previous set is kept
pub async fn replace_all(pool: &SqlitePool, user_id: &str, ids: &LikedSongIds) -> Result<()> {
    let now = chrono::Utc::now().timestamp();
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM liked_songs WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    for id in ids {
        sqlx::query("INSERT INTO liked_songs (user_id, song_id, liked_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(id.as_str())
            .bind(now)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    debug!(user_id, count = ids.len(), "Replaced liked songs");
    Ok(())
}

/// Whether a user likes a song
pub async fn is_liked(pool: &SqlitePool, user_id: &str, song_id: &SongId) -> Result<bool> {
    let row = sqlx::query("SELECT 1 FROM liked_songs WHERE user_id = ? AND song_id = ?")
        .bind(user_id)
        .bind(song_id.as_str())
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

/// `LikedSongsStore` backed by the `liked_songs` table
#[derive(Debug, Clone)]
pub struct SqliteLikedStore {
    pool: SqlitePool,
    user_id: String,
}

impl SqliteLikedStore {
    pub fn new(pool: SqlitePool, user_id: impl Into<String>) -> Self {
        Self {
            pool,
            user_id: user_id.into(),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl LikedSongsStore for SqliteLikedStore {
    async fn load_liked_ids(&self) -> harmony_core::Result<LikedSongIds> {
        Ok(get_all(&self.pool, &self.user_id).await?)
    }

    async fn save_liked_ids(&self, ids: &LikedSongIds) -> harmony_core::Result<()> {
        Ok(replace_all(&self.pool, &self.user_id, ids).await?)
    }
}
