//! Listening activity
//!
//! Append-only feed of "now playing" entries per user.

use async_trait::async_trait;
use chrono::DateTime;
use harmony_core::{Activity, ActivityKind, ActivitySink, SongId};
use sqlx::{Row, SqlitePool};

use crate::error::{Result, StorageError};

/// Append an activity for a user
pub async fn record(pool: &SqlitePool, user_id: &str, activity: &Activity) -> Result<()> {
    sqlx::query("INSERT INTO activities (user_id, song_id, kind, occurred_at) VALUES (?, ?, ?, ?)")
        .bind(user_id)
        .bind(activity.song_id.as_str())
        .bind(activity.kind.as_str())
        .bind(activity.occurred_at.timestamp_millis())
        .execute(pool)
        .await?;
    Ok(())
}

/// Most recent activities for a user, newest first
pub async fn recent(pool: &SqlitePool, user_id: &str, limit: u32) -> Result<Vec<Activity>> {
    let rows = sqlx::query(
        "SELECT song_id, kind, occurred_at FROM activities
         WHERE user_id = ?
         ORDER BY occurred_at DESC, id DESC
         LIMIT ?",
    )
    .bind(user_id)
    .bind(i64::from(limit))
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| -> Result<Activity> {
            let kind: String = row.try_get("kind")?;
            let millis: i64 = row.try_get("occurred_at")?;
            Ok(Activity {
                song_id: SongId::new(row.try_get::<String, _>("song_id")?),
                kind: parse_kind(&kind)?,
                occurred_at: DateTime::from_timestamp_millis(millis).ok_or_else(|| {
                    StorageError::SerializationError(format!("invalid timestamp {millis}"))
                })?,
            })
        })
        .collect()
}

fn parse_kind(kind: &str) -> Result<ActivityKind> {
    match kind {
        "playing" => Ok(ActivityKind::Playing),
        other => Err(StorageError::SerializationError(format!(
            "unknown activity kind {other:?}"
        ))),
    }
}

/// `ActivitySink` backed by the `activities` table
#[derive(Debug, Clone)]
pub struct SqliteActivityLog {
    pool: SqlitePool,
    user_id: String,
}

impl SqliteActivityLog {
    pub fn new(pool: SqlitePool, user_id: impl Into<String>) -> Self {
        Self {
            pool,
            user_id: user_id.into(),
        }
    }

    /// Most recent activities for this user, newest first
    pub async fn recent_activities(&self, limit: u32) -> Result<Vec<Activity>> {
        recent(&self.pool, &self.user_id, limit).await
    }
}

#[async_trait]
impl ActivitySink for SqliteActivityLog {
    async fn record(&self, activity: Activity) -> harmony_core::Result<()> {
        Ok(record(&self.pool, &self.user_id, &activity).await?)
    }
}
