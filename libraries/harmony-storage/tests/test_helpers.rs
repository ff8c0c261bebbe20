//! Test helpers for storage integration tests
//!
//! Databases are real `SQLite` files in a temp dir, so migrations, WAL mode
//! and transactions behave as in production.

#![allow(dead_code)]

use sqlx::SqlitePool;
use tempfile::TempDir;

/// Test database wrapper that cleans up on drop
pub struct TestDb {
    pub pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestDb {
    /// Create a new test database with migrations applied
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let db_url = format!("sqlite://{}", db_path.display());

        let pool = harmony_storage::create_pool(&db_url)
            .await
            .expect("Failed to create pool");

        harmony_storage::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        Self {
            pool,
            _temp_dir: temp_dir,
        }
    }

    /// Get the pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Test fixture: insert a liked row directly, bypassing the store
pub async fn insert_liked_row(pool: &SqlitePool, user_id: &str, song_id: &str, liked_at: i64) {
    sqlx::query("INSERT INTO liked_songs (user_id, song_id, liked_at) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(song_id)
        .bind(liked_at)
        .execute(pool)
        .await
        .expect("Failed to insert liked row");
}
