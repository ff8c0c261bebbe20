//! Harmony Storage
//!
//! `SQLite` persistence and catalog providers for Harmony.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: each feature owns its own queries (`liked`,
//!   `activities`) as free functions over a pool
//! - **Per-User**: every row is scoped by a user id
//! - **Trait Adapters**: [`SqliteLikedStore`] and [`SqliteActivityLog`]
//!   implement the `harmony-core` collaborator traits on top of the slices
//!
//! # Example
//!
//! ```rust,no_run
//! use harmony_core::LikedSongsStore;
//! use harmony_storage::{create_pool, run_migrations, SqliteLikedStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://harmony.db").await?;
//! run_migrations(&pool).await?;
//!
//! let store = SqliteLikedStore::new(pool, "local");
//! let liked = store.load_liked_ids().await?;
//! println!("{} liked songs", liked.len());
//! # Ok(())
//! # }
//! ```

mod error;

pub mod activities;
pub mod catalog;
pub mod liked;

pub use activities::SqliteActivityLog;
pub use catalog::{demo_catalog, StaticCatalog};
pub use error::StorageError;
pub use liked::SqliteLikedStore;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;
use tracing::debug;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// Call once at startup so the schema is up to date.
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://harmony.db>`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    debug!(url = database_url, "Creating SQLite pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    debug!("SQLite pool ready");

    Ok(pool)
}
