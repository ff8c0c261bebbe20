//! Collaborator traits
//!
//! The playback core never owns the catalog or the liked set's durable copy.
//! These traits abstract the collaborators that do, so local demo data, a
//! `SQLite` database, or a hosted backend can sit behind the same seam.

use crate::error::Result;
use crate::types::{Activity, Catalog, LikedSongIds};
use async_trait::async_trait;

/// Supplies the ordered song catalog
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch the full catalog in display order
    async fn get_catalog(&self) -> Result<Catalog>;
}

/// Durable home of the liked-song set
///
/// Called asynchronously and independently of playback. Implementations
/// replace the stored set wholesale on every save.
#[async_trait]
pub trait LikedSongsStore: Send + Sync {
    /// Load the persisted liked set (empty if nothing was saved yet)
    async fn load_liked_ids(&self) -> Result<LikedSongIds>;

    /// Persist the liked set, replacing whatever was stored
    async fn save_liked_ids(&self, ids: &LikedSongIds) -> Result<()>;
}

/// Receives listening activity (e.g. a friends feed)
#[async_trait]
pub trait ActivitySink: Send + Sync {
    /// Record one activity entry
    async fn record(&self, activity: Activity) -> Result<()>;
}
