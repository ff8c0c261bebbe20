//! Catalog providers
//!
//! The catalog is read-only: a fixed in-memory list, optionally loaded from
//! a JSON file, or the bundled demo set.

use async_trait::async_trait;
use harmony_core::{Catalog, CatalogProvider, Song};
use std::path::Path;
use tracing::debug;

use crate::error::{Result, StorageError};

/// Times the demo set is repeated
const DEMO_REPEAT: usize = 10;

/// Bundled demo songs: (id, title, artist, artwork, audio)
const DEMO_SONGS: [(&str, &str, &str, &str, &str); 3] = [
    (
        "1",
        "Bella Ciao",
        "Manu Pilas",
        "https://lh3.googleusercontent.com/v6zKg8G00Bq7G4FTDVzx8RdV3ZEdQRIMwbWfnjnD7R9042CgRJqSTUz1GZ62Wn483IQqSydIaflTNx42=w544-h544-l90-rj",
        "assets/music/song1.mp3",
    ),
    (
        "2",
        "Everything u are",
        "Hindia",
        "https://lh3.googleusercontent.com/pP42VdTGrlRG0oCRZdgwhZ57R6CpfWDtewbZ9Mlg6gNoKWAjY4R59sGt_Le_zdWHh6hpNeRobL8aBVxwVQ=w544-h544-l90-rj",
        "assets/music/song2.mp3",
    ),
    (
        "3",
        "Last Night on Earth",
        "Green Day",
        "https://lh3.googleusercontent.com/FnRYR-BT3RONNVBVF0Ws8IzCnzZYu7qbulZ3LL99NadPK8kEK_dvyldmJEGg_DZpJ0UsKoqwALI8SEz6=w544-h544-l90-rj",
        "assets/music/song3.mp3",
    ),
];

/// Demo catalog: the three bundled songs repeated ten times
///
/// Ids are `"{n}-{i}"` for song `n` in round `i`, in round order
/// (`1-0, 2-0, 3-0, 1-1, ...`).
pub fn demo_catalog() -> Catalog {
    let songs = (0..DEMO_REPEAT)
        .flat_map(|round| {
            DEMO_SONGS
                .iter()
                .map(move |(id, title, artist, artwork, audio)| {
                    Song::new(format!("{id}-{round}"), *title, *artist, *artwork, *audio)
                })
        })
        .collect();
    Catalog::new(songs)
}

/// `CatalogProvider` over a fixed list of songs
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    catalog: Catalog,
}

impl StaticCatalog {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// Provider for [`demo_catalog`]
    pub fn demo() -> Self {
        Self::new(demo_catalog())
    }

    /// Load songs from a JSON array file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a song list
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await?;
        let catalog: Catalog = serde_json::from_str(&contents)
            .map_err(|e| StorageError::Catalog(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), songs = catalog.len(), "Loaded catalog");
        Ok(Self::new(catalog))
    }
}

#[async_trait]
impl CatalogProvider for StaticCatalog {
    async fn get_catalog(&self) -> harmony_core::Result<Catalog> {
        Ok(self.catalog.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harmony_core::SongId;

    #[test]
    fn demo_catalog_repeats_three_songs() {
        let catalog = demo_catalog();
        assert_eq!(catalog.len(), 30);

        let ids: Vec<&str> = catalog.songs().iter().take(4).map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["1-0", "2-0", "3-0", "1-1"]);

        let last = catalog.get(&SongId::from("3-9")).unwrap();
        assert_eq!(last.title, "Last Night on Earth");
        assert_eq!(last.artist, "Green Day");
    }

    #[test]
    fn demo_ids_are_unique() {
        let catalog = demo_catalog();
        let unique: std::collections::BTreeSet<_> =
            catalog.songs().iter().map(|s| s.id.clone()).collect();
        assert_eq!(unique.len(), catalog.len());
    }

    #[test]
    fn demo_search_finds_artist() {
        assert_eq!(demo_catalog().search("hindia").len(), 10);
    }
}
