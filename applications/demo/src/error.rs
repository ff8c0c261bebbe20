/// Demo application errors
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DemoError>;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog is empty")]
    EmptyCatalog,

    #[error(transparent)]
    Playback(#[from] harmony_playback::PlaybackError),

    #[error(transparent)]
    Core(#[from] harmony_core::HarmonyError),
}
