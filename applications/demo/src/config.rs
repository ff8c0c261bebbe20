/// Demo configuration
use crate::error::{DemoError, Result};
use harmony_playback::PlaybackConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DemoConfig {
    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default = "default_engine")]
    pub engine: EngineSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Owner of the liked set and activity feed
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// JSON song list; the bundled demo catalog is used when absent
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct EngineSettings {
    /// Simulated time to load a resource
    #[serde(default = "default_load_delay_ms")]
    pub load_delay_ms: u64,

    /// Interval between status notifications
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Length of every simulated song
    #[serde(default = "default_song_duration_ms")]
    pub song_duration_ms: u64,
}

impl DemoConfig {
    /// Load configuration from an optional TOML file and the environment
    ///
    /// Environment variables use the `HARMONY_` prefix with `__` between
    /// levels, e.g. `HARMONY_STORAGE__DATABASE_URL`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        let config_path = path.map_or_else(|| PathBuf::from("harmony.toml"), Path::to_path_buf);
        if config_path.exists() {
            settings = settings.add_source(config::File::from(config_path));
        } else if let Some(path) = path {
            return Err(DemoError::Config(format!(
                "config file {} not found",
                path.display()
            )));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("HARMONY")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| DemoError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| DemoError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.storage.database_url.is_empty() {
            return Err(DemoError::Config("database_url is required".to_string()));
        }

        if self.storage.user_id.trim().is_empty() {
            return Err(DemoError::Config("user_id must not be blank".to_string()));
        }

        if self.engine.tick_ms == 0 {
            return Err(DemoError::Config("engine.tick_ms must be positive".to_string()));
        }

        if self.playback.command_capacity == 0 {
            return Err(DemoError::Config(
                "playback.command_capacity must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

// Default values
fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
        user_id: default_user_id(),
        catalog_path: None,
    }
}

fn default_database_url() -> String {
    "sqlite://harmony-demo.db".to_string()
}

fn default_user_id() -> String {
    "local".to_string()
}

fn default_engine() -> EngineSettings {
    EngineSettings {
        load_delay_ms: default_load_delay_ms(),
        tick_ms: default_tick_ms(),
        song_duration_ms: default_song_duration_ms(),
    }
}

fn default_load_delay_ms() -> u64 {
    150
}

fn default_tick_ms() -> u64 {
    500
}

fn default_song_duration_ms() -> u64 {
    8_000
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            storage: default_storage(),
            playback: PlaybackConfig::default(),
            engine: default_engine(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        default_engine()
    }
}
