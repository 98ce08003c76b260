/// Client configuration
use crate::error::{ClientError, Result};
use riff_playback::PlaybackConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "riff.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClientConfig {
    #[serde(default = "default_api")]
    pub api: ApiSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default = "default_player")]
    pub player: PlayerSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct StorageSettings {
    /// Directory for persisted state; in memory when unset
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlayerSettings {
    #[serde(default = "default_storage_key")]
    pub storage_key: String,

    #[serde(default = "default_restart_threshold_secs")]
    pub restart_threshold_secs: f64,

    #[serde(default = "default_time_persist_interval_secs")]
    pub time_persist_interval_secs: f64,

    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl ClientConfig {
    /// Load configuration from `riff.toml` (if present) and environment
    pub fn load() -> Result<Self> {
        let path = PathBuf::from(DEFAULT_CONFIG_FILE);
        Self::load_from(path.exists().then_some(path.as_path()))
    }

    /// Load configuration from an optional file, then environment
    ///
    /// Environment variables are prefixed with `RIFF_` and nest with a
    /// double underscore, e.g. `RIFF_API__BASE_URL`.
    pub fn load_from(file: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = file {
            settings = settings.add_source(config::File::from(path));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("RIFF")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let base_url = self.api.base_url.trim();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "api.base_url must be an http(s) URL, got {:?}",
                self.api.base_url
            )));
        }

        if self.player.storage_key.trim().is_empty() {
            return Err(ClientError::Config(
                "player.storage_key cannot be empty".to_string(),
            ));
        }

        if !self.player.restart_threshold_secs.is_finite()
            || self.player.restart_threshold_secs < 0.0
        {
            return Err(ClientError::Config(
                "player.restart_threshold_secs must be a non-negative number".to_string(),
            ));
        }

        if !self.player.time_persist_interval_secs.is_finite()
            || self.player.time_persist_interval_secs < 0.0
        {
            return Err(ClientError::Config(
                "player.time_persist_interval_secs must be a non-negative number".to_string(),
            ));
        }

        if self.player.event_capacity == 0 {
            return Err(ClientError::Config(
                "player.event_capacity must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Player settings in the form the player takes them
    pub fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            storage_key: self.player.storage_key.clone(),
            restart_threshold_secs: self.player.restart_threshold_secs,
            time_persist_interval_secs: self.player.time_persist_interval_secs,
            event_capacity: self.player.event_capacity,
            ..PlaybackConfig::default()
        }
    }
}

// Default values
fn default_api() -> ApiSettings {
    ApiSettings {
        base_url: default_base_url(),
    }
}

fn default_base_url() -> String {
    riff_library::DEFAULT_BASE_URL.to_string()
}

fn default_player() -> PlayerSettings {
    PlayerSettings {
        storage_key: default_storage_key(),
        restart_threshold_secs: default_restart_threshold_secs(),
        time_persist_interval_secs: default_time_persist_interval_secs(),
        event_capacity: default_event_capacity(),
    }
}

fn default_storage_key() -> String {
    PlaybackConfig::default().storage_key
}

fn default_restart_threshold_secs() -> f64 {
    PlaybackConfig::default().restart_threshold_secs
}

fn default_time_persist_interval_secs() -> f64 {
    PlaybackConfig::default().time_persist_interval_secs
}

fn default_event_capacity() -> usize {
    PlaybackConfig::default().event_capacity
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api: default_api(),
            storage: StorageSettings::default(),
            player: default_player(),
        }
    }
}
