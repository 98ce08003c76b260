//! Core types for playback management

use riff_core::{keys, Track};
use serde::{Deserialize, Serialize};

/// Repeat mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop when queue ends
    #[default]
    Off,

    /// Loop entire queue
    All,

    /// Loop current track only
    One,
}

impl RepeatMode {
    /// Next mode in the off → all → one → off cycle
    pub fn next(self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }
}

/// Configuration for the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Storage key of the persisted snapshot (default: "player_state")
    pub storage_key: String,

    /// Seconds into a track after which "previous" restarts it (default: 3)
    pub restart_threshold_secs: f64,

    /// Minimum playback time between persisted progress ticks (default: 0.25)
    pub time_persist_interval_secs: f64,

    /// Broadcast buffer per subscriber (default: 64)
    pub event_capacity: usize,

    /// Volume before anything was restored (default: 1.0)
    pub default_volume: f64,

    /// Context name used when playback starts without one (default: "Queue")
    pub default_context_name: String,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            storage_key: keys::PLAYER_STATE.to_string(),
            restart_threshold_secs: 3.0,
            time_persist_interval_secs: 0.25,
            event_capacity: 64,
            default_volume: 1.0,
            default_context_name: "Queue".to_string(),
        }
    }
}

/// Persisted player snapshot
///
/// Field names match the stored JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    #[serde(default)]
    pub current_track: Option<Track>,

    #[serde(default)]
    pub queue: Vec<Track>,

    /// Missing means "same as queue"
    #[serde(default)]
    pub original_queue: Option<Vec<Track>>,

    #[serde(default)]
    pub play_context_name: Option<String>,

    #[serde(default)]
    pub is_shuffle: bool,

    #[serde(default)]
    pub repeat_mode: RepeatMode,

    #[serde(default)]
    pub volume: Option<f64>,

    #[serde(default)]
    pub current_time: Option<f64>,
}

/// Read-only view of the player state
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub current_track: Option<Track>,
    pub queue: Vec<Track>,
    pub original_queue: Vec<Track>,
    pub current_index: Option<usize>,
    pub play_context_name: Option<String>,
    pub is_playing: bool,
    pub is_shuffle: bool,
    pub repeat_mode: RepeatMode,
    pub volume: f64,
    pub is_muted: bool,
    pub current_time: f64,
}

/// Progress of the current track, ready for display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Elapsed seconds
    pub current: f64,

    /// Total seconds
    pub duration: f64,
}

impl Progress {
    pub fn new(current: f64, duration: f64) -> Self {
        Self { current, duration }
    }

    /// Elapsed share of the track in [0, 1]
    pub fn fraction(&self) -> f64 {
        if self.duration.is_finite() && self.duration > 0.0 {
            (self.current / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Elapsed time as `m:ss`
    pub fn elapsed_label(&self) -> String {
        format_time(self.current)
    }

    /// Total time as `m:ss`
    pub fn total_label(&self) -> String {
        format_time(self.duration)
    }
}

/// Format seconds as `m:ss`; negative or non-finite input renders `0:00`
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }

    let whole = seconds.floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}
