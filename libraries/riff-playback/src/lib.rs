//! Riff - Playback Management
//!
//! Platform-agnostic player and queue state machine for Riff.
//!
//! This crate provides:
//! - Context playback (a playlist, an artist, liked songs or an ad-hoc queue)
//! - Shuffle of the upcoming tracks, with the context order kept aside
//! - Repeat modes (Off, All, One)
//! - Volume with mute memory
//! - Seek and volume drag gestures
//! - Session persistence and restore
//! - Saved ("liked") status of the current track
//!
//! # Architecture
//!
//! `riff-playback` never touches audio or the network:
//! - Audio is driven through the [`AudioOutput`] trait
//! - Persistence goes through [`riff_core::Storage`]
//! - Saved status goes through [`riff_core::SavedTracks`]
//!
//! [`Player`] is synchronous and owns all state. [`PlayerHandle`] wraps it
//! for async callers that need to wait on the library.
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use riff_core::{Storage, Track};
//! use riff_playback::{NullOutput, PlaybackConfig, Player};
//! use riff_storage::MemoryStore;
//! use std::sync::Arc;
//!
//! let storage = Storage::new(Arc::new(MemoryStore::new()));
//! let mut player = Player::new(PlaybackConfig::default(), Box::new(NullOutput::new()), storage);
//!
//! let tracks = vec![
//!     Track::new("1", "Intro", "Artist", "https://cdn.example/1.mp3"),
//!     Track::new("2", "Outro", "Artist", "https://cdn.example/2.mp3"),
//! ];
//!
//! player.start_playback(&tracks[0], tracks.clone(), Some("My Playlist"));
//! assert!(player.is_playing());
//!
//! player.next();
//! assert_eq!(player.current_index(), Some(1));
//! ```

mod error;
mod events;
mod handle;
mod output;
mod player;
mod queue;
mod shuffle;
pub mod types;
mod volume;

// Public exports
pub use error::{PlaybackError, Result};
pub use events::{EventBus, Notice, NoticeLevel, PlayerEvent};
pub use handle::{ContextPlayback, LikeOutcome, PlayerHandle};
pub use output::{AudioOutput, NullOutput, OutputState};
pub use player::Player;
pub use queue::{Advance, Queue, Restore};
pub use shuffle::shuffle_tail;
pub use types::{
    format_time, PlaybackConfig, PlaybackSnapshot, PlaybackState, Progress, RepeatMode,
};
pub use volume::Volume;
