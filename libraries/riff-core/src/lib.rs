//! Riff Core
//!
//! Platform-agnostic core types, ports, and error handling for Riff.
//!
//! This crate provides the building blocks shared by the player, the library
//! services and the composition root.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `PlaylistSummary`, `ArtistSummary`, `User`
//! - **Ports**: `KeyValueStore` (persistence) and `SavedTracks` (library saves)
//! - **Storage**: a typed JSON wrapper over any `KeyValueStore`
//! - **Error Handling**: unified `RiffError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use riff_core::types::{Track, TrackId};
//!
//! let track = Track::new("t1", "Blue in Green", "Miles Davis", "https://cdn.example.com/t1.mp3");
//! assert_eq!(track.id, TrackId::new("t1"));
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod storage;
pub mod traits;
pub mod types;

pub use error::{Result, RiffError};
pub use storage::{keys, Storage};
pub use traits::{KeyValueStore, SavedTracks};

pub use types::{
    ApiTrack, ArtistId, ArtistSummary, PlaylistId, PlaylistSummary, Track, TrackId, User,
};
