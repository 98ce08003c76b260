/// Core ports for Riff
use crate::error::Result;
use crate::types::TrackId;
use async_trait::async_trait;
use std::collections::HashSet;

/// Key-value persistence port
///
/// Values are opaque strings; [`crate::Storage`] layers JSON on top.
/// Implementations must be safe to share between the player and the
/// library services.
pub trait KeyValueStore: Send + Sync {
    /// Read a raw value, `Ok(None)` when the key is absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a raw value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Library-save port consumed by the player
///
/// "Saved" means liked or present in any of the user's own playlists.
#[async_trait]
pub trait SavedTracks: Send + Sync {
    /// Whether a user session is present
    fn is_authenticated(&self) -> bool;

    /// Ids of every saved track. Empty when signed out.
    async fn saved_track_ids(&self) -> Result<HashSet<TrackId>>;

    /// Add a track to Liked Songs
    async fn like_track(&self, id: &TrackId) -> Result<()>;

    /// Remove a track from Liked Songs
    async fn unlike_track(&self, id: &TrackId) -> Result<()>;
}
