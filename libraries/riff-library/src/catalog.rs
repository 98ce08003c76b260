//! Catalog lookups producing playable track lists.

use crate::client::ApiClient;
use crate::error::Result;
use crate::types::{ArtistsResponse, PlaylistsResponse, TracksResponse};
use riff_core::{ArtistId, ArtistSummary, PlaylistId, PlaylistSummary, Track};
use tracing::debug;

/// Read-only catalog endpoints.
///
/// Track lists come back normalized, ready to hand to the player as a
/// playback context.
#[derive(Debug, Clone)]
pub struct Catalog {
    api: ApiClient,
}

impl Catalog {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn playlist_tracks(&self, id: &PlaylistId) -> Result<Vec<Track>> {
        self.tracks(&format!("playlists/{id}/tracks"), "").await
    }

    /// Popular tracks of an artist. `artist_name` fills in tracks that
    /// come back without one.
    pub async fn artist_popular_tracks(
        &self,
        id: &ArtistId,
        artist_name: &str,
    ) -> Result<Vec<Track>> {
        self.tracks(&format!("artists/{id}/tracks/popular"), artist_name)
            .await
    }

    pub async fn liked_tracks(&self) -> Result<Vec<Track>> {
        self.api.require_session()?;
        self.tracks("me/tracks/liked", "").await
    }

    pub async fn trending_tracks(&self, limit: usize) -> Result<Vec<Track>> {
        self.tracks(&format!("tracks/trending?limit={limit}"), "")
            .await
    }

    pub async fn featured_playlists(&self, limit: usize) -> Result<Vec<PlaylistSummary>> {
        let response: PlaylistsResponse = self.api.get(&format!("playlists?limit={limit}")).await?;
        Ok(response.playlists)
    }

    pub async fn featured_artists(&self, limit: usize) -> Result<Vec<ArtistSummary>> {
        let response: ArtistsResponse = self.api.get(&format!("artists?limit={limit}")).await?;
        Ok(response.artists)
    }

    async fn tracks(&self, path: &str, fallback_artist: &str) -> Result<Vec<Track>> {
        let response: TracksResponse = self.api.get(path).await?;
        debug!(path, count = response.tracks.len(), "Loaded tracks");
        Ok(response
            .tracks
            .into_iter()
            .map(|track| track.into_track(fallback_artist))
            .collect())
    }
}
