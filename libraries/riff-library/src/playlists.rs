//! The signed-in user's own playlists.

use crate::cache::RequestCache;
use crate::client::ApiClient;
use crate::error::Result;
use crate::events::{LibraryEvent, LibraryEvents};
use crate::types::{
    AddTrackRequest, CreatePlaylistRequest, ItemKind, PlaylistResponse, PlaylistUpdate,
    PlaylistsResponse, TracksResponse,
};
use riff_core::{keys, ApiTrack, PlaylistId, PlaylistSummary, TrackId, User};
use tracing::{debug, info};

/// Name given to freshly created playlists
pub const DEFAULT_PLAYLIST_NAME: &str = "My Playlist";

/// Playlist CRUD with a coalesced cache of `me/playlists`.
///
/// Every mutation invalidates the cache; the next read refetches.
#[derive(Debug, Clone)]
pub struct PlaylistService {
    api: ApiClient,
    cache: RequestCache<Vec<PlaylistSummary>>,
    events: LibraryEvents,
}

impl PlaylistService {
    pub fn new(api: ApiClient, events: LibraryEvents) -> Self {
        Self {
            api,
            cache: RequestCache::new(),
            events,
        }
    }

    /// Playlists owned by the signed-in user.
    pub async fn my_playlists(&self) -> Result<Vec<PlaylistSummary>> {
        let api = self.api.clone();
        self.cache
            .get_or_fetch(move || async move {
                debug!("Fetching own playlists");
                let response: PlaylistsResponse = api.get("me/playlists").await?;
                Ok(response.playlists)
            })
            .await
    }

    /// Cached playlists without hitting the network.
    pub fn playlists_from_cache(&self) -> Option<Vec<PlaylistSummary>> {
        self.cache.peek()
    }

    /// Create an empty public playlist named [`DEFAULT_PLAYLIST_NAME`].
    ///
    /// The owner name is filled in from the stored user when the API
    /// leaves it out.
    pub async fn create_playlist(&self) -> Result<PlaylistSummary> {
        let request = CreatePlaylistRequest {
            name: DEFAULT_PLAYLIST_NAME,
            is_public: true,
        };
        let PlaylistResponse { mut playlist } = self.api.post("playlists", &request).await?;

        if playlist.user_display_name.is_none() {
            playlist.user_display_name = self
                .api
                .storage()
                .get::<User>(keys::USER)
                .map(|user| user.label().to_string())
                .filter(|name| !name.is_empty());
        }

        info!(playlist_id = %playlist.id, "Playlist created");
        self.changed();
        self.events.emit(LibraryEvent::ItemAdded {
            kind: ItemKind::Playlist,
            id: playlist.id.to_string(),
        });
        Ok(playlist)
    }

    /// Edit name, description, cover or visibility.
    pub async fn update_playlist(
        &self,
        id: &PlaylistId,
        update: &PlaylistUpdate,
    ) -> Result<PlaylistSummary> {
        let PlaylistResponse { playlist } = self.api.put(&format!("playlists/{id}"), update).await?;

        info!(playlist_id = %id, "Playlist updated");
        self.changed();
        self.events
            .emit(LibraryEvent::PlaylistUpdated(playlist.clone()));
        Ok(playlist)
    }

    pub async fn delete_playlist(&self, id: &PlaylistId) -> Result<()> {
        self.api
            .delete::<serde_json::Value>(&format!("playlists/{id}"))
            .await?;

        info!(playlist_id = %id, "Playlist deleted");
        self.changed();
        self.events.emit(LibraryEvent::ItemRemoved {
            kind: ItemKind::Playlist,
            id: id.to_string(),
        });
        Ok(())
    }

    pub async fn add_track(&self, playlist: &PlaylistId, track: &TrackId) -> Result<()> {
        let request = AddTrackRequest { track_id: track };
        self.api
            .post::<serde_json::Value, _>(&format!("playlists/{playlist}/tracks"), &request)
            .await?;
        debug!(playlist_id = %playlist, track_id = %track, "Track added to playlist");
        Ok(())
    }

    pub async fn remove_track(&self, playlist: &PlaylistId, track: &TrackId) -> Result<()> {
        self.api
            .delete::<serde_json::Value>(&format!("playlists/{playlist}/tracks/{track}"))
            .await?;
        debug!(playlist_id = %playlist, track_id = %track, "Track removed from playlist");
        Ok(())
    }

    /// Raw track rows of a playlist.
    pub async fn playlist_tracks(&self, id: &PlaylistId) -> Result<Vec<ApiTrack>> {
        let response: TracksResponse = self.api.get(&format!("playlists/{id}/tracks")).await?;
        Ok(response.tracks)
    }

    /// Drop the cached playlists.
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    fn changed(&self) {
        self.cache.invalidate();
        self.events.emit(LibraryEvent::PlaylistsChanged);
    }
}
