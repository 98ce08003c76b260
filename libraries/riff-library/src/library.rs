//! Likes, follows and the saved-track index.

use crate::cache::RequestCache;
use crate::client::ApiClient;
use crate::error::Result;
use crate::events::{LibraryEvent, LibraryEvents};
use crate::playlists::PlaylistService;
use crate::types::{ArtistsResponse, ItemKind, LibraryContent, PlaylistsResponse, TracksResponse};
use async_trait::async_trait;
use futures_util::future::try_join_all;
use riff_core::{ApiTrack, PlaylistSummary, SavedTracks, TrackId};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Name of the system playlist mirroring liked tracks
pub const LIKED_SONGS_PLAYLIST: &str = "Liked Songs";

/// The user's library: liked tracks, followed artists and playlists.
///
/// A track counts as saved when it is liked or sits in one of the user's
/// own playlists. The saved-id set is expensive to build, so it is cached
/// and concurrent readers share one build.
#[derive(Debug, Clone)]
pub struct LibraryService {
    api: ApiClient,
    playlists: PlaylistService,
    saved_ids: RequestCache<HashSet<TrackId>>,
    events: LibraryEvents,
}

impl LibraryService {
    pub fn new(api: ApiClient, playlists: PlaylistService, events: LibraryEvents) -> Self {
        Self {
            api,
            playlists,
            saved_ids: RequestCache::new(),
            events,
        }
    }

    pub async fn follow(&self, kind: ItemKind, id: &str) -> Result<()> {
        self.api.require_session()?;
        self.api
            .post_empty::<serde_json::Value>(&format!("{}/{id}/follow", kind.collection()))
            .await?;

        info!(kind = ?kind, id, "Followed");
        self.events.emit(LibraryEvent::ItemAdded {
            kind,
            id: id.to_string(),
        });
        Ok(())
    }

    pub async fn unfollow(&self, kind: ItemKind, id: &str) -> Result<()> {
        self.api.require_session()?;
        self.api
            .delete::<serde_json::Value>(&format!("{}/{id}/follow", kind.collection()))
            .await?;

        info!(kind = ?kind, id, "Unfollowed");
        self.events.emit(LibraryEvent::ItemRemoved {
            kind,
            id: id.to_string(),
        });
        Ok(())
    }

    /// Own and followed playlists plus followed artists.
    ///
    /// A playlist that is both owned and followed appears once, in the
    /// position it was first seen, with the followed record's details.
    /// Signed out or on failure this is empty.
    pub async fn library_content(&self) -> LibraryContent {
        if !self.api.has_session() {
            return LibraryContent::default();
        }

        match self.fetch_library_content().await {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, "Failed to load library content");
                LibraryContent::default()
            }
        }
    }

    async fn fetch_library_content(&self) -> Result<LibraryContent> {
        let own = self.playlists.my_playlists().await?;
        let followed: PlaylistsResponse = self.api.get("me/playlists/followed").await?;
        let artists: ArtistsResponse = self.api.get("me/following").await?;

        Ok(LibraryContent {
            playlists: dedupe_playlists(own.into_iter().chain(followed.playlists)),
            artists: artists.artists,
        })
    }

    /// Raw records of the liked tracks.
    pub async fn liked_songs(&self) -> Result<Vec<ApiTrack>> {
        let response: TracksResponse = self.api.get("me/tracks/liked").await?;
        Ok(response.tracks)
    }

    pub async fn liked_track_ids(&self) -> Result<HashSet<TrackId>> {
        Ok(self
            .liked_songs()
            .await?
            .iter()
            .map(|track| track.track_id().clone())
            .collect())
    }

    /// Ids of every saved track.
    ///
    /// Empty when signed out or when building the set fails; a failed
    /// build is not cached.
    pub async fn saved_track_ids(&self) -> HashSet<TrackId> {
        if !self.api.has_session() {
            return HashSet::new();
        }

        let service = self.clone();
        let result = self
            .saved_ids
            .get_or_fetch(move || async move { service.collect_saved_ids().await })
            .await;

        match result {
            Ok(ids) => ids,
            Err(e) => {
                warn!(error = %e, "Failed to load saved track ids");
                HashSet::new()
            }
        }
    }

    async fn collect_saved_ids(&self) -> Result<HashSet<TrackId>> {
        debug!("Building saved track index");
        let mut ids = self.liked_track_ids().await?;

        let playlists = self.playlists.my_playlists().await?;
        let lookups = playlists
            .iter()
            .filter(|playlist| playlist.name != LIKED_SONGS_PLAYLIST)
            .map(|playlist| self.playlists.playlist_tracks(&playlist.id));

        for rows in try_join_all(lookups).await? {
            ids.extend(rows.iter().map(|row| row.track_id().clone()));
        }

        debug!(count = ids.len(), "Saved track index built");
        Ok(ids)
    }

    pub fn clear_saved_track_ids_cache(&self) {
        self.saved_ids.invalidate();
    }

    pub async fn like_track(&self, id: &TrackId) -> Result<()> {
        self.api.require_session()?;
        self.api
            .post_empty::<serde_json::Value>(&format!("tracks/{id}/like"))
            .await?;

        info!(track_id = %id, "Track liked");
        self.saved_changed();
        Ok(())
    }

    pub async fn unlike_track(&self, id: &TrackId) -> Result<()> {
        self.api.require_session()?;
        self.api
            .delete::<serde_json::Value>(&format!("tracks/{id}/like"))
            .await?;

        info!(track_id = %id, "Track unliked");
        self.saved_changed();
        Ok(())
    }

    pub fn playlists(&self) -> &PlaylistService {
        &self.playlists
    }

    pub(crate) fn api(&self) -> &ApiClient {
        &self.api
    }

    pub(crate) fn saved_changed(&self) {
        self.saved_ids.invalidate();
        self.events.emit(LibraryEvent::SavedTracksChanged);
    }
}

#[async_trait]
impl SavedTracks for LibraryService {
    fn is_authenticated(&self) -> bool {
        self.api.has_session()
    }

    async fn saved_track_ids(&self) -> riff_core::Result<HashSet<TrackId>> {
        Ok(LibraryService::saved_track_ids(self).await)
    }

    async fn like_track(&self, id: &TrackId) -> riff_core::Result<()> {
        Ok(LibraryService::like_track(self, id).await?)
    }

    async fn unlike_track(&self, id: &TrackId) -> riff_core::Result<()> {
        Ok(LibraryService::unlike_track(self, id).await?)
    }
}

/// Keep the first position of each id and the last record seen for it
fn dedupe_playlists(
    playlists: impl IntoIterator<Item = PlaylistSummary>,
) -> Vec<PlaylistSummary> {
    let mut merged: Vec<PlaylistSummary> = Vec::new();
    let mut positions = HashMap::new();

    for playlist in playlists {
        match positions.get(&playlist.id) {
            Some(&at) => merged[at] = playlist,
            None => {
                positions.insert(playlist.id.clone(), merged.len());
                merged.push(playlist);
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use riff_core::PlaylistId;

    fn playlist(id: &str, name: &str) -> PlaylistSummary {
        PlaylistSummary {
            id: PlaylistId::new(id),
            name: name.to_string(),
            description: None,
            image_url: None,
            user_display_name: None,
            is_public: true,
            total_tracks: None,
        }
    }

    #[test]
    fn dedupe_keeps_first_position_and_last_record() {
        let merged = dedupe_playlists(vec![
            playlist("a", "Mine"),
            playlist("b", "Also mine"),
            playlist("c", "Followed"),
            playlist("a", "Mine (followed copy)"),
        ]);

        let names: Vec<_> = merged.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Mine (followed copy)", "Also mine", "Followed"]);
    }
}
