//! Add-to-playlist selection for a single track.

use crate::error::Result;
use crate::library::{LibraryService, LIKED_SONGS_PLAYLIST};
use crate::types::{PlaylistUpdate, TrackDetails};
use futures_util::future::{join_all, try_join_all, BoxFuture, FutureExt};
use riff_core::{PlaylistId, PlaylistSummary, Track, TrackId};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Selection id standing for Liked Songs
pub const LIKED_SONGS: &str = "liked-songs";

/// Message to show when [`PlaylistMembership::apply`] fails
pub const APPLY_FAILED: &str = "An error occurred. Please try again.";

/// User-facing result of applying a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Success(&'static str),
    Info(&'static str),
}

/// Selections to add and remove
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipDiff {
    pub to_add: Vec<String>,
    pub to_remove: Vec<String>,
}

impl MembershipDiff {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Messages describing the change, additions first
    pub fn feedback(&self) -> Vec<Feedback> {
        let mut feedback = Vec::new();
        if !self.to_add.is_empty() {
            feedback.push(if self.to_add.iter().any(|id| id == LIKED_SONGS) {
                Feedback::Success("Added to Liked Songs.")
            } else {
                Feedback::Success("Saved to your playlists.")
            });
        }
        if !self.to_remove.is_empty() {
            feedback.push(if self.to_remove.iter().any(|id| id == LIKED_SONGS) {
                Feedback::Info("Removed from Liked Songs.")
            } else {
                Feedback::Info("Removed from playlists.")
            });
        }
        feedback
    }
}

/// What [`PlaylistMembership::apply`] did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Applied {
    pub diff: MembershipDiff,
    /// Previously empty playlists that took the track's cover
    pub covers_updated: Vec<PlaylistId>,
}

/// Which of the user's playlists (and Liked Songs) hold a track.
///
/// Loaded once, toggled freely, then applied as a diff against the
/// loaded state.
#[derive(Debug, Clone)]
pub struct PlaylistMembership {
    track_id: TrackId,
    track_image: Option<String>,
    playlists: Vec<PlaylistSummary>,
    initial: HashSet<String>,
    current: HashSet<String>,
    status_checked: bool,
}

impl PlaylistMembership {
    /// Load the user's playlists and where `track` currently sits.
    ///
    /// Fails only when the playlists cannot be listed. A failed status
    /// check leaves nothing selected; see [`Self::status_checked`].
    pub async fn load(library: &LibraryService, track: &Track) -> Result<Self> {
        let playlists: Vec<PlaylistSummary> = library
            .playlists()
            .my_playlists()
            .await?
            .into_iter()
            .filter(|playlist| playlist.name != LIKED_SONGS_PLAYLIST)
            .collect();

        let mut membership = Self {
            track_id: track.id.clone(),
            track_image: track.image_url.clone(),
            playlists,
            initial: HashSet::new(),
            current: HashSet::new(),
            status_checked: false,
        };

        match membership.check_status(library).await {
            Ok(selected) => {
                membership.initial = selected.clone();
                membership.current = selected;
                membership.status_checked = true;
            }
            Err(e) => warn!(track_id = %track.id, error = %e, "Couldn't check track status"),
        }

        Ok(membership)
    }

    async fn check_status(&self, library: &LibraryService) -> Result<HashSet<String>> {
        let details_path = format!("tracks/{}", self.track_id);
        let details = library.api().get::<TrackDetails>(&details_path);

        let lookups = self.playlists.iter().map(|playlist| async move {
            match library.playlists().playlist_tracks(&playlist.id).await {
                Ok(rows) => rows
                    .iter()
                    .any(|row| row.track_id() == &self.track_id)
                    .then(|| playlist.id.to_string()),
                Err(e) => {
                    warn!(playlist_id = %playlist.id, error = %e, "Couldn't check playlist");
                    None
                }
            }
        });

        let (details, found) = futures_util::join!(details, join_all(lookups));

        let mut selected: HashSet<String> = found.into_iter().flatten().collect();
        if details?.is_liked {
            selected.insert(LIKED_SONGS.to_string());
        }
        Ok(selected)
    }

    pub fn track_id(&self) -> &TrackId {
        &self.track_id
    }

    pub fn track_image(&self) -> Option<&str> {
        self.track_image.as_deref()
    }

    /// The user's playlists, Liked Songs excluded
    pub fn playlists(&self) -> &[PlaylistSummary] {
        &self.playlists
    }

    /// Whether the loaded selection reflects the server
    pub fn status_checked(&self) -> bool {
        self.status_checked
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.current.contains(id)
    }

    /// Flip one selection. Returns whether it is now selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.current.remove(id) {
            false
        } else {
            self.current.insert(id.to_string());
            true
        }
    }

    /// Changes since load, Liked Songs first, then playlist order
    pub fn diff(&self) -> MembershipDiff {
        let mut diff = MembershipDiff::default();
        for id in self.selection_order() {
            match (self.initial.contains(id), self.current.contains(id)) {
                (false, true) => diff.to_add.push(id.to_string()),
                (true, false) => diff.to_remove.push(id.to_string()),
                _ => {}
            }
        }
        diff
    }

    fn selection_order(&self) -> impl Iterator<Item = &str> {
        std::iter::once(LIKED_SONGS).chain(self.playlists.iter().map(|p| p.id.as_str()))
    }

    /// Push the diff to the server.
    ///
    /// Additions and removals run concurrently. Playlists that were empty
    /// take the track's cover. Both the playlist and saved-track caches
    /// are dropped afterwards.
    pub async fn apply(&self, library: &LibraryService) -> Result<Applied> {
        let diff = self.diff();
        if diff.is_empty() {
            return Ok(Applied::default());
        }
        debug!(
            track_id = %self.track_id,
            add = diff.to_add.len(),
            remove = diff.to_remove.len(),
            "Applying playlist membership"
        );

        let track = &self.track_id;
        let mut writes: Vec<BoxFuture<'_, Result<()>>> = Vec::new();
        for id in &diff.to_add {
            writes.push(if id == LIKED_SONGS {
                library.like_track(track).boxed()
            } else {
                let playlist = PlaylistId::new(id.as_str());
                async move { library.playlists().add_track(&playlist, track).await }.boxed()
            });
        }
        for id in &diff.to_remove {
            writes.push(if id == LIKED_SONGS {
                library.unlike_track(track).boxed()
            } else {
                let playlist = PlaylistId::new(id.as_str());
                async move { library.playlists().remove_track(&playlist, track).await }.boxed()
            });
        }
        try_join_all(writes).await?;

        let covers_updated = self.newly_filled();
        if let Some(image_url) = &self.track_image {
            let update = PlaylistUpdate {
                image_url: Some(image_url.clone()),
                ..PlaylistUpdate::default()
            };
            try_join_all(
                covers_updated
                    .iter()
                    .map(|id| library.playlists().update_playlist(id, &update)),
            )
            .await?;
        }

        library.playlists().invalidate();
        library.saved_changed();

        info!(track_id = %self.track_id, "Playlist membership updated");
        Ok(Applied {
            diff,
            covers_updated: if self.track_image.is_some() {
                covers_updated
            } else {
                Vec::new()
            },
        })
    }

    /// Added playlists that held no tracks before
    fn newly_filled(&self) -> Vec<PlaylistId> {
        self.playlists
            .iter()
            .filter(|playlist| {
                playlist.total_tracks == Some(0)
                    && !self.initial.contains(playlist.id.as_str())
                    && self.current.contains(playlist.id.as_str())
            })
            .map(|playlist| playlist.id.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn membership(initial: &[&str], playlists: &[(&str, Option<u32>)]) -> PlaylistMembership {
        let initial: HashSet<String> = initial.iter().map(|s| s.to_string()).collect();
        PlaylistMembership {
            track_id: TrackId::new("t1"),
            track_image: Some("https://img/t1.jpg".into()),
            playlists: playlists
                .iter()
                .map(|(id, total)| PlaylistSummary {
                    id: PlaylistId::new(*id),
                    name: format!("Playlist {id}"),
                    description: None,
                    image_url: None,
                    user_display_name: None,
                    is_public: true,
                    total_tracks: *total,
                })
                .collect(),
            current: initial.clone(),
            initial,
            status_checked: true,
        }
    }

    #[test]
    fn untouched_selection_has_no_diff() {
        let m = membership(&[LIKED_SONGS, "p1"], &[("p1", Some(3)), ("p2", Some(0))]);
        assert!(m.diff().is_empty());
        assert!(m.diff().feedback().is_empty());
    }

    #[test]
    fn diff_is_current_against_initial() {
        let mut m = membership(&["p1"], &[("p1", Some(3)), ("p2", Some(0)), ("p3", None)]);

        assert!(m.toggle("p2"));
        assert!(!m.toggle("p1"));
        assert!(m.toggle(LIKED_SONGS));
        assert!(m.toggle("p3"));
        assert!(!m.toggle("p3"));

        let diff = m.diff();
        assert_eq!(diff.to_add, vec![LIKED_SONGS.to_string(), "p2".to_string()]);
        assert_eq!(diff.to_remove, vec!["p1".to_string()]);
        assert_eq!(m.newly_filled(), vec![PlaylistId::new("p2")]);
    }

    #[test]
    fn feedback_names_liked_songs_first() {
        let diff = MembershipDiff {
            to_add: vec!["p1".into(), LIKED_SONGS.into()],
            to_remove: vec!["p2".into()],
        };
        assert_eq!(
            diff.feedback(),
            vec![
                Feedback::Success("Added to Liked Songs."),
                Feedback::Info("Removed from playlists."),
            ]
        );

        let diff = MembershipDiff {
            to_add: vec![],
            to_remove: vec![LIKED_SONGS.into()],
        };
        assert_eq!(diff.feedback(), vec![Feedback::Info("Removed from Liked Songs.")]);
    }
}
