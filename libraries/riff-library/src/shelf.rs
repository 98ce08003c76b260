//! Library sidebar: pins, sorting, filtering and search.
//!
//! The shelf mirrors the user's library as a flat list of playlists and
//! artists. Pins, creation order, last-opened times and the chosen sort
//! and filter all survive restarts through [`Storage`].

use crate::error::{LibraryError, Result};
use crate::library::{LibraryService, LIKED_SONGS_PLAYLIST};
use crate::types::{ItemKind, LibraryContent};
use chrono::Utc;
use riff_core::{keys, ArtistSummary, PlaylistSummary, Storage, User};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, info};

/// Most items that can be pinned at once
pub const MAX_PINNED_ITEMS: usize = 3;

/// Creator sort key for items without one, sorts them last
const NO_CREATOR: &str = "zzz";

/// Order of the unpinned items
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// Last opened first, then recently added
    #[default]
    Recents,
    /// Newest follows and creations first
    RecentlyAdded,
    Alphabetical,
    Creator,
}

/// Restrict the shelf to one kind of item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    Playlists,
    Artists,
}

impl Filter {
    fn matches(self, kind: ItemKind) -> bool {
        matches!(
            (self, kind),
            (Self::Playlists, ItemKind::Playlist) | (Self::Artists, ItemKind::Artist)
        )
    }
}

/// One playlist or artist on the shelf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfItem {
    pub id: String,
    pub name: String,
    pub kind: ItemKind,
    pub image_url: Option<String>,
    /// Playlist owner's display name
    pub creator: Option<String>,
    pub pinned: bool,
}

impl ShelfItem {
    pub fn from_playlist(playlist: &PlaylistSummary) -> Self {
        Self {
            id: playlist.id.to_string(),
            name: playlist.name.clone(),
            kind: ItemKind::Playlist,
            image_url: playlist.image_url.clone(),
            creator: playlist.user_display_name.clone(),
            pinned: false,
        }
    }

    pub fn from_artist(artist: &ArtistSummary) -> Self {
        Self {
            id: artist.id.to_string(),
            name: artist.name.clone(),
            kind: ItemKind::Artist,
            image_url: artist.image_url.clone(),
            creator: None,
            pinned: false,
        }
    }

    /// Second line under the name, e.g. `Playlist • Jane`
    pub fn subtitle(&self) -> String {
        match (self.kind, self.creator.as_deref()) {
            (ItemKind::Artist, _) => "Artist".to_string(),
            (ItemKind::Playlist, Some(creator)) if !creator.is_empty() => {
                format!("Playlist • {creator}")
            }
            (ItemKind::Playlist, _) => "Playlist".to_string(),
        }
    }

    fn creator_key(&self) -> String {
        match self.kind {
            ItemKind::Playlist => self
                .creator
                .as_deref()
                .map(|c| c.trim().to_lowercase())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| NO_CREATOR.to_string()),
            ItemKind::Artist => NO_CREATOR.to_string(),
        }
    }

    fn matches_search(&self, term: &str) -> bool {
        format!("{} {}", self.name, self.subtitle())
            .to_lowercase()
            .contains(term)
    }
}

/// A change to reconcile into the shelf
#[derive(Debug, Clone, PartialEq)]
pub enum ShelfChange {
    Followed(ShelfItem),
    /// A playlist the user just made
    Created(ShelfItem),
    Unfollowed(String),
    Deleted(String),
    Updated {
        id: String,
        name: Option<String>,
        image_url: Option<String>,
    },
}

/// Sidebar state for the signed-in user
#[derive(Debug)]
pub struct LibraryShelf {
    storage: Storage,
    items: Vec<ShelfItem>,
    pinned: Vec<String>,
    create_order: Vec<String>,
}

impl LibraryShelf {
    pub fn new(storage: Storage) -> Self {
        let pinned = storage.get(keys::PINNED_ITEMS).unwrap_or_default();
        let create_order = storage.get(keys::LIBRARY_CREATE_ORDER).unwrap_or_default();
        Self {
            storage,
            items: Vec::new(),
            pinned,
            create_order,
        }
    }

    /// Replace the items with freshly loaded library content.
    ///
    /// Liked Songs is kept off the shelf.
    pub fn load(&mut self, content: &LibraryContent) {
        let playlists = content
            .playlists
            .iter()
            .filter(|playlist| playlist.name != LIKED_SONGS_PLAYLIST)
            .map(ShelfItem::from_playlist);
        let artists = content.artists.iter().map(ShelfItem::from_artist);

        self.items = playlists.chain(artists).collect();
        for item in &mut self.items {
            item.pinned = self.pinned.contains(&item.id);
        }
        debug!(items = self.items.len(), "Library shelf loaded");
    }

    /// Reload the items from the library service
    pub async fn refresh(&mut self, library: &LibraryService) {
        let content = library.library_content().await;
        self.load(&content);
    }

    /// Forget everything tied to the previous user.
    pub fn reset(&mut self) {
        self.items.clear();
        self.pinned.clear();
        self.create_order.clear();
        self.storage.remove(keys::LIBRARY_CREATE_ORDER);
    }

    /// Items in library order, pinned or not
    pub fn items(&self) -> &[ShelfItem] {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&ShelfItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn pinned_ids(&self) -> &[String] {
        &self.pinned
    }

    pub fn create_order(&self) -> &[String] {
        &self.create_order
    }

    /// Pin or unpin an item. Returns whether it is now pinned.
    pub fn toggle_pin(&mut self, id: &str) -> Result<bool> {
        let at = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| LibraryError::ItemNotFound(id.to_string()))?;

        let pinned = if self.items[at].pinned {
            self.pinned.retain(|pinned| pinned != id);
            false
        } else {
            if self.pinned.len() >= MAX_PINNED_ITEMS {
                return Err(LibraryError::PinLimitReached {
                    limit: MAX_PINNED_ITEMS,
                });
            }
            self.pinned.push(id.to_string());
            true
        };

        self.items[at].pinned = pinned;
        self.storage.set(keys::PINNED_ITEMS, &self.pinned);
        debug!(id, pinned, "Pin toggled");
        Ok(pinned)
    }

    /// Reconcile a follow, creation, removal or edit.
    pub fn apply(&mut self, change: ShelfChange) {
        match change {
            ShelfChange::Followed(item) => self.insert(item),
            ShelfChange::Created(mut item) => {
                if item.creator.is_none() {
                    item.creator = self
                        .storage
                        .get::<User>(keys::USER)
                        .and_then(|user| user.display_name);
                }
                self.insert(item);
            }
            ShelfChange::Unfollowed(id) | ShelfChange::Deleted(id) => self.remove(&id),
            ShelfChange::Updated {
                id,
                name,
                image_url,
            } => {
                if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
                    if let Some(name) = name {
                        item.name = name;
                    }
                    if let Some(image_url) = image_url {
                        item.image_url = Some(image_url);
                    }
                }
            }
        }
    }

    fn insert(&mut self, mut item: ShelfItem) {
        info!(id = %item.id, kind = ?item.kind, "Added to library shelf");
        self.create_order.insert(0, item.id.clone());
        self.storage
            .set(keys::LIBRARY_CREATE_ORDER, &self.create_order);

        item.pinned = false;
        self.items.insert(0, item);
    }

    fn remove(&mut self, id: &str) {
        if self.pinned.iter().any(|pinned| pinned == id) {
            self.pinned.retain(|pinned| pinned != id);
            self.storage.set(keys::PINNED_ITEMS, &self.pinned);
        }
        if self.create_order.iter().any(|created| created == id) {
            self.create_order.retain(|created| created != id);
            self.storage
                .set(keys::LIBRARY_CREATE_ORDER, &self.create_order);
        }
        self.items.retain(|item| item.id != id);
        info!(id, "Removed from library shelf");
    }

    /// Record that an item was opened now.
    pub fn track_activity(&self, id: &str) {
        self.track_activity_at(id, Utc::now().timestamp_millis());
    }

    /// Record that an item was opened at `millis` since the epoch.
    pub fn track_activity_at(&self, id: &str, millis: i64) {
        if id.is_empty() {
            return;
        }
        let mut activity = self.activity();
        activity.insert(id.to_string(), millis);
        self.storage.set(keys::LIBRARY_ACTIVITY, &activity);
    }

    /// Last-opened times in epoch millis
    pub fn activity(&self) -> HashMap<String, i64> {
        self.storage
            .get(keys::LIBRARY_ACTIVITY)
            .unwrap_or_default()
    }

    pub fn sort_mode(&self) -> SortMode {
        self.storage
            .get(keys::LIBRARY_SORT_BY)
            .unwrap_or_default()
    }

    pub fn set_sort_mode(&self, mode: SortMode) {
        self.storage.set(keys::LIBRARY_SORT_BY, &mode);
    }

    pub fn filter(&self) -> Option<Filter> {
        self.storage.get(keys::LIBRARY_ACTIVE_FILTER)
    }

    /// Set or clear the active filter
    pub fn set_filter(&self, filter: Option<Filter>) {
        match filter {
            Some(filter) => self.storage.set(keys::LIBRARY_ACTIVE_FILTER, &filter),
            None => self.storage.remove(keys::LIBRARY_ACTIVE_FILTER),
        }
    }

    /// Items as the sidebar shows them.
    ///
    /// Pinned items come first in pin order. The rest follow in `sort`
    /// order, ties keeping library order. `filter` and `search` then hide
    /// what does not match; a blank search hides nothing.
    pub fn arranged(&self, sort: SortMode, filter: Option<Filter>, search: &str) -> Vec<&ShelfItem> {
        let pinned = self
            .pinned
            .iter()
            .filter_map(|id| self.items.iter().find(|item| item.pinned && &item.id == id));

        let mut unpinned: Vec<&ShelfItem> = self.items.iter().filter(|item| !item.pinned).collect();
        let activity = self.activity();
        unpinned.sort_by(|a, b| self.compare(sort, &activity, a, b));

        let term = search.trim().to_lowercase();
        pinned
            .chain(unpinned)
            .filter(|item| filter.map_or(true, |f| f.matches(item.kind)))
            .filter(|item| term.is_empty() || item.matches_search(&term))
            .collect()
    }

    /// Same as [`Self::arranged`] with the persisted sort and filter
    pub fn arranged_with_saved(&self, search: &str) -> Vec<&ShelfItem> {
        self.arranged(self.sort_mode(), self.filter(), search)
    }

    fn compare(
        &self,
        sort: SortMode,
        activity: &HashMap<String, i64>,
        a: &ShelfItem,
        b: &ShelfItem,
    ) -> Ordering {
        match sort {
            SortMode::Recents => {
                let last_a = activity.get(&a.id).copied().unwrap_or(0);
                let last_b = activity.get(&b.id).copied().unwrap_or(0);
                last_b
                    .cmp(&last_a)
                    .then_with(|| self.compare_created(a, b))
            }
            SortMode::RecentlyAdded => self.compare_created(a, b),
            SortMode::Alphabetical => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortMode::Creator => a.creator_key().cmp(&b.creator_key()),
        }
    }

    /// Newest created first; items never created or followed here keep
    /// their order after them
    fn compare_created(&self, a: &ShelfItem, b: &ShelfItem) -> Ordering {
        let rank = |item: &ShelfItem| self.create_order.iter().position(|id| id == &item.id);
        match (rank(a), rank(b)) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}
