//! Session: storage, API services, library shelf and player wired together.

use crate::config::ClientConfig;
use crate::error::Result;
use riff_core::{
    ArtistSummary, KeyValueStore, PlaylistId, PlaylistSummary, SavedTracks, Storage, Track, User,
};
use riff_library::{
    ApiClient, AuthService, Catalog, Feedback, ItemKind, LibraryEvent, LibraryEvents,
    LibraryService, LibraryShelf, PlaylistMembership, PlaylistService, PlaylistUpdate,
    ShelfChange, ShelfItem, APPLY_FAILED, LIKED_SONGS_PLAYLIST,
};
use riff_playback::{AudioOutput, ContextPlayback, Notice, Player, PlayerEvent, PlayerHandle};
use riff_storage::{FileStore, MemoryStore};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Everything a signed-in (or anonymous) client needs.
///
/// Cheap accessors hand out the underlying services for anything the
/// session does not wrap.
pub struct Session {
    config: ClientConfig,
    storage: Storage,
    events: LibraryEvents,
    auth: AuthService,
    library: Arc<LibraryService>,
    catalog: Catalog,
    player: PlayerHandle,
    shelf: Arc<Mutex<LibraryShelf>>,
    // Closed on drop; background tasks stop with it
    shutdown: watch::Sender<()>,
}

impl Session {
    /// Build a session from configuration.
    ///
    /// State is kept under `storage.dir` when set, otherwise in memory.
    pub fn open(config: ClientConfig, output: Box<dyn AudioOutput>) -> Result<Self> {
        config.validate()?;

        let backend: Arc<dyn KeyValueStore> = match &config.storage.dir {
            Some(dir) => Arc::new(FileStore::open(dir)?),
            None => Arc::new(MemoryStore::new()),
        };
        Self::with_backend(config, backend, output)
    }

    /// Build a session over an existing storage backend
    pub fn with_backend(
        config: ClientConfig,
        backend: Arc<dyn KeyValueStore>,
        output: Box<dyn AudioOutput>,
    ) -> Result<Self> {
        let storage = Storage::new(backend);
        let api = ApiClient::new(&config.api.base_url, storage.clone())?;
        let events = LibraryEvents::default();

        let auth = AuthService::new(api.clone(), events.clone());
        let playlists = PlaylistService::new(api.clone(), events.clone());
        let library = Arc::new(LibraryService::new(api.clone(), playlists, events.clone()));
        let catalog = Catalog::new(api.clone());

        let player = Player::new(config.playback_config(), output, storage.clone());
        let saved: Arc<dyn SavedTracks> = library.clone();
        let player = PlayerHandle::new(player, saved);

        let shelf = Arc::new(Mutex::new(LibraryShelf::new(storage.clone())));
        let (shutdown, _) = watch::channel(());

        info!(api = %api.base_url(), "Session opened");
        Ok(Self {
            config,
            storage,
            events,
            auth,
            library,
            catalog,
            player,
            shelf,
            shutdown,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn library(&self) -> &LibraryService {
        &self.library
    }

    pub fn playlists(&self) -> &PlaylistService {
        self.library.playlists()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn player(&self) -> &PlayerHandle {
        &self.player
    }

    pub fn subscribe_player(&self) -> broadcast::Receiver<PlayerEvent> {
        self.player.subscribe()
    }

    pub fn subscribe_library(&self) -> broadcast::Receiver<LibraryEvent> {
        self.events.subscribe()
    }

    /// Run `f` against the library shelf
    pub fn shelf<R>(&self, f: impl FnOnce(&mut LibraryShelf) -> R) -> R {
        let mut shelf = self.shelf.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut shelf)
    }

    /// Restore the stored session and the player, then load the shelf.
    pub async fn start(&self) -> Option<User> {
        let user = self.auth.restore_session().await;
        let restored = self.player.restore().await;

        if user.is_some() {
            self.refresh_shelf().await;
        }

        info!(
            signed_in = user.is_some(),
            player_restored = restored,
            "Session started"
        );
        user
    }

    /// Keep the player's saved flag in step with library changes.
    ///
    /// The task ends when the session is dropped.
    pub fn spawn_sync(&self) -> JoinHandle<()> {
        let mut rx = self.events.subscribe();
        let mut shutdown = self.shutdown.subscribe();
        let player = self.player.clone();

        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    _ = shutdown.changed() => break,
                    event = rx.recv() => event,
                };
                match event {
                    Ok(LibraryEvent::SavedTracksChanged | LibraryEvent::AuthChanged(_)) => {
                        player.sync_saved_status().await;
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Library events lagged; resyncing saved status");
                        player.sync_saved_status().await;
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("Library event sync stopped");
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let user = self.auth.login(email, password).await?;
        self.refresh_shelf().await;
        self.player.sync_saved_status().await;
        Ok(user)
    }

    pub async fn logout(&self) {
        self.auth.logout().await;

        self.shelf(LibraryShelf::reset);
        self.library.clear_saved_track_ids_cache();
        self.library.playlists().invalidate();
        self.player.sync_saved_status().await;
    }

    /// Reload the shelf from the API
    pub async fn refresh_shelf(&self) {
        let content = self.library.library_content().await;
        self.shelf(|shelf| shelf.load(&content));
    }

    // ===== Playback contexts =====

    pub async fn play_playlist(&self, playlist: &PlaylistSummary) -> ContextPlayback {
        self.shelf(|shelf| shelf.track_activity(playlist.id.as_str()));

        let catalog = self.catalog.clone();
        let id = playlist.id.clone();
        self.player
            .request_context_playback(&playlist.name, move || async move {
                catalog.playlist_tracks(&id).await
            })
            .await
    }

    pub async fn play_artist(&self, artist: &ArtistSummary) -> ContextPlayback {
        self.shelf(|shelf| shelf.track_activity(artist.id.as_str()));

        let catalog = self.catalog.clone();
        let id = artist.id.clone();
        let name = artist.name.clone();
        self.player
            .request_context_playback(&artist.name, move || async move {
                catalog.artist_popular_tracks(&id, &name).await
            })
            .await
    }

    pub async fn play_liked_songs(&self) -> ContextPlayback {
        let catalog = self.catalog.clone();
        self.player
            .request_context_playback(LIKED_SONGS_PLAYLIST, move || async move {
                catalog.liked_tracks().await
            })
            .await
    }

    // ===== Library edits mirrored on the shelf =====

    pub async fn create_playlist(&self) -> Result<PlaylistSummary> {
        let playlist = self.library.playlists().create_playlist().await?;
        self.shelf(|shelf| shelf.apply(ShelfChange::Created(ShelfItem::from_playlist(&playlist))));
        Ok(playlist)
    }

    pub async fn update_playlist(
        &self,
        id: &PlaylistId,
        update: &PlaylistUpdate,
    ) -> Result<PlaylistSummary> {
        let playlist = self.library.playlists().update_playlist(id, update).await?;
        self.shelf(|shelf| {
            shelf.apply(ShelfChange::Updated {
                id: id.to_string(),
                name: update.name.clone(),
                image_url: update.image_url.clone(),
            });
        });
        Ok(playlist)
    }

    pub async fn delete_playlist(&self, id: &PlaylistId) -> Result<()> {
        self.library.playlists().delete_playlist(id).await?;
        self.shelf(|shelf| shelf.apply(ShelfChange::Deleted(id.to_string())));
        Ok(())
    }

    pub async fn follow_playlist(&self, playlist: &PlaylistSummary) -> Result<()> {
        self.library
            .follow(ItemKind::Playlist, playlist.id.as_str())
            .await?;
        self.shelf(|shelf| shelf.apply(ShelfChange::Followed(ShelfItem::from_playlist(playlist))));
        Ok(())
    }

    pub async fn follow_artist(&self, artist: &ArtistSummary) -> Result<()> {
        self.library.follow(ItemKind::Artist, artist.id.as_str()).await?;
        self.shelf(|shelf| shelf.apply(ShelfChange::Followed(ShelfItem::from_artist(artist))));
        Ok(())
    }

    pub async fn unfollow(&self, kind: ItemKind, id: &str) -> Result<()> {
        self.library.unfollow(kind, id).await?;
        self.shelf(|shelf| shelf.apply(ShelfChange::Unfollowed(id.to_string())));
        Ok(())
    }

    // ===== Add to playlist =====

    /// Load where `track` currently sits, for the add-to-playlist dialog
    pub async fn edit_membership(&self, track: &Track) -> Result<PlaylistMembership> {
        match PlaylistMembership::load(&self.library, track).await {
            Ok(membership) => {
                if !membership.status_checked() {
                    self.player
                        .events()
                        .notify(Notice::error("Couldn't check track status."));
                }
                Ok(membership)
            }
            Err(e) => {
                self.player
                    .events()
                    .notify(Notice::error("Could not load your playlists."));
                Err(e.into())
            }
        }
    }

    /// Apply the dialog's selection and report the outcome as notices.
    ///
    /// Returns whether the changes were saved.
    pub async fn apply_membership(&self, membership: &PlaylistMembership) -> bool {
        let events = self.player.events();
        match membership.apply(&self.library).await {
            Ok(applied) => {
                if let Some(image_url) = membership.track_image() {
                    self.shelf(|shelf| {
                        for id in &applied.covers_updated {
                            shelf.apply(ShelfChange::Updated {
                                id: id.to_string(),
                                name: None,
                                image_url: Some(image_url.to_string()),
                            });
                        }
                    });
                }
                for feedback in applied.diff.feedback() {
                    events.notify(match feedback {
                        Feedback::Success(message) => Notice::success(message),
                        Feedback::Info(message) => Notice::info(message),
                    });
                }
                true
            }
            Err(e) => {
                warn!(track_id = %membership.track_id(), error = %e, "Failed to update playlists");
                events.notify(Notice::error(APPLY_FAILED));
                false
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("player", &self.player)
            .finish_non_exhaustive()
    }
}
