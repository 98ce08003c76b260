//! Shared, async-facing handle to the player
//!
//! The [`Player`] itself is synchronous. Anything that has to wait on the
//! network (loading a context, checking or changing the saved status of a
//! track) goes through [`PlayerHandle`], which never holds the player lock
//! across an await point.

use crate::events::{EventBus, Notice, PlayerEvent};
use crate::player::Player;
use crate::types::{PlaybackState, RepeatMode};
use riff_core::{SavedTracks, Track, TrackId};
use std::fmt::{self, Display};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Result of [`PlayerHandle::request_context_playback`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextPlayback {
    /// The context was already playing; play/pause was toggled
    Toggled,
    /// The context was loaded and its first track started
    Started,
    /// The context has no tracks
    Empty,
    /// The tracks could not be loaded
    Failed,
    /// A later playback request won while this one was loading
    Superseded,
}

/// Result of [`PlayerHandle::like_current_track`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikeOutcome {
    /// Nobody is signed in; the caller should offer to log in
    LoginRequired,
    NoTrack,
    /// Already saved; the caller should offer a playlist picker instead
    AlreadySaved(TrackId),
    Liked,
    /// The save failed and was rolled back
    Failed,
}

/// Cloneable handle shared by every surface that drives playback
#[derive(Clone)]
pub struct PlayerHandle {
    player: Arc<Mutex<Player>>,
    library: Arc<dyn SavedTracks>,
    events: EventBus,
    /// Bumped by every playback request; the latest one wins
    generation: Arc<AtomicU64>,
}

impl PlayerHandle {
    pub fn new(player: Player, library: Arc<dyn SavedTracks>) -> Self {
        let events = player.events().clone();
        Self {
            player: Arc::new(Mutex::new(player)),
            library,
            events,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Run `f` with exclusive access to the player
    pub fn with<R>(&self, f: impl FnOnce(&mut Player) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn state(&self) -> PlaybackState {
        self.with(|p| p.state())
    }

    /// Play a whole context, e.g. the play button on a playlist page
    ///
    /// If `context_name` is already the playing context this only toggles
    /// play/pause and `provider` is not called. Otherwise the provider's
    /// tracks replace the queue, starting from the first one. When several
    /// requests overlap, only the most recent one takes effect.
    pub async fn request_context_playback<F, Fut, E>(
        &self,
        context_name: &str,
        provider: F,
    ) -> ContextPlayback
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Vec<Track>, E>>,
        E: Display,
    {
        let toggled = self.with(|p| {
            if p.play_context_name() == Some(context_name) && p.current_track().is_some() {
                p.toggle_play_pause();
                true
            } else {
                false
            }
        });
        if toggled {
            return ContextPlayback::Toggled;
        }

        let ticket = self.next_generation();
        let result = provider().await;

        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!(context = context_name, "Context playback superseded");
            return ContextPlayback::Superseded;
        }

        let tracks = match result {
            Ok(tracks) => tracks,
            Err(e) => {
                warn!(context = context_name, error = %e, "Failed to load context tracks");
                self.events.notify(Notice::error("Could not load tracks to play."));
                return ContextPlayback::Failed;
            }
        };

        let Some(first) = tracks.first().cloned() else {
            info!(context = context_name, "Context has no tracks");
            self.events.notify(Notice::error("This playlist is empty."));
            return ContextPlayback::Empty;
        };

        if self.start_now(&first, tracks, Some(context_name)).await {
            ContextPlayback::Started
        } else {
            ContextPlayback::Failed
        }
    }

    /// Play `track` within `context_tracks`
    pub async fn start_playback(
        &self,
        track: &Track,
        context_tracks: Vec<Track>,
        context_name: Option<&str>,
    ) -> bool {
        self.next_generation();
        self.start_now(track, context_tracks, context_name).await
    }

    /// Jump to a track in the current queue
    pub async fn play_from_queue(&self, track_id: &TrackId) -> bool {
        self.next_generation();
        let started = self.with(|p| p.play_from_queue(track_id));
        if started {
            self.sync_saved_status().await;
        }
        started
    }

    pub async fn next(&self) {
        self.track_changing(Player::next).await;
    }

    pub async fn previous(&self) {
        self.track_changing(Player::previous).await;
    }

    /// The output finished the current track
    pub async fn on_ended(&self) {
        self.track_changing(Player::on_ended).await;
    }

    pub async fn toggle_shuffle(&self) -> bool {
        self.track_changing(Player::toggle_shuffle).await
    }

    /// Restore the persisted session and look up its saved status
    pub async fn restore(&self) -> bool {
        let restored = self.with(Player::restore);
        if restored {
            self.sync_saved_status().await;
        }
        restored
    }

    pub fn play(&self) {
        self.with(Player::play);
    }

    pub fn pause(&self) {
        self.with(Player::pause);
    }

    pub fn toggle_play_pause(&self) {
        self.with(Player::toggle_play_pause);
    }

    pub fn toggle_repeat(&self) -> RepeatMode {
        self.with(Player::toggle_repeat)
    }

    pub fn set_volume(&self, level: f64) {
        self.with(|p| p.set_volume(level));
    }

    pub fn toggle_mute(&self) {
        self.with(Player::toggle_mute);
    }

    pub fn seek(&self, fraction: f64) -> bool {
        self.with(|p| p.seek(fraction))
    }

    pub fn remove_from_context(&self, track_id: &TrackId) -> bool {
        self.with(|p| p.remove_from_context(track_id))
    }

    /// Look up whether the current track is saved and publish the answer
    ///
    /// Returns `None` when nothing is loaded or the track changed while the
    /// lookup was in flight.
    pub async fn sync_saved_status(&self) -> Option<bool> {
        let track_id = self.with(|p| p.current_track().map(|t| t.id.clone()))?;

        let saved = if self.library.is_authenticated() {
            match self.library.saved_track_ids().await {
                Ok(ids) => ids.contains(&track_id),
                Err(e) => {
                    warn!(track_id = %track_id, error = %e, "Failed to check saved status");
                    false
                }
            }
        } else {
            false
        };

        self.with(|p| p.set_saved_status(&track_id, saved))
            .then_some(saved)
    }

    /// Heart button on the now-playing bar
    ///
    /// The saved flag flips immediately and is rolled back if the server
    /// rejects the change.
    pub async fn like_current_track(&self) -> LikeOutcome {
        if !self.library.is_authenticated() {
            return LikeOutcome::LoginRequired;
        }

        let current = self.with(|p| {
            p.current_track()
                .map(|t| (t.id.clone(), p.is_current_track_saved()))
        });
        let Some((track_id, saved)) = current else {
            return LikeOutcome::NoTrack;
        };
        if saved {
            return LikeOutcome::AlreadySaved(track_id);
        }

        self.with(|p| p.set_saved_status(&track_id, true));

        match self.library.like_track(&track_id).await {
            Ok(()) => {
                info!(track_id = %track_id, "Liked track");
                self.events.notify(Notice::success("Added to Liked Songs"));
                LikeOutcome::Liked
            }
            Err(e) => {
                warn!(track_id = %track_id, error = %e, "Failed to like track");
                self.with(|p| p.set_saved_status(&track_id, false));
                self.events.notify(Notice::error("Couldn't add to Liked Songs."));
                LikeOutcome::Failed
            }
        }
    }

    async fn start_now(
        &self,
        track: &Track,
        context_tracks: Vec<Track>,
        context_name: Option<&str>,
    ) -> bool {
        let started = self.with(|p| p.start_playback(track, context_tracks, context_name));
        if started {
            self.sync_saved_status().await;
        }
        started
    }

    /// Run a synchronous transition and refresh saved status if the
    /// current track changed
    async fn track_changing<R>(&self, f: impl FnOnce(&mut Player) -> R) -> R {
        let (before, result, after) = self.with(|p| {
            let before = p.current_track().map(|t| t.id.clone());
            let result = f(p);
            let after = p.current_track().map(|t| t.id.clone());
            (before, result, after)
        });

        if before != after {
            self.sync_saved_status().await;
        }
        result
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn lock(&self) -> MutexGuard<'_, Player> {
        self.player.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for PlayerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayerHandle")
            .field("player", &*self.lock())
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
