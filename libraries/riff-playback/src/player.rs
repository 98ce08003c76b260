//! Player - playback and queue state machine
//!
//! Single owner of what is playing, in what order and in what mode.
//!
//! ```text
//!   Empty ──start──▶ Loaded+Playing ◀──play/pause──▶ Loaded+Paused
//!                          │
//!                  next past the end, repeat off
//!                          ▼
//!                   EndOfQueue (paused at 0:00, queue kept)
//! ```
//!
//! Every change that matters for resuming is written to storage as a
//! [`PlaybackSnapshot`]. Progress ticks from the output are throttled.

use crate::error::{PlaybackError, Result};
use crate::events::{EventBus, Notice, PlayerEvent};
use crate::output::AudioOutput;
use crate::queue::{Advance, Queue, Restore};
use crate::types::{PlaybackConfig, PlaybackSnapshot, PlaybackState, Progress, RepeatMode};
use crate::volume::Volume;
use rand::rngs::StdRng;
use rand::SeedableRng;
use riff_core::{Storage, Track, TrackId};
use std::fmt;
use tracing::{debug, info, warn};

pub struct Player {
    config: PlaybackConfig,
    queue: Queue,
    context: Option<String>,
    is_playing: bool,
    is_shuffle: bool,
    repeat: RepeatMode,
    volume: Volume,

    /// Seconds into the current track
    current_time: f64,

    /// Reported by the output once metadata is loaded
    duration: Option<f64>,

    /// Restored position waiting for the output to become seekable
    pending_seek: Option<f64>,

    is_seeking: bool,
    is_adjusting_volume: bool,
    is_current_track_saved: bool,
    last_persisted_time: f64,

    output: Box<dyn AudioOutput>,
    storage: Storage,
    events: EventBus,
    rng: StdRng,
}

impl Player {
    pub fn new(config: PlaybackConfig, output: Box<dyn AudioOutput>, storage: Storage) -> Self {
        let volume = Volume::new(config.default_volume);
        let events = EventBus::new(config.event_capacity);

        let mut player = Self {
            config,
            queue: Queue::new(),
            context: None,
            is_playing: false,
            is_shuffle: false,
            repeat: RepeatMode::Off,
            volume,
            current_time: 0.0,
            duration: None,
            pending_seek: None,
            is_seeking: false,
            is_adjusting_volume: false,
            is_current_track_saved: false,
            last_persisted_time: 0.0,
            output,
            storage,
            events,
            rng: StdRng::from_entropy(),
        };
        player.apply_volume();
        player
    }

    /// Use a specific random source for shuffling
    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    // ===== Getters =====

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.queue.current()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.queue.index()
    }

    pub fn queue(&self) -> &[Track] {
        self.queue.tracks()
    }

    pub fn original_queue(&self) -> &[Track] {
        self.queue.original()
    }

    /// Tracks after the current one
    pub fn upcoming(&self) -> &[Track] {
        self.queue.upcoming()
    }

    pub fn play_context_name(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_shuffle(&self) -> bool {
        self.is_shuffle
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat
    }

    pub fn volume(&self) -> f64 {
        self.volume.level()
    }

    pub fn is_muted(&self) -> bool {
        self.volume.is_muted()
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn is_seeking(&self) -> bool {
        self.is_seeking
    }

    pub fn is_adjusting_volume(&self) -> bool {
        self.is_adjusting_volume
    }

    pub fn is_current_track_saved(&self) -> bool {
        self.is_current_track_saved
    }

    /// Progress of the current track, once its duration is known
    pub fn progress(&self) -> Option<Progress> {
        self.duration.map(|d| Progress::new(self.current_time, d))
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            current_track: self.queue.current().cloned(),
            queue: self.queue.tracks().to_vec(),
            original_queue: self.queue.original().to_vec(),
            current_index: self.queue.index(),
            play_context_name: self.context.clone(),
            is_playing: self.is_playing,
            is_shuffle: self.is_shuffle,
            repeat_mode: self.repeat,
            volume: self.volume.level(),
            is_muted: self.volume.is_muted(),
            current_time: self.current_time,
        }
    }

    // ===== Playback =====

    /// Replace the queue with `context_tracks` and play `track`
    ///
    /// Returns `false` without touching any state when `track` is not part
    /// of `context_tracks`. With shuffle on, only the tracks after `track`
    /// are shuffled. `None` as context name means the ad-hoc "Queue".
    pub fn start_playback(
        &mut self,
        track: &Track,
        context_tracks: Vec<Track>,
        context_name: Option<&str>,
    ) -> bool {
        let Some(start) = context_tracks.iter().position(|t| t.id == track.id) else {
            debug!(track_id = %track.id, "Start track is not in its context, ignoring");
            return false;
        };

        let context = context_name
            .map_or_else(|| self.config.default_context_name.clone(), str::to_string);

        info!(
            context = %context,
            track_id = %track.id,
            tracks = context_tracks.len(),
            shuffle = self.is_shuffle,
            "Starting playback"
        );

        self.queue.load(context_tracks, start);
        if self.is_shuffle {
            self.queue.shuffle_upcoming(&mut self.rng);
        }
        self.context = Some(context);

        self.load_and_play_current();
        true
    }

    /// Restart playback of the current queue from one of its tracks
    ///
    /// The queue as it stands becomes the new context.
    pub fn play_from_queue(&mut self, track_id: &TrackId) -> bool {
        let Some(track) = self.queue.tracks().iter().find(|t| &t.id == track_id).cloned() else {
            return false;
        };
        let tracks = self.queue.tracks().to_vec();
        self.start_playback(&track, tracks, None)
    }

    pub fn play(&mut self) {
        if self.queue.current().is_none() {
            return;
        }

        if let Err(e) = self.output.play() {
            warn!(error = %e, "Audio output refused to play");
            self.is_playing = false;
            self.events.notify(Notice::error("Playback failed."));
        } else {
            self.is_playing = true;
        }

        self.persist();
        self.emit_state();
    }

    pub fn pause(&mut self) {
        if self.queue.current().is_none() {
            return;
        }

        self.is_playing = false;
        self.output.pause();
        self.persist();
        self.emit_state();
    }

    pub fn toggle_play_pause(&mut self) {
        if self.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Skip forward
    ///
    /// Repeat one restarts the current track. Past the end the queue wraps
    /// with repeat all; otherwise playback pauses at 0:00 on the last track.
    pub fn next(&mut self) {
        if self.queue.is_empty() {
            return;
        }

        if self.repeat == RepeatMode::One {
            self.rewind();
            self.play();
            return;
        }

        match self.queue.advance(self.repeat == RepeatMode::All) {
            Advance::Moved(_) | Advance::Wrapped => self.load_and_play_current(),
            Advance::Exhausted => {
                debug!("Reached end of queue");
                self.pause();
                self.rewind();
                self.persist();
            }
        }
    }

    /// Skip back, or restart the track when past the restart threshold
    pub fn previous(&mut self) {
        if self.queue.is_empty() {
            return;
        }

        if self.current_time > self.config.restart_threshold_secs {
            self.rewind();
            self.persist();
            return;
        }

        self.queue.step_back();
        self.load_and_play_current();
    }

    /// Output reached the end of the track
    pub fn on_ended(&mut self) {
        self.next();
    }

    // ===== Modes =====

    /// Flip shuffle; returns the new state
    ///
    /// Turning it on shuffles the tracks after the current one. Turning it
    /// off restores the context order. If the current track is no longer in
    /// that order, the first track is loaded paused at 0:00.
    pub fn toggle_shuffle(&mut self) -> bool {
        self.is_shuffle = !self.is_shuffle;

        if self.is_shuffle {
            if self.queue.current().is_some() {
                self.queue.shuffle_upcoming(&mut self.rng);
            }
        } else if self.queue.restore_original() == Restore::Clamped {
            warn!("Current track left the context, falling back to its first track");
            self.load_current();
            self.is_playing = false;
            self.output.pause();
            self.emit_state();
        }

        debug!(shuffle = self.is_shuffle, "Shuffle toggled");
        self.persist();
        self.events.emit(PlayerEvent::QueueUpdated);
        self.is_shuffle
    }

    /// Cycle off → all → one → off; returns the new mode
    pub fn toggle_repeat(&mut self) -> RepeatMode {
        self.repeat = self.repeat.next();
        debug!(repeat = ?self.repeat, "Repeat toggled");
        self.persist();
        self.repeat
    }

    // ===== Volume =====

    pub fn set_volume(&mut self, level: f64) {
        self.volume.set_level(level);
        self.apply_volume();
        self.persist();
    }

    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.apply_volume();
        self.persist();
    }

    pub fn begin_volume_adjust(&mut self) {
        self.is_adjusting_volume = true;
    }

    /// Volume slider moved during a drag
    pub fn adjust_volume(&mut self, level: f64) {
        self.volume.drag_to(level);
        self.apply_volume();
        self.persist();
    }

    pub fn end_volume_adjust(&mut self) {
        self.is_adjusting_volume = false;
    }

    // ===== Seeking =====

    pub fn begin_seek(&mut self) {
        if self.queue.current().is_some() {
            self.is_seeking = true;
        }
    }

    /// Progress to display while the seek handle is dragged
    ///
    /// The output position is not touched.
    pub fn preview_seek(&mut self, fraction: f64) -> Option<Progress> {
        let duration = self.duration?;
        self.is_seeking = true;
        Some(Progress::new(clamp_fraction(fraction) * duration, duration))
    }

    /// Release the seek handle at `fraction` of the track
    ///
    /// Returns `false` when nothing is loaded or the duration is unknown.
    pub fn commit_seek(&mut self, fraction: f64) -> bool {
        self.is_seeking = false;

        let Some(duration) = self.duration else {
            return false;
        };
        if self.queue.current().is_none() {
            return false;
        }

        let position = clamp_fraction(fraction) * duration;
        self.output.set_position(position);
        self.current_time = position;
        self.pending_seek = None;
        self.persist();
        true
    }

    /// Seek in one step
    pub fn seek(&mut self, fraction: f64) -> bool {
        self.begin_seek();
        self.commit_seek(fraction)
    }

    // ===== Output signals =====

    /// The output knows the track length and can seek
    ///
    /// A restored position is dropped when the length is unknown, so
    /// progress from a stream is not held back forever.
    pub fn on_metadata_loaded(&mut self, duration: f64) -> Option<Progress> {
        let pending = self.pending_seek.take();
        if !duration.is_finite() || duration <= 0.0 {
            if pending.is_some() {
                debug!(duration, "Dropping restored position, track length unknown");
            }
            return None;
        }
        self.duration = Some(duration);

        if let Some(position) = pending {
            let position = position.min(duration);
            debug!(position, "Applying restored position");
            self.output.set_position(position);
            self.current_time = position;
        }

        Some(Progress::new(self.current_time, duration))
    }

    /// Periodic progress from the output
    ///
    /// Ignored while the user drags the seek or volume handle, and until a
    /// restored position has been applied. Returns the progress to render.
    pub fn on_time_update(&mut self, current: f64, duration: f64) -> Option<Progress> {
        if self.is_seeking || self.is_adjusting_volume || self.pending_seek.is_some() {
            return None;
        }
        if !duration.is_finite() || duration <= 0.0 || !current.is_finite() {
            return None;
        }

        self.current_time = current;
        self.duration = Some(duration);

        if (current - self.last_persisted_time).abs() >= self.config.time_persist_interval_secs {
            self.persist();
        }

        Some(Progress::new(current, duration))
    }

    // ===== Library =====

    /// Apply a saved-status lookup
    ///
    /// Ignored when `track_id` is no longer the current track.
    pub fn set_saved_status(&mut self, track_id: &TrackId, saved: bool) -> bool {
        if self.queue.current().map(|t| &t.id) != Some(track_id) {
            return false;
        }

        self.is_current_track_saved = saved;
        self.events.emit(PlayerEvent::SavedStatusChanged {
            track_id: track_id.clone(),
            saved,
        });
        true
    }

    /// Forget a track that was removed from the playing context
    pub fn remove_from_context(&mut self, track_id: &TrackId) -> bool {
        if !self.queue.remove(track_id) {
            return false;
        }

        debug!(track_id = %track_id, "Removed track from context");
        self.persist();
        self.events.emit(PlayerEvent::QueueUpdated);
        true
    }

    // ===== Persistence =====

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            current_track: self.queue.current().cloned(),
            queue: self.queue.tracks().to_vec(),
            original_queue: Some(self.queue.original().to_vec()),
            play_context_name: self.context.clone(),
            is_shuffle: self.is_shuffle,
            repeat_mode: self.repeat,
            volume: Some(self.volume.level()),
            current_time: Some(self.current_time),
        }
    }

    pub fn persist(&mut self) {
        self.storage.set(&self.config.storage_key, &self.snapshot());
        self.last_persisted_time = self.current_time;
    }

    /// Read the stored snapshot
    pub fn load_snapshot(&self) -> Result<Option<PlaybackSnapshot>> {
        self.storage
            .try_get(&self.config.storage_key)
            .map_err(|e| PlaybackError::InvalidSnapshot(e.to_string()))
    }

    /// Restore the stored snapshot, if any
    ///
    /// Returns whether a track was restored. The track is loaded paused;
    /// its position is applied once [`Player::on_metadata_loaded`] fires.
    pub fn restore(&mut self) -> bool {
        match self.load_snapshot() {
            Ok(Some(snapshot)) => self.apply_snapshot(snapshot),
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "Ignoring saved player state");
                false
            }
        }
    }

    /// Load a snapshot into the player
    ///
    /// If the saved track is missing from the saved queue, playback falls
    /// back to the first queued track at 0:00, or to a queue holding only
    /// the saved track when the saved queue is empty.
    pub fn apply_snapshot(&mut self, snapshot: PlaybackSnapshot) -> bool {
        let Some(current) = snapshot.current_track else {
            return false;
        };

        let mut tracks = snapshot.queue;
        let mut original = snapshot.original_queue.unwrap_or_else(|| tracks.clone());
        let mut position = snapshot.current_time.filter(|t| t.is_finite() && *t > 0.0);

        let index = match tracks.iter().position(|t| t.id == current.id) {
            Some(i) => i,
            None => {
                warn!(track_id = %current.id, "Saved track is missing from saved queue");
                position = None;
                if tracks.is_empty() {
                    tracks.push(current.clone());
                    if original.is_empty() {
                        original.push(current);
                    }
                }
                0
            }
        };

        self.queue = Queue::from_parts(tracks, original, Some(index));
        self.context = snapshot.play_context_name;
        self.is_shuffle = snapshot.is_shuffle;
        self.repeat = snapshot.repeat_mode;
        self.is_playing = false;

        self.load_current();
        self.pending_seek = position;
        self.current_time = position.unwrap_or(0.0);
        self.last_persisted_time = self.current_time;

        self.volume = Volume::new(snapshot.volume.unwrap_or(self.config.default_volume));
        self.apply_volume();

        info!(
            track_id = ?self.queue.current().map(|t| t.id.as_str()),
            context = ?self.context,
            position = self.current_time,
            "Restored player state"
        );

        self.emit_state();
        self.events.emit(PlayerEvent::QueueUpdated);
        true
    }

    // ===== Internals =====

    /// Point the output at the current track, paused at 0:00
    fn load_current(&mut self) -> bool {
        let Some(track) = self.queue.current() else {
            return false;
        };

        debug!(track_id = %track.id, index = ?self.queue.index(), "Loading track");
        let url = track.audio_url.clone();
        self.output.load(&url);

        self.current_time = 0.0;
        self.last_persisted_time = 0.0;
        self.duration = None;
        self.pending_seek = None;
        self.is_current_track_saved = false;
        true
    }

    fn load_and_play_current(&mut self) {
        if self.load_current() {
            self.play();
            self.events.emit(PlayerEvent::QueueUpdated);
        }
    }

    fn rewind(&mut self) {
        self.output.set_position(0.0);
        self.current_time = 0.0;
        self.pending_seek = None;
    }

    fn apply_volume(&mut self) {
        self.output.set_muted(self.volume.is_muted());
        self.output.set_volume(self.volume.level());
    }

    fn emit_state(&self) {
        self.events.emit(PlayerEvent::StateChanged {
            is_playing: self.is_playing,
            play_context_name: self.context.clone(),
            current_track_id: self.queue.current().map(|t| t.id.clone()),
        });
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("context", &self.context)
            .field("index", &self.queue.index())
            .field("queue_len", &self.queue.len())
            .field("is_playing", &self.is_playing)
            .field("is_shuffle", &self.is_shuffle)
            .field("repeat", &self.repeat)
            .field("volume", &self.volume)
            .field("current_time", &self.current_time)
            .finish_non_exhaustive()
    }
}

fn clamp_fraction(fraction: f64) -> f64 {
    if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    }
}
