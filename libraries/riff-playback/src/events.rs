//! Player events
//!
//! Typed notifications fanned out to any number of subscribers:
//! - State changes (play/pause, track or context switch)
//! - Queue updates (consumers re-read the queue)
//! - Saved status of the current track
//! - User-facing notices (toasts)

use riff_core::TrackId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

/// Events emitted by the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Playing flag, context or current track changed
    StateChanged {
        is_playing: bool,
        play_context_name: Option<String>,
        current_track_id: Option<TrackId>,
    },

    /// Queue contents or order changed
    QueueUpdated,

    /// Saved status of the current track is known or changed
    SavedStatusChanged { track_id: TrackId, saved: bool },

    /// Message for the user
    Notice(Notice),
}

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// User-facing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}

/// Multi-subscriber event channel
///
/// Emitting never blocks and never fails; events sent while nobody listens
/// are dropped. Slow subscribers lag rather than stall the player.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PlayerEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: PlayerEvent) {
        if self.tx.send(event).is_err() {
            trace!("Player event dropped: no subscribers");
        }
    }

    pub fn notify(&self, notice: Notice) {
        self.emit(PlayerEvent::Notice(notice));
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
