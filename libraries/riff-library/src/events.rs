//! Library change notifications

use crate::types::ItemKind;
use riff_core::{PlaylistSummary, User};
use tokio::sync::broadcast;
use tracing::trace;

/// Something in the user's library changed
#[derive(Debug, Clone, PartialEq)]
pub enum LibraryEvent {
    /// A user signed in (`Some`) or out (`None`)
    AuthChanged(Option<User>),

    /// The set of saved track ids may have changed
    SavedTracksChanged,

    /// The user's playlists changed; re-read them
    PlaylistsChanged,

    /// An item was followed or created
    ItemAdded { kind: ItemKind, id: String },

    /// An item was unfollowed or deleted
    ItemRemoved { kind: ItemKind, id: String },

    /// A playlist's details were edited
    PlaylistUpdated(PlaylistSummary),
}

/// Multi-subscriber channel for [`LibraryEvent`]s
#[derive(Debug, Clone)]
pub struct LibraryEvents {
    tx: broadcast::Sender<LibraryEvent>,
}

impl LibraryEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LibraryEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: LibraryEvent) {
        if self.tx.send(event).is_err() {
            trace!("Library event dropped: no subscribers");
        }
    }
}

impl Default for LibraryEvents {
    fn default() -> Self {
        Self::new(64)
    }
}
