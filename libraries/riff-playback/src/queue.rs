//! Play queue with shuffle restore
//!
//! Holds the tracks eligible for playback, the pre-shuffle order and the
//! current position:
//!
//! ```text
//! original: A B C D E        (context order)
//! tracks:   A B C E D        (tail shuffled after C)
//! index:        ^
//! ```
//!
//! The index is `None` only when nothing is loaded; otherwise it always
//! points into `tracks`.

use crate::shuffle::shuffle_tail;
use rand::Rng;
use riff_core::{Track, TrackId};

/// Result of stepping forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the given index
    Moved(usize),

    /// Ran past the end and wrapped to the first track
    Wrapped,

    /// Ran past the end without wrapping; index unchanged
    Exhausted,
}

/// Result of restoring the pre-shuffle order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restore {
    /// Nothing to restore from; queue left as is
    Skipped,

    /// Order restored and the current track found again
    Relocated(Option<usize>),

    /// Order restored but the current track is gone; index clamped to 0
    Clamped,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Queue {
    /// Tracks in play order
    tracks: Vec<Track>,

    /// Order before shuffling
    original: Vec<Track>,

    /// Position of the current track in `tracks`
    index: Option<usize>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted parts
    ///
    /// An out-of-range index is dropped.
    pub fn from_parts(tracks: Vec<Track>, original: Vec<Track>, index: Option<usize>) -> Self {
        let index = index.filter(|&i| i < tracks.len());
        Self {
            tracks,
            original,
            index,
        }
    }

    /// Replace the queue with a new context, starting at `start`
    ///
    /// The original order is reset to `tracks`.
    pub fn load(&mut self, tracks: Vec<Track>, start: usize) {
        self.original.clone_from(&tracks);
        self.index = (start < tracks.len()).then_some(start);
        self.tracks = tracks;
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn original(&self) -> &[Track] {
        &self.original
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn current(&self) -> Option<&Track> {
        self.index.and_then(|i| self.tracks.get(i))
    }

    /// Tracks after the current one
    pub fn upcoming(&self) -> &[Track] {
        let start = self.index.map_or(0, |i| i + 1);
        self.tracks.get(start..).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn position_of(&self, id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| &t.id == id)
    }

    /// Step forward, wrapping to the start when `wrap` is set
    pub fn advance(&mut self, wrap: bool) -> Advance {
        if self.tracks.is_empty() {
            return Advance::Exhausted;
        }

        let next = self.index.map_or(0, |i| i + 1);
        if next < self.tracks.len() {
            self.index = Some(next);
            Advance::Moved(next)
        } else if wrap {
            self.index = Some(0);
            Advance::Wrapped
        } else {
            Advance::Exhausted
        }
    }

    /// Step back, wrapping to the last track from the first
    pub fn step_back(&mut self) -> Option<usize> {
        let last = self.tracks.len().checked_sub(1)?;
        let prev = match self.index {
            Some(i) if i > 0 => i - 1,
            _ => last,
        };
        self.index = Some(prev);
        Some(prev)
    }

    /// Shuffle the tracks after the current one
    pub fn shuffle_upcoming<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let start = self.index.map_or(0, |i| i + 1);
        shuffle_tail(&mut self.tracks, start, rng);
    }

    /// Put the pre-shuffle order back and find the current track in it
    pub fn restore_original(&mut self) -> Restore {
        if self.original.is_empty() {
            return Restore::Skipped;
        }

        let current = self.current().map(|t| t.id.clone());
        self.tracks.clone_from(&self.original);

        match current {
            None => {
                self.index = None;
                Restore::Relocated(None)
            }
            Some(id) => match self.position_of(&id) {
                Some(i) => {
                    self.index = Some(i);
                    Restore::Relocated(Some(i))
                }
                None => {
                    self.index = Some(0);
                    Restore::Clamped
                }
            },
        }
    }

    /// Drop a track that left the backing context
    ///
    /// It is removed from the original order and, unless it is the track
    /// playing right now, from the play order too. Returns whether anything
    /// changed.
    pub fn remove(&mut self, id: &TrackId) -> bool {
        let before = self.original.len();
        self.original.retain(|t| &t.id != id);
        let mut changed = self.original.len() != before;

        if self.current().is_some_and(|t| &t.id == id) {
            return changed;
        }

        while let Some(pos) = self.position_of(id) {
            self.tracks.remove(pos);
            if let Some(i) = self.index {
                if pos < i {
                    self.index = Some(i - 1);
                }
            }
            changed = true;
        }

        changed
    }
}
