//! Audio output port
//!
//! The player never decodes audio itself. The embedding platform (an HTML
//! audio element, a native sink) implements [`AudioOutput`] and reports
//! back through [`crate::Player::on_metadata_loaded`],
//! [`crate::Player::on_time_update`] and [`crate::Player::on_ended`].

use crate::error::Result;
use std::sync::{Arc, Mutex, PoisonError};

/// Platform audio output
pub trait AudioOutput: Send {
    /// Point the output at a new resource. Playback does not start.
    fn load(&mut self, url: &str);

    /// Start or resume playback
    fn play(&mut self) -> Result<()>;

    fn pause(&mut self);

    /// Jump to a position in seconds
    fn set_position(&mut self, seconds: f64);

    /// Linear gain in [0, 1]
    fn set_volume(&mut self, volume: f64);

    fn set_muted(&mut self, muted: bool);
}

/// What a [`NullOutput`] has been told to do
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputState {
    pub url: Option<String>,
    pub playing: bool,
    pub position: f64,
    pub volume: f64,
    pub muted: bool,
    /// Number of `load` calls so far
    pub loads: usize,
}

/// Headless output that only records commands
///
/// Clones share state, so one clone can drive the player while another
/// inspects what the player asked for.
#[derive(Debug, Clone, Default)]
pub struct NullOutput {
    state: Arc<Mutex<OutputState>>,
}

impl NullOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the recorded state
    pub fn state(&self) -> OutputState {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, OutputState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AudioOutput for NullOutput {
    fn load(&mut self, url: &str) {
        let mut state = self.lock();
        state.url = Some(url.to_string());
        state.playing = false;
        state.position = 0.0;
        state.loads += 1;
    }

    fn play(&mut self) -> Result<()> {
        self.lock().playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.lock().playing = false;
    }

    fn set_position(&mut self, seconds: f64) {
        self.lock().position = seconds;
    }

    fn set_volume(&mut self, volume: f64) {
        self.lock().volume = volume;
    }

    fn set_muted(&mut self, muted: bool) {
        self.lock().muted = muted;
    }
}
