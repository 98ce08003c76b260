//! Error types for playback management

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The audio output refused an operation
    #[error("Audio output error: {0}")]
    Output(String),

    /// Persisted snapshot could not be decoded
    #[error("Invalid saved player state: {0}")]
    InvalidSnapshot(String),

    /// Storage or library port error
    #[error(transparent)]
    Core(#[from] riff_core::RiffError),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
