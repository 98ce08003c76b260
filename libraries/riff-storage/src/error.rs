/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Key cannot be mapped to a file name
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Backing directory is missing or not a directory
    #[error("Storage directory unavailable: {0}")]
    Directory(String),

    /// Stored bytes are not valid UTF-8
    #[error("Corrupt value for key {0:?}")]
    Corrupt(String),

    /// Lock poisoned by a panicking writer
    #[error("Storage lock poisoned")]
    Poisoned,

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for riff_core::RiffError {
    fn from(err: StorageError) -> Self {
        riff_core::RiffError::storage(err.to_string())
    }
}
