/// Client error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] riff_storage::StorageError),

    #[error(transparent)]
    Library(#[from] riff_library::LibraryError),
}

impl From<config::ConfigError> for ClientError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
