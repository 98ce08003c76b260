/// Core error types for Riff
use thiserror::Error;

/// Result type alias using `RiffError`
pub type Result<T> = std::result::Result<T, RiffError>;

/// Core error type for Riff
#[derive(Error, Debug)]
pub enum RiffError {
    /// Persistence backend errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// The operation needs a signed-in user
    #[error("Authentication required")]
    AuthRequired,

    /// Remote API errors surfaced through a port
    #[error("Remote error: {0}")]
    Remote(String),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl RiffError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a remote error
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
