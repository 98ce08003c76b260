//! Error types for the Riff API client and library services.

use riff_core::RiffError;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur when talking to the Riff API.
#[derive(Error, Debug)]
pub enum LibraryError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Authentication required but no session available
    #[error("Authentication required")]
    AuthRequired,

    /// Credentials were rejected
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// Invalid API base URL or path
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Too many pinned library items
    #[error("At most {limit} items can be pinned")]
    PinLimitReached { limit: usize },

    /// Item is not on the library shelf
    #[error("Library item not found: {0}")]
    ItemNotFound(String),

    /// Failure of a fetch shared by several callers
    #[error(transparent)]
    Shared(Arc<LibraryError>),
}

impl LibraryError {
    /// HTTP status of a server error, looking through shared failures
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ServerError { status, .. } => Some(*status),
            Self::AuthFailed(_) => Some(401),
            Self::Shared(inner) => inner.status(),
            _ => None,
        }
    }

    /// Whether the failure means the session is missing or expired
    pub fn is_auth_required(&self) -> bool {
        match self {
            Self::AuthRequired => true,
            Self::ServerError { status, .. } => *status == 401,
            Self::Shared(inner) => inner.is_auth_required(),
            _ => false,
        }
    }
}

impl From<LibraryError> for RiffError {
    fn from(err: LibraryError) -> Self {
        if err.is_auth_required() {
            RiffError::AuthRequired
        } else {
            RiffError::remote(err.to_string())
        }
    }
}

/// Result type for library operations.
pub type Result<T> = std::result::Result<T, LibraryError>;
