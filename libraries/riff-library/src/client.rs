//! HTTP client for the Riff API.

use crate::error::{LibraryError, Result};
use reqwest::{Client, Method};
use riff_core::{keys, Storage};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// API used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "https://spotify.f8team.dev/api/";

/// JSON client for the Riff API.
///
/// Every request reads the access token from storage, so a login or logout
/// is picked up immediately by all clones of the client.
///
/// # Example
///
/// ```ignore
/// use riff_library::ApiClient;
///
/// let client = ApiClient::new("https://api.example.com/api/", storage)?;
/// let me: serde_json::Value = client.get("users/me").await?;
/// ```
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    storage: Storage,
}

impl ApiClient {
    /// Create a new client for the API rooted at `base_url`.
    pub fn new(base_url: &str, storage: Storage) -> Result<Self> {
        let base_url = base_url.trim();
        if base_url.is_empty() {
            return Err(LibraryError::InvalidUrl("URL cannot be empty".into()));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(LibraryError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        // Url::join drops the last segment unless the base ends with '/'
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalized).map_err(|e| LibraryError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("Riff/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url,
            storage,
        })
    }

    /// Get the API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Stored access token, if a user is signed in.
    pub fn access_token(&self) -> Option<String> {
        self.storage
            .get::<String>(keys::ACCESS_TOKEN)
            .filter(|token| !token.is_empty())
    }

    /// Check if a user session is present.
    pub fn has_session(&self) -> bool {
        self.access_token().is_some()
    }

    /// Fail with `AuthRequired` unless a user is signed in.
    pub fn require_session(&self) -> Result<()> {
        if self.has_session() {
            Ok(())
        } else {
            Err(LibraryError::AuthRequired)
        }
    }

    /// Resolve an API path against the base URL.
    pub fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| LibraryError::InvalidUrl(format!("{path}: {e}")))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(Method::GET, path, None::<&()>).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send(Method::POST, path, Some(body)).await
    }

    /// POST without a request body.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(Method::POST, path, None::<&()>).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send(Method::PUT, path, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(Method::DELETE, path, None::<&()>).await
    }

    async fn send<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let url = self.url(path)?;
        debug!(method = %method, url = %url, "Sending API request");

        let mut request = self.http.request(method.clone(), url);
        if let Some(token) = self.access_token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            // Some endpoints answer 204 with no body
            let raw: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
            return serde_json::from_slice(raw).map_err(|e| {
                LibraryError::ParseError(format!("Failed to parse {method} {path} response: {e}"))
            });
        }

        let message = error_message(&bytes);
        warn!(
            method = %method,
            path,
            status = status.as_u16(),
            message = %message,
            "API request failed"
        );
        Err(LibraryError::ServerError {
            status: status.as_u16(),
            message,
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Pull `error.message` (or `message`) out of an error body
fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .or_else(|| value.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use riff_storage::MemoryStore;
    use std::sync::Arc;

    fn storage() -> Storage {
        Storage::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_url_validation() {
        assert!(ApiClient::new("https://example.com/api/", storage()).is_ok());
        assert!(ApiClient::new("http://localhost:8080", storage()).is_ok());

        assert!(ApiClient::new("", storage()).is_err());
        assert!(ApiClient::new("not-a-url", storage()).is_err());
        assert!(ApiClient::new("ftp://example.com", storage()).is_err());
    }

    #[test]
    fn test_paths_join_below_base() {
        let client = ApiClient::new("https://example.com/api", storage()).unwrap();
        assert_eq!(
            client.url("me/playlists").unwrap().as_str(),
            "https://example.com/api/me/playlists"
        );
        assert_eq!(
            client.url("/tracks/trending?limit=6").unwrap().as_str(),
            "https://example.com/api/tracks/trending?limit=6"
        );
    }

    #[test]
    fn test_session_follows_storage() {
        let storage = storage();
        let client = ApiClient::new(DEFAULT_BASE_URL, storage.clone()).unwrap();
        assert!(!client.has_session());
        assert!(matches!(client.require_session(), Err(LibraryError::AuthRequired)));

        storage.set(keys::ACCESS_TOKEN, "token-123");
        assert_eq!(client.access_token().as_deref(), Some("token-123"));

        storage.set(keys::ACCESS_TOKEN, "");
        assert!(!client.has_session());
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(br#"{"error":{"message":"Invalid credentials"}}"#),
            "Invalid credentials"
        );
        assert_eq!(error_message(br#"{"message":"Nope"}"#), "Nope");
        assert_eq!(error_message(b"Bad Gateway"), "Bad Gateway");
    }
}
