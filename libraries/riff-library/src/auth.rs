//! Sign-up, login and session handling.

use crate::client::ApiClient;
use crate::error::{LibraryError, Result};
use crate::events::{LibraryEvent, LibraryEvents};
use crate::types::{AuthResponse, LoginRequest, LogoutRequest, RegisterRequest, UserResponse};
use riff_core::{keys, User};
use tracing::{debug, info, warn};

/// Authentication service.
///
/// The session (tokens and user) lives in storage, where [`ApiClient`]
/// picks it up for every request.
#[derive(Debug, Clone)]
pub struct AuthService {
    api: ApiClient,
    events: LibraryEvents,
}

impl AuthService {
    pub fn new(api: ApiClient, events: LibraryEvents) -> Self {
        Self { api, events }
    }

    /// Create an account and sign in with it.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User> {
        debug!(email = %request.email, username = %request.username, "Registering");
        let response: AuthResponse = self.api.post("auth/register", request).await?;
        info!(user_id = %response.user.id, "Registration successful");
        Ok(self.store_session(response))
    }

    /// Login with email and password.
    ///
    /// Rejected credentials come back as [`LibraryError::AuthFailed`] with
    /// the server's message.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        debug!(email = %email, "Attempting login");
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response: AuthResponse = match self.api.post("auth/login", &request).await {
            Ok(response) => response,
            Err(LibraryError::ServerError { status: 401, message }) => {
                warn!(email = %email, "Login failed: invalid credentials");
                return Err(LibraryError::AuthFailed(message));
            }
            Err(e) => return Err(e),
        };

        info!(user_id = %response.user.id, "Login successful");
        Ok(self.store_session(response))
    }

    /// Pick up a session left in storage.
    ///
    /// Uses the stored user when there is one, otherwise asks the API. A
    /// token the API rejects clears the whole session.
    pub async fn restore_session(&self) -> Option<User> {
        if !self.api.has_session() {
            self.events.emit(LibraryEvent::AuthChanged(None));
            return None;
        }

        if let Some(user) = self.current_user() {
            debug!(user_id = %user.id, "Restored stored session");
            self.events.emit(LibraryEvent::AuthChanged(Some(user.clone())));
            return Some(user);
        }

        match self.api.get::<UserResponse>("users/me").await {
            Ok(UserResponse { user }) => {
                self.api.storage().set(keys::USER, &user);
                info!(user_id = %user.id, "Session restored");
                self.events.emit(LibraryEvent::AuthChanged(Some(user.clone())));
                Some(user)
            }
            Err(e) => {
                warn!(error = %e, "Stored session is no longer valid");
                self.clear_session();
                None
            }
        }
    }

    /// Sign out. The server is told when possible; the local session is
    /// cleared regardless.
    pub async fn logout(&self) {
        if let Some(refresh_token) = self.api.storage().get::<String>(keys::REFRESH_TOKEN) {
            let request = LogoutRequest {
                refresh_token: &refresh_token,
            };
            if let Err(e) = self
                .api
                .post::<serde_json::Value, _>("auth/logout", &request)
                .await
            {
                warn!(error = %e, "Logout request failed");
            }
        }

        self.clear_session();
        info!("Logged out");
    }

    /// User of the stored session.
    pub fn current_user(&self) -> Option<User> {
        self.api.storage().get(keys::USER)
    }

    pub fn is_signed_in(&self) -> bool {
        self.api.has_session()
    }

    fn store_session(&self, response: AuthResponse) -> User {
        let storage = self.api.storage();
        storage.set(keys::ACCESS_TOKEN, &response.access_token);
        match &response.refresh_token {
            Some(token) => storage.set(keys::REFRESH_TOKEN, token),
            None => storage.remove(keys::REFRESH_TOKEN),
        }
        storage.set(keys::USER, &response.user);

        self.events
            .emit(LibraryEvent::AuthChanged(Some(response.user.clone())));
        response.user
    }

    fn clear_session(&self) {
        let storage = self.api.storage();
        storage.remove(keys::ACCESS_TOKEN);
        storage.remove(keys::REFRESH_TOKEN);
        storage.remove(keys::USER);
        self.events.emit(LibraryEvent::AuthChanged(None));
    }
}
