//! Request and response bodies of the Riff API.

use riff_core::{ApiTrack, ArtistSummary, PlaylistSummary, TrackId, User};
use serde::{Deserialize, Serialize};

/// Login request body
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Sign-up request body
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
    pub display_name: String,
}

/// Response of login and sign-up
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UserResponse {
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct LogoutRequest<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PlaylistsResponse {
    #[serde(default)]
    pub playlists: Vec<PlaylistSummary>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ArtistsResponse {
    #[serde(default)]
    pub artists: Vec<ArtistSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PlaylistResponse {
    pub playlist: PlaylistSummary,
}

/// Any endpoint answering with `{ "tracks": [...] }`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct TracksResponse {
    #[serde(default)]
    pub tracks: Vec<ApiTrack>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreatePlaylistRequest<'a> {
    pub name: &'a str,
    pub is_public: bool,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct AddTrackRequest<'a> {
    pub track_id: &'a TrackId,
}

/// Partial playlist update; unset fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlaylistUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

/// Single track lookup, used for its liked flag
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TrackDetails {
    #[serde(default)]
    pub is_liked: bool,
}

/// Playlists and artists the user keeps in their library
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryContent {
    pub playlists: Vec<PlaylistSummary>,
    pub artists: Vec<ArtistSummary>,
}

/// Kind of library item that can be followed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Playlist,
    Artist,
}

impl ItemKind {
    /// Collection segment in API paths
    pub(crate) fn collection(self) -> &'static str {
        match self {
            Self::Playlist => "playlists",
            Self::Artist => "artists",
        }
    }
}
