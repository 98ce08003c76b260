/// Library domain types: playlists, artists and the signed-in user
use super::{ArtistId, PlaylistId};
use serde::{Deserialize, Serialize};

/// Playlist as listed by the library endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub id: PlaylistId,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub image_url: Option<String>,

    /// Display name of the owner
    #[serde(default)]
    pub user_display_name: Option<String>,

    #[serde(default)]
    pub is_public: bool,

    #[serde(default)]
    pub total_tracks: Option<u32>,
}

/// Artist as listed by the library endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistSummary {
    pub id: ArtistId,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub image_url: Option<String>,
}

/// Signed-in user account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: String,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl User {
    /// Name to show in the UI: display name, then username
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or_default()
    }
}
