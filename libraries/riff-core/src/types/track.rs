/// Track domain type and the API record shapes it is built from
use super::{null_as_default, TrackId};
use serde::{Deserialize, Serialize};

/// A playable track
///
/// Immutable once constructed. This is also the shape persisted inside the
/// player snapshot, so field names follow the stored JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Artist display name
    #[serde(default, deserialize_with = "null_as_default")]
    pub artist: String,

    /// Cover image URL
    #[serde(default)]
    pub image_url: Option<String>,

    /// Streamable audio URL
    #[serde(default, deserialize_with = "null_as_default")]
    pub audio_url: String,

    /// Duration in seconds
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: f64,
}

impl Track {
    /// Create a track without artwork or a known duration
    pub fn new(
        id: impl Into<TrackId>,
        name: impl Into<String>,
        artist: impl Into<String>,
        audio_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artist: artist.into(),
            image_url: None,
            audio_url: audio_url.into(),
            duration: 0.0,
        }
    }

    /// Set the cover image
    #[must_use]
    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    /// Set the duration in seconds
    #[must_use]
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = seconds;
        self
    }
}

/// Track record as returned by the API
///
/// Playlist endpoints return join rows prefixed with `track_`; artist,
/// liked and trending endpoints return flat track objects.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiTrack {
    /// Row from `playlists/{id}/tracks`
    PlaylistEntry {
        track_id: TrackId,
        track_title: Option<String>,
        artist_name: Option<String>,
        track_image_url: Option<String>,
        track_audio_url: Option<String>,
        track_duration: Option<f64>,
    },

    /// Flat track object
    Flat {
        id: TrackId,
        title: Option<String>,
        artist_name: Option<String>,
        image_url: Option<String>,
        audio_url: Option<String>,
        duration: Option<f64>,
    },
}

impl ApiTrack {
    /// Identifier of the underlying track
    pub fn track_id(&self) -> &TrackId {
        match self {
            Self::PlaylistEntry { track_id, .. } => track_id,
            Self::Flat { id, .. } => id,
        }
    }

    /// Normalize into a [`Track`]
    ///
    /// Flat records without an artist fall back to `fallback_artist`
    /// (the artist page name when tracks come from an artist context).
    pub fn into_track(self, fallback_artist: &str) -> Track {
        match self {
            Self::PlaylistEntry {
                track_id,
                track_title,
                artist_name,
                track_image_url,
                track_audio_url,
                track_duration,
            } => Track {
                id: track_id,
                name: track_title.unwrap_or_default(),
                artist: artist_name.unwrap_or_default(),
                image_url: track_image_url,
                audio_url: track_audio_url.unwrap_or_default(),
                duration: track_duration.unwrap_or_default(),
            },
            Self::Flat {
                id,
                title,
                artist_name,
                image_url,
                audio_url,
                duration,
            } => Track {
                id,
                name: title.unwrap_or_default(),
                artist: artist_name
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| fallback_artist.to_string()),
                image_url,
                audio_url: audio_url.unwrap_or_default(),
                duration: duration.unwrap_or_default(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn playlist_entry_normalizes() {
        let raw: ApiTrack = serde_json::from_value(json!({
            "id": "row-9",
            "track_id": "t1",
            "track_title": "So What",
            "artist_name": "Miles Davis",
            "track_image_url": "https://img/t1.jpg",
            "track_audio_url": "https://cdn/t1.mp3",
            "track_duration": 545
        }))
        .unwrap();

        assert_eq!(raw.track_id().as_str(), "t1");

        let track = raw.into_track("ignored");
        assert_eq!(track.id.as_str(), "t1");
        assert_eq!(track.name, "So What");
        assert_eq!(track.artist, "Miles Davis");
        assert_eq!(track.image_url.as_deref(), Some("https://img/t1.jpg"));
        assert_eq!(track.audio_url, "https://cdn/t1.mp3");
        assert_eq!(track.duration, 545.0);
    }

    #[test]
    fn flat_track_falls_back_to_context_artist() {
        let raw: ApiTrack = serde_json::from_value(json!({
            "id": "t2",
            "title": "Freddie Freeloader",
            "audio_url": "https://cdn/t2.mp3",
            "duration": 589
        }))
        .unwrap();

        let track = raw.into_track("Miles Davis");
        assert_eq!(track.name, "Freddie Freeloader");
        assert_eq!(track.artist, "Miles Davis");
        assert!(track.image_url.is_none());
    }

    #[test]
    fn stored_track_tolerates_nulls() {
        let track: Track = serde_json::from_value(json!({
            "id": "t3",
            "name": "Blue in Green",
            "artist": null,
            "image_url": null,
            "audio_url": "https://cdn/t3.mp3",
            "duration": null
        }))
        .unwrap();

        assert_eq!(track.artist, "");
        assert_eq!(track.duration, 0.0);
    }
}
