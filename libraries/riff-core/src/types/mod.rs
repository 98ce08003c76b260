mod ids;
mod library;
mod track;

pub use ids::{ArtistId, PlaylistId, TrackId};
pub use library::{ArtistSummary, PlaylistSummary, User};
pub use track::{ApiTrack, Track};

use serde::{Deserialize, Deserializer};

/// Treat an explicit JSON `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
