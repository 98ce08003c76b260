//! Riff Library
//!
//! REST client and library services for the Riff API.
//!
//! # Features
//!
//! - **Authentication**: sign-up, login, session restore and logout
//! - **Playlists**: CRUD on the user's own playlists, cached and coalesced
//! - **Library**: likes, follows and the saved-track index used by the player
//! - **Catalog**: track lists ready to hand to the player as a context
//! - **Membership**: add a track to several playlists at once as a diff
//! - **Shelf**: sidebar pins, sorting, filtering and search
//!
//! # Example
//!
//! ```ignore
//! use riff_library::{ApiClient, AuthService, LibraryEvents, LibraryService, PlaylistService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = ApiClient::new(riff_library::DEFAULT_BASE_URL, storage)?;
//!     let events = LibraryEvents::default();
//!
//!     let auth = AuthService::new(api.clone(), events.clone());
//!     auth.login("jane@example.com", "hunter2").await?;
//!
//!     let playlists = PlaylistService::new(api.clone(), events.clone());
//!     let library = LibraryService::new(api, playlists, events);
//!     let saved = library.saved_track_ids().await;
//!     println!("{} saved tracks", saved.len());
//!
//!     Ok(())
//! }
//! ```

mod auth;
mod cache;
mod catalog;
mod client;
mod error;
mod events;
mod library;
mod membership;
mod playlists;
mod shelf;
mod types;

pub use auth::AuthService;
pub use cache::RequestCache;
pub use catalog::Catalog;
pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::{LibraryError, Result};
pub use events::{LibraryEvent, LibraryEvents};
pub use library::{LibraryService, LIKED_SONGS_PLAYLIST};
pub use membership::{
    Applied, Feedback, MembershipDiff, PlaylistMembership, APPLY_FAILED, LIKED_SONGS,
};
pub use playlists::{PlaylistService, DEFAULT_PLAYLIST_NAME};
pub use shelf::{Filter, LibraryShelf, ShelfChange, ShelfItem, SortMode, MAX_PINNED_ITEMS};
pub use types::{
    AuthResponse, ItemKind, LibraryContent, LoginRequest, PlaylistUpdate, RegisterRequest,
};
