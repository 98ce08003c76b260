//! Riff Client
//!
//! Composition root for Riff: loads configuration, installs logging and
//! wires storage, the API services, the library shelf and the player into
//! one [`Session`].
//!
//! # Example
//!
//! ```ignore
//! use riff_client::{logging, ClientConfig, Session};
//! use riff_playback::NullOutput;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     logging::init();
//!
//!     let config = ClientConfig::load()?;
//!     let session = Session::open(config, Box::new(NullOutput::new()))?;
//!     session.spawn_sync();
//!
//!     if let Some(user) = session.start().await {
//!         println!("Welcome back, {}", user.label());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
mod session;

pub use config::{ApiSettings, ClientConfig, PlayerSettings, StorageSettings};
pub use error::{ClientError, Result};
pub use session::Session;
