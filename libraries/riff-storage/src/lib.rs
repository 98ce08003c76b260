//! Riff Storage
//!
//! Backends for the [`riff_core::KeyValueStore`] port.
//!
//! - [`MemoryStore`]: process-local map, used in tests and ephemeral sessions
//! - [`FileStore`]: one document per key under a directory, written atomically
//!
//! # Example
//!
//! ```rust,no_run
//! use riff_core::{keys, Storage};
//! use riff_storage::FileStore;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FileStore::open("./data/state")?;
//! let storage = Storage::new(Arc::new(store));
//! storage.set(keys::LIBRARY_SORT_BY, "alphabetical");
//! # Ok(())
//! # }
//! ```

mod error;
mod file;
mod memory;

pub use error::{Result, StorageError};
pub use file::FileStore;
pub use memory::MemoryStore;
