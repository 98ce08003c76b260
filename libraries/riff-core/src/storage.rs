//! Typed JSON storage over a [`KeyValueStore`]

use crate::error::Result;
use crate::traits::KeyValueStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{error, warn};

/// Well-known storage keys
pub mod keys {
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    pub const USER: &str = "user";

    pub const PLAYER_STATE: &str = "player_state";

    pub const PINNED_ITEMS: &str = "pinnedItems";
    pub const LIBRARY_CREATE_ORDER: &str = "library_create_order";
    pub const LIBRARY_ACTIVITY: &str = "library_activity_timestamp";
    pub const LIBRARY_SORT_BY: &str = "library_sort_by";
    pub const LIBRARY_ACTIVE_FILTER: &str = "library_active_filter";
}

/// JSON view over a shared key-value backend
///
/// `get`/`set`/`remove` never fail: read errors and corrupt values read as
/// absent, write errors are logged. Use the `try_` variants to observe
/// failures.
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn KeyValueStore>,
}

impl Storage {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Read and decode a value
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.try_get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Failed to read from storage");
                None
            }
        }
    }

    /// Encode and write a value
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_set(key, value) {
            error!(key, error = %e, "Failed to write to storage");
        }
    }

    /// Remove a value
    pub fn remove(&self, key: &str) {
        if let Err(e) = self.backend.remove(key) {
            error!(key, error = %e, "Failed to remove from storage");
        }
    }

    /// Whether a non-empty value is stored under `key`
    pub fn contains(&self, key: &str) -> bool {
        matches!(self.backend.get(key), Ok(Some(raw)) if !raw.is_empty() && raw != "null")
    }

    pub fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.backend.get(key)? {
            Some(raw) if !raw.is_empty() => Ok(Some(serde_json::from_str(&raw)?)),
            _ => Ok(None),
        }
    }

    pub fn try_set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.backend.set(key, &raw)
    }
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RiffError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MapStore(Mutex<HashMap<String, String>>);

    impl KeyValueStore for MapStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.0.lock().unwrap().insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.0.lock().unwrap().remove(key);
            Ok(())
        }
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(RiffError::storage("disk on fire"))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(RiffError::storage("disk on fire"))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(RiffError::storage("disk on fire"))
        }
    }

    #[test]
    fn values_are_stored_as_json() {
        let backend = Arc::new(MapStore::default());
        let storage = Storage::new(backend.clone());

        storage.set(keys::ACCESS_TOKEN, "abc");
        assert_eq!(
            backend.get(keys::ACCESS_TOKEN).unwrap().as_deref(),
            Some("\"abc\"")
        );
        assert_eq!(storage.get::<String>(keys::ACCESS_TOKEN).as_deref(), Some("abc"));
        assert!(storage.contains(keys::ACCESS_TOKEN));

        storage.remove(keys::ACCESS_TOKEN);
        assert!(storage.get::<String>(keys::ACCESS_TOKEN).is_none());
        assert!(!storage.contains(keys::ACCESS_TOKEN));
    }

    #[test]
    fn corrupt_value_reads_as_absent() {
        let backend = Arc::new(MapStore::default());
        backend.set(keys::PINNED_ITEMS, "{not json").unwrap();

        let storage = Storage::new(backend);
        assert!(storage.get::<Vec<String>>(keys::PINNED_ITEMS).is_none());
        assert!(storage.try_get::<Vec<String>>(keys::PINNED_ITEMS).is_err());
    }

    #[test]
    fn backend_failures_are_swallowed() {
        let storage = Storage::new(Arc::new(BrokenStore));

        storage.set(keys::USER, &42);
        storage.remove(keys::USER);
        assert!(storage.get::<u32>(keys::USER).is_none());
        assert!(storage.try_set(keys::USER, &42).is_err());
    }
}
