//! File-backed key-value store
//!
//! Each key is stored as `<dir>/<key>.json`. Writes go to a temporary file
//! that is renamed over the target, so a crash never leaves a torn value.

use crate::error::{Result, StorageError};
use riff_core::KeyValueStore;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory-backed store
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        if !dir.is_dir() {
            return Err(StorageError::Directory(dir.display().to_string()));
        }

        info!(dir = %dir.display(), "Opened file store");
        Ok(Self { dir })
    }

    /// Root directory of the store
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');

        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.dir.join(format!("{key}.json")))
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| StorageError::Corrupt(key.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp = self.dir.join(format!(".{key}.json.tmp"));

        let mut file = fs::File::create(&tmp)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, &path)?;
        debug!(key, bytes = value.len(), "Wrote value");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> riff_core::Result<Option<String>> {
        Ok(self.read(key)?)
    }

    fn set(&self, key: &str, value: &str) -> riff_core::Result<()> {
        Ok(self.write(key, value)?)
    }

    fn remove(&self, key: &str) -> riff_core::Result<()> {
        Ok(self.delete(key)?)
    }
}
