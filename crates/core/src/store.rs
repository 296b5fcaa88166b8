//! Persistent store adapter.
//!
//! Collections are persisted whole: one JSON document per storage key. The concrete medium is
//! swappable behind the [`Store`] trait:
//!
//! - [`MemoryStore`] keeps documents in a map (tests, throwaway runs)
//! - [`FileStore`] keeps one `<key>.json` file per collection under a data directory
//!
//! Read and write failures are surfaced as [`StoreError`]; deciding what to do about missing or
//! unparsable documents (seed fallback) is left to the caller.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to read stored collection: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write stored collection: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to serialize collection: {0}")]
    Serialization(serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Key-value persistence of whole collections.
pub trait Store: Send + Sync {
    /// Returns the raw document stored under `key`, or `None` when nothing was saved yet.
    fn load(&self, key: &str) -> StoreResult<Option<String>>;

    /// Replaces the document stored under `key`.
    fn save(&self, key: &str, value: &str) -> StoreResult<()>;
}

/// Validates that a storage key is safe to use as a file name.
///
/// Keys are restricted to ASCII alphanumerics plus `.`, `-` and `_`, must not start with a dot,
/// and are bounded in length.
pub fn validate_key(key: &str) -> StoreResult<()> {
    const MAX_KEY_LEN: usize = 128;

    if key.is_empty() || key.len() > MAX_KEY_LEN || key.starts_with('.') {
        return Err(StoreError::InvalidKey(key.to_owned()));
    }

    let ok = key
        .bytes()
        .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'.' | b'-' | b'_'));
    if !ok {
        return Err(StoreError::InvalidKey(key.to_owned()));
    }

    Ok(())
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates a key, e.g. to simulate a previously persisted (or corrupt) document.
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.lock().insert(key.to_owned(), value.to_owned());
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave a half-written entry behind.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Store for MemoryStore {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        validate_key(key)?;
        Ok(self.lock().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> StoreResult<()> {
        validate_key(key)?;
        self.lock().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// File-backed store: `<data_dir>/<key>.json`.
///
/// Saves go through a temporary file and a rename so a crash mid-write never leaves a truncated
/// document behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        validate_key(key)?;
        Ok(self.data_dir.join(format!("{key}.json")))
    }
}

impl Store for FileStore {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::FileRead(e)),
        }
    }

    fn save(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.data_dir).map_err(StoreError::StorageDirCreation)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(StoreError::FileWrite)?;
        fs::rename(&tmp, &path).map_err(StoreError::FileWrite)?;
        Ok(())
    }
}
