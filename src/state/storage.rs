//! Durable client-side storage for the session token.
//!
//! DESIGN
//! ======
//! Storage is a tiny key/value store with the token under [`TOKEN_KEY`], the
//! way a browser app would use local storage. The file backend keeps a JSON
//! object so unrelated keys written by other tools survive token updates.

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{Map, Value};

/// Fixed key the session token is stored under.
pub const TOKEN_KEY: &str = "token";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("storage file {path} is corrupt: {reason}")]
    Corrupt { path: String, reason: String },
}

/// Persistence backend for the session token.
pub trait TokenStorage: Send + Sync {
    /// Read the persisted token, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Persist `token`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn save(&self, token: &str) -> Result<(), StorageError>;

    /// Remove the persisted token. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn clear(&self) -> Result<(), StorageError>;
}

// =============================================================================
// FILE BACKEND
// =============================================================================

/// JSON-object file store. A missing file holds no token.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Map<String, Value>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(entries)) => Ok(entries),
            Ok(_) => Err(self.corrupt("expected a JSON object")),
            Err(e) => Err(self.corrupt(&e.to_string())),
        }
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_vec_pretty(entries).map_err(|e| self.corrupt(&e.to_string()))?;

        // Write beside the target and rename so readers never see a torn file.
        let staging = self.path.with_extension("tmp");
        let mut file = open_private(&staging)?;
        file.write_all(&body)?;
        file.sync_all()?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }

    /// Entries to rewrite on save or clear. A corrupt file is replaced rather
    /// than blocking every later write.
    fn entries_for_update(&self) -> Result<Map<String, Value>, StorageError> {
        match self.read_entries() {
            Err(e @ StorageError::Corrupt { .. }) => {
                tracing::warn!(error = %e, "discarding corrupt token storage");
                Ok(Map::new())
            }
            other => other,
        }
    }

    fn corrupt(&self, reason: &str) -> StorageError {
        StorageError::Corrupt { path: self.path.display().to_string(), reason: reason.to_owned() }
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new().write(true).create(true).truncate(true).mode(0o600).open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> io::Result<fs::File> {
    fs::OpenOptions::new().write(true).create(true).truncate(true).open(path)
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        let entries = self.read_entries()?;
        Ok(entries.get(TOKEN_KEY).and_then(Value::as_str).map(str::to_owned))
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        let mut entries = self.entries_for_update()?;
        entries.insert(TOKEN_KEY.to_owned(), Value::String(token.to_owned()));
        self.write_entries(&entries)
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut entries = self.entries_for_update()?;
        entries.remove(TOKEN_KEY);
        if entries.is_empty() {
            return match fs::remove_file(&self.path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            };
        }
        self.write_entries(&entries)
    }
}

// =============================================================================
// MEMORY BACKEND
// =============================================================================

/// In-process store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryTokenStorage {
    /// A store that already holds `token`.
    #[must_use]
    pub fn with_token(token: &str) -> Self {
        let storage = Self::default();
        storage.lock().insert(TOKEN_KEY.to_owned(), token.to_owned());
        storage
    }

    /// Raw value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.get(TOKEN_KEY))
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        self.lock().insert(TOKEN_KEY.to_owned(), token.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.lock().remove(TOKEN_KEY);
        Ok(())
    }
}
