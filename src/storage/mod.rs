//! Profile Cache
//!
//! The only state this client persists is the current user's profile, so a
//! restarted app can rehydrate its identity without a round trip. Everything
//! else (presence, requests, notifications) is rebuilt from server events.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::User;

/// Storage error types.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// File-backed cache for the current user's profile.
#[derive(Debug, Clone)]
pub struct ProfileCache {
    path: PathBuf,
}

impl ProfileCache {
    /// Creates a cache at the given file path.
    pub fn new(path: impl AsRef<Path>) -> Self {
        ProfileCache {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the cache file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the cached profile, if any.
    ///
    /// A missing file means no one was logged in; a corrupt file is an
    /// error so the caller can decide whether to discard it.
    pub fn load(&self) -> Result<Option<User>, StorageError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let user =
            serde_json::from_str(&data).map_err(|e| StorageError::Serialization(e.to_string()))?;
        Ok(Some(user))
    }

    /// Persists the profile, replacing any previous one.
    pub fn save(&self, user: &User) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(user)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(&self.path, data)?;
        Ok(())
    }

    /// Removes the persisted profile. No-op if absent.
    pub fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
