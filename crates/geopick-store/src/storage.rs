//! String-keyed persistence backings.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("storage JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Synchronous string-keyed persistence.
///
/// Values are opaque strings (callers JSON-encode their own records). A
/// completed `set_item` must be visible to any later reader of the same
/// backing medium.
pub trait Storage {
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backing medium cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns [`StorageError`] when the write does not complete.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key` if present. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the removal does not complete.
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Volatile in-process storage for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        Ok(())
    }
}

/// Durable storage backed by a single JSON object file.
///
/// The whole map is read once at [`FileStorage::open`] and the file is
/// rewritten on every mutation, so a mutation that returns `Ok` is already
/// on disk.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl FileStorage {
    /// Opens the store at `path`, creating an empty one when the file does
    /// not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the file exists but cannot be read or
    /// does not hold a JSON object of strings. Overwriting such a file
    /// could destroy someone's data, so it is never silently reset.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let items = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(StorageError::Io(e)),
        };
        Ok(Self { path, items })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(&self.items)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        if self.items.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
