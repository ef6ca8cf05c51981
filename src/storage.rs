// src/storage.rs
//! Persisted key/value state. Only the session store reads or writes it.

use crate::error::StorageError;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>, StorageError> {
        self.entries.lock().map_err(|_| StorageError::Poisoned)
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries()?.remove(key);
        Ok(())
    }
}

/// A single JSON object file of string entries. A missing file reads as empty.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(entries)?)?;
        debug!("Wrote {} entries to {}", entries.len(), self.path.display());
        Ok(())
    }

    fn modify(
        &self,
        change: impl FnOnce(&mut BTreeMap<String, String>) -> bool,
    ) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let (mut entries, replace_corrupt) = match self.read_all() {
            Ok(entries) => (entries, false),
            Err(StorageError::Serialization(e)) => {
                warn!("Replacing unreadable {}: {}", self.path.display(), e);
                (BTreeMap::new(), true)
            }
            Err(e) => return Err(e),
        };
        if change(&mut entries) || replace_corrupt {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.modify(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.modify(|entries| entries.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FileStorage) {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path().join("nested").join("session.json"));
        (temp, storage)
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let (_temp, storage) = setup();
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert!(!storage.path().exists());
    }

    #[test]
    fn set_creates_parent_dirs_and_persists() {
        let (_temp, storage) = setup();
        storage.set(TOKEN_KEY, "T1").unwrap();

        let reopened = FileStorage::new(storage.path());
        assert_eq!(reopened.get(TOKEN_KEY).unwrap().as_deref(), Some("T1"));
    }

    #[test]
    fn remove_deletes_only_that_key() {
        let (_temp, storage) = setup();
        storage.set(TOKEN_KEY, "T1").unwrap();
        storage.set(USER_KEY, r#"{"id":0,"email":"a@x.com"}"#).unwrap();
        storage.remove(TOKEN_KEY).unwrap();

        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert!(storage.get(USER_KEY).unwrap().is_some());
    }

    #[test]
    fn removing_from_missing_file_does_not_create_it() {
        let (_temp, storage) = setup();
        storage.remove(USER_KEY).unwrap();
        assert!(!storage.path().exists());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let (_temp, storage) = setup();
        fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
        fs::write(storage.path(), "{not json").unwrap();
        assert!(matches!(
            storage.get(TOKEN_KEY),
            Err(StorageError::Serialization(_))
        ));
    }

    #[test]
    fn writes_replace_a_corrupt_file() {
        let (_temp, storage) = setup();
        fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
        fs::write(storage.path(), "{not json").unwrap();

        storage.set(TOKEN_KEY, "T2").unwrap();
        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("T2"));
    }

    #[test]
    fn remove_clears_a_corrupt_file() {
        let (_temp, storage) = setup();
        fs::create_dir_all(storage.path().parent().unwrap()).unwrap();
        fs::write(storage.path(), "{not json").unwrap();

        storage.remove(USER_KEY).unwrap();
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
        assert_ne!(fs::read_to_string(storage.path()).unwrap(), "{not json");
    }

    #[test]
    fn memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        storage.set(USER_KEY, "u").unwrap();
        assert_eq!(storage.get(USER_KEY).unwrap().as_deref(), Some("u"));
        storage.remove(USER_KEY).unwrap();
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
    }
}
