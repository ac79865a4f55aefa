//! Durable key-value storage behind the persistence layer.
//!
//! The editor only needs `localStorage`-like semantics: string keys, string
//! values, listing keys. [`MemoryStorage`] serves tests (with an optional byte
//! quota to exercise write failures), [`FileStorage`] keeps one JSON file per
//! key in a directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage quota exceeded: {needed} bytes needed, {available} available")]
    QuotaExceeded { needed: usize, available: usize },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Key-value storage abstraction
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Insert or overwrite
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a key; missing keys are not an error
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// All keys currently stored
    fn keys(&self) -> StorageResult<Vec<String>>;
}

/// In-memory storage for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
    quota: Option<usize>,
    write_log: Mutex<Vec<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse writes once the stored bytes (keys + values) would exceed `bytes`
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::default()
        }
    }

    /// Keys of successful `set` calls, in order
    pub fn write_log(&self) -> Vec<String> {
        self.write_log
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    /// Number of successful writes to `key`
    pub fn writes_to(&self, key: &str) -> usize {
        self.write_log().iter().filter(|k| k.as_str() == key).count()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;

        if let Some(quota) = self.quota {
            let used: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = key.len() + value.len();
            if used + needed > quota {
                return Err(StorageError::QuotaExceeded {
                    needed,
                    available: quota.saturating_sub(used),
                });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        drop(entries);

        self.write_log
            .lock()
            .map_err(|_| StorageError::Poisoned)?
            .push(key.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let entries = self.entries.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.keys().cloned().collect())
    }
}

const FILE_EXTENSION: &str = "json";

/// One `<key>.json` file per entry under a root directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) a storage directory
    pub fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        Ok(self.root.join(format!("{}.{}", key, FILE_EXTENSION)))
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;

        // Write-then-rename so readers never see a half-written entry
        let tmp = path.with_extension(format!("{}.tmp", FILE_EXTENSION));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let mut keys = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().map(|e| e == FILE_EXTENSION).unwrap_or(false) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }

        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();

        storage.set("a", "1").unwrap();
        storage.set("b", "2").unwrap();
        storage.set("a", "3").unwrap();

        assert_eq!(storage.get("a").unwrap().as_deref(), Some("3"));
        assert_eq!(storage.keys().unwrap(), vec!["a", "b"]);
        assert_eq!(storage.writes_to("a"), 2);

        storage.remove("a").unwrap();
        storage.remove("missing").unwrap();
        assert!(storage.get("a").unwrap().is_none());
    }

    #[test]
    fn test_memory_storage_quota() {
        let storage = MemoryStorage::with_quota(10);

        storage.set("k", "12345").unwrap();
        let err = storage.set("other", "123456").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { .. }));

        // Overwriting an existing key only counts the new value
        storage.set("k", "123456789").unwrap();
        assert!(storage.get("other").unwrap().is_none());
    }

    #[test]
    fn test_file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("store")).unwrap();

        assert!(storage.get("quiz-editor-latest").unwrap().is_none());

        storage.set("quiz-editor-latest", "{}").unwrap();
        storage.set("quiz-editor-backup-1", "{}").unwrap();

        assert_eq!(storage.get("quiz-editor-latest").unwrap().as_deref(), Some("{}"));
        assert_eq!(
            storage.keys().unwrap(),
            vec!["quiz-editor-backup-1", "quiz-editor-latest"]
        );

        storage.remove("quiz-editor-backup-1").unwrap();
        assert_eq!(storage.keys().unwrap(), vec!["quiz-editor-latest"]);
    }

    #[test]
    fn test_file_storage_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        assert!(matches!(
            storage.set("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(storage.get("a/b"), Err(StorageError::InvalidKey(_))));
    }
}
