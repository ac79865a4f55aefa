//! # Persisted Snapshots
//!
//! Serialized documents in durable storage.
//!
//! ## Key space
//!
//! ```text
//! <prefix>latest              canonical snapshot, overwritten on every save
//! <prefix>backup-<millis>     rotating backups, newest N retained
//! ```
//!
//! Each entry holds `{ "data": <Document>, "timestamp": <millis>, "version": "1.0" }`.

use crate::config::EditorConfig;
use crate::document::{default_document, Document};
use crate::storage::{StorageBackend, StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::{debug, info, warn};

pub const FORMAT_VERSION: &str = "1.0";

/// Wire form of a stored document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    pub data: Document,
    pub timestamp: i64,
    pub version: String,
}

/// Result of a successful durable write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReceipt {
    /// Milliseconds since the epoch, also the backup key suffix
    pub timestamp: i64,
    pub backup_key: String,
    /// Backups deleted by rotation
    pub pruned: usize,
}

/// Persistence port used by the edit session and the auto-saver
pub trait DocumentStore: Send + Sync {
    /// `Ok(None)` when nothing has been stored yet
    fn load(&self) -> StorageResult<Option<Document>>;

    fn save(&self, document: &Document) -> StorageResult<SaveReceipt>;
}

/// Document store over any key-value backend
#[derive(Debug)]
pub struct SnapshotStore<B> {
    backend: B,
    prefix: String,
    backup_limit: usize,
    version: String,
    /// Held for a whole save: the timestamp choice and both writes
    write_lock: Mutex<()>,
}

impl<B: StorageBackend> SnapshotStore<B> {
    pub fn new(backend: B, config: &EditorConfig) -> Self {
        Self {
            backend,
            prefix: config.storage_prefix.clone(),
            backup_limit: config.backup_limit,
            version: config.format_version.clone(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn latest_key(&self) -> String {
        format!("{}latest", self.prefix)
    }

    fn backup_prefix(&self) -> String {
        format!("{}backup-", self.prefix)
    }

    pub fn backup_key(&self, timestamp: i64) -> String {
        format!("{}{}", self.backup_prefix(), timestamp)
    }

    /// Backup keys with their timestamps, oldest first
    pub fn backups(&self) -> StorageResult<Vec<(i64, String)>> {
        let prefix = self.backup_prefix();
        let mut backups: Vec<(i64, String)> = self
            .backend
            .keys()?
            .into_iter()
            .filter_map(|key| {
                let stamp = key.strip_prefix(&prefix)?.parse::<i64>().ok()?;
                Some((stamp, key))
            })
            .collect();

        backups.sort();
        Ok(backups)
    }

    /// Read one snapshot entry
    pub fn read_snapshot(&self, key: &str) -> StorageResult<Option<PersistedSnapshot>> {
        match self.backend.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Make a backup the canonical snapshot again (and back it up anew)
    pub fn restore_backup(&self, key: &str) -> StorageResult<Option<SaveReceipt>> {
        match self.read_snapshot(key)? {
            Some(snapshot) => {
                info!(backup = %key, "Restoring backup snapshot");
                self.save(&snapshot.data).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_timestamp(&self) -> StorageResult<i64> {
        let now = chrono::Utc::now().timestamp_millis();
        let newest = self.backups()?.last().map(|(stamp, _)| *stamp);

        // Strictly increasing so rapid saves never share a backup key
        Ok(match newest {
            Some(stamp) if stamp >= now => stamp + 1,
            _ => now,
        })
    }

    fn prune_backups(&self) -> StorageResult<usize> {
        let backups = self.backups()?;
        let excess = backups.len().saturating_sub(self.backup_limit);

        for (_, key) in backups.iter().take(excess) {
            self.backend.remove(key)?;
        }

        if excess > 0 {
            debug!(removed = excess, kept = self.backup_limit, "Pruned old backups");
        }

        Ok(excess)
    }
}

impl<B: StorageBackend> DocumentStore for SnapshotStore<B> {
    fn load(&self) -> StorageResult<Option<Document>> {
        Ok(self.read_snapshot(&self.latest_key())?.map(|s| s.data))
    }

    fn save(&self, document: &Document) -> StorageResult<SaveReceipt> {
        let _guard = self.write_lock.lock().map_err(|_| StorageError::Poisoned)?;
        let timestamp = self.next_timestamp()?;
        let snapshot = PersistedSnapshot {
            data: document.clone(),
            timestamp,
            version: self.version.clone(),
        };
        let raw = serde_json::to_string(&snapshot)?;

        self.backend.set(&self.latest_key(), &raw)?;

        let backup_key = self.backup_key(timestamp);
        self.backend.set(&backup_key, &raw)?;
        let pruned = self.prune_backups()?;

        debug!(timestamp, backup = %backup_key, "Snapshot written");

        Ok(SaveReceipt {
            timestamp,
            backup_key,
            pruned,
        })
    }
}

/// Load the canonical snapshot, falling back to the built-in funnel.
///
/// Missing entries and unreadable data both yield the default document; the
/// latter is only logged.
pub fn load_or_default(store: &dyn DocumentStore) -> Document {
    match store.load() {
        Ok(Some(mut document)) if !document.steps.is_empty() => {
            if document.normalize() {
                warn!("Stored document had stale orders or active step, repaired");
            }
            document
        }
        Ok(Some(_)) => {
            warn!("Stored document has no steps, using default document");
            default_document()
        }
        Ok(None) => {
            debug!("No stored document, using default document");
            default_document()
        }
        Err(StorageError::Serialization(e)) => {
            warn!(error = %e, "Stored document is malformed, using default document");
            default_document()
        }
        Err(e) => {
            warn!(error = %e, "Could not read stored document, using default document");
            default_document()
        }
    }
}
