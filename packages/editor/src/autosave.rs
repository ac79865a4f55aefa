//! # Debounced Auto-Save
//!
//! ```text
//!            mutation               timer expires           write done
//!  Idle ─────────────▶ PendingSave ──────────────▶ Saving ─────────────▶ Saved
//!  Saved ────────────▶     ▲   │ mutation: cancel + re-arm                 │
//!                          └───┘                                           │
//!                          ◀───────────────────── mutation ────────────────┘
//! ```
//!
//! Every mutation calls [`AutoSaver::schedule_save`], which aborts the armed
//! timer (if any) and arms a fresh one, so a burst of edits produces one write
//! holding the state after the last edit. [`AutoSaver::save_now`] skips the
//! timer entirely. Once a timer has expired its write runs to completion on
//! the blocking pool; only armed timers are ever cancelled.
//!
//! Failed writes are reported through [`SaveStatus::last_error`]; the caller's
//! document is never touched.

use crate::document::Document;
use crate::snapshot::{DocumentStore, SaveReceipt};
use crate::storage::StorageError;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SaveState {
    Idle,
    PendingSave,
    Saving,
    Saved,
}

/// Observable persistence status
#[derive(Debug, Clone, PartialEq)]
pub struct SaveStatus {
    pub state: SaveState,
    pub last_saved_at: Option<DateTime<Utc>>,
    /// Message of the most recent failed write, cleared by the next success
    pub last_error: Option<String>,
    /// Whether the most recent successful write was a publish
    pub published: bool,
}

impl Default for SaveStatus {
    fn default() -> Self {
        Self {
            state: SaveState::Idle,
            last_saved_at: None,
            last_error: None,
            published: false,
        }
    }
}

/// Confirmation returned by [`AutoSaver::publish`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub saved: SaveReceipt,
    pub published_at: DateTime<Utc>,
}

/// Owns the debounce timer and the write path to a [`DocumentStore`]
pub struct AutoSaver {
    store: Arc<dyn DocumentStore>,
    delay: Duration,
    status: Arc<watch::Sender<SaveStatus>>,
    /// Bumped on every schedule/save; a timer only writes if it is still current
    generation: Arc<AtomicU64>,
    /// Orders timer writes against `save_now`
    write_lock: Arc<Mutex<()>>,
    timer: Option<JoinHandle<()>>,
}

impl AutoSaver {
    pub fn new(store: Arc<dyn DocumentStore>, delay: Duration) -> Self {
        let (status, _) = watch::channel(SaveStatus::default());
        Self {
            store,
            delay,
            status: Arc::new(status),
            generation: Arc::new(AtomicU64::new(0)),
            write_lock: Arc::new(Mutex::new(())),
            timer: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn status(&self) -> SaveStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.subscribe()
    }

    /// Arm (or re-arm) the debounce timer with `document` as the pending state.
    ///
    /// Outside a tokio runtime there is no timer to arm and the document is
    /// written immediately instead.
    pub fn schedule_save(&mut self, document: &Document) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.cancel_timer();

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No async runtime, saving synchronously");
            let _ = self.save_now(document);
            return;
        };

        self.status.send_modify(|s| s.state = SaveState::PendingSave);

        let snapshot = document.clone();
        let store = Arc::clone(&self.store);
        let status = Arc::clone(&self.status);
        let current = Arc::clone(&self.generation);
        let lock = Arc::clone(&self.write_lock);
        let delay = self.delay;

        self.timer = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;

            if current.load(Ordering::SeqCst) != generation {
                return;
            }

            // Storage writes block; the generation is checked again once the
            // write lock is held so an older snapshot never lands after a newer one
            let write = tokio::task::spawn_blocking(move || {
                let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
                if current.load(Ordering::SeqCst) != generation {
                    return;
                }

                status.send_modify(|s| s.state = SaveState::Saving);
                let result = store.save(&snapshot);
                record_result(&status, &current, generation, &result, false);
            });

            if let Err(e) = write.await {
                warn!(error = %e, "Auto-save write did not complete");
            }
        }));
    }

    /// Write `document` immediately, dropping any armed timer
    pub fn save_now(&mut self, document: &Document) -> Result<SaveReceipt, StorageError> {
        self.write(document, false)
    }

    /// Save now, then flag the write as a publish
    pub fn publish(&mut self, document: &Document) -> Result<PublishReceipt, StorageError> {
        let saved = self.write(document, true)?;
        let published_at = Utc
            .timestamp_millis_opt(saved.timestamp)
            .single()
            .unwrap_or_else(Utc::now);

        info!(timestamp = saved.timestamp, "Document published");

        Ok(PublishReceipt {
            saved,
            published_at,
        })
    }

    /// Whether a timer is armed and has not fired yet
    pub fn has_pending_save(&self) -> bool {
        self.timer.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
            && self.status.borrow().state == SaveState::PendingSave
    }

    fn write(&mut self, document: &Document, publish: bool) -> Result<SaveReceipt, StorageError> {
        let lock = Arc::clone(&self.write_lock);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.cancel_timer();

        self.status.send_modify(|s| s.state = SaveState::Saving);
        let result = self.store.save(document);
        record_result(&self.status, &self.generation, generation, &result, publish);
        result
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

fn record_result(
    status: &watch::Sender<SaveStatus>,
    current: &AtomicU64,
    generation: u64,
    result: &Result<SaveReceipt, StorageError>,
    publish: bool,
) {
    // A newer edit may have re-armed the timer while we were writing
    let superseded = current.load(Ordering::SeqCst) != generation;

    match result {
        Ok(receipt) => {
            debug!(timestamp = receipt.timestamp, publish, "Auto-save complete");
            status.send_modify(|s| {
                s.last_saved_at = Utc.timestamp_millis_opt(receipt.timestamp).single();
                s.last_error = None;
                s.published = publish;
                if !superseded {
                    s.state = SaveState::Saved;
                }
            });
        }
        Err(e) => {
            warn!(error = %e, "Save failed, in-memory document kept");
            status.send_modify(|s| {
                s.last_error = Some(e.to_string());
                if !superseded {
                    s.state = SaveState::Idle;
                }
            });
        }
    }
}
