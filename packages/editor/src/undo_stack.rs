//! # Undo/Redo History
//!
//! History is an extension point of the edit session. The default,
//! [`NoHistory`], keeps nothing. [`UndoStack`] keeps bounded document
//! snapshots.
//!
//! ## Design
//!
//! - The session records the snapshot *before* each effective mutation
//! - Undo swaps the current document with the top snapshot and moves the
//!   current one to the redo stack; redo does the reverse
//! - New edits clear the redo stack
//! - Batches group several mutations into one undo step (e.g. typing into a
//!   property field)

use crate::document::Document;

/// History policy plugged into an edit session
pub trait History: Send {
    /// Remember `before` as the state preceding a mutation
    fn record(&mut self, before: &Document, description: &str);

    /// Snapshot to return to, given the current document
    fn undo(&mut self, current: &Document) -> Option<Document>;

    /// Snapshot to go forward to, given the current document
    fn redo(&mut self, current: &Document) -> Option<Document>;

    fn can_undo(&self) -> bool;

    fn can_redo(&self) -> bool;

    /// Group following records into one undo step
    fn begin_batch(&mut self, _description: &str) {}

    fn end_batch(&mut self) {}

    fn clear(&mut self) {}
}

/// History that records nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHistory;

impl History for NoHistory {
    fn record(&mut self, _before: &Document, _description: &str) {}

    fn undo(&mut self, _current: &Document) -> Option<Document> {
        None
    }

    fn redo(&mut self, _current: &Document) -> Option<Document> {
        None
    }

    fn can_undo(&self) -> bool {
        false
    }

    fn can_redo(&self) -> bool {
        false
    }
}

/// One undo step
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub snapshot: Document,
    pub description: Option<String>,
}

/// Bounded snapshot history
#[derive(Debug)]
pub struct UndoStack {
    /// Most recent last
    undo_stack: Vec<HistoryEntry>,

    /// Most recent last
    redo_stack: Vec<HistoryEntry>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Open batch: description, and the snapshot from its first record
    current_batch: Option<(String, Option<Document>)>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    fn push_entry(&mut self, entry: HistoryEntry) {
        self.undo_stack.push(entry);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // New action invalidates the future
        self.redo_stack.clear();
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

impl History for UndoStack {
    fn record(&mut self, before: &Document, description: &str) {
        if let Some((_, first)) = &mut self.current_batch {
            if first.is_none() {
                *first = Some(before.clone());
            }
            return;
        }

        self.push_entry(HistoryEntry {
            snapshot: before.clone(),
            description: Some(description.to_string()),
        });
    }

    fn undo(&mut self, current: &Document) -> Option<Document> {
        self.end_batch();

        let entry = self.undo_stack.pop()?;
        self.redo_stack.push(HistoryEntry {
            snapshot: current.clone(),
            description: entry.description.clone(),
        });
        Some(entry.snapshot)
    }

    fn redo(&mut self, current: &Document) -> Option<Document> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push(HistoryEntry {
            snapshot: current.clone(),
            description: entry.description.clone(),
        });
        Some(entry.snapshot)
    }

    fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
            || matches!(&self.current_batch, Some((_, Some(_))))
    }

    fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn begin_batch(&mut self, description: &str) {
        self.end_batch();
        self.current_batch = Some((description.to_string(), None));
    }

    fn end_batch(&mut self) {
        if let Some((description, Some(snapshot))) = self.current_batch.take() {
            self.push_entry(HistoryEntry {
                snapshot,
                description: Some(description),
            });
        }
    }

    fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }
}
