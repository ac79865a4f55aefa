//! # Quiz Funnel Editor
//!
//! Document model and editing engine for multi-step quiz funnels.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ property_editor: component → form → patch   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ session: working document + selection       │
//! │  - Apply mutations copy-on-write            │
//! │  - Optional undo/redo history               │
//! │  - Schedule debounced auto-save             │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ snapshot: latest + rotating backups         │
//! │ storage:  key-value backend (memory, file)  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Document is the source of truth**: forms and listings are views
//! 2. **Total mutations**: dangling ids are no-ops; only deleting the last
//!    step is refused
//! 3. **Dense ordering**: component `order` is always `0..n` within a step
//! 4. **Persistence never blocks editing**: failed writes are reported, the
//!    in-memory document is kept
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quizfunnel_editor::{EditSession, EditorConfig, FileStorage, Mutation, SnapshotStore};
//! use std::sync::Arc;
//!
//! let config = EditorConfig::default();
//! let store = Arc::new(SnapshotStore::new(FileStorage::new(".quizfunnel")?, &config));
//! let mut session = EditSession::open(store, &config);
//!
//! session.apply(Mutation::AddStep)?;
//! session.apply(Mutation::AddComponent { component_type: ComponentType::Options })?;
//!
//! // Debounced write fires after the quiet period; or force it
//! session.save_now()?;
//! ```

mod autosave;
mod component;
mod config;
mod document;
mod errors;
mod ids;
mod image;
mod mutations;
mod property_editor;
mod session;
mod snapshot;
mod storage;
mod undo_stack;

pub use autosave::{AutoSaver, PublishReceipt, SaveState, SaveStatus};
pub use component::{
    derive_value, AlertProps, AlertVariant, ButtonAction, ButtonProps, CarouselProps, Choice,
    Component, ComponentProps, ComponentType, CustomProps, ImageProps, InputProps, InputType,
    OptionsProps, PropsPatch, SpacerProps, StyleOverrides, TextAlign, TextProps,
    UnknownComponentType, VideoProps,
};
pub use config::EditorConfig;
pub use document::{default_document, Document, FinalPage, HeaderConfig, HeaderPatch, Step};
pub use errors::EditorError;
pub use ids::{session_seed, IdGenerator};
pub use image::{optimize_image_url, ImageSettings};
pub use mutations::{MoveDirection, Mutation, MutationError, MutationOutcome};
pub use property_editor::{
    form_for, FieldKind, FieldSpec, FormError, FormKind, OptionsForm, PropertyForm, PropsChange,
};
pub use session::EditSession;
pub use snapshot::{
    load_or_default, DocumentStore, PersistedSnapshot, SaveReceipt, SnapshotStore, FORMAT_VERSION,
};
pub use storage::{FileStorage, MemoryStorage, StorageBackend, StorageError, StorageResult};
pub use undo_stack::{History, HistoryEntry, NoHistory, UndoStack};
