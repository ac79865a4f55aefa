//! # Edit Session
//!
//! Owns the working document, the selection, history and the auto-saver.
//!
//! Every mutation goes through [`EditSession::apply`]: the next snapshot is
//! computed from the current one, swapped in, and handed to the auto-saver.
//! Earlier snapshots are never modified, so history can hold on to them.

use crate::autosave::{AutoSaver, PublishReceipt, SaveStatus};
use crate::component::Component;
use crate::config::EditorConfig;
use crate::document::{Document, Step};
use crate::errors::EditorError;
use crate::ids::{session_seed, IdGenerator};
use crate::mutations::{Mutation, MutationError, MutationOutcome};
use crate::property_editor::PropsChange;
use crate::snapshot::{load_or_default, DocumentStore, SaveReceipt};
use crate::undo_stack::{History, NoHistory, UndoStack};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

pub struct EditSession {
    /// Unique session identifier
    pub id: String,

    document: Document,

    /// Bumped on every effective change, including undo/redo
    version: u64,

    selected_component: Option<String>,

    ids: IdGenerator,

    history: Box<dyn History>,

    autosave: Option<AutoSaver>,
}

impl EditSession {
    /// In-memory session without persistence or history
    pub fn new(document: Document) -> Self {
        let ids = IdGenerator::new();
        Self {
            id: format!("session-{}", ids.seed()),
            document,
            version: 0,
            selected_component: None,
            ids,
            history: Box::new(NoHistory),
            autosave: None,
        }
    }

    /// Load the stored document (or the default funnel) and attach auto-save
    pub fn open(store: Arc<dyn DocumentStore>, config: &EditorConfig) -> Self {
        let document = load_or_default(store.as_ref());
        let mut session = Self::new(document)
            .with_autosave(AutoSaver::new(store, config.autosave_delay()));

        if let Some(limit) = config.history_limit {
            session = session.with_history(Box::new(UndoStack::with_max_levels(limit)));
        }

        info!(
            session = %session.id,
            steps = session.document.steps.len(),
            components = session.document.component_count(),
            "Edit session opened"
        );

        session
    }

    pub fn with_history(mut self, history: Box<dyn History>) -> Self {
        self.history = history;
        self
    }

    pub fn with_autosave(mut self, autosave: AutoSaver) -> Self {
        self.autosave = Some(autosave);
        self
    }

    /// Use a deterministic id sequence derived from `token`
    pub fn with_id_seed(mut self, token: &str) -> Self {
        self.ids = IdGenerator::from_seed(session_seed(token));
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn active_step(&self) -> Option<&Step> {
        self.document.active_step()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_component.as_deref()
    }

    pub fn selected_component(&self) -> Option<&Component> {
        self.selected_component
            .as_deref()
            .and_then(|id| self.document.component(id))
    }

    /// Select a component, or clear the selection with `None`.
    ///
    /// Unknown ids clear the selection.
    pub fn select_component(&mut self, component_id: Option<&str>) {
        self.selected_component = component_id
            .filter(|id| self.document.component(id).is_some())
            .map(str::to_string);
    }

    /// Apply a mutation to the working document
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationOutcome, MutationError> {
        let (next, outcome) = mutation.apply_to(&self.document, &mut self.ids)?;

        if !outcome.is_change() {
            return Ok(outcome);
        }

        self.history.record(&self.document, mutation.name());
        self.document = next;
        self.version += 1;

        match &outcome {
            MutationOutcome::ComponentCreated { component_id } => {
                self.selected_component = Some(component_id.clone());
            }
            MutationOutcome::ComponentRemoved { component_id } => {
                if self.selected_component.as_deref() == Some(component_id.as_str()) {
                    self.selected_component = None;
                }
            }
            MutationOutcome::StepRemoved { .. } => self.drop_stale_selection(),
            _ => {}
        }

        debug!(
            mutation = mutation.name(),
            version = self.version,
            "Mutation applied"
        );

        self.document_changed();
        Ok(outcome)
    }

    /// Apply a property-form edit
    pub fn apply_props_change(&mut self, change: PropsChange) -> Result<MutationOutcome, MutationError> {
        self.apply(change.into_mutation())
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo(&self.document) {
            Some(previous) => {
                self.restore(previous);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(&self.document) {
            Some(next) => {
                self.restore(next);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Group the following mutations into one undo step
    pub fn begin_batch(&mut self, description: &str) {
        self.history.begin_batch(description);
    }

    pub fn end_batch(&mut self) {
        self.history.end_batch();
    }

    /// Write the current document right away
    pub fn save_now(&mut self) -> Result<SaveReceipt, EditorError> {
        let autosave = self.autosave.as_mut().ok_or(EditorError::NoStore)?;
        Ok(autosave.save_now(&self.document)?)
    }

    pub fn publish(&mut self) -> Result<PublishReceipt, EditorError> {
        let autosave = self.autosave.as_mut().ok_or(EditorError::NoStore)?;
        Ok(autosave.publish(&self.document)?)
    }

    pub fn save_status(&self) -> Option<SaveStatus> {
        self.autosave.as_ref().map(AutoSaver::status)
    }

    pub fn subscribe(&self) -> Option<watch::Receiver<SaveStatus>> {
        self.autosave.as_ref().map(AutoSaver::subscribe)
    }

    pub fn has_pending_save(&self) -> bool {
        self.autosave
            .as_ref()
            .map(AutoSaver::has_pending_save)
            .unwrap_or(false)
    }

    fn restore(&mut self, document: Document) {
        self.document = document;
        self.version += 1;
        self.drop_stale_selection();
        self.document_changed();
    }

    fn drop_stale_selection(&mut self) {
        if let Some(id) = &self.selected_component {
            if self.document.component(id).is_none() {
                self.selected_component = None;
            }
        }
    }

    fn document_changed(&mut self) {
        if let Some(autosave) = self.autosave.as_mut() {
            autosave.schedule_save(&self.document);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentType;
    use crate::document::default_document;
    use crate::property_editor::form_for;
    use crate::snapshot::SnapshotStore;
    use crate::storage::MemoryStorage;

    fn session() -> EditSession {
        EditSession::new(default_document()).with_id_seed("test")
    }

    #[test]
    fn test_session_starts_on_default_document() {
        let session = session();
        assert_eq!(session.version(), 0);
        assert_eq!(session.active_step().unwrap().id, "quiz-intro");
        assert!(session.selected_id().is_none());
        assert!(!session.can_undo());
    }

    #[test]
    fn test_add_component_selects_it() {
        let mut session = session();
        let outcome = session
            .apply(Mutation::AddComponent {
                component_type: ComponentType::Options,
            })
            .unwrap();

        let MutationOutcome::ComponentCreated { component_id } = outcome else {
            panic!("Expected a created component");
        };

        assert_eq!(session.selected_id(), Some(component_id.as_str()));
        assert_eq!(session.version(), 1);
        assert_eq!(session.active_step().unwrap().components.len(), 6);
    }

    #[test]
    fn test_delete_clears_selection() {
        let mut session = session();
        session.select_component(Some("intro-title"));
        assert_eq!(session.selected_component().unwrap().id, "intro-title");

        session
            .apply(Mutation::DeleteComponent {
                component_id: "intro-title".to_string(),
            })
            .unwrap();

        assert!(session.selected_id().is_none());
    }

    #[test]
    fn test_select_unknown_component_clears() {
        let mut session = session();
        session.select_component(Some("intro-title"));
        session.select_component(Some("nope"));
        assert!(session.selected_id().is_none());
    }

    #[test]
    fn test_noop_does_not_bump_version() {
        let mut session = session();
        let before = session.document().clone();

        let outcome = session
            .apply(Mutation::DeleteComponent {
                component_id: "missing".to_string(),
            })
            .unwrap();

        assert_eq!(outcome, MutationOutcome::Unchanged);
        assert_eq!(session.version(), 0);
        assert_eq!(session.document(), &before);
    }

    #[test]
    fn test_last_step_error_keeps_document() {
        let mut session = session();
        let err = session
            .apply(Mutation::DeleteStep {
                step_id: "quiz-intro".to_string(),
            })
            .unwrap_err();

        assert_eq!(err, MutationError::LastStep("quiz-intro".to_string()));
        assert_eq!(session.document(), &default_document());
    }

    #[test]
    fn test_props_change_flows_through_session() {
        let mut session = session();
        let title = session.document().component("intro-title").unwrap().clone();
        let change = form_for(&title).edit("text", "Descubra seu estilo").unwrap();

        session.apply_props_change(change).unwrap();

        let summary = session.document().component("intro-title").unwrap().props.summary();
        assert!(summary.contains("Descubra seu estilo"));
    }

    #[test]
    fn test_undo_redo_with_history() {
        let mut session = session().with_history(Box::new(UndoStack::new()));

        session.apply(Mutation::AddStep).unwrap();
        assert_eq!(session.document().steps.len(), 2);
        assert!(session.can_undo());

        assert!(session.undo());
        assert_eq!(session.document(), &default_document());
        assert!(session.can_redo());

        assert!(session.redo());
        assert_eq!(session.document().steps.len(), 2);
        assert_eq!(session.version(), 3);
    }

    #[test]
    fn test_undo_drops_selection_of_vanished_component() {
        let mut session = session().with_history(Box::new(UndoStack::new()));
        session
            .apply(Mutation::AddComponent {
                component_type: ComponentType::Alert,
            })
            .unwrap();
        assert!(session.selected_id().is_some());

        session.undo();
        assert!(session.selected_id().is_none());
    }

    #[test]
    fn test_save_without_store() {
        let mut session = session();
        assert!(matches!(session.save_now(), Err(EditorError::NoStore)));
        assert!(matches!(session.publish(), Err(EditorError::NoStore)));
        assert!(session.save_status().is_none());
    }

    #[test]
    fn test_open_with_history_limit() {
        let config = EditorConfig {
            history_limit: Some(10),
            ..EditorConfig::default()
        };
        let store = Arc::new(SnapshotStore::new(MemoryStorage::new(), &config));
        let mut session = EditSession::open(store.clone(), &config);

        session
            .apply(Mutation::RenameStep {
                step_id: "quiz-intro".to_string(),
                name: "Início".to_string(),
            })
            .unwrap();

        // No runtime: the scheduled save happened synchronously
        assert_eq!(store.load().unwrap().unwrap().steps[0].name, "Início");
        assert!(session.can_undo());
    }
}
