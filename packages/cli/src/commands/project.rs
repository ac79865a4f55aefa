//! Shared plumbing for commands that work on the stored funnel

use crate::config::Config;
use anyhow::Result;
use colored::Colorize;
use quizfunnel_editor::{
    EditSession, FileStorage, Mutation, MutationOutcome, SnapshotStore,
};
use std::sync::Arc;

pub struct Project {
    pub config: Config,
    pub store: Arc<SnapshotStore<FileStorage>>,
}

impl Project {
    pub fn open(cwd: &str) -> Result<Self> {
        let config = Config::load(cwd)?;
        let storage = FileStorage::new(config.get_storage_dir(cwd))?;
        let store = Arc::new(SnapshotStore::new(storage, &config.editor));
        Ok(Self { config, store })
    }

    /// Session over the stored document (or the default funnel)
    pub fn session(&self) -> EditSession {
        EditSession::open(self.store.clone(), &self.config.editor)
    }
}

/// Apply one mutation and report the outcome.
///
/// Outside an async runtime the session writes right after the mutation, so
/// a failed write shows up in the save status straight away.
pub fn apply_and_report(session: &mut EditSession, mutation: Mutation) -> Result<MutationOutcome> {
    let name = mutation.name();
    let outcome = session.apply(mutation)?;

    if outcome.is_change() {
        println!("{} {}", "✓".green(), describe(&outcome));
    } else {
        println!("{} {}: nothing to change", "⚠️".yellow(), name);
    }

    report_save_error(session);
    Ok(outcome)
}

pub fn report_save_error(session: &EditSession) {
    if let Some(error) = session.save_status().and_then(|s| s.last_error) {
        eprintln!(
            "{} Document kept in memory but not saved: {}",
            "⚠️".yellow(),
            error
        );
    }
}

pub fn describe(outcome: &MutationOutcome) -> String {
    match outcome {
        MutationOutcome::Unchanged => "Unchanged".to_string(),
        MutationOutcome::Updated => "Updated".to_string(),
        MutationOutcome::StepCreated { step_id } => format!("Created step {}", step_id.cyan()),
        MutationOutcome::StepRemoved { step_id } => format!("Removed step {}", step_id.cyan()),
        MutationOutcome::ComponentCreated { component_id } => {
            format!("Created component {}", component_id.cyan())
        }
        MutationOutcome::ComponentDuplicated { component_id } => {
            format!("Duplicated as {}", component_id.cyan())
        }
        MutationOutcome::ComponentRemoved { component_id } => {
            format!("Removed component {}", component_id.cyan())
        }
    }
}
