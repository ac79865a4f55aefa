use crate::commands::project::Project;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use quizfunnel_editor::DocumentStore;

#[derive(Debug, Args)]
pub struct BackupsArgs {
    /// Make this backup the current document again
    #[arg(long)]
    pub restore: Option<String>,
}

/// Write the stored document now (a fresh snapshot and backup)
pub fn save(cwd: &str) -> Result<()> {
    let project = Project::open(cwd)?;
    let mut session = project.session();
    let receipt = session.save_now()?;

    println!(
        "{} Saved ({}, {} old backups pruned)",
        "✓".green(),
        receipt.backup_key.cyan(),
        receipt.pruned
    );
    Ok(())
}

pub fn publish(cwd: &str) -> Result<()> {
    let project = Project::open(cwd)?;
    let mut session = project.session();
    let receipt = session.publish()?;

    println!(
        "{} {} at {}",
        "✅".green(),
        "Published".green().bold(),
        receipt.published_at.to_rfc3339()
    );
    Ok(())
}

pub fn backups(args: BackupsArgs, cwd: &str) -> Result<()> {
    let project = Project::open(cwd)?;

    if let Some(key) = args.restore {
        let receipt = project
            .store
            .restore_backup(&key)?
            .ok_or_else(|| anyhow!("No backup named '{}'", key))?;
        println!(
            "{} Restored {} (saved as {})",
            "✓".green(),
            key.cyan(),
            receipt.backup_key
        );
        return Ok(());
    }

    let backups = project.store.backups()?;
    if backups.is_empty() {
        println!("{} No backups yet", "⚠️".yellow());
        return Ok(());
    }

    for (timestamp, key) in backups.iter().rev() {
        let when = timestamp_label(*timestamp);
        let steps = project
            .store
            .read_snapshot(key)?
            .map(|s| s.data.steps.len())
            .unwrap_or(0);
        println!("  {}  {}  {} steps", key.cyan(), when.dimmed(), steps);
    }

    if project.store.load()?.is_none() {
        println!("{} No current document, restore one with --restore", "⚠️".yellow());
    }

    Ok(())
}

fn timestamp_label(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|at| at.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string())
        .unwrap_or_else(|| millis.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::step::{step, StepCommand};

    #[test]
    fn test_save_then_restore_backup() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().to_str().unwrap();

        save(cwd).unwrap();
        let project = Project::open(cwd).unwrap();
        let (_, first) = project.store.backups().unwrap().remove(0);

        step(StepCommand::Add, cwd).unwrap();
        assert_eq!(project.store.load().unwrap().unwrap().steps.len(), 2);

        backups(BackupsArgs { restore: Some(first) }, cwd).unwrap();
        assert_eq!(project.store.load().unwrap().unwrap().steps.len(), 1);
    }

    #[test]
    fn test_restore_unknown_backup() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().to_str().unwrap();

        let err = backups(
            BackupsArgs {
                restore: Some("quiz-editor-backup-1".to_string()),
            },
            cwd,
        )
        .unwrap_err();
        assert!(err.to_string().contains("No backup"));
    }

    #[test]
    fn test_publish_writes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().to_str().unwrap();

        publish(cwd).unwrap();
        assert!(Project::open(cwd).unwrap().store.load().unwrap().is_some());
    }

    #[test]
    fn test_timestamp_label() {
        assert_eq!(timestamp_label(0), "1970-01-01 00:00:00.000 UTC");
    }
}
