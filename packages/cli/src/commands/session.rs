//! Streaming edit session: one JSON mutation per stdin line, debounced writes

use crate::commands::project::{describe, report_save_error, Project};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use quizfunnel_editor::{EditSession, Mutation, MutationError, SaveState};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info};

#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Auto-save quiet period in milliseconds (overrides the config)
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Keep this many undo steps (overrides the config)
    #[arg(long)]
    pub history: Option<usize>,
}

/// Counters reported when the input ends
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub applied: usize,
    pub unchanged: usize,
    pub rejected: usize,
}

pub fn session(args: SessionArgs, cwd: &str) -> Result<()> {
    // Edits and timer callbacks share one thread; writes go to the blocking pool
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let summary = runtime.block_on(async {
        let stdin = BufReader::new(tokio::io::stdin());
        run_session(args, cwd, stdin).await
    })?;

    println!(
        "{} {} applied, {} unchanged, {} rejected",
        "✅".green(),
        summary.applied,
        summary.unchanged,
        summary.rejected
    );
    Ok(())
}

pub async fn run_session<R>(args: SessionArgs, cwd: &str, input: R) -> Result<SessionSummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut project = Project::open(cwd)?;
    if let Some(delay_ms) = args.delay_ms {
        project.config.editor.autosave_delay_ms = delay_ms;
    }
    if args.history.is_some() {
        project.config.editor.history_limit = args.history;
    }

    let mut session = project.session();
    watch_saves(&session);

    info!(
        delay = ?Duration::from_millis(project.config.editor.autosave_delay_ms),
        "Reading mutations from input"
    );

    let mut summary = SessionSummary::default();
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        handle_line(&mut session, line, &mut summary);
    }

    // Flush whatever the debounce timer still holds
    let unsaved = session
        .save_status()
        .map(|s| matches!(s.state, SaveState::PendingSave | SaveState::Saving))
        .unwrap_or(false);
    if unsaved {
        debug!("Input ended before the last write, writing now");
        if let Err(e) = session.save_now() {
            eprintln!("{} Final save failed: {}", "⚠️".yellow(), e);
        }
    }

    Ok(summary)
}

fn handle_line(session: &mut EditSession, line: &str, summary: &mut SessionSummary) {
    let result = match line {
        "undo" => {
            if !session.undo() {
                println!("{} Nothing to undo", "⚠️".yellow());
            }
            return;
        }
        "redo" => {
            if !session.redo() {
                println!("{} Nothing to redo", "⚠️".yellow());
            }
            return;
        }
        "save" => session.save_now().map(|r| format!("Saved {}", r.backup_key)),
        "publish" => session
            .publish()
            .map(|r| format!("Published at {}", r.published_at.to_rfc3339())),
        "status" => {
            let status = session.save_status().unwrap_or_default();
            Ok(format!(
                "version {}, save state {:?}, last saved {}",
                session.version(),
                status.state,
                status
                    .last_saved_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "never".to_string())
            ))
        }
        _ => {
            apply_line(session, line, summary);
            return;
        }
    };

    match result {
        Ok(message) => println!("{} {}", "✓".green(), message),
        Err(e) => eprintln!("{} {}", "✗".red(), e),
    }
}

fn apply_line(session: &mut EditSession, line: &str, summary: &mut SessionSummary) {
    let mutation: Mutation = match serde_json::from_str(line) {
        Ok(mutation) => mutation,
        Err(e) => {
            eprintln!("{} Not a mutation: {}", "✗".red(), e);
            summary.rejected += 1;
            return;
        }
    };

    match session.apply(mutation) {
        Ok(outcome) if outcome.is_change() => {
            summary.applied += 1;
            println!("{} {}", "✓".green(), describe(&outcome));
        }
        Ok(_) => summary.unchanged += 1,
        Err(e @ MutationError::LastStep(_)) => {
            summary.rejected += 1;
            eprintln!("{} {}", "✗".red(), e);
        }
    }

    report_save_error(session);
}

/// Print a line whenever a write completes
fn watch_saves(session: &EditSession) {
    let Some(mut status) = session.subscribe() else {
        return;
    };

    tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let current = status.borrow_and_update().clone();
            if current.state == SaveState::Saved {
                debug!(published = current.published, "Snapshot written");
            }
        }
    });
}
