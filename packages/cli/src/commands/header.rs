use crate::commands::project::{apply_and_report, Project};
use anyhow::{bail, Result};
use clap::Args;
use quizfunnel_editor::{HeaderPatch, Mutation};

/// Global header shown above every step
#[derive(Debug, Args)]
pub struct HeaderArgs {
    #[arg(long)]
    pub show_logo: Option<bool>,

    #[arg(long)]
    pub show_progress_bar: Option<bool>,

    /// Let respondents go back to the previous step
    #[arg(long)]
    pub allow_return: Option<bool>,

    #[arg(long)]
    pub logo_url: Option<String>,

    #[arg(long)]
    pub progress_color: Option<String>,
}

impl From<HeaderArgs> for HeaderPatch {
    fn from(args: HeaderArgs) -> Self {
        HeaderPatch {
            show_logo: args.show_logo,
            show_progress_bar: args.show_progress_bar,
            allow_return: args.allow_return,
            logo_url: args.logo_url,
            progress_color: args.progress_color,
        }
    }
}

pub fn header(args: HeaderArgs, cwd: &str) -> Result<()> {
    let patch = HeaderPatch::from(args);
    if patch.is_empty() {
        bail!("Nothing to update, pass at least one header option");
    }

    let project = Project::open(cwd)?;
    let mut session = project.session();
    apply_and_report(&mut session, Mutation::UpdateHeader { header: patch })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizfunnel_editor::DocumentStore;

    fn empty() -> HeaderArgs {
        HeaderArgs {
            show_logo: None,
            show_progress_bar: None,
            allow_return: None,
            logo_url: None,
            progress_color: None,
        }
    }

    #[test]
    fn test_header_update_persists() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().to_str().unwrap();

        header(
            HeaderArgs {
                show_progress_bar: Some(false),
                progress_color: Some("#432818".to_string()),
                ..empty()
            },
            cwd,
        )
        .unwrap();

        let doc = Project::open(cwd).unwrap().store.load().unwrap().unwrap();
        assert!(!doc.header.show_progress_bar);
        assert!(doc.header.show_logo);
        assert_eq!(doc.header.progress_color, "#432818");
    }

    #[test]
    fn test_empty_header_update_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        assert!(header(empty(), dir.path().to_str().unwrap()).is_err());
    }
}
