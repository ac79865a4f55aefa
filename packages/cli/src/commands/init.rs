use crate::commands::project::Project;
use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use quizfunnel_editor::{default_document, DocumentStore, EditorConfig};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Storage directory for snapshots
    #[arg(short, long, default_value = ".quizfunnel")]
    pub storage_dir: String,

    /// Keep undo history of this depth in streaming sessions
    #[arg(long)]
    pub history: Option<usize>,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!(
        "{}",
        "📝 Initializing quiz funnel project...".bright_blue().bold()
    );

    let config = Config {
        storage_dir: args.storage_dir.clone(),
        editor: EditorConfig {
            history_limit: args.history,
            ..EditorConfig::default()
        },
    };

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    let project = Project::open(cwd)?;
    if project.store.load()?.is_none() {
        project.store.save(&default_document())?;
        println!(
            "  {} Stored default funnel in {}/",
            "✓".green(),
            args.storage_dir
        );
    }

    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: quizfunnel show");
    println!("  2. Run: quizfunnel step add");
    println!("  3. Run: quizfunnel component add options");

    Ok(())
}
