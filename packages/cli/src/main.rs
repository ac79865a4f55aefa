mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    backups, choice, component, header, image_url, init, publish, save, session, show, step,
    BackupsArgs, ChoiceCommand, ComponentCommand, HeaderArgs, ImageUrlArgs, InitArgs, SessionArgs,
    ShowArgs, StepCommand,
};
use std::path::PathBuf;
use tracing::Level;

/// Quiz funnel editor - edit a stored quiz funnel from the terminal
#[derive(Parser, Debug)]
#[command(name = "quizfunnel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Project directory (defaults to the current directory)
    #[arg(short = 'C', long, global = true)]
    dir: Option<PathBuf>,

    /// Log editor internals to stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new quiz funnel project
    Init(InitArgs),

    /// Print the funnel's steps and components
    Show(ShowArgs),

    /// Add, rename, delete, activate or route steps
    #[command(subcommand)]
    Step(StepCommand),

    /// Add, edit, move, duplicate or delete components
    #[command(subcommand)]
    Component(ComponentCommand),

    /// Edit the choices of an options component
    #[command(subcommand)]
    Choice(ChoiceCommand),

    /// Update the global header
    Header(HeaderArgs),

    /// Write a fresh snapshot now
    Save,

    /// Save and confirm publication
    Publish,

    /// List backups or restore one
    Backups(BackupsArgs),

    /// Apply JSON mutations from stdin with debounced auto-save
    Session(SessionArgs),

    /// Print an optimized Cloudinary image URL
    ImageUrl(ImageUrlArgs),
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = match cli.dir.map(Ok).unwrap_or_else(std::env::current_dir) {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Show(args) => show(args, &cwd),
        Command::Step(command) => step(command, &cwd),
        Command::Component(command) => component(command, &cwd),
        Command::Choice(command) => choice(command, &cwd),
        Command::Header(args) => header(args, &cwd),
        Command::Save => save(&cwd),
        Command::Publish => publish(&cwd),
        Command::Backups(args) => backups(args, &cwd),
        Command::Session(args) => session(args, &cwd),
        Command::ImageUrl(args) => image_url(args),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
