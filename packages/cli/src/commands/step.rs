use crate::commands::project::{apply_and_report, Project};
use anyhow::Result;
use clap::{Subcommand, ValueEnum};
use quizfunnel_editor::{FinalPage, Mutation};

#[derive(Debug, Subcommand)]
pub enum StepCommand {
    /// Append a new step and make it active
    Add,

    Rename {
        step_id: String,
        name: String,
    },

    /// Delete a step (the last remaining step cannot be deleted)
    Delete { step_id: String },

    /// Make a step the active one (new components go there)
    Activate { step_id: String },

    /// Set where a step leads by default and whether it ends the quiz
    Route {
        step_id: String,

        /// Default next step
        #[arg(long)]
        next: Option<String>,

        /// Mark as a final page
        #[arg(long = "final", value_enum)]
        final_page: Option<FinalPageArg>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FinalPageArg {
    Result,
    Offer,
}

impl From<FinalPageArg> for FinalPage {
    fn from(arg: FinalPageArg) -> Self {
        match arg {
            FinalPageArg::Result => FinalPage::Result,
            FinalPageArg::Offer => FinalPage::Offer,
        }
    }
}

impl StepCommand {
    pub fn into_mutation(self) -> Mutation {
        match self {
            StepCommand::Add => Mutation::AddStep,
            StepCommand::Rename { step_id, name } => Mutation::RenameStep { step_id, name },
            StepCommand::Delete { step_id } => Mutation::DeleteStep { step_id },
            StepCommand::Activate { step_id } => Mutation::SetActiveStep { step_id },
            StepCommand::Route {
                step_id,
                next,
                final_page,
            } => Mutation::SetStepRouting {
                step_id,
                default_next_step: next,
                final_page: final_page.map(FinalPage::from),
            },
        }
    }
}

pub fn step(command: StepCommand, cwd: &str) -> Result<()> {
    let project = Project::open(cwd)?;
    let mut session = project.session();
    apply_and_report(&mut session, command.into_mutation())?;
    Ok(())
}
