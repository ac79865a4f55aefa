use crate::commands::project::{apply_and_report, Project};
use anyhow::{anyhow, Result};
use clap::Subcommand;
use quizfunnel_editor::form_for;

/// Choice editing on options components
#[derive(Debug, Subcommand)]
pub enum ChoiceCommand {
    Add {
        component_id: String,
        text: String,
    },

    /// Change a choice's text (its value is derived again)
    Text {
        component_id: String,
        index: usize,
        text: String,
    },

    Score {
        component_id: String,
        index: usize,
        #[arg(allow_hyphen_values = true)]
        score: i32,
    },

    /// Route a choice to a step; omit the step to clear it
    Next {
        component_id: String,
        index: usize,
        step_id: Option<String>,
    },

    Image {
        component_id: String,
        index: usize,
        url: Option<String>,
    },

    Remove {
        component_id: String,
        index: usize,
    },
}

impl ChoiceCommand {
    fn component_id(&self) -> &str {
        match self {
            ChoiceCommand::Add { component_id, .. }
            | ChoiceCommand::Text { component_id, .. }
            | ChoiceCommand::Score { component_id, .. }
            | ChoiceCommand::Next { component_id, .. }
            | ChoiceCommand::Image { component_id, .. }
            | ChoiceCommand::Remove { component_id, .. } => component_id,
        }
    }
}

pub fn choice(command: ChoiceCommand, cwd: &str) -> Result<()> {
    let project = Project::open(cwd)?;
    let mut session = project.session();

    let component_id = command.component_id();
    let component = session
        .document()
        .component(component_id)
        .ok_or_else(|| anyhow!("No component with id '{}'", component_id))?;
    let form = form_for(component);
    let options = form.options()?;

    let change = match &command {
        ChoiceCommand::Add { text, .. } => options.add_choice(text),
        ChoiceCommand::Text { index, text, .. } => options.set_choice_text(*index, text)?,
        ChoiceCommand::Score { index, score, .. } => options.set_choice_score(*index, *score)?,
        ChoiceCommand::Next { index, step_id, .. } => {
            options.set_choice_next_step(*index, step_id.as_deref())?
        }
        ChoiceCommand::Image { index, url, .. } => {
            options.set_choice_image(*index, url.as_deref())?
        }
        ChoiceCommand::Remove { index, .. } => options.remove_choice(*index)?,
    };

    apply_and_report(&mut session, change.into_mutation())?;
    Ok(())
}
