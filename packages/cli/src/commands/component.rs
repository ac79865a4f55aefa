use crate::commands::project::{apply_and_report, Project};
use anyhow::{anyhow, Context, Result};
use clap::{Subcommand, ValueEnum};
use quizfunnel_editor::{form_for, ComponentType, MoveDirection, Mutation, PropsPatch};

#[derive(Debug, Subcommand)]
pub enum ComponentCommand {
    /// Append a component with default properties to the active step
    Add {
        /// heading, text, image, input, button, options, alert, video,
        /// carousel, spacer or custom
        component_type: ComponentType,
    },

    /// Set one field through the component's property form
    Set {
        component_id: String,
        field: String,
        value: String,
    },

    /// Set a style override; omit the value to remove it
    Style {
        component_id: String,
        key: String,
        value: Option<String>,
    },

    /// Merge a raw JSON object into the component's properties
    Patch {
        component_id: String,
        json: String,
    },

    Delete {
        component_id: String,
    },

    Move {
        component_id: String,
        #[arg(value_enum)]
        direction: Direction,
    },

    /// Insert a copy right after the original
    Duplicate {
        component_id: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Direction {
    Up,
    Down,
}

impl From<Direction> for MoveDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => MoveDirection::Up,
            Direction::Down => MoveDirection::Down,
        }
    }
}

pub fn component(command: ComponentCommand, cwd: &str) -> Result<()> {
    let project = Project::open(cwd)?;
    let mut session = project.session();

    let mutation = match command {
        ComponentCommand::Add { component_type } => Mutation::AddComponent { component_type },

        ComponentCommand::Set {
            component_id,
            field,
            value,
        } => {
            let component = session
                .document()
                .component(&component_id)
                .ok_or_else(|| anyhow!("No component with id '{}'", component_id))?;
            form_for(component).edit(&field, &value)?.into_mutation()
        }

        ComponentCommand::Style {
            component_id,
            key,
            value,
        } => {
            let component = session
                .document()
                .component(&component_id)
                .ok_or_else(|| anyhow!("No component with id '{}'", component_id))?;
            form_for(component)
                .set_style(&key, value.as_deref())
                .into_mutation()
        }

        ComponentCommand::Patch { component_id, json } => {
            let props: PropsPatch =
                serde_json::from_str(&json).context("Patch must be a JSON object")?;
            Mutation::UpdateComponent {
                component_id,
                props,
            }
        }

        ComponentCommand::Delete { component_id } => Mutation::DeleteComponent { component_id },

        ComponentCommand::Move {
            component_id,
            direction,
        } => Mutation::MoveComponent {
            component_id,
            direction: direction.into(),
        },

        ComponentCommand::Duplicate { component_id } => {
            Mutation::DuplicateComponent { component_id }
        }
    };

    apply_and_report(&mut session, mutation)?;
    Ok(())
}
