//! # Document Mutations
//!
//! Semantic editing operations on a funnel document.
//!
//! ## Semantics
//!
//! - **Total**: an id that resolves to nothing is a no-op, never an error.
//!   The only rejection is deleting the last remaining step.
//! - **Dense ordering**: every operation that inserts, removes or reorders
//!   components renumbers the step so `order` stays `0..n`.
//! - **Shallow merge**: `UpdateComponent` overwrites the keys present in the
//!   patch and keeps the rest of the property record.
//! - **Copy-on-write**: [`Mutation::apply_to`] leaves the input untouched and
//!   returns the next snapshot.

use crate::component::{Component, ComponentProps, ComponentType, PropsPatch, TextProps};
use crate::document::{Document, FinalPage, HeaderPatch, Step};
use crate::ids::IdGenerator;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MoveDirection {
    Up,
    Down,
}

/// Semantic mutations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Mutation {
    /// Append a new step with one default heading and make it active
    AddStep,

    RenameStep {
        step_id: String,
        name: String,
    },

    /// Remove a step (refused when it is the only one)
    DeleteStep {
        step_id: String,
    },

    /// Overwrite a step's default next step and final-page tag
    SetStepRouting {
        step_id: String,
        #[serde(default)]
        default_next_step: Option<String>,
        #[serde(default)]
        final_page: Option<FinalPage>,
    },

    SetActiveStep {
        step_id: String,
    },

    /// Append a component with type defaults to the active step
    AddComponent {
        component_type: ComponentType,
    },

    /// Shallow-merge a partial property object into a component
    UpdateComponent {
        component_id: String,
        props: PropsPatch,
    },

    DeleteComponent {
        component_id: String,
    },

    /// Swap a component with its neighbour
    MoveComponent {
        component_id: String,
        direction: MoveDirection,
    },

    /// Insert a copy with a fresh id right after the original
    DuplicateComponent {
        component_id: String,
    },

    UpdateHeader {
        header: HeaderPatch,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Cannot delete the only remaining step: {0}")]
    LastStep(String),
}

/// What a mutation did to the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// Nothing resolved or nothing differed
    Unchanged,

    Updated,

    StepCreated { step_id: String },

    StepRemoved { step_id: String },

    ComponentCreated { component_id: String },

    ComponentDuplicated { component_id: String },

    ComponentRemoved { component_id: String },
}

impl MutationOutcome {
    pub fn is_change(&self) -> bool {
        !matches!(self, MutationOutcome::Unchanged)
    }
}

impl Mutation {
    /// Debug name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::AddStep => "add_step",
            Mutation::RenameStep { .. } => "rename_step",
            Mutation::DeleteStep { .. } => "delete_step",
            Mutation::SetStepRouting { .. } => "set_step_routing",
            Mutation::SetActiveStep { .. } => "set_active_step",
            Mutation::AddComponent { .. } => "add_component",
            Mutation::UpdateComponent { .. } => "update_component",
            Mutation::DeleteComponent { .. } => "delete_component",
            Mutation::MoveComponent { .. } => "move_component",
            Mutation::DuplicateComponent { .. } => "duplicate_component",
            Mutation::UpdateHeader { .. } => "update_header",
        }
    }

    /// Compute the next snapshot without touching `doc`
    pub fn apply_to(
        &self,
        doc: &Document,
        ids: &mut IdGenerator,
    ) -> Result<(Document, MutationOutcome), MutationError> {
        let mut next = doc.clone();
        let outcome = self.apply(&mut next, ids)?;
        Ok((next, outcome))
    }

    /// Apply mutation in place.
    ///
    /// On `Err` the document is left exactly as it was.
    pub fn apply(
        &self,
        doc: &mut Document,
        ids: &mut IdGenerator,
    ) -> Result<MutationOutcome, MutationError> {
        let outcome = match self {
            Mutation::AddStep => Self::apply_add_step(doc, ids),

            Mutation::RenameStep { step_id, name } => Self::apply_rename_step(doc, step_id, name),

            Mutation::DeleteStep { step_id } => Self::apply_delete_step(doc, step_id)?,

            Mutation::SetStepRouting {
                step_id,
                default_next_step,
                final_page,
            } => Self::apply_set_routing(doc, step_id, default_next_step, *final_page),

            Mutation::SetActiveStep { step_id } => {
                if doc.active_step_id != *step_id && doc.step(step_id).is_some() {
                    doc.active_step_id = step_id.clone();
                    MutationOutcome::Updated
                } else {
                    MutationOutcome::Unchanged
                }
            }

            Mutation::AddComponent { component_type } => {
                Self::apply_add_component(doc, *component_type, ids)
            }

            Mutation::UpdateComponent {
                component_id,
                props,
            } => Self::apply_update_component(doc, component_id, props),

            Mutation::DeleteComponent { component_id } => {
                Self::apply_delete_component(doc, component_id)
            }

            Mutation::MoveComponent {
                component_id,
                direction,
            } => Self::apply_move_component(doc, component_id, *direction),

            Mutation::DuplicateComponent { component_id } => {
                Self::apply_duplicate_component(doc, component_id, ids)
            }

            Mutation::UpdateHeader { header } => {
                let before = doc.header.clone();
                header.apply(&mut doc.header);
                if doc.header == before {
                    MutationOutcome::Unchanged
                } else {
                    MutationOutcome::Updated
                }
            }
        };

        if !outcome.is_change() {
            debug!(mutation = self.name(), "Mutation resolved to a no-op");
        }

        Ok(outcome)
    }

    fn apply_add_step(doc: &mut Document, ids: &mut IdGenerator) -> MutationOutcome {
        let step_id = ids.fresh_id("step", |id| doc.contains_id(id));
        let heading_id = ids.fresh_id("heading", |id| doc.contains_id(id) || id == step_id);
        let name = format!("Etapa {}", doc.steps.len() + 1);

        let mut step = Step::new(step_id.clone(), name.clone());
        step.push(Component::new(
            heading_id,
            ComponentProps::Heading(TextProps::heading(name)),
        ));

        doc.steps.push(step);
        doc.active_step_id = step_id.clone();

        MutationOutcome::StepCreated { step_id }
    }

    fn apply_rename_step(doc: &mut Document, step_id: &str, name: &str) -> MutationOutcome {
        match doc.step_mut(step_id) {
            Some(step) if step.name != name => {
                step.name = name.to_string();
                MutationOutcome::Updated
            }
            _ => MutationOutcome::Unchanged,
        }
    }

    fn apply_delete_step(
        doc: &mut Document,
        step_id: &str,
    ) -> Result<MutationOutcome, MutationError> {
        let Some(index) = doc.step_position(step_id) else {
            return Ok(MutationOutcome::Unchanged);
        };

        if doc.steps.len() <= 1 {
            return Err(MutationError::LastStep(step_id.to_string()));
        }

        doc.steps.remove(index);

        if doc.active_step_id == step_id {
            // Preceding step, or the new first step when the first was removed
            let fallback = index.saturating_sub(1);
            doc.active_step_id = doc.steps[fallback].id.clone();
        }

        Ok(MutationOutcome::StepRemoved {
            step_id: step_id.to_string(),
        })
    }

    fn apply_set_routing(
        doc: &mut Document,
        step_id: &str,
        default_next_step: &Option<String>,
        final_page: Option<FinalPage>,
    ) -> MutationOutcome {
        match doc.step_mut(step_id) {
            Some(step)
                if step.default_next_step != *default_next_step
                    || step.final_page != final_page =>
            {
                step.default_next_step = default_next_step.clone();
                step.final_page = final_page;
                MutationOutcome::Updated
            }
            _ => MutationOutcome::Unchanged,
        }
    }

    fn apply_add_component(
        doc: &mut Document,
        component_type: ComponentType,
        ids: &mut IdGenerator,
    ) -> MutationOutcome {
        let Some(step_index) = doc.step_position(&doc.active_step_id) else {
            return MutationOutcome::Unchanged;
        };

        let component_id = ids.fresh_id(component_type.as_str(), |id| doc.contains_id(id));
        let component = Component::new(
            component_id.clone(),
            ComponentProps::defaults(component_type),
        );

        let step = &mut doc.steps[step_index];
        step.push(component);
        step.renumber();

        MutationOutcome::ComponentCreated { component_id }
    }

    fn apply_update_component(
        doc: &mut Document,
        component_id: &str,
        patch: &PropsPatch,
    ) -> MutationOutcome {
        let Some((s, c)) = doc.locate_component(component_id) else {
            return MutationOutcome::Unchanged;
        };

        let component = &mut doc.steps[s].components[c];
        match component.props.merged(patch) {
            Ok(merged) if merged != component.props => {
                component.props = merged;
                MutationOutcome::Updated
            }
            Ok(_) => MutationOutcome::Unchanged,
            Err(e) => {
                warn!(
                    component_id = %component_id,
                    component_type = %component.component_type(),
                    error = %e,
                    "Property update does not fit the component, ignoring"
                );
                MutationOutcome::Unchanged
            }
        }
    }

    fn apply_delete_component(doc: &mut Document, component_id: &str) -> MutationOutcome {
        let Some((s, c)) = doc.locate_component(component_id) else {
            return MutationOutcome::Unchanged;
        };

        let step = &mut doc.steps[s];
        step.components.remove(c);
        step.renumber();

        MutationOutcome::ComponentRemoved {
            component_id: component_id.to_string(),
        }
    }

    fn apply_move_component(
        doc: &mut Document,
        component_id: &str,
        direction: MoveDirection,
    ) -> MutationOutcome {
        let Some((s, c)) = doc.locate_component(component_id) else {
            return MutationOutcome::Unchanged;
        };

        let step = &mut doc.steps[s];
        let neighbour = match direction {
            MoveDirection::Up => c.checked_sub(1),
            MoveDirection::Down => Some(c + 1).filter(|&n| n < step.components.len()),
        };

        match neighbour {
            Some(n) => {
                step.components.swap(c, n);
                step.renumber();
                MutationOutcome::Updated
            }
            None => MutationOutcome::Unchanged,
        }
    }

    fn apply_duplicate_component(
        doc: &mut Document,
        component_id: &str,
        ids: &mut IdGenerator,
    ) -> MutationOutcome {
        let Some((s, c)) = doc.locate_component(component_id) else {
            return MutationOutcome::Unchanged;
        };

        let original = &doc.steps[s].components[c];
        let kind = original.component_type();
        let mut clone = original.clone();
        clone.id = ids.fresh_id(kind.as_str(), |id| doc.contains_id(id));
        let clone_id = clone.id.clone();

        let step = &mut doc.steps[s];
        step.components.insert(c + 1, clone);
        step.renumber();

        MutationOutcome::ComponentDuplicated {
            component_id: clone_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::default_document;
    use serde_json::json;

    fn ids() -> IdGenerator {
        IdGenerator::from_seed("test")
    }

    #[test]
    fn test_mutation_serialization() {
        let mutation = Mutation::MoveComponent {
            component_id: "intro-title".to_string(),
            direction: MoveDirection::Down,
        };

        let json = serde_json::to_value(&mutation).unwrap();
        assert_eq!(
            json,
            json!({"type": "moveComponent", "componentId": "intro-title", "direction": "down"})
        );

        let deserialized: Mutation = serde_json::from_value(json).unwrap();
        assert_eq!(mutation, deserialized);

        let add: Mutation = serde_json::from_str(r#"{"type":"addStep"}"#).unwrap();
        assert_eq!(add, Mutation::AddStep);
    }

    #[test]
    fn test_apply_to_leaves_input_untouched() {
        let doc = default_document();
        let (next, outcome) = Mutation::AddStep.apply_to(&doc, &mut ids()).unwrap();

        assert_eq!(doc.steps.len(), 1);
        assert_eq!(next.steps.len(), 2);
        assert!(outcome.is_change());
    }

    #[test]
    fn test_delete_last_step_is_rejected() {
        let mut doc = default_document();
        let before = doc.clone();

        let result = Mutation::DeleteStep {
            step_id: "quiz-intro".to_string(),
        }
        .apply(&mut doc, &mut ids());

        assert_eq!(result, Err(MutationError::LastStep("quiz-intro".to_string())));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_unknown_ids_are_no_ops() {
        let mut doc = default_document();
        let before = doc.clone();
        let mut ids = ids();

        let mutations = vec![
            Mutation::RenameStep {
                step_id: "nope".into(),
                name: "X".into(),
            },
            Mutation::DeleteStep {
                step_id: "nope".into(),
            },
            Mutation::SetActiveStep {
                step_id: "nope".into(),
            },
            Mutation::DeleteComponent {
                component_id: "nope".into(),
            },
            Mutation::DuplicateComponent {
                component_id: "nope".into(),
            },
            Mutation::MoveComponent {
                component_id: "nope".into(),
                direction: MoveDirection::Up,
            },
            Mutation::UpdateComponent {
                component_id: "nope".into(),
                props: PropsPatch::new(),
            },
        ];

        for mutation in mutations {
            let outcome = mutation.apply(&mut doc, &mut ids).unwrap();
            assert_eq!(outcome, MutationOutcome::Unchanged, "{}", mutation.name());
        }

        assert_eq!(doc, before);
    }

    #[test]
    fn test_ill_typed_update_is_a_no_op() {
        let mut doc = default_document();
        let before = doc.clone();

        let mut props = PropsPatch::new();
        props.insert("required".to_string(), json!("sometimes"));

        let outcome = Mutation::UpdateComponent {
            component_id: "intro-name".to_string(),
            props,
        }
        .apply(&mut doc, &mut ids())
        .unwrap();

        assert_eq!(outcome, MutationOutcome::Unchanged);
        assert_eq!(doc, before);
    }

    #[test]
    fn test_delete_active_step_falls_back_to_previous() {
        let mut doc = default_document();
        let mut ids = ids();

        Mutation::AddStep.apply(&mut doc, &mut ids).unwrap();
        Mutation::AddStep.apply(&mut doc, &mut ids).unwrap();
        let second = doc.steps[1].id.clone();
        let third = doc.steps[2].id.clone();
        assert_eq!(doc.active_step_id, third);

        Mutation::DeleteStep { step_id: third }.apply(&mut doc, &mut ids).unwrap();
        assert_eq!(doc.active_step_id, second);
    }

    #[test]
    fn test_delete_first_active_step_falls_back_to_new_first() {
        let mut doc = default_document();
        let mut ids = ids();

        Mutation::AddStep.apply(&mut doc, &mut ids).unwrap();
        let second = doc.steps[1].id.clone();
        Mutation::SetActiveStep { step_id: "quiz-intro".into() }
            .apply(&mut doc, &mut ids)
            .unwrap();

        Mutation::DeleteStep { step_id: "quiz-intro".into() }
            .apply(&mut doc, &mut ids)
            .unwrap();

        assert_eq!(doc.steps.len(), 1);
        assert_eq!(doc.active_step_id, second);
    }

    #[test]
    fn test_delete_inactive_step_keeps_active() {
        let mut doc = default_document();
        let mut ids = ids();

        Mutation::AddStep.apply(&mut doc, &mut ids).unwrap();
        let active = doc.active_step_id.clone();

        Mutation::DeleteStep { step_id: "quiz-intro".into() }
            .apply(&mut doc, &mut ids)
            .unwrap();

        assert_eq!(doc.active_step_id, active);
    }

    #[test]
    fn test_step_routing() {
        let mut doc = default_document();
        let mut ids = ids();
        Mutation::AddStep.apply(&mut doc, &mut ids).unwrap();
        let result_step = doc.steps[1].id.clone();

        let routing = Mutation::SetStepRouting {
            step_id: "quiz-intro".into(),
            default_next_step: Some(result_step.clone()),
            final_page: None,
        };
        assert_eq!(routing.apply(&mut doc, &mut ids).unwrap(), MutationOutcome::Updated);
        assert_eq!(routing.apply(&mut doc, &mut ids).unwrap(), MutationOutcome::Unchanged);

        Mutation::SetStepRouting {
            step_id: result_step.clone(),
            default_next_step: None,
            final_page: Some(FinalPage::Result),
        }
        .apply(&mut doc, &mut ids)
        .unwrap();

        assert_eq!(doc.steps[0].default_next_step.as_deref(), Some(result_step.as_str()));
        assert_eq!(doc.steps[1].final_page, Some(FinalPage::Result));
    }

    #[test]
    fn test_move_component_at_boundary_is_no_op() {
        let mut doc = default_document();
        let mut ids = ids();

        let up = Mutation::MoveComponent {
            component_id: "intro-logo".into(),
            direction: MoveDirection::Up,
        };
        assert_eq!(up.apply(&mut doc, &mut ids).unwrap(), MutationOutcome::Unchanged);

        let down = Mutation::MoveComponent {
            component_id: "intro-start".into(),
            direction: MoveDirection::Down,
        };
        assert_eq!(down.apply(&mut doc, &mut ids).unwrap(), MutationOutcome::Unchanged);
    }

    #[test]
    fn test_update_header() {
        let mut doc = default_document();

        let outcome = Mutation::UpdateHeader {
            header: HeaderPatch {
                show_progress_bar: Some(false),
                ..Default::default()
            },
        }
        .apply(&mut doc, &mut ids())
        .unwrap();

        assert_eq!(outcome, MutationOutcome::Updated);
        assert!(!doc.header.show_progress_bar);
        assert!(doc.header.show_logo);
    }
}
