//! # Funnel Document
//!
//! The editable definition of one quiz funnel: an ordered list of steps
//! (quiz screens, result and offer pages), the global header configuration
//! and the id of the step currently open in the editor.
//!
//! ## Invariants
//!
//! - A document always contains at least one step.
//! - Within a step, component `order` fields are the dense sequence `0..n`
//!   and match the position of the component in the step.
//!
//! Documents are plain values. Mutations are applied to a copy and the copy
//! replaces the previous snapshot (see [`crate::Mutation::apply_to`]).

use crate::component::{Component, ComponentProps, ComponentType, TextProps};
use serde::{Deserialize, Serialize};

/// Tag for steps that end the quiz flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FinalPage {
    Result,
    Offer,
}

/// One screen of the funnel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: String,
    pub name: String,
    pub components: Vec<Component>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_next_step: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_page: Option<FinalPage>,
}

impl Step {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            components: Vec::new(),
            default_next_step: None,
            final_page: None,
        }
    }

    /// Append a component at the end (order is assigned here)
    pub fn push(&mut self, mut component: Component) {
        component.order = self.components.len();
        self.components.push(component);
    }

    /// Rewrite `order` fields to match positions
    pub fn renumber(&mut self) {
        for (index, component) in self.components.iter_mut().enumerate() {
            component.order = index;
        }
    }

    /// Whether `order` fields form the dense permutation `0..n`
    pub fn orders_are_dense(&self) -> bool {
        let mut seen = vec![false; self.components.len()];
        for component in &self.components {
            match seen.get_mut(component.order) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        true
    }

    pub fn component_position(&self, component_id: &str) -> Option<usize> {
        self.components.iter().position(|c| c.id == component_id)
    }
}

/// Global header shown above every step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderConfig {
    pub show_logo: bool,
    pub show_progress_bar: bool,
    pub allow_return: bool,
    pub logo_url: String,
    pub progress_color: String,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            show_logo: true,
            show_progress_bar: true,
            allow_return: true,
            logo_url: "https://res.cloudinary.com/dqljyf76t/image/upload/v1744911572/LOGO_DA_MARCA_GISELE_r14oz2.webp".to_string(),
            progress_color: "#B89B7A".to_string(),
        }
    }
}

/// Field-by-field header update; `None` leaves the field as is
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeaderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_logo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_progress_bar: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_return: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_color: Option<String>,
}

impl HeaderPatch {
    pub fn is_empty(&self) -> bool {
        self == &HeaderPatch::default()
    }

    pub fn apply(&self, header: &mut HeaderConfig) {
        if let Some(show_logo) = self.show_logo {
            header.show_logo = show_logo;
        }
        if let Some(show_progress_bar) = self.show_progress_bar {
            header.show_progress_bar = show_progress_bar;
        }
        if let Some(allow_return) = self.allow_return {
            header.allow_return = allow_return;
        }
        if let Some(logo_url) = &self.logo_url {
            header.logo_url = logo_url.clone();
        }
        if let Some(progress_color) = &self.progress_color {
            header.progress_color = progress_color.clone();
        }
    }
}

/// Root aggregate of the editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub steps: Vec<Step>,
    pub header: HeaderConfig,
    pub active_step_id: String,
}

impl Document {
    /// Document with a single step
    pub fn with_step(step: Step) -> Self {
        Self {
            active_step_id: step.id.clone(),
            steps: vec![step],
            header: HeaderConfig::default(),
        }
    }

    pub fn step(&self, step_id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    pub fn step_mut(&mut self, step_id: &str) -> Option<&mut Step> {
        self.steps.iter_mut().find(|s| s.id == step_id)
    }

    pub fn step_position(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == step_id)
    }

    pub fn active_step(&self) -> Option<&Step> {
        self.step(&self.active_step_id)
    }

    /// Locate a component as `(step index, component index)`
    pub fn locate_component(&self, component_id: &str) -> Option<(usize, usize)> {
        self.steps.iter().enumerate().find_map(|(step_index, step)| {
            step.component_position(component_id)
                .map(|component_index| (step_index, component_index))
        })
    }

    pub fn component(&self, component_id: &str) -> Option<&Component> {
        self.locate_component(component_id)
            .map(|(s, c)| &self.steps[s].components[c])
    }

    /// Whether any step or component already uses `id`
    pub fn contains_id(&self, id: &str) -> bool {
        self.steps
            .iter()
            .any(|s| s.id == id || s.components.iter().any(|c| c.id == id))
    }

    pub fn component_count(&self) -> usize {
        self.steps.iter().map(|s| s.components.len()).sum()
    }

    /// Check both document invariants
    pub fn is_consistent(&self) -> bool {
        !self.steps.is_empty() && self.steps.iter().all(Step::orders_are_dense)
    }

    /// Repair a document read from storage: dense orders in every step and
    /// an active step that resolves. Returns whether anything was rewritten.
    pub fn normalize(&mut self) -> bool {
        let mut repaired = false;

        for step in &mut self.steps {
            if step.components.iter().enumerate().any(|(i, c)| c.order != i) {
                step.renumber();
                repaired = true;
            }
        }

        if self.step(&self.active_step_id).is_none() {
            if let Some(first) = self.steps.first() {
                self.active_step_id = first.id.clone();
                repaired = true;
            }
        }

        repaired
    }
}

/// The built-in example funnel used when nothing is stored yet
pub fn default_document() -> Document {
    let mut intro = Step::new("quiz-intro", "Introdução");

    intro.push(Component::new(
        "intro-logo",
        ComponentProps::Image(crate::component::ImageProps {
            src: HeaderConfig::default().logo_url,
            alt: "Logo".to_string(),
            width: Some(120),
            optimization: Some(crate::image::ImageSettings::auto()),
            ..Default::default()
        }),
    ));
    intro.push(Component::new(
        "intro-title",
        ComponentProps::Heading(TextProps::heading(
            "Chega de um guarda-roupa lotado e da sensação de que nada combina com você.",
        )),
    ));
    intro.push(Component::new(
        "intro-subtitle",
        ComponentProps::Text(TextProps {
            align: crate::component::TextAlign::Center,
            ..TextProps::paragraph(
                "Em poucos minutos, descubra seu Estilo Predominante e aprenda a montar looks que realmente refletem sua essência.",
            )
        }),
    ));
    intro.push(Component::new(
        "intro-name",
        ComponentProps::defaults(ComponentType::Input),
    ));
    intro.push(Component::new(
        "intro-start",
        ComponentProps::Button(crate::component::ButtonProps {
            text: "Quero Descobrir meu Estilo Agora!".to_string(),
            ..Default::default()
        }),
    ));

    Document::with_step(intro)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_document_shape() {
        let doc = default_document();

        assert_eq!(doc.steps.len(), 1);
        assert_eq!(doc.active_step_id, "quiz-intro");
        assert_eq!(doc.steps[0].components.len(), 5);
        assert!(doc.is_consistent());
    }

    #[test]
    fn test_normalize_repairs_stale_orders_and_active_step() {
        let mut doc = default_document();
        doc.active_step_id = "gone".to_string();
        for (i, component) in doc.steps[0].components.iter_mut().enumerate() {
            component.order = i * 3;
        }
        assert!(!doc.is_consistent());

        assert!(doc.normalize());
        assert!(doc.is_consistent());
        assert_eq!(doc.active_step_id, "quiz-intro");
        assert_eq!(doc, default_document());

        assert!(!doc.normalize());
    }

    #[test]
    fn test_locate_component() {
        let doc = default_document();

        assert_eq!(doc.locate_component("intro-name"), Some((0, 3)));
        assert!(doc.locate_component("missing").is_none());
        assert!(doc.contains_id("quiz-intro"));
        assert!(doc.contains_id("intro-start"));
    }

    #[test]
    fn test_orders_are_dense_detects_gaps() {
        let mut step = Step::new("s", "S");
        step.push(Component::new("a", ComponentProps::defaults(ComponentType::Spacer)));
        step.push(Component::new("b", ComponentProps::defaults(ComponentType::Spacer)));
        assert!(step.orders_are_dense());

        step.components[1].order = 5;
        assert!(!step.orders_are_dense());

        step.renumber();
        assert!(step.orders_are_dense());
    }

    #[test]
    fn test_header_patch_overwrites_present_fields() {
        let mut header = HeaderConfig::default();
        let patch = HeaderPatch {
            show_logo: Some(false),
            progress_color: Some("#000000".to_string()),
            ..Default::default()
        };

        patch.apply(&mut header);

        assert!(!header.show_logo);
        assert!(header.show_progress_bar);
        assert_eq!(header.progress_color, "#000000");
        assert!(!patch.is_empty());
        assert!(HeaderPatch::default().is_empty());
    }
}
