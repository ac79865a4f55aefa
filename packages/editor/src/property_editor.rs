//! # Property Editor Dispatch
//!
//! Picks the editing form for a component and turns form edits into partial
//! property objects. Every form honours the same contract: an edit yields a
//! [`PropsChange`], and [`PropsChange::into_mutation`] feeds it to
//! `UpdateComponent`.
//!
//! | component          | form       |
//! |--------------------|------------|
//! | heading, text      | `Text`     |
//! | image              | `Image`    |
//! | input              | `Input`    |
//! | button             | `Button`   |
//! | options            | `Options`  |
//! | alert              | `Alert`    |
//! | custom             | `Custom`   |
//! | spacer             | `Spacer`   |
//! | video, carousel    | `RawStyle` |
//!
//! Forms are where values get their types: the mutation engine merges
//! whatever it is given, so a form only emits values that fit its fields.

use crate::component::{Choice, Component, ComponentProps, OptionsProps, PropsPatch};
use crate::mutations::Mutation;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Text,
    Image,
    Input,
    Button,
    Options,
    Alert,
    Custom,
    Spacer,
    RawStyle,
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormKind::Text => "text",
            FormKind::Image => "image",
            FormKind::Input => "input",
            FormKind::Button => "button",
            FormKind::Options => "options",
            FormKind::Alert => "alert",
            FormKind::Custom => "custom",
            FormKind::Spacer => "spacer",
            FormKind::RawStyle => "raw style",
        };
        f.write_str(name)
    }
}

/// Input widget behind a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    MultilineText,
    Number { min: i64, max: i64 },
    Toggle,
    Color,
    Url,
    Select(&'static [&'static str]),
}

/// One editable field of a form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Property key in the component record
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    /// Nested object the key lives in (replaced as a whole on edit)
    pub group: Option<&'static str>,
}

const fn field(name: &'static str, label: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind,
        group: None,
    }
}

const fn grouped(
    group: &'static str,
    name: &'static str,
    label: &'static str,
    kind: FieldKind,
) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind,
        group: Some(group),
    }
}

const TEXT_FIELDS: &[FieldSpec] = &[
    field("text", "Texto", FieldKind::MultilineText),
    field("level", "Nível", FieldKind::Number { min: 1, max: 6 }),
    field("align", "Alinhamento", FieldKind::Select(&["left", "center", "right"])),
    field("color", "Cor", FieldKind::Color),
    field("fontSize", "Tamanho da fonte", FieldKind::Text),
    field(
        "fontWeight",
        "Peso da fonte",
        FieldKind::Select(&["normal", "medium", "semibold", "bold"]),
    ),
];

const IMAGE_FIELDS: &[FieldSpec] = &[
    field("src", "URL da imagem", FieldKind::Url),
    field("alt", "Texto alternativo", FieldKind::Text),
    field("width", "Largura", FieldKind::Number { min: 1, max: 4096 }),
    field("height", "Altura", FieldKind::Number { min: 1, max: 4096 }),
    grouped(
        "optimization",
        "quality",
        "Qualidade",
        FieldKind::Select(&["auto", "auto:best", "auto:good", "auto:eco", "auto:low"]),
    ),
    grouped(
        "optimization",
        "format",
        "Formato",
        FieldKind::Select(&["auto", "webp", "avif", "jpg", "png"]),
    ),
    grouped(
        "optimization",
        "crop",
        "Recorte",
        FieldKind::Select(&["fill", "fit", "limit", "scale", "thumb"]),
    ),
];

const INPUT_FIELDS: &[FieldSpec] = &[
    field("label", "Rótulo", FieldKind::Text),
    field("placeholder", "Placeholder", FieldKind::Text),
    field(
        "inputType",
        "Tipo",
        FieldKind::Select(&["text", "email", "tel", "number"]),
    ),
    field("name", "Nome do campo", FieldKind::Text),
    field("required", "Obrigatório", FieldKind::Toggle),
];

const BUTTON_FIELDS: &[FieldSpec] = &[
    field("text", "Texto", FieldKind::Text),
    field(
        "action",
        "Ação",
        FieldKind::Select(&["nextStep", "goToStep", "openUrl", "submit"]),
    ),
    field("target", "Destino", FieldKind::Text),
    field("backgroundColor", "Cor de fundo", FieldKind::Color),
    field("textColor", "Cor do texto", FieldKind::Color),
    field("fullWidth", "Largura total", FieldKind::Toggle),
];

const OPTIONS_FIELDS: &[FieldSpec] = &[
    field("multiSelect", "Seleção múltipla", FieldKind::Toggle),
    field("maxSelections", "Máximo de seleções", FieldKind::Number { min: 1, max: 50 }),
    field("showImages", "Mostrar imagens", FieldKind::Toggle),
    field("columns", "Colunas", FieldKind::Number { min: 1, max: 4 }),
];

const ALERT_FIELDS: &[FieldSpec] = &[
    field("message", "Mensagem", FieldKind::MultilineText),
    field(
        "variant",
        "Variante",
        FieldKind::Select(&["info", "success", "warning", "error"]),
    ),
];

const CUSTOM_FIELDS: &[FieldSpec] = &[field("componentName", "Componente", FieldKind::Text)];

const SPACER_FIELDS: &[FieldSpec] =
    &[field("height", "Altura", FieldKind::Number { min: 0, max: 1000 })];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("Field '{field}' is not part of the {form} form")]
    UnknownField { field: String, form: FormKind },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Choice {index} out of range ({len} choices)")]
    ChoiceOutOfRange { index: usize, len: usize },

    #[error("Component is not an options component")]
    NotOptions,
}

/// A partial property update bound to its component
#[derive(Debug, Clone, PartialEq)]
pub struct PropsChange {
    pub component_id: String,
    pub patch: PropsPatch,
}

impl PropsChange {
    fn single(component_id: &str, key: &str, value: Value) -> Self {
        let mut patch = PropsPatch::new();
        patch.insert(key.to_string(), value);
        Self {
            component_id: component_id.to_string(),
            patch,
        }
    }

    /// The `on_props_change` contract: hand the partial to `UpdateComponent`
    pub fn into_mutation(self) -> Mutation {
        Mutation::UpdateComponent {
            component_id: self.component_id,
            props: self.patch,
        }
    }
}

/// Editing form selected for one component
#[derive(Debug, Clone, Copy)]
pub struct PropertyForm<'a> {
    kind: FormKind,
    component: &'a Component,
}

/// Select the form for a component
pub fn form_for(component: &Component) -> PropertyForm<'_> {
    let kind = match &component.props {
        ComponentProps::Heading(_) | ComponentProps::Text(_) => FormKind::Text,
        ComponentProps::Image(_) => FormKind::Image,
        ComponentProps::Input(_) => FormKind::Input,
        ComponentProps::Button(_) => FormKind::Button,
        ComponentProps::Options(_) => FormKind::Options,
        ComponentProps::Alert(_) => FormKind::Alert,
        ComponentProps::Custom(_) => FormKind::Custom,
        ComponentProps::Spacer(_) => FormKind::Spacer,
        ComponentProps::Video(_) | ComponentProps::Carousel(_) => FormKind::RawStyle,
    };

    PropertyForm { kind, component }
}

impl<'a> PropertyForm<'a> {
    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn component(&self) -> &'a Component {
        self.component
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        match self.kind {
            FormKind::Text => TEXT_FIELDS,
            FormKind::Image => IMAGE_FIELDS,
            FormKind::Input => INPUT_FIELDS,
            FormKind::Button => BUTTON_FIELDS,
            FormKind::Options => OPTIONS_FIELDS,
            FormKind::Alert => ALERT_FIELDS,
            FormKind::Custom => CUSTOM_FIELDS,
            FormKind::Spacer => SPACER_FIELDS,
            FormKind::RawStyle => &[],
        }
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|f| f.name == name)
    }

    /// Current value of a field, as stored in the record
    pub fn value(&self, name: &str) -> Option<Value> {
        let spec = self.field(name)?;
        let object = self.component.props.to_object().ok()?;
        match spec.group {
            Some(group) => object.get(group)?.get(spec.name).cloned(),
            None => object.get(spec.name).cloned(),
        }
    }

    /// Edit a field from its textual input (as typed into the panel)
    pub fn edit(&self, name: &str, input: &str) -> Result<PropsChange, FormError> {
        let spec = self.require_field(name)?;
        let value = parse_input(spec, input)?;
        self.change(spec, value)
    }

    /// Edit a field from an already-typed value
    pub fn edit_value(&self, name: &str, value: Value) -> Result<PropsChange, FormError> {
        let spec = self.require_field(name)?;
        check_value(spec, &value)?;
        self.change(spec, value)
    }

    /// Set (`Some`) or remove (`None`) one style override.
    ///
    /// Every form exposes this; for video and carousel it is the only editor.
    pub fn set_style(&self, key: &str, value: Option<&str>) -> PropsChange {
        let mut style = self.component.props.style().clone();
        match value {
            Some(value) => {
                style.insert(key.to_string(), value.to_string());
            }
            None => {
                style.remove(key);
            }
        }

        let style: Map<String, Value> = style
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        PropsChange::single(&self.component.id, "style", Value::Object(style))
    }

    /// Inline choice editing, for options components only
    pub fn options(&self) -> Result<OptionsForm<'a>, FormError> {
        match &self.component.props {
            ComponentProps::Options(props) => Ok(OptionsForm {
                component_id: &self.component.id,
                props,
            }),
            _ => Err(FormError::NotOptions),
        }
    }

    fn require_field(&self, name: &str) -> Result<&'static FieldSpec, FormError> {
        self.field(name).ok_or_else(|| FormError::UnknownField {
            field: name.to_string(),
            form: self.kind,
        })
    }

    fn change(&self, spec: &FieldSpec, value: Value) -> Result<PropsChange, FormError> {
        let Some(group) = spec.group else {
            return Ok(PropsChange::single(&self.component.id, spec.name, value));
        };

        // Shallow merge would drop sibling keys, so send the whole group
        let mut object = self
            .component
            .props
            .to_object()
            .ok()
            .and_then(|o| o.get(group).and_then(Value::as_object).cloned())
            .unwrap_or_default();
        object.insert(spec.name.to_string(), value);

        Ok(PropsChange::single(
            &self.component.id,
            group,
            Value::Object(object),
        ))
    }
}

fn invalid(spec: &FieldSpec, reason: impl Into<String>) -> FormError {
    FormError::InvalidValue {
        field: spec.name.to_string(),
        reason: reason.into(),
    }
}

fn parse_input(spec: &FieldSpec, input: &str) -> Result<Value, FormError> {
    let value = match spec.kind {
        FieldKind::Number { .. } => {
            let n: i64 = input
                .trim()
                .parse()
                .map_err(|_| invalid(spec, format!("'{}' is not a number", input)))?;
            Value::from(n)
        }
        FieldKind::Toggle => match input.trim().to_ascii_lowercase().as_str() {
            "true" | "on" | "yes" | "1" => Value::Bool(true),
            "false" | "off" | "no" | "0" => Value::Bool(false),
            other => return Err(invalid(spec, format!("'{}' is not on/off", other))),
        },
        _ => Value::String(input.to_string()),
    };

    check_value(spec, &value)?;
    Ok(value)
}

fn check_value(spec: &FieldSpec, value: &Value) -> Result<(), FormError> {
    match spec.kind {
        FieldKind::Text | FieldKind::MultilineText => {
            value.as_str().ok_or_else(|| invalid(spec, "expected text"))?;
        }
        FieldKind::Number { min, max } => {
            let n = value.as_i64().ok_or_else(|| invalid(spec, "expected a whole number"))?;
            if n < min || n > max {
                return Err(invalid(spec, format!("must be between {} and {}", min, max)));
            }
        }
        FieldKind::Toggle => {
            value.as_bool().ok_or_else(|| invalid(spec, "expected on/off"))?;
        }
        FieldKind::Color => {
            let color = value.as_str().ok_or_else(|| invalid(spec, "expected a color"))?;
            if !is_hex_color(color) {
                return Err(invalid(spec, format!("'{}' is not a #rgb/#rrggbb color", color)));
            }
        }
        FieldKind::Url => {
            let url = value.as_str().ok_or_else(|| invalid(spec, "expected a URL"))?;
            if !url.is_empty() && !url.starts_with('/') && url::Url::parse(url).is_err() {
                return Err(invalid(spec, format!("'{}' is not a URL", url)));
            }
        }
        FieldKind::Select(options) => {
            let choice = value.as_str().ok_or_else(|| invalid(spec, "expected text"))?;
            if !options.contains(&choice) {
                return Err(invalid(
                    spec,
                    format!("'{}' is not one of {}", choice, options.join(", ")),
                ));
            }
        }
    }
    Ok(())
}

fn is_hex_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => {
            matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

/// Inline editing of an options component's choices.
///
/// Every operation replaces the full `choices` array.
#[derive(Debug, Clone, Copy)]
pub struct OptionsForm<'a> {
    component_id: &'a str,
    props: &'a OptionsProps,
}

impl<'a> OptionsForm<'a> {
    pub fn choices(&self) -> &'a [Choice] {
        &self.props.choices
    }

    /// Append a choice with a derived value token and zero score
    pub fn add_choice(&self, text: &str) -> PropsChange {
        let mut choices = self.props.choices.clone();
        choices.push(Choice::new(text));
        self.replace(choices)
    }

    /// Change the text; the value token is re-derived
    pub fn set_choice_text(&self, index: usize, text: &str) -> Result<PropsChange, FormError> {
        self.edit_choice(index, |choice| {
            choice.value = crate::component::derive_value(text);
            choice.text = text.to_string();
        })
    }

    pub fn set_choice_score(&self, index: usize, score: i32) -> Result<PropsChange, FormError> {
        self.edit_choice(index, |choice| choice.score = Some(score))
    }

    pub fn set_choice_next_step(
        &self,
        index: usize,
        next_step: Option<&str>,
    ) -> Result<PropsChange, FormError> {
        self.edit_choice(index, |choice| choice.next_step = next_step.map(str::to_string))
    }

    pub fn set_choice_image(
        &self,
        index: usize,
        image_url: Option<&str>,
    ) -> Result<PropsChange, FormError> {
        self.edit_choice(index, |choice| choice.image_url = image_url.map(str::to_string))
    }

    pub fn remove_choice(&self, index: usize) -> Result<PropsChange, FormError> {
        let mut choices = self.props.choices.clone();
        self.check_index(index)?;
        choices.remove(index);
        Ok(self.replace(choices))
    }

    fn edit_choice(
        &self,
        index: usize,
        edit: impl FnOnce(&mut Choice),
    ) -> Result<PropsChange, FormError> {
        self.check_index(index)?;
        let mut choices = self.props.choices.clone();
        edit(&mut choices[index]);
        Ok(self.replace(choices))
    }

    fn check_index(&self, index: usize) -> Result<(), FormError> {
        if index < self.props.choices.len() {
            Ok(())
        } else {
            Err(FormError::ChoiceOutOfRange {
                index,
                len: self.props.choices.len(),
            })
        }
    }

    fn replace(&self, choices: Vec<Choice>) -> PropsChange {
        let value = serde_json::to_value(choices).unwrap_or(Value::Array(Vec::new()));
        PropsChange::single(self.component_id, "choices", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{ComponentType, ImageProps};
    use crate::image::ImageSettings;
    use serde_json::json;

    fn component(kind: ComponentType) -> Component {
        Component::new(format!("{}-1", kind), ComponentProps::defaults(kind))
    }

    #[test]
    fn test_dispatch_is_exhaustive() {
        let expected = [
            (ComponentType::Heading, FormKind::Text),
            (ComponentType::Text, FormKind::Text),
            (ComponentType::Image, FormKind::Image),
            (ComponentType::Input, FormKind::Input),
            (ComponentType::Button, FormKind::Button),
            (ComponentType::Options, FormKind::Options),
            (ComponentType::Alert, FormKind::Alert),
            (ComponentType::Video, FormKind::RawStyle),
            (ComponentType::Carousel, FormKind::RawStyle),
            (ComponentType::Spacer, FormKind::Spacer),
            (ComponentType::Custom, FormKind::Custom),
        ];

        for (kind, form) in expected {
            assert_eq!(form_for(&component(kind)).kind(), form, "{}", kind);
        }
    }

    #[test]
    fn test_edit_produces_partial_patch() {
        let heading = component(ComponentType::Heading);
        let change = form_for(&heading).edit("align", "right").unwrap();

        assert_eq!(change.component_id, "heading-1");
        assert_eq!(change.patch.len(), 1);
        assert_eq!(change.patch["align"], json!("right"));

        match change.into_mutation() {
            Mutation::UpdateComponent { component_id, props } => {
                assert_eq!(component_id, "heading-1");
                assert_eq!(props["align"], json!("right"));
            }
            other => panic!("Expected update, got {:?}", other),
        }
    }

    #[test]
    fn test_edit_rejects_wrong_values() {
        let spacer = component(ComponentType::Spacer);
        let form = form_for(&spacer);

        assert!(matches!(form.edit("height", "tall"), Err(FormError::InvalidValue { .. })));
        assert!(matches!(form.edit("height", "5000"), Err(FormError::InvalidValue { .. })));
        assert!(matches!(form.edit("text", "x"), Err(FormError::UnknownField { .. })));
        assert_eq!(form.edit("height", "48").unwrap().patch["height"], json!(48));
    }

    #[test]
    fn test_toggle_and_color_inputs() {
        let button = component(ComponentType::Button);
        let form = form_for(&button);

        assert_eq!(form.edit("fullWidth", "off").unwrap().patch["fullWidth"], json!(false));
        assert!(form.edit("textColor", "#000").is_ok());
        assert!(form.edit("textColor", "black").is_err());
        assert!(form.edit_value("fullWidth", json!("yes")).is_err());
    }

    #[test]
    fn test_grouped_field_keeps_siblings() {
        let image = Component::new(
            "image-1",
            ComponentProps::Image(ImageProps {
                src: "https://res.cloudinary.com/demo/image/upload/look.jpg".to_string(),
                optimization: Some(ImageSettings::auto()),
                ..Default::default()
            }),
        );

        let form = form_for(&image);
        assert_eq!(form.value("quality"), Some(json!("auto")));

        let change = form.edit("crop", "fill").unwrap();
        assert_eq!(
            change.patch["optimization"],
            json!({"quality": "auto", "format": "auto", "crop": "fill"})
        );
    }

    #[test]
    fn test_raw_style_form() {
        let video = component(ComponentType::Video);
        let form = form_for(&video);

        assert!(form.fields().is_empty());

        let change = form.set_style("borderRadius", Some("8px"));
        assert_eq!(change.patch["style"], json!({"borderRadius": "8px"}));
    }

    #[test]
    fn test_options_form_choice_editing() {
        let options = component(ComponentType::Options);
        let form = form_for(&options).options().unwrap();
        assert_eq!(form.choices().len(), 2);

        let added = form.add_choice("Elegante Clássico");
        let choices = added.patch["choices"].as_array().unwrap();
        assert_eq!(choices.len(), 3);
        assert_eq!(choices[2]["value"], json!("elegante_clássico"));
        assert_eq!(choices[2]["score"], json!(0));

        let renamed = form.set_choice_text(0, "Natural").unwrap();
        assert_eq!(renamed.patch["choices"][0]["value"], json!("natural"));

        let scored = form.set_choice_score(1, 3).unwrap();
        assert_eq!(scored.patch["choices"][1]["score"], json!(3));

        let removed = form.remove_choice(0).unwrap();
        assert_eq!(removed.patch["choices"].as_array().unwrap().len(), 1);

        assert_eq!(
            form.remove_choice(7),
            Err(FormError::ChoiceOutOfRange { index: 7, len: 2 })
        );
    }

    #[test]
    fn test_options_only_for_options_components() {
        let text = component(ComponentType::Text);
        assert_eq!(form_for(&text).options().unwrap_err(), FormError::NotOptions);
    }
}
