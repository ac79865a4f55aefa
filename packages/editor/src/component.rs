//! # Components
//!
//! A component is one typed content block inside a step. Each component type
//! carries only its own property record; the record is selected by the
//! `type` tag when (de)serializing.
//!
//! ```text
//! { "id": "heading-1a2b-3", "order": 0, "type": "heading", "text": "Título", ... }
//! ```
//!
//! Property edits arrive as partial JSON objects ([`PropsPatch`]) and are
//! shallow-merged into the record: keys present in the patch overwrite, keys
//! absent from the patch are preserved.

use crate::image::ImageSettings;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Free-form CSS-like overrides (`"marginTop" -> "12px"`)
pub type StyleOverrides = BTreeMap<String, String>;

/// Partial property update, shallow-merged into a component's record
pub type PropsPatch = Map<String, Value>;

/// Closed set of component type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentType {
    Heading,
    Text,
    Image,
    Input,
    Button,
    Options,
    Alert,
    Video,
    Carousel,
    Spacer,
    Custom,
}

impl ComponentType {
    pub const ALL: [ComponentType; 11] = [
        ComponentType::Heading,
        ComponentType::Text,
        ComponentType::Image,
        ComponentType::Input,
        ComponentType::Button,
        ComponentType::Options,
        ComponentType::Alert,
        ComponentType::Video,
        ComponentType::Carousel,
        ComponentType::Spacer,
        ComponentType::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Heading => "heading",
            ComponentType::Text => "text",
            ComponentType::Image => "image",
            ComponentType::Input => "input",
            ComponentType::Button => "button",
            ComponentType::Options => "options",
            ComponentType::Alert => "alert",
            ComponentType::Video => "video",
            ComponentType::Carousel => "carousel",
            ComponentType::Spacer => "spacer",
            ComponentType::Custom => "custom",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Unknown component type: {0}")]
pub struct UnknownComponentType(pub String);

impl FromStr for ComponentType {
    type Err = UnknownComponentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComponentType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownComponentType(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Heading and text blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextProps {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    pub align: TextAlign,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
    pub font_weight: String,
    pub style: StyleOverrides,
}

impl Default for TextProps {
    fn default() -> Self {
        Self {
            text: String::new(),
            level: None,
            align: TextAlign::Left,
            color: "#ffffff".to_string(),
            font_size: None,
            font_weight: "normal".to_string(),
            style: StyleOverrides::new(),
        }
    }
}

impl TextProps {
    /// Centered white bold heading
    pub fn heading(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: Some(1),
            align: TextAlign::Center,
            font_size: Some("2rem".to_string()),
            font_weight: "bold".to_string(),
            ..Self::default()
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageProps {
    pub src: String,
    pub alt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimization: Option<ImageSettings>,
    pub style: StyleOverrides,
}

impl ImageProps {
    /// URL to render, with CDN transformations applied when configured
    pub fn delivery_url(&self) -> String {
        match &self.optimization {
            Some(settings) => crate::image::optimize_image_url(&self.src, settings),
            None => self.src.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputType {
    #[default]
    Text,
    Email,
    Tel,
    Number,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InputProps {
    pub label: String,
    pub placeholder: String,
    pub input_type: InputType,
    pub name: String,
    pub required: bool,
    pub style: StyleOverrides,
}

impl Default for InputProps {
    fn default() -> Self {
        Self {
            label: "Seu nome".to_string(),
            placeholder: "Digite seu nome".to_string(),
            input_type: InputType::Text,
            name: "name".to_string(),
            required: true,
            style: StyleOverrides::new(),
        }
    }
}

/// What a button does when clicked; `target` on [`ButtonProps`] carries the
/// step id for `GoToStep` and the address for `OpenUrl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ButtonAction {
    #[default]
    NextStep,
    GoToStep,
    OpenUrl,
    Submit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ButtonProps {
    pub text: String,
    pub action: ButtonAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub background_color: String,
    pub text_color: String,
    pub full_width: bool,
    pub style: StyleOverrides,
}

impl Default for ButtonProps {
    fn default() -> Self {
        Self {
            text: "Continuar".to_string(),
            action: ButtonAction::NextStep,
            target: None,
            background_color: "#B89B7A".to_string(),
            text_color: "#ffffff".to_string(),
            full_width: true,
            style: StyleOverrides::new(),
        }
    }
}

/// One selectable answer of an options component
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Choice {
    pub text: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_step: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Choice {
    /// New choice with a derived value token and zero score
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            value: derive_value(&text),
            text,
            next_step: None,
            score: Some(0),
            image_url: None,
        }
    }
}

/// Value token for a choice: lowercased, whitespace runs become `_`
pub fn derive_value(text: &str) -> String {
    let mut value = String::with_capacity(text.len());
    let mut in_whitespace = false;

    for c in text.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                value.push('_');
            }
            in_whitespace = true;
        } else {
            value.extend(c.to_lowercase());
            in_whitespace = false;
        }
    }

    value
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptionsProps {
    pub choices: Vec<Choice>,
    pub multi_select: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_selections: Option<u32>,
    pub show_images: bool,
    pub columns: u8,
    pub style: StyleOverrides,
}

impl Default for OptionsProps {
    fn default() -> Self {
        Self {
            choices: vec![Choice::new("Opção 1"), Choice::new("Opção 2")],
            multi_select: false,
            max_selections: None,
            show_images: false,
            columns: 1,
            style: StyleOverrides::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertVariant {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertProps {
    pub message: String,
    pub variant: AlertVariant,
    pub style: StyleOverrides,
}

impl Default for AlertProps {
    fn default() -> Self {
        Self {
            message: "Mensagem de alerta".to_string(),
            variant: AlertVariant::Info,
            style: StyleOverrides::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoProps {
    pub url: String,
    pub autoplay: bool,
    pub controls: bool,
    pub style: StyleOverrides,
}

impl Default for VideoProps {
    fn default() -> Self {
        Self {
            url: String::new(),
            autoplay: false,
            controls: true,
            style: StyleOverrides::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CarouselProps {
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autoplay_ms: Option<u32>,
    pub style: StyleOverrides,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpacerProps {
    pub height: u32,
    pub style: StyleOverrides,
}

impl Default for SpacerProps {
    fn default() -> Self {
        Self {
            height: 32,
            style: StyleOverrides::new(),
        }
    }
}

/// Delegates rendering to the quiz runtime (result and offer pages)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomProps {
    pub component_name: String,
    pub config: Map<String, Value>,
    pub style: StyleOverrides,
}

impl Default for CustomProps {
    fn default() -> Self {
        Self {
            component_name: "ResultPage".to_string(),
            config: Map::new(),
            style: StyleOverrides::new(),
        }
    }
}

/// Type-tagged property record of a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ComponentProps {
    Heading(TextProps),
    Text(TextProps),
    Image(ImageProps),
    Input(InputProps),
    Button(ButtonProps),
    Options(OptionsProps),
    Alert(AlertProps),
    Video(VideoProps),
    Carousel(CarouselProps),
    Spacer(SpacerProps),
    Custom(CustomProps),
}

impl ComponentProps {
    /// Default property record for a freshly added component
    pub fn defaults(component_type: ComponentType) -> Self {
        match component_type {
            ComponentType::Heading => ComponentProps::Heading(TextProps::heading("Título")),
            ComponentType::Text => {
                ComponentProps::Text(TextProps::paragraph("Digite seu texto aqui"))
            }
            ComponentType::Image => ComponentProps::Image(ImageProps {
                src: "https://placehold.co/600x400".to_string(),
                alt: "Imagem".to_string(),
                optimization: Some(ImageSettings::auto()),
                ..ImageProps::default()
            }),
            ComponentType::Input => ComponentProps::Input(InputProps::default()),
            ComponentType::Button => ComponentProps::Button(ButtonProps::default()),
            ComponentType::Options => ComponentProps::Options(OptionsProps::default()),
            ComponentType::Alert => ComponentProps::Alert(AlertProps::default()),
            ComponentType::Video => ComponentProps::Video(VideoProps::default()),
            ComponentType::Carousel => ComponentProps::Carousel(CarouselProps::default()),
            ComponentType::Spacer => ComponentProps::Spacer(SpacerProps::default()),
            ComponentType::Custom => ComponentProps::Custom(CustomProps::default()),
        }
    }

    pub fn component_type(&self) -> ComponentType {
        match self {
            ComponentProps::Heading(_) => ComponentType::Heading,
            ComponentProps::Text(_) => ComponentType::Text,
            ComponentProps::Image(_) => ComponentType::Image,
            ComponentProps::Input(_) => ComponentType::Input,
            ComponentProps::Button(_) => ComponentType::Button,
            ComponentProps::Options(_) => ComponentType::Options,
            ComponentProps::Alert(_) => ComponentType::Alert,
            ComponentProps::Video(_) => ComponentType::Video,
            ComponentProps::Carousel(_) => ComponentType::Carousel,
            ComponentProps::Spacer(_) => ComponentType::Spacer,
            ComponentProps::Custom(_) => ComponentType::Custom,
        }
    }

    pub fn style(&self) -> &StyleOverrides {
        match self {
            ComponentProps::Heading(p) | ComponentProps::Text(p) => &p.style,
            ComponentProps::Image(p) => &p.style,
            ComponentProps::Input(p) => &p.style,
            ComponentProps::Button(p) => &p.style,
            ComponentProps::Options(p) => &p.style,
            ComponentProps::Alert(p) => &p.style,
            ComponentProps::Video(p) => &p.style,
            ComponentProps::Carousel(p) => &p.style,
            ComponentProps::Spacer(p) => &p.style,
            ComponentProps::Custom(p) => &p.style,
        }
    }

    /// The record as a JSON object, without the `type` tag
    pub fn to_object(&self) -> Result<Map<String, Value>, serde_json::Error> {
        let mut object = match serde_json::to_value(self)? {
            Value::Object(object) => object,
            _ => Map::new(),
        };
        object.remove("type");
        Ok(object)
    }

    /// Shallow-merge `patch` into this record.
    ///
    /// The `type` key is never merged, so a patch cannot change the
    /// component's type. Fails when a patched value does not fit the typed
    /// record (e.g. a string where a number is expected).
    pub fn merged(&self, patch: &PropsPatch) -> Result<ComponentProps, serde_json::Error> {
        let mut object = self.to_object()?;
        for (key, value) in patch {
            if key == "type" {
                continue;
            }
            object.insert(key.clone(), value.clone());
        }
        object.insert(
            "type".to_string(),
            Value::String(self.component_type().as_str().to_string()),
        );
        serde_json::from_value(Value::Object(object))
    }

    /// Short human-readable summary for listings
    pub fn summary(&self) -> String {
        match self {
            ComponentProps::Heading(p) | ComponentProps::Text(p) => p.text.clone(),
            ComponentProps::Image(p) => p.src.clone(),
            ComponentProps::Input(p) => p.label.clone(),
            ComponentProps::Button(p) => p.text.clone(),
            ComponentProps::Options(p) => format!("{} choices", p.choices.len()),
            ComponentProps::Alert(p) => p.message.clone(),
            ComponentProps::Video(p) => p.url.clone(),
            ComponentProps::Carousel(p) => format!("{} images", p.images.len()),
            ComponentProps::Spacer(p) => format!("{}px", p.height),
            ComponentProps::Custom(p) => p.component_name.clone(),
        }
    }
}

/// A typed, positioned unit of content within a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: String,

    /// Position within the owning step (dense, zero-based)
    pub order: usize,

    #[serde(flatten)]
    pub props: ComponentProps,
}

impl Component {
    pub fn new(id: impl Into<String>, props: ComponentProps) -> Self {
        Self {
            id: id.into(),
            order: 0,
            props,
        }
    }

    pub fn component_type(&self) -> ComponentType {
        self.props.component_type()
    }
}
