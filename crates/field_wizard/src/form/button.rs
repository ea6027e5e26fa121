//! Navigation buttons: authored definitions and their resolved runtime state.
//!
//! A `NavButton` is static configuration. Each field owns a list of
//! `ResolvedButton`s derived from it; those are the only thing the rendering
//! layer reads, and the only thing the button resolver rewrites.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{FieldMap, FieldState, FormOption, FormValue, Hook};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ButtonColor {
    #[default]
    Primary,
    Secondary,
    Success,
    Danger,
    Warning,
    Info,
    Light,
    Dark,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ButtonSize {
    Small,
    #[default]
    Large,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ButtonSlot {
    #[default]
    Start,
    End,
}

/// The two points at which button state is recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum ButtonEvent {
    /// The field was (re)activated.
    Default,
    /// A value was written to the field.
    OnValue,
}

/// Pure function of the field snapshot and the store snapshot.
pub type Predicate<T> = Arc<dyn Fn(&FieldState, &FieldMap) -> T + Send + Sync>;

/// Per-event predicates computing one button attribute.
pub struct StatePredicates<T> {
    pub default: Option<Predicate<T>>,
    pub on_value: Option<Predicate<T>>,
}

impl<T> StatePredicates<T> {
    pub fn new() -> Self {
        Self {
            default: None,
            on_value: None,
        }
    }

    pub fn when_default(
        mut self,
        f: impl Fn(&FieldState, &FieldMap) -> T + Send + Sync + 'static,
    ) -> Self {
        self.default = Some(Arc::new(f));
        self
    }

    pub fn when_value(
        mut self,
        f: impl Fn(&FieldState, &FieldMap) -> T + Send + Sync + 'static,
    ) -> Self {
        self.on_value = Some(Arc::new(f));
        self
    }

    pub fn for_event(&self, event: ButtonEvent) -> Option<&Predicate<T>> {
        match event {
            ButtonEvent::Default => self.default.as_ref(),
            ButtonEvent::OnValue => self.on_value.as_ref(),
        }
    }
}

impl<T> Default for StatePredicates<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for StatePredicates<T> {
    fn clone(&self) -> Self {
        Self {
            default: self.default.clone(),
            on_value: self.on_value.clone(),
        }
    }
}

impl<T> fmt::Debug for StatePredicates<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatePredicates")
            .field("default", &self.default.is_some())
            .field("on_value", &self.on_value.is_some())
            .finish()
    }
}

/// Dynamic attribute table of a button, keyed by attribute.
#[derive(Debug, Clone, Default)]
pub struct ButtonStateTable {
    pub color: Option<StatePredicates<ButtonColor>>,
    pub disabled: Option<StatePredicates<bool>>,
    pub visible: Option<StatePredicates<bool>>,
}

/// Capabilities a button exposes when clicked.
#[derive(Debug, Clone, Default)]
pub struct ClickHandler {
    pub do_action: Option<Hook<()>>,
    /// Produces a value that is written through the value pipeline.
    pub add_value: Option<Hook<FormValue>>,
    /// Produces replacement list options for the field.
    pub update_list_options: Option<Hook<Vec<FormOption>>>,
}

/// Authored navigation button (e.g. Next / Back / Clear).
#[derive(Debug, Clone)]
pub struct NavButton {
    /// Sort key; a custom button with the same index replaces a default one.
    pub index: i32,
    pub name: String,
    pub color: Option<ButtonColor>,
    pub size: Option<ButtonSize>,
    pub css_class: Option<String>,
    pub slot: Option<ButtonSlot>,
    pub click_handler: ClickHandler,
    pub state: Option<ButtonStateTable>,
}

impl NavButton {
    pub fn new(index: i32, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            color: None,
            size: None,
            css_class: None,
            slot: None,
            click_handler: ClickHandler::default(),
            state: None,
        }
    }

    pub fn color(mut self, color: ButtonColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn size(mut self, size: ButtonSize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn slot(mut self, slot: ButtonSlot) -> Self {
        self.slot = Some(slot);
        self
    }

    pub fn css_class(mut self, css_class: impl Into<String>) -> Self {
        self.css_class = Some(css_class.into());
        self
    }

    pub fn state(mut self, state: ButtonStateTable) -> Self {
        self.state = Some(state);
        self
    }

    pub fn click_handler(mut self, handler: ClickHandler) -> Self {
        self.click_handler = handler;
        self
    }
}

/// Fallback visual attributes for buttons that leave them unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonDefaults {
    pub color: ButtonColor,
    pub size: ButtonSize,
    pub slot: ButtonSlot,
}

/// Runtime state of one button on one field.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedButton {
    pub name: String,
    pub index: i32,
    pub color: ButtonColor,
    pub disabled: bool,
    pub visible: bool,
    pub slot: ButtonSlot,
    pub size: ButtonSize,
    pub css_class: String,
    #[serde(skip)]
    definition: Arc<NavButton>,
}

impl ResolvedButton {
    /// Static starting state of a button before any predicate runs.
    pub fn resolve(definition: Arc<NavButton>, defaults: &ButtonDefaults) -> Self {
        Self {
            name: definition.name.clone(),
            index: definition.index,
            color: definition.color.unwrap_or(defaults.color),
            disabled: false,
            visible: true,
            slot: definition.slot.unwrap_or(defaults.slot),
            size: definition.size.unwrap_or(defaults.size),
            css_class: definition.css_class.clone().unwrap_or_default(),
            definition,
        }
    }

    /// The authored definition this state was resolved from.
    pub fn definition(&self) -> &NavButton {
        &self.definition
    }
}

// The definition back-reference is not part of the observable state.
impl PartialEq for ResolvedButton {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.index == other.index
            && self.color == other.color
            && self.disabled == other.disabled
            && self.visible == other.visible
            && self.slot == other.slot
            && self.size == other.size
            && self.css_class == other.css_class
    }
}
