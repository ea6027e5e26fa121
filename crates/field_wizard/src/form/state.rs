//! Per-field runtime (mutable) state.
//!
//! `FieldState` is what the rendering layer displays and what every hook
//! receives a snapshot of. Writes are expressed as `FieldAttr` values so the
//! store can route them (shared cell, private overlay, or private slot)
//! without knowing about individual pipelines.

use derive_deref::{Deref, DerefMut};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as JsonValue;
use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::{FieldId, FormOption, FormValue, ResolvedButton};

/// Ephemeral state of one field identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldState {
    /// Position in form order.
    pub index: usize,
    /// Whether the first-mount default-value sequence has run.
    pub init: bool,
    pub help_text: String,
    pub is_required: bool,
    pub errors: Vec<String>,
    pub is_available: bool,
    pub computed_value: Option<JsonValue>,
    pub list_options: Vec<FormOption>,
    pub form_value: Option<FormValue>,
    pub default_value: Option<FormValue>,
    /// The last write changed the value.
    pub is_dirty: bool,
    /// Milliseconds since the Unix epoch of the last activation.
    pub int_last_time_loaded: Option<i64>,
    pub nav_button_props: Vec<ResolvedButton>,
    /// Incremented on every explicit clear.
    pub value_clear_count: u64,
}

impl FieldState {
    /// Fresh state as built by a session rebuild.
    pub fn initial(index: usize, help_text: impl Into<String>) -> Self {
        Self {
            index,
            help_text: help_text.into(),
            is_available: true,
            ..Self::default()
        }
    }

    /// Read one attribute as JSON.
    pub fn get(&self, attribute: Attribute) -> JsonValue {
        match attribute {
            Attribute::Index => json(&self.index),
            Attribute::Init => json(&self.init),
            Attribute::HelpText => json(&self.help_text),
            Attribute::IsRequired => json(&self.is_required),
            Attribute::Errors => json(&self.errors),
            Attribute::IsAvailable => json(&self.is_available),
            Attribute::ComputedValue => json(&self.computed_value),
            Attribute::ListOptions => json(&self.list_options),
            Attribute::FormValue => json(&self.form_value),
            Attribute::DefaultValue => json(&self.default_value),
            Attribute::IsDirty => json(&self.is_dirty),
            Attribute::IntLastTimeLoaded => json(&self.int_last_time_loaded),
            Attribute::NavButtonProps => json(&self.nav_button_props),
            Attribute::ValueClearCount => json(&self.value_clear_count),
        }
    }
}

fn json<T: Serialize>(value: &T) -> JsonValue {
    serde_json::to_value(value).unwrap_or(JsonValue::Null)
}

/// Attribute names of `FieldState`, as used by the read accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum Attribute {
    Index,
    Init,
    HelpText,
    IsRequired,
    Errors,
    IsAvailable,
    ComputedValue,
    ListOptions,
    FormValue,
    DefaultValue,
    IsDirty,
    IntLastTimeLoaded,
    NavButtonProps,
    ValueClearCount,
}

impl Attribute {
    /// Attributes that always belong to one identifier and never go
    /// through a proxy cell.
    pub fn is_private(self) -> bool {
        matches!(self, Attribute::Index | Attribute::NavButtonProps)
    }
}

/// A single attribute write.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldAttr {
    Index(usize),
    Init(bool),
    HelpText(String),
    IsRequired(bool),
    Errors(Vec<String>),
    IsAvailable(bool),
    ComputedValue(Option<JsonValue>),
    ListOptions(Vec<FormOption>),
    FormValue(Option<FormValue>),
    DefaultValue(Option<FormValue>),
    IsDirty(bool),
    IntLastTimeLoaded(Option<i64>),
    NavButtonProps(Vec<ResolvedButton>),
    ValueClearCount(u64),
}

impl FieldAttr {
    pub fn attribute(&self) -> Attribute {
        match self {
            FieldAttr::Index(_) => Attribute::Index,
            FieldAttr::Init(_) => Attribute::Init,
            FieldAttr::HelpText(_) => Attribute::HelpText,
            FieldAttr::IsRequired(_) => Attribute::IsRequired,
            FieldAttr::Errors(_) => Attribute::Errors,
            FieldAttr::IsAvailable(_) => Attribute::IsAvailable,
            FieldAttr::ComputedValue(_) => Attribute::ComputedValue,
            FieldAttr::ListOptions(_) => Attribute::ListOptions,
            FieldAttr::FormValue(_) => Attribute::FormValue,
            FieldAttr::DefaultValue(_) => Attribute::DefaultValue,
            FieldAttr::IsDirty(_) => Attribute::IsDirty,
            FieldAttr::IntLastTimeLoaded(_) => Attribute::IntLastTimeLoaded,
            FieldAttr::NavButtonProps(_) => Attribute::NavButtonProps,
            FieldAttr::ValueClearCount(_) => Attribute::ValueClearCount,
        }
    }

    pub fn apply(&self, state: &mut FieldState) {
        match self {
            FieldAttr::Index(v) => state.index = *v,
            FieldAttr::Init(v) => state.init = *v,
            FieldAttr::HelpText(v) => state.help_text = v.clone(),
            FieldAttr::IsRequired(v) => state.is_required = *v,
            FieldAttr::Errors(v) => state.errors = v.clone(),
            FieldAttr::IsAvailable(v) => state.is_available = *v,
            FieldAttr::ComputedValue(v) => state.computed_value = v.clone(),
            FieldAttr::ListOptions(v) => state.list_options = v.clone(),
            FieldAttr::FormValue(v) => state.form_value = v.clone(),
            FieldAttr::DefaultValue(v) => state.default_value = v.clone(),
            FieldAttr::IsDirty(v) => state.is_dirty = *v,
            FieldAttr::IntLastTimeLoaded(v) => state.int_last_time_loaded = *v,
            FieldAttr::NavButtonProps(v) => state.nav_button_props = v.clone(),
            FieldAttr::ValueClearCount(v) => state.value_clear_count = *v,
        }
    }
}

/// Snapshot of the whole store, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deref, DerefMut)]
pub struct FieldMap(IndexMap<FieldId, FieldState>);

impl FieldMap {
    /// Look up a field by anything convertible into an identifier.
    pub fn field(&self, id: impl Into<FieldId>) -> Option<&FieldState> {
        self.0.get(&id.into())
    }
}

impl FromIterator<(FieldId, FieldState)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (FieldId, FieldState)>>(iter: I) -> Self {
        FieldMap(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn initial_state_is_available_and_empty() {
        let state = FieldState::initial(3, "Your name");
        assert_eq!(state.index, 3);
        assert!(state.is_available);
        assert!(!state.init);
        assert_eq!(state.help_text, "Your name");
        assert_eq!(state.get(Attribute::FormValue), JsonValue::Null);
    }

    #[test]
    fn attribute_names_round_trip_through_strum() {
        assert_eq!(Attribute::from_str("formValue").unwrap(), Attribute::FormValue);
        assert_eq!(Attribute::IntLastTimeLoaded.to_string(), "intLastTimeLoaded");
        assert!(Attribute::from_str("colour").is_err());
    }

    #[test]
    fn applied_write_is_readable() {
        let mut state = FieldState::initial(0, "");
        let write = FieldAttr::FormValue(Some(FormOption::new("N/A", "na").into()));
        write.apply(&mut state);
        assert_eq!(write.attribute(), Attribute::FormValue);
        assert_eq!(
            state.get(Attribute::FormValue),
            json!({"label": "N/A", "value": "na"})
        );
    }
}
