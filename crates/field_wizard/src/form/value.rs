//! Value types carried by fields.
//!
//! - `FieldId`:      identifier of a field or of a shared proxy cell
//! - `Scalar`:       string / number / boolean leaf used for labels and values
//! - `FormOption`:   label/value pair, the unit of form output
//! - `FormValue`:    what a field holds (one option or a list of them)
//! - `DefaultValue`: seed returned by a `defaultValue` hook (bare text is allowed)

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a field within one form session.
///
/// Numbers and strings never compare equal, so `1` and `"1"` are two
/// different fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldId {
    Number(i64),
    Text(String),
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldId::Number(n) => write!(f, "{n}"),
            FieldId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldId {
    fn from(value: &str) -> Self {
        FieldId::Text(value.to_string())
    }
}

impl From<String> for FieldId {
    fn from(value: String) -> Self {
        FieldId::Text(value)
    }
}

impl From<&String> for FieldId {
    fn from(value: &String) -> Self {
        FieldId::Text(value.clone())
    }
}

impl From<i64> for FieldId {
    fn from(value: i64) -> Self {
        FieldId::Number(value)
    }
}

impl From<i32> for FieldId {
    fn from(value: i32) -> Self {
        FieldId::Number(value.into())
    }
}

/// A label or value leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Scalar {
    /// True only for the empty string.
    pub fn is_empty(&self) -> bool {
        matches!(self, Scalar::Text(s) if s.is_empty())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value as f64)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

/// A selectable value: display label, underlying value and an opaque payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormOption {
    pub label: Scalar,
    pub value: Scalar,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_checked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other: Option<serde_json::Value>,
}

impl FormOption {
    pub fn new(label: impl Into<Scalar>, value: impl Into<Scalar>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            is_checked: None,
            other: None,
        }
    }

    /// Option whose label and value are the same text.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(text.clone(), text)
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.is_checked = Some(checked);
        self
    }

    pub fn with_other(mut self, other: serde_json::Value) -> Self {
        self.other = Some(other);
        self
    }
}

/// The value held by a field: a single option or an ordered list of options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Many(Vec<FormOption>),
    Single(FormOption),
}

impl FormValue {
    /// An empty list, or a single option whose value is the empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            FormValue::Many(options) => options.is_empty(),
            FormValue::Single(option) => option.value.is_empty(),
        }
    }

    pub fn as_single(&self) -> Option<&FormOption> {
        match self {
            FormValue::Single(option) => Some(option),
            FormValue::Many(_) => None,
        }
    }

    /// Borrow the held options as a slice regardless of arity.
    pub fn options(&self) -> &[FormOption] {
        match self {
            FormValue::Many(options) => options,
            FormValue::Single(option) => std::slice::from_ref(option),
        }
    }
}

impl From<FormOption> for FormValue {
    fn from(value: FormOption) -> Self {
        FormValue::Single(value)
    }
}

impl From<Vec<FormOption>> for FormValue {
    fn from(value: Vec<FormOption>) -> Self {
        FormValue::Many(value)
    }
}

/// Null counts as empty too.
pub fn is_empty_value(value: Option<&FormValue>) -> bool {
    value.map_or(true, FormValue::is_empty)
}

/// Seed produced by a `defaultValue` hook.
///
/// Bare text is wrapped into an option whose label and value are that text.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Text(String),
    Value(FormValue),
}

impl DefaultValue {
    pub fn into_form_value(self) -> FormValue {
        match self {
            DefaultValue::Text(text) => FormValue::Single(FormOption::text(text)),
            DefaultValue::Value(value) => value,
        }
    }
}

impl From<&str> for DefaultValue {
    fn from(value: &str) -> Self {
        DefaultValue::Text(value.to_string())
    }
}

impl From<String> for DefaultValue {
    fn from(value: String) -> Self {
        DefaultValue::Text(value)
    }
}

impl From<FormOption> for DefaultValue {
    fn from(value: FormOption) -> Self {
        DefaultValue::Value(FormValue::Single(value))
    }
}

impl From<Vec<FormOption>> for DefaultValue {
    fn from(value: Vec<FormOption>) -> Self {
        DefaultValue::Value(FormValue::Many(value))
    }
}

impl From<FormValue> for DefaultValue {
    fn from(value: FormValue) -> Self {
        DefaultValue::Value(value)
    }
}
