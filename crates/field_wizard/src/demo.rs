//! Bundled demo form, walked the way a navigation layer would walk it.
//!
//! The form covers the interesting engine paths: required and validated
//! fields, a conditional field with a default output, a proxied pair sharing
//! one value and navigation buttons with state predicates.

use std::collections::HashMap;
use std::fmt::Write as _;

use serde::Serialize;
use serde_json::json;

use crate::config::EngineConfig;
use crate::core::{FormOutput, FormSession, SummaryEntry};
use crate::errors::Result;
use crate::form::{
    is_empty_value, ButtonColor, ButtonSlot, ButtonStateTable, DefaultValue, FieldDefinition,
    FieldHooks, FieldId, FieldMap, FieldState, FormOption, FormValue, Hook, HookError, NavButton,
    StatePredicates,
};

/// Outcome of one field in the walk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemoStep {
    pub id: FieldId,
    pub shown: bool,
    pub passed: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DemoReport {
    pub steps: Vec<DemoStep>,
    pub summary: Vec<SummaryEntry>,
    pub output: FormOutput,
}

impl DemoReport {
    pub fn passed(&self) -> bool {
        self.steps.iter().all(|step| step.passed)
    }

    /// Plain-text rendering for the terminal.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for step in &self.steps {
            let _ = match (step.shown, step.passed) {
                (false, _) => writeln!(out, "  - {} (hidden)", step.id),
                (true, true) => writeln!(out, "  ✔ {}", step.id),
                (true, false) => writeln!(out, "  ✘ {}: {}", step.id, step.errors.join("; ")),
            };
        }
        let _ = writeln!(out, "\nSummary");
        for entry in &self.summary {
            let _ = writeln!(out, "  {}: {}", entry.label, display_value(entry.value.as_ref()));
        }
        out
    }
}

fn display_value(value: Option<&FormValue>) -> String {
    match value {
        Some(value) if !value.is_empty() => value
            .options()
            .iter()
            .map(|option| option.label.to_string())
            .collect::<Vec<_>>()
            .join(", "),
        _ => "-".to_string(),
    }
}

/// Build the demo session, answer each shown field from `answers` and
/// collect the per-field outcome, the summary and the form output.
pub async fn run(answers: &[(String, String)], config: EngineConfig) -> Result<DemoReport> {
    let answers: HashMap<&str, &str> = answers
        .iter()
        .map(|(id, value)| (id.as_str(), value.as_str()))
        .collect();

    let mut session = FormSession::with_config(config);
    session.rebuild(fields(), buttons());

    let mut steps = Vec::new();
    for id in session.field_ids() {
        if !session.evaluate_condition(id.clone()).await {
            steps.push(DemoStep {
                id,
                shown: false,
                passed: true,
                errors: Vec::new(),
            });
            continue;
        }

        session.activate(id.clone()).await?;
        if let Some(answer) = answers.get(id.to_string().as_str()) {
            session
                .set_value(Some(FormOption::text(*answer).into()))
                .await?;
        }
        let passed = session.compute_field_data().await? && session.before_next().await?;
        let errors = session
            .active_field_state()
            .map(|state| state.errors)
            .unwrap_or_default();
        steps.push(DemoStep {
            id,
            shown: true,
            passed,
            errors,
        });

        if session.exits_form().await? {
            break;
        }
    }

    Ok(DemoReport {
        steps,
        summary: session.summary().await?,
        output: session.output(),
    })
}

fn text_of(value: Option<&FormValue>) -> Option<String> {
    value
        .and_then(FormValue::as_single)
        .map(|option| option.value.to_string())
}

fn required() -> Option<Hook<bool>> {
    Some(Hook::from_fn(|_, _| true))
}

pub fn fields() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::new("name")
            .help("Full name")
            .kind("text")
            .with_hooks(FieldHooks {
                is_required: required(),
                validation: Some(Hook::from_fn(|field: &FieldState, _: &FieldMap| {
                    match text_of(field.form_value.as_ref()) {
                        Some(name) if name.trim().chars().count() < 2 => {
                            vec!["Name is too short".to_string()]
                        }
                        _ => Vec::new(),
                    }
                })),
                ..Default::default()
            }),
        FieldDefinition::new("age")
            .help("Age in years")
            .kind("number")
            .with_hooks(FieldHooks {
                is_required: required(),
                validation: Some(Hook::from_fn(|field: &FieldState, _: &FieldMap| {
                    match text_of(field.form_value.as_ref()).map(|age| age.parse::<u32>()) {
                        Some(Ok(age)) if age <= 130 => Vec::new(),
                        _ => vec!["Age must be a whole number between 0 and 130".to_string()],
                    }
                })),
                computed_value: Some(Hook::from_fn(|field: &FieldState, _: &FieldMap| {
                    text_of(field.form_value.as_ref())
                        .and_then(|age| age.parse::<u32>().ok())
                        .map_or(serde_json::Value::Null, |age| json!({ "years": age, "minor": age < 18 }))
                })),
                ..Default::default()
            }),
        FieldDefinition::new("guardian_name")
            .help("Name of parent or guardian")
            .kind("text")
            .with_hooks(FieldHooks {
                condition: Some(Hook::try_from_fn(|_: &FieldState, fields: &FieldMap| {
                    let Some(age) = fields
                        .field("age")
                        .and_then(|age| text_of(age.form_value.as_ref()))
                    else {
                        return Ok(false);
                    };
                    age.parse::<u32>()
                        .map(|age| age < 18)
                        .map_err(|_| HookError::new(format!("age `{age}` is not a number")))
                })),
                default_output: Some(Hook::from_fn(|_, _| {
                    Some(FormOption::new("N/A", "na").into())
                })),
                is_required: required(),
                ..Default::default()
            }),
        FieldDefinition::new("country")
            .proxy("location")
            .help("Country of residence")
            .kind("select")
            .with_hooks(FieldHooks {
                default_value: Some(Hook::from_fn(|_, _| Some(DefaultValue::from("Malawi")))),
                options: Some(Hook::from_fn(|_, _| {
                    ["Malawi", "Mozambique", "Tanzania", "Zambia"]
                        .into_iter()
                        .map(FormOption::text)
                        .collect()
                })),
                is_required: required(),
                ..Default::default()
            }),
        FieldDefinition::new("country_confirm")
            .proxy("location")
            .help("Confirm your country")
            .kind("select")
            .require_next(true)
            .with_hooks(FieldHooks {
                dynamic_help_text: Some(Hook::from_fn(|_: &FieldState, fields: &FieldMap| {
                    fields
                        .field("location")
                        .and_then(|location| text_of(location.form_value.as_ref()))
                        .map(|country| format!("You live in {country}. Correct?"))
                        .unwrap_or_default()
                })),
                appear_in_summary: Some(Hook::from_fn(|_, _| false)),
                ..Default::default()
            }),
        FieldDefinition::new("newsletter")
            .help("Subscribe to the newsletter")
            .kind("select")
            .hide_buttons(["Back"])
            .with_hooks(FieldHooks {
                default_value: Some(Hook::from_fn(|_, _| Some(DefaultValue::from("No")))),
                options: Some(Hook::from_fn(|_, _| {
                    vec![FormOption::text("Yes"), FormOption::text("No")]
                })),
                summary_map_value: Some(Hook::from_fn(|field: &FieldState, _: &FieldMap| {
                    match text_of(field.form_value.as_ref()).as_deref() {
                        Some("Yes") => FormOption::new("Subscribed", "Yes"),
                        _ => FormOption::new("Not subscribed", "No"),
                    }
                })),
                exits_form: Some(Hook::from_fn(|_, _| true)),
                ..Default::default()
            }),
    ]
}

pub fn buttons() -> Vec<NavButton> {
    let has_value = |field: &FieldState, _: &FieldMap| !is_empty_value(field.form_value.as_ref());
    vec![
        NavButton::new(0, "Cancel")
            .color(ButtonColor::Danger)
            .slot(ButtonSlot::End),
        NavButton::new(1, "Back").color(ButtonColor::Secondary),
        NavButton::new(2, "Next").state(ButtonStateTable {
            color: Some(
                StatePredicates::new()
                    .when_default(move |field, fields| {
                        if has_value(field, fields) {
                            ButtonColor::Success
                        } else {
                            ButtonColor::Primary
                        }
                    })
                    .when_value(move |field, fields| {
                        if has_value(field, fields) {
                            ButtonColor::Success
                        } else {
                            ButtonColor::Primary
                        }
                    }),
            ),
            disabled: Some(
                StatePredicates::new().when_value(move |field, fields| !has_value(field, fields)),
            ),
            visible: None,
        }),
    ]
}
