//! Helpers consumed by the navigation layer: advancement gates, form exit,
//! the summary view, the final output and button clicks.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use super::executor::HookExecutor;
use super::session::FormSession;
use crate::errors::{Result, WizardError};
use crate::form::{FieldAttr, FieldHooks, FieldId, FormValue, HookError};

/// One line of the review screen, labelled with the field's static help
/// text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryEntry {
    pub id: FieldId,
    pub label: String,
    pub value: Option<FormValue>,
}

/// What a submitted form yields per available field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOutput {
    pub form_value: Option<FormValue>,
    pub computed_value: Option<JsonValue>,
}

pub type FormOutput = IndexMap<FieldId, FieldOutput>;

impl FormSession {
    /// Extra gate before moving past the active field. An absent hook
    /// passes; no active field fails.
    pub async fn before_next(&self) -> Result<bool> {
        let Some(id) = self.active.as_ref() else {
            warn!("no field is active to advance from");
            return Ok(false);
        };
        Ok(self
            .hook(id, FieldHooks::BEFORE_NEXT)
            .await?
            .unwrap_or(true))
    }

    /// Whether the form should finish at the active field.
    pub async fn exits_form(&self) -> Result<bool> {
        let Some(id) = self.active.as_ref() else {
            return Ok(false);
        };
        Ok(self
            .hook(id, FieldHooks::EXITS_FORM)
            .await?
            .unwrap_or(false))
    }

    /// Review entries for available fields, in form order.
    pub async fn summary(&self) -> Result<Vec<SummaryEntry>> {
        let mut entries = Vec::new();
        let definitions: Vec<_> = self.executor.definitions().cloned().collect();
        for definition in definitions {
            let id = definition.id.clone();
            let Some(state) = self.store.state(&id) else {
                continue;
            };
            if !state.is_available {
                continue;
            }
            let appears = self
                .hook(&id, FieldHooks::APPEAR_IN_SUMMARY)
                .await?
                .unwrap_or(true);
            if !appears {
                continue;
            }
            let mapped = self.hook(&id, FieldHooks::SUMMARY_MAP_VALUE).await?;
            entries.push(SummaryEntry {
                value: mapped.map(FormValue::Single).or(state.form_value),
                label: definition.help_text.clone(),
                id,
            });
        }
        Ok(entries)
    }

    /// Values and computed values of every available field.
    pub fn output(&self) -> FormOutput {
        self.field_ids()
            .into_iter()
            .filter_map(|id| {
                let state = self.store.state(&id)?;
                state.is_available.then(|| {
                    let output = FieldOutput {
                        form_value: state.form_value,
                        computed_value: state.computed_value,
                    };
                    (id, output)
                })
            })
            .collect()
    }

    /// Run the click handler of the active field's button called `name`.
    ///
    /// `doAction` runs first, then an `addValue` result goes through
    /// [`set_value`](Self::set_value), then `updateListOptions` replaces the
    /// list options. Returns `false` if there is no such button.
    pub async fn click(&mut self, name: &str) -> Result<bool> {
        let Some(id) = self.active.clone() else {
            warn!(button = name, "no field is active to click on");
            return Ok(false);
        };
        let handler = self.store.state(&id).and_then(|state| {
            state
                .nav_button_props
                .iter()
                .find(|button| button.name == name)
                .map(|button| button.definition().click_handler.clone())
        });
        let Some(handler) = handler else {
            debug!(field = %id, button = name, "no such button");
            return Ok(false);
        };

        let failed = |source: HookError| WizardError::Button {
            field: id.clone(),
            button: name.to_string(),
            source,
        };

        if let Some(action) = &handler.do_action {
            HookExecutor::run(&self.store, &id, action)
                .await
                .map_err(failed)?;
        }
        if let Some(add_value) = &handler.add_value {
            let value = HookExecutor::run(&self.store, &id, add_value)
                .await
                .map_err(failed)?;
            self.set_value(Some(value)).await?;
        }
        if let Some(update) = &handler.update_list_options {
            let options = HookExecutor::run(&self.store, &id, update)
                .await
                .map_err(failed)?;
            self.store.set(&id, FieldAttr::ListOptions(options), true);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{
        ClickHandler, FieldDefinition, FieldHooks, FieldMap, FieldState, FormOption, Hook,
        NavButton,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn session(definitions: Vec<FieldDefinition>, buttons: Vec<NavButton>) -> FormSession {
        let mut session = FormSession::new();
        session.rebuild(definitions, buttons);
        session
    }

    #[tokio::test]
    async fn gates_default_sensibly() {
        let mut s = session(vec![FieldDefinition::new("a")], vec![]);
        assert!(!s.before_next().await.unwrap());
        assert!(!s.exits_form().await.unwrap());
        s.activate("a").await.unwrap();
        assert!(s.before_next().await.unwrap());
        assert!(!s.exits_form().await.unwrap());
    }

    #[tokio::test]
    async fn gates_consult_hooks() {
        let mut s = session(
            vec![FieldDefinition::new("consent").with_hooks(FieldHooks {
                before_next: Some(Hook::from_fn(|field: &FieldState, _: &FieldMap| {
                    field.form_value.is_some()
                })),
                exits_form: Some(Hook::from_fn(|_, _| true)),
                ..Default::default()
            })],
            vec![],
        );
        s.activate("consent").await.unwrap();
        assert!(!s.before_next().await.unwrap());
        s.set_value(Some(FormOption::text("yes").into())).await.unwrap();
        assert!(s.before_next().await.unwrap());
        assert!(s.exits_form().await.unwrap());
    }

    #[tokio::test]
    async fn summary_skips_hidden_and_opted_out_fields() {
        let mut s = session(
            vec![
                FieldDefinition::new("name").help("Name"),
                FieldDefinition::new("secret").with_hooks(FieldHooks {
                    appear_in_summary: Some(Hook::from_fn(|_, _| false)),
                    ..Default::default()
                }),
                FieldDefinition::new("hidden").with_hooks(FieldHooks {
                    condition: Some(Hook::from_fn(|_, _| false)),
                    ..Default::default()
                }),
                FieldDefinition::new("sex").help("Sex").with_hooks(FieldHooks {
                    summary_map_value: Some(Hook::from_fn(|_, _| FormOption::new("Female", "F"))),
                    ..Default::default()
                }),
            ],
            vec![],
        );
        s.activate("name").await.unwrap();
        s.set_value(Some(FormOption::text("Ada").into())).await.unwrap();
        assert!(!s.evaluate_condition("hidden").await);

        let summary = s.summary().await.unwrap();
        assert_eq!(
            summary,
            vec![
                SummaryEntry {
                    id: "name".into(),
                    label: "Name".into(),
                    value: Some(FormOption::text("Ada").into()),
                },
                SummaryEntry {
                    id: "sex".into(),
                    label: "Sex".into(),
                    value: Some(FormOption::new("Female", "F").into()),
                },
            ]
        );
    }

    #[tokio::test]
    async fn output_lists_available_fields_in_order() {
        let mut s = session(
            vec![
                FieldDefinition::new("a"),
                FieldDefinition::new("b").with_hooks(FieldHooks {
                    condition: Some(Hook::from_fn(|_, _| false)),
                    ..Default::default()
                }),
                FieldDefinition::new(7),
            ],
            vec![],
        );
        s.activate("a").await.unwrap();
        s.set_value(Some(FormOption::text("x").into())).await.unwrap();
        s.evaluate_condition("b").await;

        let output = s.output();
        assert_eq!(
            output.keys().cloned().collect::<Vec<_>>(),
            vec![FieldId::from("a"), FieldId::from(7)]
        );
        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            json!({
                "a": {"formValue": {"label": "x", "value": "x"}, "computedValue": null},
                "7": {"formValue": null, "computedValue": null}
            })
        );
    }

    #[tokio::test]
    async fn click_runs_handler_capabilities_in_order() {
        let scan = NavButton::new(5, "Scan").click_handler(ClickHandler {
            do_action: Some(Hook::from_fn(|_, _| ())),
            add_value: Some(Hook::from_fn(|_, _| FormOption::text("scanned").into())),
            update_list_options: Some(Hook::from_fn(|field: &FieldState, _: &FieldMap| {
                field
                    .form_value
                    .as_ref()
                    .map(|v| v.options().to_vec())
                    .unwrap_or_default()
            })),
        });
        let mut s = session(vec![FieldDefinition::new("code")], vec![scan]);
        s.activate("code").await.unwrap();

        assert!(s.click("Scan").await.unwrap());
        let state = s.active_field_state().unwrap();
        assert_eq!(state.form_value, Some(FormOption::text("scanned").into()));
        assert_eq!(state.list_options, vec![FormOption::text("scanned")]);
        assert!(!s.click("Missing").await.unwrap());
    }

    #[tokio::test]
    async fn click_failure_names_the_button() {
        let broken = NavButton::new(1, "Sync").click_handler(ClickHandler {
            do_action: Some(Hook::try_from_fn(|_, _| Err(HookError::new("offline")))),
            ..Default::default()
        });
        let mut s = session(vec![FieldDefinition::new("a")], vec![broken]);
        s.activate("a").await.unwrap();
        let err = s.click("Sync").await.unwrap_err();
        assert!(matches!(err, WizardError::Button { ref button, .. } if button == "Sync"));
    }
}
