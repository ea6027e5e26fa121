//! Value pipeline: writing a new value to the active field.

use tracing::{debug, warn};

use super::session::FormSession;
use crate::errors::Result;
use crate::form::{ButtonEvent, FieldAttr, FieldHooks, FormValue};

impl FormSession {
    /// Write `value` to the active field.
    ///
    /// Clears errors, consults the `onValue` gate, records dirtiness, stores
    /// the value, refreshes buttons for the `onValue` event, then lets
    /// `onValueUpdate` and `updateHelpTextOnValue` refresh list options and
    /// help text. Returns `false` when no field is active or the gate vetoed
    /// the write.
    pub async fn set_value(&mut self, value: Option<FormValue>) -> Result<bool> {
        let Some(id) = self.active.clone() else {
            warn!("no field is active to set a value to");
            return Ok(false);
        };

        self.store.set(&id, FieldAttr::Errors(Vec::new()), true);

        let accepted = self.hook(&id, FieldHooks::ON_VALUE).await?;
        if accepted == Some(false) {
            debug!(field = %id, "value vetoed by onValue");
            return Ok(false);
        }

        let current = self.store.state(&id).and_then(|state| state.form_value);
        let is_dirty = value != current;
        self.store.set(&id, FieldAttr::IsDirty(is_dirty), true);
        self.store.set(&id, FieldAttr::FormValue(value), true);

        self.refresh_buttons(&id, ButtonEvent::OnValue);

        let list_update = self
            .hook(&id, FieldHooks::ON_VALUE_UPDATE)
            .await?
            .flatten();
        if let Some(options) = list_update {
            self.store.set(&id, FieldAttr::ListOptions(options), false);
        }

        let help_text = self.hook(&id, FieldHooks::UPDATE_HELP_TEXT_ON_VALUE).await?;
        if let Some(text) = help_text.filter(|text| !text.is_empty()) {
            self.store.set(&id, FieldAttr::HelpText(text), true);
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::FormSession;
    use crate::form::{
        Attribute, FieldDefinition, FieldHooks, FieldMap, FieldState, FormOption, FormValue, Hook,
        HookError, HookName, NavButton,
    };
    use crate::errors::WizardError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn option(text: &str) -> Option<FormValue> {
        Some(FormOption::text(text).into())
    }

    async fn active(definition: FieldDefinition) -> FormSession {
        let id = definition.id.clone();
        let mut session = FormSession::new();
        session.rebuild([definition], Vec::<NavButton>::new());
        session.activate(id).await.unwrap();
        session
    }

    #[tokio::test]
    async fn write_without_active_field_is_a_no_op() {
        let mut session = FormSession::new();
        session.rebuild([FieldDefinition::new("a")], Vec::<NavButton>::new());
        assert!(!session.set_value(option("x")).await.unwrap());
        assert_eq!(session.attribute("a", Attribute::FormValue), json!(null));
    }

    #[tokio::test]
    async fn veto_leaves_value_untouched_but_clears_errors() {
        let mut session = active(FieldDefinition::new("age").with_hooks(FieldHooks {
            on_value: Some(Hook::from_fn(|_, _| false)),
            ..Default::default()
        }))
        .await;
        session
            .store
            .set(&"age".into(), crate::form::FieldAttr::Errors(vec!["old".into()]), true);

        assert!(!session.set_value(option("12")).await.unwrap());
        let state = session.active_field_state().unwrap();
        assert_eq!(state.form_value, None);
        assert!(state.errors.is_empty());
    }

    #[tokio::test]
    async fn dirty_flag_tracks_structural_change() {
        let mut session = active(FieldDefinition::new("name")).await;
        session.set_value(option("Ada")).await.unwrap();
        assert!(session.active_field_state().unwrap().is_dirty);
        session.set_value(option("Ada")).await.unwrap();
        assert!(!session.active_field_state().unwrap().is_dirty);
        session.set_value(None).await.unwrap();
        let state = session.active_field_state().unwrap();
        assert!(state.is_dirty);
        assert_eq!(state.form_value, None);
    }

    #[tokio::test]
    async fn value_update_hooks_refresh_options_and_help() {
        let mut session = active(
            FieldDefinition::new("district")
                .help("Pick a district")
                .with_hooks(FieldHooks {
                    on_value_update: Some(Hook::from_fn(|field: &FieldState, _: &FieldMap| {
                        field
                            .form_value
                            .as_ref()
                            .map(|value| value.options().to_vec())
                    })),
                    update_help_text_on_value: Some(Hook::from_fn(
                        |field: &FieldState, _: &FieldMap| {
                            if field.form_value.is_some() {
                                "Thanks".to_string()
                            } else {
                                String::new()
                            }
                        },
                    )),
                    ..Default::default()
                }),
        )
        .await;
        assert_eq!(session.attribute("district", Attribute::HelpText), json!("Pick a district"));

        session.set_value(option("Lilongwe")).await.unwrap();
        let state = session.active_field_state().unwrap();
        assert_eq!(state.list_options, vec![FormOption::text("Lilongwe")]);
        assert_eq!(state.help_text, "Thanks");
    }

    #[tokio::test]
    async fn hook_failure_aborts_the_rest_of_the_pipeline() {
        let mut session = active(FieldDefinition::new("a").with_hooks(FieldHooks {
            on_value_update: Some(Hook::try_from_fn(|field: &FieldState, _: &FieldMap| {
                if field.form_value.is_some() {
                    Err(HookError::new("lookup failed"))
                } else {
                    Ok(None)
                }
            })),
            update_help_text_on_value: Some(Hook::from_fn(|_, _| "unreachable".to_string())),
            ..Default::default()
        }))
        .await;
        let err = session.set_value(option("x")).await.unwrap_err();
        assert!(matches!(err, WizardError::Hook { hook: HookName::OnValueUpdate, .. }));
        let state = session.active_field_state().unwrap();
        assert_eq!(state.form_value, option("x"));
        assert_eq!(state.help_text, "");
    }
}
