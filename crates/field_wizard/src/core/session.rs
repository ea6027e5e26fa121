/*!
Form session: owns the field store, the registered definitions and the
active-field pointer.

A session is built once per form with [`FormSession::rebuild`]; every
rebuild is a full reset. The navigation layer then drives it:

```ignore
session.rebuild(definitions, default_buttons);
if session.evaluate_condition(&id).await {
    session.activate(id).await?;
    session.set_value(Some(value)).await?;
    let may_advance = session.compute_field_data().await?;
}
```

Top-level operations take `&mut self`, so one owner cannot interleave them.
Use [`SharedSession`](super::SharedSession) for multiple callers.

The pipelines live next door: `value.rs` (set_value), `compute.rs`
(compute_field_data / clear_field_data), `condition.rs`, `buttons.rs` and
`navigation.rs`.
*/

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value as JsonValue;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::events::SessionEvent;
use super::executor::HookExecutor;
use super::store::FieldStore;
use crate::config::EngineConfig;
use crate::errors::{Result, WizardError};
use crate::form::{
    Attribute, ButtonEvent, DefaultValue, FieldAttr, FieldDefinition, FieldHooks, FieldId,
    FieldMap, FieldState, FormOption, HookSlot, NavButton,
};

#[derive(Debug)]
pub struct FormSession {
    pub(super) config: EngineConfig,
    pub(super) executor: HookExecutor,
    pub(super) store: FieldStore,
    pub(super) active: Option<FieldId>,
}

impl Default for FormSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FormSession {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            store: FieldStore::new(config.event_capacity),
            executor: HookExecutor::new(),
            active: None,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Discard all state and rebuild it from `definitions`.
    ///
    /// The active pointer is reset; no hooks run.
    pub fn rebuild<D, B>(&mut self, definitions: D, default_buttons: B)
    where
        D: IntoIterator<Item = FieldDefinition>,
        B: IntoIterator<Item = NavButton>,
    {
        let definitions: Vec<Arc<FieldDefinition>> =
            definitions.into_iter().map(Arc::new).collect();
        let default_buttons: Vec<Arc<NavButton>> =
            default_buttons.into_iter().map(Arc::new).collect();

        self.active = None;
        self.executor.register(&definitions);
        self.store
            .rebuild(&definitions, &default_buttons, &self.config.buttons);
        info!(
            fields = definitions.len(),
            buttons = default_buttons.len(),
            "form session rebuilt"
        );
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.store.subscribe()
    }

    pub fn active_field(&self) -> Option<&FieldId> {
        self.active.as_ref()
    }

    /// Snapshot of the active field's state.
    pub fn active_field_state(&self) -> Option<FieldState> {
        self.active.as_ref().and_then(|id| self.store.state(id))
    }

    pub fn field_state(&self, id: impl Into<FieldId>) -> Option<FieldState> {
        self.store.state(&id.into())
    }

    /// Proxy-aware read; `null` for unknown identifiers.
    pub fn attribute(&self, id: impl Into<FieldId>, attribute: Attribute) -> JsonValue {
        self.store.get(&id.into(), attribute)
    }

    /// Like [`attribute`](Self::attribute), addressed by the camelCase name.
    pub fn attribute_by_name(&self, id: impl Into<FieldId>, name: &str) -> JsonValue {
        match Attribute::from_str(name) {
            Ok(attribute) => self.attribute(id, attribute),
            Err(_) => JsonValue::Null,
        }
    }

    pub fn fields(&self) -> FieldMap {
        self.store.snapshot()
    }

    pub fn store(&self) -> &FieldStore {
        &self.store
    }

    pub fn definition(&self, id: &FieldId) -> Option<&Arc<FieldDefinition>> {
        self.executor.definition(id)
    }

    /// Own field identifiers in form order (aliases excluded).
    pub fn field_ids(&self) -> Vec<FieldId> {
        self.executor
            .definitions()
            .map(|definition| definition.id.clone())
            .collect()
    }

    pub fn update_active_field_list_options(&mut self, options: Vec<FormOption>) -> bool {
        let Some(id) = self.active.clone() else {
            warn!("no field is active to update list options on");
            return false;
        };
        self.store.set(&id, FieldAttr::ListOptions(options), true)
    }

    /// Move the active pointer to `id` and run the activation sequence.
    ///
    /// `unload` of the previous field, `onload` of the new one, the
    /// first-mount default value (once per field), button refresh, help
    /// text, options and the load timestamp. Hook failures propagate.
    pub async fn activate(&mut self, id: impl Into<FieldId>) -> Result<()> {
        let id = id.into();
        if !self.store.contains(&id) {
            return Err(WizardError::UnknownField(id));
        }

        if let Some(current) = self.active.clone() {
            self.hook(&current, FieldHooks::UNLOAD).await?;
        }

        let previous = self.active.replace(id.clone());
        debug!(field = %id, previous = ?previous, "field activated");
        self.store.emit(SessionEvent::Activated {
            id: id.clone(),
            previous,
        });

        self.hook(&id, FieldHooks::ONLOAD).await?;

        let initialized = self.store.state(&id).is_some_and(|state| state.init);
        if !initialized {
            self.store.set(&id, FieldAttr::Init(true), true);
            let seed = self
                .hook(&id, FieldHooks::DEFAULT_VALUE)
                .await?
                .flatten()
                .map(DefaultValue::into_form_value);
            self.store
                .set(&id, FieldAttr::DefaultValue(seed.clone()), true);
            self.set_value(seed).await?;
        }

        self.refresh_buttons(&id, ButtonEvent::Default);

        let help_text = match self.hook(&id, FieldHooks::DYNAMIC_HELP_TEXT).await? {
            Some(text) if !text.is_empty() => text,
            _ => self.static_help_text(&id),
        };
        self.store.set(&id, FieldAttr::HelpText(help_text), true);

        let options = self
            .hook(&id, FieldHooks::OPTIONS)
            .await?
            .unwrap_or_default();
        self.store.set(&id, FieldAttr::ListOptions(options), true);

        let now = Utc::now().timestamp_millis();
        self.store
            .set(&id, FieldAttr::IntLastTimeLoaded(Some(now)), true);
        Ok(())
    }

    pub(super) async fn hook<T>(&self, id: &FieldId, slot: HookSlot<T>) -> Result<Option<T>>
    where
        T: Send + 'static,
    {
        self.executor.invoke(&self.store, id, slot).await
    }

    /// The definition's static help text; aliases fall back to their
    /// current text.
    fn static_help_text(&self, id: &FieldId) -> String {
        match self.executor.definition(id) {
            Some(definition) => definition.help_text.clone(),
            None => self
                .store
                .state(id)
                .map(|state| state.help_text)
                .unwrap_or_default(),
        }
    }
}
