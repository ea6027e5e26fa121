//! Validation/compute pipeline and explicit clears.

use tracing::{debug, warn};

use super::session::FormSession;
use crate::errors::Result;
use crate::form::{is_empty_value, FieldAttr, FieldHooks, FieldId};

impl FormSession {
    /// Gate advancement from the active field.
    ///
    /// Short-circuits on the first failure: required-but-empty, then a
    /// non-empty `validation` result. On success the `computedValue` hook
    /// result is stored.
    pub async fn compute_field_data(&mut self) -> Result<bool> {
        let Some(id) = self.active.clone() else {
            warn!("no field is active to compute data for");
            return Ok(false);
        };
        let value = self.store.state(&id).and_then(|state| state.form_value);

        let required = self
            .hook(&id, FieldHooks::IS_REQUIRED)
            .await?
            .unwrap_or(false);
        self.store.set(&id, FieldAttr::IsRequired(required), false);
        if required && is_empty_value(value.as_ref()) {
            debug!(field = %id, "required field is empty");
            let message = self.config.required_message.clone();
            self.store.set(&id, FieldAttr::Errors(vec![message]), false);
            return Ok(false);
        }

        let errors = self
            .hook(&id, FieldHooks::VALIDATION)
            .await?
            .unwrap_or_default();
        if !errors.is_empty() {
            debug!(field = %id, errors = errors.len(), "validation failed");
            self.store.set(&id, FieldAttr::Errors(errors), true);
            return Ok(false);
        }

        let computed = self
            .hook(&id, FieldHooks::COMPUTED_VALUE)
            .await?
            .filter(|value| !value.is_null());
        self.store.set(&id, FieldAttr::ComputedValue(computed), true);
        Ok(true)
    }

    /// Reset `errors`, `formValue` and `computedValue` of `id` and bump its
    /// clear counter. Returns `false` for unknown identifiers.
    pub fn clear_field_data(&mut self, id: impl Into<FieldId>) -> bool {
        let id = id.into();
        let Some(state) = self.store.state(&id) else {
            warn!(field = %id, "cannot clear data of a field that is not mounted");
            return false;
        };
        self.store.set(&id, FieldAttr::Errors(Vec::new()), true);
        self.store.set(&id, FieldAttr::FormValue(None), true);
        self.store.set(&id, FieldAttr::ComputedValue(None), true);
        self.store.set(
            &id,
            FieldAttr::ValueClearCount(state.value_clear_count + 1),
            true,
        );
        true
    }
}
