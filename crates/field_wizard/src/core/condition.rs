//! Condition evaluator.
//!
//! The only place where hook failures are swallowed: any error while
//! evaluating a condition makes the field unavailable.

use tracing::debug;

use super::session::FormSession;
use crate::errors::Result;
use crate::form::{FieldAttr, FieldHooks, FieldId};

impl FormSession {
    /// Decide whether `id` is shown.
    ///
    /// A missing or `true` condition marks the field available. A `false`
    /// one runs `onConditionFalse`, applies `defaultOutput` and
    /// `defaultComputedOutput` and marks it unavailable. Unknown
    /// identifiers are unavailable.
    pub async fn evaluate_condition(&mut self, id: impl Into<FieldId>) -> bool {
        let id = id.into();
        if !self.store.contains(&id) {
            debug!(field = %id, "condition on unknown field");
            return false;
        }
        match self.apply_condition(&id).await {
            Ok(available) => available,
            Err(err) => {
                debug!(field = %id, error = %err, "condition failed, field hidden");
                self.store.set(&id, FieldAttr::IsAvailable(false), true);
                false
            }
        }
    }

    async fn apply_condition(&mut self, id: &FieldId) -> Result<bool> {
        let shown = self
            .hook(id, FieldHooks::CONDITION)
            .await?
            .unwrap_or(true);
        if shown {
            self.store.set(id, FieldAttr::IsAvailable(true), true);
            return Ok(true);
        }

        self.hook(id, FieldHooks::ON_CONDITION_FALSE).await?;
        let output = self
            .hook(id, FieldHooks::DEFAULT_OUTPUT)
            .await?
            .flatten();
        let computed = self
            .hook(id, FieldHooks::DEFAULT_COMPUTED_OUTPUT)
            .await?
            .filter(|value| !value.is_null());

        self.store.set(id, FieldAttr::FormValue(output), true);
        self.store.set(id, FieldAttr::ComputedValue(computed), true);
        self.store.set(id, FieldAttr::IsAvailable(false), true);
        debug!(field = %id, "condition false, field hidden");
        Ok(false)
    }
}
