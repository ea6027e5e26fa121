/*!
Hook executor.

Looks up a field's definition, takes the two snapshots every hook receives
(the field's own state and the whole store) and awaits the callback. One
invocation at a time: callers await each hook before issuing the next, so
hooks never overlap within a top-level operation.

Absent definitions and absent hooks both yield `Ok(None)`; each pipeline
maps that to its documented default. A hook returning `Err` is wrapped into
`WizardError::Hook` and left to the caller to propagate or swallow.
*/

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::trace;

use super::store::FieldStore;
use crate::errors::{Result, WizardError};
use crate::form::{FieldDefinition, FieldId, Hook, HookResult, HookSlot};

#[derive(Debug, Clone, Default)]
pub struct HookExecutor {
    definitions: IndexMap<FieldId, Arc<FieldDefinition>>,
}

impl HookExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the registered definitions.
    pub fn register(&mut self, definitions: &[Arc<FieldDefinition>]) {
        self.definitions = definitions
            .iter()
            .map(|definition| (definition.id.clone(), Arc::clone(definition)))
            .collect();
    }

    pub fn definition(&self, id: &FieldId) -> Option<&Arc<FieldDefinition>> {
        self.definitions.get(id)
    }

    /// Own field definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &Arc<FieldDefinition>> {
        self.definitions.values()
    }

    /// Invoke the callback `slot` names in the field's table.
    pub async fn invoke<T>(
        &self,
        store: &FieldStore,
        id: &FieldId,
        slot: HookSlot<T>,
    ) -> Result<Option<T>>
    where
        T: Send + 'static,
    {
        let Some(hook) = self
            .definitions
            .get(id)
            .and_then(|definition| slot.get(&definition.hooks))
            .cloned()
        else {
            return Ok(None);
        };

        let name = slot.name;
        trace!(field = %id, hook = %name, "invoking hook");
        Self::run(store, id, &hook)
            .await
            .map(Some)
            .map_err(|source| WizardError::Hook {
                field: id.clone(),
                hook: name,
                source,
            })
    }

    /// Call a hook that does not live in a definition's table (click
    /// handlers) with the usual snapshots of `id`.
    pub async fn run<T>(store: &FieldStore, id: &FieldId, hook: &Hook<T>) -> HookResult<T>
    where
        T: Send + 'static,
    {
        let field = store.state(id).unwrap_or_default();
        let fields = Arc::new(store.snapshot());
        hook.call(field, fields).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{ButtonDefaults, FieldHooks, FieldMap, FieldState, HookError, HookName};
    use pretty_assertions::assert_eq;

    fn setup(definitions: Vec<FieldDefinition>) -> (HookExecutor, FieldStore) {
        let definitions: Vec<_> = definitions.into_iter().map(Arc::new).collect();
        let mut executor = HookExecutor::new();
        executor.register(&definitions);
        let mut store = FieldStore::default();
        store.rebuild(&definitions, &[], &ButtonDefaults::default());
        (executor, store)
    }

    #[tokio::test]
    async fn absent_hook_yields_none() {
        let (executor, store) = setup(vec![FieldDefinition::new("name")]);
        let id = FieldId::from("name");
        let out = executor
            .invoke(&store, &id, FieldHooks::IS_REQUIRED)
            .await
            .unwrap();
        assert_eq!(out, None);
        let missing = FieldId::from("ghost");
        let out = executor
            .invoke(&store, &missing, FieldHooks::IS_REQUIRED)
            .await
            .unwrap();
        assert_eq!(out, None);
    }

    #[tokio::test]
    async fn hook_receives_field_and_store_snapshots() {
        let (executor, store) = setup(vec![
            FieldDefinition::new("first"),
            FieldDefinition::new("second").with_hooks(FieldHooks {
                dynamic_help_text: Some(Hook::from_fn(|field: &FieldState, all: &FieldMap| {
                    format!("{} of {}", field.index + 1, all.len())
                })),
                ..Default::default()
            }),
        ]);
        let id = FieldId::from("second");
        let out = executor
            .invoke(&store, &id, FieldHooks::DYNAMIC_HELP_TEXT)
            .await
            .unwrap();
        assert_eq!(out.as_deref(), Some("2 of 2"));
    }

    #[tokio::test]
    async fn hook_failure_is_tagged_with_field_and_name() {
        let (executor, store) = setup(vec![FieldDefinition::new("name").with_hooks(
            FieldHooks {
                onload: Some(Hook::try_from_fn(|_, _| Err(HookError::new("offline")))),
                ..Default::default()
            },
        )]);
        let id = FieldId::from("name");
        let err = executor
            .invoke(&store, &id, FieldHooks::ONLOAD)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WizardError::Hook { hook: HookName::Onload, ref field, .. } if field == &id
        ));
    }
}
