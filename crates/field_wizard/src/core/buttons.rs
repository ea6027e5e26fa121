//! Button state resolver.

use super::session::FormSession;
use crate::form::{ButtonEvent, FieldAttr, FieldId, FieldMap, FieldState, StatePredicates};

impl FormSession {
    /// Recompute the dynamic attributes of every button on `id` for `event`.
    ///
    /// Only buttons whose definition carries a state table change, and only
    /// the attributes that have a predicate for `event`. Each predicate sees
    /// the same field and store snapshot.
    pub fn refresh_buttons(&mut self, id: &FieldId, event: ButtonEvent) {
        let Some(field) = self.store.state(id) else {
            return;
        };
        let fields = self.store.snapshot();

        let mut buttons = field.nav_button_props.clone();
        let mut changed = false;
        for button in &mut buttons {
            let (color, disabled, visible) = match &button.definition().state {
                Some(table) => (
                    evaluate(table.color.as_ref(), event, &field, &fields),
                    evaluate(table.disabled.as_ref(), event, &field, &fields),
                    evaluate(table.visible.as_ref(), event, &field, &fields),
                ),
                None => continue,
            };
            if let Some(color) = color {
                changed |= button.color != color;
                button.color = color;
            }
            if let Some(disabled) = disabled {
                changed |= button.disabled != disabled;
                button.disabled = disabled;
            }
            if let Some(visible) = visible {
                changed |= button.visible != visible;
                button.visible = visible;
            }
        }

        if changed {
            self.store.set(id, FieldAttr::NavButtonProps(buttons), false);
        }
    }
}

fn evaluate<T>(
    predicates: Option<&StatePredicates<T>>,
    event: ButtonEvent,
    field: &FieldState,
    fields: &FieldMap,
) -> Option<T> {
    predicates
        .and_then(|predicates| predicates.for_event(event))
        .map(|predicate| predicate(field, fields))
}
