//! Field state store.
//!
//! Maps every identifier of the current session to its state. Identifiers
//! connected through `proxy_id` links resolve to one shared storage cell, so
//! a value written through one of them is structurally visible through all
//! of them. `index` and `navButtonProps` stay private to each identifier.
//!
//! Non-propagating writes on a proxied field go to that field's private
//! overlay instead of the cell; they shadow the cell for reads through the
//! field's own identifier until a propagating write of the same attribute
//! through any identifier of the cell.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::events::{EventSink, SessionEvent};
use crate::form::{
    Attribute, ButtonDefaults, FieldAttr, FieldDefinition, FieldId, FieldMap, FieldState,
    NavButton, ResolvedButton,
};

#[derive(Debug, Clone)]
struct Entry {
    /// Index into `FieldStore::cells`.
    cell: usize,
    /// Declares a `proxy_id` itself (aliases and plain fields do not).
    proxied: bool,
    index: usize,
    buttons: Vec<ResolvedButton>,
    overlay: Vec<FieldAttr>,
}

impl Entry {
    fn shadows(&self, attribute: Attribute) -> bool {
        self.overlay.iter().any(|attr| attr.attribute() == attribute)
    }
}

#[derive(Debug, Clone)]
pub struct FieldStore {
    entries: IndexMap<FieldId, Entry>,
    cells: Vec<FieldState>,
    events: EventSink,
}

impl FieldStore {
    pub fn new(event_capacity: usize) -> Self {
        Self {
            entries: IndexMap::new(),
            cells: Vec::new(),
            events: EventSink::new(event_capacity),
        }
    }

    /// Discard all state and rebuild it from `definitions`.
    ///
    /// Every definition gets its own entry; every `proxy_id` that is not
    /// itself a field gets an alias entry. Identifiers linked by proxies share
    /// one cell, seeded from the first field of the group.
    pub fn rebuild(
        &mut self,
        definitions: &[Arc<FieldDefinition>],
        default_buttons: &[Arc<NavButton>],
        button_defaults: &ButtonDefaults,
    ) {
        self.entries.clear();
        self.cells.clear();

        let groups = ProxyGroups::from_definitions(definitions);
        let mut cell_of_group: HashMap<usize, usize> = HashMap::new();

        for (index, definition) in definitions.iter().enumerate() {
            let group = groups.group_of(&definition.id);
            let cells = &mut self.cells;
            let cell = *cell_of_group.entry(group).or_insert_with(|| {
                cells.push(FieldState::initial(index, definition.help_text.clone()));
                cells.len() - 1
            });
            let buttons = definition
                .merged_buttons(default_buttons)
                .into_iter()
                .map(|button| ResolvedButton::resolve(button, button_defaults))
                .collect();
            if self.entries.contains_key(&definition.id) {
                warn!(field = %definition.id, "duplicate field id; the later definition wins");
            }
            self.entries.insert(
                definition.id.clone(),
                Entry {
                    cell,
                    proxied: definition.proxy_id.is_some(),
                    index,
                    buttons,
                    overlay: Vec::new(),
                },
            );
        }

        for (index, definition) in definitions.iter().enumerate() {
            let Some(alias) = &definition.proxy_id else {
                continue;
            };
            if self.entries.contains_key(alias) {
                continue;
            }
            let Some(&cell) = cell_of_group.get(&groups.group_of(alias)) else {
                continue;
            };
            self.entries.insert(
                alias.clone(),
                Entry {
                    cell,
                    proxied: false,
                    index,
                    buttons: Vec::new(),
                    overlay: Vec::new(),
                },
            );
        }

        debug!(
            identifiers = self.entries.len(),
            cells = self.cells.len(),
            "field store rebuilt"
        );
        self.events.emit(SessionEvent::Rebuilt {
            fields: definitions.len(),
        });
    }

    pub fn contains(&self, id: &FieldId) -> bool {
        self.entries.contains_key(id)
    }

    /// All identifiers (own and aliased) in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &FieldId> {
        self.entries.keys()
    }

    /// Materialized state as observed through `id`.
    pub fn state(&self, id: &FieldId) -> Option<FieldState> {
        let entry = self.entries.get(id)?;
        let mut state = self.cells.get(entry.cell)?.clone();
        for attr in &entry.overlay {
            attr.apply(&mut state);
        }
        state.index = entry.index;
        state.nav_button_props = entry.buttons.clone();
        Some(state)
    }

    /// Read one attribute; `null` when the identifier is unknown.
    pub fn get(&self, id: &FieldId, attribute: Attribute) -> JsonValue {
        self.state(id)
            .map(|state| state.get(attribute))
            .unwrap_or(JsonValue::Null)
    }

    /// Copy of every identifier's state.
    pub fn snapshot(&self) -> FieldMap {
        self.entries
            .keys()
            .filter_map(|id| self.state(id).map(|state| (id.clone(), state)))
            .collect()
    }

    /// Write one attribute. Returns `false` (and logs) for unknown identifiers.
    ///
    /// With `propagate` the write lands in the shared cell and is visible
    /// through every identifier linked to it; without it, a proxied field
    /// keeps the value to itself.
    pub fn set(&mut self, id: &FieldId, attr: FieldAttr, propagate: bool) -> bool {
        let attribute = attr.attribute();
        let Some(entry) = self.entries.get_mut(id) else {
            warn!(field = %id, %attribute, "cannot set field data with no mounted field");
            return false;
        };

        if attribute.is_private() {
            match attr {
                FieldAttr::Index(index) => entry.index = index,
                FieldAttr::NavButtonProps(buttons) => entry.buttons = buttons,
                _ => {}
            }
        } else if entry.proxied && !propagate {
            entry.overlay.retain(|held| held.attribute() != attribute);
            entry.overlay.push(attr);
        } else {
            let cell = entry.cell;
            for linked in self.entries.values_mut().filter(|linked| linked.cell == cell) {
                linked.overlay.retain(|held| held.attribute() != attribute);
            }
            if let Some(state) = self.cells.get_mut(cell) {
                attr.apply(state);
            }
            self.notify_cell(cell, attribute);
            return true;
        }

        self.events.emit(SessionEvent::AttributeChanged {
            id: id.clone(),
            attribute,
        });
        true
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        self.events.emit(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub(crate) fn sender(&self) -> broadcast::Sender<SessionEvent> {
        self.events.sender()
    }

    fn notify_cell(&self, cell: usize, attribute: Attribute) {
        for (id, entry) in &self.entries {
            if entry.cell == cell && !entry.shadows(attribute) {
                self.events.emit(SessionEvent::AttributeChanged {
                    id: id.clone(),
                    attribute,
                });
            }
        }
    }
}

impl Default for FieldStore {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Disjoint sets of identifiers connected through proxy links.
struct ProxyGroups {
    slots: HashMap<FieldId, usize>,
    parent: Vec<usize>,
}

impl ProxyGroups {
    fn from_definitions(definitions: &[Arc<FieldDefinition>]) -> Self {
        let mut groups = Self {
            slots: HashMap::new(),
            parent: Vec::new(),
        };
        for definition in definitions {
            let own = groups.slot(&definition.id);
            if let Some(proxy) = &definition.proxy_id {
                let linked = groups.slot(proxy);
                groups.union(own, linked);
            }
        }
        groups
    }

    fn slot(&mut self, id: &FieldId) -> usize {
        if let Some(&slot) = self.slots.get(id) {
            return slot;
        }
        let slot = self.parent.len();
        self.parent.push(slot);
        self.slots.insert(id.clone(), slot);
        slot
    }

    fn find(&self, mut slot: usize) -> usize {
        while self.parent[slot] != slot {
            slot = self.parent[slot];
        }
        slot
    }

    fn union(&mut self, a: usize, b: usize) {
        let (a, b) = (self.find(a), self.find(b));
        if a != b {
            self.parent[b] = a;
        }
    }

    /// Representative of the identifier's group; unseen identifiers form
    /// their own group.
    fn group_of(&self, id: &FieldId) -> usize {
        self.slots
            .get(id)
            .map_or(usize::MAX, |&slot| self.find(slot))
    }
}
