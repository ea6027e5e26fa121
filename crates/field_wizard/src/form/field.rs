//! Field definitions: the static, author-supplied half of the form system.
//!
//! A definition is pure data plus callbacks; it has no behaviour of its own.
//! Runtime values live in `FieldState` and are driven by the session.
//!
//! ```ignore
//! use field_wizard::form::{FieldDefinition, FieldHooks, Hook};
//!
//! let field = FieldDefinition::new("name")
//!     .help("Your full name")
//!     .with_hooks(FieldHooks {
//!         is_required: Some(Hook::from_fn(|_, _| true)),
//!         ..Default::default()
//!     });
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map as JsonMap, Value as JsonValue};

use super::{FieldHooks, FieldId, NavButton};

/// Per-field overrides of the session's default navigation buttons.
#[derive(Debug, Clone, Default)]
pub struct NavButtons {
    /// Names of default buttons this field does not show.
    pub hide: Vec<String>,
    /// Extra buttons; one sharing an index with a default button replaces it.
    pub custom: Vec<Arc<NavButton>>,
}

/// Declarative description of one field.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub id: FieldId,
    /// Identifier whose state this field shares.
    pub proxy_id: Option<FieldId>,
    /// Static help text, used until a hook supplies a better one.
    pub help_text: String,
    /// Free-form widget kind understood by the rendering layer.
    pub kind: String,
    pub require_next: bool,
    pub hooks: FieldHooks,
    pub nav_buttons: NavButtons,
    pub config: JsonMap<String, JsonValue>,
}

impl FieldDefinition {
    pub fn new(id: impl Into<FieldId>) -> Self {
        Self {
            id: id.into(),
            proxy_id: None,
            help_text: String::new(),
            kind: String::new(),
            require_next: false,
            hooks: FieldHooks::default(),
            nav_buttons: NavButtons::default(),
            config: JsonMap::new(),
        }
    }

    /// Share state with another identifier.
    pub fn proxy(mut self, proxy_id: impl Into<FieldId>) -> Self {
        self.proxy_id = Some(proxy_id.into());
        self
    }

    pub fn help(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = help_text.into();
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn require_next(mut self, require_next: bool) -> Self {
        self.require_next = require_next;
        self
    }

    pub fn with_hooks(mut self, hooks: FieldHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn hide_buttons<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nav_buttons.hide.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn custom_button(mut self, button: NavButton) -> Self {
        self.nav_buttons.custom.push(Arc::new(button));
        self
    }

    pub fn config_entry(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.config.insert(key.into(), value);
        self
    }

    /// The buttons this field shows, sorted by ascending index.
    ///
    /// Defaults named in the hide list are dropped, then custom buttons are
    /// merged in by index (last writer wins).
    pub fn merged_buttons(&self, defaults: &[Arc<NavButton>]) -> Vec<Arc<NavButton>> {
        let mut by_index: BTreeMap<i32, Arc<NavButton>> = BTreeMap::new();
        let visible = defaults
            .iter()
            .filter(|button| !self.nav_buttons.hide.contains(&button.name));
        for button in visible.chain(self.nav_buttons.custom.iter()) {
            by_index.insert(button.index, Arc::clone(button));
        }
        by_index.into_values().collect()
    }
}
