//! Form data model.
//!
//! - `value.rs`  : identifiers, options and field values
//! - `hooks.rs`  : the optional-callback table and hook plumbing
//! - `button.rs` : navigation button definitions and resolved state
//! - `field.rs`  : `FieldDefinition` (static, author supplied)
//! - `state.rs`  : `FieldState` (mutable, runtime)

mod button;
mod field;
mod hooks;
mod state;
mod value;

pub use button::{
    ButtonColor, ButtonDefaults, ButtonEvent, ButtonSize, ButtonSlot, ButtonStateTable,
    ClickHandler, NavButton, Predicate, ResolvedButton, StatePredicates,
};
pub use field::{FieldDefinition, NavButtons};
pub use hooks::{FieldHooks, Hook, HookError, HookName, HookResult, HookSlot};
pub use state::{Attribute, FieldAttr, FieldMap, FieldState};
pub use value::{is_empty_value, DefaultValue, FieldId, FormOption, FormValue, Scalar};
