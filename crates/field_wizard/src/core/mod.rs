//! The form engine.
//!
//! - `store.rs`      : identifier -> state cells, proxy sharing
//! - `executor.rs`   : hook invocation with field/store snapshots
//! - `session.rs`    : `FormSession` and the activation state machine
//! - `value.rs`      : value pipeline
//! - `compute.rs`    : required/validation/compute pipeline, clears
//! - `condition.rs`  : show/hide evaluation
//! - `buttons.rs`    : navigation button state
//! - `navigation.rs` : gates, summary, output and clicks
//! - `events.rs`     : change notifications
//! - `shared.rs`     : multi-caller session handle

mod buttons;
mod compute;
mod condition;
mod events;
mod executor;
mod navigation;
mod session;
mod shared;
mod store;
mod value;

pub use events::SessionEvent;
pub use executor::HookExecutor;
pub use navigation::{FieldOutput, FormOutput, SummaryEntry};
pub use session::FormSession;
pub use shared::SharedSession;
pub use store::FieldStore;
