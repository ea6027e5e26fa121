//! Runtime engine for multi-step, field-driven form wizards.
//!
//! Field definitions (with optional lifecycle hooks) go in, per-field state
//! (value, errors, help text, options, button state) comes out. One field is
//! active at a time; [`FormSession`] drives the hook pipelines whenever the
//! active field changes, a value is written or the form wants to advance.

pub mod cli;
pub mod config;
pub mod core;
pub mod demo;
pub mod errors;
pub mod form;
pub mod logging;

pub use crate::config::{ConcurrencyPolicy, EngineConfig};
pub use crate::core::{
    FieldOutput, FieldStore, FormOutput, FormSession, HookExecutor, SessionEvent, SharedSession,
    SummaryEntry,
};
pub use crate::errors::{Result, WizardError};
