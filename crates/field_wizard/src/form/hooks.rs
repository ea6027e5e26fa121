//! Lifecycle hooks attached to a field definition.
//!
//! Every hook receives an owned snapshot of the field's own state plus a
//! shared snapshot of the whole store, and resolves asynchronously. Sync
//! closures are lifted with [`Hook::from_fn`] / [`Hook::try_from_fn`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use thiserror::Error;

use super::{DefaultValue, FieldMap, FieldState, FormOption, FormValue};

/// Failure raised from inside a hook callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HookError {
    message: String,
}

impl HookError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type HookResult<T> = Result<T, HookError>;

type HookFn<T> =
    dyn Fn(FieldState, Arc<FieldMap>) -> BoxFuture<'static, HookResult<T>> + Send + Sync;

/// A type-erased, cheaply cloneable async callback producing `T`.
pub struct Hook<T> {
    call: Arc<HookFn<T>>,
}

impl<T> Clone for Hook<T> {
    fn clone(&self) -> Self {
        Self {
            call: Arc::clone(&self.call),
        }
    }
}

impl<T> fmt::Debug for Hook<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Hook(..)")
    }
}

impl<T: Send + 'static> Hook<T> {
    /// Wrap an async callback.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(FieldState, Arc<FieldMap>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult<T>> + Send + 'static,
    {
        Self {
            call: Arc::new(move |field, fields| f(field, fields).boxed()),
        }
    }

    /// Wrap an infallible synchronous callback.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&FieldState, &FieldMap) -> T + Send + Sync + 'static,
    {
        Self {
            call: Arc::new(move |field, fields| future::ready(Ok(f(&field, &fields))).boxed()),
        }
    }

    /// Wrap a synchronous callback that may fail.
    pub fn try_from_fn<F>(f: F) -> Self
    where
        F: Fn(&FieldState, &FieldMap) -> HookResult<T> + Send + Sync + 'static,
    {
        Self {
            call: Arc::new(move |field, fields| future::ready(f(&field, &fields)).boxed()),
        }
    }

    pub(crate) fn call(
        &self,
        field: FieldState,
        fields: Arc<FieldMap>,
    ) -> BoxFuture<'static, HookResult<T>> {
        (self.call)(field, fields)
    }
}

/// Names of the recognized hooks, as they appear in logs and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString, EnumIter)]
#[strum(serialize_all = "camelCase")]
pub enum HookName {
    Onload,
    Unload,
    DefaultValue,
    DynamicHelpText,
    Options,
    IsRequired,
    Validation,
    ComputedValue,
    OnValue,
    OnValueUpdate,
    UpdateHelpTextOnValue,
    Condition,
    OnConditionFalse,
    DefaultOutput,
    DefaultComputedOutput,
    ExitsForm,
    BeforeNext,
    SummaryMapValue,
    AppearInSummary,
}

/// The optional-callback table of a field definition.
///
/// Absent entries mean "hook not declared": the executor then yields no
/// result and each pipeline falls back to its documented default.
#[derive(Debug, Clone, Default)]
pub struct FieldHooks {
    /// Field enter side effect.
    pub onload: Option<Hook<()>>,
    /// Field exit side effect.
    pub unload: Option<Hook<()>>,
    /// Seed value on first mount.
    pub default_value: Option<Hook<Option<DefaultValue>>>,
    /// Help text recomputed on activation; empty keeps the static text.
    pub dynamic_help_text: Option<Hook<String>>,
    /// Selectable options recomputed on activation.
    pub options: Option<Hook<Vec<FormOption>>>,
    pub is_required: Option<Hook<bool>>,
    /// Error messages; an empty list means valid.
    pub validation: Option<Hook<Vec<String>>>,
    /// Secondary output derived from the value; `Null` clears it.
    pub computed_value: Option<Hook<serde_json::Value>>,
    /// Veto gate: returning `false` aborts the value write.
    pub on_value: Option<Hook<bool>>,
    /// Replacement list options after a value write.
    pub on_value_update: Option<Hook<Option<Vec<FormOption>>>>,
    /// Replacement help text after a value write; empty keeps the current text.
    pub update_help_text_on_value: Option<Hook<String>>,
    /// Show/hide decision.
    pub condition: Option<Hook<bool>>,
    /// Cleanup when the condition hides the field.
    pub on_condition_false: Option<Hook<()>>,
    /// Value applied while hidden.
    pub default_output: Option<Hook<Option<FormValue>>>,
    /// Computed value applied while hidden.
    pub default_computed_output: Option<Hook<serde_json::Value>>,
    /// Finish the form from this field instead of moving on.
    pub exits_form: Option<Hook<bool>>,
    /// Extra gate consulted by the navigation layer before advancing.
    pub before_next: Option<Hook<bool>>,
    /// Summary rendering of the field's value.
    pub summary_map_value: Option<Hook<FormOption>>,
    pub appear_in_summary: Option<Hook<bool>>,
}

/// A hook name bound to the one table entry it reads.
pub struct HookSlot<T> {
    pub name: HookName,
    select: for<'a> fn(&'a FieldHooks) -> Option<&'a Hook<T>>,
}

impl<T> Clone for HookSlot<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for HookSlot<T> {}

impl<T> HookSlot<T> {
    pub fn get<'a>(&self, hooks: &'a FieldHooks) -> Option<&'a Hook<T>> {
        (self.select)(hooks)
    }
}

macro_rules! hook_slots {
    ($($slot:ident: $name:ident => $field:ident: $ty:ty,)*) => {
        impl FieldHooks {
            $(
                pub const $slot: HookSlot<$ty> = HookSlot {
                    name: HookName::$name,
                    select: {
                        fn select(hooks: &FieldHooks) -> Option<&Hook<$ty>> {
                            hooks.$field.as_ref()
                        }
                        select
                    },
                };
            )*
        }
    };
}

hook_slots! {
    ONLOAD: Onload => onload: (),
    UNLOAD: Unload => unload: (),
    DEFAULT_VALUE: DefaultValue => default_value: Option<DefaultValue>,
    DYNAMIC_HELP_TEXT: DynamicHelpText => dynamic_help_text: String,
    OPTIONS: Options => options: Vec<FormOption>,
    IS_REQUIRED: IsRequired => is_required: bool,
    VALIDATION: Validation => validation: Vec<String>,
    COMPUTED_VALUE: ComputedValue => computed_value: serde_json::Value,
    ON_VALUE: OnValue => on_value: bool,
    ON_VALUE_UPDATE: OnValueUpdate => on_value_update: Option<Vec<FormOption>>,
    UPDATE_HELP_TEXT_ON_VALUE: UpdateHelpTextOnValue => update_help_text_on_value: String,
    CONDITION: Condition => condition: bool,
    ON_CONDITION_FALSE: OnConditionFalse => on_condition_false: (),
    DEFAULT_OUTPUT: DefaultOutput => default_output: Option<FormValue>,
    DEFAULT_COMPUTED_OUTPUT: DefaultComputedOutput => default_computed_output: serde_json::Value,
    EXITS_FORM: ExitsForm => exits_form: bool,
    BEFORE_NEXT: BeforeNext => before_next: bool,
    SUMMARY_MAP_VALUE: SummaryMapValue => summary_map_value: FormOption,
    APPEAR_IN_SUMMARY: AppearInSummary => appear_in_summary: bool,
}
