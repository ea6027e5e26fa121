use std::env;
use std::sync::OnceLock;

use thiserror::Error;
use tracing::error;

use crate::form::{FieldId, HookError, HookName};

/// Errors surfaced by session operations.
///
/// Validation failures and `onValue` vetoes are not errors; they are
/// reported through the field's `errors` attribute and return values.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("hook `{hook}` on field `{field}` failed: {source}")]
    Hook {
        field: FieldId,
        hook: HookName,
        #[source]
        source: HookError,
    },
    #[error("button `{button}` on field `{field}` failed: {source}")]
    Button {
        field: FieldId,
        button: String,
        #[source]
        source: HookError,
    },
    #[error("no field with id `{0}` in this session")]
    UnknownField(FieldId),
    #[error("another operation is still running on this session")]
    Busy,
    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

pub type Result<T, E = WizardError> = std::result::Result<T, E>;

static INIT: OnceLock<()> = OnceLock::new();

/// Install the color-eyre report hook and the panic handler.
pub fn init() -> color_eyre::Result<()> {
    // idempotent: wenn schon initialisiert, tue nichts
    if INIT.get().is_some() {
        return Ok(());
    }

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .panic_section(format!(
            "This is a bug. Consider reporting it at {}",
            env!("CARGO_PKG_REPOSITORY")
        ))
        .capture_span_trace_by_default(false)
        .display_location_section(false)
        .display_env_section(false)
        .try_into_hooks()?;
    eyre_hook.install()?;

    std::panic::set_hook(Box::new(move |panic_info| {
        #[cfg(not(debug_assertions))]
        {
            use human_panic::{handle_dump, metadata, print_msg};
            let metadata = metadata!();
            let file_path = handle_dump(&metadata, panic_info);
            if print_msg(file_path, &metadata).is_err() {
                eprintln!("{}", panic_hook.panic_report(panic_info));
            }
        }
        let msg = format!("{}", panic_hook.panic_report(panic_info));
        error!("Error: {}", strip_ansi_escapes::strip_str(msg));

        #[cfg(debug_assertions)]
        {
            better_panic::Settings::auto()
                .most_recent_first(false)
                .lineno_suffix(true)
                .verbosity(better_panic::Verbosity::Full)
                .create_panic_handler()(panic_info);
        }

        std::process::exit(libc::EXIT_FAILURE);
    }));

    let _ = INIT.set(());
    Ok(())
}
