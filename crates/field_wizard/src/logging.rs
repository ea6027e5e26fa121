use color_eyre::Result;
use lazy_static::lazy_static;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{Config, PROJECT_NAME};

lazy_static! {
    pub static ref LOG_ENV: String = format!("{}_LOGLEVEL", PROJECT_NAME.clone());
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_CRATE_NAME"));
}

/// Install the global subscriber: a file layer in the data directory plus
/// the span-trace layer color-eyre reads.
///
/// `RUST_LOG` wins over `FIELD_WIZARD_LOGLEVEL`; without either the level is
/// `info`. Keep the returned guard alive until exit or buffered lines are
/// lost.
pub fn init(config: &Config) -> Result<WorkerGuard> {
    let directory = &config.config.data_dir;
    std::fs::create_dir_all(directory)?;

    let env_filter = EnvFilter::builder().with_default_directive(tracing::Level::INFO.into());
    let env_filter = env_filter
        .try_from_env()
        .or_else(|_| env_filter.with_env_var(LOG_ENV.clone()).from_env())?;

    let file_appender = tracing_appender::rolling::never(directory, LOG_FILE.as_str());
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_writer(non_blocking)
        .with_target(false)
        .with_ansi(false)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(ErrorLayer::default())
        .try_init()?;
    Ok(guard)
}
