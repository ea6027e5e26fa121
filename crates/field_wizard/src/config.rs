use std::{env, path::Path, path::PathBuf};

use directories::ProjectDirs;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

use crate::form::ButtonDefaults;

/// Error text recorded when a required field has no value.
pub const REQUIRED_MESSAGE: &str = "Field can't be empty";

#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub config_dir: PathBuf,
}

/// How a shared session treats an operation that arrives while another one
/// is still running.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConcurrencyPolicy {
    /// Wait for the running operation, then run in arrival order.
    #[default]
    Queue,
    /// Fail with `WizardError::Busy`.
    Reject,
}

/// Tunables of the form engine (the `engine` section).
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    pub required_message: String,
    pub concurrency: ConcurrencyPolicy,
    /// Buffered events per observer before it starts lagging.
    pub event_capacity: usize,
    pub buttons: ButtonDefaults,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            required_message: REQUIRED_MESSAGE.to_string(),
            concurrency: ConcurrencyPolicy::default(),
            event_capacity: 64,
            buttons: ButtonDefaults::default(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref DATA_FOLDER: Option<PathBuf> =
        env::var(format!("{}_DATA", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

impl Config {
    /// Load defaults, the optional config files and `FIELD_WIZARD__*`
    /// environment overrides, in that order.
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::load(&get_data_dir(), &get_config_dir())
    }

    pub fn load(data_dir: &Path, config_dir: &Path) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().into_owned())?
            .set_default("config_dir", config_dir.to_string_lossy().into_owned())?;

        let config_files = [
            ("config.json5", config::FileFormat::Json5),
            ("config.toml", config::FileFormat::Toml),
        ];
        let mut found_config = false;
        for (file, format) in &config_files {
            let source = config::File::from(config_dir.join(file))
                .format(*format)
                .required(false);
            builder = builder.add_source(source);
            if config_dir.join(file).exists() {
                found_config = true
            }
        }
        if !found_config {
            debug!(dir = %config_dir.display(), "no configuration file found, using defaults");
        }

        builder = builder.add_source(
            config::Environment::with_prefix(PROJECT_NAME.as_str())
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let cfg: Self = builder.build()?.try_deserialize()?;

        Ok(cfg)
    }
}

pub fn get_data_dir() -> PathBuf {
    if let Some(s) = DATA_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

const QUALIFIER: &str = "dev";
const ORGANIZATION: &str = "field-wizard";

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, env!("CARGO_PKG_NAME"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{ButtonColor, ButtonSlot};
    use pretty_assertions::assert_eq;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("field_wizard_{name}_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn defaults_without_files() {
        let dir = scratch_dir("empty");
        let cfg = Config::load(&dir.join("data"), &dir).unwrap();
        assert_eq!(cfg.engine, EngineConfig::default());
        assert_eq!(cfg.engine.required_message, "Field can't be empty");
        assert_eq!(cfg.config.config_dir, dir);
        assert_eq!(cfg.config.data_dir, dir.join("data"));
    }

    #[test]
    fn toml_file_overrides_engine_section() {
        let dir = scratch_dir("toml");
        fs::write(
            dir.join("config.toml"),
            r#"
[engine]
required_message = "Bitte ausfüllen"
concurrency = "reject"

[engine.buttons]
color = "dark"
slot = "end"
"#,
        )
        .unwrap();
        let cfg = Config::load(&dir, &dir).unwrap();
        assert_eq!(cfg.engine.required_message, "Bitte ausfüllen");
        assert_eq!(cfg.engine.concurrency, ConcurrencyPolicy::Reject);
        assert_eq!(cfg.engine.event_capacity, 64);
        assert_eq!(cfg.engine.buttons.color, ButtonColor::Dark);
        assert_eq!(cfg.engine.buttons.slot, ButtonSlot::End);
    }

    #[test]
    fn project_dirs_are_named_after_the_crate() {
        // No home directory, no project dirs.
        let Some(dirs) = project_directory() else {
            return;
        };
        let path = dirs.project_path().to_string_lossy().to_lowercase();
        assert!(path.contains("field_wizard"), "{path}");
        if cfg!(target_os = "macos") {
            assert!(path.starts_with("dev.field-wizard"), "{path}");
        }
    }

    #[test]
    fn policy_names_are_lowercase() {
        assert_eq!(ConcurrencyPolicy::Queue.to_string(), "queue");
        assert_eq!("reject".parse::<ConcurrencyPolicy>().unwrap(), ConcurrencyPolicy::Reject);
    }
}
