//! File and environment sources.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, File, FileFormat};
use std::path::Path;
use tracing::debug;

/// Project config file name, looked up in the project root
pub const PROJECT_FILE: &str = "wph.toml";

/// Prefix of environment overrides (`WPH_PATHS__SRC_PATH=lib`)
pub const ENV_PREFIX: &str = "WPH";

/// Add `<project_root>/wph.toml` if it exists.
pub fn add_project_file(
    builder: ConfigBuilder<DefaultState>,
    project_root: &Path,
) -> ConfigBuilder<DefaultState> {
    let path = project_root.join(PROJECT_FILE);
    if path.is_file() {
        debug!(config_path = %path.display(), "Using project config file");
        builder.add_source(File::from(path).format(FileFormat::Toml).required(false))
    } else {
        builder
    }
}

/// Add an explicitly named config file; it must exist.
pub fn add_file(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::Message(format!(
            "Config file not found: {}",
            path.display()
        )));
    }
    Ok(builder.add_source(File::from(path).format(FileFormat::Toml).required(true)))
}

/// Add `WPH_*` environment overrides, `__` separating nested keys.
pub fn add_environment(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__"),
    )
}
