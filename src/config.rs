//! Configuration System
//!
//! Layered settings for the helper and its logging. Precedence, lowest to
//! highest: built-in defaults, `<project>/wph.toml` (or an explicit file),
//! then `WPH_*` environment variables.

use crate::error::HelperError;
use crate::helper::HelperOptions;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

mod defaults;
mod sources;

pub use sources::{ENV_PREFIX, PROJECT_FILE};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HelperConfig {
    /// Folder layout handed to the helper
    #[serde(default)]
    pub paths: HelperOptions,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Paths(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Paths(msg) => write!(f, "Paths: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl HelperConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let folders = [
            ("src_path", &self.paths.src_path),
            ("dest_path", &self.paths.dest_path),
            ("conf_path", &self.paths.conf_path),
        ];
        for (name, folder) in folders {
            if matches!(folder, Some(folder) if folder.trim().is_empty()) {
                errors.push(ValidationError::Paths(format!("{} cannot be empty", name)));
            }
        }
        if matches!(&self.paths.root_path, Some(root) if root.as_os_str().is_empty()) {
            errors.push(ValidationError::Paths("root_path cannot be empty".to_string()));
        }

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Helper options, rooted at `project_root` unless the config names a root
    pub fn helper_options(&self, project_root: &Path) -> HelperOptions {
        let mut options = self.paths.clone();
        if options.root_path.is_none() {
            options.root_path = Some(project_root.to_path_buf());
        }
        options
    }
}

/// Loads [`HelperConfig`] from its layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, then `<project_root>/wph.toml` if present, then environment
    pub fn load(project_root: &Path) -> Result<HelperConfig, HelperError> {
        let builder = defaults::builder_with_defaults()?;
        let builder = sources::add_project_file(builder, project_root);
        let builder = sources::add_environment(builder);
        let mut config: HelperConfig = builder.build()?.try_deserialize()?;
        if config.paths.root_path.is_none() {
            config.paths.root_path = Some(project_root.to_path_buf());
        }
        debug!(root = %project_root.display(), "Configuration loaded");
        Self::checked(config)
    }

    /// Defaults, then the given file, then environment
    pub fn load_from_file(path: &Path) -> Result<HelperConfig, HelperError> {
        let builder = defaults::builder_with_defaults()?;
        let builder = sources::add_file(builder, path)?;
        let builder = sources::add_environment(builder);
        let config: HelperConfig = builder.build()?.try_deserialize()?;
        debug!(config_path = %path.display(), "Configuration loaded from file");
        Self::checked(config)
    }

    fn checked(config: HelperConfig) -> Result<HelperConfig, HelperError> {
        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            HelperError::Configuration(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(config)
    }
}
