//! Error types for the webpack configuration helper.

use std::path::PathBuf;
use thiserror::Error;

/// Path addressing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("Type conflict at '{path}': {reason}")]
    TypeConflict { path: String, reason: String },

    #[error("No value at '{0}'")]
    NotFound(String),
}

impl PathError {
    pub(crate) fn conflict(path: impl Into<String>, reason: impl Into<String>) -> Self {
        PathError::TypeConflict {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Facade and statement errors
#[derive(Debug, Error)]
pub enum HelperError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("Invalid plugin module '{module}': {reason}")]
    InvalidPlugin { module: String, reason: String },

    #[error("Statement '{0}' is already registered")]
    DuplicateRegistration(String),

    #[error("Invalid statement '{0}': it belongs to a different helper")]
    InvalidStatement(String),

    #[error("Configuration module not found: {0}")]
    ModuleNotFound(PathBuf),

    #[error("Failed to parse configuration module {path:?}: {message}")]
    ModuleParse { path: PathBuf, message: String },

    #[error("Handler for '{event}' failed: {message}")]
    Handler { event: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HelperError {
    /// Build a handler failure from any displayable cause
    pub fn handler(event: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        HelperError::Handler {
            event: event.into(),
            message: cause.to_string(),
        }
    }
}

impl From<config::ConfigError> for HelperError {
    fn from(err: config::ConfigError) -> Self {
        HelperError::Configuration(err.to_string())
    }
}
