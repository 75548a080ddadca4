//! Configuration sub-module loading.
//!
//! A sub-module is addressed by path segments beneath the helper's config
//! folder. It exports either a value to merge or a function that receives the
//! helper, may configure it directly, and may return a value.

use crate::error::HelperError;
use crate::helper::Helper;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

/// Sub-module function: configure the helper, optionally return a value
pub type ModuleFn = Arc<dyn Fn(&Helper) -> Result<Option<Value>, HelperError> + Send + Sync>;

/// What a sub-module exports
#[derive(Clone)]
pub enum Export {
    Value(Value),
    Function(ModuleFn),
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Export::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Export::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// One load request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRequest {
    segments: Vec<String>,
    location: PathBuf,
}

impl ModuleRequest {
    pub fn new(segments: Vec<String>, location: PathBuf) -> Self {
        Self { segments, location }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Segments joined with `/`, the key used by [`ModuleTable`]
    pub fn name(&self) -> String {
        self.segments.join("/")
    }

    /// Resolved location under the config folder, without extension
    pub fn location(&self) -> &Path {
        &self.location
    }
}

/// Resolves sub-modules to their exports
pub trait ModuleLoader: Send + Sync {
    fn load(&self, request: &ModuleRequest) -> Result<Export, HelperError>;
}

/// Reads JSON or TOML documents from the config folder.
///
/// `<location>` itself is tried first, then `<location>.<ext>` for each
/// known extension, then `<location>/index.<ext>` when it is a directory.
#[derive(Debug, Clone)]
pub struct FileModuleLoader {
    extensions: Vec<String>,
}

impl Default for FileModuleLoader {
    fn default() -> Self {
        Self {
            extensions: vec!["json".to_string(), "toml".to_string()],
        }
    }
}

impl FileModuleLoader {
    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    /// First existing file for `location`
    pub fn resolve(&self, location: &Path) -> Option<PathBuf> {
        if location.is_file() {
            return Some(location.to_path_buf());
        }
        for ext in &self.extensions {
            let mut candidate = OsString::from(location.as_os_str());
            candidate.push(".");
            candidate.push(ext);
            let candidate = PathBuf::from(candidate);
            trace!(candidate = %candidate.display(), "Probing module file");
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        if location.is_dir() {
            for ext in &self.extensions {
                let candidate = location.join(format!("index.{}", ext));
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// Parse a module document by its extension
    pub fn parse(path: &Path, text: &str) -> Result<Value, HelperError> {
        let parse_error = |message: String| HelperError::ModuleParse {
            path: path.to_path_buf(),
            message,
        };
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(text).map_err(|e| parse_error(e.to_string())),
            Some("toml") => {
                let document: toml::Value =
                    toml::from_str(text).map_err(|e| parse_error(e.to_string()))?;
                serde_json::to_value(document).map_err(|e| parse_error(e.to_string()))
            }
            other => Err(parse_error(format!(
                "unsupported module format {:?}",
                other.unwrap_or("")
            ))),
        }
    }
}

impl ModuleLoader for FileModuleLoader {
    fn load(&self, request: &ModuleRequest) -> Result<Export, HelperError> {
        let path = self
            .resolve(request.location())
            .ok_or_else(|| HelperError::ModuleNotFound(request.location().to_path_buf()))?;
        debug!(path = %path.display(), "Reading module file");
        let text = std::fs::read_to_string(&path)?;
        Ok(Export::Value(Self::parse(&path, &text)?))
    }
}

/// In-memory modules keyed by name (`plugins/html`), with an optional
/// fallback loader for anything not registered
#[derive(Default)]
pub struct ModuleTable {
    modules: RwLock<HashMap<String, Export>>,
    fallback: Option<Arc<dyn ModuleLoader>>,
}

impl ModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table that falls back to `loader` for unknown names
    pub fn with_fallback(loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            modules: RwLock::new(HashMap::new()),
            fallback: Some(loader),
        }
    }

    pub fn insert(&self, name: impl Into<String>, export: Export) -> &Self {
        self.modules.write().insert(name.into(), export);
        self
    }

    pub fn insert_value(&self, name: impl Into<String>, value: Value) -> &Self {
        self.insert(name, Export::Value(value))
    }

    pub fn insert_fn<F>(&self, name: impl Into<String>, function: F) -> &Self
    where
        F: Fn(&Helper) -> Result<Option<Value>, HelperError> + Send + Sync + 'static,
    {
        self.insert(name, Export::Function(Arc::new(function)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.read().contains_key(name)
    }
}

impl ModuleLoader for ModuleTable {
    fn load(&self, request: &ModuleRequest) -> Result<Export, HelperError> {
        let name = request.name();
        if let Some(export) = self.modules.read().get(&name).cloned() {
            trace!(module = %name, "Module found in table");
            return Ok(export);
        }
        match &self.fallback {
            Some(loader) => loader.load(request),
            None => Err(HelperError::ModuleNotFound(request.location().to_path_buf())),
        }
    }
}

impl fmt::Debug for ModuleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self.modules.read().keys().cloned().collect();
        names.sort();
        f.debug_struct("ModuleTable")
            .field("modules", &names)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}
