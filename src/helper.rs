//! The helper facade: owns the configuration tree, the statements, the
//! event handlers and the sub-module loader.
//!
//! ```no_run
//! use serde_json::json;
//! use webpack_helper::prelude::*;
//!
//! # fn main() -> Result<(), HelperError> {
//! let helper = Helper::new(HelperOptions::new("/project"))?;
//! helper.set("mode", "production")?;
//! helper.output().named()?.clean()?.by_mode()?;
//! helper.entry().with_main()?;
//! helper.module().css(None)?;
//! helper.load(["resolve"])?;
//! let conf = helper.finish(json!({}), json!({}))?;
//! # let _ = conf;
//! # Ok(())
//! # }
//! ```

use crate::addressing::{kind, ConfPath, WriteOptions};
use crate::constants::{self, Constants};
use crate::entry::Entry;
use crate::error::HelperError;
use crate::events::EventDispatcher;
use crate::loader::{Export, FileModuleLoader, ModuleLoader, ModuleRequest};
use crate::output::Output;
use crate::rules::ModuleStatement;
use crate::section::Section;
use crate::statement::{downcast_statement, Statement, StatementRegistry, TopHandle};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Registry name of the built-in output statement
pub const OUTPUT: &str = "output";
/// Registry name of the built-in entry statement
pub const ENTRY: &str = "entry";
/// Registry name of the built-in module-rules statement
pub const MODULE: &str = "module";

/// Construction options for a [`Helper`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelperOptions {
    /// Project root; every other folder is relative to it
    #[serde(default)]
    pub root_path: Option<PathBuf>,

    /// Source sub-folder (default `src`)
    #[serde(default)]
    pub src_path: Option<String>,

    /// Output sub-folder (default `dist`)
    #[serde(default)]
    pub dest_path: Option<String>,

    /// Configuration sub-module folder (default `webpack`)
    #[serde(default)]
    pub conf_path: Option<String>,
}

impl HelperOptions {
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: Some(root_path.into()),
            ..Self::default()
        }
    }

    pub fn src_path(mut self, path: impl Into<String>) -> Self {
        self.src_path = Some(path.into());
        self
    }

    pub fn dest_path(mut self, path: impl Into<String>) -> Self {
        self.dest_path = Some(path.into());
        self
    }

    pub fn conf_path(mut self, path: impl Into<String>) -> Self {
        self.conf_path = Some(path.into());
        self
    }
}

/// Folder layout after defaults were applied
#[derive(Debug, Clone, PartialEq, Eq)]
struct Layout {
    root: PathBuf,
    src: String,
    dest: String,
    conf: String,
}

pub(crate) struct HelperInner {
    layout: Layout,
    constants: Arc<Constants>,
    loader: Arc<dyn ModuleLoader>,
    tree: RwLock<Value>,
    statements: StatementRegistry,
    events: EventDispatcher<Helper>,
    output: Arc<Output>,
    entry: Arc<Entry>,
    module: Arc<ModuleStatement>,
}

/// Cheap, clonable handle to one configuration build
#[derive(Clone)]
pub struct Helper {
    inner: Arc<HelperInner>,
}

impl Helper {
    /// Build a helper with the standard constants and the file loader
    pub fn new(options: HelperOptions) -> Result<Self, HelperError> {
        Self::with_parts(
            options,
            Constants::standard(),
            Arc::new(FileModuleLoader::default()),
        )
    }

    /// Build a helper with a custom sub-module loader
    pub fn with_loader(
        options: HelperOptions,
        loader: Arc<dyn ModuleLoader>,
    ) -> Result<Self, HelperError> {
        Self::with_parts(options, Constants::standard(), loader)
    }

    pub fn with_parts(
        options: HelperOptions,
        constants: Arc<Constants>,
        loader: Arc<dyn ModuleLoader>,
    ) -> Result<Self, HelperError> {
        let root = match options.root_path {
            Some(root) if !root.as_os_str().is_empty() => root,
            _ => {
                return Err(HelperError::Configuration(
                    "Must specify a root path".to_string(),
                ))
            }
        };
        let folder = |explicit: Option<String>, key: &str, fallback: &str| {
            explicit.unwrap_or_else(|| constants.get(key).unwrap_or(fallback).to_string())
        };
        let layout = Layout {
            src: folder(options.src_path, constants::SRC, "src"),
            dest: folder(options.dest_path, constants::DIST, "dist"),
            conf: folder(options.conf_path, constants::WP, "webpack"),
            root,
        };
        info!(
            root = %layout.root.display(),
            src = %layout.src,
            dest = %layout.dest,
            conf = %layout.conf,
            "Helper created"
        );

        let inner = Arc::new_cyclic(|weak| {
            let handle = TopHandle::new(weak.clone());
            let output = Arc::new(Output::new(handle.clone()));
            let entry = Arc::new(Entry::new(handle.clone()));
            let module = Arc::new(ModuleStatement::new(handle));
            HelperInner {
                layout,
                constants,
                loader,
                tree: RwLock::new(Value::Object(Map::new())),
                statements: StatementRegistry::new(),
                events: EventDispatcher::new(),
                output,
                entry,
                module,
            }
        });

        let helper = Helper { inner };
        helper.register_builtin(OUTPUT, helper.inner.output.clone())?;
        helper.register_builtin(ENTRY, helper.inner.entry.clone())?;
        helper.register_builtin(MODULE, helper.inner.module.clone())?;
        Ok(helper)
    }

    fn register_builtin(&self, name: &str, statement: Arc<dyn Statement>) -> Result<(), HelperError> {
        self.inner.statements.register(name, statement)
    }

    pub(crate) fn from_inner(inner: Arc<HelperInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn inner_ptr(&self) -> *const HelperInner {
        Arc::as_ptr(&self.inner)
    }

    /// Back-reference handed to statements built for this helper
    pub fn handle(&self) -> TopHandle {
        TopHandle::new(Arc::downgrade(&self.inner))
    }

    pub(crate) fn read_tree<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        f(&self.inner.tree.read())
    }

    pub(crate) fn write_tree<R>(&self, f: impl FnOnce(&mut Value) -> R) -> R {
        f(&mut self.inner.tree.write())
    }

    /// Copy of the whole configuration tree
    pub fn snapshot(&self) -> Value {
        self.read_tree(Value::clone)
    }

    /// The locked constant table
    pub fn constants(&self) -> Arc<Constants> {
        self.inner.constants.clone()
    }

    // Statements

    /// Construct a statement bound to this helper and register it under `name`
    pub fn add_statement<S, F>(&self, name: &str, build: F) -> Result<Arc<S>, HelperError>
    where
        S: Statement,
        F: FnOnce(TopHandle) -> S,
    {
        if self.inner.statements.contains(name) {
            return Err(HelperError::DuplicateRegistration(name.to_string()));
        }
        let statement = Arc::new(build(self.handle()));
        self.inner.statements.register(name, statement.clone())?;
        Ok(statement)
    }

    /// Register a statement that was built elsewhere for this helper
    pub fn add_statement_instance(
        &self,
        name: &str,
        statement: Arc<dyn Statement>,
    ) -> Result<&Self, HelperError> {
        if !statement.handle().belongs_to(self) {
            return Err(HelperError::InvalidStatement(name.to_string()));
        }
        self.inner.statements.register(name, statement)?;
        Ok(self)
    }

    pub fn statement(&self, name: &str) -> Option<Arc<dyn Statement>> {
        self.inner.statements.get(name)
    }

    /// Registered statement of a known type
    pub fn statement_as<T: Statement>(&self, name: &str) -> Result<Arc<T>, HelperError> {
        let statement = self
            .statement(name)
            .ok_or_else(|| HelperError::Configuration(format!("No statement named '{}'", name)))?;
        downcast_statement::<T>(statement).ok_or_else(|| {
            HelperError::Configuration(format!(
                "Statement '{}' is not a {}",
                name,
                std::any::type_name::<T>()
            ))
        })
    }

    /// Names of registered statements, in registration order
    pub fn statement_names(&self) -> Vec<String> {
        self.inner.statements.names()
    }

    pub fn output(&self) -> Arc<Output> {
        self.inner.output.clone()
    }

    pub fn entry(&self) -> Arc<Entry> {
        self.inner.entry.clone()
    }

    pub fn module(&self) -> Arc<ModuleStatement> {
        self.inner.module.clone()
    }

    // Paths

    pub fn root(&self) -> &Path {
        &self.inner.layout.root
    }

    /// Join `segments` under the project root
    pub fn resolve_path<I, S>(&self, segments: I) -> PathBuf
    where
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        let mut path = self.inner.layout.root.clone();
        for segment in segments {
            path.push(segment);
        }
        path
    }

    /// Join `segments` under the source folder
    pub fn resolve_source<I, S>(&self, segments: I) -> PathBuf
    where
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        self.resolve_under(&self.inner.layout.src, segments)
    }

    /// Join `segments` under the output folder
    pub fn resolve_destination<I, S>(&self, segments: I) -> PathBuf
    where
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        self.resolve_under(&self.inner.layout.dest, segments)
    }

    /// Join `segments` under the configuration sub-module folder
    pub fn resolve_config<I, S>(&self, segments: I) -> PathBuf
    where
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        self.resolve_under(&self.inner.layout.conf, segments)
    }

    fn resolve_under<I, S>(&self, folder: &str, segments: I) -> PathBuf
    where
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        let mut path = self.resolve_path([folder]);
        for segment in segments {
            path.push(segment);
        }
        path
    }

    // Sub-modules

    /// Load a configuration sub-module and produce its value.
    ///
    /// A function export is called with this helper; a value export is used
    /// as-is. `None` means the module produced nothing (or `null`).
    pub fn load_module<I, S>(&self, segments: I) -> Result<Option<Value>, HelperError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments: Vec<String> = segments.into_iter().map(|s| s.as_ref().to_string()).collect();
        let location = self.resolve_config(segments.iter().map(String::as_str));
        let request = ModuleRequest::new(segments, location);
        info!(module = %request.name(), location = %request.location().display(), "Loading configuration module");

        let value = match self.inner.loader.load(&request)? {
            Export::Value(value) => Some(value),
            Export::Function(function) => function(self)?,
        };
        Ok(value.filter(|v| !v.is_null()))
    }

    /// Load a sub-module and merge its value into the tree at the path made
    /// of `segments`
    pub fn load<I, S>(&self, segments: I) -> Result<&Self, HelperError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments: Vec<String> = segments.into_iter().map(|s| s.as_ref().to_string()).collect();
        match self.load_module(&segments)? {
            Some(value) => {
                let path = ConfPath::from(segments);
                debug!(path = %path, "Merging module value");
                self.set_at(&path, value, &WriteOptions::merge())?;
            }
            None => debug!(module = %segments.join("/"), "Module produced no value"),
        }
        Ok(self)
    }

    /// Load a plugin instance from a sub-module and append it to `plugins`.
    ///
    /// The export must be a JSON object. Arrays, scalars, null and a function
    /// module that returns nothing fail with `InvalidPlugin`.
    pub fn plugin<I, S>(&self, segments: I) -> Result<&Self, HelperError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments: Vec<String> = segments.into_iter().map(|s| s.as_ref().to_string()).collect();
        let module = segments.join("/");
        match self.load_module(&segments)? {
            Some(plugin @ Value::Object(_)) => {
                let index = self.append_at(&ConfPath::parse("plugins"), plugin)?;
                info!(module = %module, index, "Plugin added");
                Ok(self)
            }
            other => {
                let found = other.as_ref().map_or("nothing", kind);
                warn!(module = %module, found, "Rejected plugin module");
                Err(HelperError::InvalidPlugin {
                    module,
                    reason: format!("expected a mapping, got {}", found),
                })
            }
        }
    }

    // Events

    /// Register a handler for `event`
    pub fn on<F>(&self, event: impl Into<String>, handler: F) -> &Self
    where
        F: Fn(&Helper, &[Value]) -> Result<(), HelperError> + Send + Sync + 'static,
    {
        self.inner.events.on(event, handler);
        self
    }

    /// Run every handler for `event`, in order, with `args`
    pub fn trigger(&self, event: &str, args: &[Value]) -> Result<&Self, HelperError> {
        let ran = self.inner.events.trigger(self, event, args)?;
        debug!(event = %event, handlers = ran, "Event dispatched");
        Ok(self)
    }

    pub fn handler_count(&self, event: &str) -> usize {
        self.inner.events.handler_count(event)
    }

    /// Name of the lifecycle event fired by [`Helper::finish`]
    pub fn lifecycle_event(&self) -> String {
        self.inner
            .constants
            .get(constants::WP)
            .unwrap_or("webpack")
            .to_string()
    }

    /// Fire the lifecycle event with `(env, argv)` and return the finished tree
    pub fn finish(&self, env: Value, argv: Value) -> Result<Value, HelperError> {
        let event = self.lifecycle_event();
        info!(event = %event, "Finishing configuration");
        self.trigger(&event, &[env, argv])?;
        Ok(self.snapshot())
    }

    /// Closure suitable for handing to the build tool
    pub fn entry_point(&self) -> impl Fn(Value, Value) -> Result<Value, HelperError> {
        let helper = self.clone();
        move |env, argv| helper.finish(env, argv)
    }
}

impl Section for Helper {
    fn top(&self) -> Result<Helper, HelperError> {
        Ok(self.clone())
    }

    fn constants(&self) -> Result<Arc<Constants>, HelperError> {
        Ok(self.inner.constants.clone())
    }
}

impl fmt::Debug for Helper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Helper")
            .field("layout", &self.inner.layout)
            .field("statements", &self.inner.statements)
            .field("events", &self.inner.events)
            .finish()
    }
}
