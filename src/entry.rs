//! Entry point definitions.

use crate::addressing::ConfPath;
use crate::error::HelperError;
use crate::helper::{Helper, OUTPUT};
use crate::output::Output;
use crate::section::Section;
use crate::statement::{Statement, TopHandle};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Name of the shared main entry
pub const MAIN: &str = "main";

/// `dependOn` of an entry descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependOn {
    One(String),
    Many(Vec<String>),
}

impl DependOn {
    /// Make sure `main` is among the dependencies, in front
    fn with_main(current: Option<DependOn>) -> DependOn {
        match current {
            Some(DependOn::One(name)) if name == MAIN => DependOn::One(name),
            Some(DependOn::One(name)) => DependOn::Many(vec![MAIN.to_string(), name]),
            Some(DependOn::Many(mut names)) => {
                if !names.iter().any(|n| n == MAIN) {
                    names.insert(0, MAIN.to_string());
                }
                DependOn::Many(names)
            }
            None => DependOn::One(MAIN.to_string()),
        }
    }
}

/// Known entry descriptor properties, plus the source file shortcut
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depend_on: Option<DependOn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_path: Option<String>,
    /// Source filename under the source folder; defaults to `<name>.js`
    #[serde(default, skip_serializing)]
    pub src: Option<String>,
}

impl EntryOptions {
    pub fn depend_on(mut self, depend_on: DependOn) -> Self {
        self.depend_on = Some(depend_on);
        self
    }

    pub fn src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }

    pub fn import(mut self, import: impl Into<Value>) -> Self {
        self.import = Some(import.into());
        self
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

#[derive(Debug, Default)]
struct EntryState {
    /// `None` until `set_main` or `explicit` decides
    use_main: Option<bool>,
    no_check: bool,
}

/// Statement writing under `entry`
#[derive(Debug)]
pub struct Entry {
    top: TopHandle,
    state: Mutex<EntryState>,
}

impl Entry {
    pub fn new(top: TopHandle) -> Self {
        Self {
            top,
            state: Mutex::new(EntryState::default()),
        }
    }

    fn name_path(name: &str) -> ConfPath {
        ConfPath::from_segments([name])
    }

    fn source_of(&self, name: &str, src: Option<&str>) -> Result<String, HelperError> {
        let filename = match src {
            Some(src) => src.to_string(),
            None => format!("{}.js", name),
        };
        let path = self.top()?.resolve_source([filename]);
        Ok(path.to_string_lossy().into_owned())
    }

    /// Set entry `name` to `value` with no checks
    pub fn define(&self, name: &str, value: impl Into<Value>) -> Result<&Self, HelperError> {
        self.set(Self::name_path(name), value)
    }

    pub fn lookup(&self, name: &str) -> Result<Option<Value>, HelperError> {
        self.get(Self::name_path(name))
    }

    pub fn exists(&self, name: &str) -> Result<bool, HelperError> {
        Ok(self.lookup(name)?.is_some())
    }

    /// Number of defined entries
    pub fn count(&self) -> Result<usize, HelperError> {
        Ok(match self.get(ConfPath::root())? {
            Some(Value::Object(entries)) => entries.len(),
            _ => 0,
        })
    }

    /// Define `name` as a plain source path
    pub fn add_file(&self, name: &str, src: Option<&str>) -> Result<&Self, HelperError> {
        let path = self.source_of(name, src)?;
        self.define(name, path)
    }

    /// No implicit `main` dependency and no single-runtime check
    pub fn explicit(&self) -> &Self {
        let mut state = self.state.lock();
        state.use_main = Some(false);
        state.no_check = true;
        self
    }

    /// Add the `main` entry; later entries depend on it unless `explicit` was
    /// called first
    pub fn set_main(&self, src: Option<&str>) -> Result<&Self, HelperError> {
        {
            let mut state = self.state.lock();
            if state.use_main.is_none() {
                state.use_main = Some(true);
            }
        }
        self.add_file(MAIN, src)
    }

    pub fn with_main(&self) -> Result<&Self, HelperError> {
        self.set_main(None)
    }

    /// Add a full entry descriptor.
    ///
    /// `import` defaults to the source path of `options.src` or `<name>.js`.
    /// Once any entry exists, adding another switches the build to a single
    /// shared runtime, unless `explicit` was called.
    pub fn add(&self, name: &str, options: EntryOptions) -> Result<&Self, HelperError> {
        let mut descriptor = options;
        if descriptor.import.is_none() {
            let source = self.source_of(name, descriptor.src.as_deref())?;
            descriptor.import = Some(Value::String(source));
        }

        let (use_main, no_check) = {
            let state = self.state.lock();
            (state.use_main == Some(true), state.no_check)
        };
        if use_main {
            descriptor.depend_on = Some(DependOn::with_main(descriptor.depend_on.take()));
        }
        let shared_runtime = !no_check && self.count()? > 0;

        let value = serde_json::to_value(&descriptor)?;
        self.define(name, value)?;
        if shared_runtime {
            debug!(entry = %name, "Existing entries found, using a single runtime");
            self.sibling_as::<Output>(OUTPUT)?.single_runtime()?;
        }
        Ok(self)
    }
}

impl Section for Entry {
    fn top(&self) -> Result<Helper, HelperError> {
        self.top.upgrade()
    }

    fn namespace(&self) -> Option<&str> {
        Some("entry")
    }
}

impl Statement for Entry {
    fn handle(&self) -> &TopHandle {
        &self.top
    }
}
