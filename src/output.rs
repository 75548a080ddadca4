//! Output settings.

use crate::constants::{DEV, PROD, WP};
use crate::error::HelperError;
use crate::helper::Helper;
use crate::section::Section;
use crate::statement::{Statement, TopHandle};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Statement writing under `output`
#[derive(Debug)]
pub struct Output {
    top: TopHandle,
}

impl Output {
    pub fn new(top: TopHandle) -> Self {
        Self { top }
    }

    /// One output file per entry, named after the entry
    pub fn named(&self) -> Result<&Self, HelperError> {
        self.set("filename", "[name].js")
    }

    /// Clean the output folder before each build
    pub fn clean(&self) -> Result<&Self, HelperError> {
        self.set("clean", true)
    }

    /// Share one runtime chunk between all entries
    pub fn single_runtime(&self) -> Result<&Self, HelperError> {
        self.top()?.set("optimization.runtimeChunk", "single")?;
        Ok(self)
    }

    /// Pick the output folder from the build mode once it is known.
    ///
    /// At lifecycle time, if `output.path` is still unset, the mode comes from
    /// `argv.mode` or else the tree's `mode`; development builds go to
    /// `<dest>/dev`, production builds to `<dest>/prod`, anything else to
    /// `<dest>/none`.
    pub fn by_mode(&self) -> Result<&Self, HelperError> {
        let top = self.top()?;
        let constants = top.constants();
        let mut folders: HashMap<String, &'static str> = HashMap::new();
        folders.insert(constants.require(DEV)?.to_string(), "dev");
        folders.insert(constants.require(PROD)?.to_string(), "prod");

        top.on(constants.require(WP)?, move |helper: &Helper, args: &[Value]| {
            if helper.get("output.path")?.is_some() {
                return Ok(());
            }
            let mode = match args
                .get(1)
                .and_then(|argv| argv.get("mode"))
                .and_then(Value::as_str)
            {
                Some(mode) => Some(mode.to_string()),
                None => helper
                    .get("mode")?
                    .and_then(|mode| mode.as_str().map(str::to_string)),
            };
            let folder = mode
                .as_deref()
                .and_then(|mode| folders.get(mode).copied())
                .unwrap_or("none");
            let path = helper.resolve_destination([folder]);
            debug!(mode = ?mode, path = %path.display(), "Output path chosen by mode");
            helper.set("output.path", path.to_string_lossy().into_owned())?;
            Ok(())
        });
        Ok(self)
    }
}

impl Section for Output {
    fn top(&self) -> Result<Helper, HelperError> {
        self.top.upgrade()
    }

    fn namespace(&self) -> Option<&str> {
        Some("output")
    }
}

impl Statement for Output {
    fn handle(&self) -> &TopHandle {
        &self.top
    }
}
