//! CLI route: run context. Builds the helper from layered configuration and
//! drives one build.

use crate::addressing::{self, ConfPath, WriteOptions};
use crate::cli::output::render;
use crate::cli::parse::Cli;
use crate::config::{ConfigLoader, HelperConfig};
use crate::error::HelperError;
use crate::helper::Helper;
use serde_json::{json, Map, Value};
use std::path::Path;
use tracing::{debug, info};

/// Runtime context for CLI execution: the loaded configuration and the helper
/// built from it.
pub struct RunContext {
    config: HelperConfig,
    helper: Helper,
}

impl RunContext {
    /// Load configuration for `cli`, apply its folder overrides, build the helper
    pub fn new(cli: &Cli) -> Result<Self, HelperError> {
        let config = load_config(&cli.root, cli.config.as_deref())?;

        let mut options = config.helper_options(&cli.root);
        if let Some(src) = &cli.src {
            options.src_path = Some(src.clone());
        }
        if let Some(dest) = &cli.dest {
            options.dest_path = Some(dest.clone());
        }
        if let Some(conf) = &cli.conf {
            options.conf_path = Some(conf.clone());
        }

        let helper = Helper::new(options)?;
        Ok(Self { config, helper })
    }

    pub fn helper(&self) -> &Helper {
        &self.helper
    }

    pub fn config(&self) -> &HelperConfig {
        &self.config
    }

    /// Apply loads then plugins, fire the lifecycle and render the tree
    pub fn execute(&self, cli: &Cli) -> Result<String, HelperError> {
        for module in &cli.loads {
            self.helper.load(module_segments(module))?;
        }
        for module in &cli.plugins {
            self.helper.plugin(module_segments(module))?;
        }

        let env = build_env(&cli.env)?;
        let argv = match &cli.mode {
            Some(mode) => json!({ "mode": mode }),
            None => Value::Object(Map::new()),
        };
        debug!(env = %env, argv = %argv, "Running lifecycle");

        let tree = self.helper.finish(env, argv)?;
        info!(loads = cli.loads.len(), plugins = cli.plugins.len(), "Configuration assembled");
        render(&tree, cli.pretty)
    }
}

/// Config from an explicit file, or from the project root
pub fn load_config(root: &Path, config_path: Option<&Path>) -> Result<HelperConfig, HelperError> {
    match config_path {
        Some(path) => {
            let mut config = ConfigLoader::load_from_file(path)?;
            if config.paths.root_path.is_none() {
                config.paths.root_path = Some(root.to_path_buf());
            }
            Ok(config)
        }
        None => ConfigLoader::load(root),
    }
}

fn module_segments(module: &str) -> Vec<&str> {
    module.split('/').filter(|s| !s.is_empty()).collect()
}

/// `--env` pairs as a mapping; dotted keys nest, `true`/`false` become booleans
pub fn build_env(pairs: &[(String, String)]) -> Result<Value, HelperError> {
    let mut env = Value::Object(Map::new());
    for (key, raw) in pairs {
        let value = match raw.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            other => Value::String(other.to_string()),
        };
        addressing::write(&mut env, &ConfPath::parse(key), value, &WriteOptions::replace())?;
    }
    Ok(env)
}
