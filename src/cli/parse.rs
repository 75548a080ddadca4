//! CLI parse: clap types for wph. No behavior; definitions only.

use clap::Parser;
use std::path::PathBuf;

/// wph - assemble a webpack configuration from a project's config modules
#[derive(Parser, Debug)]
#[command(name = "wph")]
#[command(about = "Assemble a webpack configuration and print it as JSON")]
pub struct Cli {
    /// Project root directory
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Source folder under the root
    #[arg(long)]
    pub src: Option<String>,

    /// Output folder under the root
    #[arg(long)]
    pub dest: Option<String>,

    /// Config module folder under the root
    #[arg(long)]
    pub conf: Option<String>,

    /// Config module to merge into the tree (slash separated, repeatable)
    #[arg(long = "load", value_name = "MODULE")]
    pub loads: Vec<String>,

    /// Config module producing a plugin instance (repeatable)
    #[arg(long = "plugin", value_name = "MODULE")]
    pub plugins: Vec<String>,

    /// Build mode handed to lifecycle handlers as argv.mode
    #[arg(long)]
    pub mode: Option<String>,

    /// Environment entry KEY=VALUE, or KEY for a true flag (repeatable)
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr)
    #[arg(long)]
    pub log_output: Option<String>,
}

/// `KEY=VALUE` into a pair; a bare `KEY` becomes `(KEY, "true")`
pub fn parse_env_pair(raw: &str) -> Result<(String, String), String> {
    let (key, value) = match raw.split_once('=') {
        Some((key, value)) => (key.trim(), value),
        None => (raw.trim(), "true"),
    };
    if key.is_empty() {
        return Err(format!("invalid env entry '{}': empty key", raw));
    }
    Ok((key.to_string(), value.to_string()))
}
