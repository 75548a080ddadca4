//! CLI output: error mapping and JSON rendering.

use crate::error::HelperError;
use serde_json::Value;

/// Map helper errors to a string for CLI output.
pub fn map_error(e: &HelperError) -> String {
    match e {
        HelperError::ModuleNotFound(path) => {
            format!("{} (looked for {}.json or {}.toml)", e, path.display(), path.display())
        }
        _ => e.to_string(),
    }
}

/// Render the finished tree, compact or pretty
pub fn render(tree: &Value, pretty: bool) -> Result<String, HelperError> {
    let text = if pretty {
        serde_json::to_string_pretty(tree)?
    } else {
        serde_json::to_string(tree)?
    };
    Ok(text)
}
