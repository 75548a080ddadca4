//! Locked constant vocabulary shared by every section.
//!
//! Constants are declared in named groups. A [`Constants`] table merges the
//! groups once, in order, into a flat read-only lookup; nested groups are
//! flattened to dotted keys (`TEST.CSS`). Later groups win on collisions.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

/// Mode name for development builds
pub const DEV: &str = "DEV";
/// Mode name for production builds
pub const PROD: &str = "PROD";
/// Lifecycle event name, also the default config sub-folder
pub const WP: &str = "WP";
/// Default source sub-folder
pub const SRC: &str = "SRC";
/// Default output sub-folder
pub const DIST: &str = "DIST";
/// Asset resource rule type
pub const RES: &str = "RES";
pub const TEST_CSS: &str = "TEST.CSS";
pub const TEST_SASS: &str = "TEST.SASS";
pub const TEST_IMGS: &str = "TEST.IMGS";
pub const USE_CSS: &str = "USE.CSS";
pub const USE_SASS: &str = "USE.SASS";
pub const USE_STYLE: &str = "USE.STYLE";

/// One named group of literals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantGroup {
    name: String,
    entries: Vec<(String, String)>,
}

impl ConstantGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Add a single literal
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    /// Build a group from a JSON object, flattening nested objects to dotted keys.
    ///
    /// Non-string scalars are stored in their JSON text form; anything that is
    /// not an object at the top level produces an empty group.
    pub fn from_value(name: impl Into<String>, value: &Value) -> Self {
        let mut group = Self::new(name);
        if let Value::Object(map) = value {
            for (key, child) in map {
                flatten_into(&mut group.entries, key, child);
            }
        }
        group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn flatten_into(entries: &mut Vec<(String, String)>, prefix: &str, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(entries, &format!("{}.{}", prefix, key), child);
            }
        }
        Value::String(s) => entries.push((prefix.to_string(), s.clone())),
        Value::Null => {}
        other => entries.push((prefix.to_string(), other.to_string())),
    }
}

/// Flat, immutable constant table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constants {
    groups: Vec<String>,
    table: BTreeMap<String, String>,
}

impl Constants {
    /// Merge groups in order into one table
    pub fn from_groups(groups: impl IntoIterator<Item = ConstantGroup>) -> Self {
        let mut constants = Constants::default();
        for group in groups {
            constants.groups.push(group.name);
            for (key, value) in group.entries {
                constants.table.insert(key, value);
            }
        }
        constants
    }

    /// The built-in vocabulary, assembled once per process
    pub fn standard() -> Arc<Constants> {
        static STANDARD: OnceLock<Arc<Constants>> = OnceLock::new();
        STANDARD
            .get_or_init(|| Arc::new(Constants::from_groups(standard_groups())))
            .clone()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.table.get(key).map(String::as_str)
    }

    /// Look up a key that the caller expects to exist
    pub fn require(&self, key: &str) -> Result<&str, crate::error::HelperError> {
        self.get(key).ok_or_else(|| {
            crate::error::HelperError::Configuration(format!("Unknown constant '{}'", key))
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.table.contains_key(key)
    }

    /// Names of the merged groups, in merge order
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.table.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Core and module-rule groups.
///
/// Test patterns are kept in regex-literal notation so the bundler side can
/// revive them as regular expressions.
pub fn standard_groups() -> Vec<ConstantGroup> {
    vec![
        ConstantGroup::new("core")
            .with(DEV, "development")
            .with(PROD, "production")
            .with(WP, "webpack")
            .with(SRC, "src")
            .with(DIST, "dist"),
        ConstantGroup::new("module")
            .with(RES, "asset/resource")
            .with(TEST_CSS, r"/\.css$/i")
            .with(TEST_SASS, r"/\.s[ac]ss/i")
            .with(TEST_IMGS, r"/\.(jpe?g|png|webp|heic|heif|gif|jif?f)$/i")
            .with(USE_CSS, "css-loader")
            .with(USE_SASS, "sass-loader")
            .with(USE_STYLE, "style-loader"),
    ]
}
