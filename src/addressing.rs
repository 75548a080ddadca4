//! Path addressing over a JSON configuration tree.
//!
//! A [`ConfPath`] is an ordered list of segments. A dotted string and a
//! pre-split sequence are equivalent ways to build one; the empty path is the
//! tree root. Writes create missing intermediate segments as mappings and never
//! remove sibling keys. A write that fails leaves the tree untouched.

use crate::error::PathError;
use serde_json::{Map, Value};
use std::fmt;

/// Location inside a configuration tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ConfPath {
    segments: Vec<String>,
}

impl ConfPath {
    /// The tree root
    pub fn root() -> Self {
        Self::default()
    }

    /// Split a dotted string. Empty pieces are dropped, so `""` is the root.
    pub fn parse(dotted: &str) -> Self {
        Self {
            segments: dotted
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Use pre-split segments as-is; a segment may contain dots.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// `self` followed by `other`
    pub fn join(&self, other: &ConfPath) -> ConfPath {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        ConfPath { segments }
    }

    /// `self` followed by one more segment
    pub fn child(&self, segment: impl Into<String>) -> ConfPath {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        ConfPath { segments }
    }

    /// `self` with a (dotted) namespace in front
    pub fn prefixed(&self, namespace: &str) -> ConfPath {
        ConfPath::parse(namespace).join(self)
    }

    /// The first `depth` segments
    pub fn truncated(&self, depth: usize) -> ConfPath {
        ConfPath {
            segments: self.segments.iter().take(depth).cloned().collect(),
        }
    }

    fn describe(&self) -> String {
        if self.is_root() {
            "<root>".to_string()
        } else {
            self.to_string()
        }
    }
}

impl fmt::Display for ConfPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl From<&str> for ConfPath {
    fn from(dotted: &str) -> Self {
        ConfPath::parse(dotted)
    }
}

impl From<String> for ConfPath {
    fn from(dotted: String) -> Self {
        ConfPath::parse(&dotted)
    }
}

impl From<&String> for ConfPath {
    fn from(dotted: &String) -> Self {
        ConfPath::parse(dotted)
    }
}

impl From<Vec<String>> for ConfPath {
    fn from(segments: Vec<String>) -> Self {
        ConfPath { segments }
    }
}

impl From<Vec<&str>> for ConfPath {
    fn from(segments: Vec<&str>) -> Self {
        ConfPath::from_segments(segments)
    }
}

impl From<&[&str]> for ConfPath {
    fn from(segments: &[&str]) -> Self {
        ConfPath::from_segments(segments.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for ConfPath {
    fn from(segments: [&str; N]) -> Self {
        ConfPath::from_segments(segments)
    }
}

impl From<&ConfPath> for ConfPath {
    fn from(path: &ConfPath) -> Self {
        path.clone()
    }
}

/// How a write treats an existing value at the target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Overwrite whatever is there
    #[default]
    Replace,
    /// Merge mappings recursively, last writer wins on leaves
    Merge,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub mode: WriteMode,
}

impl WriteOptions {
    pub fn replace() -> Self {
        Self {
            mode: WriteMode::Replace,
        }
    }

    pub fn merge() -> Self {
        Self {
            mode: WriteMode::Merge,
        }
    }

    /// Same behaviour as [`WriteOptions::merge`]
    pub fn assign() -> Self {
        Self::merge()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadOptions {
    /// Fail with `NotFound` instead of returning `None`
    pub required: bool,
    /// Returned when nothing is found; takes precedence over `required`
    pub default: Option<Value>,
}

impl ReadOptions {
    pub fn required() -> Self {
        Self {
            required: true,
            default: None,
        }
    }

    pub fn or_default(value: Value) -> Self {
        Self {
            required: false,
            default: Some(value),
        }
    }
}

/// Decimal index segment, no sign
pub fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Human name of a JSON value's shape, for diagnostics
pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

/// Borrow the value at `path`, if any
pub fn lookup<'a>(tree: &'a Value, path: &ConfPath) -> Option<&'a Value> {
    let mut node = tree;
    for segment in path.segments() {
        node = match node {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(parse_index(segment)?)?,
            _ => return None,
        };
    }
    Some(node)
}

/// Read a copy of the value at `path`
pub fn read(
    tree: &Value,
    path: &ConfPath,
    options: &ReadOptions,
) -> Result<Option<Value>, PathError> {
    match lookup(tree, path) {
        Some(value) => Ok(Some(value.clone())),
        None => match &options.default {
            Some(default) => Ok(Some(default.clone())),
            None if options.required => Err(PathError::NotFound(path.describe())),
            None => Ok(None),
        },
    }
}

/// Place `value` at `path`, creating intermediate mappings as needed
pub fn write(
    tree: &mut Value,
    path: &ConfPath,
    value: Value,
    options: &WriteOptions,
) -> Result<(), PathError> {
    check_write(tree, path, &value, options.mode)?;
    let slot = slot_mut(tree, path)?;
    match options.mode {
        WriteMode::Replace => *slot = value,
        WriteMode::Merge => merge_into(slot, value),
    }
    Ok(())
}

/// Fail exactly when `write` would, without touching the tree
pub fn check(
    tree: &Value,
    path: &ConfPath,
    value: &Value,
    options: &WriteOptions,
) -> Result<(), PathError> {
    check_write(tree, path, value, options.mode)
}

/// Push `value` onto the sequence at `path`, creating the sequence when absent.
///
/// Returns the index of the new element.
pub fn append(tree: &mut Value, path: &ConfPath, value: Value) -> Result<usize, PathError> {
    match lookup(tree, path) {
        None | Some(Value::Null) | Some(Value::Array(_)) => {}
        Some(other) => {
            return Err(PathError::conflict(
                path.describe(),
                format!("expected a sequence, found a {}", kind(other)),
            ))
        }
    }
    check_write(tree, path, &Value::Array(Vec::new()), WriteMode::Replace)?;
    let slot = slot_mut(tree, path)?;
    if let Value::Array(items) = &mut *slot {
        items.push(value);
        return Ok(items.len() - 1);
    }
    *slot = Value::Array(vec![value]);
    Ok(0)
}

/// Recursive mapping merge; on any shape mismatch the incoming value wins
pub fn merge_into(slot: &mut Value, value: Value) {
    match (slot, value) {
        (Value::Object(existing), Value::Object(incoming)) => {
            for (key, child) in incoming {
                match existing.get_mut(&key) {
                    Some(current) => merge_into(current, child),
                    None => {
                        existing.insert(key, child);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Walk the existing part of `path` without touching the tree
fn check_write(
    tree: &Value,
    path: &ConfPath,
    value: &Value,
    mode: WriteMode,
) -> Result<(), PathError> {
    if path.is_root() && !value.is_object() {
        return Err(PathError::conflict(
            path.describe(),
            format!("the root must be a mapping, not a {}", kind(value)),
        ));
    }

    let mut node = Some(tree);
    for (depth, segment) in path.segments().iter().enumerate() {
        let current = match node {
            Some(current) if !current.is_null() => current,
            // Everything from here down gets created
            _ => return Ok(()),
        };
        node = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => match parse_index(segment) {
                Some(index) if index < items.len() => items.get(index),
                _ => {
                    return Err(PathError::conflict(
                        path.truncated(depth).describe(),
                        format!("'{}' is not an index into the sequence", segment),
                    ))
                }
            },
            other => {
                return Err(PathError::conflict(
                    path.truncated(depth).describe(),
                    format!("cannot descend into a {} with '{}'", kind(other), segment),
                ))
            }
        };
    }

    if mode == WriteMode::Merge {
        if let Some(existing) = node {
            if !existing.is_null() && existing.is_object() != value.is_object() {
                return Err(PathError::conflict(
                    path.describe(),
                    format!(
                        "cannot merge a {} into a {}",
                        kind(value),
                        kind(existing)
                    ),
                ));
            }
        }
    }
    Ok(())
}

fn slot_mut<'a>(tree: &'a mut Value, path: &ConfPath) -> Result<&'a mut Value, PathError> {
    let mut node = tree;
    for (depth, segment) in path.segments().iter().enumerate() {
        if node.is_null() {
            *node = Value::Object(Map::new());
        }
        node = match node {
            Value::Object(map) => map.entry(segment.clone()).or_insert(Value::Null),
            Value::Array(items) => match parse_index(segment) {
                Some(index) if index < items.len() => &mut items[index],
                _ => {
                    return Err(PathError::conflict(
                        path.truncated(depth).describe(),
                        format!("'{}' is not an index into the sequence", segment),
                    ))
                }
            },
            other => {
                return Err(PathError::conflict(
                    path.truncated(depth).describe(),
                    format!("cannot descend into a {} with '{}'", kind(other), segment),
                ))
            }
        };
    }
    Ok(node)
}
