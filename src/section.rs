//! Namespaced access to the shared configuration tree.

use crate::addressing::{self, ConfPath, ReadOptions, WriteOptions};
use crate::constants::Constants;
use crate::error::HelperError;
use crate::helper::Helper;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Anything that reads and writes a subtree of a [`Helper`]'s configuration.
///
/// The tree itself always lives in the root helper. A section only knows how
/// to reach that helper (`top`), where its own subtree is attached (`anchor`)
/// and an optional namespace prepended to every path it is given.
pub trait Section {
    /// The root helper owning the tree
    fn top(&self) -> Result<Helper, HelperError>;

    /// Location of this section's subtree in the root tree
    fn anchor(&self) -> ConfPath {
        ConfPath::root()
    }

    /// Fixed namespace applied to every path passed to `get`/`set`
    fn namespace(&self) -> Option<&str> {
        None
    }

    /// Apply the namespace, once
    fn ns(&self, path: &ConfPath) -> ConfPath {
        match self.namespace() {
            Some(ns) => path.prefixed(ns),
            None => path.clone(),
        }
    }

    /// Absolute location of `path` in the root tree
    fn locate(&self, path: &ConfPath) -> ConfPath {
        self.anchor().join(&self.ns(path))
    }

    fn get_at(&self, path: &ConfPath, options: &ReadOptions) -> Result<Option<Value>, HelperError> {
        let top = self.top()?;
        let location = self.locate(path);
        debug!(path = %location, required = options.required, "get");
        let value = top.read_tree(|tree| addressing::read(tree, &location, options))?;
        Ok(value)
    }

    fn set_at(&self, path: &ConfPath, value: Value, options: &WriteOptions) -> Result<(), HelperError> {
        let top = self.top()?;
        let location = self.locate(path);
        debug!(path = %location, mode = ?options.mode, "set");
        top.write_tree(|tree| addressing::write(tree, &location, value, options))?;
        Ok(())
    }

    /// Push onto the sequence at `path`; returns the new element's index
    fn append_at(&self, path: &ConfPath, value: Value) -> Result<usize, HelperError> {
        let top = self.top()?;
        let location = self.locate(path);
        debug!(path = %location, "append");
        let index = top.write_tree(|tree| addressing::append(tree, &location, value))?;
        Ok(index)
    }

    /// Snapshot of this section's subtree (an empty mapping if it is unset)
    fn conf(&self) -> Result<Value, HelperError> {
        let top = self.top()?;
        let anchor = self.anchor();
        Ok(top
            .read_tree(|tree| addressing::lookup(tree, &anchor).cloned())
            .unwrap_or_else(|| Value::Object(Map::new())))
    }

    /// Shared constant table, always the root's
    fn constants(&self) -> Result<Arc<Constants>, HelperError> {
        Ok(self.top()?.constants())
    }

    /// Write with merge semantics, so repeated calls on sibling keys accumulate
    fn set<P, V>(&self, path: P, value: V) -> Result<&Self, HelperError>
    where
        Self: Sized,
        P: Into<ConfPath>,
        V: Into<Value>,
    {
        self.set_at(&path.into(), value.into(), &WriteOptions::merge())?;
        Ok(self)
    }

    fn set_with<P, V>(&self, path: P, value: V, options: &WriteOptions) -> Result<&Self, HelperError>
    where
        Self: Sized,
        P: Into<ConfPath>,
        V: Into<Value>,
    {
        self.set_at(&path.into(), value.into(), options)?;
        Ok(self)
    }

    fn get<P>(&self, path: P) -> Result<Option<Value>, HelperError>
    where
        Self: Sized,
        P: Into<ConfPath>,
    {
        self.get_at(&path.into(), &ReadOptions::default())
    }

    fn get_with<P>(&self, path: P, options: &ReadOptions) -> Result<Option<Value>, HelperError>
    where
        Self: Sized,
        P: Into<ConfPath>,
    {
        self.get_at(&path.into(), options)
    }
}
