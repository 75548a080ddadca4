//! Statements and the registry that links them.
//!
//! A statement is a [`Section`] bound to exactly one [`Helper`]. It holds a
//! weak back-reference to the helper and never to its siblings: every
//! sibling lookup goes through the helper's registry, so any statement can
//! reach any other by name no matter which was registered first.

use crate::error::HelperError;
use crate::helper::{Helper, HelperInner};
use crate::section::Section;
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::debug;

/// Weak back-reference from a statement (or rule) to its helper
#[derive(Clone)]
pub struct TopHandle {
    inner: Weak<HelperInner>,
}

impl TopHandle {
    pub(crate) fn new(inner: Weak<HelperInner>) -> Self {
        Self { inner }
    }

    /// The helper, if it is still alive
    pub fn upgrade(&self) -> Result<Helper, HelperError> {
        self.inner.upgrade().map(Helper::from_inner).ok_or_else(|| {
            HelperError::Configuration("Could not find conf for section: helper is gone".to_string())
        })
    }

    /// Whether this handle points at `helper`
    pub fn belongs_to(&self, helper: &Helper) -> bool {
        std::ptr::eq(self.inner.as_ptr(), helper.inner_ptr())
    }
}

impl fmt::Debug for TopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TopHandle")
            .field("attached", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl From<&Helper> for TopHandle {
    fn from(helper: &Helper) -> Self {
        helper.handle()
    }
}

/// Type recovery for registered statements
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// One configuration concern (entries, output, module rules, ...)
pub trait Statement: Section + AsAny {
    /// The helper this statement was built for
    fn handle(&self) -> &TopHandle;

    /// Another statement registered on the same helper
    fn sibling(&self, name: &str) -> Result<Arc<dyn Statement>, HelperError> {
        self.top()?
            .statement(name)
            .ok_or_else(|| HelperError::Configuration(format!("No statement named '{}'", name)))
    }

    fn sibling_as<T: Statement>(&self, name: &str) -> Result<Arc<T>, HelperError>
    where
        Self: Sized,
    {
        self.top()?.statement_as::<T>(name)
    }
}

/// Recover a concrete statement type
pub fn downcast_statement<T: Statement>(statement: Arc<dyn Statement>) -> Option<Arc<T>> {
    AsAny::into_any(statement).downcast::<T>().ok()
}

#[derive(Default)]
struct Entries {
    by_name: HashMap<String, Arc<dyn Statement>>,
    order: Vec<String>,
}

/// Name -> statement map held by the helper
#[derive(Default)]
pub struct StatementRegistry {
    entries: RwLock<Entries>,
}

impl StatementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `statement` under `name`.
    ///
    /// A taken name is rejected and the registry is left as it was.
    pub fn register(
        &self,
        name: impl Into<String>,
        statement: Arc<dyn Statement>,
    ) -> Result<(), HelperError> {
        let name = name.into();
        let mut entries = self.entries.write();
        if entries.by_name.contains_key(&name) {
            return Err(HelperError::DuplicateRegistration(name));
        }
        debug!(statement = %name, linked = entries.order.len(), "Statement registered");
        entries.order.push(name.clone());
        entries.by_name.insert(name, statement);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Statement>> {
        self.entries.read().by_name.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().by_name.contains_key(name)
    }

    /// Registered names, in registration order
    pub fn names(&self) -> Vec<String> {
        self.entries.read().order.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for StatementRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementRegistry")
            .field("names", &self.names())
            .finish()
    }
}
