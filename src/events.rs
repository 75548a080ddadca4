//! Synchronous, in-process event dispatch.
//!
//! Handlers run in registration order on the caller's thread. The handler
//! list is snapshotted before a trigger, so the lock is never held while a
//! handler runs and handlers may register more handlers or call back into
//! their context. Handlers added during a trigger run on the next one.

use crate::error::HelperError;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Event handler receiving the dispatch context and the trigger arguments
pub type Handler<C> = Arc<dyn Fn(&C, &[Value]) -> Result<(), HelperError> + Send + Sync>;

pub struct EventDispatcher<C> {
    handlers: RwLock<HashMap<String, Vec<Handler<C>>>>,
}

impl<C> EventDispatcher<C> {
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Append a handler for `event`
    pub fn on<F>(&self, event: impl Into<String>, handler: F)
    where
        F: Fn(&C, &[Value]) -> Result<(), HelperError> + Send + Sync + 'static,
    {
        let event = event.into();
        let mut handlers = self.handlers.write();
        let list = handlers.entry(event.clone()).or_default();
        list.push(Arc::new(handler));
        debug!(event = %event, handlers = list.len(), "Handler registered");
    }

    /// Invoke every handler for `event` in order.
    ///
    /// The first failing handler stops the dispatch and its error is returned.
    /// Returns the number of handlers that ran.
    pub fn trigger(&self, context: &C, event: &str, args: &[Value]) -> Result<usize, HelperError> {
        let snapshot = self.handlers(event);
        debug!(event = %event, handlers = snapshot.len(), "Triggering event");
        for (index, handler) in snapshot.iter().enumerate() {
            trace!(event = %event, index, "Invoking handler");
            handler(context, args)?;
        }
        Ok(snapshot.len())
    }

    /// Snapshot of the handlers currently registered for `event`
    pub fn handlers(&self, event: &str) -> Vec<Handler<C>> {
        self.handlers.read().get(event).cloned().unwrap_or_default()
    }

    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers.read().get(event).map_or(0, Vec::len)
    }

    /// Names of events with at least one handler
    pub fn events(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.read().keys().cloned().collect();
        names.sort();
        names
    }
}

impl<C> Default for EventDispatcher<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for EventDispatcher<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<String, usize> = self
            .handlers
            .read()
            .iter()
            .map(|(name, list)| (name.clone(), list.len()))
            .collect();
        f.debug_struct("EventDispatcher")
            .field("handlers", &counts)
            .finish()
    }
}
