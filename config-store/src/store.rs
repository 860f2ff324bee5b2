//! Shared configuration store with change notification
//!
//! This module provides the core storage primitive:
//! - `ConfigStore<C>`: a cloneable handle to one configuration value
//! - `HandlerId`: token returned by `on_change` for later removal

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::event::FieldChange;
use crate::patch::Patchable;

/// Change handler signature
pub type ChangeHandler<C> = Arc<
    dyn Fn(&FieldChange<<C as Patchable>::Field, <C as Patchable>::Value>) + Send + Sync,
>;

/// Identifier of a registered change handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

impl HandlerId {
    /// Get the raw ID value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler-{}", self.0)
    }
}

// ============================================================================
// ConfigStore<C> - shallow-merge store with per-field change handlers
// ============================================================================

/// Configuration store that notifies handlers about every changed field
///
/// Cloning the store yields another handle to the same configuration.
/// Handlers are invoked synchronously from `set`, after the write has been
/// committed and the internal lock released, so a handler is free to read
/// the store (or even write it again).
///
/// # Example
///
/// ```rust,ignore
/// let store = ConfigStore::new(config);
/// store.on_change(|change| println!("{}", change));
///
/// // Only fields whose value differs are reported
/// let changes = store.set(patch);
/// ```
pub struct ConfigStore<C: Patchable> {
    /// Current configuration value
    value: Arc<RwLock<C>>,

    /// Registered handlers, in registration order
    handlers: Arc<RwLock<Vec<(HandlerId, ChangeHandler<C>)>>>,

    /// Counter for handler IDs
    next_handler: Arc<AtomicU64>,
}

impl<C: Patchable> ConfigStore<C> {
    /// Create a store holding `initial`
    pub fn new(initial: C) -> Self {
        Self {
            value: Arc::new(RwLock::new(initial)),
            handlers: Arc::new(RwLock::new(Vec::new())),
            next_handler: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Snapshot of the current configuration
    pub fn get(&self) -> C {
        self.value.read().clone()
    }

    /// Read the configuration without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&C) -> R) -> R {
        f(&self.value.read())
    }

    /// Shallow-merge `patch` into the configuration
    ///
    /// Every changed field is reported to every handler. Returns the changes
    /// that were applied; an empty vector means the write was a no-op.
    pub fn set(&self, patch: C::Patch) -> Vec<FieldChange<C::Field, C::Value>> {
        let changes = {
            let mut value = self.value.write();
            value.merge(patch)
        };
        self.notify(&changes);
        changes
    }

    /// Merge `patch` onto a copy, validate it, and only then commit
    ///
    /// Nothing is written and no handler runs when `validate` rejects the
    /// merged configuration.
    pub fn try_set<E>(
        &self,
        patch: C::Patch,
        validate: impl FnOnce(&C) -> Result<(), E>,
    ) -> Result<Vec<FieldChange<C::Field, C::Value>>, E> {
        let changes = {
            let mut value = self.value.write();
            let mut candidate = value.clone();
            let changes = candidate.merge(patch);
            if changes.is_empty() {
                return Ok(changes);
            }
            validate(&candidate)?;
            *value = candidate;
            changes
        };
        self.notify(&changes);
        Ok(changes)
    }

    /// Register a handler invoked once per changed field
    pub fn on_change<F>(&self, handler: F) -> HandlerId
    where
        F: Fn(&FieldChange<C::Field, C::Value>) + Send + Sync + 'static,
    {
        let id = HandlerId(self.next_handler.fetch_add(1, Ordering::Relaxed));
        self.handlers.write().push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler; returns false if it was not registered
    pub fn remove_handler(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    /// Number of registered handlers
    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }

    fn notify(&self, changes: &[FieldChange<C::Field, C::Value>]) {
        if changes.is_empty() {
            return;
        }

        // Snapshot so handlers can register or remove handlers themselves
        let handlers: Vec<ChangeHandler<C>> = self
            .handlers
            .read()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for change in changes {
            tracing::debug!("config field changed: {}", change);
            for handler in &handlers {
                handler(change);
            }
        }
    }
}

impl<C: Patchable> Clone for ConfigStore<C> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            handlers: Arc::clone(&self.handlers),
            next_handler: Arc::clone(&self.next_handler),
        }
    }
}

impl<C: Patchable + fmt::Debug> fmt::Debug for ConfigStore<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStore")
            .field("value", &*self.value.read())
            .field("handler_count", &self.handler_count())
            .finish()
    }
}
