//! Change events for configuration writes

use std::fmt;

/// A single field whose value was replaced by a write
///
/// Only produced when the old and new values differ, so a handler never
/// sees a no-op change.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange<F, V> {
    /// Which field changed
    pub field: F,
    /// Value before the write
    pub old: V,
    /// Value after the write
    pub new: V,
}

impl<F, V> FieldChange<F, V> {
    /// Create a new change record
    pub fn new(field: F, old: V, new: V) -> Self {
        Self { field, old, new }
    }
}

impl<F: fmt::Debug, V: fmt::Debug> fmt::Display for FieldChange<F, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {:?} -> {:?}", self.field, self.old, self.new)
    }
}
