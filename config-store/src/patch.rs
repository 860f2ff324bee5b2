//! The `Patchable` trait describes how a configuration absorbs partial writes

use std::fmt::Debug;
use std::hash::Hash;

use crate::event::FieldChange;

/// Trait for configuration types that can be updated by a partial patch
///
/// Implementors perform a shallow merge: every field present in the patch
/// replaces the current value, and a [`FieldChange`] is reported only when
/// the replacement differs from what was there before.
///
/// # Example
///
/// ```rust
/// use config_store::{FieldChange, Patchable};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Volume {
///     level: u8,
/// }
///
/// #[derive(Default)]
/// struct VolumePatch {
///     level: Option<u8>,
/// }
///
/// #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// enum VolumeField {
///     Level,
/// }
///
/// impl Patchable for Volume {
///     type Patch = VolumePatch;
///     type Field = VolumeField;
///     type Value = u8;
///
///     fn merge(&mut self, patch: VolumePatch) -> Vec<FieldChange<VolumeField, u8>> {
///         let mut changes = Vec::new();
///         if let Some(level) = patch.level {
///             if level != self.level {
///                 changes.push(FieldChange::new(VolumeField::Level, self.level, level));
///                 self.level = level;
///             }
///         }
///         changes
///     }
/// }
///
/// let mut volume = Volume { level: 10 };
/// assert!(volume.merge(VolumePatch { level: Some(10) }).is_empty());
/// assert_eq!(volume.merge(VolumePatch { level: Some(20) }).len(), 1);
/// ```
pub trait Patchable: Clone + Send + Sync + 'static {
    /// Partial write; every field optional
    type Patch: Send;

    /// Field identifier handed to change handlers
    type Field: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    /// Type-erased value of any field
    type Value: Clone + PartialEq + Debug + Send + Sync + 'static;

    /// Apply `patch` in place and return the fields that actually changed
    fn merge(&mut self, patch: Self::Patch) -> Vec<FieldChange<Self::Field, Self::Value>>;
}
