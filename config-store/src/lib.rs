//! Generic Configuration Store
//!
//! A small, type-safe configuration holder whose writes are shallow merges
//! and whose readers react through explicit change handlers.
//!
//! # Features
//!
//! - **Shallow Merge**: Apply partial patches; absent fields are untouched
//! - **Change Detection**: Handlers only hear about fields whose value differs
//! - **Validated Writes**: `try_set` commits only when a validator accepts the result
//! - **Shared Handles**: Clones of a store observe and write the same value
//!
//! # Architecture
//!
//! ```text
//! ConfigStore<C: Patchable>
//!     │
//!     ├── value: RwLock<C>
//!     │       │
//!     │       └── C::merge(patch) -> Vec<FieldChange>
//!     │
//!     └── handlers: Vec<(HandlerId, Fn(&FieldChange))>
//!             │
//!             └── invoked once per changed field, after the lock is released
//! ```

// Modules
pub mod event;
pub mod patch;
pub mod store;

// Re-exports - Public API
pub use event::FieldChange;
pub use patch::Patchable;
pub use store::{ChangeHandler, ConfigStore, HandlerId};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::event::FieldChange;
    pub use crate::patch::Patchable;
    pub use crate::store::{ConfigStore, HandlerId};
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Debug, PartialEq)]
    struct Waits {
        fajr: u32,
        isha: u32,
    }

    #[derive(Default, Clone)]
    struct WaitsPatch {
        fajr: Option<u32>,
        isha: Option<u32>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum WaitField {
        Fajr,
        Isha,
    }

    impl Patchable for Waits {
        type Patch = WaitsPatch;
        type Field = WaitField;
        type Value = u32;

        fn merge(&mut self, patch: WaitsPatch) -> Vec<FieldChange<WaitField, u32>> {
            let mut changes = Vec::new();
            for (field, slot, value) in [
                (WaitField::Fajr, &mut self.fajr, patch.fajr),
                (WaitField::Isha, &mut self.isha, patch.isha),
            ] {
                if let Some(value) = value {
                    if *slot != value {
                        changes.push(FieldChange::new(field, *slot, value));
                        *slot = value;
                    }
                }
            }
            changes
        }
    }

    #[rstest]
    #[case(WaitsPatch::default(), 0)]
    #[case(WaitsPatch { fajr: Some(20), isha: None }, 0)]
    #[case(WaitsPatch { fajr: Some(25), isha: None }, 1)]
    #[case(WaitsPatch { fajr: Some(25), isha: Some(10) }, 2)]
    fn test_change_count(#[case] patch: WaitsPatch, #[case] expected: usize) {
        let store = ConfigStore::new(Waits { fajr: 20, isha: 15 });
        let calls = Arc::new(Mutex::new(0usize));
        let calls_clone = Arc::clone(&calls);
        store.on_change(move |_| *calls_clone.lock().unwrap() += 1);

        assert_eq!(store.set(patch).len(), expected);
        assert_eq!(*calls.lock().unwrap(), expected);
    }

    #[test]
    fn test_two_stores_kept_in_sync() {
        let prayer = ConfigStore::new(Waits { fajr: 20, isha: 15 });
        let night = ConfigStore::new(Waits { fajr: 20, isha: 15 });

        let patch = WaitsPatch {
            fajr: Some(30),
            isha: None,
        };
        prayer.set(patch.clone());
        night.set(patch);

        assert_eq!(prayer.get(), night.get());
    }
}
