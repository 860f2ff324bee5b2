//! Slot bookkeeping for the calculator's timer chains
//!
//! Every long-lived chain lives in exactly one [`Slot`]. Installing a new
//! handle cancels whatever was there, so a slot never holds two live chains.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::handle::SubscriptionHandle;

/// Named position of a chain owned by the calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    NewDay,
    NewNight,
    Adhan,
    Iqama,
    Qiyam,
}

impl Slot {
    pub const ALL: [Slot; 5] = [
        Slot::NewDay,
        Slot::NewNight,
        Slot::Adhan,
        Slot::Iqama,
        Slot::Qiyam,
    ];
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Slot::NewDay => "NEW_DAY",
            Slot::NewNight => "NEW_NIGHT",
            Slot::Adhan => "ADHAN",
            Slot::Iqama => "IQAMA",
            Slot::Qiyam => "QIYAM",
        };
        f.write_str(name)
    }
}

/// Counters over the registry's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegistryStats {
    /// Slots currently holding a handle
    pub active: usize,
    /// Handles installed so far
    pub armed: u64,
    /// Handles cancelled so far, by replacement or explicit cancel
    pub cancelled: u64,
}

impl fmt::Display for RegistryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} active, {} armed, {} cancelled",
            self.active, self.armed, self.cancelled
        )
    }
}

/// Thread-safe map from [`Slot`] to the handle of its running chain
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    slots: Mutex<HashMap<Slot, SubscriptionHandle>>,
    armed: AtomicU64,
    cancelled: AtomicU64,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `handle` in `slot`, cancelling the previous occupant
    pub fn set(&self, slot: Slot, handle: SubscriptionHandle) {
        let previous = {
            let mut slots = self.slots.lock();
            let previous = slots.remove(&slot);
            if let Some(old) = &previous {
                old.cancel();
            }
            slots.insert(slot, handle);
            tracing::debug!("{} armed, registry size {}", slot, slots.len());
            previous
        };
        self.armed.fetch_add(1, Ordering::Relaxed);
        if previous.is_some() {
            self.cancelled.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Cancel and remove the chain in `slot`; false if the slot was empty
    pub fn cancel(&self, slot: Slot) -> bool {
        let removed = self.slots.lock().remove(&slot);
        match removed {
            Some(handle) => {
                handle.cancel();
                self.cancelled.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("{} cancelled", slot);
                true
            }
            None => false,
        }
    }

    /// Cancel every chain; returns how many were running
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<(Slot, SubscriptionHandle)> = self.slots.lock().drain().collect();
        for (slot, handle) in &drained {
            handle.cancel();
            tracing::debug!("{} cancelled", slot);
        }
        self.cancelled
            .fetch_add(drained.len() as u64, Ordering::Relaxed);
        drained.len()
    }

    pub fn is_active(&self, slot: Slot) -> bool {
        self.slots
            .lock()
            .get(&slot)
            .is_some_and(|handle| !handle.is_cancelled())
    }

    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            active: self.len(),
            armed: self.armed.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
        }
    }
}
