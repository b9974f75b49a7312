//! In-flight run registry
//!
//! Two concurrent runs over the same `(asset_scope, period)` key would
//! double-count the same custody events and raise duplicate incidents.
//! The registry is an arena of in-flight run keys guarded by atomic
//! insertion: a trigger acquires its key before entering `IN_PROGRESS`
//! and the key is released when the returned guard drops, on success or
//! failure. Sequential re-triggers of the same key are allowed.

use crate::{Error, Result};
use custody_core::Period;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Uniqueness key for an in-flight run
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunKey {
    /// Optional asset scope
    pub asset_scope: Option<Uuid>,

    /// Reconciled period
    pub period: Period,
}

/// Registry of in-flight run keys
#[derive(Clone, Default)]
pub struct RunRegistry {
    in_flight: Arc<DashMap<RunKey, Uuid>>,
}

impl RunRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claim `key` for `run_id`. Fails with `RunInFlight`
    /// naming the holder when the key is already claimed.
    pub fn try_acquire(&self, key: RunKey, run_id: Uuid) -> Result<RunGuard> {
        match self.in_flight.entry(key.clone()) {
            Entry::Occupied(existing) => Err(Error::RunInFlight(*existing.get())),
            Entry::Vacant(slot) => {
                slot.insert(run_id);
                Ok(RunGuard {
                    in_flight: Arc::clone(&self.in_flight),
                    key,
                })
            }
        }
    }

    /// Number of keys currently claimed
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }
}

/// Holds a claimed run key; releases it on drop
#[derive(Debug)]
pub struct RunGuard {
    in_flight: Arc<DashMap<RunKey, Uuid>>,
    key: RunKey,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.in_flight.remove(&self.key);
    }
}
