//! Per-asset-id mutual exclusion.
//!
//! Two concurrent replaces of the same asset would otherwise race on both
//! the filesystem and the record, and could commit one caller's bytes with
//! the other's metadata. Serializing mutations per id makes every final
//! state fully one caller's. Operations on different ids stay independent.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Registry of one async mutex per mutated id (asset or parent).
#[derive(Debug, Default)]
pub(crate) struct LockRegistry {
    locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl LockRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the mutex for an id, creating it on first use. Entries are
    /// tiny and bounded by the set of ids mutated over the process lifetime.
    pub async fn acquire(&self, id: Uuid) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}
