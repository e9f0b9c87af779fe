//! Per-entity serialization for state writes.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// A table of async mutexes keyed by entity id.
///
/// Holding the guard returned by [`acquire`](Self::acquire) excludes every
/// other holder for the same id within this process. Ids that nobody is
/// holding or waiting on are pruned from the table on the next acquire.
#[derive(Debug, Default)]
pub struct EntityLocks {
    slots: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl EntityLocks {
    /// Creates an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until the lock for `entity_id` is free and takes it.
    pub async fn acquire(&self, entity_id: &str) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock();
            // Only the table itself holds an idle slot.
            slots.retain(|id, slot| id == entity_id || Arc::strong_count(slot) > 1);
            Arc::clone(
                slots
                    .entry(entity_id.to_string())
                    .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
            )
        };
        slot.lock_owned().await
    }

    /// Returns the number of ids currently tracked.
    pub fn tracked(&self) -> usize {
        self.slots.lock().len()
    }
}
