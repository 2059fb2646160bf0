//! Per-identifier lock table
//!
//! Writers take an id's lock exclusively, readers that need the durable
//! copy take it shared. Locks for different ids never contend. Entries are
//! created on first use and dropped once nobody holds or waits on them.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

/// Guard for one id; releases the lock and prunes the table on drop
pub struct KeyGuard<'a> {
    locks: &'a KeyLocks,
    key: String,
    read: Option<OwnedRwLockReadGuard<()>>,
    write: Option<OwnedRwLockWriteGuard<()>>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        // Release before pruning so the table's count is exact
        drop(self.read.take());
        drop(self.write.take());
        self.locks.prune(&self.key);
    }
}

/// Table of reader/writer locks keyed by artifact id
#[derive(Default)]
pub struct KeyLocks {
    locks: DashMap<String, Arc<RwLock<()>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, key: &str) -> Arc<RwLock<()>> {
        self.locks.entry(key.to_string()).or_default().clone()
    }

    fn prune(&self, key: &str) {
        // Only the table itself still references an idle lock
        self.locks
            .remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Acquire an id exclusively
    pub async fn write(&self, key: &str) -> KeyGuard<'_> {
        let guard = self.lock_for(key).write_owned().await;
        KeyGuard {
            locks: self,
            key: key.to_string(),
            read: None,
            write: Some(guard),
        }
    }

    /// Acquire an id in shared mode
    pub async fn read(&self, key: &str) -> KeyGuard<'_> {
        let guard = self.lock_for(key).read_owned().await;
        KeyGuard {
            locks: self,
            key: key.to_string(),
            read: Some(guard),
            write: None,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.len()
    }
}
