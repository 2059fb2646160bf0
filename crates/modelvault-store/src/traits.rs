//! Storage tier trait definitions

use async_trait::async_trait;
use modelvault_core::StorageError;
use std::sync::Arc;

/// Durable key-value engine backing the store.
///
/// Keys are artifact ids and values are raw payloads. `get` must return
/// exactly the bytes the last successful `put` received for that key.
/// Timeouts and retries, if any, are the implementation's concern.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Persist a payload, replacing any previous value
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Read a payload, `None` if the key was never written
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// List every stored key
    async fn keys(&self) -> Result<Vec<String>, StorageError>;

    /// Get the backend name
    fn name(&self) -> &'static str;
}

/// Value held by a cache tier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedArtifact {
    pub payload: Arc<Vec<u8>>,
    pub digest: String,
}

/// Bounded, non-authoritative accelerator over durable reads
#[async_trait]
pub trait CacheTier: Send + Sync {
    /// Offer an entry; `false` means admission was refused
    async fn set(&self, key: &str, value: CachedArtifact, cost: u64) -> bool;

    /// Look up an entry
    async fn get(&self, key: &str) -> Option<CachedArtifact>;

    /// Drop an entry if present
    async fn remove(&self, key: &str);
}
