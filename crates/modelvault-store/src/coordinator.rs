//! Three-tier write coordination
//!
//! A put computes the digest, persists the payload, offers it to the cache
//! and finally records it in the index, all while holding the id's lock
//! exclusively. The index is therefore never ahead of the durable store,
//! and two puts for the same id never interleave.
//!
//! Reads try the cache without any lock. On a miss they take the id's lock
//! in shared mode before consulting the index and the durable store, so a
//! durable read never observes bytes from a put that has not completed.
//! A cache hit can return a put's bytes once they are persisted and cached
//! but before the index entry lands; those bytes are already durable.
//!
//! Stores are built with [`ArtifactStore::open`], which rebuilds the index
//! from the durable store so existing artifacts are neither hidden nor
//! silently overwritten.

use modelvault_core::{
    checksum, Artifact, ArtifactProducer, IndexEntry, OverwritePolicy, VaultError, VaultResult,
    WriteOutcome,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::index::ArtifactIndex;
use crate::locks::KeyLocks;
use crate::traits::{CacheTier, CachedArtifact, DurableStore};

/// Cache cost charged per artifact
pub const ARTIFACT_COST: u64 = 1;

/// Artifact store coordinating the durable, cache and index tiers
pub struct ArtifactStore {
    durable: Arc<dyn DurableStore>,
    cache: Arc<dyn CacheTier>,
    index: ArtifactIndex,
    locks: KeyLocks,
    overwrite: OverwritePolicy,
}

impl ArtifactStore {
    fn with_empty_index(
        durable: Arc<dyn DurableStore>,
        cache: Arc<dyn CacheTier>,
        overwrite: OverwritePolicy,
    ) -> Self {
        Self {
            durable,
            cache,
            index: ArtifactIndex::new(),
            locks: KeyLocks::new(),
            overwrite,
        }
    }

    /// Create a store and rebuild its index from what the durable store
    /// already holds
    pub async fn open(
        durable: Arc<dyn DurableStore>,
        cache: Arc<dyn CacheTier>,
        overwrite: OverwritePolicy,
    ) -> VaultResult<Self> {
        let store = Self::with_empty_index(durable, cache, overwrite);

        for key in store.durable.keys().await? {
            match store.durable.get(&key).await? {
                Some(payload) => {
                    let entry = IndexEntry::new(checksum::digest(&payload), payload.len() as u64);
                    store.index.insert(&key, entry).await;
                }
                None => warn!(id = %key, "Listed artifact vanished during recovery"),
            }
        }

        let artifacts = store.index.len().await;
        info!(
            backend = store.durable.name(),
            artifacts = artifacts,
            "Artifact index recovered"
        );

        Ok(store)
    }

    /// Store a payload under `id` and return its digest
    pub async fn put(&self, id: &str, payload: &[u8]) -> VaultResult<String> {
        self.put_with_outcome(id, payload)
            .await
            .map(|(digest, _)| digest)
    }

    /// Store a payload under `id`, reporting whether anything changed
    pub async fn put_with_outcome(
        &self,
        id: &str,
        payload: &[u8],
    ) -> VaultResult<(String, WriteOutcome)> {
        let digest = checksum::digest(payload);
        let _guard = self.locks.write(id).await;

        let outcome = match self.index.get(id).await {
            None => WriteOutcome::Created,
            Some(existing) if existing.digest == digest => {
                debug!(id = id, digest = %digest, "Artifact already stored");
                return Ok((digest, WriteOutcome::Unchanged));
            }
            Some(existing) => match self.overwrite {
                OverwritePolicy::Replace => WriteOutcome::Replaced,
                OverwritePolicy::Reject => {
                    return Err(VaultError::Conflict {
                        id: id.to_string(),
                        existing: existing.digest,
                    });
                }
            },
        };

        if let Err(source) = self.durable.put(id, payload).await {
            warn!(id = id, error = %source, "Failed to persist artifact");
            return Err(VaultError::PersistFailure {
                id: id.to_string(),
                source,
            });
        }

        let cached = CachedArtifact {
            payload: Arc::new(payload.to_vec()),
            digest: digest.clone(),
        };
        if !self.cache.set(id, cached, ARTIFACT_COST).await {
            self.cache.remove(id).await;
            debug!(id = id, "Artifact not admitted to cache");
        }

        self.index
            .insert(id, IndexEntry::new(digest.clone(), payload.len() as u64))
            .await;

        info!(
            id = id,
            digest = %digest,
            size = payload.len(),
            outcome = %outcome,
            "Stored artifact"
        );

        Ok((digest, outcome))
    }

    /// Get an artifact's payload, `None` if it was never stored
    pub async fn get(&self, id: &str) -> VaultResult<Option<Vec<u8>>> {
        Ok(self.get_artifact(id).await?.map(|artifact| artifact.payload))
    }

    /// Get an artifact with its digest, `None` if it was never stored
    pub async fn get_artifact(&self, id: &str) -> VaultResult<Option<Artifact>> {
        if let Some(cached) = self.cache.get(id).await {
            debug!(id = id, "Cache hit");
            return Ok(Some(Artifact {
                id: id.to_string(),
                payload: cached.payload.as_ref().clone(),
                digest: cached.digest,
            }));
        }

        let _guard = self.locks.read(id).await;

        let Some(entry) = self.index.get(id).await else {
            return Ok(None);
        };

        let payload = self.load_verified(id, &entry).await?;

        let cached = CachedArtifact {
            payload: Arc::new(payload.clone()),
            digest: entry.digest.clone(),
        };
        self.cache.set(id, cached, ARTIFACT_COST).await;

        debug!(id = id, size = payload.len(), "Served artifact from durable store");

        Ok(Some(Artifact {
            id: id.to_string(),
            payload,
            digest: entry.digest,
        }))
    }

    /// Get an artifact, treating absence as an error
    pub async fn fetch(&self, id: &str) -> VaultResult<Artifact> {
        self.get_artifact(id)
            .await?
            .ok_or_else(|| VaultError::NotFound(id.to_string()))
    }

    /// Re-read the durable copy and check it against the indexed digest
    pub async fn verify(&self, id: &str) -> VaultResult<IndexEntry> {
        let _guard = self.locks.read(id).await;

        let entry = self
            .index
            .get(id)
            .await
            .ok_or_else(|| VaultError::NotFound(id.to_string()))?;
        self.load_verified(id, &entry).await?;

        Ok(entry)
    }

    /// Produce a new artifact and store it
    pub async fn produce_and_put(&self, producer: &dyn ArtifactProducer) -> VaultResult<Artifact> {
        let (id, payload) = producer.produce().await?;
        let digest = self.put(&id, &payload).await?;
        Ok(Artifact {
            id,
            payload,
            digest,
        })
    }

    /// Index metadata for an id
    pub async fn stat(&self, id: &str) -> Option<IndexEntry> {
        self.index.get(id).await
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.index.contains(id).await
    }

    /// All stored artifacts sorted by id
    pub async fn list(&self) -> Vec<(String, IndexEntry)> {
        self.index.list().await
    }

    /// Ids holding a payload with this digest
    pub async fn find_by_digest(&self, digest: &str) -> Vec<String> {
        self.index.find_by_digest(digest).await
    }

    pub async fn len(&self) -> usize {
        self.index.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.index.is_empty().await
    }

    async fn load_verified(&self, id: &str, entry: &IndexEntry) -> VaultResult<Vec<u8>> {
        let payload = match self.durable.get(id).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                return Err(inconsistency(id, "indexed artifact is missing from durable store"))
            }
            Err(e) => return Err(inconsistency(id, format!("durable read failed: {}", e))),
        };

        let actual = checksum::digest(&payload);
        if actual != entry.digest {
            return Err(inconsistency(
                id,
                format!("digest mismatch: expected {}, found {}", entry.digest, actual),
            ));
        }

        Ok(payload)
    }
}

fn inconsistency(id: &str, reason: impl Into<String>) -> VaultError {
    let reason = reason.into();
    warn!(id = id, reason = %reason, "Durability inconsistency");
    VaultError::DurabilityInconsistency {
        id: id.to_string(),
        reason,
    }
}
