//! Live artifact index
//!
//! The index is the authority on which artifacts exist. It is only ever
//! written after the durable store has accepted the payload, so every entry
//! names an artifact the durable store can serve.

use modelvault_core::IndexEntry;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;

#[derive(Default)]
struct IndexState {
    entries: HashMap<String, IndexEntry>,
    /// Ids sharing a digest, for duplicate detection
    by_digest: HashMap<String, BTreeSet<String>>,
}

/// In-process id to metadata mapping
#[derive(Default)]
pub struct ArtifactIndex {
    state: RwLock<IndexState>,
}

impl ArtifactIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get metadata for an id
    pub async fn get(&self, id: &str) -> Option<IndexEntry> {
        self.state.read().await.entries.get(id).cloned()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.state.read().await.entries.contains_key(id)
    }

    /// Ids whose payload has the given digest, in id order
    pub async fn find_by_digest(&self, digest: &str) -> Vec<String> {
        self.state
            .read()
            .await
            .by_digest
            .get(digest)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// All entries sorted by id
    pub async fn list(&self) -> Vec<(String, IndexEntry)> {
        let state = self.state.read().await;
        let mut entries: Vec<(String, IndexEntry)> = state
            .entries
            .iter()
            .map(|(id, entry)| (id.clone(), entry.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Record a persisted artifact, returning the entry it replaced
    pub(crate) async fn insert(&self, id: &str, entry: IndexEntry) -> Option<IndexEntry> {
        let mut state = self.state.write().await;
        let digest = entry.digest.clone();

        state
            .by_digest
            .entry(digest.clone())
            .or_default()
            .insert(id.to_string());

        let previous = state.entries.insert(id.to_string(), entry);

        if let Some(old) = &previous {
            if old.digest != digest {
                if let Some(ids) = state.by_digest.get_mut(&old.digest) {
                    ids.remove(id);
                    if ids.is_empty() {
                        state.by_digest.remove(&old.digest);
                    }
                }
            }
        }

        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(payload: &[u8]) -> IndexEntry {
        IndexEntry::new(
            modelvault_core::checksum::digest(payload),
            payload.len() as u64,
        )
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let index = ArtifactIndex::new();
        assert!(index.is_empty().await);

        assert!(index.insert("a", entry(b"one")).await.is_none());

        assert!(index.contains("a").await);
        assert_eq!(index.get("a").await.unwrap().size, 3);
        assert!(index.get("b").await.is_none());
    }

    #[tokio::test]
    async fn test_find_by_digest_groups_duplicates() {
        let index = ArtifactIndex::new();
        index.insert("b", entry(b"same")).await;
        index.insert("a", entry(b"same")).await;
        index.insert("c", entry(b"other")).await;

        let digest = modelvault_core::checksum::digest(b"same");
        assert_eq!(index.find_by_digest(&digest).await, vec!["a", "b"]);
        assert!(index.find_by_digest("unknown").await.is_empty());
    }

    #[tokio::test]
    async fn test_replace_moves_digest_mapping() {
        let index = ArtifactIndex::new();
        index.insert("a", entry(b"v1")).await;
        let previous = index.insert("a", entry(b"v2")).await.unwrap();
        assert_eq!(previous.digest, modelvault_core::checksum::digest(b"v1"));

        let old = modelvault_core::checksum::digest(b"v1");
        let new = modelvault_core::checksum::digest(b"v2");
        assert!(index.find_by_digest(&old).await.is_empty());
        assert_eq!(index.find_by_digest(&new).await, vec!["a"]);
        assert_eq!(index.len().await, 1);
    }

    #[tokio::test]
    async fn test_list_is_sorted() {
        let index = ArtifactIndex::new();
        index.insert("m2", entry(b"2")).await;
        index.insert("m1", entry(b"1")).await;

        let ids: Vec<String> = index.list().await.into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["m1", "m2"]);
    }
}
