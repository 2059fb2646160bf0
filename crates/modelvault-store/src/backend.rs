//! Durable backend selection

use modelvault_core::{BackendType, StorageConfig, VaultResult};
use std::sync::Arc;
use tracing::info;

use crate::file::FileStore;
use crate::memory::MemoryStore;
use crate::traits::DurableStore;

/// Build the durable store described by the configuration
pub async fn open_durable(config: &StorageConfig) -> VaultResult<Arc<dyn DurableStore>> {
    let store: Arc<dyn DurableStore> = match config.backend {
        BackendType::Memory => Arc::new(MemoryStore::new()),
        BackendType::File => Arc::new(FileStore::open(&config.path).await?),
    };

    info!(backend = store.name(), path = %config.path.display(), "Opened durable store");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_memory_backend() {
        let config = StorageConfig {
            backend: BackendType::Memory,
            ..Default::default()
        };
        let store = open_durable(&config).await.unwrap();
        assert_eq!(store.name(), "memory");
    }

    #[tokio::test]
    async fn test_open_file_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            backend: BackendType::File,
            path: dir.path().join("models.db"),
        };
        let store = open_durable(&config).await.unwrap();
        assert_eq!(store.name(), "file");
        assert!(config.path.is_dir());
    }
}
