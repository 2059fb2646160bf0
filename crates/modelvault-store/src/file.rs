//! File-backed durable store
//!
//! Every artifact lives in its own file under a base directory. Ids are
//! hex-encoded into file names so any opaque id maps to a safe path and
//! can be recovered from a directory listing.

use async_trait::async_trait;
use modelvault_core::StorageError;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::traits::DurableStore;

const PAYLOAD_EXT: &str = "bin";
const TMP_PREFIX: &str = ".tmp-";
/// Longest id whose encoded file name stays under common 255-byte limits
pub const MAX_KEY_LEN: usize = 120;

/// Durable store writing one file per artifact
pub struct FileStore {
    /// Base path for artifact files
    base_path: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `base_path`, creating the directory if needed
    pub async fn open(base_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base_path = base_path.into();
        if !tokio::fs::try_exists(&base_path).await? {
            tokio::fs::create_dir_all(&base_path).await?;
            info!(path = %base_path.display(), "Created artifact directory");
        }
        Ok(Self { base_path })
    }

    /// Get the file path for an artifact id
    pub fn artifact_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey("empty id".to_string()));
        }
        if key.len() > MAX_KEY_LEN {
            return Err(StorageError::InvalidKey(format!(
                "id longer than {} bytes",
                MAX_KEY_LEN
            )));
        }
        Ok(self
            .base_path
            .join(format!("{}.{}", hex::encode(key), PAYLOAD_EXT)))
    }

    fn key_from_path(path: &Path) -> Option<String> {
        if path.extension().map_or(true, |e| e != PAYLOAD_EXT) {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        let bytes = hex::decode(stem).ok()?;
        String::from_utf8(bytes).ok()
    }
}

#[async_trait]
impl DurableStore for FileStore {
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let path = self.artifact_path(key)?;
        let tmp_path = self
            .base_path
            .join(format!("{}{}", TMP_PREFIX, Uuid::new_v4()));

        let written = async {
            let mut file = tokio::fs::File::create(&tmp_path).await?;
            file.write_all(value).await?;
            file.sync_all().await?;
            tokio::fs::rename(&tmp_path, &path).await
        }
        .await;

        if let Err(e) = written {
            // The previous payload, if any, is still intact at `path`
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        debug!(key = key, size = value.len(), "Wrote artifact file");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.artifact_path(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();

        let mut entries = tokio::fs::read_dir(&self.base_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            match Self::key_from_path(&path) {
                Some(key) => keys.push(key),
                None => {
                    let is_tmp = path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .map_or(false, |n| n.starts_with(TMP_PREFIX));
                    if !is_tmp {
                        warn!(path = %path.display(), "Skipping unrecognized file in artifact directory");
                    }
                }
            }
        }

        Ok(keys)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_artifact_path() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        let path = store.artifact_path("ai/llama3:8b").unwrap();
        assert_eq!(
            path,
            dir.path().join(format!("{}.bin", hex::encode("ai/llama3:8b")))
        );
    }

    #[tokio::test]
    async fn test_open_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("models.db");
        FileStore::open(&nested).await.unwrap();
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn test_put_get_and_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        store.put("ai/llama3:8b", b"gguf").await.unwrap();
        store.put("empty", b"").await.unwrap();

        assert_eq!(store.get("ai/llama3:8b").await.unwrap().unwrap(), b"gguf");
        assert_eq!(store.get("empty").await.unwrap().unwrap(), b"");
        assert!(store.get("missing").await.unwrap().is_none());

        let mut keys = store.keys().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["ai/llama3:8b".to_string(), "empty".to_string()]);
    }

    #[tokio::test]
    async fn test_put_replaces_previous_payload() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        store.put("m", b"first").await.unwrap();
        store.put("m", b"second").await.unwrap();

        assert_eq!(store.get("m").await.unwrap().unwrap(), b"second");
        assert_eq!(store.keys().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        assert!(matches!(
            store.put("", b"x").await,
            Err(StorageError::InvalidKey(_))
        ));
        let long = "x".repeat(MAX_KEY_LEN + 1);
        assert!(matches!(
            store.put(&long, b"x").await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_rename_leaves_no_partial_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        store.put("kept", b"earlier").await.unwrap();

        // A non-empty directory at the target path makes the rename fail
        let blocked = store.artifact_path("blocked").unwrap();
        std::fs::create_dir(&blocked).unwrap();
        std::fs::write(blocked.join("inner"), b"x").unwrap();

        assert!(matches!(
            store.put("blocked", b"new bytes").await,
            Err(StorageError::Io(_))
        ));

        let leftovers: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(TMP_PREFIX))
            .collect();
        assert!(leftovers.is_empty(), "temp files left: {:?}", leftovers);

        assert!(blocked.is_dir());
        assert_eq!(std::fs::read(blocked.join("inner")).unwrap(), b"x");
        assert_eq!(store.get("kept").await.unwrap().unwrap(), b"earlier");
    }

    #[tokio::test]
    async fn test_keys_skips_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        store.put("kept", b"1").await.unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hi").unwrap();
        std::fs::write(dir.path().join("zz.bin"), b"not hex").unwrap();

        assert_eq!(store.keys().await.unwrap(), vec!["kept".to_string()]);
    }
}
