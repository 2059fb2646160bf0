//! Artifact and index metadata type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::checksum;

/// A stored binary payload plus its derived content digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Caller-chosen identifier
    pub id: String,
    /// Opaque payload bytes
    pub payload: Vec<u8>,
    /// SHA-256 hex digest of `payload`
    pub digest: String,
}

impl Artifact {
    /// Create an artifact, deriving the digest from the payload
    pub fn new(id: impl Into<String>, payload: Vec<u8>) -> Self {
        let digest = checksum::digest(&payload);
        Self {
            id: id.into(),
            payload,
            digest,
        }
    }

    /// Payload size in bytes
    pub fn size(&self) -> u64 {
        self.payload.len() as u64
    }

    /// Recompute the digest and compare it against the stored one
    pub fn is_intact(&self) -> bool {
        checksum::digest(&self.payload) == self.digest
    }
}

/// Metadata the index keeps for every durably persisted artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// SHA-256 hex digest of the persisted payload
    pub digest: String,
    /// Payload size in bytes
    pub size: u64,
    /// When the payload was persisted (or recovered on open)
    pub stored_at: DateTime<Utc>,
}

impl IndexEntry {
    /// Entry for a payload persisted now
    pub fn new(digest: String, size: u64) -> Self {
        Self {
            digest,
            size,
            stored_at: Utc::now(),
        }
    }
}

/// What a put did to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteOutcome {
    /// First write for this id
    Created,
    /// An existing payload was replaced
    Replaced,
    /// Identical payload already stored, nothing written
    Unchanged,
}

impl std::fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteOutcome::Created => write!(f, "created"),
            WriteOutcome::Replaced => write!(f, "replaced"),
            WriteOutcome::Unchanged => write!(f, "unchanged"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_new_derives_digest() {
        let artifact = Artifact::new("a", vec![0x00, 0x01]);
        assert_eq!(artifact.id, "a");
        assert_eq!(artifact.digest, checksum::digest(&[0x00, 0x01]));
        assert_eq!(artifact.size(), 2);
        assert!(artifact.is_intact());
    }

    #[test]
    fn test_tampered_artifact_is_not_intact() {
        let mut artifact = Artifact::new("a", b"weights".to_vec());
        artifact.payload[0] ^= 0xff;
        assert!(!artifact.is_intact());
    }

    #[test]
    fn test_index_entry_new() {
        let artifact = Artifact::new("m", vec![7; 16]);
        let entry = IndexEntry::new(artifact.digest.clone(), artifact.size());
        assert_eq!(entry.digest, artifact.digest);
        assert_eq!(entry.size, 16);
    }

    #[test]
    fn test_artifact_json_roundtrip() {
        let artifact = Artifact::new("m", vec![1, 2, 3]);
        let json = serde_json::to_string(&artifact).unwrap();
        let back: Artifact = serde_json::from_str(&json).unwrap();
        assert_eq!(back, artifact);
    }
}
