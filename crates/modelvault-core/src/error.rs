//! Error types for modelvault

use thiserror::Error;

/// Errors raised by a durable storage backend
#[derive(Error, Debug)]
pub enum StorageError {
    /// IO error from a file-backed store
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific failure
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Key cannot be represented by the backend
    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// Main error type for modelvault
#[derive(Error, Debug)]
pub enum VaultError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The durable store rejected a write; no other tier was touched
    #[error("Failed to persist artifact {id}: {source}")]
    PersistFailure {
        id: String,
        #[source]
        source: StorageError,
    },

    /// The index claims the artifact exists but the durable store cannot
    /// produce a matching payload
    #[error("Durability inconsistency for artifact {id}: {reason}")]
    DurabilityInconsistency { id: String, reason: String },

    /// Artifact not found
    #[error("Artifact not found: {0}")]
    NotFound(String),

    /// A different payload is already stored under this id
    #[error("Artifact {id} already exists with digest {existing}")]
    Conflict { id: String, existing: String },

    /// Storage error outside the write path (e.g. index recovery)
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Artifact producer failed
    #[error("Producer error: {0}")]
    Producer(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for modelvault operations
pub type VaultResult<T> = Result<T, VaultError>;

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        VaultError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for VaultError {
    fn from(err: toml::de::Error) -> Self {
        VaultError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let err = VaultError::Config("invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: invalid config");
    }

    #[test]
    fn test_persist_failure_keeps_source() {
        let err = VaultError::PersistFailure {
            id: "b".to_string(),
            source: StorageError::Backend("disk full".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Failed to persist artifact b: Storage backend error: disk full"
        );
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "Storage backend error: disk full");
    }

    #[test]
    fn test_storage_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: StorageError = io_err.into();
        assert!(matches!(err, StorageError::Io(_)));
    }
}
