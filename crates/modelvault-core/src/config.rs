//! Configuration types for modelvault

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Durable storage configuration
    pub storage: StorageConfig,
    /// Cache configuration
    pub cache: CacheConfig,
    /// Write path configuration
    pub write: WriteConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl VaultConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, crate::VaultError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::VaultError::Config(format!("Failed to read config file: {}", e))
        })?;
        toml::from_str(&content)
            .map_err(|e| crate::VaultError::Config(format!("Failed to parse config: {}", e)))
    }
}

/// Durable backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// In-process map, lost on exit
    Memory,
    /// One file per artifact under `path`
    File,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Durable backend
    pub backend: BackendType,
    /// Directory for the file backend
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendType::File,
            path: PathBuf::from("models.db"),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Total cost budget; every artifact costs 1
    pub max_cost: u64,
    /// Number of keys tracked for admission frequency
    pub num_counters: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_cost: 1000,
            num_counters: 1000,
        }
    }
}

/// What a put does when the id already holds a different payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Fail with a conflict error
    #[default]
    Reject,
    /// Replace the stored payload
    Replace,
}

/// Write path configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteConfig {
    pub overwrite: OverwritePolicy,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_vault_config() {
        let config = VaultConfig::default();
        assert_eq!(config.storage.backend, BackendType::File);
        assert_eq!(config.storage.path, PathBuf::from("models.db"));
        assert_eq!(config.cache.max_cost, 1000);
        assert_eq!(config.write.overwrite, OverwritePolicy::Reject);
    }

    #[test]
    fn test_vault_config_parse() {
        let toml_str = r#"
[storage]
backend = "memory"

[cache]
max_cost = 64

[write]
overwrite = "replace"
"#;
        let config: VaultConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.storage.backend, BackendType::Memory);
        assert_eq!(config.cache.max_cost, 64);
        assert_eq!(config.cache.num_counters, 1000);
        assert_eq!(config.write.overwrite, OverwritePolicy::Replace);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_vault_config_from_missing_file() {
        let err = VaultConfig::from_file(std::path::Path::new("/nonexistent/vault.toml"))
            .unwrap_err();
        assert!(matches!(err, crate::VaultError::Config(_)));
    }
}
