//! Artifact producers

use async_trait::async_trait;
use rand::RngCore;
use uuid::Uuid;

use crate::VaultResult;

/// Supplies new `(id, payload)` pairs on demand.
///
/// The store treats the id as opaque and does not check it for uniqueness
/// beyond its overwrite policy.
#[async_trait]
pub trait ArtifactProducer: Send + Sync {
    /// Produce the next artifact
    async fn produce(&self) -> VaultResult<(String, Vec<u8>)>;
}

/// Default payload size of a generated model
pub const DEFAULT_MODEL_SIZE: usize = 1024;

/// Produces random placeholder models named `model-<uuid>`
#[derive(Debug, Clone)]
pub struct RandomProducer {
    size: usize,
}

impl RandomProducer {
    pub fn new(size: usize) -> Self {
        Self { size }
    }
}

impl Default for RandomProducer {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_SIZE)
    }
}

#[async_trait]
impl ArtifactProducer for RandomProducer {
    async fn produce(&self) -> VaultResult<(String, Vec<u8>)> {
        let mut payload = vec![0u8; self.size];
        rand::thread_rng().fill_bytes(&mut payload);
        Ok((format!("model-{}", Uuid::new_v4()), payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_random_producer() {
        let producer = RandomProducer::default();
        let (id, payload) = producer.produce().await.unwrap();
        assert!(id.starts_with("model-"));
        assert_eq!(payload.len(), DEFAULT_MODEL_SIZE);
    }

    #[tokio::test]
    async fn test_random_producer_ids_are_distinct() {
        let producer = RandomProducer::new(8);
        let (a, _) = producer.produce().await.unwrap();
        let (b, _) = producer.produce().await.unwrap();
        assert_ne!(a, b);
    }
}
