//! Bounded in-memory artifact cache
//!
//! Entries are charged a cost against a fixed budget. When an insert would
//! exceed the budget, the least recently used entries are chosen as
//! victims, but the insert is refused instead if any victim has been
//! accessed more often than the candidate. Access frequencies are sampled
//! in a bounded counter table that is periodically halved so old
//! popularity fades.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use crate::traits::{CacheTier, CachedArtifact};

/// Samples per counter before all frequencies are halved
const RESET_FACTOR: u64 = 10;

struct CacheEntry {
    value: CachedArtifact,
    cost: u64,
    /// Logical clock of the last access
    last_accessed: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    total_cost: u64,
    clock: u64,
    frequencies: HashMap<String, u32>,
    samples: u64,
}

impl CacheState {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn frequency(&self, key: &str) -> u32 {
        self.frequencies.get(key).copied().unwrap_or(0)
    }

    fn record(&mut self, key: &str, num_counters: usize) {
        let count = self.frequencies.entry(key.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        self.samples += 1;

        if self.samples >= RESET_FACTOR * num_counters as u64
            || self.frequencies.len() > num_counters
        {
            for count in self.frequencies.values_mut() {
                *count /= 2;
            }
            self.frequencies.retain(|_, count| *count > 0);
            self.samples = 0;
        }
    }

    fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.total_cost = self.total_cost.saturating_sub(entry.cost);
        Some(entry)
    }
}

/// Admission-controlled cache over artifact payloads
pub struct ArtifactCache {
    /// Maximum total cost
    max_cost: u64,
    /// Size of the frequency counter table
    num_counters: usize,
    state: RwLock<CacheState>,
    hits: AtomicU64,
    misses: AtomicU64,
    admissions: AtomicU64,
    rejections: AtomicU64,
    evictions: AtomicU64,
}

impl ArtifactCache {
    /// Create a new cache
    pub fn new(max_cost: u64, num_counters: usize) -> Self {
        Self {
            max_cost,
            num_counters: num_counters.max(1),
            state: RwLock::new(CacheState::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            admissions: AtomicU64::new(0),
            rejections: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Check if an id is cached without touching its recency
    pub async fn contains(&self, key: &str) -> bool {
        self.state.read().await.entries.contains_key(key)
    }

    /// Number of cached entries
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn reject(&self, key: &str, reason: &'static str) -> bool {
        self.rejections.fetch_add(1, Ordering::Relaxed);
        debug!(key = key, reason = reason, "Cache admission refused");
        false
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        let state = self.state.read().await;
        let utilization = if self.max_cost == 0 {
            0.0
        } else {
            (state.total_cost as f64 / self.max_cost as f64) * 100.0
        };

        CacheStats {
            entries: state.entries.len(),
            total_cost: state.total_cost,
            max_cost: self.max_cost,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            admissions: self.admissions.load(Ordering::Relaxed),
            rejections: self.rejections.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            utilization,
        }
    }
}

#[async_trait]
impl CacheTier for ArtifactCache {
    async fn set(&self, key: &str, value: CachedArtifact, cost: u64) -> bool {
        let mut state = self.state.write().await;
        state.record(key, self.num_counters);

        // A refused overwrite must not leave the previous bytes behind
        state.remove(key);

        if cost > self.max_cost {
            return self.reject(key, "cost exceeds budget");
        }

        let candidate = state.frequency(key);
        let mut victims = Vec::new();
        if state.total_cost + cost > self.max_cost {
            let mut by_access: Vec<(&String, &CacheEntry)> = state.entries.iter().collect();
            by_access.sort_by_key(|(_, entry)| entry.last_accessed);

            let mut freed = 0u64;
            let to_free = state.total_cost + cost - self.max_cost;
            for (victim, entry) in by_access {
                if freed >= to_free {
                    break;
                }
                if state.frequency(victim) > candidate {
                    return self.reject(key, "victim accessed more often");
                }
                freed += entry.cost;
                victims.push(victim.clone());
            }
        }

        for victim in victims {
            state.remove(&victim);
            self.evictions.fetch_add(1, Ordering::Relaxed);
            debug!(key = %victim, "Evicted artifact from cache");
        }

        let last_accessed = state.tick();
        state.total_cost += cost;
        state.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                cost,
                last_accessed,
            },
        );
        self.admissions.fetch_add(1, Ordering::Relaxed);
        true
    }

    async fn get(&self, key: &str) -> Option<CachedArtifact> {
        let mut state = self.state.write().await;
        state.record(key, self.num_counters);

        let now = state.tick();
        match state.entries.get_mut(key) {
            Some(entry) => {
                entry.last_accessed = now;
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    async fn remove(&self, key: &str) {
        self.state.write().await.remove(key);
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Number of cached artifacts
    pub entries: usize,
    /// Cost currently charged
    pub total_cost: u64,
    /// Cost budget
    pub max_cost: u64,
    pub hits: u64,
    pub misses: u64,
    pub admissions: u64,
    pub rejections: u64,
    pub evictions: u64,
    /// Budget utilization percentage
    pub utilization: f64,
}
