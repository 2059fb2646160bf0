//! modelvault-store: Tiered artifact storage
//!
//! This crate provides the storage tiers and the coordinator that keeps
//! them consistent:
//! - Durable stores (in-memory and file-backed)
//! - A bounded, admission-controlled cache
//! - The live artifact index
//! - Per-identifier locking and the write/read protocol

pub mod backend;
pub mod cache;
pub mod coordinator;
pub mod file;
pub mod index;
pub mod locks;
pub mod memory;
pub mod traits;

pub use backend::open_durable;
pub use cache::{ArtifactCache, CacheStats};
pub use coordinator::ArtifactStore;
pub use file::FileStore;
pub use index::ArtifactIndex;
pub use locks::KeyLocks;
pub use memory::MemoryStore;
pub use traits::{CacheTier, CachedArtifact, DurableStore};
