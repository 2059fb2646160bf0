//! modelvault-core: Core types and traits for modelvault
//!
//! This crate provides the fundamental types used throughout the store:
//! - Artifacts and index metadata
//! - Content digests
//! - Artifact producers
//! - Configuration types
//! - Error handling

pub mod artifact;
pub mod checksum;
pub mod config;
pub mod error;
pub mod producer;

pub use artifact::*;
pub use config::*;
pub use error::*;
pub use producer::*;
