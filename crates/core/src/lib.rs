//! Snapkeep Core - snapshot records and the repository they live in
//!
//! This crate provides:
//! - Content-addressed snapshot IDs (BLAKE3)
//! - The snapshot metadata record
//! - The `SnapshotStore` seam and its on-disk implementation
//! - The exclusive repository lock

pub mod error;
pub mod hash;
pub mod lock;
pub mod snapshot;
pub mod store;

// Re-export main types for convenience
pub use error::StoreError;
pub use hash::{hash_bytes, SnapshotId};
pub use lock::RepoLock;
pub use snapshot::{Snapshot, SnapshotRecord};
pub use store::{SnapshotStore, Store};

/// Common result type used throughout snapkeep-core
pub type Result<T> = std::result::Result<T, StoreError>;
