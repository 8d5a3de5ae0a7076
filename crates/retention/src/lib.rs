//! Snapshot retention and the forget workflow
//!
//! This crate provides:
//! - Retention policies (keep-last, calendar buckets, tag protection)
//! - Calendar bucket keys per granularity
//! - The policy evaluator partitioning a group into keep / remove
//! - Grouping by host and path set
//! - The forget workflow driving a `SnapshotStore`
//! - Plain-text snapshot tables

pub mod bucket;
pub mod error;
pub mod evaluate;
pub mod forget;
pub mod group;
pub mod policy;
pub mod report;

// Re-exports
pub use bucket::{bucket_key, BucketKey, Granularity, Timezone};
pub use error::{ForgetError, PolicyError};
pub use evaluate::{apply_policy, Evaluation, KeepReason};
pub use forget::{forget, ForgetOptions, ForgetSummary};
pub use group::{group_snapshots, GroupKey, SnapshotFilter};
pub use policy::RetentionPolicy;

/// Result type for the forget workflow
pub type Result<T> = std::result::Result<T, ForgetError>;
