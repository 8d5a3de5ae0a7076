//! Repository fixtures seeded through the store API

use chrono::{DateTime, Duration, TimeZone, Utc};
use sk_core::{SnapshotId, SnapshotRecord, SnapshotStore, Store};
use std::path::Path;
use tempfile::TempDir;

/// A throwaway repository in a temp directory
pub struct TestRepo {
    dir: TempDir,
    store: Store,
}

impl TestRepo {
    /// Create and initialize an empty repository
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = Store::init(dir.path()).expect("Failed to init store");
        Self { dir, store }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Add one snapshot
    pub fn add(
        &self,
        time: DateTime<Utc>,
        host: &str,
        paths: &[&str],
        tags: &[&str],
    ) -> SnapshotId {
        self.store
            .insert(&SnapshotRecord {
                time,
                hostname: host.to_string(),
                paths: paths.iter().map(|p| p.to_string()).collect(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
            })
            .expect("Failed to insert snapshot")
    }

    /// One snapshot per day for `days` consecutive days, oldest first
    pub fn add_daily(&self, host: &str, days: i64) -> Vec<SnapshotId> {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 2, 0, 0).unwrap();
        (0..days)
            .map(|d| self.add(base + Duration::days(d), host, &["/home"], &[]))
            .collect()
    }

    /// IDs currently on disk
    pub fn snapshot_ids(&self) -> Vec<SnapshotId> {
        let store = Store::open(self.path()).expect("Failed to open store");
        store.refresh_index().expect("Failed to refresh index");
        store
            .list_snapshots()
            .expect("Failed to list snapshots")
            .iter()
            .map(|s| s.id)
            .collect()
    }
}
