//! Snapshot metadata records

use crate::hash::{hash_bytes, SnapshotId};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The persisted form of a snapshot
///
/// The snapshot's ID is the hash of exactly these bytes as encoded by
/// [`SnapshotRecord::encode`], so the record carries no ID of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// When the backup was taken
    pub time: DateTime<Utc>,
    /// Host the backup was taken on
    pub hostname: String,
    /// Backed-up paths, in the order given to the backup
    pub paths: Vec<String>,
    /// Free-form labels
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SnapshotRecord {
    /// Canonical JSON encoding
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a record from its stored bytes
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// A point-in-time backup, as seen by retention
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub id: SnapshotId,
    pub time: DateTime<Utc>,
    pub hostname: String,
    pub paths: Vec<String>,
    pub tags: Vec<String>,
}

impl Snapshot {
    /// Build a snapshot from a record, deriving its content-addressed ID
    pub fn new(record: SnapshotRecord) -> Result<Self> {
        let id = hash_bytes(&record.encode()?);
        Ok(Self::with_id(id, record))
    }

    /// Attach an already known ID to a record
    pub fn with_id(id: SnapshotId, record: SnapshotRecord) -> Self {
        Self {
            id,
            time: record.time,
            hostname: record.hostname,
            paths: record.paths,
            tags: record.tags,
        }
    }

    /// True if the snapshot carries every tag in `required`
    pub fn has_tags(&self, required: &[String]) -> bool {
        required.iter().all(|tag| self.tags.contains(tag))
    }

    /// True if the snapshot carries at least one tag yielded by `wanted`
    pub fn has_any_tag<'a, I>(&self, wanted: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        wanted.into_iter().any(|tag| self.tags.contains(tag))
    }
}
