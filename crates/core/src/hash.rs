//! BLAKE3 content addressing for snapshot records

use serde::{Deserialize, Serialize};

/// Length of the abbreviated ID shown in reports
pub const SHORT_ID_LEN: usize = 8;

/// Identifier of a snapshot: the BLAKE3 hash of its serialized record
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct SnapshotId([u8; 32]);

impl SnapshotId {
    /// Create a new SnapshotId from bytes
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the ID as a byte slice
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Full lowercase hex form (64 characters)
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Abbreviated form used in tables and status lines
    pub fn short(&self) -> String {
        let mut hex = self.to_hex();
        hex.truncate(SHORT_ID_LEN);
        hex
    }

    /// Parse from a full 64-character hex string
    ///
    /// Returns `None` for anything that is not exactly 32 hex-encoded bytes,
    /// so callers can fall back to prefix matching.
    pub fn from_hex(s: &str) -> Option<Self> {
        if s.len() != 64 {
            return None;
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).ok()?;
        Some(Self(bytes))
    }
}

impl std::fmt::Debug for SnapshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SnapshotId({})", self.short())
    }
}

impl std::fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Hash bytes using BLAKE3
pub fn hash_bytes(data: &[u8]) -> SnapshotId {
    let hash = blake3::hash(data);
    SnapshotId::from_bytes(*hash.as_bytes())
}
