//! Errors raised by the snapshot store and the repository lock

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no snapshot found matching '{0}'")]
    NotFound(String),

    #[error("ambiguous snapshot prefix '{prefix}': matches {matches} snapshots")]
    AmbiguousId {
        prefix: String,
        matches: usize,
    },

    #[error("repository is already locked exclusively by PID {pid} on host '{hostname}'")]
    LockUnavailable {
        pid: u32,
        hostname: String,
    },

    #[error("not a snapkeep repository (no .sk directory found at {})", .0.display())]
    NotARepository(PathBuf),

    #[error("repository already initialized at {}", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("corrupt snapshot file {}: {reason}", path.display())]
    Corrupt {
        path: PathBuf,
        reason: String,
    },

    #[error("io error")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON")]
    Json(#[from] serde_json::Error),
}
