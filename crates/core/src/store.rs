//! On-disk snapshot repository

use crate::error::StoreError;
use crate::hash::{hash_bytes, SnapshotId};
use crate::lock::RepoLock;
use crate::snapshot::{Snapshot, SnapshotRecord};
use crate::Result;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Name of the repository metadata directory
pub const REPO_DIR: &str = ".sk";

/// Operations retention needs from a snapshot repository
pub trait SnapshotStore {
    /// Guard returned by [`SnapshotStore::lock_exclusive`]; dropping it releases the lock
    type Lock;

    /// Take the repository-wide exclusive lock
    fn lock_exclusive(&self) -> Result<Self::Lock>;

    /// Rebuild the in-memory view of which snapshots exist
    fn refresh_index(&self) -> Result<()>;

    /// Resolve a full ID or unique ID prefix
    fn resolve_id(&self, prefix: &str) -> Result<SnapshotId>;

    /// Load every snapshot in the index
    fn list_snapshots(&self) -> Result<Vec<Snapshot>>;

    /// Delete a single snapshot record
    fn remove_snapshot(&self, id: &SnapshotId) -> Result<()>;
}

/// Filesystem-backed snapshot repository
///
/// Manages the `.sk/` directory structure:
/// ```text
/// .sk/
///   config.toml
///   snapshots/
///     <64 hex chars>     JSON snapshot record, named by its hash
///   locks/
///     exclusive.lock
///   tmp/
/// ```
pub struct Store {
    /// Root of repository
    root: PathBuf,
    /// Path to .sk directory
    sk_dir: PathBuf,
    /// Known snapshots: id -> record file
    index: RwLock<BTreeMap<SnapshotId, PathBuf>>,
}

impl Store {
    /// Initialize a new repository at the given root
    pub fn init(repo_root: &Path) -> Result<Self> {
        let sk_dir = repo_root.join(REPO_DIR);
        if sk_dir.exists() {
            return Err(StoreError::AlreadyInitialized(sk_dir));
        }

        for sub in ["snapshots", "locks", "tmp"] {
            fs::create_dir_all(sk_dir.join(sub))?;
        }

        tracing::info!(path = %sk_dir.display(), "Initialized repository");
        Self::open(repo_root)
    }

    /// Open an existing repository
    ///
    /// The index starts empty; call [`SnapshotStore::refresh_index`] before lookups.
    pub fn open(repo_root: &Path) -> Result<Self> {
        let sk_dir = repo_root.join(REPO_DIR);
        if !sk_dir.is_dir() {
            return Err(StoreError::NotARepository(repo_root.to_path_buf()));
        }

        Ok(Self {
            root: repo_root.to_path_buf(),
            sk_dir,
            index: RwLock::new(BTreeMap::new()),
        })
    }

    /// Store a snapshot record, returning its content-addressed ID
    pub fn insert(&self, record: &SnapshotRecord) -> Result<SnapshotId> {
        let bytes = record.encode()?;
        let id = hash_bytes(&bytes);
        let target = self.snapshot_path(&id);

        if !target.exists() {
            atomic_write(&self.sk_dir.join("tmp"), &target, &bytes)?;
        }

        self.index.write().insert(id, target);
        Ok(id)
    }

    /// Number of snapshots currently indexed
    pub fn count(&self) -> usize {
        self.index.read().len()
    }

    /// Get the .sk directory path
    pub fn sk_dir(&self) -> &Path {
        &self.sk_dir
    }

    /// Get the repository root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn snapshots_dir(&self) -> PathBuf {
        self.sk_dir.join("snapshots")
    }

    fn snapshot_path(&self, id: &SnapshotId) -> PathBuf {
        self.snapshots_dir().join(id.to_hex())
    }

    fn load(&self, id: SnapshotId, path: &Path) -> Result<Snapshot> {
        let bytes = fs::read(path)?;
        if hash_bytes(&bytes) != id {
            return Err(StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: "content hash does not match file name".to_string(),
            });
        }

        let record = SnapshotRecord::decode(&bytes).map_err(|e| StoreError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(Snapshot::with_id(id, record))
    }
}

impl SnapshotStore for Store {
    type Lock = RepoLock;

    fn lock_exclusive(&self) -> Result<RepoLock> {
        RepoLock::acquire(&self.sk_dir.join("locks"))
    }

    fn refresh_index(&self) -> Result<()> {
        let mut index = BTreeMap::new();

        for entry in fs::read_dir(self.snapshots_dir())? {
            let entry = entry?;
            let name = entry.file_name();
            match name.to_str().and_then(SnapshotId::from_hex) {
                Some(id) => {
                    index.insert(id, entry.path());
                }
                None => {
                    tracing::debug!(file = ?name, "Skipping non-snapshot file");
                }
            }
        }

        tracing::debug!(count = index.len(), "Refreshed snapshot index");
        *self.index.write() = index;
        Ok(())
    }

    fn resolve_id(&self, prefix: &str) -> Result<SnapshotId> {
        let index = self.index.read();

        if let Some(id) = SnapshotId::from_hex(prefix) {
            return if index.contains_key(&id) {
                Ok(id)
            } else {
                Err(StoreError::NotFound(prefix.to_string()))
            };
        }

        if prefix.is_empty() {
            return Err(StoreError::NotFound(prefix.to_string()));
        }

        let needle = prefix.to_ascii_lowercase();
        let matching: Vec<SnapshotId> = index
            .keys()
            .filter(|id| id.to_hex().starts_with(&needle))
            .copied()
            .collect();

        match matching.as_slice() {
            [id] => Ok(*id),
            [] => Err(StoreError::NotFound(prefix.to_string())),
            _ => Err(StoreError::AmbiguousId {
                prefix: prefix.to_string(),
                matches: matching.len(),
            }),
        }
    }

    fn list_snapshots(&self) -> Result<Vec<Snapshot>> {
        let index = self.index.read();
        index
            .iter()
            .map(|(id, path)| self.load(*id, path))
            .collect()
    }

    fn remove_snapshot(&self, id: &SnapshotId) -> Result<()> {
        let path = self.snapshot_path(id);
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_hex()));
            }
            Err(e) => return Err(e.into()),
        }

        self.index.write().remove(id);
        tracing::info!(id = %id.short(), "Removed snapshot");
        Ok(())
    }
}

/// Atomic write helper
///
/// Writes data to a temporary file, fsyncs it, then renames it to the target path.
pub fn atomic_write(tmp_dir: &Path, target: &Path, data: &[u8]) -> Result<()> {
    fs::create_dir_all(tmp_dir)?;

    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = tmp_dir.join(format!("{}.{}.tmp", file_name, std::process::id()));

    {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
    }

    if let Err(e) = fs::rename(&tmp_path, target) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    Ok(())
}
