//! Exclusive repository lock
//!
//! Held for the whole duration of a mutating command. The `flock` on
//! `exclusive.lock` is the lock; the file itself stays in place and only
//! records who holds it. Dropping the guard closes the file, so release
//! happens on every exit path.

use crate::error::StoreError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Lock file name under `.sk/locks/`
pub const EXCLUSIVE_LOCK_FILE: &str = "exclusive.lock";

/// Exclusive repository lock guard
#[derive(Debug)]
pub struct RepoLock {
    path: PathBuf,
    file: File,
}

/// Lock file content
#[derive(Debug, Serialize, Deserialize)]
struct LockContent {
    pid: u32,
    hostname: String,
    started_at: u64,
}

impl RepoLock {
    /// Acquire the exclusive lock in `locks_dir`
    ///
    /// Fails with [`StoreError::LockUnavailable`] if another process holds
    /// it. Holder details left behind by a dead process on this host are
    /// overwritten.
    pub fn acquire(locks_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(locks_dir)?;
        let lock_path = locks_dir.join(EXCLUSIVE_LOCK_FILE);

        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&lock_path)?;

        if !try_flock_exclusive(&file)? {
            // A held flock always has a live owner
            return Err(match Self::read_lock_content(&mut file) {
                Ok(content) => StoreError::LockUnavailable {
                    pid: content.pid,
                    hostname: content.hostname,
                },
                Err(_) => StoreError::LockUnavailable {
                    pid: 0,
                    hostname: String::from("unknown"),
                },
            });
        }

        if let Ok(previous) = Self::read_lock_content(&mut file) {
            if is_stale(&previous) {
                tracing::warn!(pid = previous.pid, "Replacing stale repository lock");
            }
        }

        Self::write_lock_content(&mut file)?;
        tracing::debug!(path = %lock_path.display(), "Acquired exclusive repository lock");

        Ok(Self {
            path: lock_path,
            file,
        })
    }

    /// Path of the lock file backing this guard
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock, reporting failure to clear the holder details
    pub fn release(self) -> Result<()> {
        self.file.set_len(0)?;
        Ok(())
    }

    fn write_lock_content(file: &mut File) -> Result<()> {
        let content = LockContent {
            pid: std::process::id(),
            hostname: current_hostname(),
            started_at: current_timestamp_ms(),
        };

        let serialized = serde_json::to_string(&content)?;

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(serialized.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    fn read_lock_content(file: &mut File) -> Result<LockContent> {
        file.seek(SeekFrom::Start(0))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        // Truncate while still holding the flock; closing the file releases it
        let _ = self.file.set_len(0);
    }
}

/// A lock is stale only if it was taken on this host by a process that is gone
fn is_stale(content: &LockContent) -> bool {
    content.hostname == current_hostname() && !is_process_alive(content.pid)
}

/// Try to acquire exclusive file lock (non-blocking)
fn try_flock_exclusive(file: &File) -> Result<bool> {
    use nix::fcntl::{flock, FlockArg};
    use std::os::unix::io::AsRawFd;

    match flock(file.as_raw_fd(), FlockArg::LockExclusiveNonblock) {
        Ok(_) => Ok(true),
        Err(nix::errno::Errno::EWOULDBLOCK) => Ok(false),
        Err(e) => Err(std::io::Error::from(e).into()),
    }
}

#[cfg(target_os = "linux")]
fn is_process_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{}", pid)).exists()
}

#[cfg(not(target_os = "linux"))]
fn is_process_alive(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    // Null signal: existence check only
    match kill(Pid::from_raw(pid as i32), None) {
        Ok(_) => true,
        Err(nix::errno::Errno::ESRCH) => false,
        Err(_) => true,
    }
}

/// Hostname of this machine, empty if it cannot be determined
pub fn current_hostname() -> String {
    nix::unistd::gethostname()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn current_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
