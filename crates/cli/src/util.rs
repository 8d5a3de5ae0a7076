//! Shared utilities for CLI commands

use crate::config::RepoConfig;
use anyhow::{Context, Result};
use sk_core::store::REPO_DIR;
use std::path::{Path, PathBuf};

/// Find repository root by walking up from `start` to find .sk/
pub fn find_repo_root(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let sk_dir = current.join(REPO_DIR);
        if sk_dir.is_dir() {
            return Ok(current);
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => anyhow::bail!(
                "Not a snapkeep repository (no {} directory found in {} or any parent)",
                REPO_DIR,
                start.display()
            ),
        }
    }
}

/// Repository root from `--repo`, or discovered from the current directory
pub fn resolve_repo_root(repo: Option<&Path>) -> Result<PathBuf> {
    match repo {
        Some(path) => Ok(path.to_path_buf()),
        None => {
            let cwd = std::env::current_dir().context("Failed to get current directory")?;
            find_repo_root(&cwd)
        }
    }
}

/// Load the repository config if a repository can be found, ignoring errors
///
/// Used only to pick the log level before any command runs; commands load
/// the config again and report problems properly.
pub fn try_load_config(repo: Option<&Path>) -> Option<RepoConfig> {
    let sk_dir = resolve_repo_root(repo).ok()?.join(REPO_DIR);
    if !sk_dir.is_dir() {
        return None;
    }
    RepoConfig::load(&sk_dir).ok()
}

/// Load the repository config, with context on failure
pub fn load_config(repo_root: &Path) -> Result<RepoConfig> {
    RepoConfig::load(&repo_root.join(REPO_DIR)).context("Failed to load repository config")
}
