//! List snapshots in the repository

use anyhow::{Context, Result};
use cli_lib::util;
use owo_colors::OwoColorize;
use retention::report::write_snapshots;
use retention::SnapshotFilter;
use sk_core::{SnapshotStore, Store};
use std::io::Write;
use std::path::Path;

pub async fn run(repo: Option<&Path>, filter: SnapshotFilter) -> Result<()> {
    let repo_root = util::resolve_repo_root(repo)?;
    let config = util::load_config(&repo_root)?;

    let store = Store::open(&repo_root).context("Failed to open repository")?;
    store.refresh_index().context("Failed to read snapshot index")?;

    let mut snapshots: Vec<_> = store
        .list_snapshots()
        .context("Failed to load snapshots")?
        .into_iter()
        .filter(|s| filter.matches(s))
        .collect();
    snapshots.sort_by(|a, b| a.time.cmp(&b.time));

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_snapshots(&mut out, &snapshots, config.retention.timezone)?;
    out.flush()?;
    drop(out);

    println!("{}", format!("{} snapshots", snapshots.len()).dimmed());
    Ok(())
}
