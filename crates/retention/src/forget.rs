//! The forget workflow
//!
//! Order of operations, stopping at the first error:
//! 1. Take the exclusive repository lock (released when this function returns)
//! 2. Refresh the store index
//! 3. Remove every snapshot named explicitly, bypassing the policy
//! 4. Return early if the policy is empty
//! 5. Load the remaining snapshots, group them, and apply the policy per group
//! 6. Report each group and remove its `remove` set
//!
//! Under dry run the store's removal path is never called.

use crate::bucket::Timezone;
use crate::error::ForgetError;
use crate::evaluate::{apply_policy, Evaluation};
use crate::group::{group_snapshots, GroupKey, SnapshotFilter};
use crate::policy::RetentionPolicy;
use crate::report::write_snapshots;
use crate::Result;
use snapkeep_core::{SnapshotId, SnapshotStore};
use std::collections::HashSet;
use std::io::{self, Write};

/// Everything one `forget` invocation needs
#[derive(Debug, Clone, Default)]
pub struct ForgetOptions {
    /// Full IDs or unique prefixes to remove unconditionally
    pub ids: Vec<String>,
    pub policy: RetentionPolicy,
    /// Pre-filter deciding which snapshots are evaluated at all
    pub filter: SnapshotFilter,
    pub dry_run: bool,
}

/// What a forget run did (or would have done)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForgetSummary {
    pub removed: Vec<SnapshotId>,
    pub would_remove: Vec<SnapshotId>,
    pub kept: usize,
    pub groups: usize,
}

/// Run forget against `store`, writing the report to `out`
pub fn forget<S, W>(store: &S, opts: &ForgetOptions, out: &mut W) -> Result<ForgetSummary>
where
    S: SnapshotStore,
    W: Write,
{
    opts.policy.validate()?;

    let _lock = store.lock_exclusive()?;
    store.refresh_index()?;

    let mut summary = ForgetSummary::default();

    for prefix in &opts.ids {
        let id = store.resolve_id(prefix)?;
        if opts.dry_run {
            writeln!(out, "would remove snapshot {}", id.short()).map_err(ForgetError::Report)?;
            summary.would_remove.push(id);
        } else {
            store.remove_snapshot(&id)?;
            writeln!(out, "removed snapshot {}", id.short()).map_err(ForgetError::Report)?;
            summary.removed.push(id);
        }
    }

    if opts.policy.is_empty() {
        tracing::debug!("Retention policy is empty, nothing more to do");
        return Ok(summary);
    }

    // Under dry run the explicitly named snapshots still exist; leave them
    // out so the report matches what a real run would evaluate.
    let already_forgotten: HashSet<SnapshotId> = summary.would_remove.iter().copied().collect();
    let snapshots = store
        .list_snapshots()?
        .into_iter()
        .filter(|s| !already_forgotten.contains(&s.id));

    let groups = group_snapshots(snapshots, &opts.filter);
    tracing::info!(groups = groups.len(), policy = %opts.policy, "Applying retention policy");

    for (key, group) in &groups {
        let evaluation = apply_policy(group, &opts.policy);

        for (snapshot, reasons) in evaluation.keep.iter().zip(&evaluation.reasons) {
            let reasons: Vec<String> = reasons.iter().map(ToString::to_string).collect();
            tracing::info!(
                id = %snapshot.id.short(),
                reasons = %reasons.join(","),
                "Keeping snapshot"
            );
        }

        write_group_report(&mut *out, key, &evaluation, opts.policy.timezone)
            .map_err(ForgetError::Report)?;

        summary.kept += evaluation.keep.len();
        summary.groups += 1;

        for snapshot in &evaluation.remove {
            if opts.dry_run {
                summary.would_remove.push(snapshot.id);
            } else {
                store.remove_snapshot(&snapshot.id)?;
                summary.removed.push(snapshot.id);
            }
        }
    }

    Ok(summary)
}

fn write_group_report<W: Write>(
    out: &mut W,
    key: &GroupKey,
    evaluation: &Evaluation,
    timezone: Timezone,
) -> io::Result<()> {
    writeln!(out, "snapshots for {}:\n", key)?;

    writeln!(out, "keep {} snapshots:", evaluation.keep.len())?;
    write_snapshots(&mut *out, &evaluation.keep, timezone)?;
    writeln!(out)?;

    writeln!(out, "remove {} snapshots:", evaluation.remove.len())?;
    write_snapshots(&mut *out, &evaluation.remove, timezone)?;
    writeln!(out)
}
