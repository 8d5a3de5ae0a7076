//! Grouping snapshots into independently evaluated retention groups

use snapkeep_core::Snapshot;
use std::collections::BTreeMap;
use std::fmt;

/// Identity of a retention group: host plus the colon-joined path list
///
/// Path order is significant, so `/a:/b` and `/b:/a` are different groups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    pub hostname: String,
    pub paths: String,
}

impl GroupKey {
    pub fn of(snapshot: &Snapshot) -> Self {
        Self {
            hostname: snapshot.hostname.clone(),
            paths: snapshot.paths.join(":"),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "host {}, directories {}", self.hostname, self.paths)
    }
}

/// Restricts which snapshots take part in policy evaluation at all
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotFilter {
    /// Only snapshots from this host
    pub hostname: Option<String>,
    /// Only snapshots carrying all of these tags
    pub tags: Vec<String>,
}

impl SnapshotFilter {
    pub fn matches(&self, snapshot: &Snapshot) -> bool {
        if let Some(hostname) = &self.hostname {
            if !hostname.is_empty() && snapshot.hostname != *hostname {
                return false;
            }
        }
        snapshot.has_tags(&self.tags)
    }
}

/// Bucket the snapshots passing `filter` by [`GroupKey`], preserving load order
pub fn group_snapshots<I>(
    snapshots: I,
    filter: &SnapshotFilter,
) -> BTreeMap<GroupKey, Vec<Snapshot>>
where
    I: IntoIterator<Item = Snapshot>,
{
    let mut groups: BTreeMap<GroupKey, Vec<Snapshot>> = BTreeMap::new();

    for snapshot in snapshots {
        if !filter.matches(&snapshot) {
            continue;
        }
        groups.entry(GroupKey::of(&snapshot)).or_default().push(snapshot);
    }

    groups
}
