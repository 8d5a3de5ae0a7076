//! Policy evaluation: partition a group into snapshots to keep and to remove
//!
//! Every rule is an independent pass over the same time-sorted slice that
//! returns the indices it selects. The keep set is the union of all passes.
//!
//! 1. Tag pass: snapshots carrying a protected tag. These are exempt from
//!    every later pass and do not use up any of their slots.
//! 2. Last pass: the `keep_last` newest of the remaining snapshots.
//! 3. Bucket passes (hourly, daily, weekly, monthly, yearly): each walks the
//!    snapshots left after passes 1 and 2, newest first, and picks the first
//!    snapshot of every not yet seen calendar bucket until its limit is hit.
//!    Passes may pick the same snapshot.

use crate::bucket::{bucket_key, Granularity, Timezone};
use crate::policy::RetentionPolicy;
use snapkeep_core::Snapshot;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

/// Why a snapshot ended up in the keep set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeepReason {
    Tagged,
    Last,
    Bucket(Granularity),
}

impl fmt::Display for KeepReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeepReason::Tagged => f.write_str("tagged"),
            KeepReason::Last => f.write_str("last"),
            KeepReason::Bucket(g) => write!(f, "{}", g),
        }
    }
}

/// Outcome of applying a policy to one group
///
/// Both lists are ordered newest first. `reasons[i]` explains `keep[i]`.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    pub keep: Vec<Snapshot>,
    pub remove: Vec<Snapshot>,
    pub reasons: Vec<Vec<KeepReason>>,
}

/// Apply `policy` to a single retention group
///
/// An empty policy keeps the whole group.
pub fn apply_policy(group: &[Snapshot], policy: &RetentionPolicy) -> Evaluation {
    let sorted = sort_newest_first(group);

    if policy.is_empty() {
        return Evaluation {
            reasons: vec![Vec::new(); sorted.len()],
            keep: sorted.into_iter().cloned().collect(),
            remove: Vec::new(),
        };
    }

    let mut reasons: Vec<Vec<KeepReason>> = vec![Vec::new(); sorted.len()];

    let tagged = tag_pass(&sorted, &policy.keep_tags);
    for &i in &tagged {
        reasons[i].push(KeepReason::Tagged);
    }

    let candidates: Vec<usize> = (0..sorted.len()).filter(|i| !tagged.contains(i)).collect();
    let (last, remaining) = candidates.split_at(policy.keep_last.min(candidates.len()));
    for &i in last {
        reasons[i].push(KeepReason::Last);
    }
    tracing::debug!(tagged = tagged.len(), last = last.len(), "Applied tag and last passes");

    for granularity in Granularity::ALL {
        let picked = bucket_pass(
            &sorted,
            remaining,
            granularity,
            policy.count(granularity),
            policy.timezone,
        );
        tracing::debug!(%granularity, picked = picked.len(), "Applied bucket pass");
        for i in picked {
            reasons[i].push(KeepReason::Bucket(granularity));
        }
    }

    let mut evaluation = Evaluation::default();
    for (snapshot, why) in sorted.into_iter().zip(reasons) {
        if why.is_empty() {
            evaluation.remove.push(snapshot.clone());
        } else {
            evaluation.keep.push(snapshot.clone());
            evaluation.reasons.push(why);
        }
    }
    evaluation
}

/// Stable sort by time, newest first; equal timestamps keep their input order
fn sort_newest_first(group: &[Snapshot]) -> Vec<&Snapshot> {
    let mut sorted: Vec<&Snapshot> = group.iter().collect();
    sorted.sort_by(|a, b| b.time.cmp(&a.time));
    sorted
}

fn tag_pass(sorted: &[&Snapshot], keep_tags: &BTreeSet<String>) -> BTreeSet<usize> {
    if keep_tags.is_empty() {
        return BTreeSet::new();
    }
    sorted
        .iter()
        .enumerate()
        .filter(|(_, s)| s.has_any_tag(keep_tags))
        .map(|(i, _)| i)
        .collect()
}

/// Pick the newest snapshot of each of the `limit` most recent buckets among `candidates`
fn bucket_pass(
    sorted: &[&Snapshot],
    candidates: &[usize],
    granularity: Granularity,
    limit: usize,
    timezone: Timezone,
) -> Vec<usize> {
    let mut consumed = HashSet::new();
    let mut picked = Vec::new();

    for &i in candidates {
        if picked.len() >= limit {
            break;
        }
        if consumed.insert(bucket_key(sorted[i].time, granularity, timezone)) {
            picked.push(i);
        }
    }

    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use snapkeep_core::{SnapshotId, SnapshotRecord};

    fn snap(time: DateTime<Utc>, tags: &[&str]) -> Snapshot {
        Snapshot::new(SnapshotRecord {
            time,
            hostname: "host".to_string(),
            paths: vec!["/data".to_string()],
            tags: tags.iter().map(|t| t.to_string()).collect(),
        })
        .unwrap()
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap()
    }

    fn ids(list: &[Snapshot]) -> Vec<SnapshotId> {
        list.iter().map(|s| s.id).collect()
    }

    fn tags(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_daily_keeps_three_most_recent_days() {
        let group: Vec<Snapshot> = (1..=10).map(|d| snap(day(d), &[])).collect();
        let policy = RetentionPolicy {
            keep_daily: 3,
            ..Default::default()
        };

        let result = apply_policy(&group, &policy);

        assert_eq!(ids(&result.keep), vec![group[9].id, group[8].id, group[7].id]);
        assert_eq!(result.remove.len(), 7);
        assert_eq!(result.remove[0].id, group[6].id);
        assert_eq!(result.remove[6].id, group[0].id);
    }

    #[test]
    fn test_tags_only_keeps_exactly_tagged() {
        let group = vec![
            snap(day(1), &["pin"]),
            snap(day(2), &[]),
            snap(day(3), &["pin", "other"]),
            snap(day(4), &[]),
            snap(day(5), &["pin"]),
        ];
        let policy = RetentionPolicy {
            keep_tags: tags(&["pin"]),
            ..Default::default()
        };

        let result = apply_policy(&group, &policy);

        assert_eq!(ids(&result.keep), vec![group[4].id, group[2].id, group[0].id]);
        assert_eq!(ids(&result.remove), vec![group[3].id, group[1].id]);
        assert!(result
            .reasons
            .iter()
            .all(|r| r.as_slice() == [KeepReason::Tagged]));
    }

    #[test]
    fn test_tagged_snapshots_do_not_use_last_slots() {
        let group = vec![
            snap(day(1), &[]),
            snap(day(2), &[]),
            snap(day(3), &["pin"]),
        ];
        let policy = RetentionPolicy {
            keep_last: 1,
            keep_tags: tags(&["pin"]),
            ..Default::default()
        };

        let result = apply_policy(&group, &policy);

        // day 3 is tagged, so the last slot goes to day 2
        assert_eq!(ids(&result.keep), vec![group[2].id, group[1].id]);
        assert_eq!(ids(&result.remove), vec![group[0].id]);
        assert_eq!(result.reasons[0], vec![KeepReason::Tagged]);
        assert_eq!(result.reasons[1], vec![KeepReason::Last]);
    }

    #[test]
    fn test_last_larger_than_group_keeps_all() {
        let group: Vec<Snapshot> = (1..=3).map(|d| snap(day(d), &[])).collect();
        let policy = RetentionPolicy {
            keep_last: 10,
            ..Default::default()
        };

        let result = apply_policy(&group, &policy);

        assert_eq!(result.keep.len(), 3);
        assert!(result.remove.is_empty());
    }

    #[test]
    fn test_last_kept_excluded_from_bucket_passes() {
        // Two snapshots on day 2, one on day 1
        let early = snap(day(1), &[]);
        let morning = snap(Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap(), &[]);
        let evening = snap(Utc.with_ymd_and_hms(2024, 3, 2, 20, 0, 0).unwrap(), &[]);
        let group = vec![early.clone(), morning.clone(), evening.clone()];
        let policy = RetentionPolicy {
            keep_last: 1,
            keep_daily: 1,
            ..Default::default()
        };

        let result = apply_policy(&group, &policy);

        // evening is last-kept; the daily pass then sees morning first
        assert_eq!(ids(&result.keep), vec![evening.id, morning.id]);
        assert_eq!(ids(&result.remove), vec![early.id]);
        assert_eq!(result.reasons[1], vec![KeepReason::Bucket(Granularity::Daily)]);
    }

    #[test]
    fn test_passes_may_select_same_snapshot() {
        let group: Vec<Snapshot> = (1..=4).map(|d| snap(day(d), &[])).collect();
        let policy = RetentionPolicy {
            keep_hourly: 1,
            keep_daily: 2,
            keep_monthly: 1,
            ..Default::default()
        };

        let result = apply_policy(&group, &policy);

        assert_eq!(ids(&result.keep), vec![group[3].id, group[2].id]);
        assert_eq!(
            result.reasons[0],
            vec![
                KeepReason::Bucket(Granularity::Hourly),
                KeepReason::Bucket(Granularity::Daily),
                KeepReason::Bucket(Granularity::Monthly),
            ]
        );
        assert_eq!(result.reasons[1], vec![KeepReason::Bucket(Granularity::Daily)]);
    }

    #[test]
    fn test_one_per_bucket() {
        // Four snapshots per day over three days
        let start = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let group: Vec<Snapshot> = (0..12)
            .map(|i| snap(start + Duration::hours(6 * i), &[]))
            .collect();
        let policy = RetentionPolicy {
            keep_daily: 5,
            ..Default::default()
        };

        let result = apply_policy(&group, &policy);

        // Only three distinct days exist; the newest of each is kept
        assert_eq!(ids(&result.keep), vec![group[11].id, group[7].id, group[3].id]);
        assert_eq!(result.remove.len(), 9);
    }

    #[test]
    fn test_weekly_monthly_yearly() {
        let times = [
            Utc.with_ymd_and_hms(2024, 6, 12, 0, 0, 0).unwrap(), // W24, Jun 2024
            Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap(), // W24
            Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap(),  // W23
            Utc.with_ymd_and_hms(2024, 5, 20, 0, 0, 0).unwrap(), // W21, May 2024
            Utc.with_ymd_and_hms(2023, 11, 1, 0, 0, 0).unwrap(), // 2023
            Utc.with_ymd_and_hms(2022, 2, 1, 0, 0, 0).unwrap(),  // 2022
        ];
        let group: Vec<Snapshot> = times.iter().map(|t| snap(*t, &[])).collect();

        let weekly = apply_policy(
            &group,
            &RetentionPolicy { keep_weekly: 3, ..Default::default() },
        );
        assert_eq!(ids(&weekly.keep), vec![group[0].id, group[2].id, group[3].id]);

        let monthly = apply_policy(
            &group,
            &RetentionPolicy { keep_monthly: 2, ..Default::default() },
        );
        assert_eq!(ids(&monthly.keep), vec![group[0].id, group[3].id]);

        let yearly = apply_policy(
            &group,
            &RetentionPolicy { keep_yearly: 10, ..Default::default() },
        );
        assert_eq!(ids(&yearly.keep), vec![group[0].id, group[4].id, group[5].id]);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let mut group: Vec<Snapshot> = (1..=6).map(|d| snap(day(d), &[])).collect();
        let policy = RetentionPolicy {
            keep_last: 2,
            ..Default::default()
        };
        let forward = apply_policy(&group, &policy);
        group.reverse();
        let backward = apply_policy(&group, &policy);

        assert_eq!(ids(&forward.keep), ids(&backward.keep));
        assert_eq!(ids(&forward.remove), ids(&backward.remove));
    }

    #[test]
    fn test_equal_timestamps_keep_input_order() {
        let first = snap(day(5), &["a"]);
        let second = snap(day(5), &["b"]);
        let older = snap(day(1), &[]);
        let group = vec![first.clone(), second.clone(), older.clone()];
        let policy = RetentionPolicy {
            keep_last: 1,
            ..Default::default()
        };

        let result = apply_policy(&group, &policy);

        assert_eq!(ids(&result.keep), vec![first.id]);
        assert_eq!(ids(&result.remove), vec![second.id, older.id]);
    }

    #[test]
    fn test_empty_group() {
        let policy = RetentionPolicy {
            keep_last: 3,
            ..Default::default()
        };
        let result = apply_policy(&[], &policy);
        assert!(result.keep.is_empty());
        assert!(result.remove.is_empty());
    }

    #[test]
    fn test_empty_policy_keeps_everything() {
        let group: Vec<Snapshot> = (1..=3).map(|d| snap(day(d), &[])).collect();
        let result = apply_policy(&group, &RetentionPolicy::default());
        assert_eq!(ids(&result.keep), vec![group[2].id, group[1].id, group[0].id]);
        assert!(result.remove.is_empty());
        assert_eq!(result.reasons.len(), 3);
    }

    #[test]
    fn test_bucket_pass_respects_limit_zero() {
        let group: Vec<Snapshot> = (1..=3).map(|d| snap(day(d), &[])).collect();
        let sorted = sort_newest_first(&group);
        let candidates: Vec<usize> = (0..sorted.len()).collect();
        assert!(bucket_pass(&sorted, &candidates, Granularity::Daily, 0, Timezone::Utc).is_empty());
        assert_eq!(
            bucket_pass(&sorted, &candidates, Granularity::Daily, 2, Timezone::Utc),
            vec![0, 1]
        );
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(KeepReason::Tagged.to_string(), "tagged");
        assert_eq!(KeepReason::Last.to_string(), "last");
        assert_eq!(KeepReason::Bucket(Granularity::Weekly).to_string(), "weekly");
    }
}
