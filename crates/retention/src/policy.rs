//! Retention policy configuration

use crate::bucket::{Granularity, Timezone};
use crate::error::PolicyError;
use std::collections::BTreeSet;
use std::fmt;

/// Declarative retention rules applied to each group of snapshots
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Always keep this many of the most recent snapshots
    pub keep_last: usize,
    pub keep_hourly: usize,
    pub keep_daily: usize,
    pub keep_weekly: usize,
    pub keep_monthly: usize,
    pub keep_yearly: usize,
    /// Snapshots carrying any of these tags are never removed
    pub keep_tags: BTreeSet<String>,
    /// Calendar used for bucket boundaries (does not affect emptiness)
    pub timezone: Timezone,
}

impl RetentionPolicy {
    /// True if the policy would keep everything, i.e. there is nothing to apply
    pub fn is_empty(&self) -> bool {
        self.keep_last == 0
            && Granularity::ALL.iter().all(|g| self.count(*g) == 0)
            && self.keep_tags.is_empty()
    }

    /// Configured limit for a bucketed rule
    pub fn count(&self, granularity: Granularity) -> usize {
        match granularity {
            Granularity::Hourly => self.keep_hourly,
            Granularity::Daily => self.keep_daily,
            Granularity::Weekly => self.keep_weekly,
            Granularity::Monthly => self.keep_monthly,
            Granularity::Yearly => self.keep_yearly,
        }
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.keep_tags.iter().any(|t| t.trim().is_empty()) {
            return Err(PolicyError::EmptyTag);
        }
        Ok(())
    }
}

impl fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("keep all snapshots");
        }

        let mut counts = Vec::new();
        if self.keep_last > 0 {
            counts.push(format!("{} latest", self.keep_last));
        }
        for g in Granularity::ALL {
            if self.count(g) > 0 {
                counts.push(format!("{} {}", self.count(g), g));
            }
        }

        f.write_str("keep ")?;
        if !counts.is_empty() {
            write!(f, "{} snapshots", counts.join(", "))?;
            if !self.keep_tags.is_empty() {
                f.write_str(", ")?;
            }
        }
        if !self.keep_tags.is_empty() {
            let tags: Vec<&str> = self.keep_tags.iter().map(String::as_str).collect();
            write!(f, "snapshots tagged [{}]", tags.join(", "))?;
        }
        Ok(())
    }
}
