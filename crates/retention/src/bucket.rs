//! Calendar buckets for the time-based retention rules

use crate::error::PolicyError;
use chrono::{DateTime, Datelike, Local, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calendar granularity of a bucketed retention rule
///
/// Declared in the order the evaluator applies the passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Granularity {
    /// All granularities, in evaluation order
    pub const ALL: [Granularity; 5] = [
        Granularity::Hourly,
        Granularity::Daily,
        Granularity::Weekly,
        Granularity::Monthly,
        Granularity::Yearly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Hourly => "hourly",
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
            Granularity::Yearly => "yearly",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar that bucket boundaries are computed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timezone {
    #[default]
    Utc,
    Local,
}

impl FromStr for Timezone {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utc" => Ok(Timezone::Utc),
            "local" => Ok(Timezone::Local),
            _ => Err(PolicyError::UnknownTimezone(s.to_string())),
        }
    }
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timezone::Utc => f.write_str("utc"),
            Timezone::Local => f.write_str("local"),
        }
    }
}

/// The calendar period containing a timestamp
///
/// Keys are only compared within one granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BucketKey {
    Hour {
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
    },
    Day {
        year: i32,
        month: u32,
        day: u32,
    },
    /// ISO-8601 week; `iso_year` differs from the calendar year around New Year
    Week { iso_year: i32, week: u32 },
    Month { year: i32, month: u32 },
    Year { year: i32 },
}

/// Compute the bucket a timestamp falls into
pub fn bucket_key(time: DateTime<Utc>, granularity: Granularity, timezone: Timezone) -> BucketKey {
    match timezone {
        Timezone::Utc => calendar_key(&time, granularity),
        Timezone::Local => calendar_key(&time.with_timezone(&Local), granularity),
    }
}

fn calendar_key<T: Datelike + Timelike>(t: &T, granularity: Granularity) -> BucketKey {
    match granularity {
        Granularity::Hourly => BucketKey::Hour {
            year: t.year(),
            month: t.month(),
            day: t.day(),
            hour: t.hour(),
        },
        Granularity::Daily => BucketKey::Day {
            year: t.year(),
            month: t.month(),
            day: t.day(),
        },
        Granularity::Weekly => {
            let week = t.iso_week();
            BucketKey::Week {
                iso_year: week.year(),
                week: week.week(),
            }
        }
        Granularity::Monthly => BucketKey::Month {
            year: t.year(),
            month: t.month(),
        },
        Granularity::Yearly => BucketKey::Year { year: t.year() },
    }
}
