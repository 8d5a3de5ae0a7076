//! Plain-text snapshot tables

use crate::bucket::Timezone;
use chrono::{DateTime, Local, Utc};
use snapkeep_core::Snapshot;
use std::io::{self, Write};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a timestamp in the given calendar
pub fn format_time(time: DateTime<Utc>, timezone: Timezone) -> String {
    match timezone {
        Timezone::Utc => time.format(TIME_FORMAT).to_string(),
        Timezone::Local => time.with_timezone(&Local).format(TIME_FORMAT).to_string(),
    }
}

fn row(id: &str, date: &str, host: &str, tag: &str, path: &str) -> String {
    format!("{:<8}  {:<19}  {:<10}  {:<10}  {}", id, date, host, tag, path)
}

/// Write a table of snapshots
///
/// The first tag and path go on the snapshot's row; further tags and paths
/// continue on rows with the other columns left blank. Snapshots without any
/// path are skipped.
pub fn write_snapshots<W: Write>(
    w: &mut W,
    snapshots: &[Snapshot],
    timezone: Timezone,
) -> io::Result<()> {
    let header = row("ID", "Date", "Host", "Tags", "Directory");
    writeln!(w, "{}", header)?;
    writeln!(w, "{}", "-".repeat(header.len()))?;

    for snapshot in snapshots {
        let Some(first_path) = snapshot.paths.first() else {
            continue;
        };
        let first_tag = snapshot.tags.first().map(String::as_str).unwrap_or("");

        writeln!(
            w,
            "{}",
            row(
                &snapshot.id.short(),
                &format_time(snapshot.time, timezone),
                &snapshot.hostname,
                first_tag,
                first_path,
            )
            .trim_end()
        )?;

        let rows = snapshot.paths.len().max(snapshot.tags.len());
        for i in 1..rows {
            let tag = snapshot.tags.get(i).map(String::as_str).unwrap_or("");
            let path = snapshot.paths.get(i).map(String::as_str).unwrap_or("");
            writeln!(w, "{}", row("", "", "", tag, path).trim_end())?;
        }
    }

    writeln!(w, "{}", "-".repeat(header.len()))?;
    Ok(())
}
