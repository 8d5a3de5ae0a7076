//! Tracing setup for the `sk` binary
//!
//! Logs go to stderr so that reports on stdout stay machine-readable.

use tracing::Level;

/// Pick the log level: `-v` flags win over the configured level
pub fn level_for(verbose: u8, configured: Option<&str>) -> Level {
    match verbose {
        0 => configured
            .and_then(|l| l.parse().ok())
            .unwrap_or(Level::WARN),
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install the global subscriber (no-op if one is already set)
pub fn init(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .try_init();
}
