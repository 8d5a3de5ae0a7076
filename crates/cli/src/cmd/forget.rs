//! Remove snapshots by ID and by retention policy

use anyhow::{Context, Result};
use clap::Args;
use cli_lib::config::RepoConfig;
use cli_lib::util;
use owo_colors::OwoColorize;
use retention::{ForgetOptions, RetentionPolicy, SnapshotFilter, Timezone};
use sk_core::Store;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug, Clone, Default)]
pub struct ForgetArgs {
    /// Snapshot IDs or unique ID prefixes to remove unconditionally
    pub ids: Vec<String>,

    /// Keep the last n snapshots
    #[arg(short = 'l', long, default_value_t = 0)]
    pub keep_last: usize,

    /// Keep the last n hourly snapshots
    #[arg(short = 'H', long, default_value_t = 0)]
    pub keep_hourly: usize,

    /// Keep the last n daily snapshots
    #[arg(short = 'd', long, default_value_t = 0)]
    pub keep_daily: usize,

    /// Keep the last n weekly snapshots
    #[arg(short = 'w', long, default_value_t = 0)]
    pub keep_weekly: usize,

    /// Keep the last n monthly snapshots
    #[arg(short = 'm', long, default_value_t = 0)]
    pub keep_monthly: usize,

    /// Keep the last n yearly snapshots
    #[arg(short = 'y', long, default_value_t = 0)]
    pub keep_yearly: usize,

    /// Always keep snapshots with this tag (can be given multiple times)
    #[arg(long = "keep-tag", value_name = "TAG")]
    pub keep_tags: Vec<String>,

    /// Only consider snapshots from this host
    #[arg(long)]
    pub hostname: Option<String>,

    /// Only consider snapshots carrying this tag (can be given multiple times)
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Calendar for bucket boundaries: utc or local (default from config)
    #[arg(long)]
    pub timezone: Option<Timezone>,

    /// Do not delete anything, just print what would be done
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

impl ForgetArgs {
    /// Merge command-line flags with repository config
    pub fn into_options(self, config: &RepoConfig) -> ForgetOptions {
        ForgetOptions {
            ids: self.ids,
            policy: RetentionPolicy {
                keep_last: self.keep_last,
                keep_hourly: self.keep_hourly,
                keep_daily: self.keep_daily,
                keep_weekly: self.keep_weekly,
                keep_monthly: self.keep_monthly,
                keep_yearly: self.keep_yearly,
                keep_tags: self.keep_tags.into_iter().collect(),
                timezone: self.timezone.unwrap_or(config.retention.timezone),
            },
            filter: SnapshotFilter {
                hostname: self.hostname.filter(|h| !h.is_empty()),
                tags: self.tags,
            },
            dry_run: self.dry_run,
        }
    }
}

pub async fn run(repo: Option<&Path>, args: ForgetArgs) -> Result<()> {
    // 1. Find repository and settings
    let repo_root = util::resolve_repo_root(repo)?;
    let config = util::load_config(&repo_root)?;
    let opts = args.into_options(&config);

    // 2. Open store
    let store = Store::open(&repo_root).context("Failed to open repository")?;

    if !opts.policy.is_empty() {
        tracing::info!(policy = %opts.policy, "Retention policy");
    }

    // 3. Run the workflow off the async runtime; it does blocking file I/O
    let dry_run = opts.dry_run;
    let summary = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let summary = retention::forget(&store, &opts, &mut out);
        let _ = out.flush();
        summary
    })
    .await
    .context("Forget task panicked")??;

    // 4. Display results
    if dry_run {
        let count = summary.would_remove.len();
        if count == 0 {
            println!("{}", "Dry run: nothing would be removed".dimmed());
        } else {
            println!(
                "{} {} snapshots would be removed",
                "Dry run:".yellow(),
                count.to_string().yellow()
            );
        }
    } else if summary.removed.is_empty() {
        println!("{}", "No snapshots removed".dimmed());
    } else {
        println!(
            "{} Removed {} snapshots",
            "✓".green(),
            summary.removed.len().to_string().yellow()
        );
    }

    Ok(())
}
