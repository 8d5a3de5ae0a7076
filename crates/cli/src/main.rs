//! Snapkeep CLI - sk command

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use cli_lib::{logging, util};
use retention::SnapshotFilter;
use std::path::PathBuf;

mod cmd;

/// Snapkeep - retention management for backup snapshots
#[derive(Parser)]
#[command(name = "sk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Repository root (default: search upward from the current directory)
    #[arg(short = 'r', long, global = true)]
    repo: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a repository in the current directory (or --repo)
    Init,
    /// List snapshots
    Snapshots {
        /// Only list snapshots from this host
        #[arg(long)]
        hostname: Option<String>,
        /// Only list snapshots carrying this tag (can be given multiple times)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
    },
    /// Remove snapshots from the repository
    ///
    /// Snapshots named on the command line are removed unconditionally. Then,
    /// if any --keep-* option is given, the remaining snapshots are grouped by
    /// host and path list and the policy is applied to each group. This only
    /// deletes snapshot records, not the data they reference.
    Forget(cmd::forget::ForgetArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let config = util::try_load_config(cli.repo.as_deref());
    let configured_level = config.as_ref().map(|c| c.log.level.as_str());
    logging::init(logging::level_for(cli.verbose, configured_level));

    let repo = cli.repo.as_deref();
    match cli.command {
        Commands::Init => cmd::init::run(repo).await,
        Commands::Snapshots { hostname, tags } => {
            let filter = SnapshotFilter {
                hostname: hostname.filter(|h| !h.is_empty()),
                tags,
            };
            cmd::snapshots::run(repo, filter).await
        }
        Commands::Forget(args) => cmd::forget::run(repo, args).await,
    }
}
