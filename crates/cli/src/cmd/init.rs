//! Initialize a snapkeep repository

use anyhow::{Context, Result};
use cli_lib::config;
use owo_colors::OwoColorize;
use sk_core::{Store, StoreError};
use std::path::Path;

pub async fn run(repo: Option<&Path>) -> Result<()> {
    let root = match repo {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    println!("Initializing snapkeep repository at {}", root.display());

    let store = match Store::init(&root) {
        Ok(store) => store,
        Err(StoreError::AlreadyInitialized(path)) => {
            anyhow::bail!("Repository already initialized at {}", path.display())
        }
        Err(e) => return Err(e).context("Failed to initialize repository"),
    };

    std::fs::write(config::config_file_path(store.sk_dir()), config::example_config())
        .context("Failed to write config.toml")?;

    println!("{} Initialized repository", "✓".green());
    println!();
    println!("Created .sk/ directory structure:");
    println!("  - .sk/snapshots/    (snapshot records)");
    println!("  - .sk/locks/        (repository lock)");
    println!("  - .sk/config.toml   (repository settings)");

    Ok(())
}
