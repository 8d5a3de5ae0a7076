//! Repository configuration (`.sk/config.toml`)
//!
//! Every key is optional; a missing file means all defaults.

use retention::Timezone;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.toml";
const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid log level '{0}' (expected one of: error, warn, info, debug, trace)")]
    InvalidLogLevel(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    pub retention: RetentionConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// Calendar for hourly/daily/... buckets and report dates
    pub timezone: Timezone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level used when no `-v` flag is given
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Location of the config file inside a `.sk` directory
pub fn config_file_path(sk_dir: &Path) -> PathBuf {
    sk_dir.join(CONFIG_FILE)
}

impl RepoConfig {
    /// Load and validate the config, falling back to defaults if absent
    pub fn load(sk_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_file_path(sk_dir);
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config: RepoConfig =
            toml::from_str(&text).map_err(|source| ConfigError::Parse { path, source })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.log.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.log.level.clone()));
        }
        Ok(())
    }
}

/// Commented example written by `sk init`
pub fn example_config() -> &'static str {
    r#"# snapkeep repository configuration

[retention]
# Calendar used for hourly/daily/weekly/monthly/yearly buckets: "utc" or "local"
timezone = "utc"

[log]
# Default log level when no -v flag is given
level = "warn"
"#
}
