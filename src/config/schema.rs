use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_RETRIES: usize = 3;

/// Application configuration.
///
/// Every field is optional; a missing config file behaves like `{}`.
///
/// Example YAML:
/// ```yaml
/// user: sam
/// storePath: /var/lib/checklists/completions.json
/// remote:
///   baseUrl: https://ops.example.com/api
///   timeout: 15s
///   retries: 3
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    /// Recorded as `completedBy` on submissions
    #[serde(default)]
    pub user: Option<String>,

    /// Local completion store (default: <config dir>/completions.json)
    #[serde(default)]
    pub store_path: Option<PathBuf>,

    /// Directory for in-progress drafts (default: <config dir>/drafts)
    #[serde(default)]
    pub drafts_dir: Option<PathBuf>,

    /// When set, checklists are fetched from and completions posted to this API
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
}

impl Config {
    pub fn store_path(&self) -> PathBuf {
        self.store_path
            .clone()
            .unwrap_or_else(|| super::get_config_dir().join("completions.json"))
    }

    pub fn drafts_dir(&self) -> PathBuf {
        self.drafts_dir
            .clone()
            .unwrap_or_else(|| super::get_config_dir().join("drafts"))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RemoteConfig {
    pub base_url: String,

    /// Per-request timeout in humantime format, e.g. "10s", "1m"
    #[serde(default)]
    pub timeout: Option<String>,

    /// Attempts for each request (default: 3)
    #[serde(default)]
    pub retries: Option<usize>,
}

impl RemoteConfig {
    pub fn timeout(&self) -> Result<Duration> {
        match &self.timeout {
            Some(t) => humantime::parse_duration(t.trim())
                .with_context(|| format!("Invalid remote.timeout '{}'", t)),
            None => Ok(DEFAULT_TIMEOUT),
        }
    }

    pub fn retries(&self) -> usize {
        self.retries.unwrap_or(DEFAULT_RETRIES)
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
