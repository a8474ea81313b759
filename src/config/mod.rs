mod schema;

pub use schema::{Config, RemoteConfig, DEFAULT_RETRIES, DEFAULT_TIMEOUT};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the config directory path (~/.config/checklist-engine/)
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("checklist-engine")
}

/// Get the default config file path (~/.config/checklist-engine/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses the default path,
///   and a missing default file yields the default configuration.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed or fails validation
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let explicit = path.is_some();
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content).with_context(|| {
        format!("Failed to parse config: invalid YAML in {}", config_path.display())
    })?;

    if let Err(errors) = validate_config(&config) {
        anyhow::bail!(
            "Invalid config in {}:\n  - {}",
            config_path.display(),
            errors.join("\n  - ")
        );
    }

    Ok(config)
}

/// Validate configuration values that serde cannot check.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(user) = &config.user {
        if user.trim().is_empty() {
            errors.push("user: must not be blank".to_string());
        }
    }

    if let Some(remote) = &config.remote {
        let url = remote.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(format!(
                "remote.baseUrl: must start with http:// or https://, got '{}'",
                remote.base_url
            ));
        }
        if let Err(e) = remote.timeout() {
            errors.push(format!("remote.timeout: {:#}", e));
        }
        if remote.retries() == 0 {
            errors.push("remote.retries: must be at least 1".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
