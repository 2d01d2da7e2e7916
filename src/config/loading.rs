//! Configuration loading functionality.
//!
//! Resolves the configuration path, creates a default file when none exists,
//! parses and validates the TOML, then fills in defaults.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::Config;
use super::validation::validate_config;
use crate::common::constants::*;
use crate::common::utils::private_path;

/// Global configuration directory, set once at startup
static CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Set the configuration directory for the current process.
///
/// Can only be called once, typically from `--config` at startup.
pub fn set_config_dir(dir: Option<String>) -> Result<()> {
    CONFIG_DIR
        .set(dir.map(PathBuf::from))
        .map_err(|_| anyhow::anyhow!("Configuration directory already set"))
}

/// Get the custom configuration directory if one was set.
pub fn get_custom_config_dir() -> Option<PathBuf> {
    CONFIG_DIR.get().and_then(|d| d.clone())
}

/// Get the configuration file path.
pub fn get_config_path() -> Result<PathBuf> {
    if let Some(custom_dir) = get_custom_config_dir() {
        return Ok(custom_dir.join(CONFIG_FILE_NAME));
    }

    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load configuration using automatic path detection.
///
/// Creates a default configuration file if none exists.
pub fn load() -> Result<Config> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        super::builder::create_default_config(&config_path)
            .context("Failed to create default config during load")?;
        log_block_start!("Created default configuration");
        log_indented!("{}", private_path(&config_path));
    }

    load_from_path(&config_path).with_context(|| {
        format!(
            "Failed to load configuration from {}",
            private_path(&config_path)
        )
    })
}

/// Load configuration from a specific path.
///
/// Unlike [`load`], a missing file is an error here.
pub fn load_from_path(path: &PathBuf) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!("Configuration file not found at {}", private_path(path));
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", private_path(path)))?;

    parse_config(&content, path)
}

/// Parse, validate and complete configuration text.
pub(crate) fn parse_config(content: &str, path: &Path) -> Result<Config> {
    let mut config: Config = toml::from_str(content)
        .with_context(|| format!("Failed to parse config from {}", private_path(path)))?;

    validate_config(&config)?;
    apply_defaults(&mut config);

    Ok(config)
}

/// Fill every optional field with its default.
fn apply_defaults(config: &mut Config) {
    if config.mode.is_none() {
        config.mode = Some(DEFAULT_MODE);
    }

    if config.enforce_interval.is_none() {
        config.enforce_interval = Some(DEFAULT_ENFORCE_INTERVAL);
    }

    // Without an explicit trigger the window opens at the target itself
    if config.trigger_date.is_none() {
        config.trigger_date = config.target_date.clone();
    }

    if config.corner.is_none() {
        config.corner = Some(DEFAULT_CORNER);
    }

    if config.fade_in_duration.is_none() {
        config.fade_in_duration = Some(DEFAULT_FADE_IN_DURATION);
    }
}
