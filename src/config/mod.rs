//! Configuration system for countdownr.
//!
//! Settings live in `countdownr.toml` under `$XDG_CONFIG_HOME/countdownr/`
//! (or the directory given with `--config`). A commented default file is
//! written on first run.
//!
//! ```toml
//! #[Countdown]
//! mode = "absolute"                      # "absolute" or "time_of_day"
//! target_date = "2027-01-01 00:00:00"    # Moment to count down to (YYYY-MM-DD HH:MM:SS)
//! trigger_date = "2026-12-31 00:00:00"   # Earliest moment the countdown may appear
//! enforce_interval = false               # Only show the countdown after trigger_date
//!
//! #[Appearance]
//! corner = "bottom_right"                # Screen position of the text
//! fade_in_duration = 1.0                 # Fade-in length in seconds (0-10)
//! ```
//!
//! In `time_of_day` mode only the clock time of `target_date` and
//! `trigger_date` matters; the countdown recurs every day.
//!
//! The file model keeps every field optional. Defaults are filled in during
//! loading, after validation, so a loaded [`Config`] always converts into a
//! [`CountdownConfig`](crate::countdown::CountdownConfig).

pub mod builder;
pub mod loading;
pub mod validation;

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::common::constants::*;
use crate::countdown::{CountdownConfig, CountdownMode};
use crate::time_source::parse_datetime;

// Re-export public API
pub use builder::create_default_config;
pub use loading::{get_config_path, get_custom_config_dir, load, load_from_path, set_config_dir};

/// Where the countdown text sits on screen.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    TopLeft,
    TopCenter,
    TopRight,
    Center,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Corner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Corner::TopLeft => "top_left",
            Corner::TopCenter => "top_center",
            Corner::TopRight => "top_right",
            Corner::Center => "center",
            Corner::BottomLeft => "bottom_left",
            Corner::BottomCenter => "bottom_center",
            Corner::BottomRight => "bottom_right",
        }
    }
}

/// Configuration structure loaded from `countdownr.toml`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Absolute date or daily recurring clock time.
    pub mode: Option<CountdownMode>,
    /// Hold the countdown back until `trigger_date` has passed.
    pub enforce_interval: Option<bool>,
    pub target_date: Option<String>, // "YYYY-MM-DD HH:MM:SS", local time
    pub trigger_date: Option<String>, // defaults to target_date
    pub corner: Option<Corner>,
    pub fade_in_duration: Option<f64>, // seconds
}

impl Config {
    /// Load configuration using the module's load function
    pub fn load() -> Result<Self> {
        load()
    }

    /// Load from path using the module's load_from_path function
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        load_from_path(path)
    }

    /// Get configuration path using the module's get_config_path function
    pub fn get_config_path() -> Result<PathBuf> {
        get_config_path()
    }

    pub fn mode(&self) -> CountdownMode {
        self.mode.unwrap_or(DEFAULT_MODE)
    }

    pub fn corner(&self) -> Corner {
        self.corner.unwrap_or(DEFAULT_CORNER)
    }

    pub fn fade_in_duration(&self) -> Duration {
        Duration::from_secs_f64(self.fade_in_duration.unwrap_or(DEFAULT_FADE_IN_DURATION))
    }

    /// Build the evaluator settings for this configuration.
    ///
    /// Dates are read as local wall-clock times.
    pub fn countdown_config(&self) -> Result<CountdownConfig<Local>> {
        let target = self
            .target_date
            .as_deref()
            .context("target_date is not set")?;
        let target_date = parse_datetime(target).context("Invalid target_date")?;

        let trigger_date = match self.trigger_date.as_deref() {
            Some(trigger) => parse_datetime(trigger).context("Invalid trigger_date")?,
            None => target_date,
        };

        Ok(CountdownConfig {
            mode: self.mode(),
            enforce_interval: self.enforce_interval.unwrap_or(DEFAULT_ENFORCE_INTERVAL),
            target_date,
            trigger_date,
        })
    }

    pub fn log_config(&self) {
        let config_source = match get_custom_config_dir() {
            Some(dir) => format!(
                "configuration from {}",
                crate::common::utils::private_path(&dir)
            ),
            None => "default configuration".to_string(),
        };

        log_block_start!("Loaded {}", config_source);

        let mode = self.mode();
        log_indented!(
            "Mode: {}",
            match mode {
                CountdownMode::Absolute => "Absolute date",
                CountdownMode::TimeOfDay => "Time of day (daily)",
            }
        );

        let target = self.target_date.as_deref().unwrap_or("unset");
        match mode {
            CountdownMode::Absolute => log_indented!("Target: {}", target),
            CountdownMode::TimeOfDay => log_indented!("Target: {} daily", clock_part(target)),
        }

        if self.enforce_interval.unwrap_or(DEFAULT_ENFORCE_INTERVAL) {
            let trigger = self.trigger_date.as_deref().unwrap_or(target);
            match mode {
                CountdownMode::Absolute => log_indented!("Shown from: {}", trigger),
                CountdownMode::TimeOfDay => {
                    log_indented!("Shown from: {} daily", clock_part(trigger))
                }
            }
        }

        log_indented!("Corner: {}", self.corner().as_str());

        let fade = self.fade_in_duration.unwrap_or(DEFAULT_FADE_IN_DURATION);
        if fade > 0.0 {
            let label = if fade == 1.0 { "second" } else { "seconds" };
            if fade.fract() == 0.0 {
                log_indented!("Fade-in: {} {}", fade as u64, label);
            } else {
                log_indented!("Fade-in: {:.1} {}", fade, label);
            }
        } else {
            log_indented!("Fade-in: instant");
        }
    }
}

/// The "HH:MM:SS" part of a "YYYY-MM-DD HH:MM:SS" string.
fn clock_part(datetime: &str) -> &str {
    datetime
        .trim()
        .split_once(' ')
        .map(|(_, clock)| clock)
        .unwrap_or(datetime)
}
