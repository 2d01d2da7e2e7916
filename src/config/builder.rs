//! Default configuration file creation.
//!
//! The generated file counts down to the next New Year's midnight and lists
//! every setting with an aligned comment describing its accepted values.

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};
use std::fs;
use std::path::Path;

use crate::common::constants::*;

/// Create a default config file at `path`, creating parent directories.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let (target, trigger) = default_dates(crate::time_source::now());

    fs::write(path, default_config_content(&target, &trigger))
        .with_context(|| format!("Failed to write default config to {}", path.display()))
}

/// Next New Year's midnight, and the day before it.
fn default_dates(now: DateTime<Local>) -> (String, String) {
    let next_year = now.year() + 1;
    let midnight = NaiveDate::from_ymd_opt(next_year, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|naive| Local.from_local_datetime(&naive).earliest());

    match midnight {
        Some(target) => {
            let trigger = target - chrono::Duration::days(1);
            (
                target.format(DATETIME_FORMAT).to_string(),
                trigger.format(DATETIME_FORMAT).to_string(),
            )
        }
        None => (
            format!("{next_year}-01-01 00:00:00"),
            format!("{}-12-31 00:00:00", next_year - 1),
        ),
    }
}

fn default_config_content(target: &str, trigger: &str) -> String {
    let content = ConfigBuilder::new()
        .add_section("Countdown")
        .add_setting(
            "mode",
            &format!("\"{}\"", DEFAULT_MODE.as_str()),
            "Select: \"absolute\" or \"time_of_day\" (daily, date part ignored)",
        )
        .add_setting(
            "target_date",
            &format!("\"{target}\""),
            "Moment to count down to (YYYY-MM-DD HH:MM:SS)",
        )
        .add_setting(
            "trigger_date",
            &format!("\"{trigger}\""),
            "Earliest moment the countdown may appear (YYYY-MM-DD HH:MM:SS)",
        )
        .add_setting(
            "enforce_interval",
            &DEFAULT_ENFORCE_INTERVAL.to_string(),
            "Only show the countdown once trigger_date has passed",
        )
        .add_section("Appearance")
        .add_setting(
            "corner",
            &format!("\"{}\"", DEFAULT_CORNER.as_str()),
            "top_left, top_center, top_right, center, bottom_left, bottom_center, bottom_right",
        )
        .add_setting(
            "fade_in_duration",
            &format!("{DEFAULT_FADE_IN_DURATION:.1}"),
            &format!(
                "Fade-in length in seconds ({MINIMUM_FADE_IN_DURATION}-{MAXIMUM_FADE_IN_DURATION} | 0 = instant)"
            ),
        )
        .build();

    format!("{content}\n")
}

struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

enum ConfigEntry {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry::Section(format!("#[{title}]")));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    /// Render the entries, aligning every comment one column past the longest setting.
    fn build(self) -> String {
        let comment_column = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                ConfigEntry::Setting { line, .. } => Some(line.len()),
                ConfigEntry::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut lines = Vec::new();
        for entry in self.entries {
            match entry {
                ConfigEntry::Section(title) => {
                    if !lines.is_empty() {
                        lines.push(String::new());
                    }
                    lines.push(title);
                }
                ConfigEntry::Setting { line, comment } => {
                    let padding = " ".repeat(comment_column - line.len());
                    lines.push(format!("{line}{padding}{comment}"));
                }
            }
        }

        lines.join("\n")
    }
}
