//! Configuration validation functionality.
//!
//! Rejects configurations the overlay cannot run with: missing or malformed
//! dates and out-of-range fade durations. Unknown keys and unknown enum
//! values (`mode`, `corner`) are already rejected by deserialization.

use anyhow::{Context, Result};

use super::Config;
use crate::common::constants::*;
use crate::countdown::CountdownMode;
use crate::time_source::parse_datetime;

/// Validate a parsed configuration before defaults are applied.
pub fn validate_config(config: &Config) -> Result<()> {
    let Some(target) = config.target_date.as_deref() else {
        anyhow::bail!("target_date must be specified (format: YYYY-MM-DD HH:MM:SS)");
    };
    let target_date = parse_datetime(target).context("Invalid target_date")?;

    let trigger_date = match config.trigger_date.as_deref() {
        Some(trigger) => Some(parse_datetime(trigger).context("Invalid trigger_date")?),
        None => None,
    };

    if let Some(fade) = config.fade_in_duration
        && !(MINIMUM_FADE_IN_DURATION..=MAXIMUM_FADE_IN_DURATION).contains(&fade)
    {
        anyhow::bail!(
            "fade_in_duration ({} seconds) must be between {} and {} seconds",
            fade,
            MINIMUM_FADE_IN_DURATION,
            MAXIMUM_FADE_IN_DURATION
        );
    }

    // A trigger after the target closes the window for good in absolute mode.
    // Still a valid configuration, so warn instead of failing.
    let enforce_interval = config.enforce_interval.unwrap_or(DEFAULT_ENFORCE_INTERVAL);
    let mode = config.mode.unwrap_or(DEFAULT_MODE);
    if enforce_interval
        && mode == CountdownMode::Absolute
        && let Some(trigger_date) = trigger_date
        && trigger_date >= target_date
    {
        log_pipe!();
        log_warning!("trigger_date is not before target_date; the countdown will never show");
    }

    Ok(())
}
