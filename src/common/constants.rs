//! Application-wide constants: defaults, validation limits, and timing.

use std::time::Duration;

use crate::config::Corner;
use crate::countdown::CountdownMode;

// # Configuration defaults

pub const DEFAULT_MODE: CountdownMode = CountdownMode::Absolute;
pub const DEFAULT_ENFORCE_INTERVAL: bool = false;
pub const DEFAULT_CORNER: Corner = Corner::BottomRight;
pub const DEFAULT_FADE_IN_DURATION: f64 = 1.0; // seconds

/// Wall-clock format used for `target_date`, `trigger_date`, `--at` and `--simulate`.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const CONFIG_DIR_NAME: &str = "countdownr";
pub const CONFIG_FILE_NAME: &str = "countdownr.toml";

// # Validation limits

pub const MINIMUM_FADE_IN_DURATION: f64 = 0.0;
pub const MAXIMUM_FADE_IN_DURATION: f64 = 10.0;

// # Timing

/// Fixed refresh cadence of the countdown text.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Number of foreground-color steps used by the terminal fade-in.
pub const FADE_IN_STEPS: u32 = 12;

/// Number of calendar units shown in the remaining-time text.
pub const MAXIMUM_UNIT_COUNT: usize = 3;

// # Exit codes

pub const EXIT_FAILURE: i32 = 1;
