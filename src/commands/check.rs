//! Implementation of the `check` command.
//!
//! Loads the configuration, evaluates the countdown once (now, or at the time
//! given with `--at`) and prints the result, either through the logger or as
//! JSON for scripts.

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};
use serde::Serialize;

use crate::common::constants::DATETIME_FORMAT;
use crate::config::Config;
use crate::countdown::{CountdownEvaluator, CountdownMode, EvaluationResult};
use crate::time_source;

/// Everything `check --json` prints.
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub evaluated_at: String,
    pub mode: CountdownMode,
    pub enforce_interval: bool,
    pub effective_target: String,
    pub effective_trigger: String,
    #[serde(flatten)]
    pub result: EvaluationResult,
}

impl CheckReport {
    pub fn new<Tz: TimeZone>(evaluator: &CountdownEvaluator<Tz>, now: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let config = evaluator.config();
        Self {
            evaluated_at: now.format(DATETIME_FORMAT).to_string(),
            mode: config.mode,
            enforce_interval: config.enforce_interval,
            effective_target: evaluator
                .effective_target(now)
                .format(DATETIME_FORMAT)
                .to_string(),
            effective_trigger: evaluator
                .effective_trigger(now)
                .format(DATETIME_FORMAT)
                .to_string(),
            result: evaluator.evaluate(now),
        }
    }
}

/// Handle the `check` command.
pub fn handle_check_command(json: bool, at: Option<String>, debug_enabled: bool) -> Result<()> {
    let config = Config::load()?;
    let evaluator = CountdownEvaluator::new(config.countdown_config()?);

    let now = match at.as_deref() {
        Some(at) => time_source::parse_datetime(at).context("Invalid time for --at")?,
        None => time_source::now(),
    };

    let report = CheckReport::new(&evaluator, &now);

    if json {
        let output =
            serde_json::to_string_pretty(&report).context("Failed to serialize evaluation")?;
        println!("{output}");
        return Ok(());
    }

    log_version!();
    if debug_enabled {
        config.log_config();
    }

    log_block_start!("Evaluated at {}", report.evaluated_at);
    log_indented!("Target: {}", report.effective_target);
    if report.enforce_interval {
        log_indented!("Shown from: {}", report.effective_trigger);
    }

    if report.result.should_display {
        log_indented!("Visible: yes");
        log_indented!("Remaining: {}", report.result.remaining_time_text);
    } else {
        log_indented!("Visible: no");
        if report.enforce_interval && now < evaluator.effective_trigger(&now) {
            log_indented!("Waiting for the trigger date");
        } else {
            log_indented!("Target has passed");
        }
    }
    log_end!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::countdown::CountdownConfig;
    use chrono::Utc;

    fn utc(s: &str) -> DateTime<Utc> {
        time_source::parse_datetime_in(s, &Utc).unwrap()
    }

    #[test]
    fn test_report_for_visible_countdown() {
        let evaluator = CountdownEvaluator::new(CountdownConfig {
            mode: CountdownMode::Absolute,
            enforce_interval: false,
            target_date: utc("2030-01-01 00:00:00"),
            trigger_date: utc("2030-01-01 00:00:00"),
        });
        let report = CheckReport::new(&evaluator, &utc("2024-01-01 10:00:00"));

        assert_eq!(report.evaluated_at, "2024-01-01 10:00:00");
        assert_eq!(report.effective_target, "2030-01-01 00:00:00");
        assert!(report.result.should_display);
        assert_eq!(report.result.remaining_time_text, "5 years, 11 months, 30 days");
    }

    #[test]
    fn test_report_json_shape() {
        let evaluator = CountdownEvaluator::new(CountdownConfig {
            mode: CountdownMode::TimeOfDay,
            enforce_interval: true,
            target_date: utc("2020-05-05 08:00:00"),
            trigger_date: utc("2020-05-05 07:00:00"),
        });
        // Before today's trigger: hidden, but the text is still computed
        let report = CheckReport::new(&evaluator, &utc("2024-01-01 06:00:00"));
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["mode"], "time_of_day");
        assert_eq!(value["enforce_interval"], true);
        assert_eq!(value["effective_target"], "2024-01-01 08:00:00");
        assert_eq!(value["effective_trigger"], "2024-01-01 07:00:00");
        assert_eq!(value["should_display"], false);
        assert_eq!(value["remaining_time_text"], "2 hours");
    }
}
