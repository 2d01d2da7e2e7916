//! Countdown evaluation: eligibility and remaining-time text.
//!
//! A [`CountdownEvaluator`] answers two questions for a given instant:
//! should the countdown be on screen, and what text should it show. Both are
//! pure functions of the [`CountdownConfig`] and the instant passed in, so the
//! evaluator is generic over the chrono time zone and tests can pin it to a
//! fixed offset.
//!
//! ## Modes
//!
//! - **Absolute**: count down to `target_date` exactly as configured.
//! - **Time of day**: ignore the calendar date of `target_date` and
//!   `trigger_date`. The target resolves to its next occurrence (today if
//!   still ahead, otherwise tomorrow); the trigger resolves to today.
//!
//! When `enforce_interval` is set the countdown only becomes eligible once
//! the (resolved) trigger has passed.

pub mod format;

use chrono::{DateTime, Days, Local, NaiveDateTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

/// How target and trigger dates are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CountdownMode {
    /// Count down to a fixed point in time.
    Absolute,
    /// Count down to a clock time that recurs every day.
    TimeOfDay,
}

impl CountdownMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CountdownMode::Absolute => "absolute",
            CountdownMode::TimeOfDay => "time_of_day",
        }
    }
}

/// Settings for one countdown session.
#[derive(Debug, Clone, PartialEq)]
pub struct CountdownConfig<Tz: TimeZone = Local> {
    pub mode: CountdownMode,
    pub enforce_interval: bool,
    pub target_date: DateTime<Tz>,
    pub trigger_date: DateTime<Tz>,
}

/// Outcome of evaluating a countdown at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationResult {
    pub should_display: bool,
    pub remaining_time_text: String,
}

/// Move `target`'s clock time onto the calendar date of `now`.
///
/// With `strict` the same-day candidate is returned as is. Otherwise a
/// candidate at or before `now` is pushed to the following day, so the result
/// is always the next occurrence of that clock time.
///
/// Hour, minute and second are kept; sub-second precision is dropped. If the
/// clock time does not exist today (a DST gap) the original `target` is
/// returned, and if it does not exist tomorrow the same-day candidate is.
pub fn normalize_to_today<Tz: TimeZone>(
    target: &DateTime<Tz>,
    now: &DateTime<Tz>,
    strict: bool,
) -> DateTime<Tz> {
    let tz = now.timezone();
    let clock = target.with_timezone(&tz).time();
    let clock = clock.with_nanosecond(0).unwrap_or(clock);
    let today = now.date_naive();

    let Some(candidate) = resolve_local(&tz, today.and_time(clock)) else {
        return target.clone();
    };

    if strict || candidate > *now {
        return candidate;
    }

    today
        .checked_add_days(Days::new(1))
        .and_then(|tomorrow| resolve_local(&tz, tomorrow.and_time(clock)))
        .unwrap_or(candidate)
}

fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive).earliest()
}

/// Evaluates a countdown configuration against the current time.
#[derive(Debug, Clone)]
pub struct CountdownEvaluator<Tz: TimeZone = Local> {
    config: CountdownConfig<Tz>,
}

impl<Tz: TimeZone> CountdownEvaluator<Tz> {
    pub fn new(config: CountdownConfig<Tz>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CountdownConfig<Tz> {
        &self.config
    }

    /// The target the countdown is heading to at `now`, after time-of-day resolution.
    pub fn effective_target(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        match self.config.mode {
            CountdownMode::Absolute => self.config.target_date.clone(),
            CountdownMode::TimeOfDay => normalize_to_today(&self.config.target_date, now, false),
        }
    }

    /// The trigger in effect at `now`, after time-of-day resolution.
    pub fn effective_trigger(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        match self.config.mode {
            CountdownMode::Absolute => self.config.trigger_date.clone(),
            CountdownMode::TimeOfDay => normalize_to_today(&self.config.trigger_date, now, true),
        }
    }

    /// Whether the countdown should be visible at `now`.
    pub fn should_display(&self, now: &DateTime<Tz>) -> bool {
        if self.config.enforce_interval && self.effective_trigger(now) > *now {
            return false;
        }

        *now < self.effective_target(now)
    }

    /// Remaining time from `now` to the effective target, e.g. "2 hours, 15 minutes, 3 seconds".
    pub fn format_remaining(&self, now: &DateTime<Tz>) -> String {
        format::format_span(now, &self.effective_target(now))
    }

    pub fn evaluate(&self, now: &DateTime<Tz>) -> EvaluationResult {
        EvaluationResult {
            should_display: self.should_display(now),
            remaining_time_text: self.format_remaining(now),
        }
    }
}
