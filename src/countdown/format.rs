//! Calendar-aware remaining-time rendering.
//!
//! A span is measured the way a calendar counts it: whole months first (so
//! "1 month" from Jan 15 lands on Feb 15 regardless of month length), then
//! whole days. Hours, minutes and seconds are the real time left after that,
//! so a DST change shortens or lengthens the span by exactly its offset.
//! Rendering keeps the most significant non-zero units in full words:
//! "2 hours, 15 minutes, 3 seconds".

use chrono::{DateTime, Datelike, Days, Duration, Months, NaiveDateTime, TimeZone};

use crate::common::constants::MAXIMUM_UNIT_COUNT;

/// Difference between two instants broken into calendar units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CalendarSpan {
    pub years: i64,
    pub months: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl CalendarSpan {
    /// Measure the span from `from` to `to` in `from`'s time zone.
    ///
    /// A zero or negative interval yields an all-zero span. Sub-second
    /// remainders are truncated.
    pub fn between<Tz: TimeZone>(from: &DateTime<Tz>, to: &DateTime<Tz>) -> Self {
        if to <= from {
            return Self::default();
        }

        let tz = from.timezone();
        let start = from.naive_local();
        let end = to.with_timezone(&tz).naive_local();

        let estimate = (i64::from(end.year()) - i64::from(start.year())) * 12
            + (i64::from(end.month0()) - i64::from(start.month0()));
        let (total_months, month_anchor) =
            step_back(estimate, from.clone(), to, |n| add_months(start, n));

        let anchor_local = month_anchor.naive_local();
        let estimate = (end.date() - anchor_local.date()).num_days();
        let (days, anchor) = step_back(estimate, month_anchor, to, |n| add_days(anchor_local, n));

        let rest = to.clone().signed_duration_since(anchor);

        Self {
            years: total_months / 12,
            months: total_months % 12,
            days,
            hours: rest.num_hours(),
            minutes: rest.num_minutes() % 60,
            seconds: rest.num_seconds() % 60,
        }
    }

    /// Units from most to least significant, paired with their singular name.
    fn units(&self) -> [(i64, &'static str); 6] {
        [
            (self.years, "year"),
            (self.months, "month"),
            (self.days, "day"),
            (self.hours, "hour"),
            (self.minutes, "minute"),
            (self.seconds, "second"),
        ]
    }

    /// Render the `max_units` most significant non-zero units in full words.
    pub fn to_full_string(&self, max_units: usize) -> String {
        let parts: Vec<String> = self
            .units()
            .into_iter()
            .filter(|(value, _)| *value > 0)
            .take(max_units)
            .map(|(value, unit)| spell_unit(value, unit))
            .collect();

        if parts.is_empty() {
            spell_unit(0, "second")
        } else {
            parts.join(", ")
        }
    }
}

/// Largest count in `0..=estimate` whose shifted wall-clock time resolves at
/// or before `limit`, with that instant. A count of zero keeps `base`.
fn step_back<Tz, F>(
    mut estimate: i64,
    base: DateTime<Tz>,
    limit: &DateTime<Tz>,
    shift: F,
) -> (i64, DateTime<Tz>)
where
    Tz: TimeZone,
    F: Fn(i64) -> Option<NaiveDateTime>,
{
    let tz = limit.timezone();
    while estimate > 0 {
        match shift(estimate).and_then(|naive| resolve_forward(&tz, naive)) {
            Some(instant) if instant <= *limit => return (estimate, instant),
            _ => estimate -= 1,
        }
    }
    (0, base)
}

/// Resolve a wall-clock time; a time inside a DST gap lands just past it.
fn resolve_forward<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive).earliest().or_else(|| {
        let later = naive.checked_add_signed(Duration::hours(1))?;
        tz.from_local_datetime(&later).earliest()
    })
}

fn add_months(from: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let months = u32::try_from(months).ok()?;
    from.checked_add_months(Months::new(months))
}

fn add_days(from: NaiveDateTime, days: i64) -> Option<NaiveDateTime> {
    let days = u64::try_from(days).ok()?;
    from.checked_add_days(Days::new(days))
}

fn spell_unit(value: i64, unit: &str) -> String {
    if value == 1 {
        format!("{value} {unit}")
    } else {
        format!("{value} {unit}s")
    }
}

/// Render the time from `from` to `to` using the three most significant units.
pub fn format_span<Tz: TimeZone>(from: &DateTime<Tz>, to: &DateTime<Tz>) -> String {
    CalendarSpan::between(from, to).to_full_string(MAXIMUM_UNIT_COUNT)
}
