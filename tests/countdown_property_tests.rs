use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Timelike};
use countdownr::countdown::normalize_to_today;
use countdownr::{CountdownConfig, CountdownEvaluator, CountdownMode};
use proptest::prelude::*;

/// Generate fixed UTC offsets in quarter hours between -12:00 and +14:00
fn offset_strategy() -> impl Strategy<Value = FixedOffset> {
    (-48i32..=56).prop_map(|quarters| FixedOffset::east_opt(quarters * 15 * 60).unwrap())
}

/// Generate wall-clock datetimes in the given offset
fn datetime_strategy(offset: FixedOffset) -> impl Strategy<Value = DateTime<FixedOffset>> {
    (
        2000i32..2050,
        1u32..=12,
        1u32..=28,
        0u32..24,
        0u32..60,
        0u32..60,
    )
        .prop_map(move |(year, month, day, hour, minute, second)| {
            let naive = NaiveDate::from_ymd_opt(year, month, day)
                .unwrap()
                .and_hms_opt(hour, minute, second)
                .unwrap();
            offset.from_local_datetime(&naive).single().unwrap()
        })
}

/// A pair of datetimes sharing one offset
fn pair_strategy() -> impl Strategy<Value = (DateTime<FixedOffset>, DateTime<FixedOffset>)> {
    offset_strategy().prop_flat_map(|offset| (datetime_strategy(offset), datetime_strategy(offset)))
}

fn evaluator(
    mode: CountdownMode,
    enforce_interval: bool,
    target: DateTime<FixedOffset>,
    trigger: DateTime<FixedOffset>,
) -> CountdownEvaluator<FixedOffset> {
    CountdownEvaluator::new(CountdownConfig {
        mode,
        enforce_interval,
        target_date: target,
        trigger_date: trigger,
    })
}

#[cfg(test)]
mod normalization_tests {
    use super::*;

    proptest! {
        /// A clock time already reached today moves to tomorrow, exactly 24 hours later
        #[test]
        fn test_past_time_of_day_moves_to_tomorrow((target, now) in pair_strategy()) {
            prop_assume!(target.time() <= now.time());

            let candidate = normalize_to_today(&target, &now, true);
            let result = normalize_to_today(&target, &now, false);

            prop_assert_eq!(result.clone(), candidate + Duration::hours(24));
            prop_assert!(result > now);
        }

        /// An upcoming clock time stays on today's date
        #[test]
        fn test_upcoming_time_of_day_stays_today((target, now) in pair_strategy()) {
            prop_assume!(target.time() > now.time());

            let result = normalize_to_today(&target, &now, false);

            prop_assert_eq!(result.date_naive(), now.date_naive());
            prop_assert_eq!(result.time(), target.time());
        }

        /// Strict normalization keeps today's date and the target's clock time
        #[test]
        fn test_strict_is_same_day((target, now) in pair_strategy()) {
            let result = normalize_to_today(&target, &now, true);

            prop_assert_eq!(result.date_naive(), now.date_naive());
            prop_assert_eq!(result.hour(), target.hour());
            prop_assert_eq!(result.minute(), target.minute());
            prop_assert_eq!(result.second(), target.second());
        }

        /// The time-of-day target is always within the next 24 hours
        #[test]
        fn test_time_of_day_target_within_a_day((target, now) in pair_strategy()) {
            let countdown = evaluator(CountdownMode::TimeOfDay, false, target.clone(), target);
            let effective = countdown.effective_target(&now);

            prop_assert!(effective > now);
            prop_assert!(effective <= now + Duration::hours(24));
            prop_assert!(countdown.should_display(&now));
        }
    }
}

#[cfg(test)]
mod eligibility_tests {
    use super::*;

    proptest! {
        /// A trigger still in the future always hides an enforced countdown
        #[test]
        fn test_future_trigger_hides(
            (target, now) in pair_strategy(),
            ahead in 1i64..10_000_000,
        ) {
            let trigger = now + Duration::seconds(ahead);
            let countdown = evaluator(CountdownMode::Absolute, true, target, trigger);
            prop_assert!(!countdown.should_display(&now));
        }

        /// Visible right before the target, hidden from the target on
        #[test]
        fn test_target_is_exclusive_bound((target, _) in pair_strategy()) {
            let countdown = evaluator(CountdownMode::Absolute, false, target.clone(), target.clone());

            prop_assert!(countdown.should_display(&(target.clone() - Duration::seconds(1))));
            prop_assert!(!countdown.should_display(&target));
            prop_assert!(!countdown.should_display(&(target + Duration::seconds(1))));
        }

        /// Without an enforced interval the trigger is irrelevant
        #[test]
        fn test_trigger_ignored_without_interval(
            (target, now) in pair_strategy(),
            trigger_offset in -10_000_000i64..10_000_000,
        ) {
            let trigger = now + Duration::seconds(trigger_offset);
            let with_trigger = evaluator(CountdownMode::Absolute, false, target.clone(), trigger);
            let plain = evaluator(CountdownMode::Absolute, false, target.clone(), target);

            prop_assert_eq!(with_trigger.should_display(&now), plain.should_display(&now));
        }
    }
}

#[cfg(test)]
mod formatting_tests {
    use super::*;

    proptest! {
        /// The text is never empty and lists at most three units
        #[test]
        fn test_text_shape((target, now) in pair_strategy()) {
            let countdown = evaluator(CountdownMode::Absolute, false, target.clone(), target);
            let text = countdown.format_remaining(&now);

            prop_assert!(!text.is_empty());
            prop_assert!(text.matches(", ").count() <= 2, "too many units in {}", text);
        }

        /// Past targets render as zero seconds
        #[test]
        fn test_past_target_is_zero((target, now) in pair_strategy()) {
            prop_assume!(now >= target);
            let countdown = evaluator(CountdownMode::Absolute, false, target.clone(), target);
            prop_assert_eq!(countdown.format_remaining(&now), "0 seconds");
        }

        /// Short spans render as a plain second count
        #[test]
        fn test_seconds_only_below_a_minute(
            (target, _) in pair_strategy(),
            seconds in 2i64..60,
        ) {
            let now = target.clone() - Duration::seconds(seconds);
            let countdown = evaluator(CountdownMode::Absolute, false, target.clone(), target);
            prop_assert_eq!(countdown.format_remaining(&now), format!("{seconds} seconds"));
        }
    }
}
