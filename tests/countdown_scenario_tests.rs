use chrono::{DateTime, Utc};
use countdownr::args::{CliAction, ParsedArgs};
use countdownr::config::{Config, Corner};
use countdownr::time_source::parse_datetime_in;
use countdownr::{CountdownConfig, CountdownEvaluator, CountdownMode};
use std::time::Duration;
use tempfile::tempdir;

fn utc(s: &str) -> DateTime<Utc> {
    parse_datetime_in(s, &Utc).unwrap()
}

// Helper function to create an evaluator where the trigger equals the target
fn create_evaluator(mode: CountdownMode, target: &str) -> CountdownEvaluator<Utc> {
    CountdownEvaluator::new(CountdownConfig {
        mode,
        enforce_interval: false,
        target_date: utc(target),
        trigger_date: utc(target),
    })
}

#[test]
fn test_absolute_target_in_the_past_is_hidden() {
    let evaluator = create_evaluator(CountdownMode::Absolute, "2024-01-01 09:00:00");
    let result = evaluator.evaluate(&utc("2024-01-01 10:00:00"));

    assert!(!result.should_display);
    assert_eq!(result.remaining_time_text, "0 seconds");
}

#[test]
fn test_distant_absolute_target() {
    let evaluator = create_evaluator(CountdownMode::Absolute, "2030-01-01 00:00:00");
    let result = evaluator.evaluate(&utc("2024-01-01 10:00:00"));

    assert!(result.should_display);
    assert_eq!(result.remaining_time_text, "5 years, 11 months, 30 days");
}

#[test]
fn test_time_of_day_rolls_over_to_tomorrow() {
    let evaluator = create_evaluator(CountdownMode::TimeOfDay, "2020-06-15 08:00:00");
    let now = utc("2024-01-01 10:00:00");

    assert_eq!(evaluator.effective_target(&now), utc("2024-01-02 08:00:00"));
    assert!(evaluator.should_display(&now));
    assert_eq!(evaluator.format_remaining(&now), "22 hours");
}

#[test]
fn test_time_of_day_window_with_interval() {
    let evaluator = CountdownEvaluator::new(CountdownConfig {
        mode: CountdownMode::TimeOfDay,
        enforce_interval: true,
        target_date: utc("2020-06-15 08:00:00"),
        trigger_date: utc("2020-06-15 07:30:00"),
    });

    assert!(!evaluator.should_display(&utc("2024-01-01 07:00:00")));
    assert!(evaluator.should_display(&utc("2024-01-01 07:45:00")));
    assert_eq!(
        evaluator.format_remaining(&utc("2024-01-01 07:45:00")),
        "15 minutes"
    );
}

#[test]
fn test_config_file_to_evaluator() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("countdownr.toml");
    std::fs::write(
        &path,
        r#"
mode = "absolute"
target_date = "2030-01-01 00:00:00"
trigger_date = "2029-12-31 00:00:00"
enforce_interval = true
corner = "top_left"
fade_in_duration = 0.5
"#,
    )
    .unwrap();

    let config = Config::load_from_path(&path).unwrap();
    assert_eq!(config.corner(), Corner::TopLeft);
    assert_eq!(config.fade_in_duration(), Duration::from_millis(500));

    let countdown = config.countdown_config().unwrap();
    let before_trigger = countdown.trigger_date - chrono::Duration::hours(1);
    let evaluator = CountdownEvaluator::new(countdown);
    assert!(!evaluator.should_display(&before_trigger));
}

#[test]
fn test_config_errors_name_the_field() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("countdownr.toml");

    let cases = [
        ("target_date = \"01/01/2030\"\n", "target_date"),
        (
            "target_date = \"2030-01-01 00:00:00\"\ncorner = \"middle\"\n",
            "middle",
        ),
        (
            "target_date = \"2030-01-01 00:00:00\"\nfade_in_duration = 42.0\n",
            "fade_in_duration",
        ),
    ];

    for (content, field) in cases {
        std::fs::write(&path, content).unwrap();
        let err = Config::load_from_path(&path).unwrap_err();
        assert!(
            format!("{err:#}").contains(field),
            "error for {content:?} should mention {field}: {err:#}"
        );
    }
}

#[test]
fn test_cli_check_invocation() {
    let parsed = ParsedArgs::parse(["countdownr", "check", "--json"]);
    assert_eq!(
        parsed.action,
        CliAction::Check {
            debug_enabled: false,
            config_dir: None,
            json: true,
            at: None,
        }
    );
}
