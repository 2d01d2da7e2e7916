//! Core application logic and the overlay tick loop.
//!
//! The `Core` struct owns the running overlay session and drives it:
//!
//! - Runs the one-time session setup at startup
//! - Ticks once per whole second, refreshing the countdown text
//! - Processes signals between ticks (SIGUSR2 reloads, shutdown signals stop)
//! - Starts a new session when a hidden countdown becomes eligible
//! - Clears the surface on shutdown
//!
//! All time comes from the injected [`TimeSource`], so the same loop serves
//! real runs and `--simulate` previews.

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Timelike};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    common::constants::*,
    config::{self, Config},
    countdown::CountdownEvaluator,
    overlay::{Overlay, Phase, TextSurface},
    signals::{SignalMessage, SignalState},
    time_source::TimeSource,
};

/// Parameters for creating a Core instance.
pub struct CoreParams<S: TextSurface> {
    pub surface: S,
    pub config: Config,
    pub signal_state: SignalState,
    pub time_source: Arc<dyn TimeSource>,
    pub debug_enabled: bool,
    /// Explicit file to reload from; `None` follows the normal config lookup
    pub config_path: Option<PathBuf>,
}

/// Main loop state: one overlay session plus what is needed to rebuild it.
pub struct Core<S: TextSurface> {
    overlay: Overlay<S>,
    config: Config,
    signal_state: SignalState,
    time_source: Arc<dyn TimeSource>,
    debug_enabled: bool,
    config_path: Option<PathBuf>,
}

impl<S: TextSurface> Core<S> {
    pub fn new(params: CoreParams<S>) -> Result<Self> {
        let evaluator = CountdownEvaluator::new(params.config.countdown_config()?);
        let overlay = Overlay::new(
            evaluator,
            params.surface,
            params.config.fade_in_duration(),
        );

        Ok(Self {
            overlay,
            config: params.config,
            signal_state: params.signal_state,
            time_source: params.time_source,
            debug_enabled: params.debug_enabled,
            config_path: params.config_path,
        })
    }

    /// Run the session until shutdown or the end of a simulation.
    ///
    /// Returns the surface after it has been cleared.
    pub fn execute(mut self) -> Result<S> {
        let now = self.time_source.now();
        self.start_session(&now);

        self.main_loop();

        if self.debug_enabled {
            log_pipe!();
            log_debug!("Tick loop finished, clearing overlay");
        }

        let surface = self
            .overlay
            .teardown()
            .context("Failed to clear the countdown overlay")?;

        Ok(surface)
    }

    fn main_loop(&mut self) {
        while self.signal_state.is_running() && !self.time_source.is_ended() {
            self.process_signals();
            if !self.signal_state.is_running() {
                break;
            }

            let now = self.time_source.now();
            self.time_source.sleep(until_next_second(&now));
            if !self.signal_state.is_running() {
                break;
            }

            let now = self.time_source.now();

            if self.overlay.phase() == Phase::Hidden
                && self.overlay.evaluator().should_display(&now)
            {
                self.open_window(&now);
                continue;
            }

            if let Err(e) = self.overlay.tick(&now) {
                log_pipe!();
                log_error!("Failed to update countdown: {e}");
            }
        }
    }

    /// Drain every pending signal message.
    fn process_signals(&mut self) {
        while let Ok(message) = self.signal_state.signal_receiver.try_recv() {
            match message {
                SignalMessage::Shutdown => {
                    self.signal_state
                        .running
                        .store(false, std::sync::atomic::Ordering::SeqCst);
                }
                SignalMessage::Reload => self.handle_config_reload(),
            }
        }
    }

    /// Setup for the current session, logging the outcome.
    fn start_session(&mut self, now: &DateTime<Local>) {
        match self.overlay.setup(now) {
            Ok(Phase::Counting) => {
                log_block_start!("Countdown visible");
                if self.debug_enabled {
                    let target = self.overlay.evaluator().effective_target(now);
                    log_indented!("Target: {}", target.format(DATETIME_FORMAT));
                }
            }
            Ok(Phase::Hidden) => {
                let evaluator = self.overlay.evaluator();
                if evaluator.config().enforce_interval
                    && evaluator.effective_trigger(now) > *now
                {
                    log_block_start!(
                        "Countdown hidden until {}",
                        evaluator.effective_trigger(now).format(DATETIME_FORMAT)
                    );
                } else {
                    log_block_start!("Countdown target has passed, nothing to show");
                }
            }
            Err(e) => {
                log_pipe!();
                log_error!("Failed to show countdown: {e}");
            }
        }
    }

    /// A hidden countdown became eligible: begin a fresh session.
    fn open_window(&mut self, now: &DateTime<Local>) {
        let evaluator = self.overlay.evaluator().clone();
        let fade = self.config.fade_in_duration();

        if let Err(e) = self.overlay.restart(evaluator, fade) {
            log_pipe!();
            log_error!("Failed to reset overlay: {e}");
            return;
        }
        self.start_session(now);
    }

    fn handle_config_reload(&mut self) {
        let loaded = match &self.config_path {
            Some(path) => config::load_from_path(path),
            None => config::load(),
        };

        let reloaded = loaded.and_then(|new_config| {
            let countdown = new_config.countdown_config()?;
            Ok((new_config, CountdownEvaluator::new(countdown)))
        });

        let (new_config, evaluator) = match reloaded {
            Ok(pair) => pair,
            Err(e) => {
                log_pipe!();
                log_error!("Failed to reload config: {e:#}");
                log_indented!("Continuing with previous configuration");
                return;
            }
        };

        if let Err(e) = self
            .overlay
            .restart(evaluator, new_config.fade_in_duration())
        {
            log_pipe!();
            log_error!("Failed to reset overlay: {e}");
            return;
        }

        new_config.log_config();
        self.config = new_config;

        let now = self.time_source.now();
        self.start_session(&now);
    }
}

/// Time left until the next whole second of `now`.
fn until_next_second(now: &DateTime<Local>) -> Duration {
    let into_second = Duration::from_nanos(u64::from(now.nanosecond() % 1_000_000_000));
    TICK_INTERVAL.saturating_sub(into_second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_source::{SimulatedTimeSource, parse_datetime};
    use std::sync::Mutex;
    use tempfile::tempdir;

    /// Surface that records every text and clear.
    #[derive(Clone, Default)]
    struct RecordingSurface {
        texts: Arc<Mutex<Vec<String>>>,
        fades: Arc<Mutex<u32>>,
        clears: Arc<Mutex<u32>>,
    }

    impl TextSurface for RecordingSurface {
        fn set_text(&mut self, text: &str) -> Result<()> {
            self.texts.lock().unwrap().push(text.to_string());
            Ok(())
        }

        fn fade_in(&mut self, _duration: Duration) -> Result<()> {
            *self.fades.lock().unwrap() += 1;
            Ok(())
        }

        fn clear(&mut self) -> Result<()> {
            *self.clears.lock().unwrap() += 1;
            Ok(())
        }
    }

    fn create_test_config(target: &str, trigger: Option<&str>, enforce_interval: bool) -> Config {
        Config {
            target_date: Some(target.to_string()),
            trigger_date: trigger.map(str::to_string),
            enforce_interval: Some(enforce_interval),
            fade_in_duration: Some(0.0),
            ..Config::default()
        }
    }

    fn fast_forward(start: &str, end: &str) -> Arc<dyn TimeSource> {
        Arc::new(SimulatedTimeSource::new(
            parse_datetime(start).unwrap(),
            parse_datetime(end).unwrap(),
            0.0,
        ))
    }

    fn run(
        config: Config,
        time_source: Arc<dyn TimeSource>,
        signal_state: SignalState,
        config_path: Option<PathBuf>,
    ) -> RecordingSurface {
        let surface = RecordingSurface::default();
        let core = Core::new(CoreParams {
            surface: surface.clone(),
            config,
            signal_state,
            time_source,
            debug_enabled: true,
            config_path,
        })
        .unwrap();
        core.execute().unwrap();
        surface
    }

    #[test]
    fn test_counts_down_each_second_until_end() {
        let surface = run(
            create_test_config("2024-01-01 10:00:03", None, false),
            fast_forward("2024-01-01 10:00:00", "2024-01-01 10:00:05"),
            SignalState::new(),
            None,
        );

        assert_eq!(
            *surface.texts.lock().unwrap(),
            vec![
                "3 seconds",
                "2 seconds",
                "1 second",
                "0 seconds",
                "0 seconds",
                "0 seconds"
            ]
        );
        assert_eq!(*surface.fades.lock().unwrap(), 1);
        assert_eq!(*surface.clears.lock().unwrap(), 1);
    }

    #[test]
    fn test_hidden_countdown_opens_new_session_at_trigger() {
        let surface = run(
            create_test_config("2024-01-01 10:00:04", Some("2024-01-01 10:00:02"), true),
            fast_forward("2024-01-01 10:00:00", "2024-01-01 10:00:04"),
            SignalState::new(),
            None,
        );

        assert_eq!(
            *surface.texts.lock().unwrap(),
            vec!["2 seconds", "1 second", "0 seconds"]
        );
        assert_eq!(*surface.fades.lock().unwrap(), 1);
    }

    #[test]
    fn test_passed_target_shows_nothing() {
        let surface = run(
            create_test_config("2024-01-01 09:00:00", None, false),
            fast_forward("2024-01-01 10:00:00", "2024-01-01 10:00:03"),
            SignalState::new(),
            None,
        );

        assert!(surface.texts.lock().unwrap().is_empty());
        assert_eq!(*surface.clears.lock().unwrap(), 0);
    }

    #[test]
    fn test_shutdown_before_first_tick() {
        let signal_state = SignalState::new();
        signal_state.request_shutdown();

        let surface = run(
            create_test_config("2024-01-01 10:00:03", None, false),
            fast_forward("2024-01-01 10:00:00", "2024-01-01 10:00:05"),
            signal_state,
            None,
        );

        assert_eq!(*surface.texts.lock().unwrap(), vec!["3 seconds"]);
        assert_eq!(*surface.clears.lock().unwrap(), 1);
    }

    #[test]
    fn test_reload_starts_new_session_with_new_target() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "target_date = \"2024-01-01 10:01:00\"\nfade_in_duration = 0.0\n",
        )
        .unwrap();

        let signal_state = SignalState::new();
        signal_state.signal_sender.send(SignalMessage::Reload).unwrap();

        let surface = run(
            create_test_config("2024-01-01 10:00:03", None, false),
            fast_forward("2024-01-01 10:00:00", "2024-01-01 10:00:01"),
            signal_state,
            Some(path),
        );

        assert_eq!(
            *surface.texts.lock().unwrap(),
            vec!["3 seconds", "1 minute", "59 seconds"]
        );
        assert_eq!(*surface.fades.lock().unwrap(), 2);
        // Once for the reload, once at teardown
        assert_eq!(*surface.clears.lock().unwrap(), 2);
    }

    #[test]
    fn test_failed_reload_keeps_session() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "target_date = \"not a date\"\n").unwrap();

        let signal_state = SignalState::new();
        signal_state.signal_sender.send(SignalMessage::Reload).unwrap();

        let surface = run(
            create_test_config("2024-01-01 10:00:03", None, false),
            fast_forward("2024-01-01 10:00:00", "2024-01-01 10:00:01"),
            signal_state,
            Some(path),
        );

        assert_eq!(
            *surface.texts.lock().unwrap(),
            vec!["3 seconds", "2 seconds"]
        );
        assert_eq!(*surface.fades.lock().unwrap(), 1);
    }

    #[test]
    fn test_until_next_second() {
        let whole = parse_datetime("2024-01-01 10:00:00").unwrap();
        assert_eq!(until_next_second(&whole), Duration::from_secs(1));

        let partial = whole + chrono::Duration::milliseconds(250);
        assert_eq!(until_next_second(&partial), Duration::from_millis(750));
    }
}
