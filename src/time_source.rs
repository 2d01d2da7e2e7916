//! Time source abstraction for real and simulated clocks.
//!
//! The overlay loop never calls `Local::now()` or `thread::sleep` directly; it
//! goes through a [`TimeSource`]. Normal runs use [`RealTimeSource`]. The
//! `--simulate` command installs a [`SimulatedTimeSource`] so a countdown can
//! be previewed across hours or days of simulated time in a few seconds.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDateTime, TimeZone};
use once_cell::sync::OnceCell;
use std::sync::{Arc, Mutex};
use std::time::{Duration as StdDuration, Instant};

use crate::common::constants::DATETIME_FORMAT;

/// Global time source instance, defaults to RealTimeSource
static TIME_SOURCE: OnceCell<Arc<dyn TimeSource>> = OnceCell::new();

/// Trait for abstracting time operations
pub trait TimeSource: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Local>;

    /// Sleep for the specified duration (or simulate it)
    fn sleep(&self, duration: StdDuration);

    /// Check if this is a simulated time source
    fn is_simulated(&self) -> bool;

    /// Check if simulation has ended (always false for real time)
    fn is_ended(&self) -> bool {
        false
    }
}

/// Real-time implementation that uses actual system time
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: StdDuration) {
        std::thread::sleep(duration);
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

/// Progress of a simulation, guarded by a single lock.
struct SimulationClock {
    /// Simulated time already slept through
    elapsed: ChronoDuration,
    /// Sleep currently in progress: real start instant and simulated length
    in_progress: Option<(Instant, ChronoDuration)>,
}

/// Simulated time source for previews and tests.
///
/// Two modes:
/// - Linear acceleration: simulated time flows at `multiplier` times real time
/// - Fast-forward (`multiplier == 0.0`): every sleep jumps instantly
pub struct SimulatedTimeSource {
    start_time: DateTime<Local>,
    end_time: DateTime<Local>,
    multiplier: f64,
    clock: Mutex<SimulationClock>,
}

impl SimulatedTimeSource {
    /// Create a new simulated time source.
    ///
    /// A negative multiplier falls back to 60x (one simulated minute per real second).
    pub fn new(start_time: DateTime<Local>, end_time: DateTime<Local>, multiplier: f64) -> Self {
        let multiplier = if multiplier < 0.0 { 60.0 } else { multiplier };
        Self {
            start_time,
            end_time,
            multiplier,
            clock: Mutex::new(SimulationClock {
                elapsed: ChronoDuration::zero(),
                in_progress: None,
            }),
        }
    }

    pub fn is_fast_forward(&self) -> bool {
        self.multiplier == 0.0
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, SimulationClock> {
        // A poisoned clock still holds a usable elapsed value
        self.clock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn current_time(&self) -> DateTime<Local> {
        let clock = self.lock_clock();
        let mut elapsed = clock.elapsed;

        if let Some((started, length)) = clock.in_progress {
            let real = started.elapsed().as_secs_f64() * self.multiplier;
            let partial = ChronoDuration::milliseconds((real * 1000.0) as i64);
            elapsed += partial.min(length);
        }

        (self.start_time + elapsed).min(self.end_time)
    }

    /// Check if the simulation has reached its end time
    pub fn is_ended(&self) -> bool {
        self.current_time() >= self.end_time
    }
}

impl TimeSource for SimulatedTimeSource {
    fn now(&self) -> DateTime<Local> {
        self.current_time()
    }

    fn sleep(&self, duration: StdDuration) {
        let requested =
            ChronoDuration::from_std(duration).unwrap_or_else(|_| ChronoDuration::days(36_500));
        let remaining = self.end_time - self.current_time();
        let step = requested.min(remaining).max(ChronoDuration::zero());

        if self.is_fast_forward() {
            self.lock_clock().elapsed += step;
            // Let other threads (signal listener, file logger) run
            std::thread::sleep(StdDuration::from_millis(1));
            return;
        }

        if step <= ChronoDuration::zero() {
            return;
        }

        self.lock_clock().in_progress = Some((Instant::now(), step));

        let real_secs = step.num_milliseconds() as f64 / 1000.0 / self.multiplier;
        if real_secs > 0.0 {
            std::thread::sleep(StdDuration::from_secs_f64(real_secs));
        }

        let mut clock = self.lock_clock();
        clock.in_progress = None;
        clock.elapsed += step;
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn is_ended(&self) -> bool {
        self.is_ended()
    }
}

/// Initialize the global time source (call once at startup)
pub fn init_time_source(source: Arc<dyn TimeSource>) {
    TIME_SOURCE.set(source).ok();
}

/// Check if the time source has been initialized
pub fn is_initialized() -> bool {
    TIME_SOURCE.get().is_some()
}

/// Get a handle on the global time source, installing real time if unset
pub fn current() -> Arc<dyn TimeSource> {
    TIME_SOURCE.get_or_init(|| Arc::new(RealTimeSource)).clone()
}

/// Get the current time from the global time source
pub fn now() -> DateTime<Local> {
    current().now()
}

/// Check if we're running in simulation mode
pub fn is_simulated() -> bool {
    current().is_simulated()
}

/// Check if simulation has reached its end time (always false for real time)
pub fn simulation_ended() -> bool {
    current().is_ended()
}

/// Parse a local wall-clock datetime in the format "YYYY-MM-DD HH:MM:SS".
///
/// Ambiguous local times (DST fall-back) resolve to the earlier instant.
pub fn parse_datetime(s: &str) -> Result<DateTime<Local>> {
    parse_datetime_in(s, &Local)
}

/// Parse a "YYYY-MM-DD HH:MM:SS" wall-clock datetime in a specific time zone.
pub fn parse_datetime_in<Tz: TimeZone>(s: &str, tz: &Tz) -> Result<DateTime<Tz>> {
    let naive = NaiveDateTime::parse_from_str(s.trim(), DATETIME_FORMAT)
        .with_context(|| format!("Invalid datetime '{s}'. Use YYYY-MM-DD HH:MM:SS"))?;

    tz.from_local_datetime(&naive)
        .earliest()
        .with_context(|| format!("'{s}' does not exist in the local time zone"))
}
