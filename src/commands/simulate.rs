//! Implementation of the --simulate command for previewing a countdown.
//!
//! Installs a simulated time source and returns control to `main.rs`, which
//! then runs the overlay loop as usual (with the plain surface) against the
//! accelerated clock.

use anyhow::{Context, Result};
use chrono::Local;
use std::sync::Arc;

use crate::common::constants::DATETIME_FORMAT;
use crate::common::logger::{Log, LoggerGuard};
use crate::time_source::{self, SimulatedTimeSource};

/// Resources that must live as long as the simulation.
pub struct SimulationGuards {
    logger_guard: Option<LoggerGuard>,
    log_path: Option<String>,
    completed: bool,
}

impl SimulationGuards {
    /// Report that the simulation reached its end time.
    pub fn complete_simulation(&mut self) {
        self.completed = true;
        log_block_start!("Simulation complete");
        if let Some(path) = &self.log_path {
            log_indented!("Output written to {}", path);
        }
        log_end!();
    }
}

impl Drop for SimulationGuards {
    fn drop(&mut self) {
        if !self.completed {
            log_pipe!();
            log_warning!("Simulation interrupted before its end time");
            log_end!();
        }
        // Flush the log file last so the lines above are included
        drop(self.logger_guard.take());
    }
}

/// Handle the --simulate command by setting up a simulated time source.
///
/// `multiplier` is ignored in fast-forward mode. With `log_to_file` every log
/// line goes to `countdownr-simulation-<timestamp>.log` in the working directory.
pub fn handle_simulate_command(
    start_time: String,
    end_time: String,
    multiplier: f64,
    fast_forward: bool,
    debug_enabled: bool,
    log_to_file: bool,
) -> Result<SimulationGuards> {
    let start = time_source::parse_datetime(&start_time).context("Invalid start time")?;
    let end = time_source::parse_datetime(&end_time).context("Invalid end time")?;

    if end <= start {
        anyhow::bail!("End time must be after start time");
    }

    let (logger_guard, log_path) = if log_to_file {
        let path = format!(
            "countdownr-simulation-{}.log",
            Local::now().format("%Y%m%d-%H%M%S")
        );
        let guard = Log::start_file_logging(path.clone())
            .context("Failed to start logging to file")?;
        (Some(guard), Some(path))
    } else {
        (None, None)
    };

    // Install the simulated clock before any logging so prefixes are right from the start
    let source_multiplier = if fast_forward { 0.0 } else { multiplier };
    time_source::init_time_source(Arc::new(SimulatedTimeSource::new(
        start,
        end,
        source_multiplier,
    )));

    log_version!();
    log_block_start!("Simulation Mode");
    log_decorated!(
        "Simulating from {} to {}",
        start.format(DATETIME_FORMAT),
        end.format(DATETIME_FORMAT)
    );

    let duration = end.signed_duration_since(start);
    log_indented!(
        "Total simulated time: {} hours {} minutes",
        duration.num_hours(),
        duration.num_minutes() % 60
    );

    if fast_forward {
        log_indented!("Time acceleration: fast-forward (instant execution)");
    } else {
        let real_duration_secs = duration.num_seconds() as f64 / multiplier;
        log_indented!(
            "Time acceleration: {}x (will complete in ~{:.1} seconds)",
            multiplier,
            real_duration_secs
        );
    }

    if debug_enabled {
        log_pipe!();
        log_debug!("Simulated time source initialized");
    }

    Ok(SimulationGuards {
        logger_guard,
        log_path,
        completed: false,
    })
}
