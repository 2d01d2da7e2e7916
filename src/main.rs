//! Main application entry point and high-level flow coordination.
//!
//! Parses the command line, then either runs a one-shot command (`check`,
//! help, version) or starts the overlay through [`ApplicationRunner`]:
//!
//! 1. Signal handler registration
//! 2. Configuration loading (a default file is created on first run)
//! 3. Surface selection: terminal overlay, or plain log lines for `--plain`,
//!    simulations and non-interactive output
//! 4. The tick loop until a shutdown signal or the end of a simulation
//! 5. Clearing the overlay and restoring the terminal

use anyhow::Result;
use std::io::IsTerminal;

use countdownr::{
    args::{self, CliAction, ParsedArgs},
    commands,
    common::constants::EXIT_FAILURE,
    config::{self, Config},
    core::{Core, CoreParams},
    log_block_start, log_debug, log_end, log_error_exit, log_pipe, log_version, log_warning,
    overlay::{PlainSurface, TerminalSurface, TextSurface},
    signals::{SignalState, setup_signal_handler},
    time_source,
};

/// Builder for configuring and running the overlay.
pub struct ApplicationRunner {
    debug_enabled: bool,
    plain: bool,
    show_headers: bool,
}

impl ApplicationRunner {
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            plain: false,
            show_headers: true,
        }
    }

    /// Print updates as log lines instead of drawing an overlay
    pub fn plain(mut self, plain: bool) -> Self {
        self.plain = plain;
        self
    }

    /// Skip header display (already shown by the simulate command)
    pub fn without_headers(mut self) -> Self {
        self.show_headers = false;
        self
    }

    pub fn run(self) -> Result<()> {
        if self.show_headers {
            log_version!();

            if self.debug_enabled {
                log_pipe!();
                log_debug!("Debug mode enabled");
            }
        }

        let signal_state = setup_signal_handler(self.debug_enabled)?;

        let config = Config::load()?;
        config.log_config();

        let use_terminal = !self.plain && !time_source::is_simulated();
        if use_terminal && !std::io::stdout().is_terminal() {
            log_pipe!();
            log_warning!("Output is not a terminal, falling back to plain output");
        }

        if use_terminal && std::io::stdout().is_terminal() {
            log_block_start!("Starting countdown overlay (Ctrl+C to exit)");
            let surface = TerminalSurface::new(config.corner())?;
            self.run_core(surface, config, signal_state)?;
        } else {
            self.run_core(PlainSurface::new(), config, signal_state)?;
        }

        log_block_start!("Shutting down countdownr...");
        // Simulations close the log themselves
        if !time_source::is_simulated() {
            log_end!();
        }

        Ok(())
    }

    fn run_core<S: TextSurface>(
        &self,
        surface: S,
        config: Config,
        signal_state: SignalState,
    ) -> Result<()> {
        let core = Core::new(CoreParams {
            surface,
            config,
            signal_state,
            time_source: time_source::current(),
            debug_enabled: self.debug_enabled,
            config_path: None,
        })?;

        // Dropping the surface here restores the terminal before further logging
        drop(core.execute()?);
        Ok(())
    }
}

fn dispatch(action: CliAction) -> Result<()> {
    match action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            args::display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Run {
            debug_enabled,
            config_dir,
            plain,
        } => {
            config::set_config_dir(config_dir)?;
            ApplicationRunner::new(debug_enabled).plain(plain).run()
        }
        CliAction::Check {
            debug_enabled,
            config_dir,
            json,
            at,
        } => {
            config::set_config_dir(config_dir)?;
            commands::check::handle_check_command(json, at, debug_enabled)
        }
        CliAction::Simulate {
            debug_enabled,
            start_time,
            end_time,
            multiplier,
            fast_forward,
            log_to_file,
            config_dir,
        } => {
            config::set_config_dir(config_dir)?;

            // Keep the guards alive for the duration of the simulation
            let mut simulation_guards = commands::simulate::handle_simulate_command(
                start_time,
                end_time,
                multiplier,
                fast_forward,
                debug_enabled,
                log_to_file,
            )?;

            ApplicationRunner::new(debug_enabled)
                .plain(true)
                .without_headers()
                .run()?;

            // Only complete the simulation if it ran to completion (not interrupted)
            if time_source::simulation_ended() {
                simulation_guards.complete_simulation();
            }

            Ok(())
        }
    }
}

fn main() {
    let parsed_args = ParsedArgs::from_env();

    if let Err(e) = dispatch(parsed_args.action) {
        log_error_exit!("{e:#}");
        std::process::exit(EXIT_FAILURE);
    }
}
