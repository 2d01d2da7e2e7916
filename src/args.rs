//! Command-line argument parsing and processing.
//!
//! Arguments are parsed by hand into a [`CliAction`]. Unknown options and
//! malformed values are reported through the logger and turn into
//! [`CliAction::ShowHelpDueToError`] instead of aborting the process.

/// Default simulation speed: one simulated minute per real second.
pub const DEFAULT_SIMULATION_MULTIPLIER: f64 = 60.0;

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the overlay
    Run {
        debug_enabled: bool,
        config_dir: Option<String>,
        plain: bool,
    },
    /// Evaluate the countdown once and print the result
    Check {
        debug_enabled: bool,
        config_dir: Option<String>,
        json: bool,
        at: Option<String>,
    },
    /// Run the overlay against simulated time
    Simulate {
        debug_enabled: bool,
        start_time: String,
        end_time: String,
        multiplier: f64,
        fast_forward: bool,
        log_to_file: bool,
        config_dir: Option<String>,
    },
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown or invalid arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

/// Rough shape check for "YYYY-MM-DD HH:MM:SS"; full parsing happens later.
fn looks_like_datetime(s: &str) -> bool {
    s.len() == 19
        && s.chars().nth(4) == Some('-')
        && s.chars().nth(7) == Some('-')
        && s.chars().nth(10) == Some(' ')
        && s.chars().nth(13) == Some(':')
        && s.chars().nth(16) == Some(':')
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// The first element is the program name and is skipped.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut debug_enabled = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut plain = false;
        let mut run_check = false;
        let mut json = false;
        let mut check_at: Option<String> = None;
        let mut run_simulate = false;
        let mut simulate_start: Option<String> = None;
        let mut simulate_end: Option<String> = None;
        let mut simulate_multiplier: Option<f64> = None;
        let mut fast_forward = false;
        let mut log_to_file = false;
        let mut config_dir: Option<String> = None;
        let mut unknown_arg_found = false;

        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut i = 0;
        while i < args_vec.len() {
            let arg_str = args_vec[i].as_str();
            match arg_str {
                "--debug" | "-d" => debug_enabled = true,
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--plain" | "-p" => plain = true,
                "--json" => json = true,
                "--config" | "-c" => match args_vec.get(i + 1) {
                    Some(dir) if !dir.starts_with('-') => {
                        config_dir = Some(dir.clone());
                        i += 1;
                    }
                    _ => {
                        log_warning!("Missing directory for --config. Usage: --config <dir>");
                        unknown_arg_found = true;
                    }
                },
                "--at" => match args_vec.get(i + 1) {
                    Some(at) if looks_like_datetime(at) => {
                        check_at = Some(at.clone());
                        i += 1;
                    }
                    Some(at) if !at.starts_with('-') => {
                        log_error!("Invalid time for --at: '{}'. Use YYYY-MM-DD HH:MM:SS", at);
                        unknown_arg_found = true;
                        i += 1;
                    }
                    _ => {
                        log_warning!("Missing time for --at. Usage: --at \"YYYY-MM-DD HH:MM:SS\"");
                        unknown_arg_found = true;
                    }
                },
                "check" => {
                    if run_check {
                        log_warning!("'check' given more than once");
                        unknown_arg_found = true;
                    }
                    run_check = true;
                }
                "--simulate" | "-S" => {
                    run_simulate = true;
                    // --simulate <start> <end> [multiplier | --fast-forward] [--log]
                    if i + 2 < args_vec.len() {
                        let start_str = args_vec[i + 1].clone();
                        let end_str = args_vec[i + 2].clone();
                        i += 2;

                        if !looks_like_datetime(&start_str) {
                            log_error!(
                                "Invalid start time format: '{}'. Use YYYY-MM-DD HH:MM:SS",
                                start_str
                            );
                            unknown_arg_found = true;
                        } else if !looks_like_datetime(&end_str) {
                            log_error!(
                                "Invalid end time format: '{}'. Use YYYY-MM-DD HH:MM:SS",
                                end_str
                            );
                            unknown_arg_found = true;
                        } else {
                            simulate_start = Some(start_str);
                            simulate_end = Some(end_str);

                            if let Some(next) = args_vec.get(i + 1) {
                                if next == "--fast-forward" {
                                    fast_forward = true;
                                    i += 1;
                                } else if !next.starts_with('-') {
                                    match next.parse::<f64>() {
                                        Ok(mult) if (0.1..=3600.0).contains(&mult) => {
                                            simulate_multiplier = Some(mult);
                                        }
                                        _ => {
                                            log_error!(
                                                "Invalid multiplier: {}. Must be between 0.1 and 3600.",
                                                next
                                            );
                                            unknown_arg_found = true;
                                        }
                                    }
                                    i += 1;
                                }
                            }

                            if args_vec.get(i + 1).map(String::as_str) == Some("--log") {
                                log_to_file = true;
                                i += 1;
                            }
                        }
                    } else {
                        log_warning!(
                            "Missing arguments for --simulate. Usage: --simulate \"YYYY-MM-DD HH:MM:SS\" \"YYYY-MM-DD HH:MM:SS\" [multiplier | --fast-forward] [--log]"
                        );
                        unknown_arg_found = true;
                        i = args_vec.len();
                    }
                }
                _ => {
                    if arg_str.starts_with('-') {
                        log_warning!("Unknown option: {arg_str}");
                    } else {
                        log_warning!("Unknown command: {arg_str}");
                    }
                    unknown_arg_found = true;
                }
            }
            i += 1;
        }

        if !unknown_arg_found {
            if run_check && run_simulate {
                log_error!("Cannot use 'check' and '--simulate' together");
                unknown_arg_found = true;
            } else if !run_check && (json || check_at.is_some()) {
                log_warning!("--json and --at are only valid with the 'check' command");
                unknown_arg_found = true;
            } else if run_check && plain {
                log_warning!("--plain is not valid with the 'check' command");
                unknown_arg_found = true;
            }
        }

        let action = if display_version {
            CliAction::ShowVersion
        } else if unknown_arg_found {
            CliAction::ShowHelpDueToError
        } else if display_help {
            CliAction::ShowHelp
        } else if run_check {
            CliAction::Check {
                debug_enabled,
                config_dir,
                json,
                at: check_at,
            }
        } else if run_simulate {
            match (simulate_start, simulate_end) {
                (Some(start_time), Some(end_time)) => CliAction::Simulate {
                    debug_enabled,
                    start_time,
                    end_time,
                    multiplier: simulate_multiplier.unwrap_or(DEFAULT_SIMULATION_MULTIPLIER),
                    fast_forward,
                    log_to_file,
                    config_dir,
                },
                _ => {
                    log_warning!("Missing start or end time for --simulate");
                    CliAction::ShowHelpDueToError
                }
            }
        } else {
            CliAction::Run {
                debug_enabled,
                config_dir,
                plain,
            }
        };

        ParsedArgs { action }
    }

    /// Parse arguments from the process environment.
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

/// Displays version information using logger methods.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    crate::common::logger::write_output(&format!("┗ {}\n", env!("CARGO_PKG_DESCRIPTION")));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("countdownr [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-h, --help             Print help information");
    log_indented!("-p, --plain            Print updates as log lines instead of an overlay");
    log_indented!("-S, --simulate         Run with simulated time (for previewing a countdown)");
    log_indented!("                       Usage: --simulate <start> <end> [multiplier] [--log]");
    log_indented!("                       Use --fast-forward instead of a multiplier to skip waits");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("check                  Evaluate the countdown once and exit");
    log_indented!("  --json               Print the evaluation as JSON");
    log_indented!("  --at <time>          Evaluate at \"YYYY-MM-DD HH:MM:SS\" instead of now");
    log_block_start!("Signals:");
    log_indented!("SIGUSR2                Reload configuration and restart the countdown");
    log_indented!("SIGINT, SIGTERM        Clear the overlay and exit");
    log_end!();
}
