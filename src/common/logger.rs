//! Structured logging system with visual formatting.
//!
//! Output follows a box-drawing layout: a version header, blocks started with
//! `┣`, indented detail lines under a `┃` pipe, and a terminating `╹`. Level
//! macros (`log_info!`, `log_warning!`, ...) carry a colored `[LEVEL]` tag.
//!
//! Logging can be switched off at runtime, which the overlay does while the
//! terminal surface owns the screen. When a simulated time source is active
//! every line is prefixed with the simulated wall-clock time.

use std::io::Write;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

// Channel for routing output to a file when --log is active
static LOG_CHANNEL: OnceLock<Option<Sender<LogMessage>>> = OnceLock::new();

enum LogMessage {
    Formatted(String),
    Shutdown,
}

/// Main logging interface providing structured output formatting.
///
/// ## Conventions
///
/// - **`log_block_start!`** opens a new conceptual block (`┃` spacer, then `┣ message`).
/// - **`log_decorated!`** continues a block (`┣ message`).
/// - **`log_indented!`** lists details under a block (`┃   message`).
/// - **`log_pipe!`** inserts a bare `┃` before a level message that starts its own block.
/// - **`log_version!`** prints the `┏ countdownr vX.Y.Z ━━╸` header once at startup.
/// - **`log_end!`** prints the final `╹`.
/// - **`log_info!`, `log_warning!`, `log_error!`, `log_debug!`, `log_critical!`** are
///   semantic messages with a `[LEVEL]` prefix.
pub struct Log;

impl Log {
    /// Enable or disable logging.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    /// Check if logging is currently enabled.
    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Start file logging to the specified path.
    ///
    /// Lines are written by a dedicated thread; ANSI color codes are stripped.
    /// Dropping the returned guard flushes and joins the writer.
    pub fn start_file_logging(file_path: String) -> anyhow::Result<LoggerGuard> {
        use anyhow::Context;

        let mut file = std::fs::File::create(&file_path)
            .with_context(|| format!("Failed to create log file {file_path}"))?;

        let (tx, rx) = channel();

        LOG_CHANNEL
            .set(Some(tx.clone()))
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;

        let handle = std::thread::spawn(move || {
            loop {
                match rx.recv() {
                    Ok(LogMessage::Formatted(text)) => {
                        file.write_all(text.as_bytes())?;
                    }
                    Ok(LogMessage::Shutdown) | Err(_) => {
                        file.flush()?;
                        break;
                    }
                }
            }

            Ok::<(), anyhow::Error>(())
        });

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }

    /// Timestamp prefix for simulation mode, `[HH:MM:SS] `.
    ///
    /// Empty unless a simulated time source has been installed. Public for macro access.
    pub fn get_timestamp_prefix() -> String {
        // Check without initializing the time source
        if crate::time_source::is_initialized() && crate::time_source::is_simulated() {
            format!("[{}] ", crate::time_source::now().format("%H:%M:%S"))
        } else {
            String::new()
        }
    }
}

/// Guard for file logging that ensures clean shutdown.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<anyhow::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Strip ANSI escape sequences (`ESC [ ... m`) from text.
pub(crate) fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == 'm' {
                    break;
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

// Public function that routes output (needed by macros)
pub fn write_output(text: &str) {
    if let Some(Some(tx)) = LOG_CHANNEL.get() {
        let _ = tx.send(LogMessage::Formatted(strip_ansi_codes(text)));
    } else {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }
}

// # Logging Macros

/// Shared expansion for every line-style macro: checks the enable flag,
/// applies the simulation prefix and routes the line through `write_output`.
#[doc(hidden)]
#[macro_export]
macro_rules! __log_line {
    ($template:literal, $message:expr) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::get_timestamp_prefix();
            let message = $message;
            let formatted = format!($template, prefix = prefix, message = message);
            $crate::common::logger::write_output(&formatted);
        }
    }};
}

/// Log a decorated message, typically as part of an existing block.
#[macro_export]
macro_rules! log_decorated {
    ($fmt:literal $($arg:tt)*) => {
        $crate::__log_line!("{prefix}┣ {message}\n", format!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::__log_line!("{prefix}┣ {message}\n", $expr)
    };
}

/// Log an indented message for sub-items or details within a block.
#[macro_export]
macro_rules! log_indented {
    ($fmt:literal $($arg:tt)*) => {
        $crate::__log_line!("{prefix}┃   {message}\n", format!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::__log_line!("{prefix}┃   {message}\n", $expr)
    };
}

/// Log a visual pipe separator for vertical spacing.
#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::__log_line!("{prefix}┃{message}\n", "")
    };
}

/// Log a block start message, initiating a new conceptual block of information.
#[macro_export]
macro_rules! log_block_start {
    ($fmt:literal $($arg:tt)*) => {
        $crate::__log_line!("{prefix}┃\n{prefix}┣ {message}\n", format!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::__log_line!("{prefix}┃\n{prefix}┣ {message}\n", $expr)
    };
}

/// Log the application version header.
#[macro_export]
macro_rules! log_version {
    () => {
        $crate::__log_line!(
            "{prefix}┏ countdownr v{message} ━━╸\n",
            env!("CARGO_PKG_VERSION")
        )
    };
}

/// Log the final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {
        $crate::__log_line!("{prefix}╹{message}\n", "")
    };
}

/// Log a warning message with pipe prefix and yellow-colored text.
#[macro_export]
macro_rules! log_warning {
    ($fmt:literal $($arg:tt)*) => {
        $crate::__log_line!("{prefix}┣[\x1b[33mWARNING\x1b[0m] {message}\n", format!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::__log_line!("{prefix}┣[\x1b[33mWARNING\x1b[0m] {message}\n", $expr)
    };
}

/// Log an error message with pipe prefix and red-colored text.
#[macro_export]
macro_rules! log_error {
    ($fmt:literal $($arg:tt)*) => {
        $crate::__log_line!("{prefix}┣[\x1b[31mERROR\x1b[0m] {message}\n", format!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::__log_line!("{prefix}┣[\x1b[31mERROR\x1b[0m] {message}\n", $expr)
    };
}

/// Log an error with a spacer pipe and terminal corner, ending the log flow.
#[macro_export]
macro_rules! log_error_exit {
    ($fmt:literal $($arg:tt)*) => {
        $crate::__log_line!(
            "{prefix}┃\n{prefix}┗[\x1b[31mERROR\x1b[0m] {message}\n",
            format!($fmt $($arg)*)
        )
    };
    ($expr:expr) => {
        $crate::__log_line!("{prefix}┃\n{prefix}┗[\x1b[31mERROR\x1b[0m] {message}\n", $expr)
    };
}

/// Log an informational message with pipe prefix and green-colored text.
#[macro_export]
macro_rules! log_info {
    ($fmt:literal $($arg:tt)*) => {
        $crate::__log_line!("{prefix}┣[\x1b[32mINFO\x1b[0m] {message}\n", format!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::__log_line!("{prefix}┣[\x1b[32mINFO\x1b[0m] {message}\n", $expr)
    };
}

/// Log a debug/operational message with pipe prefix and green-colored text.
#[macro_export]
macro_rules! log_debug {
    ($fmt:literal $($arg:tt)*) => {
        $crate::__log_line!("{prefix}┣[\x1b[32mDEBUG\x1b[0m] {message}\n", format!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::__log_line!("{prefix}┣[\x1b[32mDEBUG\x1b[0m] {message}\n", $expr)
    };
}

/// Log a critical message with pipe prefix and red-colored text.
#[macro_export]
macro_rules! log_critical {
    ($fmt:literal $($arg:tt)*) => {
        $crate::__log_line!("{prefix}┣[\x1b[31mCRITICAL\x1b[0m] {message}\n", format!($fmt $($arg)*))
    };
    ($expr:expr) => {
        $crate::__log_line!("{prefix}┣[\x1b[31mCRITICAL\x1b[0m] {message}\n", $expr)
    };
}
