//! # Countdownr Library
//!
//! Internal library for the countdownr binary.
//!
//! This library exists to enable testing of the countdown internals and to keep
//! CLI dispatch (main.rs) separate from application logic.
//!
//! ## Architecture
//!
//! - **Evaluation**: `countdown` decides whether the countdown is visible and
//!   renders the remaining time ("2 hours, 15 minutes, 3 seconds")
//! - **Presentation**: `overlay` holds the per-session state machine and the
//!   terminal/plain text surfaces
//! - **Core Logic**: `core` runs the one-second tick loop
//! - **Configuration**: `config` for TOML-based settings with reload on SIGUSR2
//! - **Commands**: `commands` for `check` and `--simulate`
//! - **Infrastructure**: signal handling, the time source, logging and utilities

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod common;

pub mod args;
pub mod commands;
pub mod config;
pub mod core;
pub mod countdown;
pub mod overlay;
pub mod signals;
pub mod time_source;

pub use countdown::{CountdownConfig, CountdownEvaluator, CountdownMode, EvaluationResult};
