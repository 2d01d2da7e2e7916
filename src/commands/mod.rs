//! Command-line command handlers for countdownr.
//!
//! One-shot commands live in their own submodules; the long-running overlay
//! itself is started from `main.rs`.

pub mod check;
pub mod simulate;
