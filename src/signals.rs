//! Signal handling for the overlay loop.
//!
//! A background thread turns process signals into [`SignalMessage`]s on a
//! channel the main loop drains between ticks:
//!
//! - `SIGUSR2` asks for a configuration reload and a fresh overlay session
//! - `SIGINT`, `SIGTERM` and `SIGHUP` stop the loop

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR2},
    iterator::Signals,
};
use std::{
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
    sync::mpsc::{Receiver, Sender, channel},
    thread,
};

/// Unified signal message type for all signal-based communication
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalMessage {
    /// Configuration reload signal (SIGUSR2)
    Reload,
    /// Shutdown signal (SIGTERM, SIGINT, SIGHUP)
    Shutdown,
}

/// Signal handling state shared between threads
pub struct SignalState {
    /// Atomic flag indicating if the application should keep running
    pub running: Arc<AtomicBool>,
    /// Channel receiver for signal messages
    pub signal_receiver: Receiver<SignalMessage>,
    /// Channel sender for signal messages
    pub signal_sender: Sender<SignalMessage>,
}

impl SignalState {
    /// Running flag and channel, with no OS signals attached.
    pub fn new() -> Self {
        let (signal_sender, signal_receiver) = channel();
        Self {
            running: Arc::new(AtomicBool::new(true)),
            signal_receiver,
            signal_sender,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the main loop from within the process.
    pub fn request_shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        let _ = self.signal_sender.send(SignalMessage::Shutdown);
    }
}

impl Default for SignalState {
    fn default() -> Self {
        Self::new()
    }
}

/// Set up signal handling for the application.
///
/// Spawns a background thread that monitors for signals and forwards them as
/// messages. Shutdown signals also clear the running flag directly so a loop
/// blocked in a sleep exits on its next check.
pub fn setup_signal_handler(debug_enabled: bool) -> Result<SignalState> {
    let state = SignalState::new();

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGUSR2])
        .context("failed to register signal handlers")?;

    let running = state.running.clone();
    let sender = state.signal_sender.clone();

    thread::spawn(move || {
        for sig in signals.forever() {
            match sig {
                SIGUSR2 => {
                    if sender.send(SignalMessage::Reload).is_err() {
                        break;
                    }
                    log_pipe!();
                    log_info!("Received configuration reload signal");
                }
                SIGINT | SIGTERM | SIGHUP => {
                    if debug_enabled {
                        let name = match sig {
                            SIGINT => "SIGINT",
                            SIGTERM => "SIGTERM",
                            _ => "SIGHUP",
                        };
                        log_pipe!();
                        log_debug!("Received {}, shutting down", name);
                    }

                    running.store(false, Ordering::SeqCst);
                    let _ = sender.send(SignalMessage::Shutdown);
                    break;
                }
                _ => {}
            }
        }
    });

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_running() {
        let state = SignalState::new();
        assert!(state.is_running());
        assert!(state.signal_receiver.try_recv().is_err());
    }

    #[test]
    fn test_request_shutdown_clears_flag_and_notifies() {
        let state = SignalState::new();
        state.request_shutdown();

        assert!(!state.is_running());
        assert_eq!(
            state.signal_receiver.try_recv().unwrap(),
            SignalMessage::Shutdown
        );
    }

    #[test]
    fn test_messages_arrive_in_order() {
        let state = SignalState::new();
        state.signal_sender.send(SignalMessage::Reload).unwrap();
        state.signal_sender.send(SignalMessage::Shutdown).unwrap();

        let received: Vec<_> = state.signal_receiver.try_iter().collect();
        assert_eq!(received, vec![SignalMessage::Reload, SignalMessage::Shutdown]);
    }
}
