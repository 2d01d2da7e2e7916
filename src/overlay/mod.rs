//! Countdown overlay: the presentation state machine around the evaluator.
//!
//! An [`Overlay`] owns a [`CountdownEvaluator`] and a [`TextSurface`]. A
//! session goes through two independent pieces of state:
//!
//! - [`SetupState`]: `Uninitialized` until the first [`Overlay::setup`] call,
//!   `Initialized` afterwards. Further `setup` calls are no-ops.
//! - [`Phase`]: `Hidden` until setup finds the countdown eligible, then
//!   `Counting` for the rest of the session. Entering `Counting` writes the
//!   first text and runs the fade-in exactly once.
//!
//! [`Overlay::tick`] refreshes the text while counting and does nothing while
//! hidden. There is no way back from `Counting` to `Hidden`; a new session
//! (see [`Overlay::restart`]) is the only reset.

pub mod terminal;

use anyhow::Result;
use chrono::{DateTime, Local, TimeZone};
use std::time::Duration;

use crate::countdown::CountdownEvaluator;

pub use terminal::{PlainSurface, TerminalSurface};

/// Something that can show a single line of countdown text.
#[cfg_attr(test, mockall::automock)]
pub trait TextSurface {
    /// Replace the displayed text.
    fn set_text(&mut self, text: &str) -> Result<()>;

    /// Fade the current text in over `duration`.
    fn fade_in(&mut self, duration: Duration) -> Result<()>;

    /// Remove the text from the surface.
    fn clear(&mut self) -> Result<()>;
}

/// Whether the one-time session setup has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupState {
    Uninitialized,
    Initialized,
}

/// What the overlay is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Hidden,
    Counting,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Hidden => "hidden",
            Phase::Counting => "counting",
        }
    }
}

pub struct Overlay<S: TextSurface, Tz: TimeZone = Local> {
    evaluator: CountdownEvaluator<Tz>,
    surface: S,
    fade_in_duration: Duration,
    setup_state: SetupState,
    phase: Phase,
}

impl<S: TextSurface, Tz: TimeZone> Overlay<S, Tz> {
    pub fn new(evaluator: CountdownEvaluator<Tz>, surface: S, fade_in_duration: Duration) -> Self {
        Self {
            evaluator,
            surface,
            fade_in_duration,
            setup_state: SetupState::Uninitialized,
            phase: Phase::Hidden,
        }
    }

    pub fn evaluator(&self) -> &CountdownEvaluator<Tz> {
        &self.evaluator
    }

    pub fn setup_state(&self) -> SetupState {
        self.setup_state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Run the session setup once.
    ///
    /// If the countdown is eligible at `now`, shows the first text and fades
    /// it in. Later calls return the current phase without touching the surface.
    pub fn setup(&mut self, now: &DateTime<Tz>) -> Result<Phase> {
        if self.setup_state == SetupState::Initialized {
            return Ok(self.phase);
        }
        self.setup_state = SetupState::Initialized;

        if self.evaluator.should_display(now) {
            self.phase = Phase::Counting;
            self.surface
                .set_text(&self.evaluator.format_remaining(now))?;
            self.surface.fade_in(self.fade_in_duration)?;
        }

        Ok(self.phase)
    }

    /// Refresh the countdown text. Does nothing unless counting.
    pub fn tick(&mut self, now: &DateTime<Tz>) -> Result<()> {
        match self.phase {
            Phase::Counting => self
                .surface
                .set_text(&self.evaluator.format_remaining(now)),
            Phase::Hidden => Ok(()),
        }
    }

    /// Start a new session with `evaluator`, clearing anything on screen.
    ///
    /// The overlay returns to `Uninitialized`/`Hidden`; call [`Overlay::setup`] next.
    pub fn restart(
        &mut self,
        evaluator: CountdownEvaluator<Tz>,
        fade_in_duration: Duration,
    ) -> Result<()> {
        if self.phase == Phase::Counting {
            self.surface.clear()?;
        }
        self.evaluator = evaluator;
        self.fade_in_duration = fade_in_duration;
        self.setup_state = SetupState::Uninitialized;
        self.phase = Phase::Hidden;
        Ok(())
    }

    /// Clear the surface at the end of the session and hand it back.
    pub fn teardown(mut self) -> Result<S> {
        if self.phase == Phase::Counting {
            self.surface.clear()?;
        }
        Ok(self.surface)
    }
}
