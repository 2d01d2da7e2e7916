//! Text surfaces backed by the terminal.
//!
//! [`TerminalSurface`] draws the countdown on the alternate screen, anchored
//! to a [`Corner`], and fades it in by stepping the foreground color from
//! black to white. Nothing is drawn until the first fade starts. [`PlainSurface`] writes each update as a log line and is
//! used for `--plain` runs and simulations.

use anyhow::Result;
use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{Stdout, Write, stdout};
use std::time::Duration;

use super::TextSurface;
use crate::common::constants::FADE_IN_STEPS;
use crate::common::logger::Log;
use crate::config::Corner;

const FULL_BRIGHTNESS: u8 = u8::MAX;

pub struct TerminalSurface<W: Write = Stdout> {
    out: W,
    corner: Corner,
    text: String,
    brightness: u8,
    /// Fixed size for off-screen writers; `None` queries the terminal
    size: Option<(u16, u16)>,
    owns_screen: bool,
}

impl TerminalSurface<Stdout> {
    /// Take over the terminal: alternate screen, hidden cursor, logging muted.
    pub fn new(corner: Corner) -> Result<Self> {
        let mut out = stdout();
        execute!(out, EnterAlternateScreen, cursor::Hide)?;

        // Log lines would scribble over the overlay
        Log::set_enabled(false);

        Ok(Self {
            out,
            corner,
            text: String::new(),
            brightness: 0,
            size: None,
            owns_screen: true,
        })
    }
}

impl<W: Write> TerminalSurface<W> {
    /// Draw into an arbitrary writer with a fixed screen size.
    pub fn with_writer(out: W, corner: Corner, size: (u16, u16)) -> Self {
        Self {
            out,
            corner,
            text: String::new(),
            brightness: 0,
            size: Some(size),
            owns_screen: false,
        }
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    fn screen_size(&self) -> Result<(u16, u16)> {
        match self.size {
            Some(size) => Ok(size),
            None => Ok(terminal::size()?),
        }
    }

    fn draw(&mut self) -> Result<()> {
        let (column, row) = anchor_position(self.corner, self.screen_size()?, &self.text);
        let level = self.brightness;

        queue!(
            self.out,
            Clear(ClearType::All),
            MoveTo(column, row),
            SetForegroundColor(Color::Rgb {
                r: level,
                g: level,
                b: level
            }),
            Print(&self.text),
            ResetColor
        )?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> TextSurface for TerminalSurface<W> {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.text = text.to_string();
        if self.brightness == 0 {
            return Ok(());
        }
        self.draw()
    }

    fn fade_in(&mut self, duration: Duration) -> Result<()> {
        if duration.is_zero() {
            self.brightness = FULL_BRIGHTNESS;
            return self.draw();
        }

        let step_length = duration / FADE_IN_STEPS;
        for step in 1..=FADE_IN_STEPS {
            self.brightness = fade_level(step, FADE_IN_STEPS);
            self.draw()?;
            std::thread::sleep(step_length);
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.text.clear();
        self.brightness = 0;
        queue!(self.out, Clear(ClearType::All))?;
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> Drop for TerminalSurface<W> {
    fn drop(&mut self) {
        if self.owns_screen {
            let _ = execute!(self.out, ResetColor, cursor::Show, LeaveAlternateScreen);
            Log::set_enabled(true);
        }
    }
}

/// Foreground level for fade step `step` of `steps`.
fn fade_level(step: u32, steps: u32) -> u8 {
    let steps = steps.max(1);
    let step = step.min(steps);
    (u32::from(FULL_BRIGHTNESS) * step / steps) as u8
}

/// Top-left cell of `text` placed at `corner` on a `(columns, rows)` screen.
pub fn anchor_position(corner: Corner, (columns, rows): (u16, u16), text: &str) -> (u16, u16) {
    let width = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
    let last_row = rows.saturating_sub(1);

    let left = columns.min(1);
    let right = columns.saturating_sub(width).saturating_sub(1);
    let center = columns.saturating_sub(width) / 2;

    let top = last_row.min(1);
    let bottom = last_row.saturating_sub(1);
    let middle = last_row / 2;

    match corner {
        Corner::TopLeft => (left, top),
        Corner::TopCenter => (center, top),
        Corner::TopRight => (right, top),
        Corner::Center => (center, middle),
        Corner::BottomLeft => (left, bottom),
        Corner::BottomCenter => (center, bottom),
        Corner::BottomRight => (right, bottom),
    }
}

/// Surface that reports every update through the logger.
#[derive(Default)]
pub struct PlainSurface {
    last_text: Option<String>,
}

impl PlainSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_text(&self) -> Option<&str> {
        self.last_text.as_deref()
    }
}

impl TextSurface for PlainSurface {
    fn set_text(&mut self, text: &str) -> Result<()> {
        if self.last_text.is_none() {
            log_block_start!("{}", text);
        } else {
            log_decorated!("{}", text);
        }
        self.last_text = Some(text.to_string());
        Ok(())
    }

    fn fade_in(&mut self, duration: Duration) -> Result<()> {
        if duration.is_zero() {
            log_indented!("Countdown shown");
        } else {
            log_indented!("Countdown fading in over {:.1}s", duration.as_secs_f64());
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        if self.last_text.take().is_some() {
            log_pipe!();
            log_info!("Countdown cleared");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_position_corners() {
        let size = (80, 24);
        let text = "2 hours"; // 7 columns

        assert_eq!(anchor_position(Corner::TopLeft, size, text), (1, 1));
        assert_eq!(anchor_position(Corner::TopRight, size, text), (72, 1));
        assert_eq!(anchor_position(Corner::TopCenter, size, text), (36, 1));
        assert_eq!(anchor_position(Corner::Center, size, text), (36, 11));
        assert_eq!(anchor_position(Corner::BottomLeft, size, text), (1, 22));
        assert_eq!(anchor_position(Corner::BottomCenter, size, text), (36, 22));
        assert_eq!(anchor_position(Corner::BottomRight, size, text), (72, 22));
    }

    #[test]
    fn test_anchor_position_tiny_screen_saturates() {
        let text = "5 years, 11 months, 30 days";
        assert_eq!(anchor_position(Corner::BottomRight, (10, 1), text), (0, 0));
        assert_eq!(anchor_position(Corner::Center, (0, 0), text), (0, 0));
    }

    #[test]
    fn test_fade_level_ramps_to_full() {
        assert_eq!(fade_level(0, 12), 0);
        assert_eq!(fade_level(6, 12), 127);
        assert_eq!(fade_level(12, 12), 255);
        assert_eq!(fade_level(20, 12), 255);
        assert_eq!(fade_level(1, 0), 255);
    }

    /// Foreground levels in the order they were written
    fn foreground_levels(output: &str) -> Vec<&str> {
        output
            .split("38;2;")
            .skip(1)
            .filter_map(|rest| rest.split(';').next())
            .collect()
    }

    #[test]
    fn test_terminal_surface_writes_text_after_fade() {
        let mut surface = TerminalSurface::with_writer(Vec::new(), Corner::BottomRight, (80, 24));
        surface.set_text("3 days, 4 hours").unwrap();
        surface.fade_in(Duration::ZERO).unwrap();

        let output = String::from_utf8_lossy(surface.writer()).to_string();
        assert!(output.contains("3 days, 4 hours"));
        // Full white foreground
        assert!(output.contains("38;2;255;255;255"));
    }

    #[test]
    fn test_terminal_surface_fade_starts_dark() {
        let mut surface = TerminalSurface::with_writer(Vec::new(), Corner::Center, (80, 24));
        surface.set_text("1 minute").unwrap();
        assert!(surface.writer().is_empty());

        surface.fade_in(Duration::from_millis(12)).unwrap();

        let output = String::from_utf8_lossy(surface.writer()).to_string();
        assert_eq!(output.matches("1 minute").count(), FADE_IN_STEPS as usize);

        let levels = foreground_levels(&output);
        assert_eq!(levels.first(), Some(&"21"));
        assert_eq!(levels.last(), Some(&"255"));
        assert_eq!(levels.iter().filter(|level| **level == "255").count(), 1);
    }

    #[test]
    fn test_terminal_surface_redraws_at_full_brightness_after_fade() {
        let mut surface = TerminalSurface::with_writer(Vec::new(), Corner::TopLeft, (80, 24));
        surface.set_text("2 seconds").unwrap();
        surface.fade_in(Duration::ZERO).unwrap();
        surface.set_text("1 second").unwrap();

        let output = String::from_utf8_lossy(surface.writer()).to_string();
        assert_eq!(foreground_levels(&output), vec!["255", "255"]);
    }

    #[test]
    fn test_terminal_surface_clear_waits_for_next_fade() {
        let mut surface = TerminalSurface::with_writer(Vec::new(), Corner::TopLeft, (80, 24));
        surface.set_text("5 seconds").unwrap();
        surface.fade_in(Duration::ZERO).unwrap();
        surface.clear().unwrap();
        surface.set_text("1 hour").unwrap();

        let output = String::from_utf8_lossy(surface.writer()).to_string();
        assert!(!output.contains("1 hour"));
    }

    #[test]
    fn test_plain_surface_tracks_last_text() {
        let mut surface = PlainSurface::new();
        assert_eq!(surface.last_text(), None);

        surface.set_text("1 hour").unwrap();
        surface.fade_in(Duration::from_secs(1)).unwrap();
        surface.set_text("59 minutes, 59 seconds").unwrap();
        assert_eq!(surface.last_text(), Some("59 minutes, 59 seconds"));

        surface.clear().unwrap();
        assert_eq!(surface.last_text(), None);
    }
}
