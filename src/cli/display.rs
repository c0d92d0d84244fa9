//! Display utilities for the countdown CLI.
//!
//! This module draws the timer screen in a terminal:
//! - The color wipe as a bar that drains with the countdown
//! - The remaining time digits
//! - The preset picker when no countdown is in progress

use std::io::{IsTerminal, Write};

use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::style::{Color, Print, Stylize};
use crossterm::terminal::{Clear, ClearType};

use crate::config::{Palette, Rgb};
use crate::render::{format_time, Frame, PickerLayout};
use crate::selector::DurationSelector;

/// Terminal bell, standing in for a vibration.
const BELL: &str = "\x07";

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
#[derive(Debug, Clone)]
pub struct Display {
    /// Colors, or `None` for plain output
    palette: Option<Palette>,
    /// Width of the wipe bar in cells
    bar_width: usize,
    /// Whether frames overwrite each other in place
    in_place: bool,
}

impl Display {
    /// Creates a display.
    ///
    /// Colors and in-place redraws are only used when stdout is a terminal.
    pub fn new(palette: Palette, bar_width: u16, color: bool) -> Self {
        let is_terminal = std::io::stdout().is_terminal();
        Self {
            palette: (color && is_terminal).then_some(palette),
            bar_width: usize::from(bar_width.max(1)),
            in_place: is_terminal,
        }
    }

    /// Creates a display that writes plain lines.
    pub fn plain(bar_width: u16) -> Self {
        Self {
            palette: None,
            bar_width: usize::from(bar_width.max(1)),
            in_place: false,
        }
    }

    /// Draws one frame of the timer screen.
    pub fn draw(&self, frame: &Frame, selector: &DurationSelector) {
        let mut line = self.render_frame(frame);
        if frame.show_controls {
            line.push_str("  ");
            line.push_str(&self.render_picker(selector));
        }

        let mut stdout = std::io::stdout().lock();
        let result = if self.in_place {
            queue!(
                stdout,
                MoveToColumn(0),
                Clear(ClearType::CurrentLine),
                Print(&line)
            )
        } else {
            writeln!(stdout, "{}", line)
        };
        if result.and_then(|()| stdout.flush()).is_err() {
            tracing::debug!("failed to write frame to stdout");
        }
    }

    /// Renders the wipe bar, digits, and pause marker.
    pub fn render_frame(&self, frame: &Frame) -> String {
        let filled = ((frame.wipe * self.bar_width as f64).round() as usize).min(self.bar_width);
        let empty = self.bar_width - filled;
        let marker = if frame.paused { " ||" } else { "" };

        match &self.palette {
            Some(palette) => format!(
                "{}{} {}",
                " ".repeat(filled).on(color(palette.primary)),
                " ".repeat(empty).on(color(palette.background)),
                format!("{}{}", frame.digits, marker).with(color(palette.text)),
            ),
            None => format!(
                "[{}{}] {}{}",
                "#".repeat(filled),
                "-".repeat(empty),
                frame.digits,
                marker
            ),
        }
    }

    /// Renders the picker around the current selection, e.g. `01:00 [05:00] 10:00`.
    ///
    /// With colors, neighbours fade toward the background the way the
    /// picker dims items away from the center.
    pub fn render_picker(&self, selector: &DurationSelector) -> String {
        let index = selector.index();
        let layout = PickerLayout::for_width(self.bar_width as f64);
        let scroll_x = layout.offset_for(index);

        selector
            .durations()
            .iter()
            .enumerate()
            .skip(index.saturating_sub(1))
            .take(3)
            .map(|(i, seconds)| {
                let label = if i == index {
                    format!("[{}]", format_time(seconds))
                } else {
                    format_time(seconds)
                };
                match &self.palette {
                    Some(palette) => {
                        let style = layout.item_style(i, scroll_x);
                        let shade = blend(palette.text, palette.background, style.opacity);
                        label.with(shade).to_string()
                    }
                    None => label,
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Signals that the countdown finished.
    pub fn show_completed(&self) {
        if self.in_place {
            println!();
        }
        println!("{}* Time's up", BELL);
    }

    /// Shows the key bindings.
    pub fn show_controls_help() {
        println!("Enter: start / pause / resume   r: reset   < >: pick   q: quit");
    }

    /// Ends the screen, leaving the cursor on a fresh line.
    pub fn finish(&self) {
        if self.in_place {
            println!();
        }
    }

    /// Lists every preset, marking the selected one.
    pub fn show_presets(selector: &DurationSelector) {
        println!("Presets");
        println!("─────────────────────────────");
        for (i, seconds) in selector.durations().iter().enumerate() {
            let mark = if i == selector.index() { "*" } else { " " };
            println!("{} {:>2}  {}", mark, i, format_time(seconds));
        }
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("error: {}", message);
    }
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

/// Mixes `front` over `back` at `opacity` in `[0, 1]`.
fn blend(front: Rgb, back: Rgb, opacity: f64) -> Color {
    let mix = |f: u8, b: u8| {
        let (f, b) = (f64::from(f), f64::from(b));
        (b + (f - b) * opacity.clamp(0.0, 1.0)).round() as u8
    };
    Color::Rgb {
        r: mix(front.r, back.r),
        g: mix(front.g, back.g),
        b: mix(front.b, back.b),
    }
}

// ============================================================================
// Tests
// ============================================================================
