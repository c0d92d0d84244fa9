//! Keyboard input for the timer screen.
//!
//! Each line typed on stdin stands in for a touch gesture:
//!
//! | Input        | Gesture                       |
//! |--------------|-------------------------------|
//! | (empty)      | tap                           |
//! | `r`          | double tap                    |
//! | `<` / `>`    | scroll the picker one item    |
//! | number       | settle the picker on an index |
//! | `q`          | quit                          |

use crate::selector::DurationSelector;
use crate::types::TimerPhase;

/// A user gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Tap,
    DoubleTap,
    Scroll(isize),
    Settle(usize),
    Quit,
}

impl Gesture {
    /// Parses one line of input. Returns `None` for unrecognised input.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        match line {
            "" => Some(Gesture::Tap),
            "r" | "reset" => Some(Gesture::DoubleTap),
            "<" | "h" => Some(Gesture::Scroll(-1)),
            ">" | "l" => Some(Gesture::Scroll(1)),
            "q" | "quit" => Some(Gesture::Quit),
            _ => line.parse().ok().map(Gesture::Settle),
        }
    }
}

/// What the screen should do in response to a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Start a countdown of the given seconds
    Start(u32),
    /// Pause or resume
    TogglePause,
    /// Return to idle showing the given seconds
    Reset(u32),
    /// The picker moved; redraw
    Redraw,
    /// Leave the screen
    Quit,
}

/// Maps a gesture to an intent for the current phase.
///
/// The picker only reacts while it is visible, i.e. outside a countdown.
/// Returns `None` when the gesture has no effect.
pub fn plan(gesture: Gesture, phase: TimerPhase, selector: &mut DurationSelector) -> Option<Intent> {
    match gesture {
        Gesture::Tap if phase.is_in_progress() => Some(Intent::TogglePause),
        Gesture::Tap => Some(Intent::Start(selector.current_duration())),
        Gesture::DoubleTap => Some(Intent::Reset(selector.current_duration())),
        Gesture::Scroll(_) | Gesture::Settle(_) if phase.is_in_progress() => None,
        Gesture::Scroll(delta) => selector.step(delta).then_some(Intent::Redraw),
        Gesture::Settle(index) => selector.select(index).then_some(Intent::Redraw),
        Gesture::Quit => Some(Intent::Quit),
    }
}
