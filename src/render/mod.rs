//! Rendering adapter for the countdown screen.
//!
//! Pure functions mapping a [`TimerState`] snapshot and the picker's scroll
//! position to visual parameters. Nothing here keeps time; a front end
//! calls these whenever it receives a snapshot or a scroll update.

use crate::types::TimerState;

/// Picker item width as a fraction of the screen width.
pub const ITEM_WIDTH_RATIO: f64 = 0.38;

/// Opacity of picker items one slot away from the center.
pub const SIDE_ITEM_OPACITY: f64 = 0.4;

/// Scale of picker items one slot away from the center.
pub const SIDE_ITEM_SCALE: f64 = 0.7;

/// Formats seconds as `MM:SS`. Minutes are not wrapped into hours.
pub fn format_time(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Fraction of the screen still covered by the wipe panel, in `[0, 1]`.
///
/// The panel covers the whole screen when a countdown starts and slides
/// away linearly as it drains. Outside a countdown it is fully hidden.
pub fn wipe_fraction(state: &TimerState) -> f64 {
    let total = state.total_ms();
    if !state.phase.is_in_progress() || total == 0 {
        return 0.0;
    }
    (state.remaining_ms as f64 / total as f64).clamp(0.0, 1.0)
}

/// Vertical translation of the wipe panel for a screen `height` tall.
///
/// `0` means the panel covers the screen; `height` means it is off screen.
/// Meant for front ends that slide a panel; the terminal bar draws cells
/// from [`wipe_fraction`] instead.
pub fn wipe_offset(state: &TimerState, height: f64) -> f64 {
    height * (1.0 - wipe_fraction(state))
}

/// Piecewise-linear interpolation through three points, clamped at both ends.
pub fn interpolate3(x: f64, input: [f64; 3], output: [f64; 3]) -> f64 {
    let segment = |x0: f64, x1: f64, y0: f64, y1: f64| {
        if x == x1 || x1 == x0 {
            y1
        } else {
            y0 + (x - x0) * (y1 - y0) / (x1 - x0)
        }
    };
    if x <= input[0] {
        output[0]
    } else if x <= input[1] {
        segment(input[0], input[1], output[0], output[1])
    } else if x <= input[2] {
        segment(input[1], input[2], output[1], output[2])
    } else {
        output[2]
    }
}

// ============================================================================
// Picker
// ============================================================================

/// Horizontal geometry of the duration picker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickerLayout {
    /// Width of one picker item
    pub item_size: f64,
    /// Padding on each side so the first and last items can be centered
    pub item_spacing: f64,
}

impl PickerLayout {
    /// Layout for a screen `width` wide.
    pub fn for_width(width: f64) -> Self {
        let item_size = width * ITEM_WIDTH_RATIO;
        Self {
            item_size,
            item_spacing: (width - item_size) / 2.0,
        }
    }

    /// Scroll offset that centers item `index`.
    pub fn offset_for(&self, index: usize) -> f64 {
        index as f64 * self.item_size
    }

    /// Style of item `index` at scroll offset `scroll_x`.
    pub fn item_style(&self, index: usize, scroll_x: f64) -> ItemStyle {
        let center = self.offset_for(index);
        let input = [center - self.item_size, center, center + self.item_size];
        ItemStyle {
            opacity: interpolate3(scroll_x, input, [SIDE_ITEM_OPACITY, 1.0, SIDE_ITEM_OPACITY]),
            scale: interpolate3(scroll_x, input, [SIDE_ITEM_SCALE, 1.0, SIDE_ITEM_SCALE]),
        }
    }
}

/// Visual emphasis of one picker item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemStyle {
    pub opacity: f64,
    pub scale: f64,
}

// ============================================================================
// Frame
// ============================================================================

/// Everything a front end needs to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Digits to show
    pub digits: String,
    /// Fraction of the screen covered by the wipe panel
    pub wipe: f64,
    /// Whether the countdown digits are visible
    pub show_digits: bool,
    /// Whether the picker and start button are visible
    pub show_controls: bool,
    /// Whether the countdown is paused
    pub paused: bool,
}

impl Frame {
    /// Builds a frame from a snapshot and the selected preset.
    ///
    /// Outside a countdown the screen reverts to the picker, showing the
    /// selected duration.
    pub fn new(state: &TimerState, selected_seconds: u32) -> Self {
        let in_progress = state.phase.is_in_progress();
        let seconds = if in_progress {
            state.remaining_seconds()
        } else {
            selected_seconds
        };
        Self {
            digits: format_time(seconds),
            wipe: wipe_fraction(state),
            show_digits: in_progress,
            show_controls: !in_progress,
            paused: state.is_paused(),
        }
    }
}
