//! Core data types for the countdown timer.
//!
//! This module defines the data structures used for:
//! - The countdown phase machine
//! - The timer state snapshot shared with the presentation layer

use serde::{Deserialize, Serialize};

/// Milliseconds per second.
pub const MILLIS_PER_SECOND: u64 = 1000;

// ============================================================================
// TimerPhase
// ============================================================================

/// Represents the current phase of the countdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    /// No countdown has started since the last reset
    #[default]
    Idle,
    /// Counting down towards the deadline
    Running,
    /// Countdown is frozen with time remaining
    Paused,
    /// Countdown reached zero
    Completed,
}

impl TimerPhase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerPhase::Idle => "idle",
            TimerPhase::Running => "running",
            TimerPhase::Paused => "paused",
            TimerPhase::Completed => "completed",
        }
    }

    /// Returns true if a countdown is in progress (running or paused).
    pub fn is_in_progress(&self) -> bool {
        matches!(self, TimerPhase::Running | TimerPhase::Paused)
    }
}

impl std::fmt::Display for TimerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// TimerState
// ============================================================================

/// Snapshot of the countdown state.
///
/// `remaining_ms` never exceeds `total_duration_seconds * 1000`, and
/// `deadline_ms` is present exactly while the phase is [`TimerPhase::Running`].
/// Timestamps are milliseconds on the engine clock.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    /// Current phase of the countdown
    pub phase: TimerPhase,
    /// Duration of the current countdown in seconds
    pub total_duration_seconds: u32,
    /// Remaining time in milliseconds
    pub remaining_ms: u64,
    /// Absolute clock reading at which the countdown reaches zero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_ms: Option<u64>,
}

impl TimerState {
    /// Creates a new TimerState in the idle phase with no duration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a countdown of `duration_seconds` anchored at `now_ms`.
    pub fn begin(&mut self, duration_seconds: u32, now_ms: u64) {
        let total_ms = u64::from(duration_seconds) * MILLIS_PER_SECOND;
        self.phase = TimerPhase::Running;
        self.total_duration_seconds = duration_seconds;
        self.remaining_ms = total_ms;
        self.deadline_ms = Some(now_ms.saturating_add(total_ms));
    }

    /// Freezes the countdown at the time remaining as of `now_ms`.
    ///
    /// Only works if the countdown is running.
    pub fn pause_at(&mut self, now_ms: u64) {
        if self.phase == TimerPhase::Running {
            self.recompute(now_ms);
            self.phase = TimerPhase::Paused;
            self.deadline_ms = None;
        }
    }

    /// Re-anchors a paused countdown so it ends `remaining_ms` after `now_ms`.
    pub fn resume_at(&mut self, now_ms: u64) {
        if self.phase == TimerPhase::Paused {
            self.phase = TimerPhase::Running;
            self.deadline_ms = Some(now_ms.saturating_add(self.remaining_ms));
        }
    }

    /// Returns to idle with a full `duration_seconds` on the display.
    pub fn reset(&mut self, duration_seconds: u32) {
        self.phase = TimerPhase::Idle;
        self.total_duration_seconds = duration_seconds;
        self.remaining_ms = u64::from(duration_seconds) * MILLIS_PER_SECOND;
        self.deadline_ms = None;
    }

    /// Marks the countdown as finished.
    pub fn complete(&mut self) {
        self.phase = TimerPhase::Completed;
        self.remaining_ms = 0;
        self.deadline_ms = None;
    }

    /// Derives the remaining time from the deadline and `now_ms`.
    ///
    /// Returns the updated remaining milliseconds. Has no effect unless a
    /// deadline is set.
    pub fn recompute(&mut self, now_ms: u64) -> u64 {
        if let Some(deadline) = self.deadline_ms {
            self.remaining_ms = deadline.saturating_sub(now_ms);
        }
        self.remaining_ms
    }

    /// Remaining time as whole seconds, rounded up.
    ///
    /// A countdown with 59.001s left shows `60`; it only shows `0` once the
    /// deadline has been reached.
    pub fn remaining_seconds(&self) -> u32 {
        whole_seconds(self.remaining_ms)
    }

    /// Total countdown time in milliseconds.
    pub fn total_ms(&self) -> u64 {
        u64::from(self.total_duration_seconds) * MILLIS_PER_SECOND
    }

    /// Time spent running so far, in milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.total_ms().saturating_sub(self.remaining_ms)
    }

    /// Returns true if the countdown is running.
    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    /// Returns true if the countdown is paused.
    pub fn is_paused(&self) -> bool {
        self.phase == TimerPhase::Paused
    }
}

/// Converts milliseconds to whole seconds, rounding up.
pub fn whole_seconds(ms: u64) -> u32 {
    u32::try_from(ms.div_ceil(MILLIS_PER_SECOND)).unwrap_or(u32::MAX)
}

// ============================================================================
// Tests
// ============================================================================
