//! Timer engine error types.
//!
//! Only malformed input is an error. Requests that have no effect in the
//! current phase are reported as [`Transition::Ignored`](super::Transition)
//! instead, since they are ordinary UI races such as rapid double taps.

use thiserror::Error;

/// Errors reported by the timer engine and duration selector.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TimerError {
    /// Duration is NaN or infinite.
    #[error("duration must be a finite number of seconds, got {0}")]
    NonFiniteDuration(f64),

    /// Duration is zero or negative.
    #[error("duration must be positive, got {0}")]
    NonPositiveDuration(f64),

    /// Duration has a fractional part.
    #[error("duration must be a whole number of seconds, got {0}")]
    FractionalDuration(f64),

    /// Duration exceeds the supported ceiling.
    #[error("duration of {seconds}s exceeds the maximum of {max}s")]
    DurationTooLong {
        /// Requested duration
        seconds: f64,
        /// Largest accepted duration
        max: u32,
    },

    /// A duration set was built without any entries.
    #[error("duration set must contain at least one duration")]
    EmptyDurationSet,

    /// A duration set contains a zero entry.
    #[error("duration at index {index} must be positive")]
    ZeroDuration {
        /// Position of the offending entry
        index: usize,
    },

    /// A duration set contains an entry above the supported ceiling.
    #[error("duration at index {index} ({seconds}s) exceeds the maximum of {max}s")]
    PresetTooLong {
        /// Position of the offending entry
        index: usize,
        /// Offending duration
        seconds: u32,
        /// Largest accepted duration
        max: u32,
    },
}

impl TimerError {
    /// Returns true if this error was caused by a malformed duration request.
    #[must_use]
    pub fn is_invalid_duration(&self) -> bool {
        matches!(
            self,
            Self::NonFiniteDuration(_)
                | Self::NonPositiveDuration(_)
                | Self::FractionalDuration(_)
                | Self::DurationTooLong { .. }
        )
    }

    /// Returns true if this error was caused by a malformed duration set.
    #[must_use]
    pub fn is_invalid_duration_set(&self) -> bool {
        matches!(
            self,
            Self::EmptyDurationSet | Self::ZeroDuration { .. } | Self::PresetTooLong { .. }
        )
    }
}
