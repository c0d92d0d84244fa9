//! Time sources for the timer engine.
//!
//! The engine never counts ticks; it reads a clock and derives remaining
//! time from an absolute deadline. Readings are milliseconds since an
//! arbitrary origin and must never go backwards.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::time::Instant;

/// A monotonic millisecond clock.
pub trait Clock {
    /// Returns the current reading in milliseconds.
    fn now_ms(&self) -> u64;
}

/// Clock backed by [`tokio::time::Instant`].
///
/// Follows tokio's paused time in tests, so a driver under
/// `#[tokio::test(start_paused = true)]` sees virtual time.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Creates a clock whose origin is the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Manually advanced clock for testing.
///
/// Clones share the same reading, so a test can keep one copy and hand
/// another to the engine.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock reading zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward by `ms`.
    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    /// Sets the reading. Callers must not move it backwards.
    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
