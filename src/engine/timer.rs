//! Timer engine for the countdown.
//!
//! This module provides the countdown state machine:
//! - State transitions (Idle → Running ⇄ Paused → Completed → Idle)
//! - Wall-clock anchored remaining time (derived from a deadline, never decremented)
//! - Event firing for the presentation layer
//! - Ownership of the single outstanding tick schedule

use tokio::sync::mpsc;

use crate::types::{whole_seconds, TimerPhase, TimerState, MILLIS_PER_SECOND};

use super::clock::Clock;
use super::error::TimerError;

/// Longest countdown the engine accepts, in seconds (24 hours).
pub const MAX_DURATION_SECONDS: u32 = 24 * 60 * 60;

// ============================================================================
// TimerEvent
// ============================================================================

/// Timer events for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// A countdown started (or replaced the previous one)
    Started {
        /// Countdown length
        duration_seconds: u32,
    },
    /// The displayed whole-second value changed
    Tick {
        /// Remaining seconds, rounded up
        remaining_seconds: u32,
    },
    /// Countdown was paused or resumed
    PausedChanged {
        /// Whether the countdown is now paused
        is_paused: bool,
    },
    /// Countdown reached zero
    Completed,
    /// Timer returned to idle
    Reset {
        /// Duration shown after the reset
        duration_seconds: u32,
    },
}

// ============================================================================
// CountdownDuration
// ============================================================================

/// A validated countdown length in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CountdownDuration(u32);

impl CountdownDuration {
    /// Validates a whole-second duration.
    ///
    /// # Errors
    ///
    /// Returns an error if `seconds` is zero or above [`MAX_DURATION_SECONDS`].
    pub fn from_secs(seconds: u32) -> Result<Self, TimerError> {
        Self::from_secs_f64(f64::from(seconds))
    }

    /// Validates a duration requested as a floating point number of seconds.
    ///
    /// # Errors
    ///
    /// Returns an error if `seconds` is NaN, infinite, not positive,
    /// fractional, or above [`MAX_DURATION_SECONDS`].
    pub fn from_secs_f64(seconds: f64) -> Result<Self, TimerError> {
        if !seconds.is_finite() {
            return Err(TimerError::NonFiniteDuration(seconds));
        }
        if seconds <= 0.0 {
            return Err(TimerError::NonPositiveDuration(seconds));
        }
        if seconds.fract() != 0.0 {
            return Err(TimerError::FractionalDuration(seconds));
        }
        if seconds > f64::from(MAX_DURATION_SECONDS) {
            return Err(TimerError::DurationTooLong {
                seconds,
                max: MAX_DURATION_SECONDS,
            });
        }
        // Finite, integral and within u32 range after the checks above.
        Ok(Self(seconds as u32))
    }

    /// Returns the duration in seconds.
    pub fn as_secs(self) -> u32 {
        self.0
    }

    /// Returns the duration in milliseconds.
    pub fn as_millis(self) -> u64 {
        u64::from(self.0) * MILLIS_PER_SECOND
    }
}

impl TryFrom<u32> for CountdownDuration {
    type Error = TimerError;

    fn try_from(seconds: u32) -> Result<Self, Self::Error> {
        Self::from_secs(seconds)
    }
}

impl TryFrom<f64> for CountdownDuration {
    type Error = TimerError;

    fn try_from(seconds: f64) -> Result<Self, Self::Error> {
        Self::from_secs_f64(seconds)
    }
}

// ============================================================================
// Transition / TickSchedule
// ============================================================================

/// Outcome of an intent that is only valid in some phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Transition {
    /// The intent changed the state
    Applied,
    /// The intent had no effect in the given phase
    Ignored {
        /// Phase the engine was in
        from: TimerPhase,
    },
}

impl Transition {
    /// Returns true if the intent changed the state.
    pub fn is_applied(self) -> bool {
        self == Transition::Applied
    }
}

/// Handle of the active periodic recomputation.
///
/// Each schedule carries a generation number; a completion signal armed for
/// an older generation is recognised as stale and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickSchedule {
    generation: u64,
}

impl TickSchedule {
    /// Returns the generation number.
    pub fn generation(self) -> u64 {
        self.generation
    }
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Countdown state machine.
///
/// All methods are expected to run on one control thread; the engine does
/// no scheduling of its own. A driver calls [`tick`](Self::tick) while
/// [`schedule`](Self::schedule) is `Some` and forwards deadline wakeups to
/// [`on_deadline`](Self::on_deadline).
pub struct TimerEngine<C: Clock> {
    /// Time source
    clock: C,
    /// Current timer state
    state: TimerState,
    /// Active tick schedule, if any
    schedule: Option<TickSchedule>,
    /// Generation handed to the next schedule
    next_generation: u64,
    /// Whole-second value of the last Tick (or Started/Resumed) shown
    last_shown_seconds: Option<u32>,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<TimerEvent>,
}

impl<C: Clock> TimerEngine<C> {
    /// Creates an idle engine reading `clock` and emitting on `event_tx`.
    pub fn new(clock: C, event_tx: mpsc::UnboundedSender<TimerEvent>) -> Self {
        Self {
            clock,
            state: TimerState::new(),
            schedule: None,
            next_generation: 0,
            last_shown_seconds: None,
            event_tx,
        }
    }

    /// Starts a countdown, replacing any countdown in progress.
    ///
    /// # Errors
    ///
    /// Returns an error if `duration_seconds` is not a valid duration; the
    /// state is left untouched in that case.
    pub fn start(&mut self, duration_seconds: f64) -> Result<(), TimerError> {
        let duration = CountdownDuration::from_secs_f64(duration_seconds)?;
        self.start_with(duration);
        Ok(())
    }

    /// Starts a countdown of an already validated duration.
    pub fn start_with(&mut self, duration: CountdownDuration) {
        if self.state.phase.is_in_progress() {
            tracing::debug!(phase = %self.state.phase, "replacing countdown in progress");
        }
        self.cancel_schedule();

        let now = self.clock.now_ms();
        self.state.begin(duration.as_secs(), now);
        self.last_shown_seconds = Some(duration.as_secs());
        self.establish_schedule();

        tracing::debug!(
            duration_seconds = duration.as_secs(),
            deadline_ms = ?self.state.deadline_ms,
            "countdown started"
        );
        self.emit(TimerEvent::Started {
            duration_seconds: duration.as_secs(),
        });
    }

    /// Pauses a running countdown.
    ///
    /// If the deadline has already passed the countdown completes instead.
    pub fn pause(&mut self) -> Transition {
        if !self.state.is_running() {
            return self.ignored("pause");
        }

        let now = self.clock.now_ms();
        if self.state.recompute(now) == 0 {
            self.complete();
            return Transition::Applied;
        }

        self.cancel_schedule();
        self.state.pause_at(now);
        self.last_shown_seconds = Some(self.state.remaining_seconds());

        tracing::debug!(remaining_ms = self.state.remaining_ms, "countdown paused");
        self.emit(TimerEvent::PausedChanged { is_paused: true });
        Transition::Applied
    }

    /// Resumes a paused countdown.
    pub fn resume(&mut self) -> Transition {
        if !self.state.is_paused() {
            return self.ignored("resume");
        }

        let now = self.clock.now_ms();
        self.state.resume_at(now);
        self.establish_schedule();

        tracing::debug!(deadline_ms = ?self.state.deadline_ms, "countdown resumed");
        self.emit(TimerEvent::PausedChanged { is_paused: false });
        Transition::Applied
    }

    /// Pauses a running countdown or resumes a paused one.
    pub fn toggle_pause(&mut self) -> Transition {
        match self.state.phase {
            TimerPhase::Running => self.pause(),
            TimerPhase::Paused => self.resume(),
            _ => self.ignored("toggle_pause"),
        }
    }

    /// Returns to idle, showing `duration_seconds` on the display.
    ///
    /// # Errors
    ///
    /// Returns an error if `duration_seconds` is not a valid duration; the
    /// state is left untouched in that case.
    pub fn reset(&mut self, duration_seconds: f64) -> Result<(), TimerError> {
        let duration = CountdownDuration::from_secs_f64(duration_seconds)?;
        self.reset_with(duration);
        Ok(())
    }

    /// Returns to idle with an already validated duration.
    pub fn reset_with(&mut self, duration: CountdownDuration) {
        self.cancel_schedule();
        self.state.reset(duration.as_secs());
        self.last_shown_seconds = None;

        tracing::debug!(duration_seconds = duration.as_secs(), "timer reset");
        self.emit(TimerEvent::Reset {
            duration_seconds: duration.as_secs(),
        });
    }

    /// Recomputes the remaining time from the deadline.
    ///
    /// Completes the countdown when the deadline has been reached; otherwise
    /// emits a Tick only if the whole-second value changed.
    pub fn tick(&mut self) {
        if !self.state.is_running() {
            tracing::trace!(phase = %self.state.phase, "tick ignored");
            return;
        }

        let now = self.clock.now_ms();
        if self.state.recompute(now) == 0 {
            self.complete();
            return;
        }

        let remaining_seconds = self.state.remaining_seconds();
        if self.last_shown_seconds != Some(remaining_seconds) {
            self.last_shown_seconds = Some(remaining_seconds);
            tracing::trace!(remaining_seconds, "display changed");
            self.emit(TimerEvent::Tick { remaining_seconds });
        }
    }

    /// Handles the absolute-deadline signal armed for `schedule`.
    ///
    /// Signals for a cancelled or replaced schedule are dropped. A current
    /// signal goes through the same path as [`tick`](Self::tick), so a
    /// countdown completes once no matter which of the two observes zero first.
    pub fn on_deadline(&mut self, schedule: TickSchedule) {
        if self.schedule != Some(schedule) {
            tracing::trace!(
                generation = schedule.generation,
                "stale deadline signal dropped"
            );
            return;
        }
        self.tick();
    }

    /// Cancels any outstanding schedule. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        if self.schedule.is_some() {
            tracing::debug!("cancelling tick schedule on shutdown");
        }
        self.cancel_schedule();
    }

    /// Returns a reference to the current timer state.
    pub fn state(&self) -> &TimerState {
        &self.state
    }

    /// Returns the active tick schedule, present only while running.
    pub fn schedule(&self) -> Option<TickSchedule> {
        self.schedule
    }

    /// Returns true if the countdown is running.
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Milliseconds until the deadline, or `None` unless running.
    pub fn time_until_deadline_ms(&self) -> Option<u64> {
        let now = self.clock.now_ms();
        self.state
            .deadline_ms
            .map(|deadline| deadline.saturating_sub(now))
    }

    /// Whole-second value most recently presented to the display.
    pub fn shown_seconds(&self) -> u32 {
        self.last_shown_seconds
            .unwrap_or_else(|| whole_seconds(self.state.remaining_ms))
    }

    fn complete(&mut self) {
        if !self.state.is_running() {
            return;
        }
        self.cancel_schedule();
        self.state.complete();
        self.last_shown_seconds = Some(0);

        tracing::debug!(
            duration_seconds = self.state.total_duration_seconds,
            "countdown completed"
        );
        self.emit(TimerEvent::Completed);
    }

    fn establish_schedule(&mut self) {
        debug_assert!(self.schedule.is_none(), "previous schedule not cancelled");
        self.schedule = Some(TickSchedule {
            generation: self.next_generation,
        });
        self.next_generation += 1;
    }

    fn cancel_schedule(&mut self) {
        if let Some(schedule) = self.schedule.take() {
            tracing::trace!(generation = schedule.generation, "tick schedule cancelled");
        }
    }

    fn ignored(&self, intent: &'static str) -> Transition {
        tracing::trace!(intent, phase = %self.state.phase, "transition ignored");
        Transition::Ignored {
            from: self.state.phase,
        }
    }

    fn emit(&self, event: TimerEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::warn!("timer event receiver dropped");
        }
    }
}

impl<C: Clock> Drop for TimerEngine<C> {
    fn drop(&mut self) {
        self.cancel_schedule();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::clock::ManualClock;

    fn create_engine() -> (
        TimerEngine<ManualClock>,
        ManualClock,
        mpsc::UnboundedReceiver<TimerEvent>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let clock = ManualClock::new();
        let engine = TimerEngine::new(clock.clone(), tx);
        (engine, clock, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<TimerEvent>) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    // ------------------------------------------------------------------------
    // CountdownDuration Tests
    // ------------------------------------------------------------------------

    mod countdown_duration_tests {
        use super::*;

        #[test]
        fn test_accepts_whole_positive_seconds() {
            let duration = CountdownDuration::from_secs_f64(90.0).unwrap();
            assert_eq!(duration.as_secs(), 90);
            assert_eq!(duration.as_millis(), 90_000);
        }

        #[test]
        fn test_rejects_nan_and_infinity() {
            assert!(matches!(
                CountdownDuration::from_secs_f64(f64::NAN),
                Err(TimerError::NonFiniteDuration(_))
            ));
            assert!(matches!(
                CountdownDuration::from_secs_f64(f64::INFINITY),
                Err(TimerError::NonFiniteDuration(_))
            ));
        }

        #[test]
        fn test_rejects_non_positive() {
            assert_eq!(
                CountdownDuration::from_secs_f64(-5.0),
                Err(TimerError::NonPositiveDuration(-5.0))
            );
            assert_eq!(
                CountdownDuration::from_secs(0),
                Err(TimerError::NonPositiveDuration(0.0))
            );
        }

        #[test]
        fn test_rejects_fractional() {
            assert_eq!(
                CountdownDuration::from_secs_f64(1.5),
                Err(TimerError::FractionalDuration(1.5))
            );
        }

        #[test]
        fn test_rejects_above_ceiling() {
            assert!(CountdownDuration::from_secs(MAX_DURATION_SECONDS).is_ok());
            assert!(matches!(
                CountdownDuration::from_secs(MAX_DURATION_SECONDS + 1),
                Err(TimerError::DurationTooLong { .. })
            ));
        }

        #[test]
        fn test_try_from() {
            let duration: CountdownDuration = 30u32.try_into().unwrap();
            assert_eq!(duration.as_secs(), 30);
            assert!(CountdownDuration::try_from(-1.0).is_err());
        }
    }

    // ------------------------------------------------------------------------
    // TimerEngine Tests
    // ------------------------------------------------------------------------

    mod timer_engine_tests {
        use super::*;

        #[test]
        fn test_new_engine() {
            let (engine, _clock, _rx) = create_engine();
            let state = engine.state();

            assert_eq!(state.phase, TimerPhase::Idle);
            assert_eq!(state.remaining_ms, 0);
            assert!(engine.schedule().is_none());
        }

        #[test]
        fn test_start() {
            let (mut engine, clock, mut rx) = create_engine();
            clock.set(5_000);

            engine.start(60.0).unwrap();

            let state = engine.state();
            assert_eq!(state.phase, TimerPhase::Running);
            assert_eq!(state.total_duration_seconds, 60);
            assert_eq!(state.remaining_ms, 60_000);
            assert_eq!(state.deadline_ms, Some(65_000));
            assert!(engine.schedule().is_some());

            assert_eq!(
                rx.try_recv().unwrap(),
                TimerEvent::Started {
                    duration_seconds: 60
                }
            );
        }

        #[test]
        fn test_start_rejects_invalid_duration_without_mutation() {
            let (mut engine, clock, mut rx) = create_engine();
            engine.start(30.0).unwrap();
            clock.advance(1_000);
            let _ = drain(&mut rx);
            let before = engine.state().clone();
            let schedule = engine.schedule();

            assert!(engine.start(-5.0).unwrap_err().is_invalid_duration());
            assert!(engine.start(f64::NAN).unwrap_err().is_invalid_duration());

            assert_eq!(engine.state(), &before);
            assert_eq!(engine.schedule(), schedule);
            assert!(drain(&mut rx).is_empty());
        }

        #[test]
        fn test_restart_replaces_schedule() {
            let (mut engine, _clock, _rx) = create_engine();

            engine.start(10.0).unwrap();
            let first = engine.schedule().unwrap();
            engine.start(20.0).unwrap();
            let second = engine.schedule().unwrap();

            assert_ne!(first, second);
            assert_eq!(engine.state().total_duration_seconds, 20);
        }

        #[test]
        fn test_tick_emits_only_on_whole_second_change() {
            let (mut engine, clock, mut rx) = create_engine();
            engine.start(3.0).unwrap();
            let _ = drain(&mut rx);

            for _ in 0..19 {
                clock.advance(50);
                engine.tick();
            }
            // 950ms elapsed, still showing 3
            assert!(drain(&mut rx).is_empty());

            clock.advance(50);
            engine.tick();
            assert_eq!(
                drain(&mut rx),
                vec![TimerEvent::Tick {
                    remaining_seconds: 2
                }]
            );
        }

        #[test]
        fn test_tick_completes_at_deadline() {
            let (mut engine, clock, mut rx) = create_engine();
            engine.start(1.0).unwrap();
            let _ = drain(&mut rx);

            clock.advance(1_000);
            engine.tick();

            assert_eq!(engine.state().phase, TimerPhase::Completed);
            assert_eq!(engine.state().remaining_ms, 0);
            assert!(engine.state().deadline_ms.is_none());
            assert!(engine.schedule().is_none());
            assert_eq!(drain(&mut rx), vec![TimerEvent::Completed]);
        }

        #[test]
        fn test_tick_after_completion_is_ignored() {
            let (mut engine, clock, mut rx) = create_engine();
            engine.start(1.0).unwrap();
            clock.advance(5_000);
            engine.tick();
            let _ = drain(&mut rx);

            engine.tick();
            engine.tick();
            assert!(drain(&mut rx).is_empty());
        }

        #[test]
        fn test_pause() {
            let (mut engine, clock, mut rx) = create_engine();
            engine.start(60.0).unwrap();
            let _ = drain(&mut rx);

            clock.advance(10_000);
            assert!(engine.pause().is_applied());

            let state = engine.state();
            assert_eq!(state.phase, TimerPhase::Paused);
            assert_eq!(state.remaining_ms, 50_000);
            assert!(state.deadline_ms.is_none());
            assert!(engine.schedule().is_none());
            assert_eq!(
                drain(&mut rx),
                vec![TimerEvent::PausedChanged { is_paused: true }]
            );
        }

        #[test]
        fn test_pause_past_deadline_completes() {
            let (mut engine, clock, mut rx) = create_engine();
            engine.start(1.0).unwrap();
            let _ = drain(&mut rx);

            clock.advance(2_000);
            assert!(engine.pause().is_applied());

            assert_eq!(engine.state().phase, TimerPhase::Completed);
            assert_eq!(drain(&mut rx), vec![TimerEvent::Completed]);
        }

        #[test]
        fn test_pause_when_idle_is_ignored() {
            let (mut engine, _clock, mut rx) = create_engine();
            let before = engine.state().clone();

            assert_eq!(
                engine.pause(),
                Transition::Ignored {
                    from: TimerPhase::Idle
                }
            );
            assert_eq!(engine.state(), &before);
            assert!(drain(&mut rx).is_empty());
        }

        #[test]
        fn test_resume() {
            let (mut engine, clock, mut rx) = create_engine();
            engine.start(60.0).unwrap();
            clock.advance(10_000);
            let _ = engine.pause();
            let _ = drain(&mut rx);

            clock.advance(30_000);
            assert!(engine.resume().is_applied());

            let state = engine.state();
            assert_eq!(state.phase, TimerPhase::Running);
            assert_eq!(state.remaining_ms, 50_000);
            assert_eq!(state.deadline_ms, Some(90_000));
            assert!(engine.schedule().is_some());
            assert_eq!(
                drain(&mut rx),
                vec![TimerEvent::PausedChanged { is_paused: false }]
            );
        }

        #[test]
        fn test_resume_when_running_is_ignored() {
            let (mut engine, _clock, _rx) = create_engine();
            engine.start(60.0).unwrap();
            let before = engine.state().clone();

            assert_eq!(
                engine.resume(),
                Transition::Ignored {
                    from: TimerPhase::Running
                }
            );
            assert_eq!(engine.state(), &before);
        }

        #[test]
        fn test_toggle_pause() {
            let (mut engine, _clock, _rx) = create_engine();

            assert!(!engine.toggle_pause().is_applied());

            engine.start(60.0).unwrap();
            assert!(engine.toggle_pause().is_applied());
            assert_eq!(engine.state().phase, TimerPhase::Paused);
            assert!(engine.toggle_pause().is_applied());
            assert_eq!(engine.state().phase, TimerPhase::Running);
        }

        #[test]
        fn test_reset_from_running() {
            let (mut engine, clock, mut rx) = create_engine();
            engine.start(60.0).unwrap();
            clock.advance(3_000);
            let _ = drain(&mut rx);

            engine.reset(30.0).unwrap();

            let state = engine.state();
            assert_eq!(state.phase, TimerPhase::Idle);
            assert_eq!(state.remaining_ms, 30_000);
            assert!(state.deadline_ms.is_none());
            assert!(engine.schedule().is_none());
            assert_eq!(
                drain(&mut rx),
                vec![TimerEvent::Reset {
                    duration_seconds: 30
                }]
            );
        }

        #[test]
        fn test_reset_rejects_invalid_duration() {
            let (mut engine, _clock, _rx) = create_engine();
            engine.start(60.0).unwrap();
            let before = engine.state().clone();

            assert!(engine.reset(0.0).is_err());
            assert_eq!(engine.state(), &before);
            assert!(engine.schedule().is_some());
        }

        #[test]
        fn test_on_deadline_completes_once() {
            let (mut engine, clock, mut rx) = create_engine();
            engine.start(1.0).unwrap();
            let schedule = engine.schedule().unwrap();
            let _ = drain(&mut rx);

            clock.advance(1_000);
            engine.on_deadline(schedule);
            engine.tick();
            engine.on_deadline(schedule);

            assert_eq!(drain(&mut rx), vec![TimerEvent::Completed]);
        }

        #[test]
        fn test_stale_deadline_signal_is_dropped() {
            let (mut engine, clock, mut rx) = create_engine();
            engine.start(1.0).unwrap();
            let stale = engine.schedule().unwrap();
            engine.start(10.0).unwrap();
            let _ = drain(&mut rx);

            clock.advance(1_000);
            engine.on_deadline(stale);

            assert_eq!(engine.state().phase, TimerPhase::Running);
            assert!(drain(&mut rx).is_empty());
        }

        #[test]
        fn test_shutdown_is_idempotent() {
            let (mut engine, _clock, _rx) = create_engine();
            engine.start(10.0).unwrap();

            engine.shutdown();
            assert!(engine.schedule().is_none());
            engine.shutdown();
            assert!(engine.schedule().is_none());
        }

        #[test]
        fn test_time_until_deadline() {
            let (mut engine, clock, _rx) = create_engine();
            assert_eq!(engine.time_until_deadline_ms(), None);

            engine.start(10.0).unwrap();
            clock.advance(2_500);
            assert_eq!(engine.time_until_deadline_ms(), Some(7_500));
        }

        #[test]
        fn test_dropped_receiver_does_not_fail_operations() {
            let (mut engine, clock, rx) = create_engine();
            drop(rx);

            engine.start(1.0).unwrap();
            clock.advance(1_000);
            engine.tick();
            assert_eq!(engine.state().phase, TimerPhase::Completed);
        }
    }
}
