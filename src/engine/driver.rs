//! Async driver that runs a [`TimerEngine`] on a single control task.
//!
//! The driver owns the engine outright. Intents arrive on a channel and
//! are applied between ticks, so they never interleave with a
//! recomputation. While the countdown runs, two wakeups are armed:
//!
//! - a fixed-cadence ticker that refreshes the display
//! - a sleep until the absolute deadline
//!
//! Both funnel into the engine's single completion path.

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::types::TimerState;

use super::clock::Clock;
use super::error::TimerError;
use super::timer::{CountdownDuration, TimerEngine};

/// Default display refresh cadence in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 50;

// ============================================================================
// TimerCommand
// ============================================================================

/// Intents accepted by the driver.
#[derive(Debug)]
pub enum TimerCommand {
    /// Start (or restart) a countdown
    Start(CountdownDuration),
    /// Pause a running countdown
    Pause,
    /// Resume a paused countdown
    Resume,
    /// Pause if running, resume if paused
    TogglePause,
    /// Return to idle
    Reset(CountdownDuration),
    /// Reply with the state once every earlier intent has been applied
    Sync(oneshot::Sender<TimerState>),
    /// Stop the driver
    Shutdown,
}

/// Errors reported by a [`TimerHandle`].
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum DriverError {
    /// The requested duration was rejected
    #[error(transparent)]
    Timer(#[from] TimerError),

    /// The driver task is no longer running
    #[error("timer driver has stopped")]
    Stopped,
}

// ============================================================================
// TimerHandle
// ============================================================================

/// Cloneable handle for sending intents to a running driver.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    commands: mpsc::UnboundedSender<TimerCommand>,
    snapshot: watch::Receiver<TimerState>,
}

impl TimerHandle {
    /// Starts a countdown of `duration_seconds`.
    ///
    /// # Errors
    ///
    /// Returns an error if the duration is invalid or the driver stopped.
    pub fn start(&self, duration_seconds: f64) -> Result<(), DriverError> {
        let duration = CountdownDuration::from_secs_f64(duration_seconds)?;
        self.send(TimerCommand::Start(duration))
    }

    /// Pauses the countdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver stopped.
    pub fn pause(&self) -> Result<(), DriverError> {
        self.send(TimerCommand::Pause)
    }

    /// Resumes the countdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver stopped.
    pub fn resume(&self) -> Result<(), DriverError> {
        self.send(TimerCommand::Resume)
    }

    /// Toggles between paused and running.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver stopped.
    pub fn toggle_pause(&self) -> Result<(), DriverError> {
        self.send(TimerCommand::TogglePause)
    }

    /// Returns to idle showing `duration_seconds`.
    ///
    /// # Errors
    ///
    /// Returns an error if the duration is invalid or the driver stopped.
    pub fn reset(&self, duration_seconds: f64) -> Result<(), DriverError> {
        let duration = CountdownDuration::from_secs_f64(duration_seconds)?;
        self.send(TimerCommand::Reset(duration))
    }

    /// Asks the driver to stop.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver already stopped.
    pub fn shutdown(&self) -> Result<(), DriverError> {
        self.send(TimerCommand::Shutdown)
    }

    /// Waits until the driver has applied every intent sent so far and
    /// returns the resulting state.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver stopped.
    pub async fn sync(&self) -> Result<TimerState, DriverError> {
        let (reply, state) = oneshot::channel();
        self.send(TimerCommand::Sync(reply))?;
        state.await.map_err(|_| DriverError::Stopped)
    }

    /// Returns the most recently published state.
    pub fn snapshot(&self) -> TimerState {
        self.snapshot.borrow().clone()
    }

    /// Returns a receiver that observes every published state.
    pub fn subscribe(&self) -> watch::Receiver<TimerState> {
        self.snapshot.clone()
    }

    fn send(&self, command: TimerCommand) -> Result<(), DriverError> {
        self.commands
            .send(command)
            .map_err(|_| DriverError::Stopped)
    }
}

// ============================================================================
// TimerDriver
// ============================================================================

/// Control task that owns a [`TimerEngine`].
pub struct TimerDriver<C: Clock> {
    engine: TimerEngine<C>,
    commands: mpsc::UnboundedReceiver<TimerCommand>,
    snapshot_tx: watch::Sender<TimerState>,
    tick_interval: Duration,
}

impl<C: Clock> TimerDriver<C> {
    /// Wraps `engine` and returns the driver with a handle to control it.
    pub fn new(engine: TimerEngine<C>, tick_interval: Duration) -> (Self, TimerHandle) {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot) = watch::channel(engine.state().clone());

        let driver = Self {
            engine,
            commands,
            snapshot_tx,
            tick_interval,
        };
        let handle = TimerHandle {
            commands: commands_tx,
            snapshot,
        };
        (driver, handle)
    }

    /// Runs until a `Shutdown` intent arrives or every handle is dropped.
    ///
    /// Returns the engine after its schedule has been cancelled.
    pub async fn run(mut self) -> TimerEngine<C> {
        let mut ticker = interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let schedule = self.engine.schedule();
            let until_deadline = self
                .engine
                .time_until_deadline_ms()
                .map(Duration::from_millis);

            tokio::select! {
                biased;

                command = self.commands.recv() => {
                    match command {
                        Some(TimerCommand::Shutdown) | None => break,
                        Some(command) => {
                            let restarts_ticker = self.apply(command);
                            if restarts_ticker {
                                ticker.reset();
                            }
                        }
                    }
                }
                _ = tokio::time::sleep(until_deadline.unwrap_or_default()),
                    if schedule.is_some() && until_deadline.is_some() =>
                {
                    if let Some(schedule) = schedule {
                        self.engine.on_deadline(schedule);
                    }
                }
                _ = ticker.tick(), if schedule.is_some() => {
                    self.engine.tick();
                }
            }

            self.publish();
        }

        tracing::debug!("timer driver stopping");
        self.engine.shutdown();
        self.publish();
        self.engine
    }

    /// Applies an intent. Returns true if a new schedule was established.
    fn apply(&mut self, command: TimerCommand) -> bool {
        tracing::trace!(?command, "applying intent");
        let before = self.engine.schedule();

        match command {
            TimerCommand::Start(duration) => self.engine.start_with(duration),
            TimerCommand::Pause => {
                let _ = self.engine.pause();
            }
            TimerCommand::Resume => {
                let _ = self.engine.resume();
            }
            TimerCommand::TogglePause => {
                let _ = self.engine.toggle_pause();
            }
            TimerCommand::Reset(duration) => self.engine.reset_with(duration),
            TimerCommand::Sync(reply) => {
                if reply.send(self.engine.state().clone()).is_err() {
                    tracing::trace!("sync requester went away");
                }
            }
            TimerCommand::Shutdown => self.engine.shutdown(),
        }

        let after = self.engine.schedule();
        after.is_some() && after != before
    }

    fn publish(&self) {
        let state = self.engine.state();
        self.snapshot_tx.send_if_modified(|current| {
            if current == state {
                false
            } else {
                *current = state.clone();
                true
            }
        });
    }
}

/// Spawns a driver for `engine` on the current runtime.
///
/// Returns the control handle and the join handle yielding the engine
/// once the driver stops.
pub fn spawn<C>(
    engine: TimerEngine<C>,
    tick_interval: Duration,
) -> (TimerHandle, tokio::task::JoinHandle<TimerEngine<C>>)
where
    C: Clock + Send + 'static,
{
    let (driver, handle) = TimerDriver::new(engine, tick_interval);
    let join = tokio::spawn(driver.run());
    (handle, join)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::clock::MonotonicClock;
    use crate::engine::timer::TimerEvent;
    use crate::types::TimerPhase;

    fn create_driver() -> (
        TimerHandle,
        tokio::task::JoinHandle<TimerEngine<MonotonicClock>>,
        mpsc::UnboundedReceiver<TimerEvent>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let engine = TimerEngine::new(MonotonicClock::new(), tx);
        let (handle, join) = spawn(engine, Duration::from_millis(DEFAULT_TICK_INTERVAL_MS));
        (handle, join, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_rejects_invalid_duration() {
        let (handle, _join, _rx) = create_driver();

        let err = handle.start(-5.0).unwrap_err();
        assert!(matches!(err, DriverError::Timer(TimerError::NonPositiveDuration(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_returns_engine_without_schedule() {
        let (handle, join, _rx) = create_driver();

        handle.start(30.0).unwrap();
        handle.shutdown().unwrap();
        let engine = join.await.unwrap();

        assert!(engine.schedule().is_none());
        assert_eq!(engine.state().phase, TimerPhase::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handles_stops_driver() {
        let (handle, join, _rx) = create_driver();
        drop(handle);

        let engine = join.await.unwrap();
        assert!(engine.schedule().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sync_sees_earlier_intents() {
        let (handle, _join, _rx) = create_driver();

        handle.start(30.0).unwrap();
        handle.pause().unwrap();
        let state = handle.sync().await.unwrap();
        assert_eq!(state.phase, TimerPhase::Paused);

        handle.reset(60.0).unwrap();
        let state = handle.sync().await.unwrap();
        assert_eq!(state.phase, TimerPhase::Idle);
        assert_eq!(state.total_duration_seconds, 60);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sync_after_stop_fails() {
        let (handle, join, _rx) = create_driver();
        handle.shutdown().unwrap();
        let _ = join.await.unwrap();

        assert_eq!(handle.sync().await, Err(DriverError::Stopped));
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_after_stop_fails() {
        let (handle, join, _rx) = create_driver();
        handle.shutdown().unwrap();
        let _ = join.await.unwrap();

        assert_eq!(handle.pause(), Err(DriverError::Stopped));
    }
}
