//! Countdown engine.
//!
//! - `timer`: the countdown state machine and its events
//! - `driver`: async control task running the periodic recomputation
//! - `clock`: monotonic and manual time sources
//! - `error`: input validation errors

pub mod clock;
pub mod driver;
pub mod error;
pub mod timer;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use driver::{spawn, DriverError, TimerCommand, TimerDriver, TimerHandle};
pub use error::TimerError;
pub use timer::{
    CountdownDuration, TickSchedule, TimerEngine, TimerEvent, Transition, MAX_DURATION_SECONDS,
};
