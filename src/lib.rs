//! Countdown Timer Library
//!
//! This library provides the core functionality for the countdown timer.
//! It includes:
//! - Timer engine: a wall-clock anchored countdown state machine
//! - Timer driver: the async control task that refreshes the display
//! - Duration selector for the preset picker
//! - Rendering adapter for the color wipe and picker
//! - Configuration loading
//! - CLI command parsing and terminal display

pub mod cli;
pub mod config;
pub mod engine;
pub mod render;
pub mod selector;
pub mod types;

// Re-export commonly used types for convenience
pub use config::{AppConfig, ConfigError, Theme};
pub use engine::{
    Clock, CountdownDuration, DriverError, ManualClock, MonotonicClock, TimerDriver, TimerEngine,
    TimerError, TimerEvent, TimerHandle, Transition,
};
pub use render::Frame;
pub use selector::{DurationSelector, DurationSet};
pub use types::{TimerPhase, TimerState};
