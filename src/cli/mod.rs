//! CLI module for the countdown timer.
//!
//! This module provides the command-line front end:
//! - `commands`: Command definitions using clap derive
//! - `display`: Terminal rendering of the timer screen
//! - `input`: Keyboard gestures and their intents
//! - `session`: The interactive timer screen

pub mod commands;
pub mod display;
pub mod input;
pub mod session;

pub use commands::{Cli, Commands, RunArgs};
pub use display::Display;
pub use input::{plan, Gesture, Intent};
pub use session::SessionOptions;
