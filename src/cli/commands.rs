//! Command definitions for the countdown CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::engine::MAX_DURATION_SECONDS;

// ============================================================================
// CLI Structure
// ============================================================================

/// Color-wipe countdown timer
#[derive(Parser, Debug)]
#[command(
    name = "countdown",
    version,
    about = "Color-wipe countdown timer",
    long_about = "Pick a duration, start the countdown, and watch the color drain away.\n\
                  Press Enter to pause or resume, `r` to reset, `q` to quit.",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a JSON config file
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start a countdown and keep the timer screen open
    Run(RunArgs),

    /// List the duration presets
    Presets,

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Run Command Arguments
// ============================================================================

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Preset index to select before starting (clamped to the last preset)
    #[arg(short, long, value_name = "INDEX")]
    pub preset: Option<usize>,

    /// Countdown length in seconds, overriding the preset for the first run
    #[arg(
        short,
        long,
        value_name = "SECONDS",
        conflicts_with = "preset",
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_DURATION_SECONDS))
    )]
    pub seconds: Option<u32>,

    /// Exit as soon as the first countdown completes
    #[arg(long)]
    pub once: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
