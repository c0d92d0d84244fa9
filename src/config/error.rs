//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::engine::TimerError;

/// Errors that can occur while loading or validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for the expected shape.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// File that was being parsed
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The preset list is unusable.
    #[error("invalid presets: {0}")]
    Presets(#[from] TimerError),

    /// A color is not `#RRGGBB` or `#RRGGBBAA`.
    #[error("invalid color for {field}: {value:?}")]
    Color {
        /// Theme field name
        field: &'static str,
        /// Rejected value
        value: String,
    },

    /// The tick interval is outside the accepted range.
    #[error("tick_interval_ms must be between {min} and {max}, got {value}")]
    TickInterval {
        /// Rejected value
        value: u64,
        /// Smallest accepted value
        min: u64,
        /// Largest accepted value
        max: u64,
    },
}

impl ConfigError {
    /// Returns true if the error came from reading or parsing the file.
    #[must_use]
    pub fn is_file_error(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Parse { .. })
    }
}
