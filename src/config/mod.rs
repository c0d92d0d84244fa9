//! Application configuration.
//!
//! The configuration lives in a JSON file, by default
//! `<config_dir>/countdown/config.json`. Every field is optional; a missing
//! file means all defaults.
//!
//! ```json
//! {
//!   "presets": [60, 300, 600],
//!   "initial_index": 1,
//!   "tick_interval_ms": 50,
//!   "bar_width": 40,
//!   "theme": { "background": "#2A333D", "primary": "#F76A6A", "text": "#FFFFFF" }
//! }
//! ```

mod error;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::driver::DEFAULT_TICK_INTERVAL_MS;
use crate::selector::{default_presets, DurationSelector, DurationSet};

pub use error::ConfigError;

/// Smallest accepted display refresh interval.
pub const MIN_TICK_INTERVAL_MS: u64 = 10;

/// Largest accepted display refresh interval.
pub const MAX_TICK_INTERVAL_MS: u64 = 1000;

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

fn default_bar_width() -> u16 {
    40
}

fn default_background() -> String {
    "#2A333DFF".to_string()
}

fn default_primary() -> String {
    "#F76A6A".to_string()
}

fn default_text() -> String {
    "#FFFFFF".to_string()
}

// ============================================================================
// Rgb / Theme
// ============================================================================

/// An opaque 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parses `#RRGGBB` or `#RRGGBBAA`. The alpha channel is ignored.
    pub fn parse_hex(value: &str) -> Option<Self> {
        let hex = value.strip_prefix('#')?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }
}

/// Screen colors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Theme {
    /// Color revealed as the countdown drains
    #[serde(default = "default_background")]
    pub background: String,

    /// Color of the wipe panel
    #[serde(default = "default_primary")]
    pub primary: String,

    /// Digit color
    #[serde(default = "default_text")]
    pub text: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: default_background(),
            primary: default_primary(),
            text: default_text(),
        }
    }
}

/// Parsed theme colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgb,
    pub primary: Rgb,
    pub text: Rgb,
}

impl Theme {
    /// Parses every color.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first malformed field.
    pub fn palette(&self) -> Result<Palette, ConfigError> {
        let parse = |field: &'static str, value: &str| {
            Rgb::parse_hex(value).ok_or_else(|| ConfigError::Color {
                field,
                value: value.to_string(),
            })
        };
        Ok(Palette {
            background: parse("background", &self.background)?,
            primary: parse("primary", &self.primary)?,
            text: parse("text", &self.text)?,
        })
    }
}

// ============================================================================
// AppConfig
// ============================================================================

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Picker presets in seconds
    #[serde(default = "default_presets")]
    pub presets: Vec<u32>,

    /// Preset selected when the screen opens
    #[serde(default)]
    pub initial_index: usize,

    /// Display refresh cadence
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Width of the terminal wipe bar in cells
    #[serde(default = "default_bar_width")]
    pub bar_width: u16,

    /// Screen colors
    #[serde(default)]
    pub theme: Theme,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            presets: default_presets(),
            initial_index: 0,
            tick_interval_ms: default_tick_interval_ms(),
            bar_width: default_bar_width(),
            theme: Theme::default(),
        }
    }
}

impl AppConfig {
    /// Default config file location, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("countdown").join("config.json"))
    }

    /// Loads and validates the configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used if present and defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    tracing::debug!("no config file, using defaults");
                    Self::default()
                }
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Reads a config file without validating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        tracing::debug!(path = %path.display(), "loading config");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the presets, tick interval, or colors are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.duration_set()?;
        if !(MIN_TICK_INTERVAL_MS..=MAX_TICK_INTERVAL_MS).contains(&self.tick_interval_ms) {
            return Err(ConfigError::TickInterval {
                value: self.tick_interval_ms,
                min: MIN_TICK_INTERVAL_MS,
                max: MAX_TICK_INTERVAL_MS,
            });
        }
        self.theme.palette()?;
        Ok(())
    }

    /// Builds the preset list.
    ///
    /// # Errors
    ///
    /// Returns an error if the presets are empty or contain a zero or an
    /// overlong entry.
    pub fn duration_set(&self) -> Result<DurationSet, ConfigError> {
        Ok(DurationSet::new(self.presets.clone())?)
    }

    /// Builds a selector positioned at `initial_index` (clamped).
    ///
    /// # Errors
    ///
    /// Returns an error if the presets are invalid.
    pub fn selector(&self) -> Result<DurationSelector, ConfigError> {
        Ok(DurationSelector::with_index(
            self.duration_set()?,
            self.initial_index,
        ))
    }

    /// Display refresh cadence as a [`std::time::Duration`].
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TimerError;
    use std::io::Write;

    mod rgb_tests {
        use super::*;

        #[test]
        fn test_parse_rgb() {
            assert_eq!(
                Rgb::parse_hex("#F76A6A"),
                Some(Rgb {
                    r: 0xF7,
                    g: 0x6A,
                    b: 0x6A
                })
            );
        }

        #[test]
        fn test_parse_rgba_ignores_alpha() {
            assert_eq!(
                Rgb::parse_hex("#2A333DFF"),
                Some(Rgb {
                    r: 0x2A,
                    g: 0x33,
                    b: 0x3D
                })
            );
        }

        #[test]
        fn test_parse_rejects_malformed() {
            assert_eq!(Rgb::parse_hex("F76A6A"), None);
            assert_eq!(Rgb::parse_hex("#F76"), None);
            assert_eq!(Rgb::parse_hex("#GGGGGG"), None);
            assert_eq!(Rgb::parse_hex("#ÿÿÿ"), None);
        }
    }

    mod app_config_tests {
        use super::*;

        #[test]
        fn test_default_config_is_valid() {
            let config = AppConfig::default();
            assert!(config.validate().is_ok());
            assert_eq!(config.tick_interval_ms, 50);
            assert_eq!(config.presets.len(), 13);
        }

        #[test]
        fn test_partial_json_uses_defaults() {
            let config: AppConfig = serde_json::from_str(r#"{"presets": [5, 10]}"#).unwrap();
            assert_eq!(config.presets, vec![5, 10]);
            assert_eq!(config.tick_interval_ms, 50);
            assert_eq!(config.theme, Theme::default());
        }

        #[test]
        fn test_validate_rejects_empty_presets() {
            let config = AppConfig {
                presets: vec![],
                ..AppConfig::default()
            };
            assert!(matches!(config.validate(), Err(ConfigError::Presets(_))));
        }

        #[test]
        fn test_validate_rejects_preset_the_timer_cannot_start() {
            let config = AppConfig {
                presets: vec![60, 100_000],
                ..AppConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::Presets(TimerError::PresetTooLong {
                    index: 1,
                    seconds: 100_000,
                    ..
                }))
            ));
        }

        #[test]
        fn test_validate_rejects_tick_interval() {
            let config = AppConfig {
                tick_interval_ms: 5_000,
                ..AppConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::TickInterval { value: 5_000, .. })
            ));
        }

        #[test]
        fn test_validate_rejects_bad_color() {
            let mut config = AppConfig::default();
            config.theme.text = "white".to_string();
            assert!(matches!(
                config.validate(),
                Err(ConfigError::Color { field: "text", .. })
            ));
        }

        #[test]
        fn test_selector_clamps_initial_index() {
            let config = AppConfig {
                presets: vec![10, 20],
                initial_index: 9,
                ..AppConfig::default()
            };
            let selector = config.selector().unwrap();
            assert_eq!(selector.current_duration(), 20);
        }

        #[test]
        fn test_load_from_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            write!(file, r#"{{"presets": [30, 90], "initial_index": 1}}"#).unwrap();

            let config = AppConfig::load(Some(file.path())).unwrap();
            assert_eq!(config.presets, vec![30, 90]);
            assert_eq!(config.selector().unwrap().current_duration(), 90);
        }

        #[test]
        fn test_load_missing_file() {
            let err = AppConfig::load(Some(Path::new("/definitely/not/here.json"))).unwrap_err();
            assert!(matches!(err, ConfigError::Io { .. }));
        }

        #[test]
        fn test_load_invalid_json() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            write!(file, "not json").unwrap();

            let err = AppConfig::load(Some(file.path())).unwrap_err();
            assert!(matches!(err, ConfigError::Parse { .. }));
        }
    }
}
