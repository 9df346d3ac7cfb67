//! Input configuration
//!
//! Supports multiple profiles (debug, release) with different settings.

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Timing and distance thresholds used by the device modules
///
/// Times are in milliseconds, distances in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Maximum time between two primary presses forming a double-click
    pub double_click_time: f64,
    /// Movement from the press origin that starts a drag
    pub drag_start_distance: f32,
    /// Movement past which a release after dragging is no longer a click
    pub click_drag_distance: f32,
    /// Delay before a held key starts repeating
    pub key_repeat_initial_delay: f64,
    /// Delay between two repeats of a held key
    pub key_repeat_interval: f64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            double_click_time: 250.0,
            drag_start_distance: 0.0,
            click_drag_distance: 40.0,
            key_repeat_initial_delay: 250.0,
            key_repeat_interval: 70.0,
        }
    }
}

impl InputConfig {
    /// Loads configuration based on the specified profile
    ///
    /// Profiles are loaded from config files in the following order:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{profile}.toml (profile-specific overrides)
    /// 3. Environment variables with prefix INPUT_ (e.g., INPUT_DOUBLE_CLICK_TIME=300)
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        Self::load_from("config", profile)
    }

    /// Same as [`InputConfig::load`], reading config files from `dir`
    pub fn load_from(dir: impl AsRef<Path>, profile: &str) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let default = dir.join("default");
        let profile_file = dir.join(profile);

        let config = Config::builder()
            .add_source(File::with_name(&default.to_string_lossy()).required(false))
            .add_source(File::with_name(&profile_file.to_string_lossy()).required(false))
            .add_source(
                Environment::with_prefix("INPUT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Loads configuration using the INPUT_PROFILE environment variable,
    /// defaulting to "debug" if not set
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let profile = std::env::var("INPUT_PROFILE").unwrap_or_else(|_| "debug".to_string());
        Self::load(&profile)
    }
}
