//! Playback configuration.
//!
//! Loaded from YAML with kebab-case keys, values in seconds:
//!
//! ```yaml
//! look-ahead-secs: 5.0
//! throttle-tick-secs: 1.0
//! ```
//!
//! Missing keys fall back to the defaults.

use crate::error::ScriptuneError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_LOOK_AHEAD: Duration = Duration::from_secs(5);
pub const DEFAULT_THROTTLE_TICK: Duration = Duration::from_secs(1);

/// Scheduler timing knobs
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackConfig {
    /// How far a track's cursor may run ahead of the real clock.
    pub look_ahead: Duration,
    /// How long a throttled track waits before checking again.
    pub throttle_tick: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            look_ahead: DEFAULT_LOOK_AHEAD,
            throttle_tick: DEFAULT_THROTTLE_TICK,
        }
    }
}

/// Raw config for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawPlaybackConfig {
    look_ahead_secs: Option<f64>,
    throttle_tick_secs: Option<f64>,
}

impl PlaybackConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self, ScriptuneError> {
        // An empty document is a valid "all defaults" config
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let raw: RawPlaybackConfig =
            serde_yaml::from_str(content).map_err(|e| ScriptuneError::Config(e.to_string()))?;

        let mut config = Self::default();
        if let Some(secs) = raw.look_ahead_secs {
            config.look_ahead = positive_duration("look-ahead-secs", secs)?;
        }
        if let Some(secs) = raw.throttle_tick_secs {
            config.throttle_tick = positive_duration("throttle-tick-secs", secs)?;
        }
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptuneError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }
}

fn positive_duration(key: &str, secs: f64) -> Result<Duration, ScriptuneError> {
    if secs.is_finite() && secs > 0.0 {
        Ok(Duration::from_secs_f64(secs))
    } else {
        Err(ScriptuneError::Config(format!(
            "{} must be a positive number of seconds, got {}",
            key, secs
        )))
    }
}
