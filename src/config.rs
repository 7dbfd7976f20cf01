//! Playback engine configuration.
//!
//! Every timing threshold the reconciliation and advancement logic uses is
//! tunable here. Defaults match the behavior proven out against real-world
//! embeds: lenient enough for slow networks and backgrounded tabs, tight
//! enough to converge within a couple of seconds.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{PlayheadError, Result};

/// Playback engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Maximum reconciliation attempts before giving up on a target
    pub max_attempts: u32,

    /// Delay between reconciliation attempts, in milliseconds
    pub retry_delay_ms: u64,

    /// Age past which a target is considered stale and judged leniently,
    /// in milliseconds. Covers suspended timers (e.g. backgrounded tabs).
    pub staleness_threshold_ms: u64,

    /// Maximum playhead drift from the target offset before a corrective
    /// seek is issued, in seconds
    pub seek_tolerance_secs: f64,

    /// Margin before the reported duration at which an item counts as
    /// finished, in seconds
    pub end_margin_secs: f64,

    /// Snapshot poll interval while playback is active, in milliseconds
    pub poll_interval_active_ms: u64,

    /// Snapshot poll interval while idle or paused, in milliseconds
    pub poll_interval_idle_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_delay_ms: 500,
            staleness_threshold_ms: 5000,
            seek_tolerance_secs: 5.0,
            end_margin_secs: 2.0,
            poll_interval_active_ms: 333,
            poll_interval_idle_ms: 2000,
        }
    }
}

impl PlaybackConfig {
    /// Parse a configuration from a TOML string.
    ///
    /// Missing fields fall back to their defaults.
    ///
    /// # Errors
    /// Returns `PlayheadError::TomlParse` if the document is not valid TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PlayheadError::toml_parse(e, None))
    }

    /// Load a configuration from a TOML file.
    ///
    /// # Errors
    /// Returns `PlayheadError::Io` if the file cannot be read, or
    /// `PlayheadError::TomlParse` if its contents are not valid TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| PlayheadError::toml_parse(e, Some(path)))
    }

    /// Delay between reconciliation attempts.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Target age past which lenient acceptance applies.
    pub fn staleness_threshold(&self) -> Duration {
        Duration::from_millis(self.staleness_threshold_ms)
    }

    /// Allowed playhead drift before a corrective seek.
    pub fn seek_tolerance(&self) -> Duration {
        Duration::from_secs_f64(self.seek_tolerance_secs)
    }

    /// End-of-item margin.
    pub fn end_margin(&self) -> Duration {
        Duration::from_secs_f64(self.end_margin_secs)
    }

    /// Snapshot poll interval for the given playback activity.
    pub fn poll_interval(&self, playing: bool) -> Duration {
        if playing {
            Duration::from_millis(self.poll_interval_active_ms)
        } else {
            Duration::from_millis(self.poll_interval_idle_ms)
        }
    }
}
