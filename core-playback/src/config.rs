//! # Player Configuration
//!
//! Configuration for the playback synchronization controller.

use crate::error::{PlayerError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Controller configuration.
///
/// Controls sampling cadence, the significant-change gate, and channel sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Interval between progress samples while playing.
    ///
    /// Default: 500 ms.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: Duration,

    /// Minimum elapsed-time delta (seconds) between two now-playing progress
    /// writes. Samples closer than this to the last forwarded one are
    /// suppressed for the latency-tolerant surface; the full-rate progress
    /// stream is unaffected.
    ///
    /// Default: 10 seconds.
    #[serde(default = "default_significant_change_threshold")]
    pub significant_change_threshold: f64,

    /// Skip-forward/skip-backward step (seconds) used when the remote-command
    /// surface does not supply its own interval.
    ///
    /// Default: 30 seconds.
    #[serde(default = "default_skip_interval")]
    pub skip_interval: f64,

    /// Buffer size for each observer broadcast channel.
    ///
    /// Default: 64.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            progress_interval: default_progress_interval(),
            significant_change_threshold: default_significant_change_threshold(),
            skip_interval: default_skip_interval(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl PlayerConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::InvalidConfig`] when any field is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.progress_interval.is_zero() {
            return Err(PlayerError::InvalidConfig(
                "progress_interval must be greater than zero".into(),
            ));
        }
        if !self.significant_change_threshold.is_finite()
            || self.significant_change_threshold <= 0.0
        {
            return Err(PlayerError::InvalidConfig(
                "significant_change_threshold must be a positive number".into(),
            ));
        }
        if !self.skip_interval.is_finite() || self.skip_interval <= 0.0 {
            return Err(PlayerError::InvalidConfig(
                "skip_interval must be a positive number".into(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(PlayerError::InvalidConfig(
                "event_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_progress_interval() -> Duration {
    Duration::from_millis(500)
}

fn default_significant_change_threshold() -> f64 {
    10.0
}

fn default_skip_interval() -> f64 {
    30.0
}

fn default_event_capacity() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PlayerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.progress_interval, Duration::from_millis(500));
        assert_eq!(config.significant_change_threshold, 10.0);
        assert_eq!(config.skip_interval, 30.0);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = PlayerConfig {
            progress_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PlayerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn non_finite_threshold_is_rejected() {
        let config = PlayerConfig {
            significant_change_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: PlayerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.significant_change_threshold, 10.0);
        assert_eq!(config.event_capacity, 64);
    }
}
