//! Scheduler configuration.

use crate::error::{SchedulerError, SchedulerResult};
use crate::{DEFAULT_MAX_SLEEP, DEFAULT_WIDE_HINT_PERIOD, MAX_SLEEP_LIMIT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for an [`EventScheduler`](crate::EventScheduler).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Longest single idle sleep (microseconds). The idle hook is re-entered
    /// at least this often even with nothing scheduled.
    pub max_sleep_us: u64,
    /// After this many consecutive busy idle-hook calls, the next call gets a
    /// `Wide` hint so low-frequency services are not starved.
    pub wide_hint_period: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_sleep_us: duration_as_us(DEFAULT_MAX_SLEEP),
            wide_hint_period: DEFAULT_WIDE_HINT_PERIOD,
        }
    }
}

impl SchedulerConfig {
    /// Sleep bound as a `Duration`.
    pub fn max_sleep(&self) -> Duration {
        Duration::from_micros(self.max_sleep_us)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `wide_hint_period` is zero or the sleep bound
    /// exceeds [`MAX_SLEEP_LIMIT`].
    pub fn validate(&self) -> SchedulerResult<()> {
        if self.wide_hint_period == 0 {
            return Err(SchedulerError::invalid_configuration(
                "wide_hint_period must be at least 1",
            ));
        }
        if self.max_sleep() > MAX_SLEEP_LIMIT {
            return Err(SchedulerError::invalid_configuration(format!(
                "max_sleep_us must not exceed {}",
                duration_as_us(MAX_SLEEP_LIMIT)
            )));
        }
        Ok(())
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> SchedulerConfigBuilder {
        SchedulerConfigBuilder::default()
    }
}

/// Builder for `SchedulerConfig`.
#[derive(Debug, Default)]
pub struct SchedulerConfigBuilder {
    config: SchedulerConfig,
}

impl SchedulerConfigBuilder {
    /// Set the sleep bound.
    #[must_use]
    pub fn max_sleep(mut self, max_sleep: Duration) -> Self {
        self.config.max_sleep_us = duration_as_us(max_sleep);
        self
    }

    /// Set the forced-`Wide` period.
    #[must_use]
    pub fn wide_hint_period(mut self, period: u32) -> Self {
        self.config.wide_hint_period = period;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> SchedulerResult<SchedulerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

fn duration_as_us(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.max_sleep(), Duration::from_millis(40));
        assert_eq!(config.wide_hint_period, 2048);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() -> SchedulerResult<()> {
        let config = SchedulerConfig::builder()
            .max_sleep(Duration::from_millis(5))
            .wide_hint_period(16)
            .build()?;
        assert_eq!(config.max_sleep_us, 5_000);
        assert_eq!(config.wide_hint_period, 16);
        Ok(())
    }

    #[test]
    fn test_zero_wide_period_rejected() {
        let result = SchedulerConfig::builder().wide_hint_period(0).build();
        assert!(matches!(
            result,
            Err(SchedulerError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_sleep_limit_rejected() {
        let result = SchedulerConfig::builder()
            .max_sleep(MAX_SLEEP_LIMIT + Duration::from_secs(1))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_sleep_allowed() {
        let result = SchedulerConfig::builder().max_sleep(Duration::ZERO).build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_partial_deserialize() -> Result<(), serde_json::Error> {
        let config: SchedulerConfig = serde_json::from_str(r#"{"max_sleep_us": 5000}"#)?;
        assert_eq!(config.max_sleep(), Duration::from_millis(5));
        assert_eq!(config.wide_hint_period, DEFAULT_WIDE_HINT_PERIOD);
        Ok(())
    }
}
