//! Effective configuration: file values overlaid with command-line flags.

use printloop_scheduler::{RTSetup, SchedulerConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::error::CliError;

/// Settings for the simulated pulse train.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    /// Nominal time between step edges (microseconds).
    pub step_period_us: u64,
    /// Minimum time between housekeeping passes (milliseconds).
    pub housekeeping_interval_ms: u64,
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            step_period_us: 1_000,
            housekeeping_interval_ms: 100,
        }
    }
}

impl PulseConfig {
    pub fn step_period(&self) -> Duration {
        Duration::from_micros(self.step_period_us)
    }

    pub fn housekeeping_interval(&self) -> Duration {
        Duration::from_millis(self.housekeeping_interval_ms)
    }
}

/// Everything `printloop` can be configured with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scheduler: SchedulerConfig,
    pub rt: RTSetup,
    pub pulse: PulseConfig,
}

impl Settings {
    /// Load settings from `path`, or the defaults when no path is given.
    ///
    /// Files ending in `.json` are parsed as JSON, anything else as YAML.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = fs::read_to_string(path).map_err(|source| CliError::ConfigUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let settings: Self = if is_json {
            serde_json::from_str(&text)?
        } else {
            serde_yaml::from_str(&text)?
        };

        debug!(path = %path.display(), "loaded configuration file");
        Ok(settings)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<(), CliError> {
        self.scheduler.validate()?;
        self.rt.validate()?;
        if self.pulse.step_period_us == 0 {
            return Err(CliError::InvalidConfiguration(
                "pulse.step_period_us must be at least 1".to_string(),
            ));
        }
        if self.pulse.housekeeping_interval_ms == 0 {
            return Err(CliError::InvalidConfiguration(
                "pulse.housekeeping_interval_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, step_period_us: Option<u64>, max_sleep_ms: Option<u64>) -> Self {
        if let Some(period) = step_period_us {
            self.pulse.step_period_us = period;
        }
        if let Some(max_sleep) = max_sleep_ms {
            self.scheduler.max_sleep_us = max_sleep.saturating_mul(1_000);
        }
        self
    }
}
