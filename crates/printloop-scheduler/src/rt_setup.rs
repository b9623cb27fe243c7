//! Real-time setup configuration.

use crate::error::{SchedulerError, SchedulerResult};
use serde::{Deserialize, Serialize};

/// Default `SCHED_FIFO` priority: high, but below kernel housekeeping threads.
pub const DEFAULT_SCHED_PRIORITY: i32 = 80;

/// Lowest `SCHED_FIFO` priority Linux accepts.
pub const MIN_SCHED_PRIORITY: i32 = 1;

/// Highest `SCHED_FIFO` priority Linux accepts.
pub const MAX_SCHED_PRIORITY: i32 = 99;

/// Real-time setup configuration.
///
/// Applied once by the thread that runs the event loop, through
/// [`EventScheduler::init_sched_thread`](crate::EventScheduler::init_sched_thread).
/// Every part of it is best-effort: the loop is correct without it, only
/// noisier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RTSetup {
    /// Enable high-priority scheduling.
    ///
    /// On Windows: Sets thread to TIME_CRITICAL priority.
    /// On Linux: Sets thread to SCHED_FIFO with `sched_priority`.
    pub high_priority: bool,

    /// `SCHED_FIFO` priority used on Linux (1..=99).
    pub sched_priority: i32,

    /// Enable memory locking (prevent swapping).
    ///
    /// Locks all current and future memory pages to prevent page faults
    /// while the loop is running. Linux only.
    pub lock_memory: bool,
}

impl Default for RTSetup {
    fn default() -> Self {
        Self {
            high_priority: true,
            sched_priority: DEFAULT_SCHED_PRIORITY,
            lock_memory: true,
        }
    }
}

impl RTSetup {
    /// Create a new RTSetup with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a minimal RTSetup (no special configuration).
    pub fn minimal() -> Self {
        Self {
            high_priority: false,
            sched_priority: DEFAULT_SCHED_PRIORITY,
            lock_memory: false,
        }
    }

    /// Set high priority.
    pub fn with_high_priority(mut self, enabled: bool) -> Self {
        self.high_priority = enabled;
        self
    }

    /// Set the `SCHED_FIFO` priority, clamped to 1..=99.
    pub fn with_sched_priority(mut self, priority: i32) -> Self {
        self.sched_priority = priority.clamp(MIN_SCHED_PRIORITY, MAX_SCHED_PRIORITY);
        self
    }

    /// Validate the setup.
    ///
    /// Values loaded from a config file bypass the builder clamp, so the
    /// priority range is checked here.
    ///
    /// # Errors
    ///
    /// Returns an error if `sched_priority` is outside 1..=99.
    pub fn validate(&self) -> SchedulerResult<()> {
        if !(MIN_SCHED_PRIORITY..=MAX_SCHED_PRIORITY).contains(&self.sched_priority) {
            return Err(SchedulerError::invalid_configuration(format!(
                "rt.sched_priority must be in {MIN_SCHED_PRIORITY}..={MAX_SCHED_PRIORITY}, got {}",
                self.sched_priority
            )));
        }
        Ok(())
    }

    /// Set memory locking.
    pub fn with_lock_memory(mut self, enabled: bool) -> Self {
        self.lock_memory = enabled;
        self
    }

    /// Check if any RT features are enabled.
    pub fn has_rt_features(&self) -> bool {
        self.high_priority || self.lock_memory
    }
}
