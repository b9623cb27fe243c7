//! Fallback platform implementation for non-Windows, non-Linux systems.

use super::{bulk_sleep, spin_until};
use crate::error::{RTError, RTResult};
use crate::rt_setup::RTSetup;
use std::time::Instant;

/// Fallback sleep using the standard library.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct PlatformSleep;

impl PlatformSleep {
    pub(crate) fn new() -> Self {
        Self
    }

    /// No priority control here; anything beyond a no-op setup is unsupported.
    pub(crate) fn apply_rt_setup(&self, setup: &RTSetup) -> RTResult {
        if setup.high_priority || setup.lock_memory {
            return Err(RTError::Unsupported);
        }
        Ok(())
    }

    pub(crate) fn sleep_until(&self, target: Instant) {
        let Some(remaining) = target.checked_duration_since(Instant::now()) else {
            return;
        };

        if let Some(bulk) = bulk_sleep(remaining) {
            std::thread::sleep(bulk);
        }

        spin_until(target);
    }
}
