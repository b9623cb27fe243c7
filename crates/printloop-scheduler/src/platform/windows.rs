//! Windows-specific platform implementation.

use super::{bulk_sleep, spin_until};
use crate::error::{RTError, RTResult};
use crate::rt_setup::RTSetup;
use std::time::Instant;
use tracing::debug;
use windows::Win32::System::Threading::{
    GetCurrentThread, SetThreadPriority, THREAD_PRIORITY_TIME_CRITICAL,
};

/// Windows sleep: coarse `thread::sleep` plus a busy-spin tail.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct PlatformSleep;

impl PlatformSleep {
    pub(crate) fn new() -> Self {
        Self
    }

    /// Raise the calling thread to `THREAD_PRIORITY_TIME_CRITICAL`.
    #[expect(unsafe_code, reason = "Win32 thread priority FFI")]
    pub(crate) fn apply_rt_setup(&self, setup: &RTSetup) -> RTResult {
        if setup.high_priority {
            // SAFETY: returns a pseudo-handle for the calling thread.
            let thread = unsafe { GetCurrentThread() };
            // SAFETY: `thread` is the current thread's pseudo-handle.
            unsafe { SetThreadPriority(thread, THREAD_PRIORITY_TIME_CRITICAL) }
                .map_err(|e| RTError::PriorityElevationFailed(e.code().0))?;
        }

        if setup.lock_memory {
            debug!("memory locking is not available on Windows, skipping");
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
