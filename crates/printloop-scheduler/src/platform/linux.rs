//! Linux-specific platform implementation.

use super::{bulk_sleep, spin_until};
use crate::error::{RTError, RTResult};
use crate::rt_setup::RTSetup;
use libc::{
    CLOCK_MONOTONIC, MCL_CURRENT, MCL_FUTURE, SCHED_FIFO, clock_nanosleep, mlockall,
    pthread_self, pthread_setschedparam, sched_param, timespec,
};
use std::time::Instant;
use tracing::trace;

/// Linux sleep backed by `clock_nanosleep` on the monotonic clock.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct PlatformSleep;

impl PlatformSleep {
    pub(crate) fn new() -> Self {
        Self
    }

    /// Move the calling thread to `SCHED_FIFO` and optionally lock its memory.
    ///
    /// Fails without `CAP_SYS_NICE` (or an `RLIMIT_RTPRIO` allowance).
    #[expect(unsafe_code, reason = "pthread and mlockall FFI")]
    pub(crate) fn apply_rt_setup(&self, setup: &RTSetup) -> RTResult {
        if setup.high_priority {
            let param = sched_param {
                sched_priority: setup.sched_priority,
            };

            // SAFETY: pthread_self() names the calling thread and `param` outlives the call.
            let ret = unsafe { pthread_setschedparam(pthread_self(), SCHED_FIFO, &param) };
            if ret != 0 {
                return Err(RTError::PriorityElevationFailed(ret));
            }
        }

        if setup.lock_memory {
            // SAFETY: mlockall takes only flags.
            if unsafe { mlockall(MCL_CURRENT | MCL_FUTURE) } != 0 {
                let code = std::io::Error::last_os_error()
                    .raw_os_error()
                    .unwrap_or(-1);
                return Err(RTError::MemoryLockFailed(code));
            }
        }

        Ok(())
    }

    /// Sleep until ~80µs before `target`, then busy-spin.
    ///
    /// An interrupted `clock_nanosleep` returns early; callers re-check their
    /// conditions after every wake so that is harmless.
    #[expect(unsafe_code, reason = "clock_nanosleep FFI")]
    pub(crate) fn sleep_until(&self, target: Instant) {
        let Some(remaining) = target.checked_duration_since(Instant::now()) else {
            return;
        };

        if let Some(bulk) = bulk_sleep(remaining) {
            let ts = timespec {
                tv_sec: bulk.as_secs() as libc::time_t,
                tv_nsec: bulk.subsec_nanos() as libc::c_long,
            };

            // SAFETY: `ts` is a valid relative timespec and a null remainder is permitted.
            let ret = unsafe { clock_nanosleep(CLOCK_MONOTONIC, 0, &ts, std::ptr::null_mut()) };
            if ret != 0 {
                trace!(code = ret, "clock_nanosleep returned early");
                return;
            }
        }

        spin_until(target);
    }
}
