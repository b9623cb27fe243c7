//! Platform-specific sleep and thread priority backends.

use std::time::{Duration, Instant};

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "windows")]
mod windows;

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
mod fallback;

#[cfg(target_os = "linux")]
pub(crate) use linux::PlatformSleep;

#[cfg(target_os = "windows")]
pub(crate) use windows::PlatformSleep;

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
pub(crate) use fallback::PlatformSleep;

/// Remaining time below which the OS sleep is skipped entirely.
const SPIN_THRESHOLD: Duration = Duration::from_micros(100);

/// Portion of every sleep finished by busy-spinning.
const SPIN_TAIL: Duration = Duration::from_micros(80);

/// Split a wait into the OS-sleep part, or `None` if it is short enough to spin.
fn bulk_sleep(remaining: Duration) -> Option<Duration> {
    if remaining < SPIN_THRESHOLD {
        None
    } else {
        Some(remaining.saturating_sub(SPIN_TAIL))
    }
}

fn spin_until(target: Instant) {
    while Instant::now() < target {
        std::hint::spin_loop();
    }
}
