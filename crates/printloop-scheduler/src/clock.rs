//! Clock and sleep capability.
//!
//! The loop only ever asks two things of time: "what is now" and "block until
//! roughly then". [`MonotonicClock`] answers with the OS; [`ManualClock`]
//! answers with a virtual timeline so loop behaviour can be tested
//! deterministically.

use crate::platform::PlatformSleep;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic time source with a best-effort sleep.
pub trait Clock {
    /// Current monotonic time.
    fn now(&self) -> Instant;

    /// Block until approximately `deadline`.
    ///
    /// May return early or late; callers must re-check their conditions.
    fn sleep_until(&self, deadline: Instant);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep_until(&self, deadline: Instant) {
        (**self).sleep_until(deadline);
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep_until(&self, deadline: Instant) {
        (**self).sleep_until(deadline);
    }
}

/// The OS monotonic clock with a platform high-precision sleep.
///
/// On Linux the bulk of each sleep is a `clock_nanosleep` on
/// `CLOCK_MONOTONIC`; the last ~80µs are busy-spun.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock {
    sleeper: PlatformSleep,
}

impl MonotonicClock {
    /// Create the platform clock.
    pub fn new() -> Self {
        Self {
            sleeper: PlatformSleep::new(),
        }
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep_until(&self, deadline: Instant) {
        self.sleeper.sleep_until(deadline);
    }
}

/// One call to [`ManualClock::sleep_until`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepRecord {
    /// Virtual time when the sleep was requested.
    pub requested_at: Instant,
    /// Deadline that was asked for.
    pub deadline: Instant,
}

impl SleepRecord {
    /// Length of the requested sleep (zero if the deadline had already passed).
    pub fn requested(&self) -> Duration {
        self.deadline.saturating_duration_since(self.requested_at)
    }
}

/// Virtual clock for tests and simulation.
///
/// Time starts at [`origin`](Self::origin) and only moves when
/// [`advance`](Self::advance) is called or when a sleep "elapses": sleeping
/// jumps straight to the deadline (plus any configured overshoot) and records
/// the request.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset_ns: AtomicU64,
    overshoot_ns: AtomicU64,
    sleeps: Mutex<Vec<SleepRecord>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Create a clock whose timeline starts now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_ns: AtomicU64::new(0),
            overshoot_ns: AtomicU64::new(0),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    /// Make every sleep wake `overshoot` after its deadline.
    #[must_use]
    pub fn with_sleep_overshoot(self, overshoot: Duration) -> Self {
        self.overshoot_ns
            .store(duration_to_ns(overshoot), Ordering::SeqCst);
        self
    }

    /// Instant at virtual time zero.
    #[inline]
    pub fn origin(&self) -> Instant {
        self.origin
    }

    /// Virtual time elapsed since the origin.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.offset_ns.load(Ordering::SeqCst))
    }

    /// Move virtual time forward.
    pub fn advance(&self, by: Duration) {
        self.offset_ns
            .fetch_add(duration_to_ns(by), Ordering::SeqCst);
    }

    /// Move virtual time to `instant` if it lies in the future.
    pub fn advance_to(&self, instant: Instant) {
        let target = duration_to_ns(instant.saturating_duration_since(self.origin));
        self.offset_ns.fetch_max(target, Ordering::SeqCst);
    }

    /// Every sleep requested so far, oldest first.
    pub fn sleeps(&self) -> Vec<SleepRecord> {
        self.sleeps.lock().clone()
    }

    /// Number of sleeps requested so far.
    pub fn sleep_count(&self) -> usize {
        self.sleeps.lock().len()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn sleep_until(&self, deadline: Instant) {
        let requested_at = self.now();
        self.sleeps.lock().push(SleepRecord {
            requested_at,
            deadline,
        });

        let overshoot = Duration::from_nanos(self.overshoot_ns.load(Ordering::SeqCst));
        let wake = deadline.max(requested_at);
        self.advance_to(wake.checked_add(overshoot).unwrap_or(wake));
    }
}

fn duration_to_ns(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_starts_at_origin() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), clock.origin());
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::new();
        clock.advance(Duration::from_millis(3));
        clock.advance(Duration::from_millis(2));
        assert_eq!(clock.elapsed(), Duration::from_millis(5));
    }

    #[test]
    fn test_advance_to_never_goes_backwards() {
        let clock = ManualClock::new();
        clock.advance(Duration::from_millis(10));
        clock.advance_to(clock.origin() + Duration::from_millis(4));
        assert_eq!(clock.elapsed(), Duration::from_millis(10));
    }

    #[test]
    fn test_sleep_jumps_to_deadline_and_records() {
        let clock = ManualClock::new();
        let deadline = clock.origin() + Duration::from_millis(7);
        clock.sleep_until(deadline);

        assert_eq!(clock.now(), deadline);
        let sleeps = clock.sleeps();
        assert_eq!(sleeps.len(), 1);
        assert_eq!(sleeps[0].requested(), Duration::from_millis(7));
    }

    #[test]
    fn test_sleep_into_past_does_not_move_time() {
        let clock = ManualClock::new();
        clock.advance(Duration::from_millis(20));
        clock.sleep_until(clock.origin() + Duration::from_millis(5));

        assert_eq!(clock.elapsed(), Duration::from_millis(20));
        assert_eq!(clock.sleep_count(), 1);
        assert_eq!(clock.sleeps()[0].requested(), Duration::ZERO);
    }

    #[test]
    fn test_sleep_overshoot() {
        let clock = ManualClock::new().with_sleep_overshoot(Duration::from_micros(250));
        clock.sleep_until(clock.origin() + Duration::from_millis(1));
        assert_eq!(clock.elapsed(), Duration::from_micros(1250));
    }

    #[test]
    fn test_shared_clock_via_arc() {
        let clock = Arc::new(ManualClock::new());
        let shared = Arc::clone(&clock);
        shared.sleep_until(shared.now() + Duration::from_millis(2));
        assert_eq!(clock.elapsed(), Duration::from_millis(2));
    }

    #[test]
    fn test_monotonic_clock_sleeps_forward() {
        let clock = MonotonicClock::new();
        let start = clock.now();
        clock.sleep_until(start + Duration::from_millis(1));
        assert!(clock.now() >= start + Duration::from_millis(1));
    }
}
