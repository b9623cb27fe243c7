//! The cooperative event loop.
//!
//! One thread, one pending event, one blocking call. Each iteration:
//! 1. dispatches the pending event if its mapped deadline has passed,
//! 2. calls the producer's idle hook with a `Short`/`Wide` hint,
//! 3. loops straight back if the hook reports more work, otherwise
//! 4. sleeps until the pending deadline or `max_sleep`, whichever is first.

use crate::clock::{Clock, MonotonicClock};
use crate::config::SchedulerConfig;
use crate::control::{LoopControl, StopHandle};
use crate::error::{RTError, SchedulerResult, SlotOccupied};
use crate::event::TimedEvent;
use crate::lateness::LatenessMetrics;
use crate::platform::PlatformSleep;
use crate::producer::{EventProducer, IntervalHint};
use crate::rt_setup::RTSetup;
use crate::slot::PendingSlot;
use crate::stats::LoopStats;
use crate::{DEFAULT_MAX_SLEEP, MAX_SLEEP_LIMIT};
use std::cell::RefCell;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

thread_local! {
    /// The last setup fully applied to this thread, if any.
    static APPLIED_RT_SETUP: RefCell<Option<RTSetup>> = const { RefCell::new(None) };
}

type EventOf<P> = TimedEvent<<P as EventProducer>::Time, <P as EventProducer>::Payload>;

/// Single-slot timed event scheduler.
///
/// Owns the producer, the clock and the pending slot. Events go in through
/// [`try_schedule`](Self::try_schedule) (or
/// [`LoopControl::try_schedule`] from inside the idle hook) and come out
/// through [`EventProducer::execute`] once their mapped deadline has passed.
///
/// # Example
///
/// ```
/// use printloop_scheduler::prelude::*;
/// use std::time::{Duration, Instant};
///
/// struct OneShot {
///     origin: Instant,
///     fired: bool,
/// }
///
/// impl EventProducer for OneShot {
///     type Time = Duration;
///     type Payload = &'static str;
///
///     fn execute(&mut self, _payload: &'static str) {
///         self.fired = true;
///     }
///
///     fn on_idle(&mut self, _hint: IntervalHint, ctl: &mut LoopControl<'_, Duration, &'static str>) -> bool {
///         if self.fired {
///             ctl.request_exit();
///         }
///         false
///     }
///
///     fn map_to_absolute_time(&self, offset: &Duration) -> Instant {
///         self.origin + *offset
///     }
/// }
///
/// let clock = ManualClock::new();
/// let producer = OneShot { origin: clock.origin(), fired: false };
/// let mut scheduler = EventScheduler::with_clock(producer, &clock);
///
/// scheduler
///     .try_schedule(TimedEvent::new(Duration::from_millis(10), "step"))
///     .expect("slot is empty");
/// scheduler.event_loop();
///
/// assert!(scheduler.producer().fired);
/// assert_eq!(clock.elapsed(), Duration::from_millis(10));
/// ```
pub struct EventScheduler<P: EventProducer, C = MonotonicClock> {
    producer: P,
    clock: C,
    slot: PendingSlot<EventOf<P>>,
    max_sleep: Duration,
    wide_hint_period: u32,
    stop: StopHandle,
    stats: LoopStats,
    lateness: LatenessMetrics,
}

impl<P: EventProducer> EventScheduler<P, MonotonicClock> {
    /// Create a scheduler on the OS monotonic clock with default configuration.
    pub fn new(producer: P) -> Self {
        Self::with_clock(producer, MonotonicClock::new())
    }
}

impl<P: EventProducer, C: Clock> EventScheduler<P, C> {
    /// Create a scheduler on `clock` with default configuration.
    pub fn with_clock(producer: P, clock: C) -> Self {
        Self::from_parts(producer, clock, &SchedulerConfig::default())
    }

    /// Create a scheduler on `clock` with `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn with_config(producer: P, clock: C, config: &SchedulerConfig) -> SchedulerResult<Self> {
        config.validate()?;
        Ok(Self::from_parts(producer, clock, config))
    }

    fn from_parts(producer: P, clock: C, config: &SchedulerConfig) -> Self {
        Self {
            producer,
            clock,
            slot: PendingSlot::new(),
            max_sleep: config.max_sleep(),
            wide_hint_period: config.wide_hint_period.max(1),
            stop: StopHandle::new(),
            stats: LoopStats::default(),
            lateness: LatenessMetrics::new(),
        }
    }

    /// Queue `event` if nothing is pending.
    ///
    /// # Errors
    ///
    /// Returns the event inside [`SlotOccupied`] if one is already pending.
    pub fn try_schedule(&mut self, event: EventOf<P>) -> Result<(), SlotOccupied<EventOf<P>>> {
        self.slot.try_fill(event)
    }

    /// Queue `event`, discarding and returning any undispatched one.
    pub fn schedule_replacing(&mut self, event: EventOf<P>) -> Option<EventOf<P>> {
        self.slot.replace(event)
    }

    /// True iff no event is pending.
    #[inline]
    pub fn has_room(&self) -> bool {
        self.slot.has_room()
    }

    /// The pending event, if any.
    pub fn pending(&self) -> Option<&EventOf<P>> {
        self.slot.peek()
    }

    /// Ask the loop to return at its next checkpoint.
    pub fn request_exit(&self) {
        self.stop.request_exit();
    }

    /// Whether an exit request is waiting to be observed.
    pub fn is_exit_requested(&self) -> bool {
        self.stop.is_exit_requested()
    }

    /// A handle that can request an exit from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Current sleep bound.
    #[inline]
    pub fn max_sleep(&self) -> Duration {
        self.max_sleep
    }

    /// Change the sleep bound, clamped to [`MAX_SLEEP_LIMIT`].
    pub fn set_max_sleep(&mut self, max_sleep: Duration) {
        self.max_sleep = max_sleep.min(MAX_SLEEP_LIMIT);
    }

    /// Restore the 40ms default sleep bound.
    pub fn reset_max_sleep(&mut self) {
        self.max_sleep = DEFAULT_MAX_SLEEP;
    }

    /// Busy idle-hook calls between forced `Wide` hints.
    #[inline]
    pub fn wide_hint_period(&self) -> u32 {
        self.wide_hint_period
    }

    /// Try to raise the calling thread's scheduling priority.
    ///
    /// Call this from the thread that will run [`event_loop`](Self::event_loop).
    /// Failure is logged and otherwise ignored. Returns whether `setup` is in
    /// effect. A setup with no real-time features needs no OS call, and
    /// repeating the setup last applied on this thread does nothing.
    pub fn init_sched_thread(&self, setup: &RTSetup) -> bool {
        if !setup.has_rt_features() {
            debug!("no real-time features requested");
            return true;
        }
        if APPLIED_RT_SETUP.with(|applied| applied.borrow().as_ref() == Some(setup)) {
            return true;
        }
        APPLIED_RT_SETUP.with(|applied| applied.replace(None));

        if let Err(e) = setup.validate() {
            warn!(error = %e, "rejected real-time thread setup; continuing at default priority");
            return false;
        }

        match PlatformSleep::new().apply_rt_setup(setup) {
            Ok(()) => {
                info!(
                    high_priority = setup.high_priority,
                    sched_priority = setup.sched_priority,
                    lock_memory = setup.lock_memory,
                    "applied real-time thread setup"
                );
                APPLIED_RT_SETUP.with(|applied| applied.replace(Some(setup.clone())));
                true
            }
            Err(e @ RTError::MemoryLockFailed(_)) if setup.high_priority => {
                // Priority is applied before memory locking, so it already stuck.
                warn!(error = %e, "memory locking failed; thread priority stays raised");
                false
            }
            Err(e) => {
                warn!(error = %e, "real-time thread setup failed; continuing at default priority");
                false
            }
        }
    }

    /// Run until an exit is requested.
    ///
    /// The exit flag is checked at the top of every iteration and again after
    /// an idle hook reports no more work, so a stop requested from inside the
    /// hook skips the pending sleep. The flag is cleared on return and the
    /// scheduler can be run again.
    pub fn event_loop(&mut self) {
        let mut hint = IntervalHint::Wide;
        let mut forced_wide = false;
        let mut short_intervals: u32 = 0;

        debug!(
            max_sleep_us = self.max_sleep.as_micros(),
            wide_hint_period = self.wide_hint_period,
            "event loop starting"
        );

        while !self.stop.is_exit_requested() {
            self.stats.iterations = self.stats.iterations.saturating_add(1);

            self.dispatch_if_due();

            if hint.is_wide() {
                self.stats.wide_hints = self.stats.wide_hints.saturating_add(1);
                if forced_wide {
                    self.stats.forced_wide_hints = self.stats.forced_wide_hints.saturating_add(1);
                }
            }

            let more_work = {
                let mut ctl = LoopControl::new(&mut self.slot, &self.stop, &mut self.max_sleep);
                self.producer.on_idle(hint, &mut ctl)
            };

            if more_work {
                // Every Nth consecutive busy call gets a Wide hint so long-period services still run.
                short_intervals += 1;
                forced_wide = short_intervals >= self.wide_hint_period;
                if forced_wide {
                    short_intervals = 0;
                    hint = IntervalHint::Wide;
                } else {
                    hint = IntervalHint::Short;
                }
            } else {
                // The hook itself may have asked to stop.
                if self.stop.is_exit_requested() {
                    break;
                }
                self.sleep_until_event();
                hint = IntervalHint::Wide;
                forced_wide = false;
                short_intervals = 0;
            }
        }

        debug!(
            iterations = self.stats.iterations,
            dispatched = self.stats.dispatched,
            "event loop exiting"
        );
        self.stop.clear();
    }

    fn pending_deadline(&self) -> Option<Instant> {
        self.slot
            .peek()
            .map(|event| self.producer.map_to_absolute_time(event.fire_time()))
    }

    fn dispatch_if_due(&mut self) {
        let Some(deadline) = self.pending_deadline() else {
            return;
        };

        let now = self.clock.now();
        if deadline > now {
            return;
        }

        let Some(event) = self.slot.take() else {
            return;
        };

        let lateness_ns = duration_as_ns(now.saturating_duration_since(deadline));
        self.lateness.record_dispatch(lateness_ns);
        self.stats.dispatched = self.stats.dispatched.saturating_add(1);
        trace!(lateness_ns, "dispatching pending event");

        self.producer.execute(event.into_payload());
    }

    /// Earlier of `now + max_sleep` and the pending event's deadline.
    fn sleep_deadline(&self, now: Instant) -> Instant {
        let bound = now.checked_add(self.max_sleep).unwrap_or(now);
        match self.pending_deadline() {
            Some(deadline) if deadline < bound => deadline,
            _ => bound,
        }
    }

    fn sleep_until_event(&mut self) {
        let now = self.clock.now();
        let deadline = self.sleep_deadline(now);
        self.stats.sleeps = self.stats.sleeps.saturating_add(1);
        trace!(
            sleep_us = deadline.saturating_duration_since(now).as_micros(),
            "sleeping until next event"
        );
        self.clock.sleep_until(deadline);
    }

    /// Loop counters.
    #[inline]
    pub fn stats(&self) -> &LoopStats {
        &self.stats
    }

    /// Zero the loop counters and lateness metrics.
    pub fn reset_stats(&mut self) {
        self.stats = LoopStats::default();
        self.lateness.reset();
    }

    /// Dispatch lateness metrics.
    #[inline]
    pub fn lateness(&self) -> &LatenessMetrics {
        &self.lateness
    }

    /// The producer.
    #[inline]
    pub fn producer(&self) -> &P {
        &self.producer
    }

    /// The producer, mutably.
    #[inline]
    pub fn producer_mut(&mut self) -> &mut P {
        &mut self.producer
    }

    /// The clock.
    #[inline]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Tear down the scheduler, returning the producer.
    pub fn into_producer(self) -> P {
        self.producer
    }
}

impl<P, C> std::fmt::Debug for EventScheduler<P, C>
where
    P: EventProducer,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventScheduler")
            .field("has_pending", &!self.slot.is_empty())
            .field("max_sleep", &self.max_sleep)
            .field("wide_hint_period", &self.wide_hint_period)
            .field("exit_requested", &self.stop.is_exit_requested())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

fn duration_as_ns(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}
