//! A simulated step pin driven through the scheduler.
//!
//! Edge `n` is due `n` step periods after the start. The producer keeps the
//! slot topped up with the next edge, stops the loop once the run window has
//! closed, and does a low-cadence housekeeping pass only when the loop tells
//! it a wide interval is available.

use printloop_scheduler::{Clock, EventProducer, IntervalHint, LoopControl, TimedEvent};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// What the pulse train did over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PulseReport {
    /// Edges handed to `execute`.
    pub edges: u64,
    /// Edges that fit in the run window.
    pub expected_edges: u64,
    /// Housekeeping passes performed.
    pub housekeeping_runs: u64,
    /// Pin level after the last edge.
    pub final_level: bool,
}

/// Virtual step pin toggled at a fixed period.
#[derive(Debug)]
pub struct PulseTrain<C> {
    clock: C,
    origin: Instant,
    period: Duration,
    run_until: Instant,
    next_tick: u64,
    level: bool,
    edges: u64,
    housekeeping_interval: Duration,
    last_housekeeping: Instant,
    housekeeping_runs: u64,
}

impl<C: Clock> PulseTrain<C> {
    /// Start a pulse train on `clock` that runs for `duration`.
    pub fn new(clock: C, period: Duration, duration: Duration, housekeeping_interval: Duration) -> Self {
        let origin = clock.now();
        Self {
            origin,
            period,
            run_until: origin.checked_add(duration).unwrap_or(origin),
            next_tick: 1,
            level: false,
            edges: 0,
            housekeeping_interval,
            last_housekeeping: origin,
            housekeeping_runs: 0,
            clock,
        }
    }

    /// Summary of the run so far.
    pub fn report(&self) -> PulseReport {
        let window = self.run_until.saturating_duration_since(self.origin);
        let expected_edges = window
            .as_nanos()
            .checked_div(self.period.as_nanos())
            .unwrap_or(0);
        PulseReport {
            edges: self.edges,
            expected_edges: u64::try_from(expected_edges).unwrap_or(u64::MAX),
            housekeeping_runs: self.housekeeping_runs,
            final_level: self.level,
        }
    }

    fn housekeeping(&mut self, now: Instant) {
        if now.saturating_duration_since(self.last_housekeeping) < self.housekeeping_interval {
            return;
        }
        self.last_housekeeping = now;
        self.housekeeping_runs = self.housekeeping_runs.saturating_add(1);
        debug!(
            runs = self.housekeeping_runs,
            edges = self.edges,
            "housekeeping pass"
        );
    }
}

impl<C: Clock> EventProducer for PulseTrain<C> {
    type Time = u64;
    type Payload = bool;

    fn execute(&mut self, level: bool) {
        self.level = level;
        self.edges = self.edges.saturating_add(1);
        trace!(edge = self.edges, level, "step edge");
    }

    fn on_idle(&mut self, hint: IntervalHint, ctl: &mut LoopControl<'_, u64, bool>) -> bool {
        let now = self.clock.now();
        if now >= self.run_until {
            ctl.request_exit();
            return false;
        }

        if hint.is_wide() {
            self.housekeeping(now);
        }

        if !ctl.has_room() {
            return false;
        }

        // Odd edges raise the pin, even edges lower it.
        let tick = self.next_tick;
        let edge = TimedEvent::new(tick, tick % 2 == 1);
        if ctl.try_schedule(edge).is_err() {
            return false;
        }
        self.next_tick = tick.saturating_add(1);
        true
    }

    fn map_to_absolute_time(&self, tick: &u64) -> Instant {
        let period_ns = u64::try_from(self.period.as_nanos()).unwrap_or(u64::MAX);
        let offset = Duration::from_nanos(period_ns.saturating_mul(*tick));
        self.origin.checked_add(offset).unwrap_or(self.run_until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use printloop_scheduler::{EventScheduler, ManualClock};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_edges_follow_period() {
        let clock = ManualClock::new();
        let pulse = PulseTrain::new(&clock, ms(1), ms(10), ms(4));
        let mut scheduler = EventScheduler::with_clock(pulse, &clock);

        scheduler.event_loop();

        let report = scheduler.producer().report();
        assert_eq!(report.edges, 10);
        assert_eq!(report.expected_edges, 10);
        assert!(!report.final_level);
        assert_eq!(scheduler.lateness().max_lateness_ns, 0);
        assert!(
            clock
                .sleeps()
                .iter()
                .all(|s| s.requested() <= ms(1))
        );
    }

    #[test]
    fn test_housekeeping_only_on_wide_hints() {
        let clock = ManualClock::new();
        let pulse = PulseTrain::new(&clock, ms(1), ms(10), ms(4));
        let mut scheduler = EventScheduler::with_clock(pulse, &clock);

        scheduler.event_loop();

        // Wide hints arrive after each wake-up at 1ms, 2ms, ...; the pass is due at 4ms and 8ms.
        assert_eq!(scheduler.producer().report().housekeeping_runs, 2);
    }

    #[test]
    fn test_late_wakeups_still_produce_every_edge() {
        let clock = ManualClock::new().with_sleep_overshoot(Duration::from_micros(300));
        let pulse = PulseTrain::new(&clock, ms(1), ms(5), ms(100));
        let mut scheduler = EventScheduler::with_clock(pulse, &clock);

        scheduler.event_loop();

        let report = scheduler.producer().report();
        assert!(report.edges >= 4);
        assert_eq!(scheduler.lateness().late_dispatches, report.edges);
    }

    #[test]
    fn test_zero_duration_exits_immediately() {
        let clock = ManualClock::new();
        let pulse = PulseTrain::new(&clock, ms(1), Duration::ZERO, ms(100));
        let mut scheduler = EventScheduler::with_clock(pulse, &clock);

        scheduler.event_loop();

        assert_eq!(scheduler.producer().report().edges, 0);
        assert_eq!(clock.sleep_count(), 0);
    }
}
