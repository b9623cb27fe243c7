//! A scripted producer that journals every call the scheduler makes.
//!
//! Time is a `Duration` offset from the shared [`ManualClock`]'s origin, so a
//! test can say "fire at 10ms" and later check exactly when things happened.

use printloop_scheduler::{
    Clock, EventProducer, IntervalHint, LoopControl, ManualClock, TimedEvent,
};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What `on_idle` reports back to the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleScript {
    /// Never has more work; the loop sleeps after every call.
    AlwaysIdle,
    /// Always has more work; the loop never sleeps.
    AlwaysBusy,
    /// Busy for the first `n` calls, idle afterwards.
    BusyFor(usize),
}

/// One scheduler-to-producer call, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call<P> {
    /// `execute(payload)` at virtual time `at`.
    Execute {
        /// Dispatched payload.
        payload: P,
        /// Clock reading during the call.
        at: Instant,
    },
    /// `on_idle(hint)` at virtual time `at`.
    Idle {
        /// Hint passed by the loop.
        hint: IntervalHint,
        /// Clock reading during the call.
        at: Instant,
    },
}

/// Build an event firing `offset` after the clock origin.
pub fn event_at<P>(offset: Duration, payload: P) -> TimedEvent<Duration, P> {
    TimedEvent::new(offset, payload)
}

/// A producer whose idle behaviour is fixed up front.
///
/// On every idle call it:
/// 1. journals the call,
/// 2. schedules the next fed event if the slot has room,
/// 3. requests an exit once the configured call count is reached,
/// 4. answers according to its [`IdleScript`].
#[derive(Debug)]
pub struct ScriptedProducer<P> {
    clock: Arc<ManualClock>,
    script: IdleScript,
    feed: VecDeque<TimedEvent<Duration, P>>,
    exit_after: Option<usize>,
    idle_calls: usize,
    journal: Vec<Call<P>>,
}

impl<P: Clone> ScriptedProducer<P> {
    /// A producer that is always idle and never exits on its own.
    pub fn new(clock: Arc<ManualClock>) -> Self {
        Self {
            clock,
            script: IdleScript::AlwaysIdle,
            feed: VecDeque::new(),
            exit_after: None,
            idle_calls: 0,
            journal: Vec::new(),
        }
    }

    /// Set the idle answer.
    #[must_use]
    pub fn with_script(mut self, script: IdleScript) -> Self {
        self.script = script;
        self
    }

    /// Events to hand to the scheduler, one per idle call with room.
    #[must_use]
    pub fn feeding(mut self, events: impl IntoIterator<Item = TimedEvent<Duration, P>>) -> Self {
        self.feed.extend(events);
        self
    }

    /// Request an exit during the `calls`-th idle call (counted across runs).
    #[must_use]
    pub fn exit_after(mut self, calls: usize) -> Self {
        self.exit_after = Some(calls);
        self
    }

    /// Change the exit point between runs.
    pub fn set_exit_after(&mut self, calls: Option<usize>) {
        self.exit_after = calls;
    }

    /// Every call so far.
    pub fn journal(&self) -> &[Call<P>] {
        &self.journal
    }

    /// Dispatched payloads, in order.
    pub fn executed(&self) -> Vec<P> {
        self.journal
            .iter()
            .filter_map(|call| match call {
                Call::Execute { payload, .. } => Some(payload.clone()),
                Call::Idle { .. } => None,
            })
            .collect()
    }

    /// Dispatch times, in order.
    pub fn executed_at(&self) -> Vec<Instant> {
        self.journal
            .iter()
            .filter_map(|call| match call {
                Call::Execute { at, .. } => Some(*at),
                Call::Idle { .. } => None,
            })
            .collect()
    }

    /// Hints received, in order.
    pub fn hints(&self) -> Vec<IntervalHint> {
        self.journal
            .iter()
            .filter_map(|call| match call {
                Call::Idle { hint, .. } => Some(*hint),
                Call::Execute { .. } => None,
            })
            .collect()
    }

    /// Number of idle calls so far.
    pub fn idle_calls(&self) -> usize {
        self.idle_calls
    }

    /// Events not yet handed over.
    pub fn remaining_feed(&self) -> usize {
        self.feed.len()
    }
}

impl<P: Clone> EventProducer for ScriptedProducer<P> {
    type Time = Duration;
    type Payload = P;

    fn execute(&mut self, payload: P) {
        let at = self.clock.now();
        self.journal.push(Call::Execute { payload, at });
    }

    fn on_idle(&mut self, hint: IntervalHint, ctl: &mut LoopControl<'_, Duration, P>) -> bool {
        self.idle_calls += 1;
        let at = self.clock.now();
        self.journal.push(Call::Idle { hint, at });

        if ctl.has_room() {
            if let Some(next) = self.feed.pop_front() {
                if let Err(rejected) = ctl.try_schedule(next) {
                    self.feed.push_front(rejected.into_inner());
                }
            }
        }

        if self.exit_after.is_some_and(|limit| self.idle_calls >= limit) {
            ctl.request_exit();
        }

        match self.script {
            IdleScript::AlwaysIdle => false,
            IdleScript::AlwaysBusy => true,
            IdleScript::BusyFor(n) => self.idle_calls <= n,
        }
    }

    fn map_to_absolute_time(&self, offset: &Duration) -> Instant {
        self.clock.origin() + *offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use printloop_scheduler::EventScheduler;

    #[test]
    fn test_journal_records_order() {
        let clock = Arc::new(ManualClock::new());
        let producer = ScriptedProducer::new(Arc::clone(&clock))
            .feeding([event_at(Duration::ZERO, 'x')])
            .exit_after(2)
            .with_script(IdleScript::AlwaysBusy);
        let mut scheduler = EventScheduler::with_clock(producer, Arc::clone(&clock));

        scheduler.event_loop();

        let journal = scheduler.producer().journal();
        assert_eq!(journal.len(), 3);
        assert!(matches!(journal[0], Call::Idle { hint: IntervalHint::Wide, .. }));
        assert!(matches!(journal[1], Call::Execute { payload: 'x', .. }));
        assert!(matches!(journal[2], Call::Idle { hint: IntervalHint::Short, .. }));
    }

    #[test]
    fn test_busy_for_then_idle() {
        let clock = Arc::new(ManualClock::new());
        let producer = ScriptedProducer::<u8>::new(Arc::clone(&clock))
            .with_script(IdleScript::BusyFor(2))
            .exit_after(4);
        let mut scheduler = EventScheduler::with_clock(producer, Arc::clone(&clock));

        scheduler.event_loop();

        // Calls 1 and 2 busy, call 3 idle (sleeps), call 4 exits.
        assert_eq!(clock.sleep_count(), 1);
        assert_eq!(scheduler.producer().idle_calls(), 4);
    }
}
