//! Behavioural test suite for the printloop scheduler
//!
//! Every test here drives a real [`EventScheduler`] through its public API on
//! a [`ManualClock`], so sleeps complete instantly and every timing assertion
//! is exact. The harness below wires a [`ScriptedProducer`] and a shared clock
//! together.

#![deny(rust_2018_idioms)]
#![deny(warnings)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::print_stdout)]

use anyhow::Result;
use printloop_scheduler::{EventScheduler, IntervalHint, ManualClock, SchedulerConfig};
use printloop_test_helpers::ScriptedProducer;
use std::sync::Arc;
use std::time::Duration;

/// A scheduler driving a scripted producer on a shared manual clock.
pub type ScriptedScheduler<P> = EventScheduler<ScriptedProducer<P>, Arc<ManualClock>>;

/// A scheduler and the clock it runs on.
pub struct Harness<P: Clone> {
    pub clock: Arc<ManualClock>,
    pub scheduler: ScriptedScheduler<P>,
}

impl<P: Clone> Harness<P> {
    /// Build a harness with default configuration.
    pub fn new(
        configure: impl FnOnce(ScriptedProducer<P>) -> ScriptedProducer<P>,
    ) -> Result<Self> {
        Self::with_config(configure, &SchedulerConfig::default())
    }

    /// Build a harness with `config`.
    pub fn with_config(
        configure: impl FnOnce(ScriptedProducer<P>) -> ScriptedProducer<P>,
        config: &SchedulerConfig,
    ) -> Result<Self> {
        let clock = Arc::new(ManualClock::new());
        let producer = configure(ScriptedProducer::new(Arc::clone(&clock)));
        let scheduler = EventScheduler::with_config(producer, Arc::clone(&clock), config)?;
        Ok(Self { clock, scheduler })
    }

    /// Run the loop to completion.
    pub fn run(&mut self) {
        self.scheduler.event_loop();
    }

    /// Hints seen by the producer so far.
    pub fn hints(&self) -> Vec<IntervalHint> {
        self.scheduler.producer().hints()
    }

    /// Requested length of every sleep so far.
    pub fn sleep_lengths(&self) -> Vec<Duration> {
        self.clock.sleeps().iter().map(|s| s.requested()).collect()
    }
}

/// Shorthand for a millisecond `Duration`.
pub const fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}
