//! The contract between the scheduler and the application that feeds it.

use crate::control::LoopControl;
use std::time::Instant;

/// Advisory classification of the gap before the next idle-hook call.
///
/// `Short` means the hook is being called back immediately and should only do
/// cheap, high-frequency work. `Wide` means the loop just slept (or is forcing
/// a periodic break from a busy run), so low-frequency services should run now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalHint {
    /// Called again immediately; assume high frequency.
    Short,
    /// After a sleep or a forced break; assume low frequency.
    Wide,
}

impl IntervalHint {
    /// True for [`IntervalHint::Wide`].
    #[inline]
    pub fn is_wide(self) -> bool {
        matches!(self, Self::Wide)
    }
}

/// The three capabilities an [`EventScheduler`](crate::EventScheduler) needs
/// from the surrounding application.
///
/// All calls are made synchronously from the loop thread. A call that blocks
/// stalls the whole loop; a call that panics unwinds out of
/// [`event_loop`](crate::EventScheduler::event_loop).
pub trait EventProducer {
    /// Nominal time domain of this producer's events.
    type Time;
    /// Opaque payload carried by each event.
    type Payload;

    /// Carry out a dispatched event.
    fn execute(&mut self, payload: Self::Payload);

    /// Do one bounded slice of background work.
    ///
    /// `ctl` is how new events get scheduled and how an exit is requested.
    /// An event scheduled here is first considered for dispatch at the top of
    /// the next iteration. Return `true` if more work is immediately ready,
    /// which keeps the loop from sleeping.
    fn on_idle(
        &mut self,
        hint: IntervalHint,
        ctl: &mut LoopControl<'_, Self::Time, Self::Payload>,
    ) -> bool;

    /// Translate a nominal fire time into the scheduler clock's domain.
    fn map_to_absolute_time(&self, fire_time: &Self::Time) -> Instant;
}
