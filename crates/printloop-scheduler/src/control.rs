//! Control surface exposed to the idle hook, and the stop flag.

use crate::error::SlotOccupied;
use crate::event::TimedEvent;
use crate::slot::PendingSlot;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Cloneable exit request flag.
///
/// The flag is only observed at the loop's checkpoints (top of every iteration
/// and right before a sleep); it never interrupts a dispatch or an idle-hook
/// call. It is cleared when the loop returns, so the scheduler can be restarted.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    requested: Arc<AtomicBool>,
}

impl StopHandle {
    /// Create a handle with no exit requested.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to return at its next checkpoint.
    pub fn request_exit(&self) {
        self.requested.store(true, Ordering::Release);
    }

    /// Whether an exit is pending.
    #[inline]
    pub fn is_exit_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    pub(crate) fn clear(&self) {
        self.requested.store(false, Ordering::Release);
    }
}

/// Borrowed view of the scheduler state handed to
/// [`EventProducer::on_idle`](crate::EventProducer::on_idle).
#[derive(Debug)]
pub struct LoopControl<'a, T, P> {
    slot: &'a mut PendingSlot<TimedEvent<T, P>>,
    stop: &'a StopHandle,
    max_sleep: &'a mut Duration,
}

impl<'a, T, P> LoopControl<'a, T, P> {
    pub(crate) fn new(
        slot: &'a mut PendingSlot<TimedEvent<T, P>>,
        stop: &'a StopHandle,
        max_sleep: &'a mut Duration,
    ) -> Self {
        Self {
            slot,
            stop,
            max_sleep,
        }
    }

    /// True iff no event is pending.
    #[inline]
    pub fn has_room(&self) -> bool {
        self.slot.has_room()
    }

    /// Queue `event` if the slot is free.
    ///
    /// # Errors
    ///
    /// Returns the event inside [`SlotOccupied`] if one is already pending.
    pub fn try_schedule(
        &mut self,
        event: TimedEvent<T, P>,
    ) -> Result<(), SlotOccupied<TimedEvent<T, P>>> {
        self.slot.try_fill(event)
    }

    /// Queue `event`, discarding and returning any undispatched one.
    pub fn schedule_replacing(&mut self, event: TimedEvent<T, P>) -> Option<TimedEvent<T, P>> {
        self.slot.replace(event)
    }

    /// Fire time of the pending event, if any.
    pub fn pending_fire_time(&self) -> Option<&T> {
        self.slot.peek().map(TimedEvent::fire_time)
    }

    /// Ask the loop to return; skips the sleep that would follow this call.
    pub fn request_exit(&self) {
        self.stop.request_exit();
    }

    /// Whether an exit is pending.
    pub fn is_exit_requested(&self) -> bool {
        self.stop.is_exit_requested()
    }

    /// Current sleep bound.
    pub fn max_sleep(&self) -> Duration {
        *self.max_sleep
    }

    /// Change the sleep bound; applies from the next sleep computation.
    ///
    /// Values above [`MAX_SLEEP_LIMIT`](crate::MAX_SLEEP_LIMIT) are clamped.
    pub fn set_max_sleep(&mut self, max_sleep: Duration) {
        *self.max_sleep = max_sleep.min(crate::MAX_SLEEP_LIMIT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_handle_shared_between_clones() {
        let handle = StopHandle::new();
        let other = handle.clone();
        other.request_exit();
        assert!(handle.is_exit_requested());
        handle.clear();
        assert!(!other.is_exit_requested());
    }

    #[test]
    fn test_control_schedules_into_slot() {
        let mut slot = PendingSlot::new();
        let stop = StopHandle::new();
        let mut max_sleep = Duration::from_millis(40);

        let mut ctl = LoopControl::new(&mut slot, &stop, &mut max_sleep);
        assert!(ctl.has_room());
        assert!(ctl.try_schedule(TimedEvent::new(5_u64, 'a')).is_ok());
        assert_eq!(ctl.pending_fire_time(), Some(&5));

        let rejected = ctl.try_schedule(TimedEvent::new(6, 'b'));
        assert!(rejected.is_err());

        let displaced = ctl.schedule_replacing(TimedEvent::new(7, 'c'));
        assert_eq!(displaced, Some(TimedEvent::new(5, 'a')));

        ctl.set_max_sleep(Duration::from_millis(5));
        ctl.request_exit();

        assert_eq!(max_sleep, Duration::from_millis(5));
        assert!(stop.is_exit_requested());
        assert_eq!(slot.peek(), Some(&TimedEvent::new(7, 'c')));
    }

    #[test]
    fn test_set_max_sleep_clamps() {
        let mut slot: PendingSlot<TimedEvent<u64, ()>> = PendingSlot::new();
        let stop = StopHandle::new();
        let mut max_sleep = Duration::ZERO;

        let mut ctl = LoopControl::new(&mut slot, &stop, &mut max_sleep);
        ctl.set_max_sleep(Duration::MAX);
        assert_eq!(ctl.max_sleep(), crate::MAX_SLEEP_LIMIT);
    }
}
