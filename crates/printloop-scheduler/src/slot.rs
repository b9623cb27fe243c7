//! The single pending-event slot.

use crate::error::SlotOccupied;
use tracing::debug;

/// A buffer of depth one.
///
/// The scheduler owns exactly one of these. Filling it while occupied is
/// rejected by [`try_fill`](Self::try_fill); overwriting must be asked for
/// explicitly with [`replace`](Self::replace), which hands back whatever was
/// displaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSlot<E> {
    event: Option<E>,
}

impl<E> Default for PendingSlot<E> {
    fn default() -> Self {
        Self { event: None }
    }
}

impl<E> PendingSlot<E> {
    /// Create an empty slot.
    pub const fn new() -> Self {
        Self { event: None }
    }

    /// True iff nothing is pending.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.event.is_none()
    }

    /// True iff a new event may be stored without displacing another.
    #[inline]
    pub fn has_room(&self) -> bool {
        self.is_empty()
    }

    /// Store `event` if the slot is empty.
    ///
    /// # Errors
    ///
    /// Returns [`SlotOccupied`] carrying `event` back when an undispatched
    /// event is already pending; the pending one is left untouched.
    pub fn try_fill(&mut self, event: E) -> Result<(), SlotOccupied<E>> {
        if self.event.is_some() {
            return Err(SlotOccupied(event));
        }
        self.event = Some(event);
        Ok(())
    }

    /// Store `event` unconditionally, returning the event it displaced.
    pub fn replace(&mut self, event: E) -> Option<E> {
        let displaced = self.event.replace(event);
        if displaced.is_some() {
            debug!("pending event overwritten before dispatch");
        }
        displaced
    }

    /// Remove and return the pending event.
    #[inline]
    pub fn take(&mut self) -> Option<E> {
        self.event.take()
    }

    /// Borrow the pending event.
    #[inline]
    pub fn peek(&self) -> Option<&E> {
        self.event.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_slot_has_room() {
        let slot: PendingSlot<u32> = PendingSlot::new();
        assert!(slot.is_empty());
        assert!(slot.has_room());
        assert!(slot.peek().is_none());
    }

    #[test]
    fn test_try_fill_rejects_when_occupied() {
        let mut slot = PendingSlot::new();
        assert!(slot.try_fill(1).is_ok());
        assert!(!slot.has_room());

        let rejected = slot.try_fill(2);
        assert_eq!(rejected, Err(SlotOccupied(2)));
        assert_eq!(slot.peek(), Some(&1));
    }

    #[test]
    fn test_replace_returns_displaced() {
        let mut slot = PendingSlot::new();
        assert_eq!(slot.replace(1), None);
        assert_eq!(slot.replace(2), Some(1));
        assert_eq!(slot.take(), Some(2));
        assert!(slot.has_room());
    }

    #[test]
    fn test_take_empties() {
        let mut slot = PendingSlot::new();
        assert!(slot.try_fill("a").is_ok());
        assert_eq!(slot.take(), Some("a"));
        assert_eq!(slot.take(), None);
    }
}
