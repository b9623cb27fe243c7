//! The timed event value.

/// A nominal fire time paired with an opaque payload.
///
/// `T` lives in the producer's time domain (ticks, virtual seconds, ...);
/// only [`EventProducer::map_to_absolute_time`](crate::EventProducer::map_to_absolute_time)
/// relates it to the scheduler clock. The payload is never inspected.
///
/// There is no "empty" event: an absent event is `None` in the
/// [`PendingSlot`](crate::PendingSlot), so nothing empty can be dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimedEvent<T, P> {
    fire_time: T,
    payload: P,
}

impl<T, P> TimedEvent<T, P> {
    /// Create an event firing at `fire_time`.
    pub const fn new(fire_time: T, payload: P) -> Self {
        Self { fire_time, payload }
    }

    /// Nominal fire time.
    #[inline]
    pub fn fire_time(&self) -> &T {
        &self.fire_time
    }

    /// Payload to hand to the producer on dispatch.
    #[inline]
    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// Consume the event, keeping only the payload.
    #[inline]
    pub fn into_payload(self) -> P {
        self.payload
    }

    /// Consume the event into `(fire_time, payload)`.
    #[inline]
    pub fn into_parts(self) -> (T, P) {
        (self.fire_time, self.payload)
    }
}
