//! Error types for the scheduler crate.

use thiserror::Error;

/// Real-time setup error codes.
///
/// These only ever come out of thread priority elevation, which is
/// best-effort: the scheduler logs them and keeps running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RTError {
    /// The OS refused to raise the thread's scheduling priority.
    #[error("Failed to raise thread priority (os error {0})")]
    PriorityElevationFailed(i32),
    /// The OS refused to lock the process memory.
    #[error("Failed to lock memory (os error {0})")]
    MemoryLockFailed(i32),
    /// The platform has no priority control.
    #[error("Real-time setup is not supported on this platform")]
    Unsupported,
}

/// RT setup result type
pub type RTResult<T = ()> = Result<T, RTError>;

/// Errors raised while configuring a scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl SchedulerError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }
}

/// A specialized `Result` type for scheduler configuration.
pub type SchedulerResult<T> = std::result::Result<T, SchedulerError>;

/// An event was offered to a pending slot that still holds an undispatched one.
///
/// The rejected event is handed back so the caller can retry or drop it deliberately.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("pending slot already holds an undispatched event")]
pub struct SlotOccupied<E>(pub E);

impl<E> SlotOccupied<E> {
    /// Recover the rejected event.
    pub fn into_inner(self) -> E {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rt_error_display() {
        insta::assert_snapshot!(
            RTError::PriorityElevationFailed(1).to_string(),
            @"Failed to raise thread priority (os error 1)"
        );
        insta::assert_snapshot!(
            RTError::Unsupported.to_string(),
            @"Real-time setup is not supported on this platform"
        );
    }

    #[test]
    fn test_invalid_configuration_constructor() {
        let err = SchedulerError::invalid_configuration("wide_hint_period must be at least 1");
        assert!(matches!(err, SchedulerError::InvalidConfiguration(_)));
        assert!(err.to_string().contains("wide_hint_period"));
    }

    #[test]
    fn test_slot_occupied_returns_event() {
        let err = SlotOccupied(7_u32);
        assert_eq!(err.to_string(), "pending slot already holds an undispatched event");
        assert_eq!(err.into_inner(), 7);
    }
}
