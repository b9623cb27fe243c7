//! Event loop counters.

use serde::Serialize;

/// Counters accumulated across every run of an event loop.
///
/// They are not reset when the loop exits; call
/// [`EventScheduler::reset_stats`](crate::EventScheduler::reset_stats) for that.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoopStats {
    /// Loop iterations started.
    pub iterations: u64,
    /// Events handed to `execute`.
    pub dispatched: u64,
    /// Bounded sleeps entered.
    pub sleeps: u64,
    /// Idle-hook calls made with a `Wide` hint.
    pub wide_hints: u64,
    /// `Wide` hints forced by the anti-starvation period during busy runs.
    pub forced_wide_hints: u64,
}

impl LoopStats {
    /// Idle-hook calls made with a `Short` hint.
    pub fn short_hints(&self) -> u64 {
        self.iterations.saturating_sub(self.wide_hints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_hints() {
        let stats = LoopStats {
            iterations: 10,
            wide_hints: 3,
            ..Default::default()
        };
        assert_eq!(stats.short_hints(), 7);
    }
}
