//! Dispatch lateness metrics.
//!
//! Lateness is how far past its mapped deadline an event actually reached
//! `execute`. Events are never dropped for being late, so this is the only
//! place lateness becomes visible.

use std::collections::VecDeque;

/// Lateness above which a dispatch counts as late (0.25ms).
pub const LATE_THRESHOLD_NS: u64 = 250_000;

const DEFAULT_WINDOW: usize = 4_096;

/// Lateness percentiles over the recent window, in nanoseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatenessPercentiles {
    pub p50_ns: u64,
    pub p95_ns: u64,
    pub p99_ns: u64,
}

/// Running lateness counters plus a window of recent samples.
///
/// `record_dispatch` is O(1) and does not allocate once the window is full.
/// [`percentiles`](Self::percentiles) sorts a copy of the window and is meant
/// for reporting after the loop returns.
#[derive(Debug, Clone)]
pub struct LatenessMetrics {
    /// Total number of dispatches recorded
    pub total_dispatches: u64,

    /// Dispatches later than [`LATE_THRESHOLD_NS`]
    pub late_dispatches: u64,

    /// Maximum observed lateness in nanoseconds
    pub max_lateness_ns: u64,

    /// Last observed lateness in nanoseconds
    pub last_lateness_ns: u64,

    sum_squared: f64,
    window: VecDeque<u64>,
    window_len: usize,
}

impl Default for LatenessMetrics {
    fn default() -> Self {
        Self::with_window(DEFAULT_WINDOW)
    }
}

impl LatenessMetrics {
    /// Create a collector with the default window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collector keeping the `window_len` most recent samples.
    pub fn with_window(window_len: usize) -> Self {
        Self {
            total_dispatches: 0,
            late_dispatches: 0,
            max_lateness_ns: 0,
            last_lateness_ns: 0,
            sum_squared: 0.0,
            window: VecDeque::with_capacity(window_len),
            window_len,
        }
    }

    /// Record one dispatch that happened `lateness_ns` after its deadline.
    pub fn record_dispatch(&mut self, lateness_ns: u64) {
        self.total_dispatches = self.total_dispatches.saturating_add(1);
        if lateness_ns > LATE_THRESHOLD_NS {
            self.late_dispatches = self.late_dispatches.saturating_add(1);
        }
        self.max_lateness_ns = self.max_lateness_ns.max(lateness_ns);
        self.last_lateness_ns = lateness_ns;
        self.sum_squared += (lateness_ns as f64).powi(2);

        if self.window_len == 0 {
            return;
        }
        if self.window.len() == self.window_len {
            self.window.pop_front();
        }
        self.window.push_back(lateness_ns);
    }

    /// Nearest-rank p50/p95/p99 over the window, all zero with no samples.
    pub fn percentiles(&self) -> LatenessPercentiles {
        if self.window.is_empty() {
            return LatenessPercentiles::default();
        }

        let mut sorted: Vec<u64> = self.window.iter().copied().collect();
        sorted.sort_unstable();
        let at = |permille: usize| {
            let rank = (sorted.len() * permille).div_ceil(1_000).max(1);
            sorted.get(rank - 1).copied().unwrap_or_default()
        };

        LatenessPercentiles {
            p50_ns: at(500),
            p95_ns: at(950),
            p99_ns: at(990),
        }
    }

    /// Root mean square lateness in nanoseconds.
    pub fn rms_lateness_ns(&self) -> f64 {
        if self.total_dispatches == 0 {
            return 0.0;
        }
        (self.sum_squared / self.total_dispatches as f64).sqrt()
    }

    /// Fraction of dispatches over the late threshold (0.0 to 1.0).
    pub fn late_rate(&self) -> f64 {
        if self.total_dispatches == 0 {
            0.0
        } else {
            self.late_dispatches as f64 / self.total_dispatches as f64
        }
    }

    /// Number of samples currently in the window.
    pub fn sample_count(&self) -> usize {
        self.window.len()
    }

    /// Reset all metrics.
    pub fn reset(&mut self) {
        *self = Self::with_window(self.window_len);
    }
}
