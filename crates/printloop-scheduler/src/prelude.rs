//! Prelude module for common scheduler types.
//!
//! This module provides a convenient way to import everything needed to
//! implement a producer and run a scheduler.

pub use crate::clock::{Clock, ManualClock, MonotonicClock};
pub use crate::config::SchedulerConfig;
pub use crate::control::{LoopControl, StopHandle};
pub use crate::error::{RTError, RTResult, SchedulerError, SchedulerResult, SlotOccupied};
pub use crate::event::TimedEvent;
pub use crate::lateness::{LatenessMetrics, LatenessPercentiles};
pub use crate::producer::{EventProducer, IntervalHint};
pub use crate::rt_setup::RTSetup;
pub use crate::scheduler::EventScheduler;
pub use crate::stats::LoopStats;
pub use crate::{DEFAULT_MAX_SLEEP, DEFAULT_WIDE_HINT_PERIOD, MAX_SLEEP_LIMIT};
