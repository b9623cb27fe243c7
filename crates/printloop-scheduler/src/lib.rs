//! Single-slot timed event scheduler for cooperative real-time control loops.
//!
//! This crate turns a stream of precisely timed output events into actual
//! output actions while giving a background producer (motion planning,
//! command parsing) regular chances to compute the next event. It includes:
//!
//! - **TimedEvent / PendingSlot**: a one-deep event buffer with explicit overwrite policy
//! - **EventProducer**: the three-operation contract the surrounding application implements
//! - **EventScheduler**: the dispatch/idle/sleep loop with anti-starvation interval hints
//! - **Clock**: injectable time source, with a platform clock and a deterministic manual clock
//! - **RTSetup**: best-effort thread priority elevation
//! - **LatenessMetrics / LoopStats**: dispatch lateness and loop counters
//!
//! # RT-Safety Guarantees
//!
//! - **No heap allocations** in the loop after construction
//! - **One blocking call**: the bounded sleep, capped by `max_sleep` and the pending deadline
//! - **No internal locking** on the loop path
//! - **Late events still fire**: dispatch is never skipped for lateness
//!
//! # Example
//!
//! ```no_run
//! use printloop_scheduler::prelude::*;
//! use std::time::{Duration, Instant};
//!
//! struct Blink {
//!     origin: Instant,
//!     next: u64,
//! }
//!
//! impl EventProducer for Blink {
//!     type Time = u64;
//!     type Payload = bool;
//!
//!     fn execute(&mut self, level: bool) {
//!         println!("pin -> {level}");
//!     }
//!
//!     fn on_idle(&mut self, _hint: IntervalHint, ctl: &mut LoopControl<'_, u64, bool>) -> bool {
//!         if self.next == 10 {
//!             ctl.request_exit();
//!         } else if ctl.has_room() {
//!             let level = self.next % 2 == 0;
//!             if ctl.try_schedule(TimedEvent::new(self.next, level)).is_ok() {
//!                 self.next += 1;
//!             }
//!         }
//!         false
//!     }
//!
//!     fn map_to_absolute_time(&self, tick: &u64) -> Instant {
//!         self.origin + Duration::from_millis(100) * (*tick as u32)
//!     }
//! }
//!
//! let mut scheduler = EventScheduler::new(Blink { origin: Instant::now(), next: 0 });
//! scheduler.init_sched_thread(&RTSetup::default());
//! scheduler.event_loop();
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![deny(static_mut_refs)]
#![deny(unused_must_use)]

pub mod clock;
pub mod config;
pub mod control;
pub mod error;
pub mod event;
pub mod lateness;
pub mod producer;
pub mod rt_setup;
pub mod scheduler;
pub mod slot;
pub mod stats;

mod platform;

pub mod prelude;

pub use clock::{Clock, ManualClock, MonotonicClock, SleepRecord};
pub use config::{SchedulerConfig, SchedulerConfigBuilder};
pub use control::{LoopControl, StopHandle};
pub use error::{RTError, RTResult, SchedulerError, SchedulerResult, SlotOccupied};
pub use event::TimedEvent;
pub use lateness::{LatenessMetrics, LatenessPercentiles};
pub use producer::{EventProducer, IntervalHint};
pub use rt_setup::RTSetup;
pub use scheduler::EventScheduler;
pub use slot::PendingSlot;
pub use stats::LoopStats;

use std::time::Duration;

/// Default upper bound on a single idle sleep (40ms).
pub const DEFAULT_MAX_SLEEP: Duration = Duration::from_millis(40);

/// Hard ceiling for the configurable sleep bound (1 hour).
pub const MAX_SLEEP_LIMIT: Duration = Duration::from_secs(3600);

/// Number of consecutive busy idle-hook calls after which a `Wide` hint is forced.
pub const DEFAULT_WIDE_HINT_PERIOD: u32 = 2048;
