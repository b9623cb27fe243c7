//! Shared test utilities for printloop.
//!
//! # Modules
//!
//! - [`mod@must`] - Unwrap helpers with good error messages and `#[track_caller]`
//! - [`producer`] - A scripted, journaling [`EventProducer`](printloop_scheduler::EventProducer)
//! - [`prelude`] - Convenience re-exports
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! printloop-test-helpers = { path = "crates/printloop-test-helpers" }
//! ```
//!
//! ```rust
//! use printloop_test_helpers::prelude::*;
//! use printloop_scheduler::prelude::*;
//! use std::sync::Arc;
//!
//! let clock = Arc::new(ManualClock::new());
//! let producer = ScriptedProducer::<u32>::new(Arc::clone(&clock)).exit_after(1);
//! let mut scheduler = EventScheduler::with_clock(producer, clock);
//! scheduler.event_loop();
//! assert_eq!(scheduler.producer().idle_calls(), 1);
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![allow(clippy::unwrap_used, clippy::panic)]

pub mod must;
pub mod prelude;
pub mod producer;

pub use must::*;
pub use producer::{Call, IdleScript, ScriptedProducer, event_at};
