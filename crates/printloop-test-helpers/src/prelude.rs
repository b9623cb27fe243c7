//! Convenience re-exports for common test utilities.
//!
//! ```rust
//! use printloop_test_helpers::prelude::*;
//! ```

pub use crate::must::{must, must_some, must_with};
pub use crate::producer::{Call, IdleScript, ScriptedProducer, event_at};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
