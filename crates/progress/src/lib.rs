//! Elapsed-session progress tracking.
//!
//! Pure progress computation for timed sessions (fasting windows and the like)
//! and a cancellable observer that re-evaluates it on a fixed cadence.

#![warn(missing_docs)]

pub mod error;
pub mod clock;
pub mod estimator;
pub mod tracker;

pub use error::ProgressError;
pub use clock::{Clock, ManualClock, SystemClock};
pub use estimator::{compute_progress, format_hours_minutes, ProgressSnapshot, TimedSession};
pub use tracker::{observe, ObserveHandle, DEFAULT_TICK_INTERVAL};
