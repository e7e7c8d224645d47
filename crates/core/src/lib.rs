//! fitlog core data models.
//!
//! Log entries for fasting, weight, workouts, sleep and reading, plus the
//! user's fitness goals.

#![warn(missing_docs)]

mod id;
mod error;

mod fasting;
mod weight;
mod activity;
mod goal;
mod trend;

pub use id::EntryId;
pub use error::ValidationError;

pub use fasting::FastingSession;
pub use weight::WeightEntry;
pub use activity::{completed_on, ReadingEntry, SleepEntry, SleepQuality, WorkoutEntry};
pub use goal::{FitnessGoals, GOAL_KEYS};
pub use trend::Trend;

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;

/// A stored row with an identity and a time it is ordered by.
pub trait Timestamped {
    /// Row identifier.
    fn id(&self) -> EntryId;

    /// Time used for ordering.
    fn timestamp(&self) -> Time;
}
