//! Storage trait abstraction.

use async_trait::async_trait;
use fitlog_core::{
    EntryId, FastingSession, FitnessGoals, ReadingEntry, SleepEntry, WeightEntry, WorkoutEntry,
};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage abstraction for fitlog data.
///
/// Every table supports "append or update one row" and "read rows ordered by
/// time, oldest first".
#[async_trait]
pub trait Storage: Send + Sync {
    // === Fasting ===

    /// Save a fasting session (create or update).
    async fn save_fasting(&mut self, session: &FastingSession) -> Result<()>;

    /// Load a fasting session by ID.
    async fn load_fasting(&self, id: EntryId) -> Result<Option<FastingSession>>;

    /// List fasting sessions by start time.
    async fn list_fasting(&self) -> Result<Vec<FastingSession>>;

    // === Weight ===

    /// Save a weight entry.
    async fn save_weight(&mut self, entry: &WeightEntry) -> Result<()>;

    /// List weight entries by time.
    async fn list_weights(&self) -> Result<Vec<WeightEntry>>;

    // === Workouts ===

    /// Save a workout entry.
    async fn save_workout(&mut self, entry: &WorkoutEntry) -> Result<()>;

    /// List workout entries by time.
    async fn list_workouts(&self) -> Result<Vec<WorkoutEntry>>;

    // === Sleep ===

    /// Save a sleep entry.
    async fn save_sleep(&mut self, entry: &SleepEntry) -> Result<()>;

    /// List sleep entries by time.
    async fn list_sleep(&self) -> Result<Vec<SleepEntry>>;

    // === Reading ===

    /// Save a reading entry.
    async fn save_reading(&mut self, entry: &ReadingEntry) -> Result<()>;

    /// List reading entries by time.
    async fn list_reading(&self) -> Result<Vec<ReadingEntry>>;

    // === Goals ===

    /// Load goals, falling back to defaults when none were saved.
    async fn load_goals(&self) -> Result<FitnessGoals>;

    /// Persist goals.
    async fn save_goals(&mut self, goals: &FitnessGoals) -> Result<()>;

    /// The currently running fast, if any.
    async fn active_fasting(&self) -> Result<Option<FastingSession>> {
        Ok(self
            .list_fasting()
            .await?
            .into_iter()
            .rev()
            .find(|s| s.is_active()))
    }
}
