//! Workout, sleep and reading entries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::error::ValidationError;
use crate::id::EntryId;
use crate::{Time, Timestamped};

/// Workout counts for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutEntry {
    /// Unique identifier
    pub id: EntryId,

    /// When it was logged
    pub recorded_at: Time,

    /// Push-up count
    pub pushups: u32,

    /// Sit-up count
    pub situps: u32,

    /// Plank hold in seconds
    pub plank_seconds: u32,
}

impl WorkoutEntry {
    /// Create a workout entry.
    pub fn new(recorded_at: Time, pushups: u32, situps: u32, plank_seconds: u32) -> Self {
        Self {
            id: EntryId::new(),
            recorded_at,
            pushups,
            situps,
            plank_seconds,
        }
    }
}

impl Timestamped for WorkoutEntry {
    fn id(&self) -> EntryId {
        self.id
    }

    fn timestamp(&self) -> Time {
        self.recorded_at
    }
}

/// Subjective sleep quality on a 1-5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SleepQuality(u8);

impl SleepQuality {
    /// Create from a 1-5 rating.
    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::InvalidSleepQuality(value))
        }
    }

    /// Numeric rating.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Human label for the rating.
    pub fn label(&self) -> &'static str {
        match self.0 {
            1 => "Horrible",
            2 => "Poor",
            3 => "Neutral",
            4 => "Good",
            _ => "Excellent",
        }
    }
}

impl TryFrom<u8> for SleepQuality {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SleepQuality> for u8 {
    fn from(q: SleepQuality) -> Self {
        q.0
    }
}

/// One night of sleep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepEntry {
    /// Unique identifier
    pub id: EntryId,

    /// When it was logged
    pub recorded_at: Time,

    /// Quality rating
    pub quality: SleepQuality,

    /// Hours slept
    pub hours: f64,
}

impl SleepEntry {
    /// Create a validated sleep entry.
    pub fn new(recorded_at: Time, quality: SleepQuality, hours: f64) -> Result<Self, ValidationError> {
        if !hours.is_finite() || !(0.0..=24.0).contains(&hours) {
            return Err(ValidationError::InvalidSleepHours(hours));
        }
        Ok(Self {
            id: EntryId::new(),
            recorded_at,
            quality,
            hours,
        })
    }
}

impl Timestamped for SleepEntry {
    fn id(&self) -> EntryId {
        self.id
    }

    fn timestamp(&self) -> Time {
        self.recorded_at
    }
}

/// A day on which reading was completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingEntry {
    /// Unique identifier
    pub id: EntryId,

    /// When it was logged
    pub recorded_at: Time,
}

impl ReadingEntry {
    /// Log reading at `now`, unless `existing` already holds an entry for the same day.
    pub fn log(now: Time, existing: &[ReadingEntry]) -> Result<Self, ValidationError> {
        let today = now.date_naive();
        if completed_on(existing, today) {
            return Err(ValidationError::AlreadyLoggedToday(today));
        }
        Ok(Self {
            id: EntryId::new(),
            recorded_at: now,
        })
    }
}

/// Whether any entry falls on `day` (UTC).
pub fn completed_on(entries: &[ReadingEntry], day: NaiveDate) -> bool {
    entries.iter().any(|e| e.recorded_at.date_naive() == day)
}

impl Timestamped for ReadingEntry {
    fn id(&self) -> EntryId {
        self.id
    }

    fn timestamp(&self) -> Time {
        self.recorded_at
    }
}
