//! Fasting session model.

use serde::{Deserialize, Serialize};
use crate::error::ValidationError;
use crate::id::EntryId;
use crate::{Time, Timestamped};

/// A fasting session. Active while `end_time` is unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FastingSession {
    /// Unique identifier
    pub id: EntryId,

    /// When the fast started
    pub start_time: Time,

    /// When the fast ended
    pub end_time: Option<Time>,

    /// Whole minutes fasted, set on end
    pub duration_minutes: Option<i64>,
}

impl FastingSession {
    /// Start a new fast at `start_time`.
    pub fn start(start_time: Time) -> Self {
        Self {
            id: EntryId::new(),
            start_time,
            end_time: None,
            duration_minutes: None,
        }
    }

    /// Whether the fast is still running.
    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }

    /// End the fast at `now`, recording its duration in whole minutes.
    pub fn end(&mut self, now: Time) -> Result<(), ValidationError> {
        if !self.is_active() {
            return Err(ValidationError::AlreadyEnded);
        }
        let minutes = now.signed_duration_since(self.start_time).num_minutes().max(0);
        self.end_time = Some(now);
        self.duration_minutes = Some(minutes);
        Ok(())
    }
}

impl Timestamped for FastingSession {
    fn id(&self) -> EntryId {
        self.id
    }

    fn timestamp(&self) -> Time {
        self.start_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_end_records_duration() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap();
        let mut session = FastingSession::start(start);
        assert!(session.is_active());

        session.end(start + Duration::minutes(16 * 60 + 30)).unwrap();
        assert!(!session.is_active());
        assert_eq!(session.duration_minutes, Some(990));
    }

    #[test]
    fn test_end_twice_is_rejected() {
        let start = Utc::now();
        let mut session = FastingSession::start(start);
        session.end(start).unwrap();
        assert_eq!(session.end(start), Err(ValidationError::AlreadyEnded));
    }

    #[test]
    fn test_end_before_start_clamps_to_zero() {
        let start = Utc::now();
        let mut session = FastingSession::start(start);
        session.end(start - Duration::minutes(5)).unwrap();
        assert_eq!(session.duration_minutes, Some(0));
    }
}
