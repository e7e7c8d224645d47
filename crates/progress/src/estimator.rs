//! Elapsed-time progress toward a target duration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::error::ProgressError;

const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// A session being timed against a target duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedSession {
    start: DateTime<Utc>,
    target_minutes: f64,
}

impl TimedSession {
    /// Create a session. The target must be a positive, finite number of minutes.
    pub fn new(start: DateTime<Utc>, target_minutes: f64) -> Result<Self, ProgressError> {
        if !target_minutes.is_finite() || target_minutes <= 0.0 {
            return Err(ProgressError::InvalidConfiguration(format!(
                "target duration must be greater than 0 minutes, got {}",
                target_minutes
            )));
        }
        Ok(Self { start, target_minutes })
    }

    /// When the session started.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Target duration in minutes.
    pub fn target_minutes(&self) -> f64 {
        self.target_minutes
    }

    /// Progress as of `now`.
    pub fn progress_at(&self, now: DateTime<Utc>) -> ProgressSnapshot {
        compute_progress(now, self.start, self.target_minutes)
    }
}

/// Point-in-time progress of a [`TimedSession`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// 0..=100
    pub percent_complete: f64,

    /// Minutes since start, never negative
    pub elapsed_minutes: f64,

    /// Minutes until the target, never negative
    pub remaining_minutes: f64,

    /// Whether the target has been reached (inclusive)
    pub goal_reached: bool,
}

impl ProgressSnapshot {
    /// Remaining time as `"{h}h {m}m"`.
    pub fn remaining_label(&self) -> String {
        format_hours_minutes(self.remaining_minutes)
    }

    /// Elapsed time as `"{h}h {m}m"`.
    pub fn elapsed_label(&self) -> String {
        format_hours_minutes(self.elapsed_minutes)
    }
}

/// Map `(now, start, target)` to a snapshot.
///
/// `target_minutes` is assumed positive; use [`TimedSession::new`] to validate it.
/// A `now` before `start` counts as zero elapsed time.
pub fn compute_progress(
    now: DateTime<Utc>,
    start: DateTime<Utc>,
    target_minutes: f64,
) -> ProgressSnapshot {
    let elapsed_ms = now.signed_duration_since(start).num_milliseconds() as f64;
    let elapsed_minutes = (elapsed_ms / MILLIS_PER_MINUTE).max(0.0);

    ProgressSnapshot {
        percent_complete: (elapsed_minutes / target_minutes * 100.0).min(100.0),
        elapsed_minutes,
        remaining_minutes: (target_minutes - elapsed_minutes).max(0.0),
        goal_reached: elapsed_minutes >= target_minutes,
    }
}

/// Format minutes as whole hours and minutes, e.g. `"7h 5m"`.
pub fn format_hours_minutes(minutes: f64) -> String {
    let minutes = minutes.max(0.0);
    let hours = (minutes / 60.0).floor();
    let mins = (minutes % 60.0).floor();
    format!("{}h {}m", hours as u64, mins as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 20, 0, 0).unwrap()
    }

    #[test]
    fn test_halfway() {
        let p = compute_progress(t0() + Duration::minutes(480), t0(), 960.0);
        assert_eq!(p.percent_complete, 50.0);
        assert_eq!(p.remaining_minutes, 480.0);
        assert_eq!(p.elapsed_minutes, 480.0);
        assert!(!p.goal_reached);
    }

    #[test]
    fn test_exactly_at_target() {
        let p = compute_progress(t0() + Duration::minutes(960), t0(), 960.0);
        assert_eq!(p.percent_complete, 100.0);
        assert_eq!(p.remaining_minutes, 0.0);
        assert!(p.goal_reached);
    }

    #[test]
    fn test_overshoot_is_clamped() {
        let p = compute_progress(t0() + Duration::minutes(1200), t0(), 960.0);
        assert_eq!(p.percent_complete, 100.0);
        assert_eq!(p.remaining_minutes, 0.0);
        assert_eq!(p.elapsed_minutes, 1200.0);
        assert!(p.goal_reached);
    }

    #[test]
    fn test_future_start_is_zero_progress() {
        let p = compute_progress(t0() - Duration::minutes(30), t0(), 960.0);
        assert_eq!(p.percent_complete, 0.0);
        assert_eq!(p.elapsed_minutes, 0.0);
        assert_eq!(p.remaining_minutes, 960.0);
        assert!(!p.goal_reached);
    }

    #[test]
    fn test_invalid_target_rejected() {
        assert!(matches!(
            TimedSession::new(t0(), 0.0),
            Err(ProgressError::InvalidConfiguration(_))
        ));
        assert!(TimedSession::new(t0(), -5.0).is_err());
        assert!(TimedSession::new(t0(), f64::NAN).is_err());
        assert!(TimedSession::new(t0(), f64::INFINITY).is_err());
    }

    #[test]
    fn test_labels() {
        let session = TimedSession::new(t0(), 960.0).unwrap();
        let p = session.progress_at(t0() + Duration::minutes(125) + Duration::seconds(30));
        assert_eq!(p.elapsed_label(), "2h 5m");
        assert_eq!(p.remaining_label(), "13h 54m");
    }

    proptest! {
        #[test]
        fn prop_bounds_hold_for_any_now(offset_ms in -10_000_000_000i64..10_000_000_000i64, target in 1.0f64..100_000.0) {
            let p = compute_progress(t0() + Duration::milliseconds(offset_ms), t0(), target);
            prop_assert!((0.0..=100.0).contains(&p.percent_complete));
            prop_assert!(p.elapsed_minutes >= 0.0);
            prop_assert!(p.remaining_minutes >= 0.0);
            prop_assert_eq!(p.goal_reached, p.elapsed_minutes >= target);
        }

        #[test]
        fn prop_percent_is_monotone(a in 0i64..5_000_000_000, b in 0i64..5_000_000_000, target in 1.0f64..100_000.0) {
            let (early, late) = if a <= b { (a, b) } else { (b, a) };
            let p1 = compute_progress(t0() + Duration::milliseconds(early), t0(), target);
            let p2 = compute_progress(t0() + Duration::milliseconds(late), t0(), target);
            prop_assert!(p1.percent_complete <= p2.percent_complete);
        }

        #[test]
        fn prop_idempotent(offset_ms in -1_000_000_000i64..5_000_000_000, target in 1.0f64..100_000.0) {
            let now = t0() + Duration::milliseconds(offset_ms);
            let p1 = compute_progress(now, t0(), target);
            let p2 = compute_progress(now, t0(), target);
            prop_assert_eq!(p1.percent_complete.to_bits(), p2.percent_complete.to_bits());
            prop_assert_eq!(p1.elapsed_minutes.to_bits(), p2.elapsed_minutes.to_bits());
            prop_assert_eq!(p1.remaining_minutes.to_bits(), p2.remaining_minutes.to_bits());
            prop_assert_eq!(p1.goal_reached, p2.goal_reached);
        }
    }
}
