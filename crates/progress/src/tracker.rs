//! Periodic progress observation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::clock::Clock;
use crate::error::ProgressError;
use crate::estimator::{ProgressSnapshot, TimedSession};

/// Tick cadence used across fitlog.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Handle to a running observation. Cancelling (or dropping) it stops all future ticks.
#[derive(Debug)]
pub struct ObserveHandle {
    cancelled: Arc<AtomicBool>,
    task: AbortHandle,
}

impl ObserveHandle {
    /// Stop ticking. Safe to call any number of times.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            debug!("Progress observation cancelled");
        }
        self.task.abort();
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for ObserveHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Emit a snapshot for `session` now, then once per `interval` until cancelled.
///
/// The first snapshot is delivered before this function returns. Later ticks run
/// on a spawned tokio task; outside a runtime this fails with
/// [`ProgressError::InvalidConfiguration`] before any tick is delivered. Ticks
/// never overlap: each `on_tick` call returns before the next is scheduled, and
/// ticks missed while the callback was busy are skipped rather than bunched.
pub fn observe<C, F>(
    session: TimedSession,
    interval: Duration,
    clock: C,
    mut on_tick: F,
) -> Result<ObserveHandle, ProgressError>
where
    C: Clock + 'static,
    F: FnMut(ProgressSnapshot) + Send + 'static,
{
    if interval.is_zero() {
        return Err(ProgressError::InvalidConfiguration(
            "tick interval must be greater than zero".to_string(),
        ));
    }
    let runtime = Handle::try_current().map_err(|_| {
        ProgressError::InvalidConfiguration("observe requires a tokio runtime".to_string())
    })?;

    on_tick(session.progress_at(clock.now()));

    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = cancelled.clone();
    let task = runtime.spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if flag.load(Ordering::SeqCst) {
                break;
            }
            on_tick(session.progress_at(clock.now()));
        }
    });

    Ok(ObserveHandle {
        cancelled,
        task: task.abort_handle(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<ProgressSnapshot>>>, impl FnMut(ProgressSnapshot) + Send + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |p| sink.lock().unwrap().push(p))
    }

    fn session() -> (ManualClock, TimedSession) {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 20, 0, 0).unwrap();
        (ManualClock::new(start), TimedSession::new(start, 960.0).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_is_immediate() {
        let (clock, session) = session();
        let (seen, on_tick) = recorder();

        let _handle = observe(session, DEFAULT_TICK_INTERVAL, clock, on_tick).unwrap();

        assert_eq!(seen.lock().unwrap().len(), 1);
        assert_eq!(seen.lock().unwrap()[0].percent_complete, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_follow_the_clock() {
        let (clock, session) = session();
        let (seen, on_tick) = recorder();

        let handle = observe(session, Duration::from_secs(60), clock.clone(), on_tick).unwrap();

        clock.advance(chrono::Duration::minutes(480));
        tokio::time::sleep(Duration::from_secs(61)).await;

        let snapshots = seen.lock().unwrap().clone();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[1].percent_complete, 50.0);
        handle.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticks_and_is_idempotent() {
        let (clock, session) = session();
        let (seen, on_tick) = recorder();

        let handle = observe(session, DEFAULT_TICK_INTERVAL, clock, on_tick).unwrap();
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(seen.lock().unwrap().len(), 4);

        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(seen.lock().unwrap().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let (clock, session) = session();
        let (seen, on_tick) = recorder();

        drop(observe(session, DEFAULT_TICK_INTERVAL, clock, on_tick).unwrap());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_interval_rejected() {
        let (clock, session) = session();
        let (seen, on_tick) = recorder();

        let result = observe(session, Duration::ZERO, clock, on_tick);
        assert!(matches!(result, Err(ProgressError::InvalidConfiguration(_))));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_outside_runtime_is_rejected_without_ticking() {
        let (clock, session) = session();
        let (seen, on_tick) = recorder();

        let result = observe(session, DEFAULT_TICK_INTERVAL, clock, on_tick);
        assert!(matches!(result, Err(ProgressError::InvalidConfiguration(_))));
        assert!(seen.lock().unwrap().is_empty());
    }
}
