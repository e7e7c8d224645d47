//! Drives one import attempt through the state machine.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::client::{AuthorizationService, MeasurementSource};
use crate::consent::{ConsentOutcome, ConsentSurface, ConsentWait};
use crate::error::{CancelReason, ImportError, Result};
use crate::state::{ImportEvent, ImportState};
use crate::token::ImportToken;
use crate::withings::{latest_measurement, ImportedMeasurement, MeasureTable};

/// Tunables for [`Importer`].
#[derive(Debug, Clone)]
pub struct ImportSettings {
    /// Give up waiting for consent after this long. `None` waits until the surface closes.
    pub consent_timeout: Option<Duration>,

    /// How far back to ask the provider for measurements
    pub lookback: chrono::Duration,

    /// Provider code table
    pub table: MeasureTable,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            consent_timeout: Some(Duration::from_secs(600)),
            lookback: chrono::Duration::hours(24),
            table: MeasureTable::withings(),
        }
    }
}

/// Runs measurement imports. At most one attempt is live: starting a new one
/// cancels the pending one.
pub struct Importer {
    auth: Arc<dyn AuthorizationService>,
    source: Arc<dyn MeasurementSource>,
    surface: Arc<dyn ConsentSurface>,
    settings: ImportSettings,
    current: Mutex<Option<(u64, oneshot::Sender<()>)>>,
    next_attempt: AtomicU64,
}

impl Importer {
    /// Create an importer.
    pub fn new(
        auth: Arc<dyn AuthorizationService>,
        source: Arc<dyn MeasurementSource>,
        surface: Arc<dyn ConsentSurface>,
    ) -> Self {
        Self {
            auth,
            source,
            surface,
            settings: ImportSettings::default(),
            current: Mutex::new(None),
            next_attempt: AtomicU64::new(1),
        }
    }

    /// Set settings.
    pub fn with_settings(mut self, settings: ImportSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Run a fresh import attempt.
    ///
    /// `Ok(None)` means the provider had no recent data. Errors are terminal
    /// for this attempt; [`ImportError::is_cancellation`] separates cancelled
    /// attempts from failed ones.
    pub async fn import(&self) -> Result<Option<ImportedMeasurement>> {
        let attempt = self.next_attempt.fetch_add(1, Ordering::SeqCst);
        let (cancel_tx, mut cancel_rx) = oneshot::channel();

        if let Some((previous, cancel)) = self.lock_current().replace((attempt, cancel_tx)) {
            info!("Import attempt {} superseded by {}", previous, attempt);
            let _ = cancel.send(());
        }
        info!("Import attempt {} started", attempt);

        let mut state = ImportState::Idle;
        let result = tokio::select! {
            result = self.drive(attempt, &mut state) => result,
            Ok(()) = &mut cancel_rx => Err(ImportError::UserCancelled(CancelReason::Superseded)),
        };

        if let Err(error) = &result {
            let event = if error.is_cancellation() {
                ImportEvent::Cancel
            } else {
                ImportEvent::Fail(error.to_string())
            };
            match state.next(event) {
                Ok(next) => state = next,
                Err(e) => warn!("Import attempt {}: {}", attempt, e),
            }
        }
        info!("Import attempt {} finished: {}", attempt, state.name());

        let mut current = self.lock_current();
        if matches!(current.as_ref(), Some((id, _)) if *id == attempt) {
            *current = None;
        }

        result
    }

    async fn drive(&self, attempt: u64, state: &mut ImportState) -> Result<Option<ImportedMeasurement>> {
        transition(attempt, state, ImportEvent::Begin)?;
        let url = self
            .auth
            .authorization_url()
            .await
            .map_err(|e| ImportError::AuthorizationRequestFailed(format!("{:#}", e)))?;

        transition(attempt, state, ImportEvent::UrlReceived)?;
        let wait = self.surface.open(&url)?;
        let token = self.await_consent(wait).await?;

        transition(attempt, state, ImportEvent::TokenReceived)?;
        let since = Utc::now() - self.settings.lookback;
        let groups = self
            .source
            .fetch_groups(&token, &self.settings.table.codes(), since)
            .await
            .map_err(|e| ImportError::MeasurementFetchFailed(format!("{:#}", e)))?;
        drop(token);

        let measurement = latest_measurement(&groups, &self.settings.table);
        if measurement.is_none() {
            info!("No recent measurements from provider");
        }
        transition(attempt, state, ImportEvent::MeasurementReceived(measurement.clone()))?;
        Ok(measurement)
    }

    async fn await_consent(&self, wait: ConsentWait) -> Result<ImportToken> {
        let outcome = match self.settings.consent_timeout {
            Some(limit) => tokio::time::timeout(limit, wait.decisive())
                .await
                .map_err(|_| ImportError::UserCancelled(CancelReason::TimedOut))?,
            None => wait.decisive().await,
        };

        match outcome {
            ConsentOutcome::Token(token) => Ok(token),
            ConsentOutcome::Code(code) => self
                .auth
                .exchange_token(&code)
                .await
                .map_err(|e| ImportError::TokenExchangeFailed(format!("{:#}", e))),
            ConsentOutcome::Error(message) => Err(ImportError::ConsentRejected(message)),
            ConsentOutcome::Closed => Err(ImportError::UserCancelled(CancelReason::SurfaceClosed)),
        }
    }

    fn lock_current(&self) -> MutexGuard<'_, Option<(u64, oneshot::Sender<()>)>> {
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn transition(attempt: u64, state: &mut ImportState, event: ImportEvent) -> Result<()> {
    let next = state.next(event)?;
    debug!("Import attempt {}: {} -> {}", attempt, state.name(), next.name());
    *state = next;
    Ok(())
}
