//! Import attempt state machine.

use crate::error::{ImportError, Result};
use crate::withings::ImportedMeasurement;

/// Where an import attempt currently is.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportState {
    /// Not started
    Idle,
    /// Waiting for the intermediary to return an authorization URL
    AwaitingAuthorizationUrl,
    /// Consent surface open, waiting for a decisive signal
    AwaitingUserConsent,
    /// Token obtained, fetching the latest measurement
    AwaitingMeasurement,
    /// Finished; `None` means no recent data
    Completed(Option<ImportedMeasurement>),
    /// Cancelled by the user, a timeout, or a newer attempt
    Cancelled,
    /// Failed with a displayable reason
    Failed(String),
}

/// Inputs that move an attempt between states.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportEvent {
    /// User started the import
    Begin,
    /// Authorization URL received
    UrlReceived,
    /// Access token obtained
    TokenReceived,
    /// Measurement fetch finished
    MeasurementReceived(Option<ImportedMeasurement>),
    /// Attempt cancelled
    Cancel,
    /// Attempt failed
    Fail(String),
}

impl ImportEvent {
    fn name(&self) -> &'static str {
        match self {
            ImportEvent::Begin => "Begin",
            ImportEvent::UrlReceived => "UrlReceived",
            ImportEvent::TokenReceived => "TokenReceived",
            ImportEvent::MeasurementReceived(_) => "MeasurementReceived",
            ImportEvent::Cancel => "Cancel",
            ImportEvent::Fail(_) => "Fail",
        }
    }
}

impl ImportState {
    /// State name for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            ImportState::Idle => "Idle",
            ImportState::AwaitingAuthorizationUrl => "AwaitingAuthorizationUrl",
            ImportState::AwaitingUserConsent => "AwaitingUserConsent",
            ImportState::AwaitingMeasurement => "AwaitingMeasurement",
            ImportState::Completed(_) => "Completed",
            ImportState::Cancelled => "Cancelled",
            ImportState::Failed(_) => "Failed",
        }
    }

    /// Whether the attempt is over. Terminal attempts are never resumed.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ImportState::Completed(_) | ImportState::Cancelled | ImportState::Failed(_)
        )
    }

    /// The state reached by applying `event`.
    pub fn next(&self, event: ImportEvent) -> Result<ImportState> {
        use ImportEvent as E;
        use ImportState as S;

        let next = match (self, event) {
            (S::Idle, E::Begin) => S::AwaitingAuthorizationUrl,
            (S::AwaitingAuthorizationUrl, E::UrlReceived) => S::AwaitingUserConsent,
            (S::AwaitingUserConsent, E::TokenReceived) => S::AwaitingMeasurement,
            (S::AwaitingMeasurement, E::MeasurementReceived(m)) => S::Completed(m),
            (s, E::Cancel) if !s.is_terminal() => S::Cancelled,
            (s, E::Fail(reason)) if !s.is_terminal() => S::Failed(reason),
            (s, event) => {
                return Err(ImportError::InvalidTransition {
                    from: s.name(),
                    event: event.name(),
                })
            }
        };
        Ok(next)
    }
}
