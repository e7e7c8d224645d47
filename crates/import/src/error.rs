//! Import adapter errors.

use std::fmt;

/// Why an import attempt was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The user closed the consent surface without finishing
    SurfaceClosed,
    /// No decisive consent signal arrived in time
    TimedOut,
    /// A newer attempt replaced this one
    Superseded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::SurfaceClosed => write!(f, "consent window closed"),
            CancelReason::TimedOut => write!(f, "timed out waiting for consent"),
            CancelReason::Superseded => write!(f, "superseded by a newer import"),
        }
    }
}

/// Errors that end an import attempt. None are retried automatically.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ImportError {
    /// The consent surface could not be shown
    #[error("consent window blocked: {0}")]
    ConsentSurfaceBlocked(String),

    /// Requesting the authorization URL failed
    #[error("authorization request failed: {0}")]
    AuthorizationRequestFailed(String),

    /// Exchanging the authorization code for a token failed
    #[error("token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// Fetching measurements failed
    #[error("measurement fetch failed: {0}")]
    MeasurementFetchFailed(String),

    /// The provider reported an error through the consent surface
    #[error("authorization rejected: {0}")]
    ConsentRejected(String),

    /// The attempt was cancelled
    #[error("import cancelled: {0}")]
    UserCancelled(CancelReason),

    /// The state machine was driven out of order
    #[error("invalid import transition from {from} on {event}")]
    InvalidTransition {
        /// State name
        from: &'static str,
        /// Event name
        event: &'static str,
    },
}

impl ImportError {
    /// Whether this error ends the attempt as cancelled rather than failed.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ImportError::UserCancelled(_))
    }
}

/// Result type for import operations.
pub type Result<T> = std::result::Result<T, ImportError>;
