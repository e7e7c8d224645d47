//! Progress engine errors.

/// Errors raised when a tracked session or observer is set up.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProgressError {
    /// Target duration or tick interval is unusable
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}
