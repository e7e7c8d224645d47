//! Validation errors for entries and goals.

/// Errors raised when an entry or goal value is rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Weight must be a positive, finite number of kilograms
    #[error("invalid weight: {0} (must be greater than 0)")]
    InvalidWeight(f64),

    /// Percentages must be within 0..=100
    #[error("invalid {field}: {value} (must be between 0 and 100)")]
    InvalidPercentage {
        /// Which field was rejected
        field: &'static str,
        /// The rejected value
        value: f64,
    },

    /// Sleep quality outside 1..=5
    #[error("invalid sleep quality: {0} (must be 1-5)")]
    InvalidSleepQuality(u8),

    /// Sleep hours outside 0..=24
    #[error("invalid sleep hours: {0} (must be between 0 and 24)")]
    InvalidSleepHours(f64),

    /// The fasting session was already ended
    #[error("fasting session already ended")]
    AlreadyEnded,

    /// Reading was already logged for the day
    #[error("reading already logged for {0}")]
    AlreadyLoggedToday(chrono::NaiveDate),

    /// Unknown goal key
    #[error("unknown goal: {0}")]
    UnknownGoal(String),

    /// Goal values must be finite and non-negative
    #[error("invalid value for goal {key}: {value}")]
    InvalidGoalValue {
        /// Goal key
        key: String,
        /// The rejected value
        value: f64,
    },
}
