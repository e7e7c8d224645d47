//! Comparison of the latest value against the previous one.

use serde::{Deserialize, Serialize};

/// Direction of change between two readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    /// Increased
    Up,
    /// Decreased
    Down,
    /// Unchanged
    Flat,
    /// One side missing
    Unknown,
}

impl Trend {
    /// Compare `current` with `previous`.
    pub fn between(current: Option<f64>, previous: Option<f64>) -> Self {
        match (current, previous) {
            (Some(c), Some(p)) if c > p => Trend::Up,
            (Some(c), Some(p)) if c < p => Trend::Down,
            (Some(_), Some(_)) => Trend::Flat,
            _ => Trend::Unknown,
        }
    }

    /// Single-character marker for tables.
    pub fn symbol(&self) -> &'static str {
        match self {
            Trend::Up => "↑",
            Trend::Down => "↓",
            Trend::Flat | Trend::Unknown => "-",
        }
    }
}
