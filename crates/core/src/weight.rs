//! Body weight and composition entries.

use serde::{Deserialize, Serialize};
use crate::error::ValidationError;
use crate::id::EntryId;
use crate::{Time, Timestamped};

/// A body weight measurement, optionally with composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    /// Unique identifier
    pub id: EntryId,

    /// When it was measured
    pub recorded_at: Time,

    /// Weight in kilograms
    pub weight: f64,

    /// Body fat percentage
    pub fat_percentage: Option<f64>,

    /// Muscle percentage
    pub muscle_percentage: Option<f64>,
}

impl WeightEntry {
    /// Create a validated weight entry.
    pub fn new(
        recorded_at: Time,
        weight: f64,
        fat_percentage: Option<f64>,
        muscle_percentage: Option<f64>,
    ) -> Result<Self, ValidationError> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(ValidationError::InvalidWeight(weight));
        }
        check_percentage("fat percentage", fat_percentage)?;
        check_percentage("muscle percentage", muscle_percentage)?;

        Ok(Self {
            id: EntryId::new(),
            recorded_at,
            weight,
            fat_percentage,
            muscle_percentage,
        })
    }
}

fn check_percentage(field: &'static str, value: Option<f64>) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.is_finite() || !(0.0..=100.0).contains(&v) => {
            Err(ValidationError::InvalidPercentage { field, value: v })
        }
        _ => Ok(()),
    }
}

impl Timestamped for WeightEntry {
    fn id(&self) -> EntryId {
        self.id
    }

    fn timestamp(&self) -> Time {
        self.recorded_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_valid_entry() {
        let entry = WeightEntry::new(Utc::now(), 82.4, Some(18.5), None).unwrap();
        assert_eq!(entry.weight, 82.4);
        assert_eq!(entry.fat_percentage, Some(18.5));
    }

    #[test]
    fn test_rejects_non_positive_weight() {
        assert_eq!(
            WeightEntry::new(Utc::now(), 0.0, None, None),
            Err(ValidationError::InvalidWeight(0.0))
        );
        assert!(WeightEntry::new(Utc::now(), f64::NAN, None, None).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_percentage() {
        let err = WeightEntry::new(Utc::now(), 80.0, None, Some(120.0)).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidPercentage { field: "muscle percentage", .. }
        ));
    }
}
