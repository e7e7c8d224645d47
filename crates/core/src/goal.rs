//! Personal fitness goals.

use serde::{Deserialize, Serialize};
use crate::error::ValidationError;

/// Goals the user tracks against. Zero means "not set".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessGoals {
    /// Target fasting window in hours
    pub fasting_hours: f64,

    /// Target weight in kilograms
    pub target_weight: f64,

    /// Target body fat percentage
    pub target_fat_percentage: f64,

    /// Target muscle percentage
    pub target_muscle_percentage: f64,

    /// Push-ups per workout
    pub target_pushups: f64,

    /// Sit-ups per workout
    pub target_situps: f64,

    /// Plank minutes per workout
    pub target_plank_minutes: f64,
}

impl Default for FitnessGoals {
    fn default() -> Self {
        Self {
            fasting_hours: 16.0,
            target_weight: 0.0,
            target_fat_percentage: 0.0,
            target_muscle_percentage: 0.0,
            target_pushups: 0.0,
            target_situps: 0.0,
            target_plank_minutes: 0.0,
        }
    }
}

/// Keys accepted by [`FitnessGoals::set`].
pub const GOAL_KEYS: &[&str] = &[
    "fasting_hours",
    "target_weight",
    "target_fat_percentage",
    "target_muscle_percentage",
    "target_pushups",
    "target_situps",
    "target_plank_minutes",
];

impl FitnessGoals {
    /// Fasting target expressed in minutes.
    pub fn fasting_target_minutes(&self) -> f64 {
        self.fasting_hours * 60.0
    }

    /// Update one goal by key.
    pub fn set(&mut self, key: &str, value: f64) -> Result<(), ValidationError> {
        if !value.is_finite() || value < 0.0 {
            return Err(ValidationError::InvalidGoalValue {
                key: key.to_string(),
                value,
            });
        }

        let slot = match key {
            "fasting_hours" => &mut self.fasting_hours,
            "target_weight" => &mut self.target_weight,
            "target_fat_percentage" => &mut self.target_fat_percentage,
            "target_muscle_percentage" => &mut self.target_muscle_percentage,
            "target_pushups" => &mut self.target_pushups,
            "target_situps" => &mut self.target_situps,
            "target_plank_minutes" => &mut self.target_plank_minutes,
            other => return Err(ValidationError::UnknownGoal(other.to_string())),
        };
        *slot = value;
        Ok(())
    }

    /// All goals as `(key, value)` pairs, in display order.
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("fasting_hours", self.fasting_hours),
            ("target_weight", self.target_weight),
            ("target_fat_percentage", self.target_fat_percentage),
            ("target_muscle_percentage", self.target_muscle_percentage),
            ("target_pushups", self.target_pushups),
            ("target_situps", self.target_situps),
            ("target_plank_minutes", self.target_plank_minutes),
        ]
    }
}
