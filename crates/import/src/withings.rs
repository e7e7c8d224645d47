//! Withings measurement payloads and their mapping to local fields.
//!
//! The provider reports each reading as `(value, unit)` meaning
//! `value × 10^unit`, grouped into measure groups that share a timestamp.
//! Which numeric type code means what is a versioned provider contract, so it
//! is carried by a [`MeasureTable`] rather than matched inline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// One reading inside a measure group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    /// Mantissa
    pub value: i64,

    /// Power-of-ten exponent
    pub unit: i32,

    /// Provider type code
    #[serde(rename = "type")]
    pub measure_type: i32,
}

impl Measure {
    /// `value × 10^unit`.
    pub fn decoded(&self) -> f64 {
        // Negative exponents divide: 82450e-3 must equal 82.45 exactly.
        if self.unit >= 0 {
            self.value as f64 * 10f64.powi(self.unit)
        } else {
            self.value as f64 / 10f64.powi(-self.unit)
        }
    }
}

/// Readings taken together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureGroup {
    /// Unix seconds
    pub date: i64,

    /// Readings in this group
    #[serde(default)]
    pub measures: Vec<Measure>,
}

/// Response envelope of the provider's `getmeas` action.
#[derive(Debug, Clone, Deserialize)]
pub struct MeasureEnvelope {
    /// 0 on success
    pub status: i32,

    /// Present on success
    #[serde(default)]
    pub body: Option<MeasureBody>,

    /// Provider error text
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of a successful `getmeas` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeasureBody {
    /// Measure groups, in any order
    #[serde(default)]
    pub measuregrps: Vec<MeasureGroup>,
}

/// Local field a provider code maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureKind {
    /// Body weight, kg
    Weight,
    /// Fat ratio, %
    FatRatio,
    /// Muscle mass, kg; converted to a percentage of weight
    MuscleMass,
    /// Muscle ratio, %
    MusclePercentage,
}

/// Provider type code → local field.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureTable {
    kinds: BTreeMap<i32, MeasureKind>,
}

impl MeasureTable {
    /// Empty table.
    pub fn new() -> Self {
        Self { kinds: BTreeMap::new() }
    }

    /// Add a mapping.
    pub fn with(mut self, code: i32, kind: MeasureKind) -> Self {
        self.kinds.insert(code, kind);
        self
    }

    /// Current Withings codes: 1 weight, 6 fat ratio, 76 muscle mass.
    pub fn withings() -> Self {
        Self::new()
            .with(1, MeasureKind::Weight)
            .with(6, MeasureKind::FatRatio)
            .with(76, MeasureKind::MuscleMass)
    }

    /// Mapping used by older deployments of the intermediary: 1 weight,
    /// 8 fat ratio, 6 muscle mass.
    pub fn legacy() -> Self {
        Self::new()
            .with(1, MeasureKind::Weight)
            .with(8, MeasureKind::FatRatio)
            .with(6, MeasureKind::MuscleMass)
    }

    /// Kind for a code.
    pub fn kind(&self, code: i32) -> Option<MeasureKind> {
        self.kinds.get(&code).copied()
    }

    /// Codes to request, ascending.
    pub fn codes(&self) -> Vec<i32> {
        self.kinds.keys().copied().collect()
    }
}

impl Default for MeasureTable {
    fn default() -> Self {
        Self::withings()
    }
}

/// Most recent body-composition reading, ready to pre-fill a weight entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedMeasurement {
    /// Weight, kg
    pub weight: Option<f64>,

    /// Fat, %
    pub fat_percentage: Option<f64>,

    /// Muscle, %
    pub muscle_percentage: Option<f64>,

    /// When the provider recorded it
    pub observed_at: DateTime<Utc>,
}

/// Map the newest group in `groups` to an [`ImportedMeasurement`].
///
/// Older groups are discarded. Returns `None` when there are no groups or the
/// newest one carries none of the codes in `table`.
pub fn latest_measurement(groups: &[MeasureGroup], table: &MeasureTable) -> Option<ImportedMeasurement> {
    let latest = groups.iter().max_by_key(|g| g.date)?;
    let Some(observed_at) = DateTime::from_timestamp(latest.date, 0) else {
        warn!("Discarding measure group with invalid timestamp {}", latest.date);
        return None;
    };

    let mut weight = None;
    let mut fat_percentage = None;
    let mut muscle_mass = None;
    let mut muscle_percentage = None;

    for measure in &latest.measures {
        match table.kind(measure.measure_type) {
            Some(MeasureKind::Weight) => weight = Some(measure.decoded()),
            Some(MeasureKind::FatRatio) => fat_percentage = Some(measure.decoded()),
            Some(MeasureKind::MuscleMass) => muscle_mass = Some(measure.decoded()),
            Some(MeasureKind::MusclePercentage) => muscle_percentage = Some(measure.decoded()),
            None => debug!("Ignoring measure type {}", measure.measure_type),
        }
    }

    if muscle_percentage.is_none() {
        muscle_percentage = match (muscle_mass, weight) {
            (Some(mass), Some(w)) if w > 0.0 => Some(mass * 100.0 / w),
            (Some(_), _) => {
                debug!("Muscle mass reported without a usable weight; skipping conversion");
                None
            }
            _ => None,
        };
    }

    if weight.is_none() && fat_percentage.is_none() && muscle_percentage.is_none() && muscle_mass.is_none() {
        return None;
    }

    Some(ImportedMeasurement {
        weight,
        fat_percentage,
        muscle_percentage,
        observed_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measure(measure_type: i32, value: i64, unit: i32) -> Measure {
        Measure { value, unit, measure_type }
    }

    #[test]
    fn test_decoded_applies_exponent() {
        assert_eq!(measure(1, 82450, -3).decoded(), 82.45);
        assert_eq!(measure(6, 215, -1).decoded(), 21.5);
        assert_eq!(measure(1, 8, 1).decoded(), 80.0);
    }

    #[test]
    fn test_latest_group_wins() {
        let groups = vec![
            MeasureGroup { date: 1_700_000_000, measures: vec![measure(1, 90000, -3)] },
            MeasureGroup { date: 1_700_090_000, measures: vec![measure(1, 80000, -3), measure(6, 200, -1)] },
            MeasureGroup { date: 1_699_000_000, measures: vec![measure(1, 70000, -3)] },
        ];

        let m = latest_measurement(&groups, &MeasureTable::withings()).unwrap();
        assert_eq!(m.weight, Some(80.0));
        assert_eq!(m.fat_percentage, Some(20.0));
        assert_eq!(m.muscle_percentage, None);
        assert_eq!(m.observed_at.timestamp(), 1_700_090_000);
    }

    #[test]
    fn test_muscle_mass_becomes_percentage() {
        let groups = vec![MeasureGroup {
            date: 1_700_000_000,
            measures: vec![measure(76, 32000, -3), measure(1, 80000, -3)],
        }];

        let m = latest_measurement(&groups, &MeasureTable::withings()).unwrap();
        assert_eq!(m.muscle_percentage, Some(40.0));
    }

    #[test]
    fn test_muscle_without_weight_is_skipped() {
        let groups = vec![MeasureGroup {
            date: 1_700_000_000,
            measures: vec![measure(76, 32000, -3), measure(6, 185, -1)],
        }];

        let m = latest_measurement(&groups, &MeasureTable::withings()).unwrap();
        assert_eq!(m.weight, None);
        assert_eq!(m.muscle_percentage, None);
        assert_eq!(m.fat_percentage, Some(18.5));
    }

    #[test]
    fn test_muscle_with_zero_weight_is_skipped() {
        let groups = vec![MeasureGroup {
            date: 1_700_000_000,
            measures: vec![measure(1, 0, 0), measure(76, 32000, -3)],
        }];

        let m = latest_measurement(&groups, &MeasureTable::withings()).unwrap();
        assert_eq!(m.weight, Some(0.0));
        assert_eq!(m.muscle_percentage, None);
    }

    #[test]
    fn test_muscle_percentage_code_decodes_directly() {
        let table = MeasureTable::withings().with(77, MeasureKind::MusclePercentage);
        let groups = vec![MeasureGroup {
            date: 1_700_000_000,
            measures: vec![measure(1, 80000, -3), measure(77, 415, -1)],
        }];

        let m = latest_measurement(&groups, &table).unwrap();
        assert_eq!(m.muscle_percentage, Some(41.5));
    }

    #[test]
    fn test_legacy_table() {
        let groups = vec![MeasureGroup {
            date: 1_700_000_000,
            measures: vec![measure(1, 80000, -3), measure(8, 220, -1), measure(6, 36000, -3)],
        }];

        let m = latest_measurement(&groups, &MeasureTable::legacy()).unwrap();
        assert_eq!(m.fat_percentage, Some(22.0));
        assert_eq!(m.muscle_percentage, Some(45.0));
    }

    #[test]
    fn test_empty_and_unknown() {
        assert!(latest_measurement(&[], &MeasureTable::withings()).is_none());

        let groups = vec![MeasureGroup { date: 1_700_000_000, measures: vec![measure(11, 60, 0)] }];
        assert!(latest_measurement(&groups, &MeasureTable::withings()).is_none());
    }

    #[test]
    fn test_codes_are_sorted() {
        assert_eq!(MeasureTable::withings().codes(), vec![1, 6, 76]);
        assert_eq!(MeasureTable::legacy().codes(), vec![1, 6, 8]);
    }

    #[test]
    fn test_envelope_parses() {
        let json = r#"{"status":0,"body":{"measuregrps":[{"date":1700000000,"measures":[{"value":82450,"unit":-3,"type":1}]}]}}"#;
        let envelope: MeasureEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.status, 0);
        assert_eq!(envelope.body.unwrap().measuregrps[0].measures[0].decoded(), 82.45);

        let failed: MeasureEnvelope = serde_json::from_str(r#"{"status":401,"error":"invalid_token"}"#).unwrap();
        assert_eq!(failed.error.as_deref(), Some("invalid_token"));
        assert!(failed.body.is_none());
    }
}
