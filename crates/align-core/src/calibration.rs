//! Calibration cache (spec §4.9): a plain key-value record of each vacuum's
//! last-known alignment transform, persisted as JSON by the caller.
//!
//! Shared mutable access (a mutex around this whole structure) lives at the
//! boundary layer per spec §5 — this module only defines the data and its
//! get/update/recalibrate/serde semantics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::consts::RECALIBRATION_AREA_RATIO;
use crate::error::{AlignError, Result};
use crate::geometry::AffineMatrix;

/// One vacuum's calibration record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VacuumCalibration {
    pub transform: AffineMatrix,
    #[serde(rename = "lastUpdated")]
    pub last_updated: u64,
    #[serde(rename = "mapAreaAtCalibration")]
    pub map_area_at_calibration: f64,
}

/// The cache's wire shape: `{ referenceVacuum, vacuums, lastUpdated }`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CalibrationData {
    #[serde(rename = "referenceVacuum", default)]
    pub reference_vacuum: Option<String>,
    #[serde(default)]
    pub vacuums: HashMap<String, VacuumCalibration>,
    #[serde(rename = "lastUpdated", default)]
    pub last_updated: u64,
}

impl CalibrationData {
    pub fn get(&self, vacuum_id: &str) -> Option<&VacuumCalibration> {
        self.vacuums.get(vacuum_id)
    }

    /// Like [`Self::get`], but `Err(AlignError::UnknownVacuum)` instead of
    /// `None` — for a caller that has already committed to a vacuum id (e.g.
    /// applying a cached transform) and treats a missing entry as a bug
    /// rather than a normal "not yet calibrated" state.
    pub fn require(&self, vacuum_id: &str) -> Result<&VacuumCalibration> {
        self.get(vacuum_id)
            .ok_or_else(|| AlignError::UnknownVacuum(vacuum_id.to_string()))
    }

    pub fn update(
        &mut self,
        vacuum_id: impl Into<String>,
        transform: AffineMatrix,
        now_epoch_secs: u64,
        map_area: f64,
    ) {
        self.vacuums.insert(
            vacuum_id.into(),
            VacuumCalibration {
                transform,
                last_updated: now_epoch_secs,
                map_area_at_calibration: map_area,
            },
        );
        self.last_updated = now_epoch_secs;
    }

    /// `true` if `vacuum_id` has no entry, its map has grown to at least
    /// [`RECALIBRATION_AREA_RATIO`] of the area recorded at last
    /// calibration (staleness guard), or the last calibration predates
    /// `now_epoch_secs - debounce_secs`.
    pub fn should_recalibrate(
        &self,
        vacuum_id: &str,
        current_map_area: f64,
        now_epoch_secs: u64,
        debounce_secs: u64,
    ) -> bool {
        let Some(entry) = self.get(vacuum_id) else {
            return true;
        };
        if entry.map_area_at_calibration <= 0.0 {
            return true;
        }
        let area_ratio = current_map_area / entry.map_area_at_calibration;
        if area_ratio >= RECALIBRATION_AREA_RATIO {
            return true;
        }
        now_epoch_secs.saturating_sub(entry.last_updated) > debounce_secs
    }

    /// Serialise to the wire JSON shape documented in spec §6.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse either the current shape or the legacy shape, where each
    /// `vacuums` entry was a bare `AffineMatrix` instead of a
    /// `VacuumCalibration` object. Detected by probing the first `vacuums`
    /// value for a `transform` key, rather than a fallible `untagged` enum
    /// (untagged gives poor error messages on genuinely malformed input).
    pub fn from_json(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        if is_legacy_shape(&value) {
            return Ok(promote_legacy(value));
        }
        Ok(serde_json::from_value(value)?)
    }
}

fn is_legacy_shape(value: &Value) -> bool {
    let Some(first) = value.get("vacuums").and_then(Value::as_object).and_then(|m| m.values().next())
    else {
        return false;
    };
    !first.is_object() || !first.as_object().unwrap().contains_key("transform")
}

fn promote_legacy(value: Value) -> CalibrationData {
    let reference_vacuum = value
        .get("referenceVacuum")
        .and_then(Value::as_str)
        .map(String::from);
    let last_updated = value.get("lastUpdated").and_then(Value::as_u64).unwrap_or(0);

    let mut vacuums = HashMap::new();
    if let Some(map) = value.get("vacuums").and_then(Value::as_object) {
        for (id, entry) in map {
            if let Ok(transform) = serde_json::from_value::<AffineMatrix>(entry.clone()) {
                vacuums.insert(
                    id.clone(),
                    VacuumCalibration {
                        transform,
                        last_updated,
                        map_area_at_calibration: 0.0,
                    },
                );
            }
        }
    }

    CalibrationData {
        reference_vacuum,
        vacuums,
        last_updated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_errors_on_unknown_vacuum() {
        let cache = CalibrationData::default();
        assert!(matches!(cache.require("vac-1"), Err(AlignError::UnknownVacuum(id)) if id == "vac-1"));
    }

    #[test]
    fn require_returns_entry_when_present() {
        let mut cache = CalibrationData::default();
        cache.update("vac-1", AffineMatrix::identity(), 0, 1000.0);
        assert!(cache.require("vac-1").is_ok());
    }

    #[test]
    fn missing_entry_should_recalibrate() {
        let cache = CalibrationData::default();
        assert!(cache.should_recalibrate("vac-1", 1000.0, 100, 60));
    }

    #[test]
    fn stale_area_triggers_recalibration() {
        let mut cache = CalibrationData::default();
        cache.update("vac-1", AffineMatrix::identity(), 0, 1000.0);
        assert!(cache.should_recalibrate("vac-1", 850.0, 10, 600));
        assert!(!cache.should_recalibrate("vac-1", 700.0, 10, 600));
    }

    #[test]
    fn debounce_interval_triggers_recalibration() {
        let mut cache = CalibrationData::default();
        cache.update("vac-1", AffineMatrix::identity(), 0, 1000.0);
        assert!(cache.should_recalibrate("vac-1", 700.0, 10_000, 600));
        assert!(!cache.should_recalibrate("vac-1", 700.0, 100, 600));
    }

    #[test]
    fn round_trips_current_shape() {
        let mut cache = CalibrationData::default();
        cache.update("vac-1", AffineMatrix::rotation_deg(12.0), 42, 500.0);
        let json = cache.to_json().unwrap();
        let restored = CalibrationData::from_json(&json).unwrap();
        let entry = restored.get("vac-1").unwrap();
        assert_eq!(entry.last_updated, 42);
        assert!((entry.transform.a - cache.get("vac-1").unwrap().transform.a).abs() < 1e-12);
    }

    #[test]
    fn accepts_legacy_bare_transform_shape() {
        let raw = r#"{
            "referenceVacuum": "vac-1",
            "vacuums": {
                "vac-1": { "a": 1.0, "b": 0.0, "tx": 5.0, "c": 0.0, "d": 1.0, "ty": -5.0 }
            },
            "lastUpdated": 100
        }"#;
        let cache = CalibrationData::from_json(raw).unwrap();
        let entry = cache.get("vac-1").unwrap();
        assert_eq!(entry.transform.tx, 5.0);
        assert_eq!(entry.map_area_at_calibration, 0.0);
    }
}
