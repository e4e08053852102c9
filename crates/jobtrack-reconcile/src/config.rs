//! Tunable thresholds for detection, mapping, grouping and recommendations.
//!
//! Every section deserializes with defaults for absent keys, so a config file
//! only needs to name what it overrides.

use jobtrack_map::MapperConfig;
use jobtrack_templates::DetectorConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ReconcileError, Result};

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Per-field weights of the duplicate composite score. Must sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldWeights {
    pub company: f64,
    pub position: f64,
    pub applied_date: f64,
    pub location: f64,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            company: 0.35,
            position: 0.35,
            applied_date: 0.20,
            location: 0.10,
        }
    }
}

impl FieldWeights {
    pub fn total(&self) -> f64 {
        self.company + self.position + self.applied_date + self.location
    }

    fn as_array(&self) -> [(&'static str, f64); 4] {
        [
            ("company", self.company),
            ("position", self.position),
            ("applied_date", self.applied_date),
            ("location", self.location),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicateConfig {
    /// Pairs scoring at or above this are linked (default: 0.70).
    pub min_confidence: f64,
    /// Dates at most this many days apart earn partial credit (default: 7).
    pub date_window_days: i64,
    /// Minimum similarity for a fuzzy company or position signal (default: 0.85).
    pub fuzzy_field_min: f64,
    /// Fuzzy signals score `fuzzy_field_factor * similarity` (default: 0.8).
    pub fuzzy_field_factor: f64,
    pub weights: FieldWeights,
}

impl Default for DuplicateConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.70,
            date_window_days: 7,
            fuzzy_field_min: 0.85,
            fuzzy_field_factor: 0.8,
            weights: FieldWeights::default(),
        }
    }
}

impl DuplicateConfig {
    #[must_use]
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    #[must_use]
    pub fn with_date_window_days(mut self, days: i64) -> Self {
        self.date_window_days = days;
        self
    }

    #[must_use]
    pub fn with_weights(mut self, weights: FieldWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, weight) in self.weights.as_array() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ReconcileError::invalid_config(format!(
                    "weight for {name} must be a non-negative number, got {weight}"
                )));
            }
        }
        let total = self.weights.total();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ReconcileError::invalid_config(format!(
                "duplicate weights must sum to 1, got {total}"
            )));
        }
        unit_interval("duplicates.min_confidence", self.min_confidence)?;
        unit_interval("duplicates.fuzzy_field_min", self.fuzzy_field_min)?;
        unit_interval("duplicates.fuzzy_field_factor", self.fuzzy_field_factor)?;
        if self.date_window_days < 0 {
            return Err(ReconcileError::invalid_config(
                "duplicates.date_window_days must not be negative",
            ));
        }
        Ok(())
    }
}

/// Group confidence cut-offs for suggested actions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationThresholds {
    /// At or above: recommend merge (default: 0.9).
    pub merge: f64,
    /// At or above (and below `merge`): recommend skip (default: 0.7).
    pub skip: f64,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            merge: 0.9,
            skip: 0.7,
        }
    }
}

impl RecommendationThresholds {
    pub fn validate(&self) -> Result<()> {
        unit_interval("recommendations.merge", self.merge)?;
        unit_interval("recommendations.skip", self.skip)?;
        if self.skip > self.merge {
            return Err(ReconcileError::invalid_config(
                "recommendations.skip must not exceed recommendations.merge",
            ));
        }
        Ok(())
    }
}

/// All reconciliation settings, as read from a config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    pub detection: DetectorConfig,
    pub mapping: MapperConfig,
    pub duplicates: DuplicateConfig,
    pub recommendations: RecommendationThresholds,
}

impl ReconcileConfig {
    pub fn validate(&self) -> Result<()> {
        unit_interval("detection.min_confidence", self.detection.min_confidence)?;
        unit_interval("mapping.min_similarity", self.mapping.min_similarity)?;
        self.duplicates.validate()?;
        self.recommendations.validate()
    }
}

fn unit_interval(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ReconcileError::invalid_config(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        ReconcileConfig::default().validate().expect("valid defaults");
        assert!((FieldWeights::default().total() - 1.0).abs() < WEIGHT_TOLERANCE);
    }

    #[test]
    fn weights_must_sum_to_one() {
        let config = DuplicateConfig::default().with_weights(FieldWeights {
            company: 0.5,
            ..FieldWeights::default()
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sum to 1"), "{err}");
    }

    #[test]
    fn negative_weights_are_rejected() {
        let config = DuplicateConfig::default().with_weights(FieldWeights {
            company: 0.55,
            location: -0.1,
            ..FieldWeights::default()
        });
        assert!(matches!(
            config.validate(),
            Err(ReconcileError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn thresholds_must_be_ordered() {
        let thresholds = RecommendationThresholds {
            merge: 0.6,
            skip: 0.8,
        };
        assert!(thresholds.validate().is_err());
    }
}
