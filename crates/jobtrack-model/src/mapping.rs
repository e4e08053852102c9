use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::field::CanonicalField;

/// How a header was matched to its canonical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Case-insensitive equality with a known column name.
    Exact,
    /// Normalized similarity above the mapper's threshold.
    Fuzzy,
}

/// One canonical field bound to a source header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedColumn {
    pub field: CanonicalField,
    pub header: String,
    pub confidence: f64,
    pub match_kind: MatchKind,
}

/// Alignment of an upload's headers with a template's canonical fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMappingResult {
    pub template_id: String,
    /// Bound fields in template declaration order.
    pub mapping: Vec<MappedColumn>,
    /// Source headers consumed by no canonical field, in upload order.
    pub unmapped_headers: Vec<String>,
    /// Required fields left without a header.
    pub missing_fields: Vec<CanonicalField>,
}

impl FieldMappingResult {
    pub fn header_for(&self, field: CanonicalField) -> Option<&str> {
        self.mapping
            .iter()
            .find(|m| m.field == field)
            .map(|m| m.header.as_str())
    }

    pub fn confidence_for(&self, field: CanonicalField) -> Option<f64> {
        self.mapping
            .iter()
            .find(|m| m.field == field)
            .map(|m| m.confidence)
    }

    /// Mapped fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = CanonicalField> + '_ {
        self.mapping.iter().map(|m| m.field)
    }

    /// Canonical field to source header.
    pub fn header_map(&self) -> BTreeMap<CanonicalField, String> {
        self.mapping
            .iter()
            .map(|m| (m.field, m.header.clone()))
            .collect()
    }

    /// Canonical field to mapping confidence.
    pub fn confidence_map(&self) -> BTreeMap<CanonicalField, f64> {
        self.mapping.iter().map(|m| (m.field, m.confidence)).collect()
    }

    /// True when every required field found a header.
    pub fn is_complete(&self) -> bool {
        self.missing_fields.is_empty()
    }

    /// Mean confidence over mapped fields, if any.
    pub fn mean_confidence(&self) -> Option<f64> {
        if self.mapping.is_empty() {
            return None;
        }
        let sum: f64 = self.mapping.iter().map(|m| m.confidence).sum();
        Some(sum / self.mapping.len() as f64)
    }
}
