//! Provider export templates.
//!
//! A template describes how one export provider (LinkedIn, Indeed, a personal
//! spreadsheet, ...) lays out its columns and which canonical field each
//! column carries.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::field::CanonicalField;

fn default_confidence() -> f64 {
    1.0
}

/// One provider column and the canonical field it carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    /// Column header as the provider writes it.
    pub csv_column: String,
    /// Target canonical field.
    pub canonical_field: CanonicalField,
    /// Prior confidence that this column carries the field (0.0 to 1.0).
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    /// Whether an upload claiming this template must provide the column.
    #[serde(default)]
    pub required: bool,
}

impl FieldMapping {
    pub fn required(csv_column: impl Into<String>, canonical_field: CanonicalField) -> Self {
        Self {
            csv_column: csv_column.into(),
            canonical_field,
            confidence: 1.0,
            required: true,
        }
    }

    pub fn optional(csv_column: impl Into<String>, canonical_field: CanonicalField) -> Self {
        Self {
            csv_column: csv_column.into(),
            canonical_field,
            confidence: 1.0,
            required: false,
        }
    }
}

/// A named description of one provider's export layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Provider tag (e.g. "linkedin", "custom").
    pub source: String,
    pub mappings: Vec<FieldMapping>,
    /// Example rows, one cell per mapping in mapping order.
    #[serde(default)]
    pub sample_rows: Vec<Vec<String>>,
}

impl Template {
    /// Builds a template and checks its invariants.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        source: impl Into<String>,
        mappings: Vec<FieldMapping>,
        sample_rows: Vec<Vec<String>>,
    ) -> Result<Self> {
        let template = Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            source: source.into(),
            mappings,
            sample_rows,
        };
        template.validate()?;
        Ok(template)
    }

    /// Checks the template invariants.
    ///
    /// Exactly one mapping targets `company` and it is required. Canonical
    /// fields and column names (case-insensitive) are unique, and every sample
    /// row has one cell per mapping.
    pub fn validate(&self) -> Result<()> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(ModelError::invalid_template(&self.id, "id must not be empty"));
        }
        if self.mappings.is_empty() {
            return Err(ModelError::invalid_template(id, "no field mappings"));
        }

        let company: Vec<&FieldMapping> = self
            .mappings
            .iter()
            .filter(|m| m.canonical_field == CanonicalField::Company)
            .collect();
        match company.as_slice() {
            [only] if only.required => {}
            [_] => {
                return Err(ModelError::invalid_template(
                    id,
                    "company mapping must be required",
                ));
            }
            [] => return Err(ModelError::invalid_template(id, "missing company mapping")),
            _ => {
                return Err(ModelError::invalid_template(
                    id,
                    "company is mapped more than once",
                ));
            }
        }

        let mut fields = BTreeSet::new();
        let mut columns = BTreeSet::new();
        for mapping in &self.mappings {
            let column = mapping.csv_column.trim().to_lowercase();
            if column.is_empty() {
                return Err(ModelError::invalid_template(
                    id,
                    format!("empty column name for {}", mapping.canonical_field),
                ));
            }
            if !fields.insert(mapping.canonical_field) {
                return Err(ModelError::invalid_template(
                    id,
                    format!("{} is mapped more than once", mapping.canonical_field),
                ));
            }
            if !columns.insert(column) {
                return Err(ModelError::invalid_template(
                    id,
                    format!("column '{}' is used more than once", mapping.csv_column),
                ));
            }
            if !(0.0..=1.0).contains(&mapping.confidence) {
                return Err(ModelError::invalid_template(
                    id,
                    format!("confidence for '{}' is outside [0, 1]", mapping.csv_column),
                ));
            }
        }

        for (row_idx, row) in self.sample_rows.iter().enumerate() {
            if row.len() != self.mappings.len() {
                return Err(ModelError::invalid_template(
                    id,
                    format!(
                        "sample row {row_idx} has {} cells, expected {}",
                        row.len(),
                        self.mappings.len()
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Rows to show under the headers of an exported skeleton: the sample
    /// rows, or one row of placeholder values when the template has none.
    pub fn example_rows(&self) -> Vec<Vec<String>> {
        if !self.sample_rows.is_empty() {
            return self.sample_rows.clone();
        }
        vec![
            self.mappings
                .iter()
                .map(|m| m.canonical_field.example().to_string())
                .collect(),
        ]
    }

    /// Column headers in declaration order.
    pub fn headers(&self) -> Vec<&str> {
        self.mappings.iter().map(|m| m.csv_column.as_str()).collect()
    }

    /// Canonical fields in declaration order.
    pub fn canonical_fields(&self) -> impl Iterator<Item = CanonicalField> + '_ {
        self.mappings.iter().map(|m| m.canonical_field)
    }

    pub fn mapping_for(&self, field: CanonicalField) -> Option<&FieldMapping> {
        self.mappings.iter().find(|m| m.canonical_field == field)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = CanonicalField> + '_ {
        self.mappings
            .iter()
            .filter(|m| m.required)
            .map(|m| m.canonical_field)
    }
}
