//! Record shapes flowing through an import session.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::field::CanonicalField;
use crate::mapping::FieldMappingResult;

/// Headers plus string rows as produced by an external file parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One row of an upload (or one stored record projected onto the upload's
/// headers), keyed by raw header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRecord {
    /// Position within the import batch, or within the existing snapshot.
    pub index: usize,
    /// True for records already present in storage.
    pub is_existing: bool,
    /// Storage identity of an existing record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_id: Option<String>,
    fields: Vec<(String, String)>,
}

impl ParsedRecord {
    /// A freshly uploaded record.
    pub fn new(index: usize, fields: Vec<(String, String)>) -> Self {
        Self {
            index,
            is_existing: false,
            existing_id: None,
            fields,
        }
    }

    /// A record already present in storage.
    pub fn existing(index: usize, id: impl Into<String>, fields: Vec<(String, String)>) -> Self {
        Self {
            index,
            is_existing: true,
            existing_id: Some(id.into()),
            fields,
        }
    }

    /// Builds a batch record from a table row.
    ///
    /// Short rows read as empty cells; cells past the last header are dropped.
    pub fn from_row(index: usize, headers: &[String], row: &[String]) -> Self {
        let fields = headers
            .iter()
            .enumerate()
            .map(|(pos, header)| (header.clone(), row.get(pos).cloned().unwrap_or_default()))
            .collect();
        Self::new(index, fields)
    }

    /// Projects a stored record onto the headers an upload mapping uses, so
    /// existing and uploaded records are read the same way.
    pub fn from_stored(index: usize, stored: &StoredRecord, mapping: &FieldMappingResult) -> Self {
        let fields = stored
            .fields
            .iter()
            .map(|(field, value)| {
                let key = mapping.header_for(field).unwrap_or(field.as_str());
                (key.to_string(), value.to_string())
            })
            .collect();
        Self::existing(index, stored.id.clone(), fields)
    }

    /// Cell under an exact header.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(h, v)| (h.as_str(), v.as_str()))
    }

    /// Trimmed, non-empty value of a canonical field.
    ///
    /// Reads the header the mapping binds to `field`. Stored records also fall
    /// back to the canonical wire name for fields the upload does not carry;
    /// upload cells under unmapped headers are never read.
    pub fn value_of(&self, field: CanonicalField, mapping: &FieldMappingResult) -> Option<&str> {
        let mapped = mapping.header_for(field).and_then(|header| self.get(header));
        let value = match mapped {
            Some(value) => value,
            None if self.is_existing => self.get(field.as_str())?,
            None => return None,
        };
        let trimmed = value.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// Canonical field values of one application. Empty values are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalRecord(BTreeMap<CanonicalField, String>);

impl CanonicalRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    /// Sets a value; blank input clears the field.
    pub fn set(&mut self, field: CanonicalField, value: impl Into<String>) {
        let value = value.into();
        if value.trim().is_empty() {
            self.0.remove(&field);
        } else {
            self.0.insert(field, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &str)> {
        self.0.iter().map(|(f, v)| (*f, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(CanonicalField, String)> for CanonicalRecord {
    fn from_iter<I: IntoIterator<Item = (CanonicalField, String)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (field, value) in iter {
            record.set(field, value);
        }
        record
    }
}

/// A canonical record as held by the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    pub fields: CanonicalRecord,
}

/// One write produced by a finalized import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledRecord {
    /// Stored record to overwrite; `None` inserts a new record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_id: Option<String>,
    pub record: CanonicalRecord,
}

impl ReconciledRecord {
    pub fn insert(record: CanonicalRecord) -> Self {
        Self {
            existing_id: None,
            record,
        }
    }

    pub fn overwrite(id: impl Into<String>, record: CanonicalRecord) -> Self {
        Self {
            existing_id: Some(id.into()),
            record,
        }
    }

    pub fn is_update(&self) -> bool {
        self.existing_id.is_some()
    }
}
