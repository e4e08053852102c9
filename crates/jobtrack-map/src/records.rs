//! Turning mapped rows into canonical records.

use jobtrack_model::dates::normalize_date;
use jobtrack_model::{
    ApplicationStatus, CanonicalField, CanonicalRecord, FieldMappingResult, ParsedRecord, RawTable,
};
use tracing::debug;

/// Builds the import batch from a parsed table.
///
/// Rows with no value under any mapped header carry nothing to import and are
/// dropped; the survivors are numbered consecutively from 0.
pub fn apply_mapping(mapping: &FieldMappingResult, table: &RawTable) -> Vec<ParsedRecord> {
    let mut records = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let record = ParsedRecord::from_row(records.len(), &table.headers, row);
        let has_value = mapping
            .fields()
            .any(|field| record.value_of(field, mapping).is_some());
        if has_value {
            records.push(record);
        }
    }
    let skipped = table.rows.len() - records.len();
    if skipped > 0 {
        debug!(skipped, "dropped rows without mapped values");
    }
    records
}

/// Reads a record's canonical values through the mapping.
pub fn to_canonical(record: &ParsedRecord, mapping: &FieldMappingResult) -> CanonicalRecord {
    CanonicalField::ALL
        .iter()
        .filter_map(|field| {
            record
                .value_of(*field, mapping)
                .map(|value| (*field, canonicalize_value(*field, value)))
        })
        .collect()
}

/// Cleans one value: trims it, renders parseable dates as ISO `YYYY-MM-DD`,
/// and collapses recognized status labels. Anything unrecognized is kept as
/// written.
pub fn canonicalize_value(field: CanonicalField, raw: &str) -> String {
    let value = raw.trim();
    match field {
        CanonicalField::AppliedDate => normalize_date(value).unwrap_or_else(|| value.to_string()),
        CanonicalField::Status => ApplicationStatus::normalize(value)
            .map(|status| status.as_str().to_string())
            .unwrap_or_else(|| value.to_string()),
        _ => value.to_string(),
    }
}
