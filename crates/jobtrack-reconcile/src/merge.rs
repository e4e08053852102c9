//! Field-level merge of duplicate group members.

use jobtrack_map::to_canonical;
use jobtrack_model::{CanonicalField, CanonicalRecord, FieldMappingResult, ParsedRecord};

/// Combines group members into one record.
///
/// Each canonical field takes the first member's value (in member order)
/// that is present and non-blank, so a merged field is empty only when every
/// member leaves it empty. Fields stored on existing members but absent from
/// the upload mapping are carried over the same way.
pub fn generate_merge_preview(
    members: &[ParsedRecord],
    mapping: &FieldMappingResult,
) -> CanonicalRecord {
    let canonical: Vec<CanonicalRecord> = members
        .iter()
        .map(|member| to_canonical(member, mapping))
        .collect();
    let mut merged = CanonicalRecord::new();
    for field in CanonicalField::ALL {
        if let Some(value) = canonical.iter().find_map(|record| record.get(field)) {
            merged.set(field, value);
        }
    }
    merged
}

/// Merge preview with `primary_index` promoted to the front; the other
/// members keep group order. `None` if the index is out of range.
pub fn merge_with_primary(
    members: &[ParsedRecord],
    primary_index: usize,
    mapping: &FieldMappingResult,
) -> Option<CanonicalRecord> {
    let ordered = with_primary(members, primary_index)?;
    Some(generate_merge_preview(&ordered, mapping))
}

fn with_primary(members: &[ParsedRecord], primary_index: usize) -> Option<Vec<ParsedRecord>> {
    let primary = members.get(primary_index)?;
    let mut ordered = Vec::with_capacity(members.len());
    ordered.push(primary.clone());
    ordered.extend(
        members
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != primary_index)
            .map(|(_, member)| member.clone()),
    );
    Some(ordered)
}

/// Overwrites `primary` with every non-empty value of `secondary`.
pub fn apply_update(primary: &CanonicalRecord, secondary: &CanonicalRecord) -> CanonicalRecord {
    let mut updated = primary.clone();
    for (field, value) in secondary.iter() {
        updated.set(field, value);
    }
    updated
}
