//! Aligns an upload's headers with a template's canonical fields.
//!
//! Matching runs in two passes over the template's fields in declaration
//! order. The exact pass binds headers equal (trimmed, case-insensitive) to
//! the template column or one of the field's aliases. The fuzzy pass then
//! offers the remaining headers to the remaining fields through the injected
//! similarity. Running every exact match first keeps a fuzzy match from
//! taking a header that a later field names exactly. Each header binds to at
//! most one field.

use jobtrack_model::{FieldMapping, FieldMappingResult, MappedColumn, MatchKind, Template};
use jobtrack_templates::TemplateCatalog;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{MappingError, Result};
use crate::similarity::{SimilarityFn, similarity};

/// Confidence of a fuzzy match with similarity `s` is `FUZZY_BASE + FUZZY_SPAN * s`.
const FUZZY_BASE: f64 = 0.5;
const FUZZY_SPAN: f64 = 0.45;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Minimum similarity for a fuzzy header match (default: 0.85).
    pub min_similarity: f64,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            min_similarity: 0.85,
        }
    }
}

impl MapperConfig {
    #[must_use]
    pub fn with_min_similarity(mut self, min_similarity: f64) -> Self {
        self.min_similarity = min_similarity;
        self
    }
}

pub struct FieldMapper<'a> {
    catalog: &'a TemplateCatalog,
    similarity: SimilarityFn,
    config: MapperConfig,
}

impl<'a> FieldMapper<'a> {
    pub fn new(catalog: &'a TemplateCatalog) -> Self {
        Self {
            catalog,
            similarity,
            config: MapperConfig::default(),
        }
    }

    #[must_use]
    pub fn with_similarity(mut self, similarity: SimilarityFn) -> Self {
        self.similarity = similarity;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: MapperConfig) -> Self {
        self.config = config;
        self
    }

    /// Maps headers against the catalog template named `template_id`.
    pub fn generate_mapping_from_template(
        &self,
        template_id: &str,
        headers: &[String],
    ) -> Result<FieldMappingResult> {
        let template =
            self.catalog
                .get(template_id)
                .ok_or_else(|| MappingError::TemplateNotFound {
                    id: template_id.to_string(),
                })?;
        Ok(self.map_template(template, headers))
    }

    /// Maps headers against a template that need not live in the catalog.
    pub fn map_template(&self, template: &Template, headers: &[String]) -> FieldMappingResult {
        let keys: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let mut consumed = vec![false; headers.len()];
        let mut bound: Vec<Option<(usize, f64, MatchKind)>> = vec![None; template.mappings.len()];

        for (slot, mapping) in template.mappings.iter().enumerate() {
            if let Some(idx) = exact_match(mapping, &keys, &consumed) {
                consumed[idx] = true;
                bound[slot] = Some((idx, 1.0, MatchKind::Exact));
            }
        }

        for (slot, mapping) in template.mappings.iter().enumerate() {
            if bound[slot].is_some() {
                continue;
            }
            if let Some((idx, score)) = self.fuzzy_match(mapping, headers, &consumed) {
                consumed[idx] = true;
                let confidence = FUZZY_BASE + FUZZY_SPAN * score;
                debug!(
                    field = %mapping.canonical_field,
                    header = %headers[idx],
                    similarity = score,
                    "fuzzy header match"
                );
                bound[slot] = Some((idx, confidence, MatchKind::Fuzzy));
            }
        }

        let mut mapped = Vec::new();
        let mut missing_fields = Vec::new();
        for (mapping, binding) in template.mappings.iter().zip(&bound) {
            match binding {
                Some((idx, confidence, match_kind)) => mapped.push(MappedColumn {
                    field: mapping.canonical_field,
                    header: headers[*idx].clone(),
                    confidence: *confidence,
                    match_kind: *match_kind,
                }),
                None if mapping.required => missing_fields.push(mapping.canonical_field),
                None => {}
            }
        }
        let unmapped_headers: Vec<String> = headers
            .iter()
            .zip(&consumed)
            .filter(|(_, used)| !**used)
            .map(|(header, _)| header.clone())
            .collect();

        if !missing_fields.is_empty() {
            let missing: Vec<&str> = missing_fields.iter().map(|f| f.as_str()).collect();
            warn!(
                template_id = %template.id,
                missing = ?missing,
                "upload lacks required template fields"
            );
        }
        debug!(
            template_id = %template.id,
            mapped = mapped.len(),
            unmapped = unmapped_headers.len(),
            "generated field mapping"
        );

        FieldMappingResult {
            template_id: template.id.clone(),
            mapping: mapped,
            unmapped_headers,
            missing_fields,
        }
    }

    /// Best unconsumed header for `mapping`; ties keep the earliest header.
    fn fuzzy_match(
        &self,
        mapping: &FieldMapping,
        headers: &[String],
        consumed: &[bool],
    ) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, header) in headers.iter().enumerate() {
            if consumed[idx] {
                continue;
            }
            let score = std::iter::once(mapping.csv_column.as_str())
                .chain(mapping.canonical_field.aliases().iter().copied())
                .map(|name| (self.similarity)(header, name))
                .fold(0.0_f64, f64::max);
            if score <= 0.0 || score < self.config.min_similarity {
                continue;
            }
            if best.is_none_or(|(_, current)| score > current) {
                best = Some((idx, score));
            }
        }
        best
    }
}

/// First unconsumed header equal to the template column, else to an alias.
fn exact_match(mapping: &FieldMapping, keys: &[String], consumed: &[bool]) -> Option<usize> {
    let column = mapping.csv_column.trim().to_lowercase();
    let free = |idx: &usize| !consumed[*idx];
    (0..keys.len())
        .filter(free)
        .find(|idx| keys[*idx] == column)
        .or_else(|| {
            let aliases = mapping.canonical_field.aliases();
            (0..keys.len())
                .filter(free)
                .find(|idx| aliases.contains(&keys[*idx].as_str()))
        })
}

#[cfg(test)]
mod tests {
    use jobtrack_model::CanonicalField;
    use proptest::prelude::*;

    use super::*;

    fn headers(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn exact_headers_map_with_full_confidence() {
        let catalog = TemplateCatalog::builtin();
        let mapper = FieldMapper::new(&catalog);
        let result = mapper
            .generate_mapping_from_template(
                "linkedin",
                &headers(&["Company", "Position", "Applied Date", "Status", "Extra"]),
            )
            .expect("mapping");
        assert_eq!(result.header_for(CanonicalField::Company), Some("Company"));
        assert!(
            result
                .mapping
                .iter()
                .all(|m| m.confidence == 1.0 && m.match_kind == MatchKind::Exact)
        );
        assert_eq!(result.unmapped_headers, vec!["Extra".to_string()]);
        assert!(result.missing_fields.is_empty());
    }

    #[test]
    fn aliases_count_as_exact() {
        let catalog = TemplateCatalog::builtin();
        let mapper = FieldMapper::new(&catalog);
        let result = mapper
            .generate_mapping_from_template(
                "linkedin",
                &headers(&["employer", "JOB TITLE", "date applied"]),
            )
            .expect("mapping");
        assert_eq!(result.header_for(CanonicalField::Company), Some("employer"));
        assert_eq!(result.header_for(CanonicalField::Position), Some("JOB TITLE"));
        assert_eq!(
            result.header_for(CanonicalField::AppliedDate),
            Some("date applied")
        );
        assert_eq!(result.confidence_for(CanonicalField::Position), Some(1.0));
    }

    #[test]
    fn fuzzy_headers_map_inside_the_open_interval() {
        let catalog = TemplateCatalog::builtin();
        let mapper = FieldMapper::new(&catalog);
        let result = mapper
            .generate_mapping_from_template(
                "indeed",
                &headers(&["Company Nam", "Job Title", "Applied_Date"]),
            )
            .expect("mapping");
        let company = result
            .confidence_for(CanonicalField::Company)
            .expect("company mapped");
        assert!(company > 0.5 && company < 1.0, "{company}");
        let date = result
            .mapping
            .iter()
            .find(|m| m.field == CanonicalField::AppliedDate)
            .expect("date mapped");
        assert_eq!(date.header, "Applied_Date");
        assert_eq!(date.match_kind, MatchKind::Fuzzy);
        assert!((date.confidence - 0.95).abs() < 1e-9);
    }

    #[test]
    fn exact_matches_win_over_earlier_fuzzy_candidates() {
        // "Job Titl" is fuzzy for position, but "Title" is an exact alias.
        let catalog = TemplateCatalog::builtin();
        let mapper = FieldMapper::new(&catalog);
        let result = mapper
            .generate_mapping_from_template(
                "linkedin",
                &headers(&["Company", "Job Titl", "Title"]),
            )
            .expect("mapping");
        assert_eq!(result.header_for(CanonicalField::Position), Some("Title"));
        assert_eq!(result.confidence_for(CanonicalField::Position), Some(1.0));
    }

    #[test]
    fn unmatched_required_fields_are_missing() {
        let catalog = TemplateCatalog::builtin();
        let mapper = FieldMapper::new(&catalog);
        let result = mapper
            .generate_mapping_from_template("glassdoor", &headers(&["Employer", "Foo"]))
            .expect("mapping");
        assert_eq!(
            result.missing_fields,
            vec![CanonicalField::Position, CanonicalField::AppliedDate]
        );
        assert!(!result.is_complete());
        assert_eq!(result.unmapped_headers, vec!["Foo".to_string()]);
    }

    #[test]
    fn unknown_template_is_an_error() {
        let catalog = TemplateCatalog::builtin();
        let err = FieldMapper::new(&catalog)
            .generate_mapping_from_template("myspace", &headers(&["Company"]))
            .unwrap_err();
        assert_eq!(
            err,
            MappingError::TemplateNotFound {
                id: "myspace".to_string()
            }
        );
    }

    #[test]
    fn injected_similarity_is_used() {
        fn never(_: &str, _: &str) -> f64 {
            0.0
        }
        let catalog = TemplateCatalog::builtin();
        let result = FieldMapper::new(&catalog)
            .with_similarity(never)
            .generate_mapping_from_template("indeed", &headers(&["Company Nam", "Job Title"]))
            .expect("mapping");
        assert_eq!(result.header_for(CanonicalField::Company), None);
        assert_eq!(result.missing_fields.first(), Some(&CanonicalField::Company));
    }

    #[test]
    fn duplicate_headers_bind_once() {
        let catalog = TemplateCatalog::builtin();
        let result = FieldMapper::new(&catalog)
            .generate_mapping_from_template("linkedin", &headers(&["Company", "Company"]))
            .expect("mapping");
        assert_eq!(result.mapping.len(), 1);
        assert_eq!(result.unmapped_headers, vec!["Company".to_string()]);
    }

    proptest! {
        #[test]
        fn mapping_is_idempotent(
            picks in proptest::collection::vec(0usize..12, 0..8),
        ) {
            const POOL: [&str; 12] = [
                "Company", "Position", "Job Titl", "Applied Date", "Status", "Notes",
                "employer", "Salary", "URL", "Comapny", "", "Location",
            ];
            let headers: Vec<String> = picks.iter().map(|i| POOL[*i].to_string()).collect();
            let catalog = TemplateCatalog::builtin();
            let mapper = FieldMapper::new(&catalog);
            let first = mapper.generate_mapping_from_template("linkedin", &headers).expect("mapping");
            let second = mapper.generate_mapping_from_template("linkedin", &headers).expect("mapping");
            prop_assert_eq!(&first, &second);
            let bound = first.mapping.len() + first.unmapped_headers.len();
            prop_assert_eq!(bound, headers.len());
            for column in &first.mapping {
                prop_assert!(column.confidence > 0.5 && column.confidence <= 1.0);
            }
        }
    }
}
