//! Provider detection from an upload's header row.
//!
//! Each template is scored by the weighted share of its columns present in
//! the headers (case-insensitive, trimmed). Required columns weigh more than
//! optional ones. A best score under the confidence floor is reported as "no
//! confident match", not as an error.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use jobtrack_model::Template;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::TemplateCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Best scores below this floor yield no template (default: 0.3).
    pub min_confidence: f64,
    /// Weight of a matched required column (default: 2.0).
    pub required_weight: f64,
    /// Weight of a matched optional column (default: 1.0).
    pub optional_weight: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.3,
            required_weight: 2.0,
            optional_weight: 1.0,
        }
    }
}

impl DetectorConfig {
    #[must_use]
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }
}

/// Score of one template against a header row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateScore {
    pub template_id: String,
    pub confidence: f64,
    pub matched_fields: usize,
    pub required_matched: usize,
    /// Position in the catalog, the final tie-breaker.
    #[serde(skip)]
    pub catalog_position: usize,
}

/// Outcome of [`TemplateDetector::detect_template`].
#[derive(Debug, Clone)]
pub struct Detection<'a> {
    /// `None` when no template clears the confidence floor.
    pub template: Option<&'a Template>,
    pub confidence: f64,
    pub matched_fields: usize,
}

impl Detection<'_> {
    pub fn is_confident(&self) -> bool {
        self.template.is_some()
    }
}

pub struct TemplateDetector<'a> {
    catalog: &'a TemplateCatalog,
    config: DetectorConfig,
}

impl<'a> TemplateDetector<'a> {
    pub fn new(catalog: &'a TemplateCatalog) -> Self {
        Self {
            catalog,
            config: DetectorConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: DetectorConfig) -> Self {
        self.config = config;
        self
    }

    /// Scores a single template.
    pub fn score(&self, template: &Template, headers: &[String]) -> TemplateScore {
        let present = header_keys(headers);
        self.score_keys(template, &present, 0)
    }

    /// Scores every template, best first.
    ///
    /// Ordering: higher confidence, then more required columns matched, then
    /// catalog declaration order.
    pub fn detect_all(&self, headers: &[String]) -> Vec<TemplateScore> {
        let present = header_keys(headers);
        let mut scores: Vec<TemplateScore> = self
            .catalog
            .templates()
            .iter()
            .enumerate()
            .map(|(pos, template)| self.score_keys(template, &present, pos))
            .collect();
        scores.sort_by(rank);
        scores
    }

    /// Picks the best-matching template for an upload.
    pub fn detect_template(&self, headers: &[String]) -> Detection<'a> {
        let scores = self.detect_all(headers);
        let Some(best) = scores.first() else {
            return Detection {
                template: None,
                confidence: 0.0,
                matched_fields: 0,
            };
        };

        let template = if best.confidence >= self.config.min_confidence && best.matched_fields > 0
        {
            self.catalog.templates().get(best.catalog_position)
        } else {
            None
        };
        debug!(
            header_count = headers.len(),
            best_template = %best.template_id,
            confidence = best.confidence,
            matched_fields = best.matched_fields,
            confident = template.is_some(),
            "template detection"
        );
        Detection {
            template,
            confidence: best.confidence,
            matched_fields: best.matched_fields,
        }
    }

    fn score_keys(
        &self,
        template: &Template,
        present: &BTreeSet<String>,
        catalog_position: usize,
    ) -> TemplateScore {
        let mut total = 0.0;
        let mut matched = 0.0;
        let mut matched_fields = 0;
        let mut required_matched = 0;
        for mapping in &template.mappings {
            let weight = if mapping.required {
                self.config.required_weight
            } else {
                self.config.optional_weight
            };
            total += weight;
            if present.contains(&mapping.csv_column.trim().to_lowercase()) {
                matched += weight;
                matched_fields += 1;
                if mapping.required {
                    required_matched += 1;
                }
            }
        }
        let confidence = if total > 0.0 {
            (matched / total).clamp(0.0, 1.0)
        } else {
            0.0
        };
        TemplateScore {
            template_id: template.id.clone(),
            confidence,
            matched_fields,
            required_matched,
            catalog_position,
        }
    }
}

fn header_keys(headers: &[String]) -> BTreeSet<String> {
    headers
        .iter()
        .map(|header| header.trim().to_lowercase())
        .filter(|header| !header.is_empty())
        .collect()
}

fn rank(a: &TemplateScore, b: &TemplateScore) -> Ordering {
    b.confidence
        .total_cmp(&a.confidence)
        .then_with(|| b.required_matched.cmp(&a.required_matched))
        .then_with(|| a.catalog_position.cmp(&b.catalog_position))
}

#[cfg(test)]
mod tests {
    use jobtrack_model::{CanonicalField, FieldMapping};

    use super::*;

    fn headers(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    fn template(id: &str, mappings: Vec<FieldMapping>) -> Template {
        Template {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            source: "custom".to_string(),
            mappings,
            sample_rows: Vec::new(),
        }
    }

    #[test]
    fn linkedin_scenario() {
        let catalog = TemplateCatalog::builtin();
        let detector = TemplateDetector::new(&catalog);
        let detection = detector.detect_template(&headers(&[
            "Company",
            "Position",
            "Location",
            "Applied Date",
            "Status",
            "Notes",
        ]));
        let template = detection.template.expect("template detected");
        assert_eq!(template.id, "linkedin");
        assert!(detection.confidence > 0.8, "{}", detection.confidence);
        assert!(detection.matched_fields > 4);
    }

    #[test]
    fn matching_ignores_case_and_padding() {
        let catalog = TemplateCatalog::builtin();
        let detector = TemplateDetector::new(&catalog);
        let detection = detector.detect_template(&headers(&[
            " employer ",
            "JOB TITLE",
            "applied on",
        ]));
        assert_eq!(detection.template.map(|t| t.id.as_str()), Some("glassdoor"));
    }

    #[test]
    fn low_confidence_returns_no_template() {
        let catalog = TemplateCatalog::builtin();
        let detector = TemplateDetector::new(&catalog);
        let detection = detector.detect_template(&headers(&["Foo", "Bar", "Notes"]));
        assert!(detection.template.is_none());
        assert!(detection.confidence < 0.3);
        assert_eq!(detection.matched_fields, 1);
    }

    #[test]
    fn empty_inputs_are_not_errors() {
        let catalog = TemplateCatalog::builtin();
        let detection = TemplateDetector::new(&catalog).detect_template(&[]);
        assert!(detection.template.is_none());
        assert_eq!(detection.confidence, 0.0);

        let empty = TemplateCatalog::default();
        let detection = TemplateDetector::new(&empty).detect_template(&headers(&["Company"]));
        assert!(detection.template.is_none());
        assert_eq!(detection.matched_fields, 0);
    }

    #[test]
    fn ties_prefer_more_required_then_declaration_order() {
        // Flat weights: both score 1/2, "a" through its required column and
        // "b" through two optional ones.
        let a = template(
            "a",
            vec![
                FieldMapping::required("Company", CanonicalField::Company),
                FieldMapping::optional("Extra", CanonicalField::Notes),
            ],
        );
        let b = template(
            "b",
            vec![
                FieldMapping::required("Org", CanonicalField::Company),
                FieldMapping::optional("Status", CanonicalField::Status),
                FieldMapping::optional("Notes", CanonicalField::Notes),
                FieldMapping::optional("Link", CanonicalField::Url),
            ],
        );
        let catalog = TemplateCatalog::builder()
            .register(b)
            .and_then(|builder| builder.register(a))
            .expect("register")
            .build();
        let flat = DetectorConfig {
            required_weight: 1.0,
            ..DetectorConfig::default()
        };
        let detector = TemplateDetector::new(&catalog).with_config(flat);
        let scores = detector.detect_all(&headers(&["Company", "Status", "Notes"]));
        assert_eq!(scores[0].template_id, "a");
        assert_eq!(scores[0].required_matched, 1);
        assert!((scores[0].confidence - 0.5).abs() < 1e-9);
        assert!((scores[1].confidence - 0.5).abs() < 1e-9);

        let twin = template(
            "twin",
            vec![FieldMapping::required("Company", CanonicalField::Company)],
        );
        let first = template(
            "first",
            vec![FieldMapping::required("company", CanonicalField::Company)],
        );
        let catalog = TemplateCatalog::builder()
            .register(first)
            .and_then(|builder| builder.register(twin))
            .expect("register")
            .build();
        let detection = TemplateDetector::new(&catalog).detect_template(&headers(&["Company"]));
        assert_eq!(detection.template.map(|t| t.id.as_str()), Some("first"));
    }

    #[test]
    fn floor_is_configurable() {
        let catalog = TemplateCatalog::builtin();
        let detector = TemplateDetector::new(&catalog)
            .with_config(DetectorConfig::default().with_min_confidence(0.95));
        let detection = detector.detect_template(&headers(&[
            "Company",
            "Position",
            "Location",
            "Applied Date",
            "Status",
            "Notes",
        ]));
        assert!(detection.template.is_none());
        assert!(detection.confidence > 0.8);
    }
}
