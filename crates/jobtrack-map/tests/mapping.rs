use jobtrack_map::{FieldMapper, MapperConfig, apply_mapping, to_canonical};
use jobtrack_model::{CanonicalField, MatchKind, RawTable};
use jobtrack_templates::TemplateCatalog;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

#[test]
fn every_builtin_maps_its_own_headers_exactly() {
    let catalog = TemplateCatalog::builtin();
    let mapper = FieldMapper::new(&catalog);
    for template in catalog.templates() {
        let headers: Vec<String> = template.headers().iter().map(|h| h.to_string()).collect();
        let result = mapper
            .generate_mapping_from_template(&template.id, &headers)
            .expect("mapping");
        assert_eq!(result.mapping.len(), template.mappings.len(), "{}", template.id);
        assert!(result.is_complete(), "{}", template.id);
        assert!(result.unmapped_headers.is_empty(), "{}", template.id);
        assert!(
            result
                .mapping
                .iter()
                .all(|m| m.match_kind == MatchKind::Exact && m.confidence == 1.0)
        );
    }
}

#[test]
fn sample_rows_become_canonical_records() {
    let catalog = TemplateCatalog::builtin();
    let template = catalog.require("glassdoor").expect("glassdoor");
    let headers: Vec<String> = template.headers().iter().map(|h| h.to_string()).collect();
    let mapping = FieldMapper::new(&catalog)
        .generate_mapping_from_template("glassdoor", &headers)
        .expect("mapping");
    let table = RawTable::new(headers, template.sample_rows.clone());
    let batch = apply_mapping(&mapping, &table);
    let record = to_canonical(&batch[0], &mapping);
    assert_eq!(record.get(CanonicalField::Company), Some("Umbrella Corporation"));
    assert_eq!(record.get(CanonicalField::AppliedDate), Some("2024-02-02"));
    assert_eq!(record.get(CanonicalField::Status), Some("screening"));
    assert_eq!(record.get(CanonicalField::Contact), Some("Jordan Lee"));
}

#[test]
fn lower_threshold_admits_weaker_fuzzy_matches() {
    let catalog = TemplateCatalog::builtin();
    let headers = strings(&["Company", "Job Titl", "Applied Date"]);
    let strict = FieldMapper::new(&catalog)
        .with_config(MapperConfig::default().with_min_similarity(0.99))
        .generate_mapping_from_template("linkedin", &headers)
        .expect("mapping");
    assert_eq!(strict.header_for(CanonicalField::Position), None);
    assert_eq!(strict.missing_fields, vec![CanonicalField::Position]);

    let lenient = FieldMapper::new(&catalog)
        .generate_mapping_from_template("linkedin", &headers)
        .expect("mapping");
    assert_eq!(lenient.header_for(CanonicalField::Position), Some("Job Titl"));
    let confidence = lenient
        .confidence_for(CanonicalField::Position)
        .expect("position");
    assert!(confidence > 0.5 && confidence < 1.0);
}
