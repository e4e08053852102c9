//! End-to-end import sessions against an in-memory store.

use std::sync::Arc;

use jobtrack_model::{CanonicalField, RawTable, ResolutionKind, StoredRecord};
use jobtrack_reconcile::{
    ImportSession, MemoryRecordStore, ReconcileConfig, ReconcileError, ResolutionChoice,
};
use jobtrack_templates::TemplateCatalog;

fn stored(id: &str, values: &[(CanonicalField, &str)]) -> StoredRecord {
    StoredRecord {
        id: id.to_string(),
        fields: values
            .iter()
            .map(|(field, value)| (*field, value.to_string()))
            .collect(),
    }
}

fn indeed_upload() -> RawTable {
    let headers = [
        "Company Name",
        "Job Title",
        "Job Location",
        "Date Applied",
        "Application Status",
    ];
    let rows: [[&str; 5]; 3] = [
        ["Acme Inc.", "Engineer", "Remote", "01/03/2024", "Interview scheduled"],
        ["Hooli", "SRE", "Mountain View, CA", "01/10/2024", "Applied"],
        ["Hooli", "SRE", "Mountain View, CA", "01/12/2024", ""],
    ];
    RawTable::new(
        headers.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect(),
    )
}

fn existing_store() -> MemoryRecordStore {
    MemoryRecordStore::new(vec![
        stored(
            "rec-1",
            &[
                (CanonicalField::Company, "Acme"),
                (CanonicalField::Position, "Engineer"),
                (CanonicalField::Location, "Remote"),
                (CanonicalField::AppliedDate, "2024-01-02"),
                (CanonicalField::Status, "applied"),
                (CanonicalField::Contact, "Dana"),
            ],
        ),
        stored(
            "rec-2",
            &[
                (CanonicalField::Company, "Globex"),
                (CanonicalField::Position, "Designer"),
            ],
        ),
    ])
}

#[test]
fn detected_upload_merges_into_stored_record() {
    let mut store = existing_store();
    let session = ImportSession::open(
        Arc::new(TemplateCatalog::builtin()),
        ReconcileConfig::default(),
        &mut store,
    )
    .expect("open session");

    let prepared = session.map_upload(&indeed_upload(), None).expect("map");
    assert_eq!(prepared.template_id, "indeed");
    assert!(prepared.detection_confidence.is_some_and(|c| c > 0.5));
    assert!(prepared.mapping.is_complete());

    let mut coordinator = session.find_duplicates(&prepared);
    let groups = coordinator.groups().to_vec();
    assert_eq!(groups.len(), 2);

    let acme = &groups[0];
    assert_eq!(acme.primary().existing_id.as_deref(), Some("rec-1"));
    assert_eq!(
        acme.match_reasons,
        vec![
            "same company and position",
            "applied within 1 day",
            "same location"
        ]
    );
    assert_eq!(
        coordinator.recommendation(&acme.id).expect("group"),
        Some(ResolutionKind::Merge)
    );

    let hooli = &groups[1];
    assert!(!hooli.has_existing());

    coordinator
        .resolve(
            &acme.id,
            ResolutionChoice::new(ResolutionKind::Merge).with_primary(1),
        )
        .expect("merge acme");
    coordinator
        .resolve(&hooli.id, ResolutionChoice::new(ResolutionKind::Skip))
        .expect("skip hooli");
    assert_eq!(coordinator.progress(), 1.0);

    let summary = session.commit(coordinator).expect("commit");
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.inserted, 1);

    let records = store.into_records();
    assert_eq!(records.len(), 3);
    let acme = &records[0].fields;
    assert_eq!(acme.get(CanonicalField::Company), Some("Acme Inc."));
    assert_eq!(acme.get(CanonicalField::AppliedDate), Some("2024-01-03"));
    assert_eq!(acme.get(CanonicalField::Status), Some("interviewing"));
    assert_eq!(acme.get(CanonicalField::Contact), Some("Dana"));
    assert_eq!(records[2].id, "rec-3");
    assert_eq!(
        records[2].fields.get(CanonicalField::AppliedDate),
        Some("2024-01-10")
    );
}

#[test]
fn accepted_recommendations_merge_strong_duplicates() {
    let mut store = existing_store();
    let session = ImportSession::open(
        Arc::new(TemplateCatalog::builtin()),
        ReconcileConfig::default(),
        &mut store,
    )
    .expect("open session");
    let prepared = session
        .map_upload(&indeed_upload(), Some("indeed"))
        .expect("map");
    assert!(prepared.detection_confidence.is_none());

    let mut coordinator = session.find_duplicates(&prepared);
    assert_eq!(coordinator.accept_recommendations().expect("accept"), 2);
    let records = coordinator.finalize().expect("finalize");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].existing_id.as_deref(), Some("rec-1"));
    assert_eq!(records[0].record.get(CanonicalField::Company), Some("Acme"));
    assert_eq!(records[1].record.get(CanonicalField::Company), Some("Hooli"));
    assert_eq!(records[1].record.get(CanonicalField::Status), Some("applied"));
    assert_eq!(session.snapshot().len(), 2);
}

#[test]
fn invalid_config_is_rejected_on_open() {
    let mut config = ReconcileConfig::default();
    config.duplicates.weights.company = 0.9;
    let err = ImportSession::open(
        Arc::new(TemplateCatalog::builtin()),
        config,
        MemoryRecordStore::default(),
    )
    .err()
    .expect("invalid config");
    assert!(matches!(err, ReconcileError::InvalidConfig { .. }));
}

#[test]
fn resolution_serializes_for_callers() {
    let store = existing_store();
    let session = ImportSession::open(
        Arc::new(TemplateCatalog::builtin()),
        ReconcileConfig::default(),
        store,
    )
    .expect("open session");
    let prepared = session.map_upload(&indeed_upload(), None).expect("map");
    let mut coordinator = session.find_duplicates(&prepared);
    let group_id = coordinator.groups()[0].id.clone();
    let resolution = coordinator
        .resolve(&group_id, ResolutionChoice::new(ResolutionKind::Merge))
        .expect("resolve");
    insta::assert_json_snapshot!(resolution, @r#"
    {
      "action": "merge",
      "mergedData": {
        "company": "Acme",
        "position": "Engineer",
        "location": "Remote",
        "appliedDate": "2024-01-02",
        "status": "applied",
        "contact": "Dana"
      },
      "primaryIndex": 0,
      "secondaryIndex": 1
    }
    "#);

    let json = serde_json::to_value(&coordinator.groups()[0]).expect("json");
    assert_eq!(json["id"], group_id.as_str());
    assert_eq!(json["members"][0]["existingId"], "rec-1");
    assert_eq!(json["members"][1]["isExisting"], false);
}
