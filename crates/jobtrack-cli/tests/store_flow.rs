//! Imports driven through the CLI's file-backed pieces.

use std::fs;
use std::sync::Arc;

use jobtrack_cli::config::load_catalog;
use jobtrack_cli::input::read_table;
use jobtrack_cli::resolutions::{apply_resolutions, load_resolutions};
use jobtrack_cli::store::JsonRecordStore;
use jobtrack_model::CanonicalField;
use jobtrack_reconcile::{ImportSession, RecordStore, ReconcileConfig};
use tempfile::TempDir;

const NOTION_TEMPLATES: &str = r#"
[[templates]]
id = "notion"
name = "Notion board"
source = "custom"

[[templates.mappings]]
csvColumn = "Org"
canonicalField = "company"
required = true

[[templates.mappings]]
csvColumn = "Opening"
canonicalField = "position"

[[templates.mappings]]
csvColumn = "Sent"
canonicalField = "appliedDate"
"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn second_upload_resolves_against_first() {
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("records.json");
    let catalog = Arc::new(load_catalog(None).unwrap());

    let first = write(
        &dir,
        "first.csv",
        "Company,Position,Location,Applied Date,Status\n\
         Acme,Engineer,Remote,2024-01-01,Applied\n\
         Globex,Designer,Berlin,2024-01-05,Applied\n",
    );
    let session = ImportSession::open(
        Arc::clone(&catalog),
        ReconcileConfig::default(),
        JsonRecordStore::new(&store_path),
    )
    .unwrap();
    let prepared = session
        .map_upload(&read_table(&first).unwrap(), None)
        .unwrap();
    assert_eq!(prepared.template_id, "linkedin");
    let coordinator = session.find_duplicates(&prepared);
    assert!(coordinator.groups().is_empty());
    let summary = session.commit(coordinator).unwrap();
    assert_eq!(summary.inserted, 2);

    let second = write(
        &dir,
        "second.csv",
        "Company,Position,Location,Applied Date,Status\n\
         Acme,Engineer,Remote,2024-01-01,Interviewing\n",
    );
    let session = ImportSession::open(
        Arc::clone(&catalog),
        ReconcileConfig::default(),
        JsonRecordStore::new(&store_path),
    )
    .unwrap();
    let prepared = session
        .map_upload(&read_table(&second).unwrap(), None)
        .unwrap();
    let mut coordinator = session.find_duplicates(&prepared);
    assert_eq!(coordinator.groups().len(), 1);
    let group_id = coordinator.groups()[0].id.clone();

    let resolutions = write(
        &dir,
        "resolutions.json",
        &format!(r#"{{"{group_id}": {{"action": "update"}}}}"#),
    );
    let resolutions = load_resolutions(&resolutions).unwrap();
    assert_eq!(apply_resolutions(&mut coordinator, &resolutions).unwrap(), 1);
    let summary = session.commit(coordinator).unwrap();
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.inserted, 0);

    let records = JsonRecordStore::new(&store_path).snapshot().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "rec-1");
    assert_eq!(
        records[0].fields.get(CanonicalField::Status),
        Some("interviewing")
    );
}

#[test]
fn custom_templates_are_detected() {
    let dir = TempDir::new().unwrap();
    let templates = write(&dir, "templates.toml", NOTION_TEMPLATES);
    let catalog = load_catalog(Some(&templates)).unwrap();
    assert!(catalog.get("notion").is_some());

    let upload = write(
        &dir,
        "notion.csv",
        "Org,Opening,Sent\nInitech,Analyst,03/01/2024\n",
    );
    let session = ImportSession::open(
        Arc::new(catalog),
        ReconcileConfig::default(),
        JsonRecordStore::new(dir.path().join("records.json")),
    )
    .unwrap();
    let prepared = session
        .map_upload(&read_table(&upload).unwrap(), None)
        .unwrap();
    assert_eq!(prepared.template_id, "notion");
    assert!(prepared.mapping.is_complete());
    let coordinator = session.find_duplicates(&prepared);
    let records = coordinator.finalize().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].record.get(CanonicalField::AppliedDate),
        Some("2024-03-01")
    );
}

#[test]
fn duplicate_template_ids_are_rejected() {
    let dir = TempDir::new().unwrap();
    let templates = write(
        &dir,
        "templates.toml",
        &NOTION_TEMPLATES.replace("id = \"notion\"", "id = \"linkedin\""),
    );
    let err = load_catalog(Some(&templates)).unwrap_err();
    assert!(format!("{err:#}").contains("linkedin"), "{err:#}");
}
