//! One upload, from header detection to the single commit.

use std::sync::Arc;

use jobtrack_map::{FieldMapper, apply_mapping};
use jobtrack_model::{FieldMappingResult, ParsedRecord, RawTable, StoredRecord};
use jobtrack_templates::{Detection, TemplateCatalog, TemplateDetector};
use tracing::{info, warn};

use crate::config::ReconcileConfig;
use crate::coordinator::ResolutionCoordinator;
use crate::detector::DuplicateDetector;
use crate::error::{ReconcileError, Result};
use crate::store::{CommitSummary, RecordStore};

/// An upload mapped onto canonical fields and ready for duplicate checks.
#[derive(Debug, Clone)]
pub struct PreparedImport {
    pub template_id: String,
    /// Detection confidence, `None` when the caller named the template.
    pub detection_confidence: Option<f64>,
    pub mapping: FieldMappingResult,
    pub batch: Vec<ParsedRecord>,
}

pub struct ImportSession<S: RecordStore> {
    catalog: Arc<TemplateCatalog>,
    config: ReconcileConfig,
    store: S,
    snapshot: Vec<StoredRecord>,
}

impl<S: RecordStore> ImportSession<S> {
    /// Validates the config and reads the store snapshot.
    pub fn open(catalog: Arc<TemplateCatalog>, config: ReconcileConfig, store: S) -> Result<Self> {
        config.validate()?;
        let snapshot = store.snapshot()?;
        info!(stored = snapshot.len(), "opened import session");
        Ok(Self {
            catalog,
            config,
            store,
            snapshot,
        })
    }

    pub fn snapshot(&self) -> &[StoredRecord] {
        &self.snapshot
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn detect(&self, headers: &[String]) -> Detection<'_> {
        TemplateDetector::new(&self.catalog)
            .with_config(self.config.detection)
            .detect_template(headers)
    }

    /// Maps an upload with the named template, or the detected one.
    pub fn map_upload(&self, table: &RawTable, template_id: Option<&str>) -> Result<PreparedImport> {
        let (template_id, detection_confidence) = match template_id {
            Some(id) => (id.to_string(), None),
            None => {
                let detection = self.detect(&table.headers);
                let Some(template) = detection.template else {
                    warn!(
                        confidence = detection.confidence,
                        "no template matched the upload headers"
                    );
                    return Err(ReconcileError::NoTemplateDetected {
                        confidence: detection.confidence,
                    });
                };
                (template.id.clone(), Some(detection.confidence))
            }
        };

        let mapping = FieldMapper::new(&self.catalog)
            .with_config(self.config.mapping)
            .generate_mapping_from_template(&template_id, &table.headers)?;
        let batch = apply_mapping(&mapping, table);
        info!(
            template_id = %template_id,
            rows = batch.len(),
            missing = mapping.missing_fields.len(),
            "mapped upload"
        );
        Ok(PreparedImport {
            template_id,
            detection_confidence,
            mapping,
            batch,
        })
    }

    /// Groups the prepared batch against the snapshot.
    pub fn find_duplicates(&self, prepared: &PreparedImport) -> ResolutionCoordinator {
        let existing: Vec<ParsedRecord> = self
            .snapshot
            .iter()
            .enumerate()
            .map(|(idx, stored)| ParsedRecord::from_stored(idx, stored, &prepared.mapping))
            .collect();
        let groups = DuplicateDetector::new(self.config.duplicates).find_duplicates(
            &existing,
            &prepared.batch,
            &prepared.mapping,
        );
        ResolutionCoordinator::new(groups, prepared.batch.clone(), prepared.mapping.clone())
            .with_thresholds(self.config.recommendations)
    }

    /// Finalizes the coordinator and writes the result in one commit.
    ///
    /// Nothing is written when a group is still unresolved.
    pub fn commit(mut self, coordinator: ResolutionCoordinator) -> Result<CommitSummary> {
        let records = coordinator.finalize()?;
        let summary = self.store.commit(&records)?;
        info!(
            inserted = summary.inserted,
            updated = summary.updated,
            "committed import"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use jobtrack_model::{CanonicalField, ResolutionKind};

    use super::*;
    use crate::coordinator::ResolutionChoice;
    use crate::store::MemoryRecordStore;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn undetectable_upload_is_reported() {
        let mut store = MemoryRecordStore::default();
        let session = ImportSession::open(
            Arc::new(TemplateCatalog::builtin()),
            ReconcileConfig::default(),
            &mut store,
        )
        .expect("open");
        let err = session
            .map_upload(&table(&["Foo", "Bar"], &[&["1", "2"]]), None)
            .unwrap_err();
        assert!(matches!(err, ReconcileError::NoTemplateDetected { .. }));

        let err = session
            .map_upload(&table(&["Foo"], &[]), Some("myspace"))
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Mapping(_)));
    }

    #[test]
    fn unresolved_sessions_write_nothing() {
        let mut store = MemoryRecordStore::default();
        let session = ImportSession::open(
            Arc::new(TemplateCatalog::builtin()),
            ReconcileConfig::default(),
            &mut store,
        )
        .expect("open");
        let upload = table(
            &["Company", "Position", "Applied Date"],
            &[
                &["Acme", "Engineer", "2024-01-01"],
                &["Acme", "Engineer", "2024-01-01"],
            ],
        );
        let prepared = session.map_upload(&upload, None).expect("map");
        let coordinator = session.find_duplicates(&prepared);
        assert_eq!(coordinator.groups().len(), 1);
        assert!(matches!(
            session.commit(coordinator),
            Err(ReconcileError::Unresolved { .. })
        ));
        assert!(store.records().is_empty());
    }

    #[test]
    fn resolved_sessions_commit_once() {
        let mut store = MemoryRecordStore::default();
        let session = ImportSession::open(
            Arc::new(TemplateCatalog::builtin()),
            ReconcileConfig::default(),
            &mut store,
        )
        .expect("open");
        let upload = table(
            &["Company", "Position", "Applied Date", "Notes"],
            &[
                &["Acme", "Engineer", "2024-01-01", ""],
                &["Acme", "Engineer", "2024-01-01", "referral"],
                &["Globex", "Designer", "2024-02-01", ""],
            ],
        );
        let prepared = session.map_upload(&upload, None).expect("map");
        assert_eq!(prepared.template_id, "linkedin");
        let mut coordinator = session.find_duplicates(&prepared);
        let group_id = coordinator.groups()[0].id.clone();
        coordinator
            .resolve(&group_id, ResolutionChoice::new(ResolutionKind::Merge))
            .expect("resolve");
        let summary = session.commit(coordinator).expect("commit");
        assert_eq!(summary.inserted, 2);
        assert_eq!(
            store.records()[0].fields.get(CanonicalField::Notes),
            Some("referral")
        );
    }
}
