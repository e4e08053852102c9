//! Storage boundary of an import session.

use std::collections::BTreeSet;

use jobtrack_model::{ReconciledRecord, StoredRecord};
use serde::Serialize;
use tracing::debug;

use crate::error::{ReconcileError, Result};

const ID_PREFIX: &str = "rec-";

/// Counts of one committed import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    pub inserted: usize,
    pub updated: usize,
}

/// Where stored applications live.
///
/// A session reads one snapshot when it opens and writes once after every
/// duplicate group is resolved. `commit` must apply all records or none.
pub trait RecordStore {
    fn snapshot(&self) -> Result<Vec<StoredRecord>>;

    fn commit(&mut self, records: &[ReconciledRecord]) -> Result<CommitSummary>;
}

impl<S: RecordStore + ?Sized> RecordStore for &mut S {
    fn snapshot(&self) -> Result<Vec<StoredRecord>> {
        (**self).snapshot()
    }

    fn commit(&mut self, records: &[ReconciledRecord]) -> Result<CommitSummary> {
        (**self).commit(records)
    }
}

/// Applies reconciled writes to a record list.
///
/// Every overwrite target is checked before anything changes, so an unknown
/// id leaves `records` untouched. New records get the next free `rec-N` id.
pub fn apply_reconciled(
    records: &mut Vec<StoredRecord>,
    changes: &[ReconciledRecord],
) -> Result<CommitSummary> {
    let known: BTreeSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
    if let Some(missing) = changes
        .iter()
        .filter_map(|change| change.existing_id.as_deref())
        .find(|id| !known.contains(id))
    {
        return Err(ReconcileError::store(format!(
            "cannot overwrite unknown record {missing}"
        )));
    }

    let mut next_id = next_sequence(records);
    let mut summary = CommitSummary::default();
    for change in changes {
        match &change.existing_id {
            Some(id) => {
                if let Some(stored) = records.iter_mut().find(|r| &r.id == id) {
                    stored.fields = change.record.clone();
                    summary.updated += 1;
                }
            }
            None => {
                let id = format!("{ID_PREFIX}{next_id}");
                next_id += 1;
                debug!(record_id = %id, "inserted record");
                records.push(StoredRecord {
                    id,
                    fields: change.record.clone(),
                });
                summary.inserted += 1;
            }
        }
    }
    Ok(summary)
}

fn next_sequence(records: &[StoredRecord]) -> u64 {
    records
        .iter()
        .filter_map(|r| r.id.strip_prefix(ID_PREFIX)?.parse::<u64>().ok())
        .max()
        .map_or(1, |max| max + 1)
}

/// In-memory store, used by tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    records: Vec<StoredRecord>,
}

impl MemoryRecordStore {
    pub fn new(records: Vec<StoredRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[StoredRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<StoredRecord> {
        self.records
    }
}

impl RecordStore for MemoryRecordStore {
    fn snapshot(&self) -> Result<Vec<StoredRecord>> {
        Ok(self.records.clone())
    }

    fn commit(&mut self, records: &[ReconciledRecord]) -> Result<CommitSummary> {
        apply_reconciled(&mut self.records, records)
    }
}

#[cfg(test)]
mod tests {
    use jobtrack_model::{CanonicalField, CanonicalRecord};

    use super::*;

    fn record(company: &str) -> CanonicalRecord {
        [(CanonicalField::Company, company.to_string())]
            .into_iter()
            .collect()
    }

    #[test]
    fn inserts_get_sequential_ids() {
        let mut store = MemoryRecordStore::new(vec![StoredRecord {
            id: "rec-7".to_string(),
            fields: record("Acme"),
        }]);
        let summary = store
            .commit(&[
                ReconciledRecord::insert(record("Globex")),
                ReconciledRecord::overwrite("rec-7", record("Acme Corp")),
                ReconciledRecord::insert(record("Initech")),
            ])
            .expect("commit");
        assert_eq!(
            summary,
            CommitSummary {
                inserted: 2,
                updated: 1
            }
        );
        let ids: Vec<&str> = store.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["rec-7", "rec-8", "rec-9"]);
        assert_eq!(
            store.records()[0].fields.get(CanonicalField::Company),
            Some("Acme Corp")
        );
    }

    #[test]
    fn unknown_overwrite_changes_nothing() {
        let mut store = MemoryRecordStore::default();
        let err = store
            .commit(&[
                ReconciledRecord::insert(record("Globex")),
                ReconciledRecord::overwrite("rec-404", record("Acme")),
            ])
            .unwrap_err();
        assert!(matches!(err, ReconcileError::Store { .. }));
        assert!(store.records().is_empty());
    }

    #[test]
    fn first_id_is_one() {
        assert_eq!(next_sequence(&[]), 1);
    }
}
