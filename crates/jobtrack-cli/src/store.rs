//! JSON file record store.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use jobtrack_model::{ReconciledRecord, StoredRecord};
use jobtrack_reconcile::{CommitSummary, RecordStore, ReconcileError, apply_reconciled};
use serde::{Deserialize, Serialize};
use tracing::info;

const STORE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    records: Vec<StoredRecord>,
}

/// Stored applications in one JSON file.
///
/// A missing file reads as an empty store. Commits write a sibling temp
/// file and rename it over the original.
#[derive(Debug, Clone)]
pub struct JsonRecordStore {
    path: PathBuf,
}

impl JsonRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<StoredRecord>, ReconcileError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(io_error("read", &self.path, &err)),
        };
        let file: StoreFile = serde_json::from_str(&contents).map_err(|err| {
            ReconcileError::store(format!("parse {}: {err}", self.path.display()))
        })?;
        if file.version != STORE_VERSION {
            return Err(ReconcileError::store(format!(
                "{} has store version {}, expected {STORE_VERSION}",
                self.path.display(),
                file.version
            )));
        }
        Ok(file.records)
    }

    fn save(&self, records: Vec<StoredRecord>) -> Result<(), ReconcileError> {
        let bytes = serde_json::to_vec_pretty(&StoreFile {
            version: STORE_VERSION,
            records,
        })
        .map_err(|err| ReconcileError::store(format!("serialize store: {err}")))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| io_error("create", parent, &err))?;
        }
        let temp_path = self.path.with_extension("json.tmp");
        let mut file =
            File::create(&temp_path).map_err(|err| io_error("create", &temp_path, &err))?;
        file.write_all(&bytes)
            .map_err(|err| io_error("write", &temp_path, &err))?;
        file.sync_all()
            .map_err(|err| io_error("sync", &temp_path, &err))?;
        fs::rename(&temp_path, &self.path)
            .map_err(|err| io_error("rename", &temp_path, &err))?;
        Ok(())
    }
}

impl RecordStore for JsonRecordStore {
    fn snapshot(&self) -> Result<Vec<StoredRecord>, ReconcileError> {
        self.load()
    }

    fn commit(&mut self, records: &[ReconciledRecord]) -> Result<CommitSummary, ReconcileError> {
        let mut stored = self.load()?;
        let summary = apply_reconciled(&mut stored, records)?;
        self.save(stored)?;
        info!(
            path = %self.path.display(),
            inserted = summary.inserted,
            updated = summary.updated,
            "saved record store"
        );
        Ok(summary)
    }
}

fn io_error(operation: &str, path: &Path, err: &io::Error) -> ReconcileError {
    ReconcileError::store(format!("{operation} {}: {err}", path.display()))
}
