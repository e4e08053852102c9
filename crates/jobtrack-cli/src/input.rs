//! Reads uploaded CSV files into a [`RawTable`].

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use jobtrack_model::RawTable;
use tracing::debug;

const BOM: char = '\u{feff}';

pub fn read_table(path: &Path) -> Result<RawTable> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let table = read_table_from(file).with_context(|| format!("read {}", path.display()))?;
    debug!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.len(),
        "read upload"
    );
    Ok(table)
}

/// Parses CSV text with a header row.
///
/// Rows may be ragged; blank lines are skipped and rows whose cells are all
/// blank are dropped.
pub fn read_table_from<R: Read>(reader: R) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .context("read header row")?
        .iter()
        .enumerate()
        .map(|(pos, header)| {
            let header = if pos == 0 {
                header.trim_start_matches(BOM)
            } else {
                header
            };
            header.trim().to_string()
        })
        .collect();
    if headers.iter().all(String::is_empty) {
        bail!("upload has no header row");
    }

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("read row {}", line + 1))?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(RawTable::new(headers, rows))
}
