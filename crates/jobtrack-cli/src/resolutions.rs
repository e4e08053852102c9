//! Decisions for duplicate groups, read from a JSON file.
//!
//! ```json
//! {
//!   "dup-3f9a01c2e4b7": { "action": "merge", "primaryIndex": 1 },
//!   "dup-0c71d2aa9e15": { "action": "keep_both" }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use jobtrack_reconcile::{ResolutionChoice, ResolutionCoordinator};
use tracing::debug;

/// Group id to decision.
pub type ResolutionFile = BTreeMap<String, ResolutionChoice>;

pub fn load_resolutions(path: &Path) -> Result<ResolutionFile> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))
}

/// Applies every decision. Stops at the first rejected one.
pub fn apply_resolutions(
    coordinator: &mut ResolutionCoordinator,
    resolutions: &ResolutionFile,
) -> Result<usize> {
    for (group_id, choice) in resolutions {
        coordinator
            .resolve(group_id, *choice)
            .with_context(|| format!("resolve {group_id}"))?;
        debug!(group_id = %group_id, action = %choice.action, "applied resolution");
    }
    Ok(resolutions.len())
}
