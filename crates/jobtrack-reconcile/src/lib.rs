//! Duplicate detection, merging and resolution for job application imports.
//!
//! An [`ImportSession`] reads the stored records once, maps an upload with
//! [`jobtrack_map`], groups near-duplicates with a [`DuplicateDetector`],
//! collects one decision per group in a [`ResolutionCoordinator`], and
//! writes the outcome to its [`RecordStore`] in a single commit.

pub mod config;
pub mod coordinator;
pub mod detector;
pub mod error;
pub mod merge;
pub mod session;
pub mod store;
pub mod union_find;

pub use config::{DuplicateConfig, FieldWeights, ReconcileConfig, RecommendationThresholds};
pub use coordinator::{ResolutionChoice, ResolutionCoordinator, recommend};
pub use detector::{DuplicateDetector, MatchSignal, PairScore};
pub use error::{ReconcileError, Result};
pub use merge::{apply_update, generate_merge_preview, merge_with_primary};
pub use session::{ImportSession, PreparedImport};
pub use store::{CommitSummary, MemoryRecordStore, RecordStore, apply_reconciled};
pub use union_find::DisjointSet;
