use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::record::{CanonicalRecord, ParsedRecord};

/// Records judged to describe one real-world application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    pub id: String,
    /// Strongest pairwise confidence among linked members.
    pub confidence: f64,
    pub match_reasons: Vec<String>,
    /// At least two members; the first is the primary.
    pub members: Vec<ParsedRecord>,
}

impl DuplicateGroup {
    pub fn primary(&self) -> &ParsedRecord {
        &self.members[0]
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn has_existing(&self) -> bool {
        self.members.iter().any(|m| m.is_existing)
    }
}

/// The four ways a caller can settle a duplicate group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionKind {
    /// Combine every member into one record.
    Merge,
    /// Keep the primary, drop the other members.
    Skip,
    /// Overwrite the primary with the secondary's values.
    Update,
    /// Keep every member as a separate record.
    KeepBoth,
}

impl ResolutionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Skip => "skip",
            Self::Update => "update",
            Self::KeepBoth => "keep_both",
        }
    }
}

impl fmt::Display for ResolutionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolutionKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "merge" => Ok(Self::Merge),
            "skip" => Ok(Self::Skip),
            "update" => Ok(Self::Update),
            "keep_both" => Ok(Self::KeepBoth),
            _ => Err(ModelError::UnknownAction(s.to_string())),
        }
    }
}

/// An accepted decision. Only `Merge` carries data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ResolutionAction {
    Merge {
        #[serde(rename = "mergedData")]
        merged_data: CanonicalRecord,
    },
    Skip,
    Update,
    KeepBoth,
}

impl ResolutionAction {
    pub fn kind(&self) -> ResolutionKind {
        match self {
            Self::Merge { .. } => ResolutionKind::Merge,
            Self::Skip => ResolutionKind::Skip,
            Self::Update => ResolutionKind::Update,
            Self::KeepBoth => ResolutionKind::KeepBoth,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateResolution {
    #[serde(flatten)]
    pub action: ResolutionAction,
    /// Member position of the record that survives.
    pub primary_index: usize,
    /// Member position of the record resolved against the primary.
    pub secondary_index: usize,
}

impl DuplicateResolution {
    pub fn merged_data(&self) -> Option<&CanonicalRecord> {
        match &self.action {
            ResolutionAction::Merge { merged_data } => Some(merged_data),
            ResolutionAction::Skip | ResolutionAction::Update | ResolutionAction::KeepBoth => None,
        }
    }
}
