//! Application status vocabulary.
//!
//! Providers label the same pipeline stage many ways ("In Progress",
//! "Interviewing", "Phone screen"). Recognized labels collapse onto one
//! canonical status; anything else is kept as the provider wrote it.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Saved,
    Applied,
    Screening,
    Interviewing,
    Offer,
    Accepted,
    Rejected,
    Withdrawn,
}

const SYNONYMS: &[(&str, ApplicationStatus)] = &[
    ("saved", ApplicationStatus::Saved),
    ("bookmarked", ApplicationStatus::Saved),
    ("wishlist", ApplicationStatus::Saved),
    ("interested", ApplicationStatus::Saved),
    ("applied", ApplicationStatus::Applied),
    ("application submitted", ApplicationStatus::Applied),
    ("submitted", ApplicationStatus::Applied),
    ("application sent", ApplicationStatus::Applied),
    ("screening", ApplicationStatus::Screening),
    ("phone screen", ApplicationStatus::Screening),
    ("recruiter screen", ApplicationStatus::Screening),
    ("in review", ApplicationStatus::Screening),
    ("under review", ApplicationStatus::Screening),
    ("viewed", ApplicationStatus::Screening),
    ("interviewing", ApplicationStatus::Interviewing),
    ("interview", ApplicationStatus::Interviewing),
    ("interview scheduled", ApplicationStatus::Interviewing),
    ("in progress", ApplicationStatus::Interviewing),
    ("onsite", ApplicationStatus::Interviewing),
    ("final round", ApplicationStatus::Interviewing),
    ("offer", ApplicationStatus::Offer),
    ("offer received", ApplicationStatus::Offer),
    ("offered", ApplicationStatus::Offer),
    ("accepted", ApplicationStatus::Accepted),
    ("offer accepted", ApplicationStatus::Accepted),
    ("hired", ApplicationStatus::Accepted),
    ("rejected", ApplicationStatus::Rejected),
    ("declined", ApplicationStatus::Rejected),
    ("not selected", ApplicationStatus::Rejected),
    ("not moving forward", ApplicationStatus::Rejected),
    ("no longer under consideration", ApplicationStatus::Rejected),
    ("withdrawn", ApplicationStatus::Withdrawn),
    ("withdrew", ApplicationStatus::Withdrawn),
    ("cancelled", ApplicationStatus::Withdrawn),
    ("canceled", ApplicationStatus::Withdrawn),
];

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Saved => "saved",
            Self::Applied => "applied",
            Self::Screening => "screening",
            Self::Interviewing => "interviewing",
            Self::Offer => "offer",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Withdrawn => "withdrawn",
        }
    }

    /// Recognizes a provider status label.
    pub fn normalize(raw: &str) -> Option<Self> {
        let key = raw
            .trim()
            .to_lowercase()
            .replace(|c: char| !c.is_alphanumeric(), " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if key.is_empty() {
            return None;
        }
        SYNONYMS
            .iter()
            .find(|(label, _)| *label == key)
            .map(|(_, status)| *status)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
