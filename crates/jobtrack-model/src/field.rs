//! Canonical fields of a reconciled job application record.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A fixed target attribute of a reconciled record.
///
/// Declaration order is the canonical order used whenever fields are listed
/// without a template to order them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalField {
    Company,
    Position,
    Location,
    AppliedDate,
    Status,
    Salary,
    Url,
    Notes,
    Contact,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 9] = [
        Self::Company,
        Self::Position,
        Self::Location,
        Self::AppliedDate,
        Self::Status,
        Self::Salary,
        Self::Url,
        Self::Notes,
        Self::Contact,
    ];

    /// Wire name, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Position => "position",
            Self::Location => "location",
            Self::AppliedDate => "appliedDate",
            Self::Status => "status",
            Self::Salary => "salary",
            Self::Url => "url",
            Self::Notes => "notes",
            Self::Contact => "contact",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Company => "Company",
            Self::Position => "Position",
            Self::Location => "Location",
            Self::AppliedDate => "Applied Date",
            Self::Status => "Status",
            Self::Salary => "Salary",
            Self::Url => "Job URL",
            Self::Notes => "Notes",
            Self::Contact => "Contact",
        }
    }

    /// Placeholder value shown in a CSV skeleton for templates that ship no
    /// sample rows.
    pub fn example(&self) -> &'static str {
        match self {
            Self::Company => "Acme Corp",
            Self::Position => "Software Engineer",
            Self::Location => "Austin, TX",
            Self::AppliedDate => "2024-01-15",
            Self::Status => "Applied",
            Self::Salary => "120000",
            Self::Url => "https://example.com/jobs/1",
            Self::Notes => "",
            Self::Contact => "Jordan Lee",
        }
    }

    /// Lowercase header spellings that identify this field regardless of
    /// which provider produced the export.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Company => &[
                "company",
                "company name",
                "employer",
                "organization",
                "organisation",
            ],
            Self::Position => &["position", "job title", "title", "role", "job"],
            Self::Location => &["location", "job location", "city"],
            Self::AppliedDate => &[
                "applied date",
                "applieddate",
                "date applied",
                "applied on",
                "application date",
                "applied",
            ],
            Self::Status => &["status", "application status", "stage"],
            Self::Salary => &["salary", "salary range", "compensation", "pay"],
            Self::Url => &["url", "job url", "job link", "link", "posting url"],
            Self::Notes => &["notes", "note", "comments"],
            Self::Contact => &["contact", "recruiter", "contact name", "hiring manager"],
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanonicalField {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ModelError::UnknownField(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_names_case_insensitively() {
        assert_eq!(
            "appliedDate".parse::<CanonicalField>(),
            Ok(CanonicalField::AppliedDate)
        );
        assert_eq!(
            " COMPANY ".parse::<CanonicalField>(),
            Ok(CanonicalField::Company)
        );
        assert!("employer".parse::<CanonicalField>().is_err());
    }

    #[test]
    fn aliases_are_lowercase_and_include_wire_label() {
        for field in CanonicalField::ALL {
            for alias in field.aliases() {
                assert_eq!(*alias, alias.to_lowercase());
            }
            assert!(
                field
                    .aliases()
                    .iter()
                    .any(|alias| alias.eq_ignore_ascii_case(field.as_str())
                        || alias.eq_ignore_ascii_case(field.label())),
                "{field} aliases should contain its own name"
            );
        }
    }
}
