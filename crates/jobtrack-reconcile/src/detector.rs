//! Near-duplicate grouping across an upload and the stored records.
//!
//! Every new record is compared with every stored record and every earlier
//! new record; stored records are never compared with each other. Pairs
//! whose composite score clears the threshold are linked in a disjoint-set
//! forest, so grouping is transitive: A~B and B~C put A, B, C in one group
//! even when A~C alone scores low.

use std::fmt;

use chrono::NaiveDate;
use jobtrack_map::{SimilarityFn, normalize_text, similarity};
use jobtrack_model::dates::{days_apart, parse_date};
use jobtrack_model::{CanonicalField, DuplicateGroup, FieldMappingResult, ParsedRecord};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::config::DuplicateConfig;
use crate::union_find::DisjointSet;

const LEGAL_SUFFIXES: &[&str] = &[
    "inc",
    "llc",
    "ltd",
    "corp",
    "corporation",
    "co",
    "gmbh",
    "plc",
];

/// One piece of evidence that two records describe the same application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSignal {
    CompanyAndPosition,
    SameCompany,
    /// Similarity as a whole percentage.
    SimilarCompany(u8),
    SamePosition,
    SimilarPosition(u8),
    SameAppliedDate,
    AppliedWithin(i64),
    SameLocation,
}

impl fmt::Display for MatchSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CompanyAndPosition => f.write_str("same company and position"),
            Self::SameCompany => f.write_str("same company"),
            Self::SimilarCompany(pct) => write!(f, "similar company name ({pct}%)"),
            Self::SamePosition => f.write_str("same position"),
            Self::SimilarPosition(pct) => write!(f, "similar position ({pct}%)"),
            Self::SameAppliedDate => f.write_str("same applied date"),
            Self::AppliedWithin(1) => f.write_str("applied within 1 day"),
            Self::AppliedWithin(days) => write!(f, "applied within {days} days"),
            Self::SameLocation => f.write_str("same location"),
        }
    }
}

/// Composite score of one compared pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairScore {
    pub confidence: f64,
    pub signals: Vec<MatchSignal>,
}

impl PairScore {
    pub fn reasons(&self) -> Vec<String> {
        self.signals.iter().map(ToString::to_string).collect()
    }
}

enum NameMatch {
    Same,
    Similar(f64),
    Different,
}

/// Comparison keys of one record, extracted once.
#[derive(Debug)]
struct Features {
    company: Option<String>,
    position: Option<String>,
    date: Option<NaiveDate>,
    date_text: Option<String>,
    location: Option<String>,
}

pub struct DuplicateDetector {
    config: DuplicateConfig,
    similarity: SimilarityFn,
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self::new(DuplicateConfig::default())
    }
}

impl DuplicateDetector {
    pub fn new(config: DuplicateConfig) -> Self {
        Self {
            config,
            similarity,
        }
    }

    #[must_use]
    pub fn with_similarity(mut self, similarity: SimilarityFn) -> Self {
        self.similarity = similarity;
        self
    }

    pub fn config(&self) -> &DuplicateConfig {
        &self.config
    }

    /// Scores a single pair of records.
    pub fn compare(
        &self,
        a: &ParsedRecord,
        b: &ParsedRecord,
        mapping: &FieldMappingResult,
    ) -> PairScore {
        self.score(&features(a, mapping), &features(b, mapping))
    }

    /// Groups the batch against itself and against the stored snapshot.
    ///
    /// Members are ordered stored-first, then by index, so the primary is the
    /// first stored member when there is one. Groups are ordered by their
    /// first member.
    pub fn find_duplicates(
        &self,
        existing: &[ParsedRecord],
        batch: &[ParsedRecord],
        mapping: &FieldMappingResult,
    ) -> Vec<DuplicateGroup> {
        let offset = existing.len();
        let keys: Vec<Features> = existing
            .iter()
            .chain(batch)
            .map(|record| features(record, mapping))
            .collect();

        let mut set = DisjointSet::new(keys.len());
        let mut links: Vec<(usize, PairScore)> = Vec::new();
        let mut compared = 0usize;
        for j in offset..keys.len() {
            for i in 0..j {
                compared += 1;
                let score = self.score(&keys[i], &keys[j]);
                if score.confidence >= self.config.min_confidence {
                    debug!(left = i, right = j, confidence = score.confidence, "linked pair");
                    set.union(i, j);
                    links.push((i, score));
                }
            }
        }

        let components = set.components();
        let mut slot_of = vec![None; keys.len()];
        for (slot, members) in components.iter().enumerate() {
            for member in members {
                slot_of[*member] = Some(slot);
            }
        }
        let mut confidence = vec![0.0_f64; components.len()];
        let mut reasons: Vec<Vec<String>> = vec![Vec::new(); components.len()];
        for (left, score) in &links {
            let Some(slot) = slot_of[*left] else {
                continue;
            };
            confidence[slot] = confidence[slot].max(score.confidence);
            for reason in score.reasons() {
                if !reasons[slot].contains(&reason) {
                    reasons[slot].push(reason);
                }
            }
        }

        let record_at = |idx: usize| {
            if idx < offset {
                existing[idx].clone()
            } else {
                batch[idx - offset].clone()
            }
        };
        let groups: Vec<DuplicateGroup> = components
            .into_iter()
            .zip(confidence)
            .zip(reasons)
            .map(|((members, confidence), match_reasons)| {
                let members: Vec<ParsedRecord> = members.into_iter().map(&record_at).collect();
                DuplicateGroup {
                    id: group_id(&members),
                    confidence,
                    match_reasons,
                    members,
                }
            })
            .collect();

        info!(
            existing = existing.len(),
            batch = batch.len(),
            compared,
            groups = groups.len(),
            "duplicate detection complete"
        );
        groups
    }

    fn score(&self, a: &Features, b: &Features) -> PairScore {
        let weights = &self.config.weights;
        let mut total = 0.0;
        let mut signals = Vec::new();

        let company = self.name_match(a.company.as_deref(), b.company.as_deref());
        let position = self.name_match(a.position.as_deref(), b.position.as_deref());
        total += weights.company * self.name_score(&company);
        total += weights.position * self.name_score(&position);
        match (&company, &position) {
            (NameMatch::Same, NameMatch::Same) => signals.push(MatchSignal::CompanyAndPosition),
            _ => {
                match company {
                    NameMatch::Same => signals.push(MatchSignal::SameCompany),
                    NameMatch::Similar(sim) => signals.push(MatchSignal::SimilarCompany(percent(sim))),
                    NameMatch::Different => {}
                }
                match position {
                    NameMatch::Same => signals.push(MatchSignal::SamePosition),
                    NameMatch::Similar(sim) => {
                        signals.push(MatchSignal::SimilarPosition(percent(sim)));
                    }
                    NameMatch::Different => {}
                }
            }
        }

        if let Some((score, signal)) = self.date_match(a, b) {
            total += weights.applied_date * score;
            signals.push(signal);
        }

        if let (Some(left), Some(right)) = (&a.location, &b.location)
            && left == right
        {
            total += weights.location;
            signals.push(MatchSignal::SameLocation);
        }

        PairScore {
            confidence: round6(total.clamp(0.0, 1.0)),
            signals,
        }
    }

    fn name_match(&self, a: Option<&str>, b: Option<&str>) -> NameMatch {
        let (Some(a), Some(b)) = (a, b) else {
            return NameMatch::Different;
        };
        if a == b {
            return NameMatch::Same;
        }
        let sim = (self.similarity)(a, b);
        if sim >= self.config.fuzzy_field_min {
            NameMatch::Similar(sim)
        } else {
            NameMatch::Different
        }
    }

    fn name_score(&self, name: &NameMatch) -> f64 {
        match name {
            NameMatch::Same => 1.0,
            NameMatch::Similar(sim) => self.config.fuzzy_field_factor * sim,
            NameMatch::Different => 0.0,
        }
    }

    /// Same day scores 1; `d` days apart inside the window scores
    /// `1 - d / (window + 1)`. Unparseable dates only match verbatim.
    fn date_match(&self, a: &Features, b: &Features) -> Option<(f64, MatchSignal)> {
        match (a.date, b.date) {
            (Some(left), Some(right)) => {
                let days = days_apart(left, right);
                if days == 0 {
                    Some((1.0, MatchSignal::SameAppliedDate))
                } else if days <= self.config.date_window_days {
                    let window = self.config.date_window_days as f64;
                    Some((1.0 - days as f64 / (window + 1.0), MatchSignal::AppliedWithin(days)))
                } else {
                    None
                }
            }
            _ => match (&a.date_text, &b.date_text) {
                (Some(left), Some(right)) if left == right => {
                    Some((1.0, MatchSignal::SameAppliedDate))
                }
                _ => None,
            },
        }
    }
}

fn features(record: &ParsedRecord, mapping: &FieldMappingResult) -> Features {
    let normalized = |field| {
        record
            .value_of(field, mapping)
            .map(normalize_text)
            .filter(|value| !value.is_empty())
    };
    let raw_date = record.value_of(CanonicalField::AppliedDate, mapping);
    Features {
        company: normalized(CanonicalField::Company)
            .map(|name| strip_legal_suffix(&name))
            .filter(|value| !value.is_empty()),
        position: normalized(CanonicalField::Position),
        date: raw_date.and_then(parse_date),
        date_text: normalized(CanonicalField::AppliedDate),
        location: normalized(CanonicalField::Location),
    }
}

/// Drops one trailing legal-entity suffix ("acme corp" -> "acme").
fn strip_legal_suffix(name: &str) -> String {
    match name.rsplit_once(' ') {
        Some((head, last)) if LEGAL_SUFFIXES.contains(&last) => head.to_string(),
        _ => name.to_string(),
    }
}

/// Content-derived id: stable for the same members in the same order.
fn group_id(members: &[ParsedRecord]) -> String {
    let mut hasher = Sha256::new();
    for member in members {
        let key = match &member.existing_id {
            Some(id) => format!("existing:{id}"),
            None => format!("batch:{}", member.index),
        };
        hasher.update(key.as_bytes());
        hasher.update(b"\n");
    }
    let digest = hasher.finalize();
    format!("dup-{}", hex::encode(&digest[..6]))
}

fn percent(sim: f64) -> u8 {
    (sim * 100.0).round().clamp(0.0, 100.0) as u8
}

fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}
