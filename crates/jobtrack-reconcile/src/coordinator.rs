//! Resolution state for the duplicate groups of one import.
//!
//! Each group moves from unresolved to resolved exactly once. There is no
//! default decision: `finalize` refuses to run until every group has one.

use std::collections::{BTreeMap, BTreeSet};

use jobtrack_map::to_canonical;
use jobtrack_model::{
    CanonicalRecord, DuplicateGroup, DuplicateResolution, FieldMappingResult, ParsedRecord,
    ReconciledRecord, ResolutionAction, ResolutionKind,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::RecommendationThresholds;
use crate::error::{ReconcileError, Result};
use crate::merge::{apply_update, merge_with_primary};

/// A caller's decision for one group, before merge data is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionChoice {
    pub action: ResolutionKind,
    /// Member that survives (default: the group's primary, 0).
    #[serde(default)]
    pub primary_index: usize,
    /// Member resolved against the primary (default: first other member).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_index: Option<usize>,
}

impl ResolutionChoice {
    pub fn new(action: ResolutionKind) -> Self {
        Self {
            action,
            primary_index: 0,
            secondary_index: None,
        }
    }

    #[must_use]
    pub fn with_primary(mut self, primary_index: usize) -> Self {
        self.primary_index = primary_index;
        self
    }

    #[must_use]
    pub fn with_secondary(mut self, secondary_index: usize) -> Self {
        self.secondary_index = Some(secondary_index);
        self
    }
}

/// Suggested action for a group confidence, if any.
pub fn recommend(confidence: f64, thresholds: &RecommendationThresholds) -> Option<ResolutionKind> {
    if confidence >= thresholds.merge {
        Some(ResolutionKind::Merge)
    } else if confidence >= thresholds.skip {
        Some(ResolutionKind::Skip)
    } else {
        None
    }
}

#[derive(Debug, Clone)]
pub struct ResolutionCoordinator {
    groups: Vec<DuplicateGroup>,
    batch: Vec<ParsedRecord>,
    mapping: FieldMappingResult,
    thresholds: RecommendationThresholds,
    resolutions: BTreeMap<String, DuplicateResolution>,
}

impl ResolutionCoordinator {
    pub fn new(
        groups: Vec<DuplicateGroup>,
        batch: Vec<ParsedRecord>,
        mapping: FieldMappingResult,
    ) -> Self {
        Self {
            groups,
            batch,
            mapping,
            thresholds: RecommendationThresholds::default(),
            resolutions: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_thresholds(mut self, thresholds: RecommendationThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn groups(&self) -> &[DuplicateGroup] {
        &self.groups
    }

    pub fn batch(&self) -> &[ParsedRecord] {
        &self.batch
    }

    pub fn mapping(&self) -> &FieldMappingResult {
        &self.mapping
    }

    pub fn group(&self, group_id: &str) -> Result<&DuplicateGroup> {
        self.groups
            .iter()
            .find(|group| group.id == group_id)
            .ok_or_else(|| ReconcileError::UnknownGroup {
                id: group_id.to_string(),
            })
    }

    pub fn resolved_count(&self) -> usize {
        self.resolutions.len()
    }

    /// Share of groups resolved; 1.0 when there is nothing to resolve.
    pub fn progress(&self) -> f64 {
        if self.groups.is_empty() {
            1.0
        } else {
            self.resolved_count() as f64 / self.groups.len() as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        self.resolved_count() == self.groups.len()
    }

    pub fn resolution(&self, group_id: &str) -> Option<&DuplicateResolution> {
        self.resolutions.get(group_id)
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &DuplicateGroup> {
        self.groups
            .iter()
            .filter(|group| !self.resolutions.contains_key(&group.id))
    }

    pub fn recommendation(&self, group_id: &str) -> Result<Option<ResolutionKind>> {
        let group = self.group(group_id)?;
        Ok(recommend(group.confidence, &self.thresholds))
    }

    /// The record a merge with `primary_index` as survivor would produce.
    pub fn preview_merge(&self, group_id: &str, primary_index: usize) -> Result<CanonicalRecord> {
        let group = self.group(group_id)?;
        merge_with_primary(&group.members, primary_index, &self.mapping).ok_or_else(|| {
            ReconcileError::invalid_member(
                group_id,
                format!(
                    "primary index {primary_index} out of range for {} members",
                    group.len()
                ),
            )
        })
    }

    /// Records a decision for one group.
    pub fn resolve(
        &mut self,
        group_id: &str,
        choice: ResolutionChoice,
    ) -> Result<&DuplicateResolution> {
        let group = self.group(group_id)?;
        if let Some(existing) = self.resolutions.get(group_id) {
            return Err(ReconcileError::GroupAlreadyResolved {
                id: group_id.to_string(),
                action: existing.action.kind(),
            });
        }

        let (primary_index, secondary_index) = member_indices(group, choice)?;
        let action = match choice.action {
            ResolutionKind::Merge => ResolutionAction::Merge {
                merged_data: self.preview_merge(group_id, primary_index)?,
            },
            ResolutionKind::Skip => ResolutionAction::Skip,
            ResolutionKind::Update => ResolutionAction::Update,
            ResolutionKind::KeepBoth => ResolutionAction::KeepBoth,
        };
        info!(
            group_id,
            action = %choice.action,
            primary_index,
            secondary_index,
            "resolved duplicate group"
        );
        let resolution = self
            .resolutions
            .entry(group_id.to_string())
            .or_insert(DuplicateResolution {
                action,
                primary_index,
                secondary_index,
            });
        Ok(resolution)
    }

    /// Resolves every unresolved group that has a recommendation with that
    /// recommendation. Returns how many groups were resolved.
    pub fn accept_recommendations(&mut self) -> Result<usize> {
        let pending: Vec<(String, ResolutionKind)> = self
            .unresolved()
            .filter_map(|group| {
                recommend(group.confidence, &self.thresholds).map(|kind| (group.id.clone(), kind))
            })
            .collect();
        for (group_id, kind) in &pending {
            self.resolve(group_id, ResolutionChoice::new(*kind))?;
        }
        Ok(pending.len())
    }

    /// Produces the writes for the whole batch.
    ///
    /// Ungrouped batch records are inserted. A resolved group writes back to
    /// its stored record (the primary if it is stored, else the first stored
    /// member), or inserts when the group has none. Each action emits:
    /// - merge: the merged record;
    /// - skip: the primary's values, nothing when the primary is stored;
    /// - update: the primary overlaid with the secondary's values;
    /// - keep_both: every new member as an insert, stored members untouched.
    ///
    /// Output follows the lowest batch index of each emitting unit.
    pub fn finalize(&self) -> Result<Vec<ReconciledRecord>> {
        let remaining: Vec<&DuplicateGroup> = self.unresolved().collect();
        if let Some(first) = remaining.first() {
            return Err(ReconcileError::Unresolved {
                remaining: remaining.len(),
                first: first.id.clone(),
            });
        }

        let grouped: BTreeSet<usize> = self
            .groups
            .iter()
            .flat_map(|group| group.members.iter())
            .filter(|member| !member.is_existing)
            .map(|member| member.index)
            .collect();

        let mut units: Vec<(usize, Vec<ReconciledRecord>)> = self
            .batch
            .iter()
            .filter(|record| !grouped.contains(&record.index))
            .map(|record| {
                (
                    record.index,
                    vec![ReconciledRecord::insert(to_canonical(record, &self.mapping))],
                )
            })
            .collect();

        for group in &self.groups {
            let Some(resolution) = self.resolutions.get(&group.id) else {
                continue;
            };
            let order = group
                .members
                .iter()
                .filter(|member| !member.is_existing)
                .map(|member| member.index)
                .min()
                .unwrap_or(usize::MAX);
            let records = self.emit(group, resolution);
            debug!(
                group_id = %group.id,
                action = %resolution.action.kind(),
                records = records.len(),
                "finalized duplicate group"
            );
            units.push((order, records));
        }

        units.sort_by_key(|(order, _)| *order);
        let records: Vec<ReconciledRecord> =
            units.into_iter().flat_map(|(_, records)| records).collect();
        info!(
            records = records.len(),
            updates = records.iter().filter(|r| r.is_update()).count(),
            "finalized import"
        );
        Ok(records)
    }

    fn emit(&self, group: &DuplicateGroup, resolution: &DuplicateResolution) -> Vec<ReconciledRecord> {
        let primary = &group.members[resolution.primary_index];
        let target = stored_target(group, primary);
        match &resolution.action {
            ResolutionAction::Merge { merged_data } => {
                vec![write_back(target, merged_data.clone())]
            }
            ResolutionAction::Skip if primary.is_existing => Vec::new(),
            ResolutionAction::Skip => {
                vec![write_back(target, to_canonical(primary, &self.mapping))]
            }
            ResolutionAction::Update => {
                let secondary = &group.members[resolution.secondary_index];
                let updated = apply_update(
                    &to_canonical(primary, &self.mapping),
                    &to_canonical(secondary, &self.mapping),
                );
                vec![write_back(target, updated)]
            }
            ResolutionAction::KeepBoth => group
                .members
                .iter()
                .filter(|member| !member.is_existing)
                .map(|member| ReconciledRecord::insert(to_canonical(member, &self.mapping)))
                .collect(),
        }
    }
}

/// Stored record a resolved group writes back to.
fn stored_target<'a>(group: &'a DuplicateGroup, primary: &'a ParsedRecord) -> Option<&'a str> {
    primary
        .existing_id
        .as_deref()
        .or_else(|| group.members.iter().find_map(|m| m.existing_id.as_deref()))
}

fn write_back(target: Option<&str>, record: CanonicalRecord) -> ReconciledRecord {
    match target {
        Some(id) => ReconciledRecord::overwrite(id, record),
        None => ReconciledRecord::insert(record),
    }
}

fn member_indices(group: &DuplicateGroup, choice: ResolutionChoice) -> Result<(usize, usize)> {
    let len = group.len();
    let primary = choice.primary_index;
    if primary >= len {
        return Err(ReconcileError::invalid_member(
            &group.id,
            format!("primary index {primary} out of range for {len} members"),
        ));
    }
    let secondary = choice
        .secondary_index
        .unwrap_or(if primary == 0 { 1 } else { 0 });
    if secondary >= len {
        return Err(ReconcileError::invalid_member(
            &group.id,
            format!("secondary index {secondary} out of range for {len} members"),
        ));
    }
    if secondary == primary {
        return Err(ReconcileError::invalid_member(
            &group.id,
            "primary and secondary must differ",
        ));
    }
    Ok((primary, secondary))
}
