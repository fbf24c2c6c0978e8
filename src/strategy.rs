//! Per-item subset assignment strategies.
//!
//! Both strategies share one decision rule over a candidate list:
//!
//! 1. **Fill empty subsets first**: the first candidate with no items wins. Every
//!    subset gets an example before ratios are compared.
//! 2. **Minimize deficiency**: otherwise simulate the item in each candidate and
//!    keep the candidate with the smallest total deficiency
//!    ([`SubsetStatistics::potential_deficiency`]). Ties go to the earliest
//!    candidate.
//!
//! They differ only in how candidates are chosen:
//!
//! - [`AssignmentStrategy::Standard`] uses the caller's `target_subsets`.
//! - [`AssignmentStrategy::Anomaly`] ignores `target_subsets`. Items carrying an
//!   anomalous label are limited to Validation and Testing; all others may go
//!   anywhere.

use crate::{Error, Label, LabelId, LabeledItem, Result, Subset, SubsetStatistics};
use std::collections::BTreeSet;

/// Scores closer than this are treated as tied.
const TIEBREAK_EPS: f64 = 1e-12;

/// Subsets an anomalous item may join.
const ANOMALY_CANDIDATES: [Subset; 2] = [Subset::Validation, Subset::Testing];

/// Assignment strategy, selected once per task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentStrategy {
    Standard,
    Anomaly {
        /// Labels that bar an item from Training.
        anomalous_labels: BTreeSet<LabelId>,
    },
}

impl AssignmentStrategy {
    /// Pick the strategy for a task.
    pub fn for_task(is_anomaly_task: bool, labels: &[Label]) -> Self {
        if !is_anomaly_task {
            return AssignmentStrategy::Standard;
        }
        AssignmentStrategy::Anomaly {
            anomalous_labels: labels
                .iter()
                .filter(|l| l.is_anomalous)
                .map(|l| l.id.clone())
                .collect(),
        }
    }

    pub fn is_anomaly(&self) -> bool {
        matches!(self, AssignmentStrategy::Anomaly { .. })
    }

    /// Candidate subsets for an item, in tie-break order.
    pub fn candidates(&self, label_ids: &BTreeSet<LabelId>, target_subsets: &[Subset]) -> Vec<Subset> {
        match self {
            AssignmentStrategy::Standard => dedup_assignable(target_subsets),
            AssignmentStrategy::Anomaly { anomalous_labels } => {
                if label_ids.iter().any(|l| anomalous_labels.contains(l)) {
                    ANOMALY_CANDIDATES.to_vec()
                } else {
                    Subset::ASSIGNABLE.to_vec()
                }
            }
        }
    }

    /// Place `item` (whose task-relevant labels are `label_ids`) into a subset and
    /// record it in `stats`.
    ///
    /// `item.subset` is overwritten with the chosen subset, which is also returned.
    pub fn assign(
        &self,
        item: &mut LabeledItem,
        label_ids: &BTreeSet<LabelId>,
        target_subsets: &[Subset],
        stats: &mut SubsetStatistics,
    ) -> Result<Subset> {
        if label_ids.is_empty() {
            return Err(Error::empty_label_set(item.item_id.clone()));
        }
        if self.is_anomaly() && dedup_assignable(target_subsets).len() < Subset::ASSIGNABLE.len() {
            log::debug!(
                "item {}: anomaly split ignores target subsets {target_subsets:?}",
                item.item_id
            );
        }

        let candidates = self.candidates(label_ids, target_subsets);
        let (subset, explore_first) =
            pick_subset(stats, label_ids, &candidates).ok_or(Error::NoCandidateSubsets)?;
        log::trace!(
            "item {} -> {subset} (empty-subset rule: {explore_first})",
            item.item_id
        );

        stats.count_item(subset, label_ids);
        item.subset = subset;
        Ok(subset)
    }
}

/// Choose a subset among `candidates` without mutating `stats`.
///
/// Returns `(subset, filled_empty_subset)`, or `None` when `candidates` is empty.
/// Deficiency scores within `1e-12` of each other count as equal, so the earlier
/// candidate wins over one that is smaller only by rounding noise.
#[must_use]
pub fn pick_subset(
    stats: &SubsetStatistics,
    label_ids: &BTreeSet<LabelId>,
    candidates: &[Subset],
) -> Option<(Subset, bool)> {
    if let Some(&empty) = candidates.iter().find(|s| stats.is_empty_subset(**s)) {
        return Some((empty, true));
    }

    let mut best: Option<(Subset, f64)> = None;
    for &s in candidates {
        let score = stats.potential_deficiency(label_ids, s);
        match best {
            Some((_, b)) if score >= b - TIEBREAK_EPS => {}
            _ => best = Some((s, score)),
        }
    }
    best.map(|(s, _)| (s, false))
}

/// Assignable subsets of `subsets`, first occurrence kept.
fn dedup_assignable(subsets: &[Subset]) -> Vec<Subset> {
    let mut out: Vec<Subset> = Vec::with_capacity(3);
    for &s in subsets {
        if s.is_assigned() && !out.contains(&s) {
            out.push(s);
        }
    }
    out
}
