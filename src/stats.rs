//! Running per-subset, per-label statistics.
//!
//! [`SubsetStatistics`] owns two aligned count tables:
//!
//! - `subset_label_counter[l][s]`: items in subset `s` carrying label `l` (an item
//!   with several labels increments several columns);
//! - `subset_counter[s]`: items in subset `s` (exactly one increment per item).
//!
//! From these it derives, after every mutation and over the whole table:
//!
//! ```text
//!   ratio[s][l]      = c[s][l] / sum_s' c[s'][l]            (0 when the column is empty)
//!   deficiency[s][l] = (target[s] - ratio[s][l]) / target[s] when ratio <= target, else 0
//!                      (0 when target[s] <= 0)
//! ```
//!
//! Deficiency is a normalized shortfall in `[0, 1]`. A surplus is never penalized.
//! Label columns are allocated in first-seen order and never removed.

use crate::{LabelId, Subset, TargetRatios};
use std::collections::{BTreeMap, BTreeSet};

/// Per-subset, per-label occurrence counts with derived ratios and deficiency.
#[derive(Debug, Clone, Default)]
pub struct SubsetStatistics {
    targets: TargetRatios,
    anomalous_labels: BTreeSet<LabelId>,
    label_index: BTreeMap<LabelId, usize>,
    columns: Vec<Column>,
    subset_counter: [u64; 3],
}

#[derive(Debug, Clone)]
struct Column {
    label: LabelId,
    anomalous: bool,
    counts: [u64; 3],
    ratios: [f64; 3],
    deficiency: [f64; 3],
}

fn column_ratios(counts: [u64; 3]) -> [f64; 3] {
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return [0.0; 3];
    }
    let total = total as f64;
    counts.map(|c| c as f64 / total)
}

fn column_deficiency(ratios: [f64; 3], target: [f64; 3]) -> [f64; 3] {
    let mut out = [0.0; 3];
    for s in 0..3 {
        let t = target[s];
        if t > 0.0 && ratios[s] <= t {
            out[s] = ((t - ratios[s]) / t).clamp(0.0, 1.0);
        }
    }
    out
}

impl SubsetStatistics {
    /// Create empty statistics aiming for `targets`.
    pub fn new(targets: TargetRatios) -> Self {
        Self {
            targets,
            ..Self::default()
        }
    }

    /// Mark labels whose columns use the anomalous target vector.
    pub fn with_anomalous_labels<I>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = LabelId>,
    {
        self.anomalous_labels = labels.into_iter().collect();
        for col in &mut self.columns {
            col.anomalous = self.anomalous_labels.contains(&col.label);
        }
        self.recompute();
        self
    }

    pub fn targets(&self) -> &TargetRatios {
        &self.targets
    }

    /// Replace the target ratios and recompute deficiency.
    pub fn set_targets(&mut self, targets: TargetRatios) {
        self.targets = targets;
        self.recompute();
    }

    /// Record one item placed in `subset` carrying `label_ids`.
    ///
    /// `Subset::Unassigned` is not a counted subset; the call is a no-op for it.
    pub fn count_item(&mut self, subset: Subset, label_ids: &BTreeSet<LabelId>) {
        let Some(s) = subset.index() else {
            return;
        };
        for label in label_ids {
            let idx = self.column_for(label);
            self.columns[idx].counts[s] += 1;
        }
        self.subset_counter[s] += 1;
        self.recompute();
    }

    /// Total deficiency if an item carrying `label_ids` were added to `candidate`.
    ///
    /// Does not mutate `self`. Labels not seen yet are simulated as new columns.
    /// Returns `f64::INFINITY` for `Subset::Unassigned`.
    pub fn potential_deficiency(&self, label_ids: &BTreeSet<LabelId>, candidate: Subset) -> f64 {
        let Some(s) = candidate.index() else {
            return f64::INFINITY;
        };
        let mut total = 0.0;
        for col in &self.columns {
            let mut counts = col.counts;
            if label_ids.contains(&col.label) {
                counts[s] += 1;
            }
            total += self.deficiency_sum(counts, col.anomalous);
        }
        for label in label_ids {
            if !self.label_index.contains_key(label) {
                let mut counts = [0u64; 3];
                counts[s] = 1;
                total += self.deficiency_sum(counts, self.anomalous_labels.contains(label));
            }
        }
        total
    }

    /// Sum of the deficiency table.
    pub fn total_deficiency(&self) -> f64 {
        self.columns
            .iter()
            .map(|c| c.deficiency.iter().sum::<f64>())
            .sum()
    }

    /// Items counted in `subset` (0 for `Unassigned`).
    pub fn subset_count(&self, subset: Subset) -> u64 {
        subset.index().map_or(0, |s| self.subset_counter[s])
    }

    /// Per-subset item counts in canonical order.
    pub fn subset_counts(&self) -> [u64; 3] {
        self.subset_counter
    }

    pub fn is_empty_subset(&self, subset: Subset) -> bool {
        self.subset_count(subset) == 0
    }

    /// Items counted across all subsets.
    pub fn total_items(&self) -> u64 {
        self.subset_counter.iter().sum()
    }

    /// Occurrences of `label` in `subset`.
    pub fn label_count(&self, subset: Subset, label: &str) -> u64 {
        match (subset.index(), self.label_index.get(label)) {
            (Some(s), Some(&l)) => self.columns[l].counts[s],
            _ => 0,
        }
    }

    /// Share of `label`'s occurrences that sit in `subset`.
    pub fn ratio(&self, subset: Subset, label: &str) -> f64 {
        match (subset.index(), self.label_index.get(label)) {
            (Some(s), Some(&l)) => self.columns[l].ratios[s],
            _ => 0.0,
        }
    }

    pub fn deficiency(&self, subset: Subset, label: &str) -> f64 {
        match (subset.index(), self.label_index.get(label)) {
            (Some(s), Some(&l)) => self.columns[l].deficiency[s],
            _ => 0.0,
        }
    }

    /// Labels seen so far, in column (first-seen) order.
    pub fn label_ids(&self) -> impl Iterator<Item = &LabelId> + '_ {
        self.columns.iter().map(|c| &c.label)
    }

    fn deficiency_sum(&self, counts: [u64; 3], anomalous: bool) -> f64 {
        column_deficiency(column_ratios(counts), self.targets.for_label(anomalous))
            .iter()
            .sum()
    }

    fn column_for(&mut self, label: &LabelId) -> usize {
        if let Some(&idx) = self.label_index.get(label) {
            return idx;
        }
        let idx = self.columns.len();
        self.columns.push(Column {
            label: label.clone(),
            anomalous: self.anomalous_labels.contains(label),
            counts: [0; 3],
            ratios: [0.0; 3],
            deficiency: [0.0; 3],
        });
        self.label_index.insert(label.clone(), idx);
        idx
    }

    fn recompute(&mut self) {
        let targets = self.targets;
        for col in &mut self.columns {
            col.ratios = column_ratios(col.counts);
            col.deficiency = column_deficiency(col.ratios, targets.for_label(col.anomalous));
        }
    }
}
