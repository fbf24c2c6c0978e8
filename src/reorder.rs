//! Batch reordering: place rare-label and multi-label items first.
//!
//! Sequential assignment is greedy, so arrival order matters. When many new items
//! arrive at once, [`BatchReorderer`] shuffles them (removing upstream ordering bias)
//! and then sorts by a priority score:
//!
//! ```text
//!   priority(item) = sum over labels l of item: 1 / |items carrying l|
//! ```
//!
//! Items with rare labels, or with many labels, score higher and are assigned while
//! every subset still has slack. Common items are flexible and fill in afterwards.
//! The sort is stable, so equal scores keep their shuffled order.

use crate::LabelId;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};

/// Smallest batch that gets reordered.
pub const DEFAULT_REORDER_THRESHOLD: usize = 25;

/// Priority reordering for batches of unassigned items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchReorderer {
    /// Batches shorter than this are left in arrival order.
    pub threshold: usize,
}

impl Default for BatchReorderer {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_REORDER_THRESHOLD,
        }
    }
}

impl BatchReorderer {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    /// Whether a batch of `len` items is reordered.
    pub fn applies_to(&self, len: usize) -> bool {
        len >= self.threshold
    }

    /// Shuffle `items` with `rng`, then sort by descending priority.
    ///
    /// Returns `items` untouched when the batch is below the threshold.
    pub fn reorder<T, R, F>(&self, mut items: Vec<T>, rng: &mut R, label_ids: F) -> Vec<T>
    where
        R: Rng + ?Sized,
        F: Fn(&T) -> &BTreeSet<LabelId>,
    {
        if !self.applies_to(items.len()) {
            return items;
        }
        items.shuffle(rng);
        let scores = priority_scores(&items, &label_ids);

        let mut scored: Vec<(f64, T)> = scores.into_iter().zip(items).collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.into_iter().map(|(_, item)| item).collect()
    }
}

/// Priority score per position of `items`.
#[must_use]
pub fn priority_scores<T, F>(items: &[T], label_ids: F) -> Vec<f64>
where
    F: Fn(&T) -> &BTreeSet<LabelId>,
{
    let mut groups: BTreeMap<&LabelId, Vec<usize>> = BTreeMap::new();
    for (pos, item) in items.iter().enumerate() {
        for label in label_ids(item) {
            groups.entry(label).or_default().push(pos);
        }
    }

    let mut scores = vec![0.0; items.len()];
    for members in groups.values() {
        if members.is_empty() {
            continue;
        }
        let weight = 1.0 / members.len() as f64;
        for &pos in members {
            scores[pos] += weight;
        }
    }
    scores
}
