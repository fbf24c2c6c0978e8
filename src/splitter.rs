//! Split passes: the front door of the crate.
//!
//! [`SubsetSplitter`] is built once per task (label schema, configuration, and
//! strategy are fixed for its lifetime) and runs split passes over item slices:
//!
//! ```text
//! let mut splitter = SubsetSplitter::for_task(&source, task)?.with_seed(7);
//! let report = splitter.split(&mut items, None)?;   // items[..].subset updated
//! persist(&items);                                   // your code
//! ```
//!
//! One pass:
//!
//! 1. **Reset** (optional): items in the reset subsets become `Unassigned` and the
//!    processing order is shuffled.
//! 2. **Seed**: every item that still has a subset is counted into fresh
//!    [`SubsetStatistics`], whether or not it is inside the reset set.
//! 3. **Targets**: ratios are computed from the number of items in the pass.
//! 4. **Reorder**: large batches of unassigned items go through [`BatchReorderer`].
//! 5. **Assign**: each unassigned item is placed by the task's
//!    [`AssignmentStrategy`], strictly in sequence; every placement updates the
//!    counters the next item sees.
//!
//! An error (an item without relevant labels) stops the pass. Items placed before
//! it keep their subset; re-running the pass places the rest.

use crate::{
    compute_anomaly_target_ratios, compute_target_ratios, pass_seed, AssignmentStrategy,
    BatchReorderer, ItemLabelResolver, Label, LabelId, LabelScope, LabeledItem, Result, Subset,
    SubsetManagerConfig, SubsetStatistics, TargetRatios, TaskDataSource, TaskScopedResolver,
    TaskSpec, DEFAULT_REORDER_THRESHOLD,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;

/// Tuning knobs for a [`SubsetSplitter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SplitterOptions {
    /// Smallest batch of unassigned items that gets priority-reordered.
    pub reorder_threshold: usize,
    /// Count empty-label markers as labels.
    pub include_empty: bool,
}

impl Default for SplitterOptions {
    fn default() -> Self {
        Self {
            reorder_threshold: DEFAULT_REORDER_THRESHOLD,
            include_empty: true,
        }
    }
}

/// Summary of one split pass.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SplitReport {
    pub task_id: String,
    /// Items moved back to `Unassigned` by the reset step.
    pub reset: usize,
    /// Items that kept their subset and seeded the statistics.
    pub pre_assigned: usize,
    /// Items placed by the strategy in this pass.
    pub newly_assigned: usize,
    /// Whether the unassigned batch was priority-reordered.
    pub reordered: bool,
    /// Targets used for the pass.
    pub targets: TargetRatios,
    /// Items per subset after the pass, in canonical order.
    pub subset_counts: [u64; 3],
    /// Total deficiency after the pass.
    pub total_deficiency: f64,
}

/// Split pass driver for one task.
#[derive(Debug, Clone)]
pub struct SubsetSplitter<R = TaskScopedResolver> {
    task: TaskSpec,
    config: SubsetManagerConfig,
    labels: Vec<Label>,
    scope: LabelScope,
    strategy: AssignmentStrategy,
    reorderer: BatchReorderer,
    resolver: R,
    rng: StdRng,
}

impl SubsetSplitter<TaskScopedResolver> {
    /// Create a splitter with a seed drawn from the thread RNG.
    ///
    /// Use [`SubsetSplitter::with_seed`] for reproducible passes.
    pub fn new(task: TaskSpec, labels: Vec<Label>, config: SubsetManagerConfig) -> Self {
        let options = SplitterOptions::default();
        let scope = LabelScope::from_labels(&labels, task.is_task_global, options.include_empty);
        let strategy = AssignmentStrategy::for_task(task.is_anomaly, &labels);
        let seed: u64 = rand::rng().random();
        Self {
            task,
            config,
            labels,
            scope,
            strategy,
            reorderer: BatchReorderer::new(options.reorder_threshold),
            resolver: TaskScopedResolver,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Load the task's labels (empty markers included) and configuration.
    pub fn for_task<S>(source: &S, task: TaskSpec) -> Result<Self>
    where
        S: TaskDataSource + ?Sized,
    {
        let labels = source.task_labels(&task.task_id, true)?;
        let config = source.subset_config(&task.task_id)?;
        log::debug!(
            "loaded {} labels for task {} (anomaly: {})",
            labels.len(),
            task.task_id,
            task.is_anomaly
        );
        Ok(Self::new(task, labels, config))
    }
}

impl<R: ItemLabelResolver> SubsetSplitter<R> {
    /// Reseed deterministically: the pass RNG depends on `seed` and the task id.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(pass_seed(seed, &self.task.task_id));
        self
    }

    pub fn with_options(mut self, options: SplitterOptions) -> Self {
        self.reorderer = BatchReorderer::new(options.reorder_threshold);
        self.scope =
            LabelScope::from_labels(&self.labels, self.task.is_task_global, options.include_empty);
        self
    }

    /// Replace the label resolver.
    pub fn with_resolver<R2: ItemLabelResolver>(self, resolver: R2) -> SubsetSplitter<R2> {
        SubsetSplitter {
            task: self.task,
            config: self.config,
            labels: self.labels,
            scope: self.scope,
            strategy: self.strategy,
            reorderer: self.reorderer,
            resolver,
            rng: self.rng,
        }
    }

    pub fn task(&self) -> &TaskSpec {
        &self.task
    }

    pub fn config(&self) -> &SubsetManagerConfig {
        &self.config
    }

    pub fn strategy(&self) -> &AssignmentStrategy {
        &self.strategy
    }

    /// Run one pass using the task's configured policy.
    ///
    /// Unassigned items are placed into any subset. With `train_validation_remixing`
    /// enabled, a second pass then resets and remixes Training and Validation
    /// (Testing is kept).
    ///
    /// With remixing the returned report describes the remix pass only: items placed
    /// by the first pass into Training or Validation are counted in `reset` and again
    /// in `newly_assigned`, and Testing items appear as `pre_assigned`.
    pub fn split_task(&mut self, items: &mut [LabeledItem]) -> Result<SplitReport> {
        let placed = self.split(items, None)?;
        if !self.config.train_validation_remixing {
            return Ok(placed);
        }
        self.split(
            items,
            Some([Subset::Training, Subset::Validation].as_slice()),
        )
    }

    /// Run one split pass over `items`, writing `subset` in place.
    ///
    /// When `reset` names subsets, their items are unassigned first and new
    /// placements are restricted to those subsets. `None` (or an empty list) places
    /// unassigned items into any of the three subsets.
    pub fn split(
        &mut self,
        items: &mut [LabeledItem],
        reset: Option<&[Subset]>,
    ) -> Result<SplitReport> {
        let reset: Vec<Subset> = reset
            .unwrap_or(&[])
            .iter()
            .copied()
            .filter(|s| s.is_assigned())
            .collect();
        let target_subsets: Vec<Subset> = if reset.is_empty() {
            Subset::ASSIGNABLE.to_vec()
        } else {
            reset.clone()
        };

        if self.strategy.is_anomaly() && target_subsets.len() < Subset::ASSIGNABLE.len() {
            log::info!(
                "task {}: anomaly split ignores target subsets {target_subsets:?}; all eligible subsets are considered",
                self.task.task_id
            );
        }

        let mut order: Vec<usize> = (0..items.len()).collect();
        let mut n_reset = 0usize;
        if !reset.is_empty() {
            for item in items.iter_mut() {
                if reset.contains(&item.subset) {
                    item.subset = Subset::Unassigned;
                    n_reset += 1;
                }
            }
            order.shuffle(&mut self.rng);
        }

        let mut stats = SubsetStatistics::new(TargetRatios::default()).with_anomalous_labels(
            self.labels
                .iter()
                .filter(|l| self.strategy.is_anomaly() && l.is_anomalous)
                .map(|l| l.id.clone()),
        );
        let mut pending: Vec<(usize, BTreeSet<LabelId>)> = Vec::new();
        let mut pre_assigned = 0usize;
        for idx in order {
            let label_ids = self.resolver.item_label_ids(&items[idx], &self.scope);
            if items[idx].subset.is_assigned() {
                stats.count_item(items[idx].subset, &label_ids);
                pre_assigned += 1;
            } else {
                pending.push((idx, label_ids));
            }
        }

        let n_seen = items.len() as u64;
        let targets = if self.strategy.is_anomaly() {
            compute_anomaly_target_ratios(n_seen, &self.config)
        } else {
            compute_target_ratios(n_seen, &self.config)
        };
        stats.set_targets(targets);

        let reordered = self.reorderer.applies_to(pending.len());
        let pending = self
            .reorderer
            .reorder(pending, &mut self.rng, |(_, label_ids)| label_ids);

        log::debug!(
            "task {}: {} reset, {} pre-assigned, {} to assign (reordered: {reordered}), targets {:?}",
            self.task.task_id,
            n_reset,
            pre_assigned,
            pending.len(),
            targets.normal
        );

        let mut newly_assigned = 0usize;
        for (idx, label_ids) in &pending {
            self.strategy
                .assign(&mut items[*idx], label_ids, &target_subsets, &mut stats)?;
            newly_assigned += 1;
        }

        let report = SplitReport {
            task_id: self.task.task_id.clone(),
            reset: n_reset,
            pre_assigned,
            newly_assigned,
            reordered,
            targets,
            subset_counts: stats.subset_counts(),
            total_deficiency: stats.total_deficiency(),
        };
        log::info!(
            "task {}: assigned {} items, subset counts {:?}",
            report.task_id,
            report.newly_assigned,
            report.subset_counts
        );
        Ok(report)
    }
}

/// Split several tasks (e.g. the tasks of a chain) one after another.
///
/// Each task gets its own splitter, statistics and seed; passes share no state.
pub fn split_task_chain<S>(
    source: &S,
    tasks: &mut [(TaskSpec, Vec<LabeledItem>)],
    seed: u64,
) -> Result<Vec<SplitReport>>
where
    S: TaskDataSource + ?Sized,
{
    let mut reports = Vec::with_capacity(tasks.len());
    for (task, items) in tasks.iter_mut() {
        let mut splitter = SubsetSplitter::for_task(source, task.clone())?.with_seed(seed);
        reports.push(splitter.split_task(items)?);
    }
    Ok(reports)
}
