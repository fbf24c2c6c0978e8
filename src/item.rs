//! Items, labels, and task-scoped label resolution.

use crate::Subset;
use std::collections::BTreeSet;

/// Label identifier.
pub type LabelId = String;

/// A label of the task's schema.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Label {
    pub id: LabelId,
    /// Anomaly class: anomaly tasks keep items carrying it out of Training.
    pub is_anomalous: bool,
    /// "Empty" marker (the item was annotated as containing nothing).
    pub is_empty: bool,
}

impl Label {
    pub fn new(id: impl Into<LabelId>) -> Self {
        Self {
            id: id.into(),
            is_anomalous: false,
            is_empty: false,
        }
    }

    pub fn anomalous(id: impl Into<LabelId>) -> Self {
        Self {
            is_anomalous: true,
            ..Self::new(id)
        }
    }

    pub fn empty(id: impl Into<LabelId>) -> Self {
        Self {
            is_empty: true,
            ..Self::new(id)
        }
    }
}

/// An annotated dataset item.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LabeledItem {
    /// Stable identifier, unique within the collection.
    pub item_id: String,
    /// Every label annotated on the item (across all tasks).
    pub label_ids: BTreeSet<LabelId>,
    /// Current subset. Written in place by the splitter.
    pub subset: Subset,
}

impl LabeledItem {
    /// An unassigned item.
    pub fn new<I, L>(item_id: impl Into<String>, label_ids: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<LabelId>,
    {
        Self {
            item_id: item_id.into(),
            label_ids: label_ids.into_iter().map(Into::into).collect(),
            subset: Subset::Unassigned,
        }
    }

    pub fn in_subset(mut self, subset: Subset) -> Self {
        self.subset = subset;
        self
    }
}

/// The label universe of one task, as seen by label resolution.
#[derive(Debug, Clone, Default)]
pub struct LabelScope {
    /// Labels belonging to the task.
    pub task_label_ids: BTreeSet<LabelId>,
    /// Subset of `task_label_ids` that are empty markers.
    pub empty_label_ids: BTreeSet<LabelId>,
    /// The task labels whole items (classification-like) rather than regions.
    pub is_task_global: bool,
    /// Keep empty markers among the relevant labels.
    pub include_empty: bool,
}

impl LabelScope {
    /// Build a scope from the task's label schema.
    pub fn from_labels(labels: &[Label], is_task_global: bool, include_empty: bool) -> Self {
        Self {
            task_label_ids: labels.iter().map(|l| l.id.clone()).collect(),
            empty_label_ids: labels
                .iter()
                .filter(|l| l.is_empty)
                .map(|l| l.id.clone())
                .collect(),
            is_task_global,
            include_empty,
        }
    }
}

/// Resolves which of an item's labels matter for a task.
pub trait ItemLabelResolver {
    fn item_label_ids(&self, item: &LabeledItem, scope: &LabelScope) -> BTreeSet<LabelId>;
}

/// Default resolver: restricts an item's labels to the task's label universe.
///
/// - Labels of other tasks are dropped.
/// - Empty markers are dropped unless `include_empty` is set.
/// - For task-global scopes an empty marker is exclusive: it is dropped when the
///   item also carries a real label of the task.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskScopedResolver;

impl ItemLabelResolver for TaskScopedResolver {
    fn item_label_ids(&self, item: &LabeledItem, scope: &LabelScope) -> BTreeSet<LabelId> {
        let mut out: BTreeSet<LabelId> = item
            .label_ids
            .intersection(&scope.task_label_ids)
            .cloned()
            .collect();
        if !scope.include_empty {
            out.retain(|l| !scope.empty_label_ids.contains(l));
        } else if scope.is_task_global && out.iter().any(|l| !scope.empty_label_ids.contains(l)) {
            out.retain(|l| !scope.empty_label_ids.contains(l));
        }
        out
    }
}
