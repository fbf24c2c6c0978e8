//! Collaborator interfaces: where task labels and configuration come from.
//!
//! The splitter never talks to storage. Callers load items themselves, hand them to
//! [`crate::SubsetSplitter::split`] as a mutable slice, and persist the updated
//! `subset` fields afterwards.

use crate::{Error, Label, Result, SubsetManagerConfig};
use std::collections::BTreeMap;

/// Identity and kind of the task being split.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaskSpec {
    pub task_id: String,
    /// The task labels whole items rather than regions.
    pub is_task_global: bool,
    /// Anomaly tasks keep anomalous items out of Training.
    pub is_anomaly: bool,
}

impl TaskSpec {
    /// A global, non-anomaly task.
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            is_task_global: true,
            is_anomaly: false,
        }
    }

    pub fn anomaly(task_id: impl Into<String>) -> Self {
        Self {
            is_anomaly: true,
            ..Self::new(task_id)
        }
    }

    pub fn local(mut self) -> Self {
        self.is_task_global = false;
        self
    }
}

/// Source of task label schemas and split configuration.
pub trait TaskDataSource {
    /// Labels of `task_id`. Empty markers are included only when `include_empty`.
    fn task_labels(&self, task_id: &str, include_empty: bool) -> Result<Vec<Label>>;

    /// Split configuration of `task_id` (created with defaults if missing).
    fn subset_config(&self, task_id: &str) -> Result<SubsetManagerConfig>;
}

/// In-memory [`TaskDataSource`].
///
/// Unknown tasks have no labels (an error) and the default configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticTaskSource {
    labels: BTreeMap<String, Vec<Label>>,
    configs: BTreeMap<String, SubsetManagerConfig>,
}

impl StaticTaskSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_task(
        mut self,
        task_id: impl Into<String>,
        labels: Vec<Label>,
        config: SubsetManagerConfig,
    ) -> Self {
        let task_id = task_id.into();
        self.labels.insert(task_id.clone(), labels);
        self.configs.insert(task_id, config);
        self
    }
}

impl TaskDataSource for StaticTaskSource {
    fn task_labels(&self, task_id: &str, include_empty: bool) -> Result<Vec<Label>> {
        let labels = self
            .labels
            .get(task_id)
            .ok_or_else(|| Error::source_failure(format!("unknown task {task_id:?}")))?;
        Ok(labels
            .iter()
            .filter(|l| include_empty || !l.is_empty)
            .cloned()
            .collect())
    }

    fn subset_config(&self, task_id: &str) -> Result<SubsetManagerConfig> {
        Ok(self.configs.get(task_id).cloned().unwrap_or_default())
    }
}
