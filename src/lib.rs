//! `subsplit`: label-balanced Training / Validation / Testing assignment for
//! incrementally annotated datasets.
//!
//! Designed for datasets that grow a few items at a time: every split pass keeps the
//! subsets already chosen, places the new (or explicitly reset) items, and keeps each
//! label's distribution across subsets close to the target ratios.
//!
//! **Goals:**
//! - **Online**: each placement is greedy and sees every placement before it.
//! - **Per-label balance**: ratios are tracked per label, not just per subset, so rare
//!   labels reach Validation and Testing too.
//! - **Deterministic given a seed**: same items + config + seed → same split.
//!
//! **Building blocks:**
//! - [`compute_target_ratios`] / [`compute_anomaly_target_ratios`]: target ratios from
//!   configuration or dataset size.
//! - [`SubsetStatistics`]: per-subset, per-label counts with derived ratios and
//!   deficiency (normalized shortfall below target).
//! - [`AssignmentStrategy`]: fill-empty-subsets-first, then deficiency argmin. The
//!   anomaly variant keeps anomalous items out of Training.
//! - [`BatchReorderer`]: rare-label and multi-label items first for large batches.
//! - [`SubsetSplitter`]: runs a pass over a `&mut [LabeledItem]`.
//!
//! **Non-goals:**
//! - No storage, transport, or UI. Callers load items, call
//!   [`SubsetSplitter::split`], and persist the updated `subset` fields.
//! - Not a global optimizer: placements are never revisited except through an
//!   explicit reset.
//!
//! # Deficiency
//!
//! For label `l` and subset `s` with target ratio `t_s`:
//!
//! ```text
//!   ratio[s][l]      = count[s][l] / sum_s' count[s'][l]
//!   deficiency[s][l] = max(0, t_s - ratio[s][l]) / t_s       (0 when t_s = 0)
//! ```
//!
//! A new item goes to the candidate subset that minimizes the summed deficiency after
//! adding it. Surplus is free; only shortfall costs.
//!
//! # Example
//!
//! ```rust
//! use subsplit::{Label, LabeledItem, Subset, SubsetManagerConfig, SubsetSplitter, TaskSpec};
//!
//! let labels = vec![Label::new("cat"), Label::new("dog")];
//! let mut splitter =
//!     SubsetSplitter::new(TaskSpec::new("classify"), labels, SubsetManagerConfig::default())
//!         .with_seed(42);
//!
//! let mut items: Vec<LabeledItem> = (0..50)
//!     .map(|i| LabeledItem::new(format!("img{i}"), [if i % 5 == 0 { "dog" } else { "cat" }]))
//!     .collect();
//!
//! let report = splitter.split(&mut items, None).unwrap();
//! assert_eq!(report.newly_assigned, 50);
//! assert!(items.iter().all(|i| i.subset != Subset::Unassigned));
//! ```

#![forbid(unsafe_code)]

mod error;
pub use error::*;

mod subset;
pub use subset::*;

mod item;
pub use item::*;

mod config;
pub use config::*;

mod ratio;
pub use ratio::*;

mod stats;
pub use stats::*;

mod strategy;
pub use strategy::*;

mod reorder;
pub use reorder::*;

mod stable_hash;
pub use stable_hash::*;

mod source;
pub use source::*;

mod splitter;
pub use splitter::*;
