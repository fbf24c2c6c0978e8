//! Property tests for split-pass invariants.
//!
//! 1. **Coverage**: without a reset, every item ends in an assignable subset.
//! 2. **Pre-assigned items are kept**: items outside the reset set keep their subset.
//! 3. **No empty subset**: three or more new items reach all three subsets.
//! 4. **Ratio monotonicity**: counting an item into `s` never lowers `ratio[s][l]`
//!    for its labels.
//! 5. **Anomaly exclusion**: the anomaly strategy never puts anomalous items in
//!    Training.
//! 6. **Deficiency bounds**: every deficiency cell stays in `[0, 1]`.

use proptest::prelude::*;
use std::collections::BTreeSet;
use subsplit::{
    Label, LabelId, LabeledItem, Subset, SubsetManagerConfig, SubsetSplitter, SubsetStatistics,
    TargetRatios, TaskSpec,
};

const POOL: [&str; 5] = ["a", "b", "c", "d", "e"];

fn arb_labels() -> impl Strategy<Value = BTreeSet<LabelId>> {
    prop::collection::btree_set(prop::sample::select(POOL.to_vec()), 1..4)
        .prop_map(|s| s.into_iter().map(str::to_string).collect())
}

fn arb_subset() -> impl Strategy<Value = Subset> {
    prop_oneof![
        3 => Just(Subset::Unassigned),
        1 => Just(Subset::Training),
        1 => Just(Subset::Validation),
        1 => Just(Subset::Testing),
    ]
}

fn arb_config() -> impl Strategy<Value = SubsetManagerConfig> {
    prop_oneof![
        Just(SubsetManagerConfig::default()),
        (0.0f64..1.0, 0.0f64..1.0, 0.0f64..1.0)
            .prop_map(|(t, v, te)| SubsetManagerConfig::default().with_proportions(t, v, te)),
    ]
}

fn pool_labels() -> Vec<Label> {
    POOL.iter().map(|l| Label::new(*l)).collect()
}

fn make_items(rows: Vec<(BTreeSet<LabelId>, Subset)>) -> Vec<LabeledItem> {
    rows.into_iter()
        .enumerate()
        .map(|(i, (labels, subset))| LabeledItem::new(format!("i{i}"), labels).in_subset(subset))
        .collect()
}

proptest! {
    #[test]
    fn every_item_is_assigned_and_pre_assigned_items_are_kept(
        rows in prop::collection::vec((arb_labels(), arb_subset()), 0..80),
        cfg in arb_config(),
        seed in any::<u64>(),
    ) {
        let mut items = make_items(rows);
        let before: Vec<Subset> = items.iter().map(|i| i.subset).collect();
        let mut splitter = SubsetSplitter::new(TaskSpec::new("t"), pool_labels(), cfg).with_seed(seed);
        let report = splitter.split(&mut items, None).unwrap();

        for (item, prev) in items.iter().zip(&before) {
            prop_assert!(item.subset.is_assigned());
            if prev.is_assigned() {
                prop_assert_eq!(item.subset, *prev);
            }
        }
        prop_assert_eq!(report.pre_assigned + report.newly_assigned, items.len());
        let total: u64 = report.subset_counts.iter().sum();
        prop_assert_eq!(total as usize, items.len());
    }

    #[test]
    fn reset_keeps_items_outside_the_reset_set(
        rows in prop::collection::vec((arb_labels(), arb_subset()), 1..60),
        reset in prop::sample::subsequence(Subset::ASSIGNABLE.to_vec(), 1..=3),
        seed in any::<u64>(),
    ) {
        let mut items = make_items(rows);
        let before: Vec<Subset> = items.iter().map(|i| i.subset).collect();
        let mut splitter = SubsetSplitter::new(
            TaskSpec::new("t"),
            pool_labels(),
            SubsetManagerConfig::default(),
        )
        .with_seed(seed);
        splitter.split(&mut items, Some(reset.as_slice())).unwrap();

        for (item, prev) in items.iter().zip(&before) {
            prop_assert!(item.subset.is_assigned());
            if prev.is_assigned() && !reset.contains(prev) {
                prop_assert_eq!(item.subset, *prev);
            } else {
                prop_assert!(reset.contains(&item.subset));
            }
        }
    }

    #[test]
    fn three_new_items_reach_every_subset(
        labels in prop::collection::vec(arb_labels(), 3..60),
        cfg in arb_config(),
        seed in any::<u64>(),
    ) {
        let mut items = make_items(labels.into_iter().map(|l| (l, Subset::Unassigned)).collect());
        let mut splitter = SubsetSplitter::new(TaskSpec::new("t"), pool_labels(), cfg).with_seed(seed);
        let report = splitter.split(&mut items, None).unwrap();
        for c in report.subset_counts {
            prop_assert!(c >= 1, "{:?}", report.subset_counts);
        }
    }

    #[test]
    fn counting_never_lowers_the_counted_ratio(
        history in prop::collection::vec((arb_labels(), 0usize..3), 0..40),
        item in arb_labels(),
        s in 0usize..3,
    ) {
        let mut stats = SubsetStatistics::new(TargetRatios::default());
        for (labels, idx) in &history {
            stats.count_item(Subset::ASSIGNABLE[*idx], labels);
        }
        let subset = Subset::ASSIGNABLE[s];
        let before: Vec<f64> = item.iter().map(|l| stats.ratio(subset, l)).collect();
        stats.count_item(subset, &item);
        for (l, b) in item.iter().zip(before) {
            prop_assert!(stats.ratio(subset, l) >= b);
        }
        for l in POOL {
            for s in Subset::ASSIGNABLE {
                let d = stats.deficiency(s, l);
                prop_assert!((0.0..=1.0).contains(&d), "deficiency {}", d);
            }
        }
    }

    #[test]
    fn anomaly_split_never_trains_on_anomalous_items(
        rows in prop::collection::vec((any::<bool>(), any::<bool>()), 1..60),
        seed in any::<u64>(),
    ) {
        let labels = vec![Label::new("normal"), Label::anomalous("anomalous")];
        let mut items: Vec<LabeledItem> = rows
            .iter()
            .enumerate()
            .map(|(i, &(anomalous, both))| {
                let ids: Vec<&str> = match (anomalous, both) {
                    (true, true) => vec!["anomalous", "normal"],
                    (true, false) => vec!["anomalous"],
                    (false, _) => vec!["normal"],
                };
                LabeledItem::new(format!("i{i}"), ids)
            })
            .collect();
        let mut splitter = SubsetSplitter::new(
            TaskSpec::anomaly("t"),
            labels,
            SubsetManagerConfig::default(),
        )
        .with_seed(seed);
        splitter.split(&mut items, None).unwrap();

        for item in &items {
            prop_assert!(item.subset.is_assigned());
            if item.label_ids.contains("anomalous") {
                prop_assert_ne!(item.subset, Subset::Training);
            }
        }
    }
}
