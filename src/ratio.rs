//! Target ratio policy.
//!
//! Turns a [`SubsetManagerConfig`] (and the number of annotated items seen so far)
//! into the Training / Validation / Testing ratios the assignment strategies aim for.
//!
//! - Auto mode picks a fixed vector by dataset size: small datasets split evenly so
//!   every subset gets examples early; large datasets favour Training.
//! - Manual mode uses the configured proportions, normalized to sum to 1.

use crate::SubsetManagerConfig;

/// Tolerance used when checking whether proportions sum to 1 (or to 0).
pub const PROPORTION_SUM_EPS: f64 = 1e-6;

/// Below this many annotated items, auto mode splits evenly.
pub const AUTO_SMALL_DATASET: u64 = 10;
/// Below this many annotated items (and at or above [`AUTO_SMALL_DATASET`]), auto
/// mode uses the medium-size vector.
pub const AUTO_MEDIUM_DATASET: u64 = 40;

const AUTO_SMALL_RATIOS: [f64; 3] = [0.33, 0.33, 0.33];
const AUTO_MEDIUM_RATIOS: [f64; 3] = [0.50, 0.25, 0.25];
const AUTO_LARGE_RATIOS: [f64; 3] = [0.80, 0.10, 0.10];
const EQUAL_THIRDS: [f64; 3] = [1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0];

/// How configured proportions were adjusted to form a valid ratio vector.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProportionAdjustment {
    /// Proportions summed to ~0 and were replaced by equal thirds.
    DegenerateSum { sum: f64 },
    /// Proportions were divided by their sum.
    Rescaled { sum: f64 },
}

/// Target ratios for one split pass.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetRatios {
    /// Ratios for ordinary labels, in canonical subset order.
    pub normal: [f64; 3],
    /// Ratios for anomalous labels (anomaly tasks only). Training is always 0.
    pub anomalous: Option<[f64; 3]>,
    /// Present when manual proportions had to be adjusted.
    pub adjustment: Option<ProportionAdjustment>,
}

impl Default for TargetRatios {
    fn default() -> Self {
        Self {
            normal: AUTO_SMALL_RATIOS,
            anomalous: None,
            adjustment: None,
        }
    }
}

impl TargetRatios {
    /// Ratio vector that applies to a label column.
    pub fn for_label(&self, is_anomalous: bool) -> [f64; 3] {
        match (is_anomalous, self.anomalous) {
            (true, Some(a)) => a,
            _ => self.normal,
        }
    }
}

/// Compute the target ratios for a standard task.
pub fn compute_target_ratios(n_annotations_seen: u64, cfg: &SubsetManagerConfig) -> TargetRatios {
    if cfg.auto_subset_fractions {
        let normal = if n_annotations_seen < AUTO_SMALL_DATASET {
            AUTO_SMALL_RATIOS
        } else if n_annotations_seen < AUTO_MEDIUM_DATASET {
            AUTO_MEDIUM_RATIOS
        } else {
            AUTO_LARGE_RATIOS
        };
        return TargetRatios {
            normal,
            anomalous: None,
            adjustment: None,
        };
    }

    let (normal, adjustment) = normalize_proportions(cfg.proportions.as_array());
    match adjustment {
        Some(ProportionAdjustment::DegenerateSum { sum }) => log::warn!(
            "subset proportions sum to {sum}; falling back to equal thirds"
        ),
        Some(ProportionAdjustment::Rescaled { sum }) => log::warn!(
            "subset proportions sum to {sum} instead of 1; rescaled to {normal:?}"
        ),
        None => {}
    }
    TargetRatios {
        normal,
        anomalous: None,
        adjustment,
    }
}

/// Compute the target ratios for an anomaly task.
///
/// Ordinary labels use [`compute_target_ratios`]. Anomalous labels never target
/// Training; they are split between Validation and Testing in proportion to those
/// two entries of the ordinary vector.
pub fn compute_anomaly_target_ratios(
    n_annotations_seen: u64,
    cfg: &SubsetManagerConfig,
) -> TargetRatios {
    let mut out = compute_target_ratios(n_annotations_seen, cfg);
    let [_, v, t] = out.normal;
    let vt = v + t;
    let anomalous = if vt.is_finite() && vt > PROPORTION_SUM_EPS {
        [0.0, v / vt, t / vt]
    } else {
        [0.0, 0.5, 0.5]
    };
    out.anomalous = Some(anomalous);
    out
}

fn normalize_proportions(p: [f64; 3]) -> ([f64; 3], Option<ProportionAdjustment>) {
    // Non-finite entries count as 0.
    let p = p.map(|x| if x.is_finite() { x.max(0.0) } else { 0.0 });
    let sum: f64 = p.iter().sum();
    if (sum - 1.0).abs() <= PROPORTION_SUM_EPS {
        return (p, None);
    }
    if sum.abs() <= PROPORTION_SUM_EPS {
        return (EQUAL_THIRDS, Some(ProportionAdjustment::DegenerateSum { sum }));
    }
    (p.map(|x| x / sum), Some(ProportionAdjustment::Rescaled { sum }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_close(a: [f64; 3], b: [f64; 3]) {
        for i in 0..3 {
            assert!((a[i] - b[i]).abs() < 1e-9, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn auto_mode_thresholds() {
        let cfg = SubsetManagerConfig::default();
        assert_eq!(compute_target_ratios(0, &cfg).normal, [0.33, 0.33, 0.33]);
        assert_eq!(compute_target_ratios(9, &cfg).normal, [0.33, 0.33, 0.33]);
        assert_eq!(compute_target_ratios(10, &cfg).normal, [0.5, 0.25, 0.25]);
        assert_eq!(compute_target_ratios(39, &cfg).normal, [0.5, 0.25, 0.25]);
        assert_eq!(compute_target_ratios(40, &cfg).normal, [0.8, 0.1, 0.1]);
        assert_eq!(compute_target_ratios(10_000, &cfg).adjustment, None);
    }

    #[test]
    fn manual_proportions_summing_to_one_are_used_verbatim() {
        let cfg = SubsetManagerConfig::default().with_proportions(0.6, 0.3, 0.1);
        let r = compute_target_ratios(0, &cfg);
        assert_eq!(r.normal, [0.6, 0.3, 0.1]);
        assert_eq!(r.adjustment, None);
    }

    #[test]
    fn manual_proportions_are_rescaled() {
        let cfg = SubsetManagerConfig::default().with_proportions(0.5, 0.5, 0.5);
        let r = compute_target_ratios(100, &cfg);
        assert_close(r.normal, [1.0 / 3.0; 3]);
        assert!(matches!(
            r.adjustment,
            Some(ProportionAdjustment::Rescaled { sum }) if (sum - 1.5).abs() < 1e-12
        ));
    }

    #[test]
    fn zero_proportions_fall_back_to_thirds() {
        let cfg = SubsetManagerConfig::default().with_proportions(0.0, 0.0, 0.0);
        let r = compute_target_ratios(100, &cfg);
        assert_close(r.normal, [1.0 / 3.0; 3]);
        assert!(matches!(
            r.adjustment,
            Some(ProportionAdjustment::DegenerateSum { .. })
        ));
    }

    #[test]
    fn anomaly_ratios_exclude_training() {
        let cfg = SubsetManagerConfig::default().with_proportions(0.5, 0.3, 0.2);
        let r = compute_anomaly_target_ratios(100, &cfg);
        assert_eq!(r.normal, [0.5, 0.3, 0.2]);
        assert_close(r.for_label(true), [0.0, 0.6, 0.4]);
        assert_eq!(r.for_label(false), [0.5, 0.3, 0.2]);
    }

    #[test]
    fn anomaly_ratios_in_auto_mode_split_evenly() {
        let r = compute_anomaly_target_ratios(1_000, &SubsetManagerConfig::default());
        assert_close(r.for_label(true), [0.0, 0.5, 0.5]);
    }

    #[test]
    fn standard_ratios_ignore_the_anomalous_flag() {
        let r = compute_target_ratios(1_000, &SubsetManagerConfig::default());
        assert_eq!(r.for_label(true), r.normal);
    }

    proptest! {
        #[test]
        fn manual_ratios_are_a_distribution(
            train in prop_oneof![Just(0.0), 0.0f64..10.0],
            validation in prop_oneof![Just(0.0), 0.0f64..10.0],
            test in prop_oneof![Just(0.0), Just(f64::NAN), 0.0f64..10.0],
        ) {
            let cfg = SubsetManagerConfig::default().with_proportions(train, validation, test);
            let r = compute_target_ratios(0, &cfg);
            let sum: f64 = r.normal.iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-6, "sum={}", sum);
            for v in r.normal {
                prop_assert!(v.is_finite());
                prop_assert!((0.0..=1.0).contains(&v));
            }
        }
    }
}
