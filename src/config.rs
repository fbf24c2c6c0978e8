//! Per-task subset split configuration.

use crate::{Error, Result};

/// Smallest documented value for a configured proportion.
pub const MIN_PROPORTION: f64 = 0.1;
/// Largest documented value for a configured proportion.
pub const MAX_PROPORTION: f64 = 1.0;

/// Manually configured Training / Validation / Testing proportions.
///
/// These do not have to sum to 1: [`crate::compute_target_ratios`] rescales them
/// (or falls back to equal thirds when they sum to ~0).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubsetProportions {
    pub train: f64,
    pub validation: f64,
    pub test: f64,
}

impl Default for SubsetProportions {
    fn default() -> Self {
        Self {
            train: 0.7,
            validation: 0.2,
            test: 0.1,
        }
    }
}

impl SubsetProportions {
    pub fn new(train: f64, validation: f64, test: f64) -> Self {
        Self {
            train,
            validation,
            test,
        }
    }

    /// Proportions in canonical subset order.
    pub fn as_array(&self) -> [f64; 3] {
        [self.train, self.validation, self.test]
    }

    pub fn sum(&self) -> f64 {
        self.train + self.validation + self.test
    }
}

/// Subset manager configuration for one task.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubsetManagerConfig {
    /// Derive target ratios from the dataset size instead of `proportions`.
    pub auto_subset_fractions: bool,
    /// Reset and remix Training and Validation on every task-level split.
    ///
    /// Testing is never remixed, so evaluation results stay comparable.
    pub train_validation_remixing: bool,
    /// Manual proportions (used when `auto_subset_fractions` is false).
    pub proportions: SubsetProportions,
}

impl Default for SubsetManagerConfig {
    fn default() -> Self {
        Self {
            auto_subset_fractions: true,
            train_validation_remixing: false,
            proportions: SubsetProportions::default(),
        }
    }
}

impl SubsetManagerConfig {
    /// Use manual proportions (disables auto fractions).
    pub fn with_proportions(mut self, train: f64, validation: f64, test: f64) -> Self {
        self.auto_subset_fractions = false;
        self.proportions = SubsetProportions::new(train, validation, test);
        self
    }

    /// Enable or disable Training/Validation remixing.
    pub fn with_remixing(mut self, enabled: bool) -> Self {
        self.train_validation_remixing = enabled;
        self
    }

    /// Strict check of the documented `[0.1, 1.0]` range of every proportion.
    ///
    /// Splitting never requires this: out-of-range values are still normalized.
    /// It exists for callers that accept configuration from users.
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("train", self.proportions.train),
            ("validation", self.proportions.validation),
            ("test", self.proportions.test),
        ];
        for (name, v) in named {
            if !v.is_finite() || !(MIN_PROPORTION..=MAX_PROPORTION).contains(&v) {
                return Err(Error::invalid_configuration(format!(
                    "{name} proportion {v} is outside [{MIN_PROPORTION}, {MAX_PROPORTION}]"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SubsetManagerConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_proportions() {
        let cfg = SubsetManagerConfig::default().with_proportions(0.0, 0.5, 0.5);
        assert!(matches!(
            cfg.validate(),
            Err(Error::InvalidConfiguration(_))
        ));
        let cfg = SubsetManagerConfig::default().with_proportions(0.5, f64::NAN, 0.5);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn with_proportions_switches_to_manual_mode() {
        let cfg = SubsetManagerConfig::default().with_proportions(0.6, 0.2, 0.2);
        assert!(!cfg.auto_subset_fractions);
        assert_eq!(cfg.proportions.as_array(), [0.6, 0.2, 0.2]);
        assert!((cfg.proportions.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn proportions_sum_is_not_normalized() {
        let p = SubsetProportions::new(0.5, 0.5, 0.5);
        assert!((p.sum() - 1.5).abs() < 1e-12);
    }
}
