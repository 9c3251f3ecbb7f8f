//! Training configuration.
//!
//! [`TrainingConfig`] controls the train/test split and the decision tree
//! hyperparameters. Defaults reproduce the classic wine-quality analysis:
//! a stratified 75/25 split seeded with 42 and a Gini tree of depth 5.

use crate::error::LearningError;
use serde::{Deserialize, Serialize};

/// Configuration for splitting the data and fitting the tree.
///
/// Use [`TrainingConfig::builder()`] to construct a validated configuration.
///
/// # Example
///
/// ```rust
/// use vintner_learning::TrainingConfig;
///
/// let config = TrainingConfig::builder()
///     .test_size(0.3)
///     .max_depth(Some(4))
///     .random_seed(7)
///     .build()
///     .unwrap();
/// assert_eq!(config.min_samples_leaf, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Fraction of rows held out for evaluation, in `(0.0, 1.0)`.
    ///
    /// Default: `0.25`
    pub test_size: f64,

    /// Seed for the split shuffle.
    ///
    /// Default: `42`
    pub random_seed: u64,

    /// Keep label proportions equal in the train and test sets.
    ///
    /// Falls back to a plain shuffled split when a class is too small.
    ///
    /// Default: `true`
    pub stratify: bool,

    /// Maximum depth of the tree, `None` for unlimited.
    ///
    /// Default: `Some(5)`
    pub max_depth: Option<usize>,

    /// Minimum number of samples a node needs before it may split.
    ///
    /// Default: `20`
    pub min_samples_split: usize,

    /// Minimum number of samples in each leaf.
    ///
    /// Default: `10`
    pub min_samples_leaf: usize,

    /// Number of tree levels shown by the text rendering.
    ///
    /// Default: `3`
    pub tree_display_depth: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: 0.25,
            random_seed: 42,
            stratify: true,
            max_depth: Some(5),
            min_samples_split: 20,
            min_samples_leaf: 10,
            tree_display_depth: 3,
        }
    }
}

impl TrainingConfig {
    /// Create a new builder for `TrainingConfig`.
    pub fn builder() -> TrainingConfigBuilder {
        TrainingConfigBuilder::default()
    }

    /// Check every setting against its accepted range.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::InvalidConfig`] if:
    /// - `test_size` is not in range `(0.0, 1.0)`
    /// - `max_depth` is `Some(0)`
    /// - `min_samples_split` is less than 2
    /// - `min_samples_leaf` is less than 1
    pub fn validate(&self) -> Result<(), LearningError> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(LearningError::InvalidConfig(
                "test_size must be between 0.0 and 1.0 (exclusive)".to_string(),
            ));
        }

        if self.max_depth == Some(0) {
            return Err(LearningError::InvalidConfig(
                "max_depth must be at least 1".to_string(),
            ));
        }

        if self.min_samples_split < 2 {
            return Err(LearningError::InvalidConfig(
                "min_samples_split must be at least 2".to_string(),
            ));
        }

        if self.min_samples_leaf == 0 {
            return Err(LearningError::InvalidConfig(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for [`TrainingConfig`].
#[derive(Debug, Default)]
pub struct TrainingConfigBuilder {
    config: TrainingConfig,
}

impl TrainingConfigBuilder {
    /// Set the held-out fraction (default: 0.25).
    #[must_use]
    pub fn test_size(mut self, size: f64) -> Self {
        self.config.test_size = size;
        self
    }

    /// Set the random seed for reproducibility (default: 42).
    #[must_use]
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = seed;
        self
    }

    /// Enable or disable the stratified split (default: true).
    #[must_use]
    pub fn stratify(mut self, stratify: bool) -> Self {
        self.config.stratify = stratify;
        self
    }

    /// Set the maximum tree depth (default: `Some(5)`).
    #[must_use]
    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Set the minimum samples required to split a node (default: 20).
    #[must_use]
    pub fn min_samples_split(mut self, samples: usize) -> Self {
        self.config.min_samples_split = samples;
        self
    }

    /// Set the minimum samples per leaf (default: 10).
    #[must_use]
    pub fn min_samples_leaf(mut self, samples: usize) -> Self {
        self.config.min_samples_leaf = samples;
        self
    }

    /// Set how many levels the text rendering shows (default: 3).
    #[must_use]
    pub fn tree_display_depth(mut self, depth: usize) -> Self {
        self.config.tree_display_depth = depth;
        self
    }

    /// Build the configuration, validating all settings.
    ///
    /// # Errors
    ///
    /// See [`TrainingConfig::validate`].
    pub fn build(self) -> Result<TrainingConfig, LearningError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrainingConfig::default();
        assert_eq!(config.test_size, 0.25);
        assert_eq!(config.random_seed, 42);
        assert!(config.stratify);
        assert_eq!(config.max_depth, Some(5));
        assert_eq!(config.min_samples_split, 20);
        assert_eq!(config.min_samples_leaf, 10);
        assert_eq!(config.tree_display_depth, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_chaining() {
        let config = TrainingConfig::builder()
            .test_size(0.3)
            .random_seed(7)
            .stratify(false)
            .max_depth(None)
            .min_samples_split(4)
            .min_samples_leaf(2)
            .tree_display_depth(2)
            .build()
            .unwrap();

        assert!((config.test_size - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.random_seed, 7);
        assert!(!config.stratify);
        assert_eq!(config.max_depth, None);
        assert_eq!(config.min_samples_split, 4);
        assert_eq!(config.min_samples_leaf, 2);
        assert_eq!(config.tree_display_depth, 2);
    }

    #[test]
    fn test_invalid_test_size() {
        for size in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            let result = TrainingConfig::builder().test_size(size).build();
            assert!(result.unwrap_err().to_string().contains("test_size"));
        }
    }

    #[test]
    fn test_invalid_tree_parameters() {
        let result = TrainingConfig::builder().max_depth(Some(0)).build();
        assert!(result.unwrap_err().to_string().contains("max_depth"));

        let result = TrainingConfig::builder().min_samples_split(1).build();
        assert!(result.unwrap_err().to_string().contains("min_samples_split"));

        let result = TrainingConfig::builder().min_samples_leaf(0).build();
        assert!(result.unwrap_err().to_string().contains("min_samples_leaf"));
    }

    #[test]
    fn test_serde_roundtrip_keeps_defaults() {
        let json = serde_json::to_string(&TrainingConfig::default()).unwrap();
        let back: TrainingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TrainingConfig::default());
    }
}
