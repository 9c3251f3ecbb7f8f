//! Result types shared by the pipeline and the report.

use crate::metrics::{ClassificationReport, ConfusionMatrix};
use serde::{Deserialize, Serialize};

/// Contribution of one feature to the tree's splits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    /// Normalized impurity decrease, in `[0, 1]`.
    pub importance: f64,
}

/// Sizes and outcome of the train/test partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitSummary {
    pub train_rows: usize,
    pub test_rows: usize,
    pub stratified: bool,
    pub seed: u64,
}

/// Shape of the fitted tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSummary {
    pub depth: usize,
    pub leaves: usize,
    /// Labels the tree can predict, ascending.
    pub classes: Vec<i64>,
    /// Text rendering limited to the configured display depth.
    pub rendered: String,
}

/// Test-set metrics of the fitted tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub accuracy: f64,
    pub confusion_matrix: ConfusionMatrix,
    pub classification_report: ClassificationReport,
    /// True when the report was rebuilt without class names because the
    /// names did not match the labels seen in the test set.
    pub report_degraded: bool,
}
