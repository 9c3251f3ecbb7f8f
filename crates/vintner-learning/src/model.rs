//! Decision tree classifier on top of `linfa-trees`.
//!
//! Quality scores are arbitrary integers, while linfa wants class indices,
//! so [`LabelEncoder`] maps between the two.

use crate::config::TrainingConfig;
use crate::error::{LearningError, Result};
use crate::types::FeatureImportance;
use linfa::prelude::*;
use linfa_trees::{DecisionTree, SplitQuality, TreeNode};
use ndarray::{Array1, Array2};
use std::fmt::Write;
use tracing::{debug, info};

/// Bidirectional mapping between integer labels and dense class indices.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelEncoder {
    classes: Vec<i64>,
}

impl LabelEncoder {
    /// Learn the sorted set of distinct labels.
    pub fn fit(labels: &[i64]) -> Self {
        let mut classes = labels.to_vec();
        classes.sort_unstable();
        classes.dedup();
        Self { classes }
    }

    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    /// Class indices of `labels`.
    ///
    /// # Errors
    ///
    /// Fails on a label that was not seen by [`fit`](Self::fit).
    pub fn encode(&self, labels: &[i64]) -> Result<Vec<usize>> {
        labels
            .iter()
            .map(|label| {
                self.classes.binary_search(label).map_err(|_| {
                    LearningError::InvalidData(format!("unknown label {}", label))
                })
            })
            .collect()
    }

    /// Label of class index `index`.
    pub fn decode(&self, index: usize) -> Option<i64> {
        self.classes.get(index).copied()
    }
}

/// A fitted Gini decision tree with named features.
pub struct DecisionTreeModel {
    tree: DecisionTree<f64, usize>,
    encoder: LabelEncoder,
    feature_names: Vec<String>,
}

impl std::fmt::Debug for DecisionTreeModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionTreeModel")
            .field("classes", &self.encoder.classes())
            .field("feature_names", &self.feature_names)
            .field("depth", &self.depth())
            .field("leaves", &self.leaf_count())
            .finish()
    }
}

impl DecisionTreeModel {
    /// Fit a tree on `features` (one row per sample) and integer `labels`.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::InvalidData`] if the shapes disagree or the
    /// set is empty, and [`LearningError::TrainingFailed`] if linfa rejects
    /// the parameters or the data.
    pub fn fit(
        features: &Array2<f64>,
        labels: &[i64],
        feature_names: &[String],
        config: &TrainingConfig,
    ) -> Result<Self> {
        if features.nrows() == 0 {
            return Err(LearningError::InvalidData(
                "cannot fit a tree on an empty training set".to_string(),
            ));
        }
        if features.nrows() != labels.len() {
            return Err(LearningError::InvalidData(format!(
                "{} feature rows but {} labels",
                features.nrows(),
                labels.len()
            )));
        }
        if features.ncols() != feature_names.len() {
            return Err(LearningError::InvalidData(format!(
                "{} feature columns but {} feature names",
                features.ncols(),
                feature_names.len()
            )));
        }

        let encoder = LabelEncoder::fit(labels);
        let targets = Array1::from(encoder.encode(labels)?);
        let dataset = Dataset::new(features.clone(), targets)
            .with_feature_names(feature_names.to_vec());

        info!(
            "Fitting decision tree on {} samples, {} features, {} classes",
            features.nrows(),
            features.ncols(),
            encoder.classes().len()
        );

        let tree = DecisionTree::params()
            .split_quality(SplitQuality::Gini)
            .max_depth(config.max_depth)
            .min_weight_split(config.min_samples_split as f32)
            .min_weight_leaf(config.min_samples_leaf as f32)
            .fit(&dataset)
            .map_err(|e| LearningError::TrainingFailed(e.to_string()))?;

        let model = Self {
            tree,
            encoder,
            feature_names: feature_names.to_vec(),
        };
        debug!(
            "Tree fitted: depth {}, {} leaves",
            model.depth(),
            model.leaf_count()
        );
        Ok(model)
    }

    /// Predicted label of every row of `features`.
    pub fn predict(&self, features: &Array2<f64>) -> Result<Vec<i64>> {
        if features.ncols() != self.feature_names.len() {
            return Err(LearningError::InvalidData(format!(
                "model expects {} features, got {}",
                self.feature_names.len(),
                features.ncols()
            )));
        }
        let predicted: Array1<usize> = self.tree.predict(features);
        predicted
            .iter()
            .map(|&idx| {
                self.encoder.decode(idx).ok_or_else(|| {
                    LearningError::InvalidData(format!("tree produced unknown class {}", idx))
                })
            })
            .collect()
    }

    /// Importance of every feature, largest first.
    ///
    /// Values are clamped to be non-negative and rescaled to sum to 1. A tree
    /// that never split reports zero for every feature.
    pub fn feature_importances(&self) -> Vec<FeatureImportance> {
        let raw = self.tree.feature_importance();
        let mut values: Vec<f64> = (0..self.feature_names.len())
            .map(|i| raw.get(i).copied().unwrap_or(0.0))
            .map(|v| if v.is_finite() && v > 0.0 { v } else { 0.0 })
            .collect();

        let total: f64 = values.iter().sum();
        if total > 0.0 {
            for v in &mut values {
                *v /= total;
            }
        }

        let mut importances: Vec<FeatureImportance> = self
            .feature_names
            .iter()
            .zip(values)
            .map(|(feature, importance)| FeatureImportance {
                feature: feature.clone(),
                importance,
            })
            .collect();
        importances.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        importances
    }

    /// Indented text rendering of the first `max_depth` levels.
    ///
    /// ```text
    /// |--- alcohol < 10.53
    /// |   |--- sulphates < 0.57
    /// |   |   |--- class: 5
    /// ```
    pub fn render(&self, max_depth: usize) -> String {
        let mut out = String::new();
        self.render_node(self.tree.root_node(), 0, max_depth, &mut out);
        out
    }

    fn render_node(
        &self,
        node: &TreeNode<f64, usize>,
        level: usize,
        max_depth: usize,
        out: &mut String,
    ) {
        let indent = "|   ".repeat(level);

        if node.is_leaf() {
            let class = node
                .prediction()
                .and_then(|idx| self.encoder.decode(idx))
                .map_or_else(|| "?".to_string(), |label| label.to_string());
            let _ = writeln!(out, "{}|--- class: {}", indent, class);
            return;
        }

        if level >= max_depth {
            let _ = writeln!(
                out,
                "{}|--- truncated branch of depth {}",
                indent,
                subtree_depth(node)
            );
            return;
        }

        let (feature_idx, threshold, _) = node.split();
        let name = self
            .feature_names
            .get(feature_idx)
            .map_or("?", String::as_str);
        // linfa sends values below the threshold left
        for (child, op) in node.children().into_iter().zip(["<", ">="]) {
            if let Some(child) = child {
                let _ = writeln!(out, "{}|--- {} {} {:.2}", indent, name, op, threshold);
                self.render_node(child, level + 1, max_depth, out);
            }
        }
    }

    /// Full tree as a LaTeX/TikZ figure with a feature legend.
    pub fn export_tikz(&self) -> String {
        self.tree.export_to_tikz().with_legend().to_string()
    }

    /// Number of split levels below the root.
    pub fn depth(&self) -> usize {
        self.tree.max_depth()
    }

    pub fn leaf_count(&self) -> usize {
        self.tree.num_leaves()
    }

    /// Labels the model can predict, ascending.
    pub fn classes(&self) -> &[i64] {
        self.encoder.classes()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}

fn subtree_depth(node: &TreeNode<f64, usize>) -> usize {
    if node.is_leaf() {
        return 0;
    }
    node.children()
        .into_iter()
        .flatten()
        .map(|child| subtree_depth(child))
        .max()
        .unwrap_or(0)
        + 1
}
