//! Classification metrics: accuracy, confusion matrix, per-class report.
//!
//! Scores come from linfa's confusion matrix. Division by zero yields 0
//! throughout, so a class that is never predicted has precision 0 rather
//! than NaN.

use crate::error::{LearningError, Result};
use linfa::metrics::ConfusionMatrix as LinfaConfusionMatrix;
use linfa::prelude::*;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fmt;
use vintner_processing::charts::matrix_table;

/// Fraction of positions where `y_pred` equals `y_true`.
///
/// Empty input scores 0.
///
/// # Errors
///
/// Returns [`LearningError::Evaluation`] when the slices differ in length.
pub fn accuracy(y_true: &[i64], y_pred: &[i64]) -> Result<f64> {
    if y_true.is_empty() && y_pred.is_empty() {
        return Ok(0.0);
    }
    let (_, cm) = linfa_matrix(y_true, y_pred)?;
    Ok(zero_if_nan(cm.accuracy()))
}

fn sorted_unique(values: impl IntoIterator<Item = i64>) -> Vec<i64> {
    let mut labels: Vec<i64> = values.into_iter().collect();
    labels.sort_unstable();
    labels.dedup();
    labels
}

fn zero_if_nan(value: f32) -> f64 {
    if value.is_nan() { 0.0 } else { f64::from(value) }
}

/// linfa's matrix over the sorted union of both label sets.
///
/// Labels are encoded as their position in the union, so class `i` of the
/// matrix is `labels[i]`.
fn linfa_matrix(
    y_true: &[i64],
    y_pred: &[i64],
) -> Result<(Vec<i64>, LinfaConfusionMatrix<usize>)> {
    let labels = sorted_unique(y_true.iter().chain(y_pred).copied());
    let encode = |values: &[i64]| -> Array1<usize> {
        values
            .iter()
            .map(|v| labels.binary_search(v).unwrap_or_else(|i| i))
            .collect()
    };
    let truth = encode(y_true);
    let predicted = encode(y_pred);

    let cm = predicted.confusion_matrix(&truth)?;
    Ok((labels, cm))
}

/// Counts of (true label, predicted label) pairs.
///
/// `matrix[i][j]` is the number of samples whose true label is `labels[i]`
/// and whose predicted label is `labels[j]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub labels: Vec<i64>,
    pub matrix: Vec<Vec<usize>>,
    /// Samples left out because a label is outside `labels`.
    #[serde(default)]
    pub dropped: usize,
}

impl ConfusionMatrix {
    /// Matrix over the distinct labels of `y_true`.
    ///
    /// Its side therefore equals the number of labels present in the
    /// evaluated data. Predictions of any other label are counted in
    /// `dropped` only.
    pub fn observed(y_true: &[i64], y_pred: &[i64]) -> Self {
        Self::with_labels(&sorted_unique(y_true.iter().copied()), y_true, y_pred)
    }

    /// Matrix over an explicit label set, in the given order.
    pub fn with_labels(labels: &[i64], y_true: &[i64], y_pred: &[i64]) -> Self {
        let n = labels.len();
        let mut matrix = vec![vec![0usize; n]; n];
        let mut dropped = 0;
        let position = |label: &i64| labels.iter().position(|l| l == label);
        for (t, p) in y_true.iter().zip(y_pred) {
            match (position(t), position(p)) {
                (Some(i), Some(j)) => matrix[i][j] += 1,
                _ => dropped += 1,
            }
        }
        Self {
            labels: labels.to_vec(),
            matrix,
            dropped,
        }
    }

    /// Number of labels, which is both the row and column count.
    pub fn size(&self) -> usize {
        self.labels.len()
    }

    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    /// Count for a (true, predicted) label pair.
    pub fn get(&self, true_label: i64, predicted: i64) -> Option<usize> {
        let i = self.labels.iter().position(|&l| l == true_label)?;
        let j = self.labels.iter().position(|&l| l == predicted)?;
        Some(self.matrix[i][j])
    }

    /// Sum of the diagonal.
    pub fn correct(&self) -> usize {
        (0..self.size()).map(|i| self.matrix[i][i]).sum()
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<String> = self.labels.iter().map(|l| format!("true {}", l)).collect();
        let cols: Vec<String> = self.labels.iter().map(|l| format!("pred {}", l)).collect();
        let cells: Vec<Vec<String>> = self
            .matrix
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect();
        f.write_str(&matrix_table(&rows, &cols, &cells))?;
        if self.dropped > 0 {
            writeln!(
                f,
                "({} predictions of labels absent from the test set not shown)",
                self.dropped
            )?;
        }
        Ok(())
    }
}

/// Precision, recall and F1 of a single class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: i64,
    /// Display name; the label itself unless target names were given.
    pub name: String,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Averaged precision, recall and F1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Per-class metrics with accuracy, macro and weighted averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
}

impl ClassificationReport {
    /// Build the report over the union of labels in `y_true` and `y_pred`.
    ///
    /// Per-class scores are read from linfa's one-vs-all split of the
    /// confusion matrix.
    ///
    /// # Errors
    ///
    /// Returns [`LearningError::TargetNamesMismatch`] when `target_names` is
    /// given and does not have one entry per label, and
    /// [`LearningError::Evaluation`] when the slices differ in length.
    pub fn build(y_true: &[i64], y_pred: &[i64], target_names: Option<&[String]>) -> Result<Self> {
        let labels = sorted_unique(y_true.iter().chain(y_pred).copied());

        if let Some(names) = target_names {
            if names.len() != labels.len() {
                return Err(LearningError::TargetNamesMismatch {
                    labels: labels.len(),
                    names: names.len(),
                });
            }
        }

        let (classes, accuracy) = if labels.is_empty() {
            (Vec::new(), 0.0)
        } else {
            let (labels, cm) = linfa_matrix(y_true, y_pred)?;
            let classes: Vec<ClassMetrics> = labels
                .iter()
                .zip(cm.split_one_vs_all())
                .enumerate()
                .map(|(i, (&label, one_vs_all))| ClassMetrics {
                    label,
                    name: target_names.map_or_else(|| label.to_string(), |n| n[i].clone()),
                    precision: zero_if_nan(one_vs_all.precision()),
                    recall: zero_if_nan(one_vs_all.recall()),
                    f1_score: zero_if_nan(one_vs_all.f1_score()),
                    support: y_true.iter().filter(|&&t| t == label).count(),
                })
                .collect();
            (classes, zero_if_nan(cm.accuracy()))
        };

        let total: usize = classes.iter().map(|c| c.support).sum();
        let k = classes.len().max(1) as f64;
        let macro_avg = AverageMetrics {
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / k,
            recall: classes.iter().map(|c| c.recall).sum::<f64>() / k,
            f1_score: classes.iter().map(|c| c.f1_score).sum::<f64>() / k,
            support: total,
        };

        let weighted = |metric: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                classes
                    .iter()
                    .map(|c| metric(c) * c.support as f64)
                    .sum::<f64>()
                    / total as f64
            }
        };
        let weighted_avg = AverageMetrics {
            precision: weighted(|c| c.precision),
            recall: weighted(|c| c.recall),
            f1_score: weighted(|c| c.f1_score),
            support: total,
        };

        Ok(Self {
            accuracy,
            classes,
            macro_avg,
            weighted_avg,
        })
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .classes
            .iter()
            .map(|c| c.name.chars().count())
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(0);

        writeln!(
            f,
            "{:>w$} {:>9} {:>9} {:>9} {:>9}",
            "",
            "precision",
            "recall",
            "f1-score",
            "support",
            w = width
        )?;
        writeln!(f)?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>w$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                c.name,
                c.precision,
                c.recall,
                c.f1_score,
                c.support,
                w = width
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>w$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.macro_avg.support,
            w = width
        )?;
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>w$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name,
                avg.precision,
                avg.recall,
                avg.f1_score,
                avg.support,
                w = width
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const Y_TRUE: [i64; 5] = [5, 5, 6, 6, 7];
    const Y_PRED: [i64; 5] = [5, 6, 6, 6, 5];

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_accuracy() {
        assert!(close(accuracy(&Y_TRUE, &Y_PRED).unwrap(), 0.6));
        assert_eq!(accuracy(&[1, 2], &[1, 2]).unwrap(), 1.0);
        assert_eq!(accuracy(&[1, 2], &[3, 4]).unwrap(), 0.0);
        assert_eq!(accuracy(&[], &[]).unwrap(), 0.0);
    }

    #[test]
    fn test_accuracy_rejects_length_mismatch() {
        let err = accuracy(&[5, 6, 7], &[5, 6]).unwrap_err();
        assert_eq!(err.error_code(), "EVALUATION_FAILED");
    }

    #[test]
    fn test_confusion_matrix_observed() {
        let cm = ConfusionMatrix::observed(&Y_TRUE, &Y_PRED);
        assert_eq!(cm.labels, vec![5, 6, 7]);
        assert_eq!(
            cm.matrix,
            vec![vec![1, 1, 0], vec![0, 2, 0], vec![1, 0, 0]]
        );
        assert_eq!(cm.total(), 5);
        assert_eq!(cm.dropped, 0);
        assert_eq!(cm.correct(), 3);
        assert_eq!(cm.get(7, 5), Some(1));
        assert_eq!(cm.get(8, 5), None);
    }

    #[test]
    fn test_confusion_matrix_counts_unseen_predictions() {
        let cm = ConfusionMatrix::observed(&[5, 6, 6], &[8, 6, 8]);
        assert_eq!(cm.size(), 2);
        assert_eq!(cm.total(), 1);
        assert_eq!(cm.dropped, 2);
        assert_eq!(cm.total() + cm.dropped, 3);
        assert!(cm.to_string().contains("2 predictions of labels absent"));
    }

    #[test]
    fn test_confusion_matrix_with_labels() {
        let cm = ConfusionMatrix::with_labels(&[3, 5, 6, 7], &Y_TRUE, &Y_PRED);
        assert_eq!(cm.size(), 4);
        assert_eq!(cm.matrix[0], vec![0, 0, 0, 0]);
        assert_eq!(cm.total(), 5);
    }

    #[test]
    fn test_confusion_matrix_display() {
        let text = ConfusionMatrix::observed(&[5, 6], &[5, 5]).to_string();
        assert!(text.contains("pred 5"));
        assert!(text.lines().nth(1).unwrap().starts_with("true 5"));
        assert!(!text.contains("not shown"));
    }

    #[test]
    fn test_classification_report_values() {
        let report = ClassificationReport::build(&Y_TRUE, &Y_PRED, None).unwrap();
        assert_eq!(report.classes.len(), 3);

        let c5 = &report.classes[0];
        assert_eq!(c5.name, "5");
        assert!(close(c5.precision, 0.5) && close(c5.recall, 0.5) && close(c5.f1_score, 0.5));

        let c6 = &report.classes[1];
        assert!(close(c6.precision, 2.0 / 3.0));
        assert!(close(c6.recall, 1.0));
        assert!(close(c6.f1_score, 0.8));

        // never predicted: zero, not NaN
        let c7 = &report.classes[2];
        assert_eq!((c7.precision, c7.recall, c7.f1_score), (0.0, 0.0, 0.0));
        assert_eq!(c7.support, 1);

        assert!(close(report.accuracy, 0.6));
        assert!(close(report.macro_avg.precision, 0.3889));
        assert!(close(report.macro_avg.recall, 0.5));
        assert!(close(report.macro_avg.f1_score, 0.4333));
        assert!(close(report.weighted_avg.precision, 0.4667));
        assert!(close(report.weighted_avg.recall, 0.6));
        assert!(close(report.weighted_avg.f1_score, 0.52));
        assert_eq!(report.weighted_avg.support, 5);
    }

    #[test]
    fn test_classification_report_includes_predicted_only_labels() {
        let report = ClassificationReport::build(&[5, 5], &[5, 8], None).unwrap();
        let labels: Vec<i64> = report.classes.iter().map(|c| c.label).collect();
        assert_eq!(labels, vec![5, 8]);
        assert_eq!(report.classes[1].support, 0);
        assert_eq!(report.classes[1].precision, 0.0);
        assert!(close(report.classes[0].recall, 0.5));
    }

    #[test]
    fn test_classification_report_single_label() {
        let report = ClassificationReport::build(&[6, 6, 6], &[6, 6, 6], None).unwrap();
        assert_eq!(report.classes.len(), 1);
        assert!(close(report.accuracy, 1.0));
        assert!(close(report.classes[0].recall, 1.0));
    }

    #[test]
    fn test_classification_report_empty() {
        let report = ClassificationReport::build(&[], &[], None).unwrap();
        assert!(report.classes.is_empty());
        assert_eq!(report.accuracy, 0.0);
    }

    #[test]
    fn test_classification_report_target_names() {
        let names: Vec<String> = ["five", "six", "seven"].iter().map(|s| s.to_string()).collect();
        let report = ClassificationReport::build(&Y_TRUE, &Y_PRED, Some(&names)).unwrap();
        assert_eq!(report.classes[2].name, "seven");

        let too_many: Vec<String> = (3..=8).map(|l| l.to_string()).collect();
        let err = ClassificationReport::build(&Y_TRUE, &Y_PRED, Some(&too_many)).unwrap_err();
        assert!(matches!(
            err,
            LearningError::TargetNamesMismatch { labels: 3, names: 6 }
        ));
    }

    #[test]
    fn test_classification_report_display() {
        let report = ClassificationReport::build(&Y_TRUE, &Y_PRED, None).unwrap();
        let text = report.to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].ends_with("precision    recall  f1-score   support"));
        assert_eq!(lines[2], "           5      0.50      0.50      0.50         2");
        assert!(text.contains("    accuracy                          0.60         5"));
        assert!(lines.last().unwrap().starts_with("weighted avg"));
    }
}
