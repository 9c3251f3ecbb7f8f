//! Result types produced by dataset exploration.

use serde::{Deserialize, Serialize};

/// Dtype and null bookkeeping for a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub non_null: usize,
    pub null_count: usize,
}

/// Table-level overview, the counterpart of a dataframe `info()` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub rows: usize,
    pub columns: Vec<ColumnInfo>,
    /// Approximate in-memory size reported by polars.
    pub estimated_size_bytes: usize,
}

impl DatasetInfo {
    /// Total number of nulls across all columns.
    pub fn total_nulls(&self) -> usize {
        self.columns.iter().map(|c| c.null_count).sum()
    }
}

/// Descriptive statistics for one numeric column.
///
/// Non-finite values (NaN) mark statistics that cannot be computed, such as
/// the standard deviation of a single observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Number of samples carrying one label value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCount {
    pub label: i64,
    pub count: usize,
}

/// Equal-width histogram of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub column: String,
    /// Lower edge of the first bin.
    pub lower: f64,
    /// Upper edge of the last bin.
    pub upper: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Width of each bin.
    pub fn bin_width(&self) -> f64 {
        if self.counts.is_empty() {
            0.0
        } else {
            (self.upper - self.lower) / self.counts.len() as f64
        }
    }

    /// Number of values counted.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Minimum, quartiles and maximum of a group of values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiveNumberSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Five-number summary of a feature for one label value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSummary {
    pub label: i64,
    pub count: usize,
    /// `None` when the group has no non-null values.
    pub summary: Option<FiveNumberSummary>,
}

/// Box summaries of one feature, one group per label value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureBoxSummary {
    pub feature: String,
    pub groups: Vec<BoxSummary>,
}

/// Pearson correlation between every pair of numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major, `columns.len()` x `columns.len()`.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Correlation between two named columns.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }

    /// Correlations of every other column with `target`, strongest first.
    pub fn ranked_against(&self, target: &str) -> Vec<(String, f64)> {
        let Some(t) = self.columns.iter().position(|c| c == target) else {
            return Vec::new();
        };
        let mut ranked: Vec<(String, f64)> = self
            .columns
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != t)
            .map(|(i, name)| (name.clone(), self.values[t][i]))
            .filter(|(_, r)| r.is_finite())
            .collect();
        ranked.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
        ranked
    }
}

/// Everything the exploration step learned about the dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorationReport {
    pub shape: (usize, usize),
    pub target_column: String,
    /// First rows rendered as a table.
    pub head: String,
    pub info: DatasetInfo,
    pub describe: Vec<ColumnStats>,
    pub class_distribution: Vec<ClassCount>,
    pub histograms: Vec<Histogram>,
    pub box_summaries: Vec<FeatureBoxSummary>,
    pub correlation: CorrelationMatrix,
    pub warnings: Vec<String>,
}

impl ExplorationReport {
    /// Number of distinct label values.
    pub fn class_count(&self) -> usize {
        self.class_distribution.len()
    }
}
