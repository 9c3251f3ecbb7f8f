//! Exploratory analysis of the loaded dataset.
//!
//! This module gathers everything shown before training:
//! - A preview of the first rows and a per-column dtype / null overview
//! - Descriptive statistics for numeric columns
//! - The label distribution
//! - Histograms, per-label box summaries and the correlation matrix

mod distribution;
mod statistics;

use crate::config::ExplorationConfig;
use crate::error::Result;
use crate::target::target_labels;
use crate::types::{
    ColumnInfo, CorrelationMatrix, DatasetInfo, ExplorationReport, FeatureBoxSummary,
};
use crate::utils::{column_f64_values, numeric_column_names};
use polars::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Data profiler for the exploration step.
pub struct DataProfiler;

impl DataProfiler {
    /// Explore a dataset whose label lives in `target`.
    ///
    /// # Errors
    ///
    /// Fails if the target column is missing or does not hold integer labels.
    pub fn explore(
        df: &DataFrame,
        target: &str,
        config: &ExplorationConfig,
    ) -> Result<ExplorationReport> {
        info!(
            "Exploring dataset: {} rows x {} columns",
            df.height(),
            df.width()
        );

        let labels = target_labels(df, target)?;
        let mut warnings = Vec::new();

        let info = Self::info(df);
        if info.total_nulls() > 0 {
            warnings.push(format!(
                "Dataset contains {} null values; affected rows are dropped before training",
                info.total_nulls()
            ));
        }

        let numeric = numeric_column_names(df);
        let mut values: HashMap<&str, Vec<Option<f64>>> = HashMap::new();
        for name in &numeric {
            values.insert(name.as_str(), column_f64_values(df, name)?);
        }

        let describe = numeric
            .iter()
            .map(|name| statistics::describe_column(name, &values[name.as_str()]))
            .collect();

        let class_distribution = distribution::class_distribution(&labels);
        if class_distribution.len() < 2 {
            let message = format!(
                "Target column '{}' has fewer than 2 distinct classes; at least 2 are needed for classification",
                target
            );
            warn!("{}", message);
            warnings.push(message);
        }

        let features: Vec<&String> = numeric.iter().filter(|n| n.as_str() != target).collect();

        let histograms = features
            .iter()
            .map(|name| {
                statistics::histogram(name, &values[name.as_str()], config.histogram_bins)
            })
            .collect();

        let box_summaries = features
            .iter()
            .map(|name| FeatureBoxSummary {
                feature: name.to_string(),
                groups: distribution::box_summaries(&values[name.as_str()], &labels),
            })
            .collect();

        let correlation = Self::correlation(&numeric, &values);

        let skipped: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|c| c.to_string())
            .filter(|c| c != target && !numeric.contains(c))
            .collect();
        if !skipped.is_empty() {
            warnings.push(format!(
                "Non-numeric columns excluded from statistics and training: {}",
                skipped.join(", ")
            ));
        }

        debug!(
            "Exploration finished: {} numeric columns, {} classes",
            numeric.len(),
            class_distribution.len()
        );

        Ok(ExplorationReport {
            shape: df.shape(),
            target_column: target.to_string(),
            head: format!("{}", df.head(Some(config.head_rows))),
            info,
            describe,
            class_distribution,
            histograms,
            box_summaries,
            correlation,
            warnings,
        })
    }

    /// Column dtypes, null counts and estimated memory size.
    pub fn info(df: &DataFrame) -> DatasetInfo {
        let columns = df
            .get_columns()
            .iter()
            .map(|col| {
                let null_count = col.null_count();
                ColumnInfo {
                    name: col.name().to_string(),
                    dtype: col.dtype().to_string(),
                    non_null: col.len() - null_count,
                    null_count,
                }
            })
            .collect();

        DatasetInfo {
            rows: df.height(),
            columns,
            estimated_size_bytes: df.estimated_size(),
        }
    }

    fn correlation(
        columns: &[String],
        values: &HashMap<&str, Vec<Option<f64>>>,
    ) -> CorrelationMatrix {
        let n = columns.len();
        let mut matrix = vec![vec![f64::NAN; n]; n];
        for i in 0..n {
            let a = &values[columns[i].as_str()];
            for j in i..n {
                let r = if i == j {
                    // a column with any spread correlates perfectly with itself
                    let r = statistics::pearson(a, a);
                    if r.is_nan() { r } else { 1.0 }
                } else {
                    statistics::pearson(a, &values[columns[j].as_str()])
                };
                matrix[i][j] = r;
                matrix[j][i] = r;
            }
        }

        CorrelationMatrix {
            columns: columns.to_vec(),
            values: matrix,
        }
    }
}
