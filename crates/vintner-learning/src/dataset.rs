//! Conversion of a loaded table into a dense feature matrix.

use crate::error::{LearningError, Result};
use ndarray::{Array2, Axis};
use polars::prelude::DataFrame;
use tracing::{debug, warn};
use vintner_processing::{column_f64_values, is_numeric_dtype, target_labels};

/// Features and labels ready for training.
///
/// Rows are in table order after null rows have been removed.
#[derive(Debug, Clone)]
pub struct ModelInput {
    /// Row-major feature matrix, one column per entry of `feature_names`.
    pub features: Array2<f64>,
    /// Integer label of each row.
    pub labels: Vec<i64>,
    /// Names of the feature columns.
    pub feature_names: Vec<String>,
    /// Name of the label column.
    pub target: String,
    /// Number of rows removed because they contained a null.
    pub dropped_rows: usize,
    /// Columns left out because they are not numeric.
    pub skipped_columns: Vec<String>,
}

impl ModelInput {
    /// Build the feature matrix from every column of `df` except `target`.
    ///
    /// Non-numeric columns are skipped, and rows holding a null (or NaN) in
    /// any used column are dropped. Both are logged as warnings.
    ///
    /// # Errors
    ///
    /// Fails if the target is missing or not integral, if no numeric
    /// feature column remains, or if no complete row remains.
    pub fn from_dataframe(df: &DataFrame, target: &str) -> Result<Self> {
        let labels = target_labels(df, target)?;

        let mut feature_names = Vec::new();
        let mut skipped_columns = Vec::new();
        for column in df.get_columns() {
            let name = column.name().to_string();
            if name == target {
                continue;
            }
            if is_numeric_dtype(column.dtype()) {
                feature_names.push(name);
            } else {
                skipped_columns.push(name);
            }
        }

        if !skipped_columns.is_empty() {
            warn!(
                "Skipping non-numeric feature columns: {}",
                skipped_columns.join(", ")
            );
        }
        if feature_names.is_empty() {
            return Err(LearningError::InvalidData(format!(
                "no numeric feature columns besides '{}'",
                target
            )));
        }

        let columns = feature_names
            .iter()
            .map(|name| column_f64_values(df, name))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut rows = Vec::with_capacity(df.height() * feature_names.len());
        let mut kept_labels = Vec::with_capacity(df.height());
        for (i, label) in labels.iter().enumerate() {
            let Some(label) = label else { continue };
            let row: Option<Vec<f64>> = columns
                .iter()
                .map(|col| col[i].filter(|v| !v.is_nan()))
                .collect();
            if let Some(row) = row {
                rows.extend(row);
                kept_labels.push(*label);
            }
        }

        let dropped_rows = df.height() - kept_labels.len();
        if dropped_rows > 0 {
            warn!("Dropped {} rows containing null values", dropped_rows);
        }
        if kept_labels.is_empty() {
            return Err(LearningError::InvalidData(
                "no complete rows left after dropping nulls".to_string(),
            ));
        }

        let features = Array2::from_shape_vec((kept_labels.len(), feature_names.len()), rows)
            .map_err(|e| LearningError::InvalidData(e.to_string()))?;

        debug!(
            "Prepared model input: {} rows x {} features",
            features.nrows(),
            features.ncols()
        );

        Ok(Self {
            features,
            labels: kept_labels,
            feature_names,
            target: target.to_string(),
            dropped_rows,
            skipped_columns,
        })
    }

    /// Number of usable rows.
    pub fn n_samples(&self) -> usize {
        self.labels.len()
    }

    /// Rows at `indices`, in the given order.
    pub fn subset(&self, indices: &[usize]) -> (Array2<f64>, Vec<i64>) {
        let features = self.features.select(Axis(0), indices);
        let labels = indices.iter().map(|&i| self.labels[i]).collect();
        (features, labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_dataframe_selects_numeric_features() {
        let df = df!(
            "alcohol" => [9.4, 9.8, 10.5],
            "color" => ["red", "red", "red"],
            "pH" => [3.51, 3.2, 3.26],
            "quality" => [5i64, 5, 6]
        )
        .unwrap();

        let input = ModelInput::from_dataframe(&df, "quality").unwrap();
        assert_eq!(input.feature_names, vec!["alcohol", "pH"]);
        assert_eq!(input.skipped_columns, vec!["color"]);
        assert_eq!(input.features.dim(), (3, 2));
        assert_eq!(input.labels, vec![5, 5, 6]);
        assert_eq!(input.features[[2, 1]], 3.26);
        assert_eq!(input.dropped_rows, 0);
    }

    #[test]
    fn test_from_dataframe_drops_null_rows() {
        let df = df!(
            "alcohol" => [Some(9.4), None, Some(10.5), Some(11.0)],
            "quality" => [Some(5i64), Some(5), None, Some(7)]
        )
        .unwrap();

        let input = ModelInput::from_dataframe(&df, "quality").unwrap();
        assert_eq!(input.n_samples(), 2);
        assert_eq!(input.dropped_rows, 2);
        assert_eq!(input.labels, vec![5, 7]);
    }

    #[test]
    fn test_from_dataframe_without_features() {
        let df = df!("quality" => [5i64, 6]).unwrap();
        let result = ModelInput::from_dataframe(&df, "quality");
        assert!(matches!(result, Err(LearningError::InvalidData(_))));
    }

    #[test]
    fn test_from_dataframe_missing_target() {
        let df = df!("alcohol" => [9.4]).unwrap();
        let result = ModelInput::from_dataframe(&df, "quality");
        assert!(matches!(result, Err(LearningError::Processing(_))));
    }

    #[test]
    fn test_subset_keeps_order() {
        let df = df!(
            "alcohol" => [9.0, 10.0, 11.0, 12.0],
            "quality" => [4i64, 5, 6, 7]
        )
        .unwrap();
        let input = ModelInput::from_dataframe(&df, "quality").unwrap();

        let (x, y) = input.subset(&[3, 0]);
        assert_eq!(y, vec![7, 4]);
        assert_eq!(x[[0, 0]], 12.0);
        assert_eq!(x[[1, 0]], 9.0);
    }
}
