//! Shared helpers for working with polars columns.

use crate::error::{ProcessingError, Result};
use polars::prelude::*;

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a float type.
#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Names of all numeric columns, in table order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| is_numeric_dtype(c.dtype()))
        .map(|c| c.name().to_string())
        .collect()
}

/// Read a column as optional `f64` values, casting integers as needed.
pub fn column_f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df
        .column(name)
        .map_err(|_| ProcessingError::ColumnNotFound(name.to_string()))?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

/// Truncate a string to max length with ellipsis.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float32));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_numeric_column_names() {
        let df = df!(
            "alcohol" => [9.4, 9.8],
            "color" => ["red", "red"],
            "quality" => [5i64, 6]
        )
        .unwrap();
        assert_eq!(numeric_column_names(&df), vec!["alcohol", "quality"]);
    }

    #[test]
    fn test_column_f64_values_casts_integers() {
        let df = df!("quality" => [Some(5i64), None, Some(7)]).unwrap();
        let values = column_f64_values(&df, "quality").unwrap();
        assert_eq!(values, vec![Some(5.0), None, Some(7.0)]);
    }

    #[test]
    fn test_column_f64_values_missing_column() {
        let df = df!("a" => [1.0]).unwrap();
        match column_f64_values(&df, "b") {
            Err(ProcessingError::ColumnNotFound(name)) => assert_eq!(name, "b"),
            other => panic!("expected ColumnNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("pH", 10), "pH");
        assert_eq!(truncate_str("free sulfur dioxide", 10), "free su...");
        assert_eq!(truncate_str("abcdef", 2), "ab");
    }
}
