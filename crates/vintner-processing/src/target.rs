//! Validation and extraction of the integer label column.

use crate::error::{ProcessingError, Result};
use crate::utils::{is_float_dtype, is_numeric_dtype};
use polars::prelude::*;

/// Fail with [`ProcessingError::TargetNotFound`] unless `name` is a column of `df`.
pub fn ensure_target(df: &DataFrame, name: &str) -> Result<()> {
    if df.get_column_names().iter().any(|c| c.as_str() == name) {
        return Ok(());
    }
    Err(ProcessingError::TargetNotFound {
        column: name.to_string(),
        available: df
            .get_column_names()
            .iter()
            .map(|c| c.to_string())
            .collect(),
    })
}

/// Read the target column as integer labels.
///
/// Integer columns pass through. Float columns are accepted only when every
/// value is integral. String columns must parse as integers after trimming.
/// Nulls are preserved as `None`.
pub fn target_labels(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    ensure_target(df, name)?;
    let series = df.column(name)?.as_materialized_series();
    let dtype = series.dtype().clone();

    if is_float_dtype(&dtype) {
        let floats = series.cast(&DataType::Float64)?;
        return floats
            .f64()?
            .into_iter()
            .map(|v| match v {
                None => Ok(None),
                Some(x) if x.is_finite() && x.fract() == 0.0 => Ok(Some(x as i64)),
                Some(x) => Err(invalid(name, format!("non-integral value {}", x))),
            })
            .collect();
    }

    if is_numeric_dtype(&dtype) {
        let ints = series.cast(&DataType::Int64)?;
        return Ok(ints.i64()?.into_iter().collect());
    }

    if matches!(dtype, DataType::String) {
        return series
            .str()?
            .into_iter()
            .map(|v| match v.map(str::trim) {
                None | Some("") => Ok(None),
                Some(s) => s
                    .parse::<i64>()
                    .map(Some)
                    .map_err(|_| invalid(name, format!("'{}' is not an integer", s))),
            })
            .collect();
    }

    Err(invalid(name, format!("unsupported dtype {}", dtype)))
}

fn invalid(column: &str, reason: String) -> ProcessingError {
    ProcessingError::InvalidTarget {
        column: column.to_string(),
        reason,
    }
}
