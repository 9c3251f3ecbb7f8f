//! Numeric summaries backed by polars aggregates.

use crate::types::{ColumnStats, FiveNumberSummary, Histogram};
use polars::prelude::cov::pearson_corr;
use polars::prelude::*;

/// Float column with non-finite values turned into nulls, so every
/// aggregate below skips them.
fn finite_chunked(name: &str, values: impl Iterator<Item = Option<f64>>) -> Float64Chunked {
    Float64Chunked::from_iter_options(name.into(), values.map(|v| v.filter(|x| x.is_finite())))
}

/// Linear-interpolated quantile; NaN when no value is present.
fn quantile(ca: &Float64Chunked, q: f64) -> f64 {
    ca.quantile(q, QuantileMethod::Linear)
        .ok()
        .flatten()
        .unwrap_or(f64::NAN)
}

/// Five-number summary; `None` for an empty slice.
pub(crate) fn five_number_summary(values: &[f64]) -> Option<FiveNumberSummary> {
    let ca = finite_chunked("values", values.iter().copied().map(Some));
    let (min, max) = ca.min_max()?;
    Some(FiveNumberSummary {
        min,
        q1: quantile(&ca, 0.25),
        median: quantile(&ca, 0.5),
        q3: quantile(&ca, 0.75),
        max,
    })
}

/// Descriptive statistics of a column, ignoring nulls and non-finite values.
///
/// `std` is the sample standard deviation (ddof = 1).
pub(crate) fn describe_column(name: &str, values: &[Option<f64>]) -> ColumnStats {
    let ca = finite_chunked(name, values.iter().copied());

    ColumnStats {
        name: name.to_string(),
        count: ca.len() - ca.null_count(),
        mean: ca.mean().unwrap_or(f64::NAN),
        std: ca.std(1).unwrap_or(f64::NAN),
        min: ca.min().unwrap_or(f64::NAN),
        q25: quantile(&ca, 0.25),
        median: quantile(&ca, 0.5),
        q75: quantile(&ca, 0.75),
        max: ca.max().unwrap_or(f64::NAN),
    }
}

/// Equal-width histogram with `bins` bins.
///
/// A constant column gets the range `[v - 0.5, v + 0.5]` so it still has a
/// non-zero bin width.
pub(crate) fn histogram(column: &str, values: &[Option<f64>], bins: usize) -> Histogram {
    let present: Vec<f64> = values
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();

    let bins = bins.max(1);
    if present.is_empty() {
        return Histogram {
            column: column.to_string(),
            lower: 0.0,
            upper: 0.0,
            counts: vec![0; bins],
        };
    }

    let mut lower = present.iter().copied().fold(f64::INFINITY, f64::min);
    let mut upper = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lower == upper {
        lower -= 0.5;
        upper += 0.5;
    }

    let width = (upper - lower) / bins as f64;
    let mut counts = vec![0usize; bins];
    for v in present {
        let idx = (((v - lower) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Histogram {
        column: column.to_string(),
        lower,
        upper,
        counts,
    }
}

/// Pearson correlation over rows where both values are present.
///
/// NaN when fewer than two complete pairs exist or either side is constant.
pub(crate) fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let a = finite_chunked("a", a.iter().copied());
    let b = finite_chunked("b", b.iter().copied());
    match pearson_corr(&a, &b) {
        Some(r) if !r.is_nan() => r.clamp(-1.0, 1.0),
        _ => f64::NAN,
    }
}
