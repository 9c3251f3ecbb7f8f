//! Plain-text charts and tables for terminal output.
//!
//! Every function here is pure and returns a `String`; printing is left to
//! the caller.

use crate::types::{
    ClassCount, ColumnStats, CorrelationMatrix, DatasetInfo, FeatureBoxSummary, Histogram,
};
use crate::utils::truncate_str;
use std::fmt::Write;

const BAR: char = '█';
const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Horizontal bar chart of labelled values, scaled to the largest value.
///
/// Negative and non-finite values are drawn as empty bars.
pub fn bar_chart(rows: &[(String, f64)], width: usize) -> String {
    let label_width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let max = rows
        .iter()
        .map(|(_, v)| *v)
        .filter(|v| v.is_finite())
        .fold(0.0f64, f64::max);

    let mut out = String::new();
    for (label, value) in rows {
        let len = if max > 0.0 && value.is_finite() && *value > 0.0 {
            ((value / max) * width as f64).round() as usize
        } else {
            0
        };
        let _ = writeln!(
            out,
            "{:<lw$} | {:<w$} {}",
            label,
            BAR.to_string().repeat(len),
            format_value(*value),
            lw = label_width,
            w = width
        );
    }
    out
}

/// Bar chart of the label distribution.
pub fn class_distribution_chart(distribution: &[ClassCount], width: usize) -> String {
    let rows: Vec<(String, f64)> = distribution
        .iter()
        .map(|c| (c.label.to_string(), c.count as f64))
        .collect();
    bar_chart(&rows, width)
}

/// One-line sparkline of a histogram with its range.
pub fn histogram_line(hist: &Histogram, name_width: usize) -> String {
    let max = hist.counts.iter().copied().max().unwrap_or(0);
    let spark: String = hist
        .counts
        .iter()
        .map(|&c| {
            if max == 0 || c == 0 {
                ' '
            } else {
                let level = (c * (SPARKS.len() - 1)).div_ceil(max);
                SPARKS[level.min(SPARKS.len() - 1)]
            }
        })
        .collect();

    format!(
        "{:<nw$} [{:>9}, {:>9}] {}",
        truncate_str(&hist.column, name_width),
        format_value(hist.lower),
        format_value(hist.upper),
        spark,
        nw = name_width
    )
}

/// Fixed-width table with row and column headers.
pub fn matrix_table(row_labels: &[String], col_labels: &[String], cells: &[Vec<String>]) -> String {
    let row_label_width = row_labels
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);
    let cell_width = col_labels
        .iter()
        .map(|l| l.chars().count())
        .chain(cells.iter().flatten().map(|c| c.chars().count()))
        .max()
        .unwrap_or(1);

    let mut out = String::new();
    let _ = write!(out, "{:<w$}", "", w = row_label_width);
    for label in col_labels {
        let _ = write!(out, " {:>w$}", label, w = cell_width);
    }
    out.push('\n');

    for (label, row) in row_labels.iter().zip(cells) {
        let _ = write!(out, "{:<w$}", label, w = row_label_width);
        for cell in row {
            let _ = write!(out, " {:>w$}", cell, w = cell_width);
        }
        out.push('\n');
    }
    out
}

/// Correlation matrix as a table with two decimals.
///
/// Column headers are indices into the row labels to keep the table narrow.
pub fn correlation_table(matrix: &CorrelationMatrix) -> String {
    let rows: Vec<String> = matrix
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| format!("[{:>2}] {}", i, truncate_str(name, 22)))
        .collect();
    let cols: Vec<String> = (0..matrix.columns.len()).map(|i| format!("[{}]", i)).collect();
    let cells: Vec<Vec<String>> = matrix
        .values
        .iter()
        .map(|row| {
            row.iter()
                .map(|r| if r.is_finite() { format!("{:.2}", r) } else { "nan".to_string() })
                .collect()
        })
        .collect();
    matrix_table(&rows, &cols, &cells)
}

/// Per-label five-number summaries of one feature.
pub fn box_table(boxes: &FeatureBoxSummary) -> String {
    let rows: Vec<String> = boxes.groups.iter().map(|g| g.label.to_string()).collect();
    let cols: Vec<String> = ["n", "min", "q1", "median", "q3", "max"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let cells: Vec<Vec<String>> = boxes
        .groups
        .iter()
        .map(|g| {
            let mut row = vec![g.count.to_string()];
            match &g.summary {
                Some(s) => row.extend(
                    [s.min, s.q1, s.median, s.q3, s.max]
                        .iter()
                        .map(|v| format_value(*v)),
                ),
                None => row.extend(std::iter::repeat_n("-".to_string(), 5)),
            }
            row
        })
        .collect();
    matrix_table(&rows, &cols, &cells)
}

/// Descriptive statistics, one row per column.
pub fn describe_table(stats: &[ColumnStats]) -> String {
    let rows: Vec<String> = stats.iter().map(|s| truncate_str(&s.name, 24)).collect();
    let cols: Vec<String> = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let cells: Vec<Vec<String>> = stats
        .iter()
        .map(|s| {
            std::iter::once(s.count.to_string())
                .chain(
                    [s.mean, s.std, s.min, s.q25, s.median, s.q75, s.max]
                        .iter()
                        .map(|v| format_value(*v)),
                )
                .collect()
        })
        .collect();
    matrix_table(&rows, &cols, &cells)
}

/// Column overview: dtype, non-null and null counts.
pub fn info_table(info: &DatasetInfo) -> String {
    let rows: Vec<String> = info
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{:>2} {}", i, truncate_str(&c.name, 24)))
        .collect();
    let cols: Vec<String> = ["dtype", "non-null", "null"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let cells: Vec<Vec<String>> = info
        .columns
        .iter()
        .map(|c| vec![c.dtype.clone(), c.non_null.to_string(), c.null_count.to_string()])
        .collect();
    matrix_table(&rows, &cols, &cells)
}

/// Compact number formatting: four decimals, integers without a fraction.
pub fn format_value(v: f64) -> String {
    if !v.is_finite() {
        "nan".to_string()
    } else if v.fract() == 0.0 && v.abs() < 1e12 {
        format!("{}", v as i64)
    } else {
        format!("{:.4}", v)
    }
}
