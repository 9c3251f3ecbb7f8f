//! Label-grouped views of the data.

use super::statistics::five_number_summary;
use crate::types::{BoxSummary, ClassCount};
use std::collections::BTreeMap;

/// Count of samples per label value, ascending by label. Nulls are skipped.
pub(crate) fn class_distribution(labels: &[Option<i64>]) -> Vec<ClassCount> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for label in labels.iter().flatten() {
        *counts.entry(*label).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(label, count)| ClassCount { label, count })
        .collect()
}

/// Five-number summary of `values` for each label value.
///
/// Rows where the label is null are skipped; rows where only the value is
/// null still count toward the group's `count`.
pub(crate) fn box_summaries(values: &[Option<f64>], labels: &[Option<i64>]) -> Vec<BoxSummary> {
    let mut groups: BTreeMap<i64, (usize, Vec<f64>)> = BTreeMap::new();
    for (value, label) in values.iter().zip(labels) {
        let Some(label) = label else { continue };
        let entry = groups.entry(*label).or_default();
        entry.0 += 1;
        if let Some(v) = value.filter(|v| !v.is_nan()) {
            entry.1.push(v);
        }
    }

    groups
        .into_iter()
        .map(|(label, (count, values))| BoxSummary {
            label,
            count,
            summary: five_number_summary(&values),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_class_distribution_sorted_by_label() {
        let labels = [Some(6), Some(5), None, Some(6), Some(3)];
        assert_eq!(
            class_distribution(&labels),
            vec![
                ClassCount { label: 3, count: 1 },
                ClassCount { label: 5, count: 1 },
                ClassCount { label: 6, count: 2 },
            ]
        );
    }

    #[test]
    fn test_box_summaries_group_by_label() {
        let values = [Some(9.0), Some(11.0), Some(12.0), None, Some(10.0)];
        let labels = [Some(5), Some(5), Some(7), Some(7), None];
        let boxes = box_summaries(&values, &labels);

        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].label, 5);
        assert_eq!(boxes[0].count, 2);
        assert_eq!(boxes[0].summary.unwrap().median, 10.0);
        assert_eq!(boxes[1].label, 7);
        assert_eq!(boxes[1].count, 2);
        assert_eq!(boxes[1].summary.unwrap().min, 12.0);
    }

    #[test]
    fn test_box_summary_of_all_null_group() {
        let boxes = box_summaries(&[None], &[Some(4)]);
        assert_eq!(boxes[0].count, 1);
        assert!(boxes[0].summary.is_none());
    }
}
