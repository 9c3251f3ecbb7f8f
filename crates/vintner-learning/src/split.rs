//! Seeded train/test split with optional stratification.

use crate::error::{LearningError, Result};
use linfa::Dataset;
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Row indices of the two partitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
    /// Whether label proportions were preserved.
    pub stratified: bool,
    /// Why a requested stratification was not applied.
    pub warning: Option<String>,
}

impl SplitIndices {
    pub fn total(&self) -> usize {
        self.train.len() + self.test.len()
    }
}

/// Number of test rows for `n` samples: `ceil(test_size * n)`.
pub fn test_count(n: usize, test_size: f64) -> usize {
    (test_size * n as f64).ceil() as usize
}

/// Partition `0..labels.len()` into train and test indices.
///
/// The test set has `ceil(test_size * n)` rows. With `stratify`, each label
/// gets a share of the test set proportional to its frequency, rounded by
/// largest remainder. Stratification is dropped, with a warning, when the
/// least populated label has fewer than 2 rows or when either partition is
/// smaller than the number of labels.
///
/// # Errors
///
/// Returns [`LearningError::InsufficientData`] if either partition would be
/// empty.
pub fn train_test_split(
    labels: &[i64],
    test_size: f64,
    seed: u64,
    stratify: bool,
) -> Result<SplitIndices> {
    let n = labels.len();
    let n_test = test_count(n, test_size);
    if n_test == 0 || n_test >= n {
        return Err(LearningError::InsufficientData {
            required: 2,
            actual: n,
        });
    }
    let n_train = n - n_test;

    let mut rng = StdRng::seed_from_u64(seed);

    let mut classes: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (i, label) in labels.iter().enumerate() {
        classes.entry(*label).or_default().push(i);
    }

    let mut warning = None;
    if stratify && classes.len() > 1 {
        let smallest = classes.values().map(Vec::len).min().unwrap_or(0);
        if smallest < 2 {
            warning = Some(
                "The least populated class has only 1 member; using a non-stratified split"
                    .to_string(),
            );
        } else if n_test < classes.len() || n_train < classes.len() {
            warning = Some(format!(
                "Split sizes (train {}, test {}) are smaller than the number of classes ({}); using a non-stratified split",
                n_train,
                n_test,
                classes.len()
            ));
        } else {
            let split = stratified(&classes, n, n_test, &mut rng);
            debug!(
                "Stratified split: {} train / {} test over {} classes",
                split.train.len(),
                split.test.len(),
                classes.len()
            );
            return Ok(split);
        }
    }

    if let Some(message) = &warning {
        warn!("{}", message);
    }

    let (train, test) = shuffled(n, n_test, &mut rng);
    debug!("Shuffled split: {} train / {} test", train.len(), test.len());

    Ok(SplitIndices {
        train,
        test,
        stratified: false,
        warning,
    })
}

/// Plain seeded split through linfa's `shuffle` and `split_with_ratio`.
///
/// Row indices ride along as targets so the partitions can be mapped back.
fn shuffled(n: usize, n_test: usize, rng: &mut StdRng) -> (Vec<usize>, Vec<usize>) {
    let records = Array2::from_shape_fn((n, 1), |(i, _)| i as f64);
    let rows: Array1<usize> = (0..n).collect();
    let dataset = Dataset::new(records, rows);

    // split_with_ratio rounds the first part up; aim half a row short of n_test
    let ratio = (n_test as f32 - 0.5) / n as f32;
    let (test, train) = dataset.shuffle(rng).split_with_ratio(ratio);

    (
        train.targets.iter().copied().collect(),
        test.targets.iter().copied().collect(),
    )
}

/// Test rows per class, proportional to class size.
///
/// Floors of the exact shares are topped up one at a time, largest
/// remainder first; ties go to the larger class, then the smaller label.
pub(crate) fn allocate(counts: &[usize], n: usize, n_test: usize) -> Vec<usize> {
    let exact: Vec<f64> = counts
        .iter()
        .map(|&c| n_test as f64 * c as f64 / n as f64)
        .collect();
    let mut alloc: Vec<usize> = exact.iter().map(|e| e.floor() as usize).collect();

    let assigned: usize = alloc.iter().sum();
    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = exact[a] - alloc[a] as f64;
        let rb = exact[b] - alloc[b] as f64;
        rb.total_cmp(&ra)
            .then(counts[b].cmp(&counts[a]))
            .then(a.cmp(&b))
    });
    for &i in order.iter().take(n_test.saturating_sub(assigned)) {
        alloc[i] += 1;
    }
    alloc
}

fn stratified(
    classes: &BTreeMap<i64, Vec<usize>>,
    n: usize,
    n_test: usize,
    rng: &mut StdRng,
) -> SplitIndices {
    let counts: Vec<usize> = classes.values().map(Vec::len).collect();
    let alloc = allocate(&counts, n, n_test);

    let mut train = Vec::with_capacity(n - n_test);
    let mut test = Vec::with_capacity(n_test);
    for (members, take) in classes.values().zip(alloc) {
        let mut members = members.clone();
        members.shuffle(rng);
        test.extend_from_slice(&members[..take]);
        train.extend_from_slice(&members[take..]);
    }
    train.shuffle(rng);
    test.shuffle(rng);

    SplitIndices {
        train,
        test,
        stratified: true,
        warning: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn labels(counts: &[(i64, usize)]) -> Vec<i64> {
        counts
            .iter()
            .flat_map(|&(label, count)| std::iter::repeat_n(label, count))
            .collect()
    }

    fn count_of(labels: &[i64], indices: &[usize], label: i64) -> usize {
        indices.iter().filter(|&&i| labels[i] == label).count()
    }

    #[test]
    fn test_split_preserves_totals_and_proportion() {
        let y = labels(&[(5, 50), (6, 40), (7, 10)]);
        let split = train_test_split(&y, 0.25, 42, true).unwrap();

        assert_eq!(split.total(), 100);
        assert_eq!(split.test.len(), 25);
        assert_eq!(split.train.len(), 75);

        let all: HashSet<usize> = split.train.iter().chain(&split.test).copied().collect();
        assert_eq!(all.len(), 100);
    }

    #[test]
    fn test_test_count_rounds_up() {
        assert_eq!(test_count(240, 0.25), 60);
        assert_eq!(test_count(1599, 0.25), 400);
        assert_eq!(test_count(10, 0.33), 4);
    }

    #[test]
    fn test_stratified_keeps_class_proportions() {
        let y = labels(&[(5, 40), (6, 20), (7, 20)]);
        let split = train_test_split(&y, 0.25, 42, true).unwrap();

        assert!(split.stratified);
        assert_eq!(count_of(&y, &split.test, 5), 10);
        assert_eq!(count_of(&y, &split.test, 6), 5);
        assert_eq!(count_of(&y, &split.test, 7), 5);
    }

    #[test]
    fn test_allocate_largest_remainder() {
        // exact shares 1.5, 0.9, 0.6
        assert_eq!(allocate(&[5, 3, 2], 10, 3), vec![1, 1, 1]);
        // exact shares 2.0, 1.0
        assert_eq!(allocate(&[8, 4], 12, 3), vec![2, 1]);
        let alloc = allocate(&[30, 36, 52, 49, 38, 35], 240, 60);
        assert_eq!(alloc.iter().sum::<usize>(), 60);
    }

    #[test]
    fn test_same_seed_same_split() {
        let y = labels(&[(5, 30), (6, 30)]);
        let a = train_test_split(&y, 0.25, 7, true).unwrap();
        let b = train_test_split(&y, 0.25, 7, true).unwrap();
        let c = train_test_split(&y, 0.25, 8, true).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.test, c.test);
    }

    #[test]
    fn test_singleton_class_falls_back() {
        let y = labels(&[(5, 10), (6, 9), (8, 1)]);
        let split = train_test_split(&y, 0.25, 42, true).unwrap();

        assert!(!split.stratified);
        assert!(split.warning.as_ref().unwrap().contains("least populated class"));
        assert_eq!(split.total(), 20);
        assert_eq!(split.test.len(), 5);
    }

    #[test]
    fn test_tiny_test_set_falls_back() {
        let y = labels(&[(3, 2), (4, 2), (5, 2), (6, 2)]);
        // n_test = 1 < 4 classes
        let split = train_test_split(&y, 0.1, 42, true).unwrap();
        assert!(!split.stratified);
        assert!(split.warning.is_some());
    }

    #[test]
    fn test_unstratified_has_no_warning() {
        let y = labels(&[(5, 10), (6, 10)]);
        let split = train_test_split(&y, 0.5, 42, false).unwrap();
        assert!(!split.stratified);
        assert!(split.warning.is_none());
        assert_eq!(split.test.len(), 10);
    }

    #[test]
    fn test_shuffled_split_sizes() {
        for (n, test_size) in [(20, 0.25), (240, 0.1), (1599, 0.25), (7, 0.33), (3, 0.5)] {
            let y = vec![5; n];
            let split = train_test_split(&y, test_size, 42, false).unwrap();
            assert_eq!(split.test.len(), test_count(n, test_size), "n {}", n);
            assert_eq!(split.total(), n);

            let all: HashSet<usize> = split.train.iter().chain(&split.test).copied().collect();
            assert_eq!(all.len(), n);
        }
    }

    #[test]
    fn test_shuffled_split_is_seeded() {
        let y = labels(&[(5, 30), (6, 30)]);
        let a = train_test_split(&y, 0.25, 3, false).unwrap();
        let b = train_test_split(&y, 0.25, 3, false).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.test, (0..15).collect::<Vec<_>>());
    }

    #[test]
    fn test_insufficient_data() {
        assert!(matches!(
            train_test_split(&[5], 0.25, 42, true),
            Err(LearningError::InsufficientData { actual: 1, .. })
        ));
        assert!(train_test_split(&[], 0.25, 42, true).is_err());
    }
}
