//! Integration tests for loading and exploring the wine-quality fixtures.

use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vintner_processing::{
    DataProfiler, DataSource, DatasetFetcher, DatasetLoader, ExplorationConfig, LoaderConfig,
    ProcessingError,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(name: &str) -> PathBuf {
    fixtures_path().join(name)
}

const WINE_COLUMNS: [&str; 12] = [
    "fixed acidity",
    "volatile acidity",
    "citric acid",
    "residual sugar",
    "chlorides",
    "free sulfur dioxide",
    "total sulfur dioxide",
    "density",
    "pH",
    "sulphates",
    "alcohol",
    "quality",
];

/// Serves a fixture file in place of the remote dataset.
struct FixtureFetcher {
    path: PathBuf,
}

impl DatasetFetcher for FixtureFetcher {
    fn fetch(&self, _url: &str) -> anyhow::Result<String> {
        Ok(std::fs::read_to_string(&self.path)?)
    }

    fn name(&self) -> &str {
        "fixture"
    }
}

fn offline_loader() -> DatasetLoader {
    DatasetLoader::new(LoaderConfig::default())
        .unwrap()
        .with_fetcher(Arc::new(FixtureFetcher {
            path: fixture("winequality_sample.csv"),
        }))
}

fn column_names(df: &polars::prelude::DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|c| c.to_string()).collect()
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_semicolon_file_with_quoted_header() {
    let loaded = offline_loader()
        .load(Some(&fixture("winequality_sample.csv")))
        .unwrap();

    assert!(!loaded.used_fallback);
    assert_eq!(loaded.data.shape(), (240, 12));
    assert_eq!(column_names(&loaded.data), WINE_COLUMNS);
}

#[test]
fn test_load_comma_file() {
    let loaded = offline_loader()
        .load(Some(&fixture("wine_comma.csv")))
        .unwrap();

    assert!(!loaded.used_fallback);
    assert_eq!(loaded.data.shape(), (12, 12));
    assert!(matches!(loaded.source, DataSource::File(_)));
}

#[test]
fn test_missing_quality_column_is_fatal() {
    let result = offline_loader().load(Some(&fixture("no_quality.csv")));

    match result {
        Err(ProcessingError::TargetNotFound { column, available }) => {
            assert_eq!(column, "quality");
            assert_eq!(available.len(), 11);
        }
        other => panic!("expected TargetNotFound, got {:?}", other.map(|l| l.source)),
    }
}

#[test]
fn test_unreadable_primary_falls_back_with_equivalent_schema() {
    let primary = offline_loader()
        .load(Some(&fixture("wine_comma.csv")))
        .unwrap();
    let fallback = offline_loader()
        .load(Some(Path::new("/no/such/upload.csv")))
        .unwrap();

    assert!(fallback.used_fallback);
    assert!(matches!(fallback.source, DataSource::Url(_)));
    assert_eq!(column_names(&fallback.data), column_names(&primary.data));
    assert_eq!(fallback.data.schema(), primary.data.schema());
}

#[test]
fn test_header_only_file_falls_back() {
    let loaded = offline_loader()
        .load(Some(&fixture("header_only.csv")))
        .unwrap();

    assert!(loaded.used_fallback);
    assert!(loaded.primary_error.is_some());
    assert_eq!(loaded.data.height(), 240);
}

#[test]
fn test_unparseable_primary_falls_back() {
    // the second data row has more fields than the header
    let loaded = offline_loader()
        .load(Some(&fixture("ragged.csv")))
        .unwrap();

    assert!(loaded.used_fallback);
    assert!(matches!(loaded.source, DataSource::Url(_)));
    assert_eq!(loaded.data.shape(), (240, 12));

    let primary_error = loaded.primary_error.unwrap();
    assert!(
        primary_error.contains("Polars error"),
        "unexpected primary error: {}",
        primary_error
    );
}

// ============================================================================
// Exploration
// ============================================================================

#[test]
fn test_explore_fixture() {
    let loaded = offline_loader()
        .load(Some(&fixture("winequality_sample.csv")))
        .unwrap();
    let report =
        DataProfiler::explore(&loaded.data, "quality", &ExplorationConfig::default()).unwrap();

    assert_eq!(report.describe.len(), 12);
    assert_eq!(report.histograms.len(), 11);
    assert_eq!(report.box_summaries.len(), 11);
    assert_eq!(report.info.total_nulls(), 0);
    assert!(report.warnings.is_empty());

    let labels: Vec<i64> = report.class_distribution.iter().map(|c| c.label).collect();
    assert_eq!(labels, vec![3, 4, 5, 6, 7, 8]);
    let total: usize = report.class_distribution.iter().map(|c| c.count).sum();
    assert_eq!(total, 240);

    for hist in &report.histograms {
        assert_eq!(hist.counts.len(), 20);
        assert_eq!(hist.total(), 240);
    }

    // the fixture is built so that alcohol drives quality
    let alcohol = report.correlation.get("alcohol", "quality").unwrap();
    assert!(alcohol > 0.3, "alcohol correlation was {}", alcohol);
}
