//! Dataset Loading and Exploration Library
//!
//! The data half of the wine-quality analysis, built on Polars.
//!
//! # Overview
//!
//! - **Loading**: CSV files with separator sniffing, and a remote fallback
//!   dataset when the primary source is missing or unreadable
//! - **Target validation**: the label column must exist and hold integers
//! - **Exploration**: dtype/null overview, descriptive statistics, label
//!   distribution, histograms, per-label box summaries, correlations
//! - **Charts**: plain-text renderings of all of the above
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use vintner_processing::{DataProfiler, DatasetLoader, ExplorationConfig, LoaderConfig};
//! use std::path::Path;
//!
//! let loader = DatasetLoader::new(LoaderConfig::default())?;
//! let loaded = loader.load(Some(Path::new("winequality-red.csv")))?;
//!
//! let report = DataProfiler::explore(&loaded.data, "quality", &ExplorationConfig::default())?;
//! print!("{}", vintner_processing::charts::class_distribution_chart(&report.class_distribution, 40));
//! ```
//!
//! # Features
//!
//! - `remote` (default): download the fallback dataset over HTTP with
//!   `reqwest`. Without it the fallback always fails with a clear message.

pub mod charts;
pub mod config;
pub mod error;
pub mod loader;
pub mod profiler;
pub mod target;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{
    ConfigValidationError, DEFAULT_FALLBACK_URL, DEFAULT_TARGET_COLUMN, ExplorationConfig,
    ExplorationConfigBuilder, LoaderConfig, LoaderConfigBuilder,
};
pub use error::{ProcessingError, Result as ProcessingResult, ResultExt};
pub use loader::{DataSource, DatasetFetcher, DatasetLoader, LoadedDataset};
pub use profiler::DataProfiler;
pub use target::{ensure_target, target_labels};
pub use types::{
    BoxSummary, ClassCount, ColumnInfo, ColumnStats, CorrelationMatrix, DatasetInfo,
    ExplorationReport, FeatureBoxSummary, FiveNumberSummary, Histogram,
};
pub use utils::{column_f64_values, is_numeric_dtype, numeric_column_names, truncate_str};
