//! The serializable summary of one analysis run.

use crate::config::TrainingConfig;
use crate::error::Result;
use crate::types::{EvaluationResult, FeatureImportance, SplitSummary, TreeSummary};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;
use vintner_processing::{DataSource, ExplorationReport};

/// Everything the analysis produced, for `--json` output and report files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Local time the report was generated
    pub generated_at: String,

    /// Where the data came from
    pub source: DataSource,
    /// Whether the fallback dataset replaced the requested source
    pub used_fallback: bool,
    /// Why the requested source could not be used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_error: Option<String>,

    pub target_column: String,
    pub exploration: ExplorationReport,

    /// Rows that entered the split, after dropping nulls
    pub rows_used: usize,
    pub dropped_rows: usize,
    pub feature_names: Vec<String>,

    pub training_config: TrainingConfig,
    pub split: SplitSummary,
    pub tree: TreeSummary,
    pub evaluation: EvaluationResult,
    /// Sorted by importance, largest first
    pub feature_importances: Vec<FeatureImportance>,

    /// Non-fatal issues met along the way
    pub warnings: Vec<String>,
}

impl AnalysisReport {
    /// Timestamp in the format used by `generated_at`.
    pub fn timestamp() -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// The `n` most important features.
    pub fn top_features(&self, n: usize) -> &[FeatureImportance] {
        &self.feature_importances[..n.min(self.feature_importances.len())]
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as `<dir>/<stem>_report.json`, creating `dir`.
    pub fn write_to_dir(&self, dir: &Path, stem: &str) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;

        let report_path = dir.join(format!("{}_report.json", stem));
        let mut file = File::create(&report_path)?;
        file.write_all(self.to_json()?.as_bytes())?;

        info!("Report saved: {}", report_path.display());
        Ok(report_path)
    }
}
