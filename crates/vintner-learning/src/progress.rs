//! Progress reporting for the analysis pipeline.
//!
//! # Example
//!
//! ```rust,ignore
//! use vintner_learning::AnalysisPipeline;
//!
//! let outcome = AnalysisPipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run(None)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of the analysis, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStage {
    /// Reading the primary source or the fallback dataset
    Loading,
    /// Statistics, distributions and correlations
    Exploring,
    /// Building the feature matrix
    Preparing,
    /// Train/test partitioning
    Splitting,
    /// Fitting the decision tree
    Training,
    /// Accuracy, confusion matrix and classification report
    Evaluating,
    /// Feature importances and tree rendering
    Interpreting,
    /// Analysis finished successfully
    Complete,
    /// Analysis stopped with an error
    Failed,
}

impl AnalysisStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Data",
            Self::Exploring => "Exploring Data",
            Self::Preparing => "Preparing Features",
            Self::Splitting => "Splitting Data",
            Self::Training => "Training Model",
            Self::Evaluating => "Evaluating Model",
            Self::Interpreting => "Interpreting Model",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of the overall run spent in this stage.
    ///
    /// Non-terminal weights sum to 1.0.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.15,
            Self::Exploring => 0.25,
            Self::Preparing => 0.05,
            Self::Splitting => 0.05,
            Self::Training => 0.25,
            Self::Evaluating => 0.15,
            Self::Interpreting => 0.10,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Returns the cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Exploring => 0.15,
            Self::Preparing => 0.40,
            Self::Splitting => 0.45,
            Self::Training => 0.50,
            Self::Evaluating => 0.75,
            Self::Interpreting => 0.90,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

/// A single progress notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: AnalysisStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    pub message: String,
}

impl ProgressUpdate {
    /// Creates a progress update for `stage`.
    pub fn new(stage: AnalysisStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: AnalysisStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
        }
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: AnalysisStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
        }
    }
}

/// Receives progress updates from [`AnalysisPipeline`](crate::AnalysisPipeline).
///
/// Implementations should return quickly; the pipeline calls them inline.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const RUNNING: [AnalysisStage; 7] = [
        AnalysisStage::Loading,
        AnalysisStage::Exploring,
        AnalysisStage::Preparing,
        AnalysisStage::Splitting,
        AnalysisStage::Training,
        AnalysisStage::Evaluating,
        AnalysisStage::Interpreting,
    ];

    #[test]
    fn test_stage_weights_sum() {
        let total: f32 = RUNNING.iter().map(|s| s.weight()).sum();
        assert!((total - 1.0).abs() < 0.01, "Weights should sum to ~1.0");
    }

    #[test]
    fn test_base_progress_is_cumulative() {
        let mut expected = 0.0f32;
        for stage in RUNNING {
            assert!(
                (stage.base_progress() - expected).abs() < 1e-6,
                "{:?} should start at {}",
                stage,
                expected
            );
            expected += stage.weight();
        }
    }

    #[test]
    fn test_progress_update_new() {
        let update = ProgressUpdate::new(AnalysisStage::Training, 0.5, "Fitting");
        assert_eq!(update.stage, AnalysisStage::Training);
        assert_eq!(update.stage_progress, 0.5);
        assert!((update.progress - 0.625).abs() < 1e-6);
        assert_eq!(update.message, "Fitting");
    }

    #[test]
    fn test_progress_update_terminal() {
        let done = ProgressUpdate::complete("Done");
        assert_eq!(done.progress, 1.0);
        assert!(done.stage.is_terminal());

        let failed = ProgressUpdate::failed("boom");
        assert_eq!(failed.stage, AnalysisStage::Failed);
        assert!(failed.stage.is_terminal());
        assert!(!AnalysisStage::Training.is_terminal());
    }

    #[test]
    fn test_stage_json_values() {
        let json = serde_json::to_string(&AnalysisStage::Interpreting).unwrap();
        assert_eq!(json, "\"interpreting\"");
    }

    #[test]
    fn test_closure_progress_reporter() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let reporter = ClosureProgressReporter::new(move |_update| {
            call_count_clone.fetch_add(1, Ordering::SeqCst);
        });

        reporter.report(ProgressUpdate::new(AnalysisStage::Loading, 0.0, "Test"));
        reporter.report(ProgressUpdate::complete("Done"));

        assert_eq!(call_count.load(Ordering::SeqCst), 2);
    }
}
