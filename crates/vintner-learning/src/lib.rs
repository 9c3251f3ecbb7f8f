//! Decision-Tree Training and Evaluation Library
//!
//! The modelling half of the wine-quality analysis. Takes a table loaded by
//! `vintner-processing`, fits a Gini decision tree with `linfa-trees`, and
//! evaluates it on a held-out split.
//!
//! # Overview
//!
//! - **Features**: every numeric column except the target, null rows dropped
//! - **Split**: seeded, stratified by label when possible
//! - **Model**: depth-limited decision tree with minimum split/leaf sizes
//! - **Metrics**: accuracy, confusion matrix, per-class classification report
//! - **Interpretation**: feature importances and a text rendering of the tree
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use vintner_learning::AnalysisPipeline;
//! use std::path::Path;
//!
//! let pipeline = AnalysisPipeline::builder().build()?;
//! let outcome = pipeline.run(Some(Path::new("winequality-red.csv")))?;
//!
//! println!("{}", outcome.report.evaluation.classification_report);
//! for f in outcome.report.top_features(5) {
//!     println!("{:<24} {:.3}", f.feature, f.importance);
//! }
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod split;
pub mod types;

// Re-exports for convenient access
pub use config::{TrainingConfig, TrainingConfigBuilder};
pub use dataset::ModelInput;
pub use error::{LearningError, Result};
pub use metrics::{
    AverageMetrics, ClassMetrics, ClassificationReport, ConfusionMatrix, accuracy,
};
pub use model::{DecisionTreeModel, LabelEncoder};
pub use pipeline::{AnalysisOutcome, AnalysisPipeline, AnalysisPipelineBuilder};
pub use progress::{AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate};
pub use report::AnalysisReport;
pub use split::{SplitIndices, train_test_split};
pub use types::{EvaluationResult, FeatureImportance, SplitSummary, TreeSummary};
