//! The end-to-end analysis pipeline.
//!
//! Stages run in order: load, explore, prepare features, split, fit the
//! tree, evaluate on the held-out rows, and interpret the fitted model.
//! Each stage reports progress; non-fatal issues are collected in
//! [`AnalysisReport::warnings`].

use crate::config::TrainingConfig;
use crate::dataset::ModelInput;
use crate::error::{LearningError, Result};
use crate::metrics::{ClassificationReport, ConfusionMatrix, accuracy};
use crate::model::DecisionTreeModel;
use crate::progress::{AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate};
use crate::report::AnalysisReport;
use crate::split::train_test_split;
use crate::types::{EvaluationResult, SplitSummary, TreeSummary};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use vintner_processing::{
    DataProfiler, DatasetFetcher, DatasetLoader, ExplorationConfig, LoadedDataset, LoaderConfig,
};

/// What a successful run produces.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub report: AnalysisReport,
    /// The fitted tree, kept for exports such as TikZ.
    pub model: DecisionTreeModel,
}

/// Load, explore, train and evaluate in one call.
///
/// # Example
///
/// ```rust,ignore
/// use vintner_learning::{AnalysisPipeline, TrainingConfig};
/// use std::path::Path;
///
/// let outcome = AnalysisPipeline::builder()
///     .training_config(TrainingConfig::builder().max_depth(Some(4)).build()?)
///     .on_progress(|update| println!("[{:.0}%] {}", update.progress * 100.0, update.message))
///     .build()?
///     .run(Some(Path::new("winequality-red.csv")))?;
///
/// println!("accuracy: {:.3}", outcome.report.evaluation.accuracy);
/// ```
pub struct AnalysisPipeline {
    loader: DatasetLoader,
    exploration: ExplorationConfig,
    training: TrainingConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(AnalysisPipeline: Send, Sync);

impl AnalysisPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> AnalysisPipelineBuilder {
        AnalysisPipelineBuilder::default()
    }

    pub fn loader(&self) -> &DatasetLoader {
        &self.loader
    }

    pub fn training_config(&self) -> &TrainingConfig {
        &self.training
    }

    /// Load `input` (or the fallback dataset) and analyze it.
    ///
    /// # Errors
    ///
    /// Any loading error is returned as [`LearningError::Processing`]; the
    /// other variants come from [`analyze`](Self::analyze).
    pub fn run(&self, input: Option<&Path>) -> Result<AnalysisOutcome> {
        self.finish(self.run_internal(input))
    }

    /// Analyze an already loaded dataset.
    pub fn analyze(&self, loaded: &LoadedDataset) -> Result<AnalysisOutcome> {
        self.finish(self.analyze_internal(loaded))
    }

    fn finish(&self, result: Result<AnalysisOutcome>) -> Result<AnalysisOutcome> {
        match result {
            Ok(outcome) => {
                self.report_progress(ProgressUpdate::complete("Analysis completed successfully"));
                Ok(outcome)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Analysis error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn stage(&self, stage: AnalysisStage, done: bool, message: impl Into<String>) {
        self.report_progress(ProgressUpdate::new(
            stage,
            if done { 1.0 } else { 0.0 },
            message,
        ));
    }

    fn run_internal(&self, input: Option<&Path>) -> Result<AnalysisOutcome> {
        self.stage(AnalysisStage::Loading, false, "Loading dataset...");
        let loaded = self.loader.load(input)?;
        self.stage(
            AnalysisStage::Loading,
            true,
            format!("Loaded {} rows from {}", loaded.data.height(), loaded.source),
        );
        self.analyze_internal(&loaded)
    }

    fn analyze_internal(&self, loaded: &LoadedDataset) -> Result<AnalysisOutcome> {
        let target = self.loader.config().target_column.as_str();
        let mut warnings = Vec::new();
        if let Some(reason) = &loaded.primary_error {
            warnings.push(format!(
                "Primary source unavailable ({}); analyzed the fallback dataset",
                reason
            ));
        }

        // Step 1: exploration
        self.stage(AnalysisStage::Exploring, false, "Exploring dataset...");
        info!("Step 1: Exploring dataset...");
        let exploration = DataProfiler::explore(&loaded.data, target, &self.exploration)?;
        warnings.extend(exploration.warnings.iter().cloned());
        self.stage(AnalysisStage::Exploring, true, "Exploration complete");

        // Step 2: feature matrix
        self.stage(AnalysisStage::Preparing, false, "Preparing features...");
        info!("Step 2: Preparing features...");
        let input = ModelInput::from_dataframe(&loaded.data, target)?;
        self.stage(
            AnalysisStage::Preparing,
            true,
            format!(
                "{} rows x {} features",
                input.n_samples(),
                input.feature_names.len()
            ),
        );

        // Step 3: split
        self.stage(AnalysisStage::Splitting, false, "Splitting data...");
        info!("Step 3: Splitting data...");
        let split = train_test_split(
            &input.labels,
            self.training.test_size,
            self.training.random_seed,
            self.training.stratify,
        )?;
        if let Some(message) = &split.warning {
            warnings.push(message.clone());
        }
        let (x_train, y_train) = input.subset(&split.train);
        let (x_test, y_test) = input.subset(&split.test);
        self.stage(
            AnalysisStage::Splitting,
            true,
            format!("{} train / {} test rows", y_train.len(), y_test.len()),
        );

        // Step 4: fit
        self.stage(AnalysisStage::Training, false, "Training decision tree...");
        info!("Step 4: Training decision tree...");
        let model = DecisionTreeModel::fit(&x_train, &y_train, &input.feature_names, &self.training)?;
        self.stage(
            AnalysisStage::Training,
            true,
            format!(
                "Tree trained: depth {}, {} leaves",
                model.depth(),
                model.leaf_count()
            ),
        );

        // Step 5: evaluate
        self.stage(AnalysisStage::Evaluating, false, "Evaluating on the test set...");
        info!("Step 5: Evaluating model...");
        let y_pred = model.predict(&x_test)?;
        let target_names: Vec<String> = exploration
            .class_distribution
            .iter()
            .map(|c| c.label.to_string())
            .collect();
        let (classification_report, report_degraded) =
            match ClassificationReport::build(&y_test, &y_pred, Some(&target_names)) {
                Ok(report) => (report, false),
                Err(e @ LearningError::TargetNamesMismatch { .. }) => {
                    let message = format!("{}; showing the report without class names", e);
                    warn!("{}", message);
                    warnings.push(message);
                    (ClassificationReport::build(&y_test, &y_pred, None)?, true)
                }
                Err(e) => return Err(e),
            };
        let confusion_matrix = ConfusionMatrix::observed(&y_test, &y_pred);
        if confusion_matrix.dropped > 0 {
            let message = format!(
                "{} of {} test predictions name a label absent from the test set and are not in the confusion matrix",
                confusion_matrix.dropped,
                y_test.len()
            );
            warn!("{}", message);
            warnings.push(message);
        }
        let evaluation = EvaluationResult {
            accuracy: accuracy(&y_test, &y_pred)?,
            confusion_matrix,
            classification_report,
            report_degraded,
        };
        info!("Test accuracy: {:.4}", evaluation.accuracy);
        self.stage(
            AnalysisStage::Evaluating,
            true,
            format!("Accuracy {:.4}", evaluation.accuracy),
        );

        // Step 6: interpretation
        self.stage(AnalysisStage::Interpreting, false, "Interpreting model...");
        info!("Step 6: Interpreting model...");
        let feature_importances = model.feature_importances();
        let tree = TreeSummary {
            depth: model.depth(),
            leaves: model.leaf_count(),
            classes: model.classes().to_vec(),
            rendered: model.render(self.training.tree_display_depth),
        };
        self.stage(AnalysisStage::Interpreting, true, "Interpretation complete");

        let report = AnalysisReport {
            generated_at: AnalysisReport::timestamp(),
            source: loaded.source.clone(),
            used_fallback: loaded.used_fallback,
            primary_error: loaded.primary_error.clone(),
            target_column: target.to_string(),
            exploration,
            rows_used: input.n_samples(),
            dropped_rows: input.dropped_rows,
            feature_names: input.feature_names.clone(),
            training_config: self.training.clone(),
            split: SplitSummary {
                train_rows: split.train.len(),
                test_rows: split.test.len(),
                stratified: split.stratified,
                seed: self.training.random_seed,
            },
            tree,
            evaluation,
            feature_importances,
            warnings,
        };

        Ok(AnalysisOutcome { report, model })
    }
}

/// Builder for [`AnalysisPipeline`].
#[derive(Default)]
pub struct AnalysisPipelineBuilder {
    loader_config: Option<LoaderConfig>,
    exploration_config: Option<ExplorationConfig>,
    training_config: Option<TrainingConfig>,
    fetcher: Option<Arc<dyn DatasetFetcher>>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

impl AnalysisPipelineBuilder {
    pub fn loader_config(mut self, config: LoaderConfig) -> Self {
        self.loader_config = Some(config);
        self
    }

    pub fn exploration_config(mut self, config: ExplorationConfig) -> Self {
        self.exploration_config = Some(config);
        self
    }

    pub fn training_config(mut self, config: TrainingConfig) -> Self {
        self.training_config = Some(config);
        self
    }

    /// Replace the fetcher used to download the fallback dataset.
    pub fn fetcher(mut self, fetcher: Arc<dyn DatasetFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Set a progress reporter.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a closure-based progress callback.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Validate every configuration and build the pipeline.
    pub fn build(self) -> Result<AnalysisPipeline> {
        let exploration = self.exploration_config.unwrap_or_default();
        exploration
            .validate()
            .map_err(|e| LearningError::InvalidConfig(e.to_string()))?;

        let training = self.training_config.unwrap_or_default();
        training.validate()?;

        let mut loader = DatasetLoader::new(self.loader_config.unwrap_or_default())?;
        if let Some(fetcher) = self.fetcher {
            loader = loader.with_fetcher(fetcher);
        }

        Ok(AnalysisPipeline {
            loader,
            exploration,
            training,
            progress_reporter: self.progress_reporter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use std::sync::Mutex;
    use vintner_processing::DataSource;

    /// 120 rows where alcohol drives quality in three bands.
    fn banded() -> LoadedDataset {
        let alcohol: Vec<f64> = (0..120).map(|i| 9.0 + i as f64 * 0.05).collect();
        let acidity: Vec<f64> = (0..120).map(|i| 0.3 + (i % 7) as f64 * 0.1).collect();
        let quality: Vec<i64> = (0..120).map(|i| 5 + (i / 40) as i64).collect();
        LoadedDataset {
            data: df!(
                "volatile acidity" => acidity,
                "alcohol" => alcohol,
                "quality" => quality
            )
            .unwrap(),
            source: DataSource::File("banded.csv".into()),
            used_fallback: false,
            primary_error: None,
        }
    }

    #[test]
    fn test_analyze_banded_dataset() {
        let pipeline = AnalysisPipeline::builder().build().unwrap();
        let outcome = pipeline.analyze(&banded()).unwrap();
        let report = &outcome.report;

        assert_eq!(report.split.train_rows + report.split.test_rows, 120);
        assert_eq!(report.split.test_rows, 30);
        assert!(report.split.stratified);
        assert!(report.evaluation.accuracy > 0.9);
        assert_eq!(report.evaluation.confusion_matrix.size(), 3);
        let cm = &report.evaluation.confusion_matrix;
        assert_eq!(cm.total() + cm.dropped, report.split.test_rows);
        assert!(!report.evaluation.report_degraded);
        assert_eq!(report.feature_importances[0].feature, "alcohol");
        assert!(report.tree.rendered.contains("alcohol"));
        assert_eq!(report.tree.classes, vec![5, 6, 7]);
    }

    #[test]
    fn test_progress_reaches_complete() {
        let stages = Arc::new(Mutex::new(Vec::new()));
        let sink = stages.clone();
        let pipeline = AnalysisPipeline::builder()
            .on_progress(move |update| sink.lock().unwrap().push(update.stage))
            .build()
            .unwrap();

        pipeline.analyze(&banded()).unwrap();

        let stages = stages.lock().unwrap();
        assert_eq!(stages.first(), Some(&AnalysisStage::Exploring));
        assert_eq!(stages.last(), Some(&AnalysisStage::Complete));
        assert!(stages.contains(&AnalysisStage::Interpreting));
    }

    #[test]
    fn test_failure_is_reported() {
        let failed = Arc::new(Mutex::new(false));
        let sink = failed.clone();
        let pipeline = AnalysisPipeline::builder()
            .on_progress(move |update| {
                if update.stage == AnalysisStage::Failed {
                    *sink.lock().unwrap() = true;
                }
            })
            .build()
            .unwrap();

        let mut loaded = banded();
        loaded.data = df!("alcohol" => [9.0, 10.0]).unwrap();
        assert!(pipeline.analyze(&loaded).is_err());
        assert!(*failed.lock().unwrap());
    }

    #[test]
    fn test_build_rejects_invalid_training_config() {
        let config = TrainingConfig {
            test_size: 1.5,
            ..TrainingConfig::default()
        };
        let result = AnalysisPipeline::builder().training_config(config).build();
        assert!(matches!(result, Err(LearningError::InvalidConfig(_))));
    }
}
