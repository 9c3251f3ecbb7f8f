//! Error types for the vintner-learning crate.
//!
//! [`LearningError`] is returned by every fallible operation in the crate.
//! Loading and exploration errors from `vintner-processing` are wrapped in
//! [`LearningError::Processing`] so callers can match on the original cause.
//!
//! # Example
//!
//! ```no_run
//! use vintner_learning::{LearningError, TrainingConfig};
//!
//! fn configure() -> Result<TrainingConfig, LearningError> {
//!     let config = TrainingConfig::builder()
//!         .test_size(0.25)
//!         .max_depth(Some(5))
//!         .build()?;
//!     Ok(config)
//! }
//! ```

use serde::Serialize;
use thiserror::Error;
use vintner_processing::ProcessingError;

/// The main error type for training and evaluation.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LearningError {
    /// Invalid configuration provided to the pipeline.
    ///
    /// The message names the offending setting and the accepted range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The table cannot be turned into a feature matrix.
    ///
    /// Common causes:
    /// - No numeric feature columns besides the target
    /// - Every row contains a null in some used column
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Too few rows to build both a training and a test set.
    #[error("Insufficient data: need at least {required} rows, got {actual}")]
    InsufficientData {
        /// Minimum number of rows required.
        required: usize,
        /// Number of rows available.
        actual: usize,
    },

    /// The decision tree could not be fitted.
    #[error("Training failed: {0}")]
    TrainingFailed(String),

    /// The names passed to the classification report do not line up with
    /// the labels observed in the evaluated data.
    #[error(
        "Number of classes, {labels}, does not match size of target_names, {names}; \
         pass one name per label present in the true or predicted values"
    )]
    TargetNamesMismatch {
        /// Number of distinct labels in `y_true` and `y_pred`.
        labels: usize,
        /// Number of names supplied.
        names: usize,
    },

    /// linfa rejected the inputs of a metric, e.g. mismatched lengths.
    #[error("Evaluation failed: {0}")]
    Evaluation(#[from] linfa::Error),

    /// Loading or exploring the dataset failed.
    #[error(transparent)]
    Processing(#[from] ProcessingError),

    /// Error raised by Polars while reading columns.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// I/O error while writing outputs.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize the report.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LearningError {
    /// Stable, machine-readable code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::InvalidData(_) => "INVALID_DATA",
            Self::InsufficientData { .. } => "INSUFFICIENT_DATA",
            Self::TrainingFailed(_) => "TRAINING_FAILED",
            Self::TargetNamesMismatch { .. } => "TARGET_NAMES_MISMATCH",
            Self::Evaluation(_) => "EVALUATION_FAILED",
            Self::Processing(e) => e.error_code(),
            Self::Polars(_) => "POLARS_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
        }
    }
}

impl Serialize for LearningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("LearningError", 2)?;
        state.serialize_field("code", self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for vintner-learning operations.
pub type Result<T> = std::result::Result<T, LearningError>;
