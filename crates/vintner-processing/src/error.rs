//! Error types for dataset loading and exploration.
//!
//! All fallible operations in this crate return [`Result`], whose error side
//! is [`ProcessingError`]. Errors are serializable as `{code, message}` so a
//! JSON report can carry them unchanged.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for loading and exploring a dataset.
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// The target column is missing from the loaded table.
    #[error("Column '{column}' not found. Available columns: {available:?}")]
    TargetNotFound {
        column: String,
        available: Vec<String>,
    },

    /// The target column exists but does not hold integer labels.
    #[error("Target column '{column}' is not an integer label: {reason}")]
    InvalidTarget { column: String, reason: String },

    /// A column was requested that does not exist.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// The source parsed but contained no data rows.
    #[error("Dataset '{0}' contains no rows")]
    EmptyDataset(String),

    /// Both the primary source and the fallback dataset failed to load.
    #[error("Failed to load '{primary}' ({primary_error}); fallback '{fallback}' also failed: {fallback_error}")]
    FallbackFailed {
        primary: String,
        primary_error: String,
        fallback: String,
        fallback_error: String,
    },

    /// Downloading a remote dataset failed.
    #[error("Failed to fetch '{url}': {reason}")]
    Fetch { url: String, reason: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error (only with the "remote" feature).
    #[cfg(feature = "remote")]
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ProcessingError>,
    },
}

impl ProcessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ProcessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code, used in JSON output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TargetNotFound { .. } => "TARGET_NOT_FOUND",
            Self::InvalidTarget { .. } => "INVALID_TARGET",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::EmptyDataset(_) => "EMPTY_DATASET",
            Self::FallbackFailed { .. } => "FALLBACK_FAILED",
            Self::Fetch { .. } => "FETCH_FAILED",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            #[cfg(feature = "remote")]
            Self::Http(_) => "HTTP_REQUEST_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether a load that failed with this error may be retried from the
    /// fallback dataset.
    ///
    /// A missing or malformed target column is a problem with the data
    /// itself, not with the source, so it never triggers the fallback.
    pub fn allows_fallback(&self) -> bool {
        match self {
            Self::TargetNotFound { .. } | Self::InvalidTarget { .. } | Self::InvalidConfig(_) => {
                false
            }
            Self::WithContext { source, .. } => source.allows_fallback(),
            _ => true,
        }
    }
}

impl Serialize for ProcessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ProcessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for processing operations.
pub type Result<T> = std::result::Result<T, ProcessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ProcessingError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            ProcessingError::EmptyDataset("a.csv".to_string()).error_code(),
            "EMPTY_DATASET"
        );
        assert_eq!(
            ProcessingError::ColumnNotFound("pH".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
    }

    #[test]
    fn test_target_not_found_lists_columns() {
        let error = ProcessingError::TargetNotFound {
            column: "quality".to_string(),
            available: vec!["alcohol".to_string(), "pH".to_string()],
        };
        let message = error.to_string();
        assert!(message.contains("'quality'"));
        assert!(message.contains("alcohol"));
        assert!(message.contains("pH"));
    }

    #[test]
    fn test_allows_fallback() {
        assert!(ProcessingError::EmptyDataset("x".to_string()).allows_fallback());
        assert!(
            ProcessingError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))
                .allows_fallback()
        );
        let missing = ProcessingError::TargetNotFound {
            column: "quality".to_string(),
            available: vec![],
        };
        assert!(!missing.allows_fallback());
        assert!(!missing.with_context("loading").allows_fallback());
    }

    #[test]
    fn test_error_serialization() {
        let error = ProcessingError::ColumnNotFound("alcohol".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("alcohol"));
    }

    #[test]
    fn test_with_context() {
        let error = ProcessingError::EmptyDataset("wine.csv".to_string())
            .with_context("While reading input");
        assert!(error.to_string().contains("While reading input"));
        assert_eq!(error.error_code(), "EMPTY_DATASET");
    }
}
