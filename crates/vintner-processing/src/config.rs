//! Configuration types for loading and exploring a dataset.
//!
//! Both configurations use the builder pattern and are validated on
//! [`build()`](LoaderConfigBuilder::build).

use serde::{Deserialize, Serialize};

/// The red wine-quality dataset from the UCI repository, semicolon separated.
pub const DEFAULT_FALLBACK_URL: &str =
    "https://archive.ics.uci.edu/ml/machine-learning-databases/wine-quality/winequality-red.csv";

/// Default name of the label column.
pub const DEFAULT_TARGET_COLUMN: &str = "quality";

/// Configuration for [`DatasetLoader`](crate::loader::DatasetLoader).
///
/// # Example
///
/// ```rust,ignore
/// use vintner_processing::LoaderConfig;
///
/// let config = LoaderConfig::builder()
///     .target_column("quality")
///     .separator(';')
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Column that must be present in every loaded table.
    /// Default: "quality"
    pub target_column: String,

    /// Field separator for the primary source.
    /// If None, the separator is sniffed from the header line.
    /// Default: None
    pub separator: Option<char>,

    /// Whether to fall back to the remote dataset when the primary source fails.
    /// Default: true
    pub enable_fallback: bool,

    /// URL of the fallback dataset.
    /// Default: [`DEFAULT_FALLBACK_URL`]
    pub fallback_url: String,

    /// Field separator of the fallback dataset.
    /// Default: ';'
    pub fallback_separator: char,

    /// Number of rows polars inspects to infer column types.
    /// Default: 100
    pub infer_schema_length: usize,

    /// Timeout for the fallback download, in seconds.
    /// Default: 30
    pub request_timeout_secs: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
            separator: None,
            enable_fallback: true,
            fallback_url: DEFAULT_FALLBACK_URL.to_string(),
            fallback_separator: ';',
            infer_schema_length: 100,
            request_timeout_secs: 30,
        }
    }
}

impl LoaderConfig {
    /// Create a new configuration builder.
    pub fn builder() -> LoaderConfigBuilder {
        LoaderConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.target_column.trim().is_empty() {
            return Err(ConfigValidationError::EmptyTargetColumn);
        }

        if let Some(sep) = self.separator {
            validate_separator("separator", sep)?;
        }
        validate_separator("fallback_separator", self.fallback_separator)?;

        if self.enable_fallback && self.fallback_url.trim().is_empty() {
            return Err(ConfigValidationError::EmptyFallbackUrl);
        }

        if self.infer_schema_length == 0 {
            return Err(ConfigValidationError::InvalidCount {
                field: "infer_schema_length".to_string(),
                value: 0,
            });
        }

        Ok(())
    }
}

fn validate_separator(field: &str, sep: char) -> Result<(), ConfigValidationError> {
    if !sep.is_ascii() || sep == '"' || sep == '\n' || sep == '\r' {
        return Err(ConfigValidationError::InvalidSeparator {
            field: field.to_string(),
            value: sep,
        });
    }
    Ok(())
}

/// Configuration for [`DataProfiler::explore`](crate::profiler::DataProfiler::explore).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorationConfig {
    /// Number of leading rows shown in the preview.
    /// Default: 5
    pub head_rows: usize,

    /// Number of equal-width bins per histogram.
    /// Default: 20
    pub histogram_bins: usize,
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            head_rows: 5,
            histogram_bins: 20,
        }
    }
}

impl ExplorationConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ExplorationConfigBuilder {
        ExplorationConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::InvalidCount {
                field: "histogram_bins".to_string(),
                value: 0,
            });
        }
        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Target column name must not be empty")]
    EmptyTargetColumn,

    #[error("Fallback URL must not be empty when the fallback is enabled")]
    EmptyFallbackUrl,

    #[error("Invalid {field}: {value:?} (must be a single ASCII character other than a quote or newline)")]
    InvalidSeparator { field: String, value: char },

    #[error("Invalid value for '{field}': {value} (must be at least 1)")]
    InvalidCount { field: String, value: usize },
}

impl From<ConfigValidationError> for crate::error::ProcessingError {
    fn from(e: ConfigValidationError) -> Self {
        crate::error::ProcessingError::InvalidConfig(e.to_string())
    }
}

/// Builder for [`LoaderConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct LoaderConfigBuilder {
    target_column: Option<String>,
    separator: Option<char>,
    enable_fallback: Option<bool>,
    fallback_url: Option<String>,
    fallback_separator: Option<char>,
    infer_schema_length: Option<usize>,
    request_timeout_secs: Option<u64>,
}

impl LoaderConfigBuilder {
    /// Set the column that every loaded table must contain.
    pub fn target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = Some(column.into());
        self
    }

    /// Force the separator of the primary source instead of sniffing it.
    pub fn separator(mut self, sep: char) -> Self {
        self.separator = Some(sep);
        self
    }

    /// Enable or disable the remote fallback dataset.
    pub fn enable_fallback(mut self, enable: bool) -> Self {
        self.enable_fallback = Some(enable);
        self
    }

    /// Set the URL of the fallback dataset.
    pub fn fallback_url(mut self, url: impl Into<String>) -> Self {
        self.fallback_url = Some(url.into());
        self
    }

    /// Set the separator of the fallback dataset.
    pub fn fallback_separator(mut self, sep: char) -> Self {
        self.fallback_separator = Some(sep);
        self
    }

    /// Set how many rows polars inspects for schema inference.
    pub fn infer_schema_length(mut self, rows: usize) -> Self {
        self.infer_schema_length = Some(rows);
        self
    }

    /// Set the download timeout for the fallback dataset.
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `LoaderConfig` or an error if validation fails.
    pub fn build(self) -> Result<LoaderConfig, ConfigValidationError> {
        let defaults = LoaderConfig::default();
        let config = LoaderConfig {
            target_column: self.target_column.unwrap_or(defaults.target_column),
            separator: self.separator,
            enable_fallback: self.enable_fallback.unwrap_or(defaults.enable_fallback),
            fallback_url: self.fallback_url.unwrap_or(defaults.fallback_url),
            fallback_separator: self
                .fallback_separator
                .unwrap_or(defaults.fallback_separator),
            infer_schema_length: self
                .infer_schema_length
                .unwrap_or(defaults.infer_schema_length),
            request_timeout_secs: self
                .request_timeout_secs
                .unwrap_or(defaults.request_timeout_secs),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Builder for [`ExplorationConfig`].
#[derive(Debug, Default)]
pub struct ExplorationConfigBuilder {
    head_rows: Option<usize>,
    histogram_bins: Option<usize>,
}

impl ExplorationConfigBuilder {
    /// Set the number of preview rows.
    pub fn head_rows(mut self, rows: usize) -> Self {
        self.head_rows = Some(rows);
        self
    }

    /// Set the number of histogram bins.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<ExplorationConfig, ConfigValidationError> {
        let config = ExplorationConfig {
            head_rows: self.head_rows.unwrap_or(5),
            histogram_bins: self.histogram_bins.unwrap_or(20),
        };

        config.validate()?;
        Ok(config)
    }
}
