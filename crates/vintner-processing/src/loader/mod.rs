//! Dataset loading with a remote fallback.
//!
//! [`DatasetLoader::load`] reads the primary CSV source and, when that is
//! missing or unreadable, downloads the configured fallback dataset instead.
//! Whatever the source, the result must contain the target column; a missing
//! target is fatal and is never papered over by the fallback.
//!
//! # Example
//!
//! ```rust,ignore
//! use vintner_processing::{DatasetLoader, LoaderConfig};
//! use std::path::Path;
//!
//! let loader = DatasetLoader::new(LoaderConfig::default())?;
//! let loaded = loader.load(Some(Path::new("winequality-red.csv")))?;
//! println!("{} rows from {}", loaded.data.height(), loaded.source);
//! ```

mod csv;
mod fetcher;

pub use csv::{clean_csv_content, parse_csv_str, sniff_separator};
pub use fetcher::DatasetFetcher;
#[cfg(feature = "remote")]
pub use fetcher::HttpFetcher;
#[cfg(not(feature = "remote"))]
pub use fetcher::OfflineFetcher;

use crate::config::LoaderConfig;
use crate::error::{ProcessingError, Result, ResultExt};
use crate::target::ensure_target;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where a loaded table came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "location")]
pub enum DataSource {
    /// A local CSV file.
    File(PathBuf),
    /// A downloaded CSV document.
    Url(String),
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{}", url),
        }
    }
}

/// A table together with its provenance.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    /// The parsed table. Always contains the target column.
    pub data: DataFrame,
    /// Source the table was read from.
    pub source: DataSource,
    /// Whether the fallback dataset replaced the primary source.
    pub used_fallback: bool,
    /// Why the primary source was abandoned, when it was.
    pub primary_error: Option<String>,
}

/// Loads the dataset from a CSV file, falling back to a remote copy.
pub struct DatasetLoader {
    config: LoaderConfig,
    fetcher: Arc<dyn DatasetFetcher>,
}

static_assertions::assert_impl_all!(DatasetLoader: Send, Sync);

impl DatasetLoader {
    /// Create a loader with the default fetcher for this build.
    pub fn new(config: LoaderConfig) -> Result<Self> {
        config.validate()?;
        let fetcher = default_fetcher(&config)?;
        Ok(Self { config, fetcher })
    }

    /// Replace the fetcher used for the fallback dataset.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn DatasetFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// The configuration this loader was built with.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load the primary source, or the fallback dataset if that fails.
    ///
    /// `input` is the primary CSV file; `None` means no file was provided and
    /// goes straight to the fallback.
    ///
    /// # Errors
    ///
    /// - [`ProcessingError::TargetNotFound`] if the loaded table lacks the
    ///   target column (no fallback is attempted for this).
    /// - [`ProcessingError::FallbackFailed`] if both sources fail.
    /// - The primary error itself when the fallback is disabled.
    pub fn load(&self, input: Option<&Path>) -> Result<LoadedDataset> {
        let target = &self.config.target_column;

        let (primary, primary_error) = match input {
            Some(path) => match self.load_file(path) {
                Ok(data) => {
                    ensure_target(&data, target)?;
                    info!(
                        "Loaded {} rows x {} columns from {}",
                        data.height(),
                        data.width(),
                        path.display()
                    );
                    return Ok(LoadedDataset {
                        data,
                        source: DataSource::File(path.to_path_buf()),
                        used_fallback: false,
                        primary_error: None,
                    });
                }
                Err(e) if !e.allows_fallback() || !self.config.enable_fallback => return Err(e),
                Err(e) => (path.display().to_string(), e.to_string()),
            },
            None if !self.config.enable_fallback => {
                return Err(ProcessingError::InvalidConfig(
                    "no input file given and the fallback dataset is disabled".to_string(),
                ));
            }
            None => ("<no input>".to_string(), "no input file provided".to_string()),
        };

        warn!("Could not load '{}': {}", primary, primary_error);
        warn!(
            "Trying the example dataset at {} via {}",
            self.config.fallback_url,
            self.fetcher.name()
        );

        let url = self.config.fallback_url.clone();
        let data = self
            .load_url(&url)
            .map_err(|e| ProcessingError::FallbackFailed {
                primary: primary.clone(),
                primary_error: primary_error.clone(),
                fallback: url.clone(),
                fallback_error: e.to_string(),
            })?;
        ensure_target(&data, target)?;

        info!(
            "Example dataset loaded: {} rows x {} columns",
            data.height(),
            data.width()
        );

        Ok(LoadedDataset {
            data,
            source: DataSource::Url(url),
            used_fallback: true,
            primary_error: Some(primary_error),
        })
    }

    /// Read and parse a local CSV file.
    ///
    /// The separator comes from the configuration, or is sniffed from the
    /// header line when unset.
    pub fn load_file(&self, path: &Path) -> Result<DataFrame> {
        let content = std::fs::read_to_string(path)
            .map_err(ProcessingError::from)
            .context(format!("Reading {}", path.display()))?;

        let separator = match self.config.separator {
            Some(sep) => sep as u8,
            None => {
                let sniffed = sniff_separator(&content);
                debug!(
                    "Sniffed separator {:?} for {}",
                    sniffed as char,
                    path.display()
                );
                sniffed
            }
        };

        parse_csv_str(
            &content,
            separator,
            self.config.infer_schema_length,
            &path.display().to_string(),
        )
    }

    /// Download and parse a remote CSV document using the fallback separator.
    pub fn load_url(&self, url: &str) -> Result<DataFrame> {
        let content = self
            .fetcher
            .fetch(url)
            .map_err(|e| ProcessingError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        parse_csv_str(
            &content,
            self.config.fallback_separator as u8,
            self.config.infer_schema_length,
            url,
        )
    }
}

#[cfg(feature = "remote")]
fn default_fetcher(config: &LoaderConfig) -> Result<Arc<dyn DatasetFetcher>> {
    let fetcher =
        HttpFetcher::new(config.request_timeout_secs).map_err(|e| ProcessingError::Fetch {
            url: config.fallback_url.clone(),
            reason: e.to_string(),
        })?;
    Ok(Arc::new(fetcher))
}

#[cfg(not(feature = "remote"))]
fn default_fetcher(_config: &LoaderConfig) -> Result<Arc<dyn DatasetFetcher>> {
    Ok(Arc::new(OfflineFetcher))
}
