//! Remote dataset retrieval.
//!
//! The loader only needs "give me the text behind this URL", so the network
//! sits behind the [`DatasetFetcher`] trait. [`HttpFetcher`] is the real
//! implementation (feature `remote`); tests plug in their own.

use anyhow::Result;

/// Trait for sources that can return the raw CSV text behind a URL.
///
/// Implementations must be `Send + Sync` so a loader can be shared freely.
pub trait DatasetFetcher: Send + Sync {
    /// Download the document at `url` and return it as text.
    fn fetch(&self, url: &str) -> Result<String>;

    /// Name used in log messages.
    fn name(&self) -> &str;
}

/// Blocking HTTP fetcher built on `reqwest`.
#[cfg(feature = "remote")]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "remote")]
impl HttpFetcher {
    /// Create a fetcher whose requests time out after `timeout_secs`.
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent(concat!("vintner/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[cfg(feature = "remote")]
impl DatasetFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send()?.error_for_status()?;
        Ok(response.text()?)
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Fetcher used when the crate is built without network support.
#[cfg(not(feature = "remote"))]
pub struct OfflineFetcher;

#[cfg(not(feature = "remote"))]
impl DatasetFetcher for OfflineFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        anyhow::bail!(
            "cannot download '{}': built without the \"remote\" feature",
            url
        )
    }

    fn name(&self) -> &str {
        "offline"
    }
}
