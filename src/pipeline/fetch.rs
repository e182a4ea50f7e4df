//! Fetcher trait and HTTP implementation
//!
//! Retrieves one remote resource to a local file, overwriting any existing
//! file at the destination. No checksum or length validation is performed,
//! the bytes the server returns are the bytes written to disk.

use async_trait::async_trait;
use eyre::{Context, Result};
use std::path::Path;
use url::Url;

/// Source seam for downloaded files.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Retrieve `url` and write the response body to `dest`.
    ///
    /// # Errors
    /// Returns an error on network failure, a non-2xx response, or a disk
    /// write failure.
    async fn fetch(&self, url: &Url, dest: &Path) -> Result<()>;
}

/// HTTPS fetcher backed by a shared reqwest client.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with a fresh HTTP client.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn try_new() -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, dest: &Path) -> Result<()> {
        log::debug!("GET {url}");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .wrap_err_with(|| format!("Request to {url} failed"))?
            .error_for_status()
            .wrap_err_with(|| format!("Server rejected request for {url}"))?;

        let body = response
            .bytes()
            .await
            .wrap_err_with(|| format!("Failed to read response body from {url}"))?;

        tokio::fs::write(dest, &body)
            .await
            .wrap_err_with(|| format!("Failed to write download to {}", dest.display()))?;

        log::info!("Downloaded {url} to {} ({} bytes)", dest.display(), body.len());
        Ok(())
    }
}
