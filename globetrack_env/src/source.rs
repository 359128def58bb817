//! Text source abstraction for track data.

use async_trait::async_trait;
use crate::error::EnvError;
use std::path::PathBuf;

/// Abstraction for fetching row-oriented text.
///
/// # Implementations
///
/// - **Production**: `FileSource`, `HttpSource` (feature `http`)
/// - **Simulation**: in-memory sources with scripted failures
///
/// # Contract
///
/// A source either yields the complete UTF-8 text or fails. There is no
/// partial result and no retry.
#[async_trait]
pub trait TextSource: Send + Sync {
    /// Fetches the full text of the source.
    ///
    /// # Returns
    /// * `Ok(text)` - The complete document
    /// * `Err(EnvError)` - The fetch did not succeed
    async fn fetch_text(&self) -> Result<String, EnvError>;

    /// Human-readable location, used in diagnostics.
    fn describe(&self) -> String;
}

/// Reads a track from the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TextSource for FileSource {
    async fn fetch_text(&self) -> Result<String, EnvError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        Ok(text)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Fetches a track over HTTP(S).
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl TextSource for HttpSource {
    async fn fetch_text(&self) -> Result<String, EnvError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(EnvError::transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnvError::HttpStatus(status.as_u16()));
        }

        response.text().await.map_err(EnvError::transport)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
