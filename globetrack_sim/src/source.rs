//! In-memory text sources for replays and tests.

use async_trait::async_trait;
use globetrack_env::{EnvError, FileSource, SourceId, TextSource};
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

/// Errors opening a configured source.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("{url} is remote; rebuild with --features http")]
    RemoteDisabled { url: String },
}

/// Builds the reader for a configured source.
pub fn open_source(id: &SourceId) -> Result<Box<dyn TextSource>, OpenError> {
    match id {
        SourceId::File(path) => Ok(Box::new(FileSource::new(path.clone()))),
        #[cfg(feature = "http")]
        SourceId::Url(url) => Ok(Box::new(globetrack_env::HttpSource::new(url.clone()))),
        #[cfg(not(feature = "http"))]
        SourceId::Url(url) => Err(OpenError::RemoteDisabled { url: url.clone() }),
    }
}

/// Serves a fixed document.
#[derive(Debug)]
pub struct MemorySource {
    name: String,
    text: String,
    fetches: AtomicUsize,
}

impl MemorySource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            fetches: AtomicUsize::new(0),
        }
    }

    /// How many times the source was read.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextSource for MemorySource {
    async fn fetch_text(&self) -> Result<String, EnvError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }

    fn describe(&self) -> String {
        format!("memory:{}", self.name)
    }
}

/// Fails every fetch with a fixed outcome.
#[derive(Debug, Clone, Copy)]
pub enum FailingSource {
    /// Server answered with this status
    Status(u16),

    /// Connection never established
    Unreachable,
}

#[async_trait]
impl TextSource for FailingSource {
    async fn fetch_text(&self) -> Result<String, EnvError> {
        match self {
            Self::Status(code) => Err(EnvError::HttpStatus(*code)),
            Self::Unreachable => Err(EnvError::transport("simulated network failure")),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Status(code) => format!("failing:{}", code),
            Self::Unreachable => "failing:unreachable".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_source_counts_fetches() {
        let source = MemorySource::new("laps", "id,lat,lon\n");
        assert_eq!(source.fetch_text().await.unwrap(), "id,lat,lon\n");
        assert_eq!(source.fetch_count(), 1);
        assert_eq!(source.describe(), "memory:laps");
    }

    #[test]
    fn test_open_file_source() {
        let source = open_source(&SourceId::parse("track_coords.csv")).unwrap();
        assert!(source.describe().contains("track_coords.csv"));
    }

    #[cfg(not(feature = "http"))]
    #[test]
    fn test_open_url_without_http_feature() {
        let err = open_source(&SourceId::parse("https://example.com/track.csv")).err().unwrap();
        assert!(matches!(err, OpenError::RemoteDisabled { ref url } if url == "https://example.com/track.csv"));
        assert!(err.to_string().contains("--features http"));
    }

    #[tokio::test]
    async fn test_failing_source() {
        assert!(matches!(
            FailingSource::Status(500).fetch_text().await,
            Err(EnvError::HttpStatus(500))
        ));
        assert!(matches!(
            FailingSource::Unreachable.fetch_text().await,
            Err(EnvError::Transport(_))
        ));
    }
}
