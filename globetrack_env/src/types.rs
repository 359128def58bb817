//! Common types for the GlobeTrack environment abstraction.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Identifies where a track's text comes from.
///
/// The loader treats sources as opaque; this type only exists so the CLI
/// and config files can name one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    /// A file on the local filesystem
    File(PathBuf),

    /// An `http://` or `https://` URL
    Url(String),
}

impl SourceId {
    /// Classifies a user-supplied location string.
    pub fn parse(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Self::Url(trimmed.to_string())
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }

    /// Returns true for remote sources.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Url(_))
    }
}

impl Default for SourceId {
    fn default() -> Self {
        Self::File(PathBuf::from("track_coords.csv"))
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{}", url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url() {
        let id = SourceId::parse("https://example.org/track_coords.csv");
        assert!(id.is_remote());
        assert_eq!(id.to_string(), "https://example.org/track_coords.csv");
    }

    #[test]
    fn test_parse_file() {
        let id = SourceId::parse("  data/track.csv ");
        assert_eq!(id, SourceId::File(PathBuf::from("data/track.csv")));
        assert!(!id.is_remote());
    }

    #[test]
    fn test_default_source() {
        assert_eq!(SourceId::default().to_string(), "track_coords.csv");
    }
}
