//! Error types for the GlobeTrack environment abstraction.

use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Local read failed (missing file, permissions, ...)
    #[error("I/O error: {0}")]
    Io(String),

    /// Remote source answered with a non-success status
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// Request never completed (DNS, connection reset, ...)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Source bytes were not valid UTF-8
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),
}

impl EnvError {
    /// Creates an I/O error.
    pub fn io(msg: impl std::fmt::Display) -> Self {
        Self::Io(msg.to_string())
    }

    /// Creates a transport error.
    pub fn transport(msg: impl std::fmt::Display) -> Self {
        Self::Transport(msg.to_string())
    }
}

impl From<std::io::Error> for EnvError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::InvalidData => Self::InvalidEncoding(err.to_string()),
            _ => Self::Io(err.to_string()),
        }
    }
}
