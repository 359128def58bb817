//! Structured diagnostics for the loader and animator.
//!
//! Recoverable conditions (skipped rows, empty tracks, cancelled runs) are
//! reported here instead of being returned as errors, so a harness can
//! assert on them and a binary can log them.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Why a CSV row was skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowDefect {
    /// Fewer than three comma-separated fields
    TooFewFields { found: usize },

    /// Latitude field missing or not a finite number
    InvalidLatitude { value: String },

    /// Longitude field missing or not a finite number
    InvalidLongitude { value: String },

    /// The CSV reader could not decode the row at all
    Unreadable { reason: String },
}

impl std::fmt::Display for RowDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewFields { found } => write!(f, "expected at least 3 fields, found {}", found),
            Self::InvalidLatitude { value } => write!(f, "invalid latitude {:?}", value),
            Self::InvalidLongitude { value } => write!(f, "invalid longitude {:?}", value),
            Self::Unreadable { reason } => write!(f, "unreadable row: {}", reason),
        }
    }
}

/// Events emitted by the loader and animator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A data row was skipped. `row` is the zero-based data row index,
    /// `line` the one-based line in the source text.
    MalformedRow {
        row: usize,
        line: u64,
        raw: String,
        defect: RowDefect,
    },

    /// Source parsed without a single usable row.
    EmptyTrack { location: String },

    /// Source parsed successfully.
    TrackLoaded {
        location: String,
        points: usize,
        skipped: usize,
    },

    /// Track has fewer than two points; nothing to animate.
    TrackTooShort { points: usize },

    /// The marker reached the final waypoint.
    AnimationCompleted { points: usize },

    /// The run was cancelled while the marker sat at `index`.
    AnimationCancelled { index: usize },

    /// The run failed; the marker stays frozen at `index`.
    AnimationFailed { index: usize, reason: String },
}

impl Diagnostic {
    /// Warnings and failures, as opposed to progress notes.
    pub fn is_problem(&self) -> bool {
        matches!(
            self,
            Self::MalformedRow { .. } | Self::EmptyTrack { .. } | Self::AnimationFailed { .. }
        )
    }
}

/// Receives diagnostics. Implementations must tolerate calls from the
/// animator's driver task.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::MalformedRow { row, line, raw, defect } => {
                tracing::error!(row, line, raw = %raw, "Skipping malformed row: {}", defect);
            }
            Diagnostic::EmptyTrack { location } => {
                tracing::warn!(location = %location, "No valid positions found");
            }
            Diagnostic::TrackLoaded { location, points, skipped } => {
                tracing::info!(location = %location, points, skipped, "Track loaded");
            }
            Diagnostic::TrackTooShort { points } => {
                tracing::warn!(points, "Track too short to animate");
            }
            Diagnostic::AnimationCompleted { points } => {
                tracing::info!(points, "Animation completed");
            }
            Diagnostic::AnimationCancelled { index } => {
                tracing::info!(index, "Animation cancelled");
            }
            Diagnostic::AnimationFailed { index, reason } => {
                tracing::error!(index, "Animation failed: {}", reason);
            }
        }
    }
}

/// Keeps every diagnostic in memory, for tests and exports.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Diagnostic>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Skipped rows only.
    pub fn malformed_rows(&self) -> Vec<Diagnostic> {
        self.diagnostics()
            .into_iter()
            .filter(|d| matches!(d, Diagnostic::MalformedRow { .. }))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&self, diagnostic: Diagnostic) {
        if let Ok(mut events) = self.events.lock() {
            events.push(diagnostic);
        }
    }
}

/// Fans one diagnostic out to several sinks.
pub struct TeeSink<'a> {
    sinks: Vec<&'a dyn DiagnosticSink>,
}

impl<'a> TeeSink<'a> {
    pub fn new(sinks: Vec<&'a dyn DiagnosticSink>) -> Self {
        Self { sinks }
    }
}

impl DiagnosticSink for TeeSink<'_> {
    fn report(&self, diagnostic: Diagnostic) {
        for sink in &self.sinks {
            sink.report(diagnostic.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink() {
        let sink = RecordingSink::new();
        assert!(sink.is_empty());

        sink.report(Diagnostic::TrackTooShort { points: 1 });
        sink.report(Diagnostic::MalformedRow {
            row: 2,
            line: 4,
            raw: "bad,row".to_string(),
            defect: RowDefect::TooFewFields { found: 2 },
        });

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.malformed_rows().len(), 1);
    }

    #[test]
    fn test_tee_sink() {
        let a = RecordingSink::new();
        let b = RecordingSink::new();
        let tee = TeeSink::new(vec![&a as &dyn DiagnosticSink, &b, &TracingSink]);

        tee.report(Diagnostic::AnimationCancelled { index: 3 });

        assert_eq!(a.diagnostics(), b.diagnostics());
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_problem_classification() {
        assert!(Diagnostic::EmptyTrack { location: "x".into() }.is_problem());
        assert!(!Diagnostic::AnimationCompleted { points: 3 }.is_problem());
    }

    #[test]
    fn test_defect_display() {
        let defect = RowDefect::InvalidLatitude { value: "north".into() };
        assert_eq!(defect.to_string(), "invalid latitude \"north\"");
    }
}
